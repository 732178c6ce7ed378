use serde::Serialize;

use crate::model::columns;
use crate::table::Table;

/// One player row from a draft-class page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DraftPick {
    pub year: i32,
    pub player: String,
    /// Site identifier, e.g. `HopkDe00`. Empty when the page did not link the player.
    pub player_id: String,
    pub position: String,
    pub college: String,
    pub pick: String,
    pub round: String,
    pub team: String,
}

/// Header row of a freshly collected draft table.
pub const DRAFT_COLUMNS: &[&str] = &[
    columns::YEAR,
    columns::PLAYER,
    columns::PLAYER_ID,
    columns::COLLEGE,
    columns::PICK,
    columns::ROUND,
    columns::TEAM,
];

/// Build the initial player table from collected picks.
pub fn draft_table(picks: &[DraftPick]) -> Table {
    let mut table = Table::new(DRAFT_COLUMNS.iter().copied());
    for pick in picks {
        table.push_row([
            (columns::YEAR, pick.year.to_string()),
            (columns::PLAYER, pick.player.clone()),
            (columns::PLAYER_ID, pick.player_id.clone()),
            (columns::COLLEGE, pick.college.clone()),
            (columns::PICK, pick.pick.clone()),
            (columns::ROUND, pick.round.clone()),
            (columns::TEAM, pick.team.clone()),
        ]);
    }
    table
}
