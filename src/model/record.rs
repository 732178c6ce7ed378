use serde::Serialize;

use crate::model::{Honors, PlayerStats};
use crate::table::{fmt_bool, fmt_opt, non_empty, parse_bool, parse_float, parse_int, Table};

/// Column names shared by every table the crate reads or writes.
pub mod columns {
    pub const YEAR: &str = "Year";
    pub const PLAYER: &str = "Player";
    pub const PLAYER_ID: &str = "Player_ID";
    pub const COLLEGE: &str = "College";
    pub const PICK: &str = "Pick";
    pub const ROUND: &str = "Round";
    pub const TEAM: &str = "Team";
    pub const AWARDS: &str = "Awards";

    pub const CAREER_AV: &str = "Career_AV";
    pub const GAMES_PLAYED: &str = "Games_Played";
    pub const RECEPTIONS: &str = "Receptions";
    pub const RECEIVING_YARDS: &str = "Receiving_Yards";
    pub const RECEIVING_TDS: &str = "Receiving_TDs";
    pub const REC_PER_GAME: &str = "Rec/Game";
    pub const YARDS_PER_GAME: &str = "Yards/Game";
    pub const TD_PER_GAME: &str = "TD/Game";
    pub const SEASONS_PLAYED: &str = "Seasons_Played";
    pub const THOUSAND_YARD_SEASONS: &str = "Thousand_Yard_Seasons";
    pub const PRO_BOWLS: &str = "Pro_Bowls";
    pub const ALL_PROS: &str = "All_Pros";
    pub const OPOY: &str = "OPOY";
    pub const SUCCESSFUL: &str = "Successful";
    pub const NOTE: &str = "Note";
    pub const STATUS: &str = "Status";

    pub const ESTIMATED_SEASONS: &str = "Estimated_Seasons";
    pub const SUCCESS_SCORE: &str = "Success_Score";
    pub const PERFORMANCE_SCORE: &str = "Performance_Score";

    /// The field whose presence marks a row scraped by earlier tooling.
    pub const PRIMARY: &str = CAREER_AV;

    /// Columns overwritten by one enrichment pass, in output order.
    pub const ENRICHMENT: &[&str] = &[
        CAREER_AV,
        GAMES_PLAYED,
        RECEPTIONS,
        RECEIVING_YARDS,
        RECEIVING_TDS,
        REC_PER_GAME,
        YARDS_PER_GAME,
        TD_PER_GAME,
        SEASONS_PLAYED,
        THOUSAND_YARD_SEASONS,
        PRO_BOWLS,
        ALL_PROS,
        OPOY,
        SUCCESSFUL,
        NOTE,
        STATUS,
    ];
}

/// Per-row progress marker persisted in the `Status` column.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum EnrichmentStatus {
    #[default]
    Pending,
    Done,
    Failed,
}

/// Typed view of one table row.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayerRecord {
    pub player_id: String,
    pub player: Option<String>,
    pub year: Option<i32>,
    pub round: Option<u32>,
    pub pick: Option<u32>,
    pub team: Option<String>,
    pub college: Option<String>,
    pub career_av: Option<i64>,
    pub games_played: Option<i64>,
    pub receptions: Option<i64>,
    pub receiving_yards: Option<i64>,
    pub receiving_tds: Option<i64>,
    pub rec_per_game: Option<f64>,
    pub yards_per_game: Option<f64>,
    pub td_per_game: Option<f64>,
    pub seasons_played: Option<u32>,
    pub thousand_yard_seasons: Option<u32>,
    pub pro_bowls: Option<u32>,
    pub all_pros: Option<u32>,
    pub opoy: Option<bool>,
    pub successful: Option<bool>,
    pub awards: Option<String>,
    pub note: Option<String>,
    pub status: EnrichmentStatus,
}

impl PlayerRecord {
    /// Read row `row` of `table`. Missing columns and unparsable cells read as `None`.
    pub fn from_row(table: &Table, row: usize) -> Self {
        use columns::*;

        let text = |name: &str| table.get(row, name).and_then(non_empty).map(str::to_string);
        let int = |name: &str| table.get(row, name).and_then(parse_int);
        let count = |name: &str| int(name).and_then(|v| u32::try_from(v).ok());
        let float = |name: &str| table.get(row, name).and_then(parse_float);
        let flag = |name: &str| table.get(row, name).and_then(parse_bool);

        Self {
            player_id: text(PLAYER_ID).unwrap_or_default(),
            player: text(PLAYER),
            year: int(YEAR).and_then(|v| i32::try_from(v).ok()),
            round: count(ROUND),
            pick: count(PICK),
            team: text(TEAM),
            college: text(COLLEGE),
            career_av: int(CAREER_AV),
            games_played: int(GAMES_PLAYED),
            receptions: int(RECEPTIONS),
            receiving_yards: int(RECEIVING_YARDS),
            receiving_tds: int(RECEIVING_TDS),
            rec_per_game: float(REC_PER_GAME),
            yards_per_game: float(YARDS_PER_GAME),
            td_per_game: float(TD_PER_GAME),
            seasons_played: count(SEASONS_PLAYED),
            thousand_yard_seasons: count(THOUSAND_YARD_SEASONS),
            pro_bowls: count(PRO_BOWLS),
            all_pros: count(ALL_PROS),
            opoy: flag(OPOY),
            successful: flag(SUCCESSFUL),
            awards: text(AWARDS),
            note: text(NOTE),
            status: table
                .get(row, STATUS)
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or_default(),
        }
    }

    /// Honors when all three honor columns are known.
    pub fn honors(&self) -> Option<Honors> {
        Some(Honors {
            pro_bowls: self.pro_bowls?,
            all_pros: self.all_pros?,
            opoy: self.opoy?,
        })
    }
}

/// Whether row `row` was already enriched, by status or by the legacy primary field.
pub fn is_row_complete(table: &Table, row: usize) -> bool {
    let done = table
        .get(row, columns::STATUS)
        .and_then(|s| s.trim().parse::<EnrichmentStatus>().ok())
        == Some(EnrichmentStatus::Done);
    done || table
        .get(row, columns::PRIMARY)
        .and_then(non_empty)
        .is_some()
}

/// Overwrite every enrichment column of `row` with `stats`.
pub fn write_stats(table: &mut Table, row: usize, stats: &PlayerStats) {
    use columns::*;

    let totals = &stats.totals;
    let honors = stats.honors;
    let status = if stats.status.is_complete() {
        EnrichmentStatus::Done
    } else {
        EnrichmentStatus::Failed
    };

    table.set(row, CAREER_AV, fmt_opt(totals.career_av));
    table.set(row, GAMES_PLAYED, fmt_opt(totals.games_played));
    table.set(row, RECEPTIONS, fmt_opt(totals.receptions));
    table.set(row, RECEIVING_YARDS, fmt_opt(totals.receiving_yards));
    table.set(row, RECEIVING_TDS, fmt_opt(totals.receiving_tds));
    table.set(row, REC_PER_GAME, fmt_opt(stats.per_game.receptions));
    table.set(row, YARDS_PER_GAME, fmt_opt(stats.per_game.yards));
    table.set(row, TD_PER_GAME, fmt_opt(stats.per_game.touchdowns));
    table.set(row, SEASONS_PLAYED, fmt_opt(totals.seasons_played));
    table.set(row, THOUSAND_YARD_SEASONS, fmt_opt(totals.thousand_yard_seasons));
    table.set(row, PRO_BOWLS, fmt_opt(honors.map(|h| h.pro_bowls)));
    table.set(row, ALL_PROS, fmt_opt(honors.map(|h| h.all_pros)));
    table.set(row, OPOY, fmt_bool(honors.map(|h| h.opoy)));
    table.set(row, SUCCESSFUL, fmt_bool(stats.successful));
    table.set(row, NOTE, stats.note.as_str());
    table.set(row, STATUS, status.to_string());
}

/// Mark `row` failed without touching anything but the note and status.
pub fn mark_failed(table: &mut Table, row: usize, note: &str) {
    table.set(row, columns::NOTE, note);
    table.set(row, columns::STATUS, EnrichmentStatus::Failed.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CareerTotals, FetchStatus, PerGameRates};

    fn table() -> Table {
        Table::from_reader(
            "Player_ID,Career_AV,Games_Played,OPOY,Status\n\
             AAA,45.0,70,True,\n\
             BBB,N/A,,,\n\
             CCC,,,,done\n\
             DDD,,,,FAILED\n"
                .as_bytes(),
        )
        .unwrap()
    }

    #[test]
    fn test_completion_by_primary_field_or_status() {
        let table = table();
        assert!(is_row_complete(&table, 0));
        assert!(!is_row_complete(&table, 1));
        assert!(is_row_complete(&table, 2));
        assert!(!is_row_complete(&table, 3));
    }

    #[test]
    fn test_record_parses_legacy_cells() {
        let record = PlayerRecord::from_row(&table(), 0);
        assert_eq!(record.player_id, "AAA");
        assert_eq!(record.career_av, Some(45));
        assert_eq!(record.games_played, Some(70));
        assert_eq!(record.opoy, Some(true));
        assert_eq!(record.status, EnrichmentStatus::Pending);
        assert_eq!(record.pro_bowls, None);
        assert_eq!(record.honors(), None);
    }

    #[test]
    fn test_write_stats_clears_stale_values() {
        let mut table = table();
        table.set(3, columns::RECEPTIONS, "999");

        let stats = PlayerStats {
            status: FetchStatus::TableNotFound,
            note: "Table not found".to_string(),
            totals: CareerTotals::default(),
            per_game: PerGameRates::default(),
            honors: Some(Honors {
                pro_bowls: 1,
                all_pros: 0,
                opoy: false,
            }),
            successful: None,
        };
        write_stats(&mut table, 3, &stats);

        assert_eq!(table.get(3, columns::RECEPTIONS), Some(""));
        assert_eq!(table.get(3, columns::PRO_BOWLS), Some("1"));
        assert_eq!(table.get(3, columns::OPOY), Some("False"));
        assert_eq!(table.get(3, columns::STATUS), Some("DONE"));
        assert!(is_row_complete(&table, 3));
    }
}
