//! Offline scoring of an enriched table.
//!
//! Adds `Estimated_Seasons`, `Success_Score` and `Performance_Score` columns
//! and recomputes `Successful` under the scoring policy. No network access.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::model::{columns, round2, Honors, PlayerRecord};
use crate::policy::{CriteriaThresholds, SuccessInputs, SuccessPolicy};
use crate::scraper::honors::parse_awards_summary;
use crate::table::{fmt_bool, Table};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringSettings {
    /// Rule behind the recomputed `Successful` column.
    pub success: SuccessPolicy,
    pub weights: SuccessScoreWeights,
    pub performance: PerformanceScale,
    /// Games making up one estimated season.
    pub games_per_season: f64,
}

impl Default for ScoringSettings {
    fn default() -> Self {
        Self {
            success: SuccessPolicy::Criteria(CriteriaThresholds::default()),
            weights: SuccessScoreWeights::default(),
            performance: PerformanceScale::default(),
            games_per_season: 16.0,
        }
    }
}

/// Points per unit of each career input to `Success_Score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuccessScoreWeights {
    pub career_av: f64,
    pub games: f64,
    pub season: f64,
    pub all_pro: f64,
    pub pro_bowl: f64,
    pub opoy: f64,
    /// Flat bonus for at least `thousand_yard_seasons` such seasons.
    pub thousand_yard_bonus: f64,
    pub thousand_yard_seasons: u32,
}

impl Default for SuccessScoreWeights {
    fn default() -> Self {
        Self {
            career_av: 1.5,
            games: 0.4,
            season: 5.0,
            all_pro: 15.0,
            pro_bowl: 8.0,
            opoy: 15.0,
            thousand_yard_bonus: 10.0,
            thousand_yard_seasons: 2,
        }
    }
}

/// A value's ceiling and its share of `Performance_Score`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scaled {
    pub max: f64,
    pub weight: f64,
}

impl Scaled {
    const fn new(max: f64, weight: f64) -> Self {
        Self { max, weight }
    }

    fn contribution(self, value: f64) -> f64 {
        if self.max == 0.0 {
            return 0.0;
        }
        self.weight * value / self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceScale {
    pub rec_per_game: Scaled,
    pub yards_per_game: Scaled,
    pub td_per_game: Scaled,
    pub career_av: Scaled,
    pub pro_bowls: Scaled,
    pub all_pros: Scaled,
}

impl Default for PerformanceScale {
    fn default() -> Self {
        Self {
            rec_per_game: Scaled::new(10.0, 0.2),
            yards_per_game: Scaled::new(100.0, 0.3),
            td_per_game: Scaled::new(1.0, 0.2),
            career_av: Scaled::new(120.0, 0.15),
            pro_bowls: Scaled::new(5.0, 0.1),
            all_pros: Scaled::new(3.0, 0.05),
        }
    }
}

/// Seasons implied by games played: at least one for anyone who played.
pub fn estimated_seasons(games_played: Option<i64>, games_per_season: f64) -> u32 {
    match games_played {
        Some(games) if games > 0 && games_per_season > 0.0 => {
            let seasons = (games as f64 / games_per_season).round_ties_even() as u32;
            seasons.max(1)
        }
        _ => 0,
    }
}

/// Honors of a record, falling back to its `Awards` summary when the honor
/// columns were never filled.
pub fn resolve_honors(record: &PlayerRecord) -> Honors {
    let unknown = record.pro_bowls.is_none() && record.all_pros.is_none() && record.opoy.is_none();
    match (&record.awards, unknown) {
        (Some(awards), true) => parse_awards_summary(awards),
        _ => Honors {
            pro_bowls: record.pro_bowls.unwrap_or(0),
            all_pros: record.all_pros.unwrap_or(0),
            opoy: record.opoy.unwrap_or(false),
        },
    }
}

pub fn success_score(
    record: &PlayerRecord,
    honors: Honors,
    seasons: u32,
    weights: &SuccessScoreWeights,
) -> f64 {
    let mut score = record.career_av.unwrap_or(0) as f64 * weights.career_av
        + record.games_played.unwrap_or(0) as f64 * weights.games
        + f64::from(seasons) * weights.season
        + f64::from(honors.all_pros) * weights.all_pro
        + f64::from(honors.pro_bowls) * weights.pro_bowl;
    if honors.opoy {
        score += weights.opoy;
    }
    if record.thousand_yard_seasons.unwrap_or(0) >= weights.thousand_yard_seasons {
        score += weights.thousand_yard_bonus;
    }
    round2(score)
}

/// Weighted share of each value's ceiling, on a 0 to 100 scale.
pub fn performance_score(record: &PlayerRecord, honors: Honors, scale: &PerformanceScale) -> f64 {
    let parts = [
        scale.rec_per_game.contribution(record.rec_per_game.unwrap_or(0.0)),
        scale.yards_per_game.contribution(record.yards_per_game.unwrap_or(0.0)),
        scale.td_per_game.contribution(record.td_per_game.unwrap_or(0.0)),
        scale.career_av.contribution(record.career_av.unwrap_or(0) as f64),
        scale.pro_bowls.contribution(f64::from(honors.pro_bowls)),
        scale.all_pros.contribution(f64::from(honors.all_pros)),
    ];
    round2(100.0 * parts.iter().sum::<f64>())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScoreReport {
    pub scored: usize,
    pub successful: usize,
}

/// Score every row of `table` in place.
#[instrument(skip_all, fields(rows = table.len()))]
pub fn score_table(table: &mut Table, settings: &ScoringSettings) -> ScoreReport {
    let mut report = ScoreReport::default();

    for row in 0..table.len() {
        let record = PlayerRecord::from_row(table, row);
        let honors = resolve_honors(&record);
        let seasons = estimated_seasons(record.games_played, settings.games_per_season);

        let successful = settings.success.classify(&SuccessInputs {
            career_av: record.career_av,
            games_played: record.games_played,
            rec_per_game: record.rec_per_game,
            yards_per_game: record.yards_per_game,
            td_per_game: record.td_per_game,
            estimated_seasons: Some(seasons),
            pro_bowls: honors.pro_bowls,
            all_pros: honors.all_pros,
            thousand_yard_seasons: record.thousand_yard_seasons,
        });
        let success = success_score(&record, honors, seasons, &settings.weights);
        let performance = performance_score(&record, honors, &settings.performance);

        debug!(row, player_id = %record.player_id, success, performance, "scored row");
        table.set(row, columns::ESTIMATED_SEASONS, seasons.to_string());
        table.set(row, columns::SUCCESS_SCORE, success.to_string());
        table.set(row, columns::PERFORMANCE_SCORE, performance.to_string());
        table.set(row, columns::SUCCESSFUL, fmt_bool(successful));

        report.scored += 1;
        if successful == Some(true) {
            report.successful += 1;
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PlayerRecord {
        PlayerRecord {
            player_id: "HopkDe00".to_string(),
            career_av: Some(80),
            games_played: Some(100),
            rec_per_game: Some(6.0),
            yards_per_game: Some(80.0),
            td_per_game: Some(0.5),
            thousand_yard_seasons: Some(3),
            pro_bowls: Some(3),
            all_pros: Some(1),
            opoy: Some(false),
            ..Default::default()
        }
    }

    #[test]
    fn test_estimated_seasons() {
        assert_eq!(estimated_seasons(Some(0), 16.0), 0);
        assert_eq!(estimated_seasons(None, 16.0), 0);
        assert_eq!(estimated_seasons(Some(3), 16.0), 1);
        assert_eq!(estimated_seasons(Some(24), 16.0), 2);
        assert_eq!(estimated_seasons(Some(40), 16.0), 2);
        assert_eq!(estimated_seasons(Some(100), 16.0), 6);
    }

    #[test]
    fn test_success_score() {
        let record = record();
        let honors = resolve_honors(&record);
        let score = success_score(&record, honors, 6, &SuccessScoreWeights::default());
        // 120 + 40 + 30 + 15 + 24 + 10
        assert_eq!(score, 239.0);

        let opoy = Honors {
            opoy: true,
            ..honors
        };
        assert_eq!(
            success_score(&record, opoy, 6, &SuccessScoreWeights::default()),
            254.0
        );
    }

    #[test]
    fn test_performance_score() {
        let record = record();
        let honors = resolve_honors(&record);
        let score = performance_score(&record, honors, &PerformanceScale::default());
        // 12 + 24 + 10 + 10 + 6 + 1.67
        assert_eq!(score, 63.67);

        let empty = PlayerRecord::default();
        assert_eq!(
            performance_score(&empty, Honors::default(), &PerformanceScale::default()),
            0.0
        );
    }

    #[test]
    fn test_awards_fallback() {
        let record = PlayerRecord {
            awards: Some("PB PB AP-1 OPoY".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_honors(&record),
            Honors {
                pro_bowls: 2,
                all_pros: 1,
                opoy: true
            }
        );

        let filled = PlayerRecord {
            pro_bowls: Some(0),
            ..record
        };
        assert_eq!(resolve_honors(&filled).pro_bowls, 0);
    }

    #[test]
    fn test_score_table_adds_columns() {
        let mut table = Table::from_reader(
            "Player_ID,Career_AV,Games_Played,Pro_Bowls,All_Pros,OPOY,Successful\n\
             AAA,45,70,1,0,False,\n\
             BBB,10,20,0,0,False,True\n\
             CCC,,,,,,\n"
                .as_bytes(),
        )
        .unwrap();

        let report = score_table(&mut table, &ScoringSettings::default());

        assert_eq!(report.scored, 3);
        assert_eq!(report.successful, 1);
        assert_eq!(table.get(0, columns::SUCCESSFUL), Some("True"));
        assert_eq!(table.get(0, columns::ESTIMATED_SEASONS), Some("4"));
        assert_eq!(table.get(1, columns::SUCCESSFUL), Some("False"));
        assert_eq!(table.get(2, columns::ESTIMATED_SEASONS), Some("0"));
        assert_eq!(table.get(2, columns::SUCCESS_SCORE), Some("0"));
    }
}
