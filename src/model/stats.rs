use serde::Serialize;

/// Outcome of fetching one player page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FetchResult {
    /// The site answered 429. Nothing was parsed; the caller must back off.
    RateLimited { retry_after_secs: Option<u64> },
    /// The request completed, successfully or not.
    Fetched(PlayerStats),
}

impl FetchResult {
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, FetchResult::RateLimited { .. })
    }
}

/// How a fetch ended, in terms the batch loop can act on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display, strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FetchStatus {
    /// Season table parsed.
    Success,
    /// Table present but neither AV nor games could be read.
    NoData,
    /// The player page has no season table.
    TableNotFound,
    /// Non-success HTTP status other than 429.
    RequestFailed,
    /// The season table layout is not one the extractor understands.
    SchemaMismatch,
    /// Network or parse error.
    Error,
}

impl FetchStatus {
    /// Whether the row should be considered finished.
    ///
    /// Missing tables and empty tables are legitimate answers; request errors
    /// and layout breakage are worth another attempt.
    pub fn is_complete(self) -> bool {
        matches!(
            self,
            FetchStatus::Success | FetchStatus::NoData | FetchStatus::TableNotFound
        )
    }
}

/// Career sums over the kept season rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CareerTotals {
    pub career_av: Option<i64>,
    pub games_played: Option<i64>,
    pub receptions: Option<i64>,
    pub receiving_yards: Option<i64>,
    pub receiving_tds: Option<i64>,
    pub seasons_played: Option<u32>,
    pub thousand_yard_seasons: Option<u32>,
}

/// Career totals divided by games played, rounded to two decimals.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerGameRates {
    pub receptions: Option<f64>,
    pub yards: Option<f64>,
    pub touchdowns: Option<f64>,
}

impl PerGameRates {
    /// Derive rates from totals. All rates are `None` unless games played is positive.
    pub fn from_totals(totals: &CareerTotals) -> Self {
        match totals.games_played {
            Some(games) if games > 0 => {
                let rate =
                    |stat: Option<i64>| Some(round2(stat.unwrap_or(0) as f64 / games as f64));
                Self {
                    receptions: rate(totals.receptions),
                    yards: rate(totals.receiving_yards),
                    touchdowns: rate(totals.receiving_tds),
                }
            }
            _ => Self::default(),
        }
    }
}

/// Pro Bowl, All-Pro and Offensive Player of the Year recognition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Honors {
    pub pro_bowls: u32,
    pub all_pros: u32,
    pub opoy: bool,
}

/// Everything parsed from one player page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub status: FetchStatus,
    pub note: String,
    pub totals: CareerTotals,
    pub per_game: PerGameRates,
    /// `None` only when the page could not be read at all.
    pub honors: Option<Honors>,
    pub successful: Option<bool>,
}

impl PlayerStats {
    /// A result with every field empty.
    pub fn empty(status: FetchStatus, note: impl Into<String>) -> Self {
        Self {
            status,
            note: note.into(),
            totals: CareerTotals::default(),
            per_game: PerGameRates::default(),
            honors: None,
            successful: None,
        }
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_need_positive_games() {
        let totals = CareerTotals {
            receptions: Some(80),
            receiving_yards: Some(1000),
            receiving_tds: Some(8),
            games_played: Some(0),
            ..Default::default()
        };
        assert_eq!(PerGameRates::from_totals(&totals), PerGameRates::default());

        let totals = CareerTotals {
            games_played: None,
            ..totals
        };
        assert_eq!(PerGameRates::from_totals(&totals), PerGameRates::default());
    }

    #[test]
    fn test_rates_round_and_treat_missing_stat_as_zero() {
        let totals = CareerTotals {
            games_played: Some(3),
            receptions: Some(10),
            receiving_yards: Some(200),
            receiving_tds: None,
            ..Default::default()
        };
        let rates = PerGameRates::from_totals(&totals);
        assert_eq!(rates.receptions, Some(3.33));
        assert_eq!(rates.yards, Some(66.67));
        assert_eq!(rates.touchdowns, Some(0.0));
    }

    #[test]
    fn test_status_completion() {
        assert!(FetchStatus::TableNotFound.is_complete());
        assert!(!FetchStatus::RequestFailed.is_complete());
        assert_eq!(FetchStatus::SchemaMismatch.to_string(), "schema_mismatch");
    }
}
