//! Success classification.
//!
//! Different generations of the dataset used different cutoffs, so the rule is
//! a setting rather than a constant. Both shapes are supported.

use serde::{Deserialize, Serialize};

/// Rule deciding whether a player's career counts as successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuccessPolicy {
    /// Per-game production, or career AV, or Pro Bowls.
    Blended(BlendedThresholds),
    /// A minimum number of career criteria.
    Criteria(CriteriaThresholds),
}

impl Default for SuccessPolicy {
    fn default() -> Self {
        SuccessPolicy::Blended(BlendedThresholds::default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendedThresholds {
    pub rec_per_game: f64,
    pub yards_per_game: f64,
    pub td_per_game: f64,
    /// How many of the three per-game thresholds must hold.
    pub min_per_game_hits: usize,
    pub career_av: Option<i64>,
    pub pro_bowls: Option<u32>,
}

impl Default for BlendedThresholds {
    fn default() -> Self {
        Self {
            rec_per_game: 4.5,
            yards_per_game: 55.0,
            td_per_game: 0.3,
            min_per_game_hits: 2,
            career_av: Some(40),
            pro_bowls: Some(2),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CriteriaThresholds {
    pub career_av: i64,
    pub games_played: i64,
    pub estimated_seasons: u32,
    pub pro_bowls: u32,
    pub all_pros: u32,
    pub thousand_yard_seasons: u32,
    pub min_hits: usize,
}

impl Default for CriteriaThresholds {
    fn default() -> Self {
        Self {
            career_av: 40,
            games_played: 65,
            estimated_seasons: 5,
            pro_bowls: 2,
            all_pros: 1,
            thousand_yard_seasons: 2,
            min_hits: 2,
        }
    }
}

/// The numbers a policy looks at. Missing values never satisfy a threshold.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuccessInputs {
    pub career_av: Option<i64>,
    pub games_played: Option<i64>,
    pub rec_per_game: Option<f64>,
    pub yards_per_game: Option<f64>,
    pub td_per_game: Option<f64>,
    pub estimated_seasons: Option<u32>,
    pub pro_bowls: u32,
    pub all_pros: u32,
    pub thousand_yard_seasons: Option<u32>,
}

impl SuccessPolicy {
    /// Classify a career. The blended rule has no answer without games played.
    pub fn classify(&self, inputs: &SuccessInputs) -> Option<bool> {
        match self {
            SuccessPolicy::Blended(t) => {
                if inputs.games_played.unwrap_or(0) <= 0 {
                    return None;
                }
                let meets = |value: Option<f64>, cutoff: f64| value.is_some_and(|v| v >= cutoff);
                let per_game_hits = [
                    meets(inputs.rec_per_game, t.rec_per_game),
                    meets(inputs.yards_per_game, t.yards_per_game),
                    meets(inputs.td_per_game, t.td_per_game),
                ]
                .into_iter()
                .filter(|hit| *hit)
                .count();

                let av_hit = t
                    .career_av
                    .is_some_and(|cutoff| inputs.career_av.is_some_and(|av| av >= cutoff));
                let pro_bowl_hit = t.pro_bowls.is_some_and(|cutoff| inputs.pro_bowls >= cutoff);

                Some(per_game_hits >= t.min_per_game_hits || av_hit || pro_bowl_hit)
            }
            SuccessPolicy::Criteria(t) => {
                let hits = [
                    inputs.career_av.unwrap_or(0) >= t.career_av,
                    inputs.games_played.unwrap_or(0) >= t.games_played,
                    inputs.estimated_seasons.unwrap_or(0) >= t.estimated_seasons,
                    inputs.pro_bowls >= t.pro_bowls,
                    inputs.all_pros >= t.all_pros,
                    inputs.thousand_yard_seasons.unwrap_or(0) >= t.thousand_yard_seasons,
                ]
                .into_iter()
                .filter(|hit| *hit)
                .count();
                Some(hits >= t.min_hits)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_two_of_six() {
        let policy = SuccessPolicy::Criteria(CriteriaThresholds::default());
        let inputs = SuccessInputs {
            career_av: Some(45),
            games_played: Some(70),
            pro_bowls: 1,
            ..Default::default()
        };
        assert_eq!(policy.classify(&inputs), Some(true));

        let inputs = SuccessInputs {
            games_played: Some(60),
            ..inputs
        };
        assert_eq!(policy.classify(&inputs), Some(false));
    }

    #[test]
    fn test_blended_per_game_hits() {
        let policy = SuccessPolicy::default();
        let inputs = SuccessInputs {
            career_av: Some(20),
            games_played: Some(40),
            rec_per_game: Some(5.0),
            yards_per_game: Some(60.0),
            td_per_game: Some(0.1),
            ..Default::default()
        };
        assert_eq!(policy.classify(&inputs), Some(true));

        let inputs = SuccessInputs {
            yards_per_game: Some(40.0),
            ..inputs
        };
        assert_eq!(policy.classify(&inputs), Some(false));
    }

    #[test]
    fn test_blended_career_shortcuts() {
        let policy = SuccessPolicy::default();
        let base = SuccessInputs {
            games_played: Some(10),
            ..Default::default()
        };
        let by_av = SuccessInputs {
            career_av: Some(40),
            ..base.clone()
        };
        let by_pro_bowls = SuccessInputs {
            pro_bowls: 2,
            ..base.clone()
        };
        assert_eq!(policy.classify(&base), Some(false));
        assert_eq!(policy.classify(&by_av), Some(true));
        assert_eq!(policy.classify(&by_pro_bowls), Some(true));
    }

    #[test]
    fn test_blended_needs_games() {
        let policy = SuccessPolicy::default();
        let inputs = SuccessInputs {
            career_av: Some(90),
            games_played: Some(0),
            ..Default::default()
        };
        assert_eq!(policy.classify(&inputs), None);
    }

    #[test]
    fn test_policy_from_yaml() {
        let policy: SuccessPolicy =
            serde_yaml::from_str("kind: criteria\nmin_hits: 3\n").unwrap();
        match policy {
            SuccessPolicy::Criteria(t) => {
                assert_eq!(t.min_hits, 3);
                assert_eq!(t.games_played, 65);
            }
            other => panic!("unexpected policy {other:?}"),
        }
    }
}
