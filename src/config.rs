//! Runtime settings.
//!
//! Every pacing interval, threshold and score weight is a setting with a
//! default. A YAML file may override any subset; CLI flags override the file.
//!
//! ```yaml
//! http:
//!   user_agent: "Mozilla/5.0"
//! batch:
//!   delay_ms: 3000
//!   rate_limit:
//!     policy: cooldown
//!     cooldown_secs: [300, 900]
//! success:
//!   kind: blended
//!   rec_per_game: 5.0
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{Result, ScrapeError};
use crate::policy::SuccessPolicy;
use crate::score::ScoringSettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub http: HttpSettings,
    pub batch: BatchSettings,
    pub draft: DraftSettings,
    /// Rule applied to freshly fetched stats.
    pub success: SuccessPolicy,
    pub scoring: ScoringSettings,
}

impl Settings {
    /// Load settings from `path`, or the defaults when no path is given.
    #[instrument]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let settings = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ScrapeError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                serde_yaml::from_str(&raw).map_err(|source| ScrapeError::Config {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            None => Self::default(),
        };
        settings.validate()?;
        debug!(?settings, "loaded settings");
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        self.batch.validate()?;
        if self.http.base_url.trim().is_empty() {
            return Err(ScrapeError::InvalidSetting {
                name: "http.base_url",
                reason: "must not be empty",
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub base_url: String,
    /// The site rejects clients that do not look like a browser.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.pro-football-reference.com".to_string(),
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 10,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// What the batch loop does when the site answers 429.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RateLimitPolicy {
    /// Save the table to the checkpoint file and stop.
    #[default]
    Abort,
    /// Sleep on an escalating schedule and retry the same player.
    Cooldown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub policy: RateLimitPolicy,
    /// Successive cooldowns; the last entry repeats.
    pub cooldown_secs: Vec<u64>,
    /// Consecutive cooldowns before giving up and aborting.
    pub max_cooldowns: usize,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            policy: RateLimitPolicy::Abort,
            cooldown_secs: vec![300, 900],
            max_cooldowns: 3,
        }
    }
}

impl RateLimitSettings {
    /// Cooldown before retry number `attempt` (zero based). A longer
    /// `Retry-After` from the server wins.
    pub fn cooldown(&self, attempt: usize, retry_after_secs: Option<u64>) -> Duration {
        let scheduled = self
            .cooldown_secs
            .get(attempt)
            .or(self.cooldown_secs.last())
            .copied()
            .unwrap_or_default();
        Duration::from_secs(scheduled.max(retry_after_secs.unwrap_or(0)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Write the checkpoint file after this many fetched rows.
    pub checkpoint_every: usize,
    /// Take the long idle pause after this many fetched rows. Zero disables it.
    pub idle_every: usize,
    pub idle_pause_secs: u64,
    /// Pause between fetched rows.
    pub delay_ms: u64,
    /// Upper bound of the random extra added to each pause.
    pub jitter_ms: u64,
    /// Fetch rows marked `FAILED` by an earlier run again.
    pub retry_failed: bool,
    pub rate_limit: RateLimitSettings,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            checkpoint_every: 20,
            idle_every: 70,
            idle_pause_secs: 300,
            delay_ms: 4500,
            jitter_ms: 500,
            retry_failed: true,
            rate_limit: RateLimitSettings::default(),
        }
    }
}

impl BatchSettings {
    pub fn validate(&self) -> Result<()> {
        if self.checkpoint_every == 0 {
            return Err(ScrapeError::InvalidSetting {
                name: "batch.checkpoint_every",
                reason: "must be at least 1",
            });
        }
        if self.rate_limit.policy == RateLimitPolicy::Cooldown
            && self.rate_limit.cooldown_secs.is_empty()
        {
            return Err(ScrapeError::InvalidSetting {
                name: "batch.rate_limit.cooldown_secs",
                reason: "the cooldown policy needs at least one interval",
            });
        }
        Ok(())
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    pub fn idle_pause(&self) -> Duration {
        Duration::from_secs(self.idle_pause_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftSettings {
    pub position: String,
}

impl Default for DraftSettings {
    fn default() -> Self {
        Self {
            position: "WR".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings: Settings = serde_yaml::from_str(
            "batch:\n  delay_ms: 1000\n  rate_limit:\n    policy: cooldown\n",
        )
        .unwrap();

        assert_eq!(settings.batch.delay(), Duration::from_millis(1000));
        assert_eq!(settings.batch.checkpoint_every, 20);
        assert_eq!(settings.batch.rate_limit.policy, RateLimitPolicy::Cooldown);
        assert_eq!(settings.batch.rate_limit.cooldown_secs, vec![300, 900]);
        assert_eq!(settings.http.user_agent, "Mozilla/5.0");
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_cooldown_schedule_escalates_and_repeats() {
        let rate_limit = RateLimitSettings::default();
        assert_eq!(rate_limit.cooldown(0, None), Duration::from_secs(300));
        assert_eq!(rate_limit.cooldown(1, None), Duration::from_secs(900));
        assert_eq!(rate_limit.cooldown(5, None), Duration::from_secs(900));
        assert_eq!(rate_limit.cooldown(0, Some(1200)), Duration::from_secs(1200));
    }

    #[test]
    fn test_validation() {
        let mut settings = Settings::default();
        settings.batch.checkpoint_every = 0;
        assert!(matches!(
            settings.validate(),
            Err(ScrapeError::InvalidSetting {
                name: "batch.checkpoint_every",
                ..
            })
        ));

        let mut settings = Settings::default();
        settings.batch.rate_limit.policy = RateLimitPolicy::Cooldown;
        settings.batch.rate_limit.cooldown_secs.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        fs::write(&path, "draft:\n  position: TE\nsuccess:\n  kind: criteria\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.draft.position, "TE");
        assert!(matches!(settings.success, SuccessPolicy::Criteria(_)));

        fs::write(&path, "batch: [not, a, map]\n").unwrap();
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(ScrapeError::Config { .. })
        ));
    }

    #[test]
    fn test_policy_names() {
        assert_eq!("COOLDOWN".parse::<RateLimitPolicy>().unwrap(), RateLimitPolicy::Cooldown);
        assert_eq!(RateLimitPolicy::Abort.to_string(), "abort");
    }
}
