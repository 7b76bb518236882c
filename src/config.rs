//! Typed configuration for the hosting process
//!
//! Loaded from a JSON file; every field has a default so a missing file
//! yields a working configuration. The role bindings feed the
//! [`RoleMap`](crate::rank::RoleMap) the service authorizes against.

use std::path::{Path, PathBuf};

use crate::rank::{RoleMap, StaffRank};
use crate::report::ReportPeriod;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Binds one external role id to a staff rank.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RoleBinding {
    pub role_id: String,
    pub rank: StaffRank,
}

/// Display names the host uses to find each rendering surface.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SurfaceNames {
    pub intake: String,
    pub in_progress: String,
    pub completed: String,
    pub billing: String,
    pub disputed: String,
}

impl Default for SurfaceNames {
    fn default() -> Self {
        Self {
            intake: "repair-requests".into(),
            in_progress: "workshop".into(),
            completed: "finished".into(),
            billing: "billing".into(),
            disputed: "disputes".into(),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ModerationSettings {
    pub banned_words: Vec<String>,
    pub max_message_frequency: usize,
    pub window_secs: u64,
    pub auto_mute_secs: u64,
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            banned_words: Vec::new(),
            max_message_frequency: 5,
            window_secs: 10,
            auto_mute_secs: 300,
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    pub enabled_periods: Vec<ReportPeriod>,
    pub channel: Option<String>,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            enabled_periods: vec![ReportPeriod::Daily],
            channel: None,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GarageConfig {
    pub db_path: Option<PathBuf>,
    pub surfaces: SurfaceNames,
    pub moderation: ModerationSettings,
    pub reports: ReportSettings,
    pub roles: Vec<RoleBinding>,
}

impl GarageConfig {
    /// Load from a JSON file; an absent file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn role_map(&self) -> RoleMap {
        self.roles
            .iter()
            .map(|b| (b.role_id.clone(), b.rank))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: GarageConfig = serde_json::from_str("{}").unwrap();

        assert_eq!(config.moderation.max_message_frequency, 5);
        assert_eq!(config.surfaces.intake, "repair-requests");
        assert!(config.roles.is_empty());
    }

    #[test]
    fn role_bindings_build_the_map() {
        let raw = r#"{
            "roles": [
                {"role_id": "role-1", "rank": "mechanic"},
                {"role_id": "role-2", "rank": "owner"}
            ]
        }"#;
        let config: GarageConfig = serde_json::from_str(raw).unwrap();
        let map = config.role_map();

        let ranks = map.resolve(&["role-2".into()]);
        assert!(ranks.contains(StaffRank::Owner));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = GarageConfig {
            moderation: ModerationSettings {
                banned_words: vec!["scam".into()],
                ..Default::default()
            },
            ..Default::default()
        };

        let raw = serde_json::to_string(&config).unwrap();
        let back: GarageConfig = serde_json::from_str(&raw).unwrap();

        assert_eq!(back.moderation.banned_words, vec!["scam".to_string()]);
    }
}
