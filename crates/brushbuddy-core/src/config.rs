//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Tick period and an optional replacement step catalog
//! - Default avatar and background track
//! - Display settings (ring radius, asset and track directories)
//!
//! Configuration is stored at `~/.config/brushbuddy/config.toml`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, Result};
use crate::presentation::{AvatarAssets, ProgressRing};
use crate::routine::StepCatalog;

/// Routine timing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutineConfig {
    /// Length of one countdown tick. 1000 for real seconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Replaces the built-in brushing steps when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_steps: Option<StepCatalog>,
}

/// Setup-phase defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SetupConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_track: Option<String>,
}

/// Display configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_ring_radius")]
    pub ring_radius: f64,
    #[serde(default = "default_asset_dir")]
    pub asset_dir: String,
    #[serde(default = "default_track_dir")]
    pub track_dir: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/brushbuddy/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub routine: RoutineConfig,
    #[serde(default)]
    pub setup: SetupConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

// Default functions
fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_ring_radius() -> f64 {
    ProgressRing::DEFAULT_RADIUS
}
fn default_asset_dir() -> String {
    "assets".into()
}
fn default_track_dir() -> String {
    "tracks".into()
}

impl Default for RoutineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            custom_steps: None,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            ring_radius: default_ring_radius(),
            asset_dir: default_asset_dir(),
            track_dir: default_track_dir(),
        }
    }
}

/// Returns `~/.config/brushbuddy[-dev]/`.
///
/// `BRUSHBUDDY_CONFIG_DIR` overrides the location outright; otherwise
/// `BRUSHBUDDY_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("BRUSHBUDDY_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("BRUSHBUDDY_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("brushbuddy-dev")
            } else {
                base_dir.join("brushbuddy")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn parse_leaf(
        key: &str,
        existing: Option<&serde_json::Value>,
        value: &str,
    ) -> Result<serde_json::Value, ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };
        let trimmed = value.trim();
        let parsed = match existing {
            Some(serde_json::Value::Bool(_)) => serde_json::Value::Bool(
                trimmed.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
            ),
            Some(serde_json::Value::Number(_)) => {
                if let Ok(n) = trimmed.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .and_then(serde_json::Number::from_f64)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                }
            }
            Some(serde_json::Value::Object(_)) | Some(serde_json::Value::Array(_)) => {
                serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()))?
            }
            // Unset optional keys: accept JSON for structured values.
            None if trimmed.starts_with('[') || trimmed.starts_with('{') => {
                serde_json::from_str(trimmed).map_err(|e| invalid(e.to_string()))?
            }
            _ if trimmed == "null" => serde_json::Value::Null,
            _ => serde_json::Value::String(value.into()),
        };
        Ok(parsed)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
        known_keys: &serde_json::Value,
    ) -> Result<(), ConfigError> {
        // Optional keys are skipped when unset, so check against a template
        // that has every key present.
        if key.is_empty() || Self::get_json_value_by_path(known_keys, key).is_none() {
            return Err(ConfigError::UnknownKey(key.to_string()));
        }

        let mut parts: Vec<&str> = key.split('.').collect();
        let leaf = parts.pop().ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let mut current = root;
        for part in parts {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
            current = obj
                .entry(part.to_string())
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
        }

        let obj = current
            .as_object_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
        let new_value = Self::parse_leaf(key, obj.get(leaf).filter(|v| !v.is_null()), value)?;
        obj.insert(leaf.to_string(), new_value);
        Ok(())
    }

    /// Every settable key, with optional ones shown as null.
    fn key_template() -> serde_json::Value {
        serde_json::json!({
            "routine": { "tick_interval_ms": 0, "custom_steps": null },
            "setup": { "default_avatar": null, "default_track": null },
            "display": { "ring_radius": 0, "asset_dir": "", "track_dir": "" },
        })
    }

    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk, writing the defaults out on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into())
            }
        };
        let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to an explicit path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.routine.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "routine.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            });
        }
        if !(self.display.ring_radius.is_finite() && self.display.ring_radius > 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "display.ring_radius".into(),
                message: "must be a positive number".into(),
            });
        }
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = match Self::get_json_value_by_path(&json, key) {
            Some(val) => val,
            None => {
                // Known but unset optional key.
                Self::get_json_value_by_path(&Self::key_template(), key)?;
                return Some("null".into());
            }
        };
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key, in memory. Call [`save`](Self::save) to
    /// persist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// or fails validation. The config is unchanged on error.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value, &Self::key_template())?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    pub fn catalog(&self) -> StepCatalog {
        self.routine.custom_steps.clone().unwrap_or_default()
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.routine.tick_interval_ms)
    }

    pub fn ring(&self) -> ProgressRing {
        ProgressRing::new(self.display.ring_radius)
    }

    pub fn assets(&self) -> AvatarAssets {
        AvatarAssets::new(&self.display.asset_dir)
    }

    pub fn track_dir(&self) -> PathBuf {
        PathBuf::from(&self.display.track_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.routine.tick_interval_ms, 1000);
        assert_eq!(parsed.display.ring_radius, 52.0);
        assert!(parsed.routine.custom_steps.is_none());
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: Config = toml::from_str("").unwrap();
        assert_eq!(cfg.display.asset_dir, "assets");
        assert_eq!(cfg.catalog().len(), 4);
    }

    #[test]
    fn get_nested_and_unset_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("routine.tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("display.track_dir").as_deref(), Some("tracks"));
        assert_eq!(cfg.get("setup.default_avatar").as_deref(), Some("null"));
        assert_eq!(cfg.get("nope"), None);
        assert_eq!(cfg.get(""), None);
    }

    #[test]
    fn set_values() {
        let mut cfg = Config::default();
        cfg.set("routine.tick_interval_ms", "250").unwrap();
        cfg.set("setup.default_avatar", "unicorn").unwrap();
        cfg.set("display.ring_radius", "60.5").unwrap();
        assert_eq!(cfg.tick_interval(), Duration::from_millis(250));
        assert_eq!(cfg.setup.default_avatar.as_deref(), Some("unicorn"));
        assert_eq!(cfg.ring().radius, 60.5);

        cfg.set("setup.default_avatar", "null").unwrap();
        assert!(cfg.setup.default_avatar.is_none());
    }

    #[test]
    fn set_rejects_unknown_or_invalid() {
        let mut cfg = Config::default();
        assert!(cfg.set("routine.nope", "1").is_err());
        assert!(cfg.set("routine.tick_interval_ms", "fast").is_err());
        assert!(cfg.set("routine.tick_interval_ms", "0").is_err());
        assert_eq!(cfg.routine.tick_interval_ms, 1000);
    }

    #[test]
    fn set_custom_steps_as_json() {
        let mut cfg = Config::default();
        cfg.set(
            "routine.custom_steps",
            r#"[{"title":"Quick","duration_secs":10,"visual_stage":2}]"#,
        )
        .unwrap();
        let catalog = cfg.catalog();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.get(0).unwrap().title, "Quick");

        assert!(cfg
            .set(
                "routine.custom_steps",
                r#"[{"title":"Bad","duration_secs":0,"visual_stage":2}]"#
            )
            .is_err());
        assert_eq!(cfg.catalog().len(), 1);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut cfg = Config::default();
        cfg.set("setup.default_track", "Fresh").unwrap();
        cfg.set(
            "routine.custom_steps",
            r#"[{"title":"One","description":"d","duration_secs":3,"visual_stage":1}]"#,
        )
        .unwrap();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.setup.default_track.as_deref(), Some("Fresh"));
        assert_eq!(loaded.catalog().get(0).unwrap().duration_secs, 3);
    }

    #[test]
    fn load_from_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg.routine.tick_interval_ms, 1000);
    }

    #[test]
    fn load_from_rejects_bad_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[routine]\ncustom_steps = []\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
