//! 可手工编辑的 TOML 配置；首次运行时带注释头写出默认值

use std::fs;
use std::path::Path;

use bevy::prelude::*;
use serde_derive::{Deserialize, Serialize};
use thiserror::Error;

use super::keys::KeyName;
use super::names::HostNames;
use crate::binder::hints::ResolutionHints;

const HEADER: &str = "\
# ItemReroll config (editable)
#   trigger_key        = \"F9\"   key that starts a reroll pass
#   cost_step          = 1000   added to the reroll cost after a successful pass
#   use_cost           = true   false disables charging (debug)
#   debug_currency     = false  true logs every currency binding step
#   fallback_base_cost = 100    base cost when no price source is installed
#   dummy_item_ids     = []     item ids that must never be rolled
#
# [currency] optional binding hints:
#   hint_type, hint_member, container, method_get, method_set, method_adjust
#
# [host.*] member names of the host object model; override for other host versions.

";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not access config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("could not write config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RerollConfig {
    pub trigger_key: String,
    pub cost_step: i64,
    pub use_cost: bool,
    pub debug_currency: bool,
    pub fallback_base_cost: i64,
    pub dummy_item_ids: Vec<i32>,
    pub currency: ResolutionHints,
    pub host: HostNames,
}

impl Default for RerollConfig {
    fn default() -> Self {
        Self {
            trigger_key: KeyName::default_trigger().to_string(),
            cost_step: 1000,
            use_cost: true,
            debug_currency: false,
            fallback_base_cost: 100,
            dummy_item_ids: Vec::new(),
            currency: ResolutionHints::default(),
            host: HostNames::default(),
        }
    }
}

impl RerollConfig {
    /// 读取配置；文件不存在时写出默认配置。返回值第二项表示是否新建
    pub fn load_or_create(path: &Path) -> Result<(Self, bool), ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok((config, true));
        }
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        Ok((config.sanitized(), false))
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let body = toml::to_string_pretty(self)?;
        fs::write(path, format!("{HEADER}{body}"))?;
        Ok(())
    }

    /// 非法值回落到默认值
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        match KeyName::parse(&self.trigger_key) {
            Ok(key) => self.trigger_key = key.to_string(),
            Err(e) => {
                warn!("config: {e}, falling back to {}", defaults.trigger_key);
                self.trigger_key = defaults.trigger_key;
            }
        }
        if self.cost_step < 0 {
            warn!("config: negative cost_step {}, using {}", self.cost_step, defaults.cost_step);
            self.cost_step = defaults.cost_step;
        }
        if self.fallback_base_cost < 0 {
            self.fallback_base_cost = defaults.fallback_base_cost;
        }
        self.currency = self.currency.normalized();
        self
    }

    pub fn trigger_key(&self) -> KeyName {
        KeyName::parse(&self.trigger_key).unwrap_or_else(|_| KeyName::default_trigger())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ItemReroll.toml");

        let (config, created) = RerollConfig::load_or_create(&path).unwrap();
        assert!(created);
        assert_eq!(config, RerollConfig::default());

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("# ItemReroll config"));

        let (again, created) = RerollConfig::load_or_create(&path).unwrap();
        assert!(!created);
        assert_eq!(again, config);
    }

    #[test]
    fn partial_file_keeps_defaults_and_ignores_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ItemReroll.toml");
        fs::write(
            &path,
            r#"
            trigger_key = "f10"
            cost_step = 250
            use_cost = false
            something_else = 3

            [currency]
            hint_member = "Money"
            container = "  "

            [host.container]
            inventory_type = "Game.Inventory"
            "#,
        )
        .unwrap();

        let (config, _) = RerollConfig::load_or_create(&path).unwrap();
        assert_eq!(config.trigger_key().as_str(), "F10");
        assert_eq!(config.cost_step, 250);
        assert!(!config.use_cost);
        assert_eq!(config.currency.member.as_deref(), Some("Money"));
        assert_eq!(config.currency.container, None);
        assert_eq!(config.host.container.inventory_type, "Game.Inventory");
        assert_eq!(config.host.container.remove_method, "RemoveAt");
        assert_eq!(config.host.catalog.factory_method, "InstantiateSync");
    }

    #[test]
    fn invalid_values_fall_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ItemReroll.toml");
        fs::write(&path, "trigger_key = \"Escape\"\ncost_step = -5\n").unwrap();

        let (config, _) = RerollConfig::load_or_create(&path).unwrap();
        assert_eq!(config.trigger_key, "F9");
        assert_eq!(config.cost_step, 1000);
    }

    #[test]
    fn rebind_key_is_not_a_trigger() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ItemReroll.toml");
        fs::write(&path, "trigger_key = \"insert\"\n").unwrap();

        let (config, _) = RerollConfig::load_or_create(&path).unwrap();
        assert_eq!(config.trigger_key, "F9");
    }

    #[test]
    fn saved_config_round_trips_hints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cfg").join("ItemReroll.toml");
        let mut config = RerollConfig::default();
        config.currency.type_name = Some("Wallet".into());
        config.dummy_item_ids = vec![999];
        config.save(&path).unwrap();

        let (loaded, _) = RerollConfig::load_or_create(&path).unwrap();
        assert_eq!(loaded.currency.type_name.as_deref(), Some("Wallet"));
        assert_eq!(loaded.dummy_item_ids, vec![999]);
    }
}
