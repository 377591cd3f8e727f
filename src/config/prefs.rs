//! 键值偏好存储（JSON 文件），保存重绑定的触发键和当前递增费用

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

pub const PREFS_REROLL_KEY: &str = "ItemReroll.RerollKey";
pub const PREFS_REROLL_COST: &str = "ItemReroll.RerollCost";

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("could not access preference store: {0}")]
    Io(#[from] std::io::Error),
    #[error("preference store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl PreferenceStore {
    /// 文件不存在时返回空存储；保存时再创建
    pub fn open(path: &Path) -> Result<Self, PrefsError> {
        let values = if path.exists() {
            let text = fs::read_to_string(path)?;
            if text.trim().is_empty() {
                Map::new()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            Map::new()
        };
        Ok(Self {
            path: Some(path.to_path_buf()),
            values,
        })
    }

    /// 不落盘的存储
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        self.values.get(key).and_then(Value::as_i64)
    }

    pub fn set_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_string(), Value::String(value.to_string()));
    }

    pub fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), Value::from(value));
    }

    pub fn save(&self) -> Result<(), PrefsError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }
        let text = serde_json::to_string_pretty(&self.values)?;
        fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_survive_a_save_and_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut store = PreferenceStore::open(&path).unwrap();
        assert!(!store.has_key(PREFS_REROLL_COST));
        store.set_int(PREFS_REROLL_COST, 2100);
        store.set_string(PREFS_REROLL_KEY, "F10");
        store.save().unwrap();

        let reopened = PreferenceStore::open(&path).unwrap();
        assert_eq!(reopened.get_int(PREFS_REROLL_COST), Some(2100));
        assert_eq!(reopened.get_string(PREFS_REROLL_KEY), Some("F10"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(PreferenceStore::open(&path), Err(PrefsError::Json(_))));
    }

    #[test]
    fn in_memory_store_never_touches_disk() {
        let mut store = PreferenceStore::in_memory();
        store.set_int(PREFS_REROLL_COST, 5);
        assert!(store.save().is_ok());
        assert_eq!(store.get_int(PREFS_REROLL_COST), Some(5));
    }
}
