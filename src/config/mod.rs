pub mod keys;
pub mod names;
pub mod prefs;
pub mod settings;

use std::path::{Path, PathBuf};

use bevy::prelude::*;

pub use keys::KeyName;
pub use names::HostNames;
pub use prefs::PreferenceStore;
pub use settings::RerollConfig;

pub const CONFIG_FILE: &str = "ItemReroll.toml";
pub const PREFS_FILE: &str = "ItemReroll.prefs.json";

/// 配置文件与偏好存储的位置
#[derive(Resource, Debug, Clone)]
pub struct StoragePaths {
    pub config: PathBuf,
    pub prefs: PathBuf,
}

impl StoragePaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            config: dir.join(CONFIG_FILE),
            prefs: dir.join(PREFS_FILE),
        }
    }
}
