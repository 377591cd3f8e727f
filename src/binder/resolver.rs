use std::collections::HashMap;

use bevy::prelude::*;

use crate::host::{HostModel, TypeDesc};

/// 按短名或全限定名在所有已加载模块中查找类型
///
/// 只缓存命中结果：伴随模组可能晚于首次查询才加载，未命中每次都重新扫描。
#[derive(Debug, Default)]
pub struct TypeResolver {
    cache: HashMap<String, TypeDesc>,
}

impl TypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&mut self, host: &dyn HostModel, name: &str) -> Option<TypeDesc> {
        if let Some(hit) = self.cache.get(name) {
            return Some(hit.clone());
        }
        let found = find_type(host, name)?;
        self.cache.insert(name.to_string(), found.clone());
        Some(found)
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

/// 不带缓存的查找；单个模块枚举失败时跳过该模块
pub fn find_type(host: &dyn HostModel, name: &str) -> Option<TypeDesc> {
    if name.is_empty() {
        return None;
    }
    host.modules().into_iter().find_map(|module| match host.types_in(&module) {
        Ok(types) => types.into_iter().find(|t| t.matches_name(name)),
        Err(e) => {
            debug!("skip module {module}: {e}");
            None
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use crate::host::ValueKind;

    #[test]
    fn finds_by_short_and_full_name_skipping_broken_modules() {
        let mut host = MemoryHost::new();
        host.mark_module_broken("Broken");
        host.define_type("Game", "ItemStatsSystem.Item")
            .field("x", ValueKind::Int)
            .build();

        let mut types = TypeResolver::new();
        let by_short = types.resolve(&host, "Item").unwrap();
        let by_full = types.resolve(&host, "ItemStatsSystem.Item").unwrap();
        assert_eq!(by_short, by_full);
        assert_eq!(by_short.module, "Game");
        assert!(types.resolve(&host, "Inventory").is_none());
        assert!(types.resolve(&host, "").is_none());
    }

    #[test]
    fn late_loaded_types_are_found_after_a_miss() {
        let mut host = MemoryHost::new();
        let mut types = TypeResolver::new();
        assert!(types.resolve(&host, "SettingManager").is_none());

        host.define_type("Companion", "Lucky.SettingManager").build();
        assert!(types.resolve(&host, "SettingManager").is_some());
        assert_eq!(types.cached(), 1);
    }
}
