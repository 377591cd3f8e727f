//! 从宿主内容目录构建物品目录：资产集合的 entries + 类型上的静态动态注册表

use bevy::prelude::*;
use thiserror::Error;

use super::catalog::ItemCatalog;
use super::dummy::DummyItemIds;
use super::schema::ItemEntry;
use crate::binder::TypeResolver;
use crate::config::names::CatalogNames;
use crate::host::{HostModel, HostValue, ObjectId, Target, TypeDesc};

/// 单个条目提取失败的原因
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    #[error("entry is not an object")]
    NotAnObject,
    #[error("entry has no positive id")]
    BadId,
    #[error("entry {0} has no prefab")]
    NoPrefab(i32),
    #[error("prefab of entry {0} carries no item component")]
    NoItemComponent(i32),
}

/// 加载统计
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub vanilla: usize,
    pub dynamic: usize,
    /// 结构不对或缺少图标 / 名字
    pub rejected: usize,
    /// 被占位 ID 列表拦下
    pub denied: usize,
    pub duplicates: usize,
}

pub struct CatalogLoader<'a> {
    names: &'a CatalogNames,
    dummy: &'a DummyItemIds,
}

#[derive(Clone, Copy)]
enum Source {
    Vanilla,
    Dynamic,
}

impl<'a> CatalogLoader<'a> {
    pub fn new(names: &'a CatalogNames, dummy: &'a DummyItemIds) -> Self {
        Self { names, dummy }
    }

    pub fn load(&self, host: &dyn HostModel, types: &mut TypeResolver) -> (ItemCatalog, LoadReport) {
        let mut catalog = ItemCatalog::default();
        let mut report = LoadReport::default();

        let Some(item_ty) = types.resolve(host, &self.names.item_type) else {
            warn!("item type {} not found, catalog is empty", self.names.item_type);
            return (catalog, report);
        };
        let Some(collection_ty) = types.resolve(host, &self.names.collection_type) else {
            warn!(
                "collection type {} not found, catalog is empty",
                self.names.collection_type
            );
            return (catalog, report);
        };

        match self.vanilla_entries(host, &collection_ty) {
            Some(entries) => {
                for entry in &entries {
                    self.admit(host, &item_ty, entry, Source::Vanilla, &mut catalog, &mut report);
                }
            }
            None => warn!("no {} asset with `{}`", collection_ty, self.names.entries_member),
        }

        match self.dynamic_entries(host, &collection_ty) {
            Some(entries) => {
                for entry in &entries {
                    self.admit(host, &item_ty, entry, Source::Dynamic, &mut catalog, &mut report);
                }
            }
            None => debug!("no dynamic registry `{}`", self.names.registry_member),
        }

        info!(
            "catalog loaded: {} ids (vanilla {}, dynamic {}, rejected {}, denied {}, duplicate {})",
            catalog.len(),
            report.vanilla,
            report.dynamic,
            report.rejected,
            report.denied,
            report.duplicates
        );
        (catalog, report)
    }

    fn vanilla_entries(&self, host: &dyn HostModel, collection_ty: &TypeDesc) -> Option<Vec<HostValue>> {
        let asset = host
            .assets()
            .into_iter()
            .find(|a| host.type_of(*a).is_ok_and(|t| &t == collection_ty))?;
        match host.read(Target::Instance(asset), &self.names.entries_member) {
            Ok(HostValue::List(entries)) => Some(entries),
            Ok(other) => {
                debug!("`{}` is a {:?}, not a list", self.names.entries_member, other.kind());
                None
            }
            Err(e) => {
                debug!("{e}");
                None
            }
        }
    }

    fn dynamic_entries(&self, host: &dyn HostModel, collection_ty: &TypeDesc) -> Option<Vec<HostValue>> {
        match host.read(Target::Static(collection_ty), &self.names.registry_member) {
            Ok(HostValue::Map(pairs)) => Some(pairs.into_iter().map(|(_, v)| v).collect()),
            Ok(HostValue::List(entries)) => Some(entries),
            _ => None,
        }
    }

    fn admit(
        &self,
        host: &dyn HostModel,
        item_ty: &TypeDesc,
        entry: &HostValue,
        source: Source,
        catalog: &mut ItemCatalog,
        report: &mut LoadReport,
    ) {
        let entry = match self.extract(host, item_ty, entry) {
            Ok(entry) => entry,
            Err(e) => {
                debug!("skip entry: {e}");
                report.rejected += 1;
                return;
            }
        };
        if !entry.valid {
            debug!("skip entry {} `{}`: missing icon or name", entry.id, entry.name);
            report.rejected += 1;
            return;
        }
        if !self.dummy.is_allowed(entry.id) {
            info!("dummy item {} `{}` skipped", entry.id, entry.name);
            report.denied += 1;
            return;
        }
        if !catalog.admit_entry(&entry) {
            report.duplicates += 1;
            return;
        }
        match source {
            Source::Vanilla => report.vanilla += 1,
            Source::Dynamic => report.dynamic += 1,
        }
    }

    /// 读取一个条目；图标 / 名字缺失不算错误，只让条目无效
    pub fn extract(
        &self,
        host: &dyn HostModel,
        item_ty: &TypeDesc,
        entry: &HostValue,
    ) -> Result<ItemEntry, EntryError> {
        let entry = entry.as_object().ok_or(EntryError::NotAnObject)?;
        let id = host
            .read(Target::Instance(entry), &self.names.entry_id_member)
            .ok()
            .and_then(|v| v.as_i64())
            .and_then(|v| i32::try_from(v).ok())
            .filter(|v| *v > 0)
            .ok_or(EntryError::BadId)?;

        let node = match host.read(Target::Instance(entry), &self.names.entry_prefab_member) {
            Ok(HostValue::Object(obj)) => host.owner(obj),
            Ok(HostValue::Node(node)) => Some(node),
            _ => None,
        }
        .ok_or(EntryError::NoPrefab(id))?;
        let item = host
            .component_of_type(node, item_ty)
            .ok_or(EntryError::NoItemComponent(id))?;

        Ok(self.describe(host, item, id))
    }

    fn describe(&self, host: &dyn HostModel, item: ObjectId, id: i32) -> ItemEntry {
        let read = |member: &str| host.read(Target::Instance(item), member).ok();
        let has_icon = read(&self.names.icon_property).is_some_and(|v| !v.is_null());
        let name = read(&self.names.display_name_property)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();
        let max_stack = read(&self.names.max_stack_property)
            .and_then(|v| v.as_i64())
            .map(|v| v.clamp(1, i32::MAX as i64) as i32)
            .unwrap_or(1);
        ItemEntry::new(id, name, max_stack, has_icon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sample::SampleWorld;

    fn load(world: SampleWorld, dummy: &[i32]) -> (ItemCatalog, LoadReport) {
        let (host, _) = world.build();
        let names = CatalogNames::default();
        let dummy = DummyItemIds::new(dummy.iter().copied());
        CatalogLoader::new(&names, &dummy).load(&host, &mut TypeResolver::new())
    }

    #[test]
    fn demo_world_loads_both_sources() {
        let (catalog, report) = load(SampleWorld::demo(), &[]);
        assert_eq!(catalog.ids(), &[101, 102, 103, 104, 105, 2001]);
        assert_eq!(catalog.max_stack(102), 5);
        // 动态注册表里的重复 ID 不覆盖原值
        assert_eq!(catalog.max_stack(101), 1);
        assert_eq!(
            report,
            LoadReport {
                vanilla: 5,
                dynamic: 1,
                rejected: 2,
                denied: 0,
                duplicates: 1,
            }
        );
    }

    #[test]
    fn dummy_ids_and_bad_ids_never_enter() {
        let world = SampleWorld::new()
            .entry(10, "A", 1)
            .entry(0, "Zero", 1)
            .entry(11, "Dummy", 1)
            .dynamic_entry(12, "B", 3);
        let (catalog, report) = load(world, &[11]);
        assert_eq!(catalog.ids(), &[10, 12]);
        assert_eq!(report.denied, 1);
        assert_eq!(report.rejected, 1);
        assert!(catalog.ids().iter().all(|id| *id > 0 && *id != 11));
    }

    #[test]
    fn loading_twice_gives_the_same_catalog() {
        let (host, _) = SampleWorld::demo().build();
        let names = CatalogNames::default();
        let dummy = DummyItemIds::default();
        let loader = CatalogLoader::new(&names, &dummy);
        let mut types = TypeResolver::new();
        let (first, _) = loader.load(&host, &mut types);
        let (second, _) = loader.load(&host, &mut types);
        assert_eq!(first, second);
    }

    #[test]
    fn missing_collection_degrades_to_empty() {
        let (catalog, report) = load(SampleWorld::new().entry(1, "A", 1).without_collection(), &[]);
        assert!(catalog.is_empty());
        assert_eq!(report, LoadReport::default());
    }

    #[test]
    fn entries_without_icon_or_name_are_rejected() {
        let world = SampleWorld::new()
            .hidden_entry(5, "Ghost")
            .entry(6, "", 1)
            .entry(7, "Real", 2);
        let (catalog, report) = load(world, &[]);
        assert_eq!(catalog.ids(), &[7]);
        assert_eq!(report.rejected, 2);
    }
}
