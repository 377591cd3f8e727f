//! 在不透明容器的同一槽位上把一个物品换成随机新物品

use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use crate::binder::{Indexed, TypeResolver};
use crate::config::names::{CatalogNames, ContainerNames};
use crate::data::{CatalogError, ItemCatalog};
use crate::host::{HostModel, HostValue, MemberShape, ObjectId, Target};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubstitutionError {
    #[error("type `{0}` is not loaded")]
    MissingType(String),
    #[error("item {0:?} is not in a container")]
    NoContainer(ObjectId),
    #[error("container has no slot for item {0:?}")]
    NoSlot(ObjectId),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("factory returned nothing for item {0}")]
    Instantiate(i32),
    #[error("removing slot {0} failed")]
    Remove(usize),
    #[error("inserting into slot {0} failed, container is one item short")]
    Insert(usize),
}

/// 宿主背包组件，按槽位操作
#[derive(Debug, Clone, Copy)]
pub struct ContainerHandle<'a> {
    pub inventory: ObjectId,
    names: &'a ContainerNames,
}

impl<'a> ContainerHandle<'a> {
    pub fn new(inventory: ObjectId, names: &'a ContainerNames) -> Self {
        Self { inventory, names }
    }

    fn call(&self, host: &mut dyn HostModel, method: &str, args: &[HostValue]) -> Option<HostValue> {
        match host.invoke(Target::Instance(self.inventory), method, args) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!("{method} failed: {e}");
                None
            }
        }
    }
}

impl Indexed for ContainerHandle<'_> {
    fn index_of(&self, host: &mut dyn HostModel, entity: ObjectId) -> Option<usize> {
        let index = self.call(host, &self.names.index_method, &[HostValue::Object(entity)])?;
        usize::try_from(index.as_i64()?).ok()
    }

    fn remove_at(&self, host: &mut dyn HostModel, index: usize) -> bool {
        let Ok(index) = i32::try_from(index) else {
            return false;
        };
        self.call(host, &self.names.remove_method, &[HostValue::Int(index)])
            .and_then(|v| v.as_bool())
            == Some(true)
    }

    fn insert_at(&self, host: &mut dyn HostModel, entity: ObjectId, index: usize) -> bool {
        let Ok(index) = i32::try_from(index) else {
            return false;
        };
        self.call(
            host,
            &self.names.insert_method,
            &[HostValue::Object(entity), HostValue::Int(index)],
        )
        .and_then(|v| v.as_bool())
            == Some(true)
    }
}

pub struct SubstitutionEngine<'a> {
    catalog_names: &'a CatalogNames,
    container_names: &'a ContainerNames,
}

impl<'a> SubstitutionEngine<'a> {
    pub fn new(catalog_names: &'a CatalogNames, container_names: &'a ContainerNames) -> Self {
        Self {
            catalog_names,
            container_names,
        }
    }

    /// 换掉一个物品，返回新物品。失败只影响这一个物品，不回滚
    pub fn reroll<R: Rng + ?Sized>(
        &self,
        host: &mut dyn HostModel,
        types: &mut TypeResolver,
        catalog: &ItemCatalog,
        rng: &mut R,
        item: ObjectId,
    ) -> Result<ObjectId, SubstitutionError> {
        let container = self.container_of(host, types, item)?;
        let slot = container
            .index_of(host, item)
            .ok_or(SubstitutionError::NoSlot(item))?;

        let id = catalog.random_identifier(rng)?;
        let fresh = self.instantiate(host, types, id)?;
        // 堆叠上限按新物品自报的类型 ID 查，读不到时用抽到的 ID
        let max_stack = catalog.max_stack(self.type_id_of(host, fresh).unwrap_or(id));
        if max_stack > 1 {
            let count = rng.gen_range(1..=max_stack);
            if !self.set_stack(host, fresh, count) {
                debug!("item {id} has no writable stack property");
            }
        }

        if !container.remove_at(host, slot) {
            discard(host, fresh);
            return Err(SubstitutionError::Remove(slot));
        }
        discard(host, item);
        if !container.insert_at(host, fresh, slot) {
            discard(host, fresh);
            return Err(SubstitutionError::Insert(slot));
        }
        Ok(fresh)
    }

    /// 物品节点的父节点必须挂着背包组件
    pub fn container_of(
        &self,
        host: &dyn HostModel,
        types: &mut TypeResolver,
        item: ObjectId,
    ) -> Result<ContainerHandle<'a>, SubstitutionError> {
        let inventory_ty = types
            .resolve(host, &self.container_names.inventory_type)
            .ok_or_else(|| {
                SubstitutionError::MissingType(self.container_names.inventory_type.clone())
            })?;
        host.owner(item)
            .and_then(|node| host.parent(node))
            .and_then(|parent| host.component_of_type(parent, &inventory_ty))
            .map(|inv| ContainerHandle::new(inv, self.container_names))
            .ok_or(SubstitutionError::NoContainer(item))
    }

    fn instantiate(
        &self,
        host: &mut dyn HostModel,
        types: &mut TypeResolver,
        id: i32,
    ) -> Result<ObjectId, SubstitutionError> {
        let collection_ty = types
            .resolve(host, &self.catalog_names.collection_type)
            .ok_or_else(|| {
                SubstitutionError::MissingType(self.catalog_names.collection_type.clone())
            })?;
        host.invoke(
            Target::Static(&collection_ty),
            &self.catalog_names.factory_method,
            &[HostValue::Int(id)],
        )
        .ok()
        .and_then(|v| v.as_object())
        .ok_or(SubstitutionError::Instantiate(id))
    }

    fn type_id_of(&self, host: &dyn HostModel, item: ObjectId) -> Option<i32> {
        host.read(Target::Instance(item), &self.catalog_names.type_id_property)
            .ok()?
            .as_i32()
    }

    /// 依次尝试可写的堆叠属性，写入第一个成功的
    fn set_stack(&self, host: &mut dyn HostModel, item: ObjectId, count: i32) -> bool {
        let Ok(ty) = host.type_of(item) else {
            return false;
        };
        for name in &self.catalog_names.stack_properties {
            let kinds: Vec<_> = host
                .members_named(&ty, name)
                .into_iter()
                .filter(|m| !m.is_static)
                .filter_map(|m| match m.shape {
                    MemberShape::Property { ty, can_write: true, .. } => Some(ty),
                    MemberShape::Field { ty, read_only: false } => Some(ty),
                    _ => None,
                })
                .collect();
            for kind in kinds {
                let Some(value) = kind.numeric_value(i64::from(count)) else {
                    continue;
                };
                if host.write(Target::Instance(item), name, value).is_ok() {
                    return true;
                }
            }
        }
        false
    }
}

fn discard(host: &mut dyn HostModel, obj: ObjectId) {
    if let Err(e) = host.destroy(obj) {
        debug!("could not destroy {obj:?}: {e}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use crate::host::sample::{SampleHandles, SampleWorld, item_id, stack};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn world() -> SampleWorld {
        SampleWorld::new()
            .entry(10, "Rope", 1)
            .entry(20, "Nails", 5)
            .entry(30, "Lamp", 1)
            .container("LootBox_Natural_1", &[10, 10, 10, 10])
    }

    fn catalog() -> ItemCatalog {
        ItemCatalog::from_pairs([(10, 1), (20, 5), (30, 1)])
    }

    fn live_items(host: &MemoryHost, handles: &SampleHandles) -> usize {
        host.instances_of(&handles.item_type).len()
    }

    /// 改写目录条目背后的预制体，工厂会照它复制
    fn set_prefab(host: &mut MemoryHost, handles: &SampleHandles, id: i32, member: &str, value: i32) {
        let collection = handles.collection.unwrap();
        let prefab = match host.get(collection, "entries") {
            Some(HostValue::List(entries)) => entries
                .iter()
                .filter_map(HostValue::as_object)
                .find(|e| host.get(*e, "typeID").and_then(HostValue::as_i32) == Some(id))
                .and_then(|e| host.get(e, "prefab"))
                .and_then(HostValue::as_object),
            _ => None,
        }
        .unwrap();
        host.set(prefab, member, value);
    }

    #[test]
    fn reroll_keeps_container_size_and_slot() {
        let (mut host, handles) = world().build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        let mut rng = StdRng::seed_from_u64(7);
        let mut types = TypeResolver::new();

        let before = handles.contents(&host, "LootBox_Natural_1");
        let fresh = engine
            .reroll(&mut host, &mut types, &catalog(), &mut rng, before[2])
            .unwrap();

        let after = handles.contents(&host, "LootBox_Natural_1");
        assert_eq!(after.len(), before.len());
        assert_eq!(after[2], fresh);
        assert_eq!(&after[..2], &before[..2]);
        assert!(!host.is_alive(before[2]));

        let id = item_id(&host, fresh).unwrap();
        assert!(catalog().contains(id));
        let count = stack(&host, fresh).unwrap();
        assert!((1..=i64::from(catalog().max_stack(id))).contains(&count));

        let node = handles.node("LootBox_Natural_1").unwrap();
        assert_eq!(host.owner(fresh).and_then(|n| host.parent(n)), Some(node));
    }

    #[test]
    fn failed_insert_leaves_container_one_short() {
        let (mut host, handles) = world().sealed("LootBox_Natural_1").build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        let mut rng = StdRng::seed_from_u64(7);

        let items_before = live_items(&host, &handles);
        let before = handles.contents(&host, "LootBox_Natural_1");
        let err = engine
            .reroll(&mut host, &mut TypeResolver::new(), &catalog(), &mut rng, before[1])
            .unwrap_err();
        assert_eq!(err, SubstitutionError::Insert(1));
        assert_eq!(handles.contents(&host, "LootBox_Natural_1").len(), before.len() - 1);
        assert!(!host.is_alive(before[1]));
        // 原物品和没放进去的新物品都已销毁
        assert_eq!(live_items(&host, &handles), items_before - 1);
    }

    #[test]
    fn failed_remove_keeps_the_original_in_place() {
        let (mut host, handles) = world().locked("LootBox_Natural_1").build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        let items_before = live_items(&host, &handles);

        let before = handles.contents(&host, "LootBox_Natural_1");
        let err = engine
            .reroll(
                &mut host,
                &mut TypeResolver::new(),
                &catalog(),
                &mut StdRng::seed_from_u64(3),
                before[2],
            )
            .unwrap_err();
        assert_eq!(err, SubstitutionError::Remove(2));
        assert_eq!(handles.contents(&host, "LootBox_Natural_1"), before);
        assert!(host.is_alive(before[2]));
        assert_eq!(live_items(&host, &handles), items_before);
    }

    #[test]
    fn item_missing_from_its_container_has_no_slot() {
        let (mut host, handles) = world().build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);

        // 节点仍挂在容器下，但背包列表里已经没有它
        let before = handles.contents(&host, "LootBox_Natural_1");
        let stray = before[3];
        let inv = handles.inventory("LootBox_Natural_1").unwrap();
        let listed: Vec<HostValue> = before[..3].iter().map(|o| HostValue::Object(*o)).collect();
        host.set(inv, "content", HostValue::List(listed));
        let items_before = live_items(&host, &handles);

        let err = engine
            .reroll(
                &mut host,
                &mut TypeResolver::new(),
                &catalog(),
                &mut StdRng::seed_from_u64(3),
                stray,
            )
            .unwrap_err();
        assert_eq!(err, SubstitutionError::NoSlot(stray));
        assert_eq!(handles.contents(&host, "LootBox_Natural_1"), &before[..3]);
        assert!(host.is_alive(stray));
        assert_eq!(live_items(&host, &handles), items_before);
    }

    #[test]
    fn factory_without_the_item_aborts_before_removal() {
        let (mut host, handles) = world().build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        let before = handles.contents(&host, "LootBox_Natural_1");

        let err = engine
            .reroll(
                &mut host,
                &mut TypeResolver::new(),
                &ItemCatalog::from_pairs([(77, 3)]),
                &mut StdRng::seed_from_u64(3),
                before[0],
            )
            .unwrap_err();
        assert_eq!(err, SubstitutionError::Instantiate(77));
        assert_eq!(handles.contents(&host, "LootBox_Natural_1"), before);
        assert!(host.is_alive(before[0]));
    }

    #[test]
    fn item_without_stack_property_keeps_its_stack() {
        let (mut host, handles) = world().build();
        let mut names = crate::config::HostNames::default();
        names.catalog.stack_properties = vec!["Quantity".into()];
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        set_prefab(&mut host, &handles, 20, "Stack", 0);

        let before = handles.contents(&host, "LootBox_Natural_1");
        let fresh = engine
            .reroll(
                &mut host,
                &mut TypeResolver::new(),
                &ItemCatalog::from_pairs([(20, 5)]),
                &mut StdRng::seed_from_u64(3),
                before[1],
            )
            .unwrap();
        assert_eq!(item_id(&host, fresh), Some(20));
        assert_eq!(stack(&host, fresh), Some(0));
        assert_eq!(handles.contents(&host, "LootBox_Natural_1")[1], fresh);
    }

    #[test]
    fn stack_limit_follows_the_created_items_type_id() {
        let (mut host, handles) = world().build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        // 目录里 30 不可堆叠，但工厂给出的物品自报为 20
        set_prefab(&mut host, &handles, 30, "TypeID", 20);
        set_prefab(&mut host, &handles, 30, "Stack", 0);

        let before = handles.contents(&host, "LootBox_Natural_1");
        let catalog = ItemCatalog::from_pairs([(30, 1), (20, 5)]);
        let mut rng = StdRng::seed_from_u64(5);
        let mut types = TypeResolver::new();
        for item in &before {
            let fresh = engine
                .reroll(&mut host, &mut types, &catalog, &mut rng, *item)
                .unwrap();
            assert_eq!(item_id(&host, fresh), Some(20));
            assert!((1..=5).contains(&stack(&host, fresh).unwrap()));
        }
    }

    #[test]
    fn unreadable_type_id_falls_back_to_the_drawn_id() {
        let (mut host, handles) = world().build();
        let mut names = crate::config::HostNames::default();
        names.catalog.type_id_property = "ItemKey".into();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        set_prefab(&mut host, &handles, 30, "TypeID", 20);
        set_prefab(&mut host, &handles, 30, "Stack", 0);

        let before = handles.contents(&host, "LootBox_Natural_1");
        let fresh = engine
            .reroll(
                &mut host,
                &mut TypeResolver::new(),
                &ItemCatalog::from_pairs([(30, 1)]),
                &mut StdRng::seed_from_u64(5),
                before[0],
            )
            .unwrap();
        assert_eq!(stack(&host, fresh), Some(0));
    }

    #[test]
    fn item_outside_a_container_is_left_alone() {
        let (mut host, handles) = world().loose_item(30).build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        let loose = handles.loose[0];
        let err = engine
            .reroll(
                &mut host,
                &mut TypeResolver::new(),
                &catalog(),
                &mut StdRng::seed_from_u64(1),
                loose,
            )
            .unwrap_err();
        assert_eq!(err, SubstitutionError::NoContainer(loose));
        assert!(host.is_alive(loose));
    }

    #[test]
    fn empty_catalog_aborts_before_touching_the_container() {
        let (mut host, handles) = world().build();
        let names = crate::config::HostNames::default();
        let engine = SubstitutionEngine::new(&names.catalog, &names.container);
        let before = handles.contents(&host, "LootBox_Natural_1");
        let err = engine
            .reroll(
                &mut host,
                &mut TypeResolver::new(),
                &ItemCatalog::default(),
                &mut StdRng::seed_from_u64(1),
                before[0],
            )
            .unwrap_err();
        assert_eq!(err, SubstitutionError::Catalog(CatalogError::Empty));
        assert_eq!(handles.contents(&host, "LootBox_Natural_1"), before);
    }
}
