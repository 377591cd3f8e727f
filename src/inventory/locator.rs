//! 枚举场景中的物品，并为每个物品采集分类所需的容器事实

use bevy::prelude::*;
use thiserror::Error;

use super::filter::{FilterResult, ScanFacts, filter};
use crate::binder::TypeResolver;
use crate::config::names::{CatalogNames, ContainerNames};
use crate::host::{HostModel, ObjectId, TypeDesc};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocateError {
    #[error("item type `{0}` is not loaded")]
    ItemType(String),
    #[error("inventory type `{0}` is not loaded")]
    InventoryType(String),
}

pub struct ItemLocator<'a> {
    catalog: &'a CatalogNames,
    container: &'a ContainerNames,
}

impl<'a> ItemLocator<'a> {
    pub fn new(catalog: &'a CatalogNames, container: &'a ContainerNames) -> Self {
        Self { catalog, container }
    }

    /// 扫描所有活动物品并分类
    pub fn locate(
        &self,
        host: &dyn HostModel,
        types: &mut TypeResolver,
    ) -> Result<FilterResult, LocateError> {
        let item_ty = types
            .resolve(host, &self.catalog.item_type)
            .ok_or_else(|| LocateError::ItemType(self.catalog.item_type.clone()))?;
        let inventory_ty = types
            .resolve(host, &self.container.inventory_type)
            .ok_or_else(|| LocateError::InventoryType(self.container.inventory_type.clone()))?;

        let scanned = host
            .instances_of(&item_ty)
            .into_iter()
            .map(|item| (item, facts_for(host, item, &item_ty, &inventory_ty)))
            .collect::<Vec<_>>();
        let result = filter(scanned);
        debug!("scan: {}", result.summary());
        Ok(result)
    }
}

/// 容器就是物品节点的父节点
pub fn facts_for(
    host: &dyn HostModel,
    item: ObjectId,
    item_ty: &TypeDesc,
    inventory_ty: &TypeDesc,
) -> ScanFacts {
    let Some(node) = host.owner(item) else {
        return ScanFacts::default();
    };
    let Some(parent) = host.parent(node) else {
        return ScanFacts::on_ground();
    };
    ScanFacts {
        has_entity: true,
        container: Some(host.node_name(parent).unwrap_or_default()),
        container_is_item: host.component_of_type(parent, item_ty).is_some(),
        container_has_inventory: host.component_of_type(parent, inventory_ty).is_some(),
    }
}
