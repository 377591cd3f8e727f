use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;
use thiserror::Error;

use super::schema::ItemEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("item catalog is empty")]
    Empty,
}

/// 已收录的物品 ID（按收录顺序，便于均匀抽取）+ 每个 ID 的最大堆叠
///
/// 只由加载器构建，之后只读。
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemCatalog {
    ids: Vec<i32>,
    stacks: HashMap<i32, i32>,
}

impl ItemCatalog {
    /// 按 (id, 最大堆叠) 构建；重复 ID 保留第一次出现的值
    pub fn from_pairs(pairs: impl IntoIterator<Item = (i32, i32)>) -> Self {
        let mut catalog = Self::default();
        for (id, max_stack) in pairs {
            catalog.admit(id, max_stack);
        }
        catalog
    }

    /// 收录成功返回 true；重复或非正数 ID 返回 false
    pub(super) fn admit(&mut self, id: i32, max_stack: i32) -> bool {
        if id <= 0 || self.stacks.contains_key(&id) {
            return false;
        }
        self.ids.push(id);
        self.stacks.insert(id, max_stack.max(1));
        true
    }

    pub(super) fn admit_entry(&mut self, entry: &ItemEntry) -> bool {
        self.admit(entry.id, entry.max_stack)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: i32) -> bool {
        self.stacks.contains_key(&id)
    }

    pub fn ids(&self) -> &[i32] {
        &self.ids
    }

    /// 未知 ID 视为 1
    pub fn max_stack(&self, id: i32) -> i32 {
        self.stacks.get(&id).copied().unwrap_or(1)
    }

    pub fn min_id(&self) -> Option<i32> {
        self.ids.iter().copied().min()
    }

    pub fn max_id(&self) -> Option<i32> {
        self.ids.iter().copied().max()
    }

    /// 均匀随机抽一个 ID
    pub fn random_identifier<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<i32, CatalogError> {
        if self.ids.is_empty() {
            return Err(CatalogError::Empty);
        }
        Ok(self.ids[rng.gen_range(0..self.ids.len())])
    }
}
