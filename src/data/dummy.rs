use std::collections::HashSet;

/// 不允许被抽到的占位物品 ID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DummyItemIds {
    denied: HashSet<i32>,
}

impl DummyItemIds {
    pub fn new(ids: impl IntoIterator<Item = i32>) -> Self {
        Self {
            denied: ids.into_iter().collect(),
        }
    }

    /// 非正数 ID 一律拒绝
    pub fn is_allowed(&self, id: i32) -> bool {
        id > 0 && !self.denied.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.denied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.denied.is_empty()
    }
}
