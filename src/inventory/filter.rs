//! 纯分类：根据一个物品所在容器的事实决定它是否参与重抽

use serde_derive::Serialize;

use crate::host::ObjectId;

/// 命中即视为重抽目标的容器名片段
const TARGET_MARKERS: &[&str] = &[
    "LootBox_EnemyDie",
    "LootBox_Natural",
    "Container",
    "Chest",
    "Box",
    "Drawer",
];

/// 扫描时采集到的事实，分类本身不再碰宿主
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanFacts {
    pub has_entity: bool,
    pub container: Option<String>,
    /// 容器节点上也挂着物品组件
    pub container_is_item: bool,
    pub container_has_inventory: bool,
}

impl ScanFacts {
    pub fn in_container(name: &str) -> Self {
        Self {
            has_entity: true,
            container: Some(name.to_string()),
            container_is_item: false,
            container_has_inventory: true,
        }
    }

    pub fn on_ground() -> Self {
        Self {
            has_entity: true,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    Target,
    PlayerHeld,
    Tombstone,
    Ground,
    Nested,
    PlainInventory,
    Invalid,
}

/// 规则按顺序匹配，先命中先生效
pub fn classify(facts: &ScanFacts) -> Category {
    if !facts.has_entity {
        return Category::Invalid;
    }
    let Some(name) = facts.container.as_deref() else {
        return Category::Ground;
    };
    if name.is_empty() {
        return Category::Invalid;
    }
    if name.contains("Character") {
        return Category::PlayerHeld;
    }
    if name.starts_with("Agent_Pickup") || name.contains("Pickup") {
        return Category::Ground;
    }
    if name.contains("Tomb") {
        return Category::Tombstone;
    }
    if facts.container_is_item {
        return Category::Nested;
    }
    if !facts.container_has_inventory {
        return Category::PlainInventory;
    }
    if TARGET_MARKERS.iter().any(|m| name.contains(m)) {
        Category::Target
    } else {
        Category::PlainInventory
    }
}

/// 一次扫描的分类结果；每个实体恰好计入一个类别
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterResult {
    #[serde(skip)]
    pub targets: Vec<ObjectId>,
    pub player_held: usize,
    pub tombstone: usize,
    pub ground: usize,
    pub nested: usize,
    pub plain_inventory: usize,
    pub invalid: usize,
}

impl FilterResult {
    pub fn record(&mut self, entity: ObjectId, category: Category) {
        match category {
            Category::Target => self.targets.push(entity),
            Category::PlayerHeld => self.player_held += 1,
            Category::Tombstone => self.tombstone += 1,
            Category::Ground => self.ground += 1,
            Category::Nested => self.nested += 1,
            Category::PlainInventory => self.plain_inventory += 1,
            Category::Invalid => self.invalid += 1,
        }
    }

    pub fn scanned(&self) -> usize {
        self.targets.len()
            + self.player_held
            + self.tombstone
            + self.ground
            + self.nested
            + self.plain_inventory
            + self.invalid
    }

    pub fn summary(&self) -> String {
        format!(
            "targets {}, player {}, tomb {}, ground {}, nested {}, inventory {}, invalid {}",
            self.targets.len(),
            self.player_held,
            self.tombstone,
            self.ground,
            self.nested,
            self.plain_inventory,
            self.invalid
        )
    }
}

pub fn filter(scanned: impl IntoIterator<Item = (ObjectId, ScanFacts)>) -> FilterResult {
    let mut result = FilterResult::default();
    for (entity, facts) in scanned {
        result.record(entity, classify(&facts));
    }
    result
}
