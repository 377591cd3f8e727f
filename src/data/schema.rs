use serde_derive::Serialize;

/// 从宿主目录条目里提取出来的物品元数据
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemEntry {
    pub id: i32,
    pub name: String,
    pub max_stack: i32,
    /// 同时有图标和非空显示名才算有效
    pub valid: bool,
}

impl ItemEntry {
    pub fn new(id: i32, name: impl Into<String>, max_stack: i32, has_icon: bool) -> Self {
        let name = name.into();
        let valid = has_icon && !name.trim().is_empty();
        Self {
            id,
            name,
            max_stack: max_stack.max(1),
            valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity_needs_icon_and_name() {
        assert!(ItemEntry::new(1, "Medkit", 1, true).valid);
        assert!(!ItemEntry::new(1, "Medkit", 1, false).valid);
        assert!(!ItemEntry::new(1, "  ", 1, true).valid);
        assert_eq!(ItemEntry::new(1, "Ammo", 0, true).max_stack, 1);
    }
}
