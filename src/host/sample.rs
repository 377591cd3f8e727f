//! 演示世界：用内存宿主搭一个带目录 / 容器 / 钱包 / 伴随模组的小场景

use std::collections::HashMap;

use super::memory::MemoryHost;
use super::{HostError, HostModel, HostValue, NodeId, ObjectId, Target, TypeDesc, ValueKind};

pub const PLAYER_NODE: &str = "PlayerCharacter";
pub const PLAYER_TAG: &str = "Player";
pub const NOT_ENOUGH_MONEY_KEY: &str = "UI_NotEnoughMoney";

#[derive(Debug, Clone)]
struct EntrySpec {
    id: i32,
    name: String,
    max_stack: i32,
    icon: bool,
}

#[derive(Debug, Clone)]
struct ContainerSpec {
    name: String,
    tag: Option<String>,
    inventory: bool,
    sealed: bool,
    locked: bool,
    items: Vec<i32>,
}

/// 演示世界构建器
#[derive(Debug, Clone)]
pub struct SampleWorld {
    entries: Vec<EntrySpec>,
    dynamic: Vec<EntrySpec>,
    collection: bool,
    containers: Vec<ContainerSpec>,
    loose: Vec<i32>,
    nested: Vec<(i32, i32)>,
    money: Option<i32>,
    economy: bool,
    price: Option<i64>,
    localization: bool,
    broken_module: bool,
}

impl Default for SampleWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleWorld {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            dynamic: Vec::new(),
            collection: true,
            containers: Vec::new(),
            loose: Vec::new(),
            nested: Vec::new(),
            money: None,
            economy: false,
            price: None,
            localization: false,
            broken_module: false,
        }
    }

    /// 启动演示用的完整场景
    pub fn demo() -> Self {
        Self::new()
            .entry(101, "Medkit", 1)
            .entry(102, "Bandage", 5)
            .entry(103, "9mm Ammo", 60)
            .entry(104, "Scrap Metal", 10)
            .entry(105, "Flashlight", 1)
            .hidden_entry(900, "Debug Cube")
            .entry(901, "", 1)
            .dynamic_entry(2001, "Lucky Coin", 99)
            .dynamic_entry(101, "Medkit (dup)", 3)
            .player(&[101, 102], 5000)
            .container("LootBox_Natural_12", &[103, 104, 105])
            .container("LootBox_EnemyDie_3", &[102])
            .container("Tomb_01", &[101])
            .container("Agent_Pickup_03", &[104])
            .holder("Backpack", &[103])
            .loose_item(105)
            .nested(105, 103)
            .economy()
            .price_source(150)
            .localization()
            .broken_module()
    }

    pub fn entry(mut self, id: i32, name: &str, max_stack: i32) -> Self {
        self.entries.push(EntrySpec {
            id,
            name: name.to_string(),
            max_stack,
            icon: true,
        });
        self
    }

    /// 没有图标的条目，加载时应被拒绝
    pub fn hidden_entry(mut self, id: i32, name: &str) -> Self {
        self.entries.push(EntrySpec {
            id,
            name: name.to_string(),
            max_stack: 1,
            icon: false,
        });
        self
    }

    /// 运行时注册到静态字典里的条目
    pub fn dynamic_entry(mut self, id: i32, name: &str, max_stack: i32) -> Self {
        self.dynamic.push(EntrySpec {
            id,
            name: name.to_string(),
            max_stack,
            icon: true,
        });
        self
    }

    pub fn without_collection(mut self) -> Self {
        self.collection = false;
        self
    }

    /// 带背包能力的容器
    pub fn container(mut self, name: &str, items: &[i32]) -> Self {
        self.containers.push(ContainerSpec {
            name: name.to_string(),
            tag: None,
            inventory: true,
            sealed: false,
            locked: false,
            items: items.to_vec(),
        });
        self
    }

    /// 没有背包能力的普通父节点
    pub fn holder(mut self, name: &str, items: &[i32]) -> Self {
        self.containers.push(ContainerSpec {
            name: name.to_string(),
            tag: None,
            inventory: false,
            sealed: false,
            locked: false,
            items: items.to_vec(),
        });
        self
    }

    /// 容器拒绝插入（AddAt 返回 false）
    pub fn sealed(mut self, name: &str) -> Self {
        if let Some(c) = self.containers.iter_mut().find(|c| c.name == name) {
            c.sealed = true;
        }
        self
    }

    /// 容器拒绝取出（RemoveAt 返回 false）
    pub fn locked(mut self, name: &str) -> Self {
        if let Some(c) = self.containers.iter_mut().find(|c| c.name == name) {
            c.locked = true;
        }
        self
    }

    /// 带 Player 标签的角色节点：背包 + 钱包
    pub fn player(mut self, items: &[i32], money: i32) -> Self {
        self.containers.push(ContainerSpec {
            name: PLAYER_NODE.to_string(),
            tag: Some(PLAYER_TAG.to_string()),
            inventory: true,
            sealed: false,
            locked: false,
            items: items.to_vec(),
        });
        self.money = Some(money);
        self
    }

    pub fn loose_item(mut self, id: i32) -> Self {
        self.loose.push(id);
        self
    }

    /// 挂在另一个物品下面的物品
    pub fn nested(mut self, outer: i32, inner: i32) -> Self {
        self.nested.push((outer, inner));
        self
    }

    pub fn economy(mut self) -> Self {
        self.economy = true;
        self
    }

    pub fn price_source(mut self, price: i64) -> Self {
        self.price = Some(price);
        self
    }

    pub fn localization(mut self) -> Self {
        self.localization = true;
        self
    }

    pub fn broken_module(mut self) -> Self {
        self.broken_module = true;
        self
    }

    pub fn build(self) -> (MemoryHost, SampleHandles) {
        let mut host = MemoryHost::new();
        if self.broken_module {
            host.mark_module_broken("DynamicProxyGenAssembly");
        }

        let sprite_ty = host.define_type("UnityEngine.CoreModule", "UnityEngine.Sprite").build();
        let item_ty = define_item(&mut host);
        let entry_ty = host
            .define_type("ItemStatsSystem", "ItemStatsSystem.ItemAssetsCollection+Entry")
            .field("typeID", ValueKind::Int)
            .field("prefab", ValueKind::Object)
            .build();
        let collection_ty = define_collection(&mut host);
        let inventory_ty = define_inventory(&mut host);

        let mut prefabs = HashMap::new();
        let mut make_entry = |host: &mut MemoryHost, spec: &EntrySpec| {
            let node = host.spawn_prefab(&spec.name);
            let item = host.attach(node, &item_ty);
            host.set(item, "TypeID", spec.id);
            host.set(item, "DisplayName", spec.name.as_str());
            host.set(item, "MaxStackCount", spec.max_stack);
            host.set(item, "Stack", 1);
            if spec.icon {
                let icon = host.create(&sprite_ty);
                host.set(item, "Icon", icon);
            }
            prefabs.entry(spec.id).or_insert(item);

            let entry = host.create(&entry_ty);
            host.set(entry, "typeID", spec.id);
            host.set(entry, "prefab", item);
            entry
        };

        let collection = if self.collection {
            let asset = host.add_asset(&collection_ty);
            let entries = self
                .entries
                .iter()
                .map(|e| HostValue::Object(make_entry(&mut host, e)))
                .collect();
            host.set(asset, "entries", HostValue::List(entries));
            let dynamic = self
                .dynamic
                .iter()
                .map(|e| {
                    let entry = make_entry(&mut host, e);
                    (HostValue::Int(e.id), HostValue::Object(entry))
                })
                .collect();
            host.set_static(&collection_ty, "dynamicDic", HostValue::Map(dynamic));
            Some(asset)
        } else {
            None
        };

        let wallet_ty = host
            .define_type("TeamSoda.Duckov.Core", "CharacterMainControl")
            .field("Money", ValueKind::Int)
            .build();

        let mut containers = Vec::new();
        let mut wallet = None;
        for spec in &self.containers {
            let node = host.spawn_node(&spec.name, None);
            if let Some(tag) = &spec.tag {
                host.set_tag(node, tag);
            }
            let inventory = spec.inventory.then(|| {
                let inv = host.attach(node, &inventory_ty);
                host.set(inv, "content", HostValue::List(Vec::new()));
                host.set(inv, "sealed", spec.sealed);
                host.set(inv, "locked", spec.locked);
                inv
            });
            if spec.tag.as_deref() == Some(PLAYER_TAG) {
                if let Some(money) = self.money {
                    let w = host.attach(node, &wallet_ty);
                    host.set(w, "Money", money);
                    wallet = Some(w);
                }
            }
            let mut content = Vec::new();
            for id in &spec.items {
                let item = spawn_item(&mut host, &item_ty, &prefabs, *id, Some(node));
                content.push(HostValue::Object(item));
            }
            if let Some(inv) = inventory {
                host.set(inv, "content", HostValue::List(content));
            }
            containers.push((spec.name.clone(), node, inventory));
        }

        let mut loose = Vec::new();
        for id in &self.loose {
            loose.push(spawn_item(&mut host, &item_ty, &prefabs, *id, None));
        }
        for (outer, inner) in &self.nested {
            let outer_item = spawn_item(&mut host, &item_ty, &prefabs, *outer, None);
            let outer_node = host.owner(outer_item);
            loose.push(outer_item);
            loose.push(spawn_item(&mut host, &item_ty, &prefabs, *inner, outer_node));
        }

        if self.economy {
            define_economy(&mut host, &wallet_ty);
        }
        let price_setting = self.price.map(|price| define_price_source(&mut host, price));
        let notification_type = self.localization.then(|| define_localization(&mut host));

        let handles = SampleHandles {
            item_type: item_ty,
            collection_type: collection_ty,
            inventory_type: inventory_ty,
            collection,
            wallet,
            price_setting,
            notification_type,
            containers,
            loose,
        };
        (host, handles)
    }
}

/// 搭建完成后可用于观察场景的句柄
#[derive(Debug, Clone)]
pub struct SampleHandles {
    pub item_type: TypeDesc,
    pub collection_type: TypeDesc,
    pub inventory_type: TypeDesc,
    pub collection: Option<ObjectId>,
    pub wallet: Option<ObjectId>,
    pub price_setting: Option<ObjectId>,
    pub notification_type: Option<TypeDesc>,
    containers: Vec<(String, NodeId, Option<ObjectId>)>,
    pub loose: Vec<ObjectId>,
}

impl SampleHandles {
    pub fn node(&self, name: &str) -> Option<NodeId> {
        self.containers
            .iter()
            .find(|(n, _, _)| n == name)
            .map(|(_, node, _)| *node)
    }

    pub fn inventory(&self, name: &str) -> Option<ObjectId> {
        self.containers
            .iter()
            .find(|(n, _, _)| n == name)
            .and_then(|(_, _, inv)| *inv)
    }

    /// 容器里的物品，按槽位顺序
    pub fn contents(&self, host: &dyn HostModel, name: &str) -> Vec<ObjectId> {
        let Some(inv) = self.inventory(name) else {
            return Vec::new();
        };
        match host.read(Target::Instance(inv), "content") {
            Ok(HostValue::List(items)) => items.iter().filter_map(HostValue::as_object).collect(),
            _ => Vec::new(),
        }
    }

    pub fn money(&self, host: &dyn HostModel) -> Option<i64> {
        let wallet = self.wallet?;
        host.read(Target::Instance(wallet), "Money").ok()?.as_i64()
    }

    /// 修改价格设置，并触发 OnChanged
    pub fn set_price(&self, host: &mut dyn HostModel, price: i64) -> bool {
        let Some(setting) = self.price_setting else {
            return false;
        };
        host.invoke(Target::Instance(setting), "Set", &[HostValue::Long(price)])
            .is_ok()
    }

    /// 通知栏收到过的消息
    pub fn notifications(&self, host: &dyn HostModel) -> Vec<String> {
        let Some(ty) = &self.notification_type else {
            return Vec::new();
        };
        match host.read(Target::Static(ty), "history") {
            Ok(HostValue::List(items)) => items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
    }
}

pub fn item_id(host: &dyn HostModel, item: ObjectId) -> Option<i32> {
    host.read(Target::Instance(item), "TypeID").ok()?.as_i32()
}

pub fn stack(host: &dyn HostModel, item: ObjectId) -> Option<i64> {
    host.read(Target::Instance(item), "Stack").ok()?.as_i64()
}

// --------------------------- 类型定义 ---------------------------

fn invocation(member: &str, message: &str) -> HostError {
    HostError::Invocation {
        member: member.to_string(),
        message: message.to_string(),
    }
}

fn define_item(host: &mut MemoryHost) -> TypeDesc {
    host.define_type("ItemStatsSystem", "ItemStatsSystem.Item")
        .property("TypeID", ValueKind::Int, true, false)
        .property("Icon", ValueKind::Object, true, false)
        .property("DisplayName", ValueKind::Str, true, false)
        .property("MaxStackCount", ValueKind::Int, true, false)
        .property("Stack", ValueKind::Int, true, true)
        .build()
}

fn define_collection(host: &mut MemoryHost) -> TypeDesc {
    let ty = TypeDesc::new("ItemStatsSystem", "ItemStatsSystem.ItemAssetsCollection");
    let owner = ty.clone();
    host.define_type(&ty.module, &ty.full_name)
        .field("entries", ValueKind::List)
        .static_field("dynamicDic", ValueKind::Map, HostValue::Map(Vec::new()))
        .static_method(
            "InstantiateSync",
            &[ValueKind::Int],
            ValueKind::Object,
            move |h, _, args| {
                let id = args.first().and_then(HostValue::as_i32).unwrap_or(0);
                Ok(find_prefab(h, &owner, id)
                    .and_then(|prefab| h.instantiate(prefab))
                    .map_or(HostValue::Null, HostValue::Object))
            },
        )
        .build()
}

fn entry_prefab(h: &MemoryHost, entry: &HostValue, id: i32) -> Option<ObjectId> {
    let entry = entry.as_object()?;
    if h.get(entry, "typeID")?.as_i32()? != id {
        return None;
    }
    h.get(entry, "prefab")?.as_object()
}

fn find_prefab(h: &MemoryHost, collection: &TypeDesc, id: i32) -> Option<ObjectId> {
    for asset in h.assets() {
        if !h.type_of(asset).is_ok_and(|t| &t == collection) {
            continue;
        }
        if let Some(HostValue::List(entries)) = h.get(asset, "entries") {
            if let Some(p) = entries.iter().find_map(|e| entry_prefab(h, e, id)) {
                return Some(p);
            }
        }
    }
    match h.get_static(collection, "dynamicDic") {
        Some(HostValue::Map(pairs)) => pairs.iter().find_map(|(_, e)| entry_prefab(h, e, id)),
        _ => None,
    }
}

fn content_of(h: &MemoryHost, inv: ObjectId) -> Vec<HostValue> {
    match h.get(inv, "content") {
        Some(HostValue::List(items)) => items.clone(),
        _ => Vec::new(),
    }
}

fn define_inventory(host: &mut MemoryHost) -> TypeDesc {
    let no_instance = || invocation("Inventory", "called without an instance");
    host.define_type("ItemStatsSystem", "ItemStatsSystem.Inventory")
        .field("content", ValueKind::List)
        .field("sealed", ValueKind::Bool)
        .field("locked", ValueKind::Bool)
        .method("GetIndex", &[ValueKind::Object], ValueKind::Int, move |h, this, args| {
            let this = this.ok_or_else(no_instance)?;
            let wanted = args.first().and_then(HostValue::as_object);
            let index = content_of(h, this)
                .iter()
                .position(|v| wanted.is_some() && v.as_object() == wanted);
            Ok(HostValue::Int(index.map_or(-1, |i| i as i32)))
        })
        .method("RemoveAt", &[ValueKind::Int], ValueKind::Bool, move |h, this, args| {
            let this = this.ok_or_else(no_instance)?;
            if h.get(this, "locked").and_then(HostValue::as_bool) == Some(true) {
                return Ok(HostValue::Bool(false));
            }
            let mut items = content_of(h, this);
            let index = args.first().and_then(HostValue::as_i32).unwrap_or(-1);
            let Ok(index) = usize::try_from(index) else {
                return Ok(HostValue::Bool(false));
            };
            if index >= items.len() {
                return Ok(HostValue::Bool(false));
            }
            let removed = items.remove(index);
            h.set(this, "content", HostValue::List(items));
            if let Some(node) = removed.as_object().and_then(|o| h.owner(o)) {
                h.reparent(node, None);
            }
            Ok(HostValue::Bool(true))
        })
        .method(
            "AddAt",
            &[ValueKind::Object, ValueKind::Int],
            ValueKind::Bool,
            move |h, this, args| {
                let this = this.ok_or_else(no_instance)?;
                if h.get(this, "sealed").and_then(HostValue::as_bool) == Some(true) {
                    return Ok(HostValue::Bool(false));
                }
                let (Some(item), Some(index)) = (
                    args.first().and_then(HostValue::as_object),
                    args.get(1).and_then(HostValue::as_i32),
                ) else {
                    return Ok(HostValue::Bool(false));
                };
                let mut items = content_of(h, this);
                let Ok(index) = usize::try_from(index) else {
                    return Ok(HostValue::Bool(false));
                };
                if index > items.len() {
                    return Ok(HostValue::Bool(false));
                }
                items.insert(index, HostValue::Object(item));
                h.set(this, "content", HostValue::List(items));
                if let (Some(node), Some(parent)) = (h.owner(item), h.owner(this)) {
                    h.reparent(node, Some(parent));
                }
                Ok(HostValue::Bool(true))
            },
        )
        .build()
}

fn spawn_item(
    host: &mut MemoryHost,
    item_ty: &TypeDesc,
    prefabs: &HashMap<i32, ObjectId>,
    id: i32,
    parent: Option<NodeId>,
) -> ObjectId {
    let item = match prefabs.get(&id).and_then(|p| host.instantiate(*p)) {
        Some(item) => item,
        None => {
            let node = host.spawn_node(&format!("Item_{id}"), None);
            let item = host.attach(node, item_ty);
            host.set(item, "TypeID", id);
            host.set(item, "Stack", 1);
            item
        }
    };
    if let Some(node) = host.owner(item) {
        host.reparent(node, parent);
    }
    item
}

fn define_economy(host: &mut MemoryHost, wallet_ty: &TypeDesc) {
    let cost_ty = host
        .define_type("TeamSoda.Duckov.Core", "Duckov.Economy.Cost")
        .field("amount", ValueKind::Long)
        .constructor(&[ValueKind::Long], |h, this, args| {
            let this = this.ok_or_else(|| invocation("Cost", "no instance"))?;
            h.set(this, "amount", args[0].clone());
            Ok(HostValue::Null)
        })
        .build();
    let wallet_ty = wallet_ty.clone();
    host.define_type("TeamSoda.Duckov.Core", "Duckov.Economy.EconomyManager")
        .static_method(
            "Pay",
            &[ValueKind::Object, ValueKind::Bool, ValueKind::Bool],
            ValueKind::Bool,
            move |h, _, args| {
                let cost = args
                    .first()
                    .and_then(HostValue::as_object)
                    .filter(|c| h.type_of(*c).is_ok_and(|t| t == cost_ty))
                    .ok_or_else(|| invocation("Pay", "cost is null"))?;
                let amount = h
                    .get(cost, "amount")
                    .and_then(HostValue::as_i64)
                    .ok_or_else(|| invocation("Pay", "cost has no amount"))?;
                let Some(wallet) = h.instances_of(&wallet_ty).into_iter().next() else {
                    return Ok(HostValue::Bool(false));
                };
                let money = h.get(wallet, "Money").and_then(HostValue::as_i64).unwrap_or(0);
                if money < amount {
                    return Ok(HostValue::Bool(false));
                }
                let left = i32::try_from(money - amount).map_err(|_| invocation("Pay", "overflow"))?;
                h.set(wallet, "Money", left);
                Ok(HostValue::Bool(true))
            },
        )
        .build();
}

fn define_price_source(host: &mut MemoryHost, price: i64) -> ObjectId {
    let item_ty = host
        .define_type("DuckovLuckyBox", "DuckovLuckyBox.Core.Settings.SettingItem")
        .field("value", ValueKind::Long)
        .method("GetAsLong", &[], ValueKind::Long, |h, this, _| {
            let this = this.ok_or_else(|| invocation("GetAsLong", "no instance"))?;
            Ok(h.get(this, "value").cloned().unwrap_or(HostValue::Long(0)))
        })
        .method("Set", &[ValueKind::Long], ValueKind::Void, |h, this, args| {
            let this = this.ok_or_else(|| invocation("Set", "no instance"))?;
            h.set(this, "value", args[0].clone());
            h.raise(this, "OnChanged", &args[0]);
            Ok(HostValue::Null)
        })
        .build();
    let manager_ty = host
        .define_type("DuckovLuckyBox", "DuckovLuckyBox.Core.Settings.SettingManager")
        .static_property("Instance", ValueKind::Object, HostValue::Null)
        .property("RefreshStockPrice", ValueKind::Object, true, false)
        .build();

    let setting = host.create(&item_ty);
    host.set(setting, "value", price);
    let manager = host.create(&manager_ty);
    host.set(manager, "RefreshStockPrice", setting);
    host.set_static(&manager_ty, "Instance", manager);
    setting
}

fn define_localization(host: &mut MemoryHost) -> TypeDesc {
    host.define_type("SodaCraft.Localizations", "SodaCraft.Localizations.Localizations+I18n")
        .static_field(
            "NotEnoughMoneyFormatKey",
            ValueKind::Str,
            HostValue::from(NOT_ENOUGH_MONEY_KEY),
        )
        .build();
    host.define_type("SodaCraft.Localizations", "SodaCraft.Localizations.LocalizationManager")
        .static_method("ToPlainText", &[ValueKind::Str], ValueKind::Str, |_, _, args| {
            let key = args.first().and_then(HostValue::as_str).unwrap_or_default();
            Ok(HostValue::from(match key {
                NOT_ENOUGH_MONEY_KEY => "Need {price} to continue",
                other => other,
            }))
        })
        .build();

    let ty = TypeDesc::new("TeamSoda.Duckov.Core", "Duckov.UI.NotificationText");
    let owner = ty.clone();
    host.define_type(&ty.module, &ty.full_name)
        .static_field("history", ValueKind::List, HostValue::List(Vec::new()))
        .static_method("Push", &[ValueKind::Str], ValueKind::Void, move |h, _, args| {
            let mut history = match h.get_static(&owner, "history") {
                Some(HostValue::List(items)) => items.clone(),
                _ => Vec::new(),
            };
            history.extend(args.first().cloned());
            h.set_static(&owner, "history", HostValue::List(history));
            Ok(HostValue::Null)
        })
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_world_has_expected_layout() {
        let (host, handles) = SampleWorld::demo().build();
        let loot = handles.contents(&host, "LootBox_Natural_12");
        let ids: Vec<_> = loot.iter().filter_map(|i| item_id(&host, *i)).collect();
        assert_eq!(ids, vec![103, 104, 105]);

        let loot_node = handles.node("LootBox_Natural_12").unwrap();
        for item in &loot {
            assert_eq!(host.owner(*item).and_then(|n| host.parent(n)), Some(loot_node));
        }
        assert!(handles.inventory("Backpack").is_none());
        assert_eq!(handles.money(&host), Some(5000));
        assert_eq!(host.find_tagged(PLAYER_TAG), handles.node(PLAYER_NODE));
    }

    #[test]
    fn inventory_methods_move_items_between_slots() {
        let (mut host, handles) = SampleWorld::new()
            .entry(1, "A", 1)
            .entry(2, "B", 1)
            .container("Chest", &[1, 2])
            .build();
        let inv = handles.inventory("Chest").unwrap();
        let items = handles.contents(&host, "Chest");

        let idx = host
            .invoke(Target::Instance(inv), "GetIndex", &[HostValue::Object(items[1])])
            .unwrap();
        assert_eq!(idx, HostValue::Int(1));

        let removed = host
            .invoke(Target::Instance(inv), "RemoveAt", &[HostValue::Int(0)])
            .unwrap();
        assert_eq!(removed, HostValue::Bool(true));
        assert_eq!(host.owner(items[0]).and_then(|n| host.parent(n)), None);

        let added = host
            .invoke(
                Target::Instance(inv),
                "AddAt",
                &[HostValue::Object(items[0]), HostValue::Int(1)],
            )
            .unwrap();
        assert_eq!(added, HostValue::Bool(true));
        assert_eq!(handles.contents(&host, "Chest"), vec![items[1], items[0]]);
    }

    #[test]
    fn instantiate_sync_clones_prefab_into_scene() {
        let (mut host, handles) = SampleWorld::new()
            .entry(7, "Gear", 4)
            .dynamic_entry(8, "Coin", 9)
            .build();
        let ty = handles.collection_type.clone();
        for id in [7, 8] {
            let made = host
                .invoke(Target::Static(&ty), "InstantiateSync", &[HostValue::Int(id)])
                .unwrap()
                .as_object()
                .unwrap();
            assert_eq!(item_id(&host, made), Some(id));
            assert!(host.nodes().contains(&host.owner(made).unwrap()));
        }
        let missing = host
            .invoke(Target::Static(&ty), "InstantiateSync", &[HostValue::Int(99)])
            .unwrap();
        assert!(missing.is_null());
    }
}
