//! 宿主侧名字表。名字只描述所需的形状，不同宿主版本可在配置里覆盖。

use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostNames {
    pub catalog: CatalogNames,
    pub container: ContainerNames,
    pub economy: EconomyNames,
}

/// 内容目录 + 物品组件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogNames {
    pub collection_type: String,
    pub item_type: String,
    pub entries_member: String,
    pub registry_member: String,
    pub entry_id_member: String,
    pub entry_prefab_member: String,
    pub icon_property: String,
    pub display_name_property: String,
    pub max_stack_property: String,
    pub type_id_property: String,
    pub factory_method: String,
    /// 按顺序尝试的可写堆叠属性
    pub stack_properties: Vec<String>,
}

impl Default for CatalogNames {
    fn default() -> Self {
        Self {
            collection_type: "ItemAssetsCollection".into(),
            item_type: "ItemStatsSystem.Item".into(),
            entries_member: "entries".into(),
            registry_member: "dynamicDic".into(),
            entry_id_member: "typeID".into(),
            entry_prefab_member: "prefab".into(),
            icon_property: "Icon".into(),
            display_name_property: "DisplayName".into(),
            max_stack_property: "MaxStackCount".into(),
            type_id_property: "TypeID".into(),
            factory_method: "InstantiateSync".into(),
            stack_properties: vec!["Stack".into(), "Quantity".into()],
        }
    }
}

/// 容器（背包 / 箱子）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerNames {
    pub inventory_type: String,
    pub index_method: String,
    pub remove_method: String,
    pub insert_method: String,
    pub player_tag: String,
}

impl Default for ContainerNames {
    fn default() -> Self {
        Self {
            inventory_type: "Inventory".into(),
            index_method: "GetIndex".into(),
            remove_method: "RemoveAt".into(),
            insert_method: "AddAt".into(),
            player_tag: "Player".into(),
        }
    }
}

/// 可选的伴随模组：支付中心 / 价格来源 / 本地化 / 通知
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyNames {
    pub payment_type: String,
    pub cost_type: String,
    pub pay_method: String,
    pub settings_type: String,
    pub price_setting: String,
    pub price_getter: String,
    pub price_event: String,
    pub i18n_type: String,
    pub i18n_key_field: String,
    pub localization_type: String,
    pub localize_method: String,
    pub notification_type: String,
    pub notify_method: String,
}

impl Default for EconomyNames {
    fn default() -> Self {
        Self {
            payment_type: "Duckov.Economy.EconomyManager".into(),
            cost_type: "Duckov.Economy.Cost".into(),
            pay_method: "Pay".into(),
            settings_type: "DuckovLuckyBox.Core.Settings.SettingManager".into(),
            price_setting: "RefreshStockPrice".into(),
            price_getter: "GetAsLong".into(),
            price_event: "OnChanged".into(),
            i18n_type: "SodaCraft.Localizations.Localizations+I18n".into(),
            i18n_key_field: "NotEnoughMoneyFormatKey".into(),
            localization_type: "SodaCraft.Localizations.LocalizationManager".into(),
            localize_method: "ToPlainText".into(),
            notification_type: "Duckov.UI.NotificationText".into(),
            notify_method: "Push".into(),
        }
    }
}
