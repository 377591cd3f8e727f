//! 物品重抽模组的宿主集成层：运行时内省绑定宿主的通货 / 内容目录 / 容器

use bevy::prelude::*;

pub mod binder;
pub mod config;
pub mod core;
pub mod currency;
pub mod data;
pub mod host;
pub mod interface;
pub mod inventory;
pub mod reroll;

/// 除 CLI 外的全部插件
pub struct ItemRerollPlugin;

impl Plugin for ItemRerollPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins((core::CorePlugin, data::DataPlugin, reroll::RerollPlugin));
    }
}
