use bevy::prelude::*;

/// 插件运行的大状态
#[derive(States, Debug, Clone, Eq, PartialEq, Hash, Default)]
pub enum AppState {
    #[default]
    Startup,
    /// 构建物品目录与集成上下文
    Loading,
    InGame,
}
