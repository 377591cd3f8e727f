use bevy::prelude::*;
use bevy::state::app::StatesPlugin;

pub mod context;
pub mod events;
pub mod states;

use crate::config::{PreferenceStore, RerollConfig, StoragePaths};
use crate::host::HostBridge;
use crate::host::memory::MemoryHost;
use context::IntegrationContext;
use events::LogEvent;
use states::AppState;

/// 核心插件：注册全局状态 / 事件，加载配置并构建集成上下文
pub struct CorePlugin;

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        // MinimalPlugins 不带状态机
        if !app.is_plugin_added::<StatesPlugin>() {
            app.add_plugins(StatesPlugin);
        }
        app
            .init_state::<AppState>()
            .add_event::<LogEvent>()
            .add_systems(Startup, load_settings)
            .add_systems(OnEnter(AppState::Loading), build_context);
    }
}

/// 读取配置文件；已插入配置资源时直接沿用
fn load_settings(
    mut commands: Commands,
    paths: Option<Res<StoragePaths>>,
    existing: Option<Res<RerollConfig>>,
    mut next: ResMut<NextState<AppState>>,
) {
    if existing.is_none() {
        let config = match paths.as_deref() {
            Some(paths) => match RerollConfig::load_or_create(&paths.config) {
                Ok((config, created)) => {
                    if created {
                        info!("default config written to {}", paths.config.display());
                    }
                    config
                }
                Err(e) => {
                    warn!("{e}, using defaults");
                    RerollConfig::default()
                }
            },
            None => RerollConfig::default(),
        };
        commands.insert_resource(config);
    }
    next.set(AppState::Loading);
}

fn build_context(
    mut commands: Commands,
    host: Option<ResMut<HostBridge>>,
    config: Res<RerollConfig>,
    paths: Option<Res<StoragePaths>>,
) {
    let prefs = match paths.as_deref() {
        Some(paths) => PreferenceStore::open(&paths.prefs).unwrap_or_else(|e| {
            warn!("{e}, preferences will not be kept");
            PreferenceStore::in_memory()
        }),
        None => PreferenceStore::in_memory(),
    };
    let context = match host {
        Some(mut host) => IntegrationContext::load(host.model_mut(), &config, prefs),
        None => {
            warn!("no host attached, reroll has nothing to work on");
            IntegrationContext::load(&mut MemoryHost::new(), &config, prefs)
        }
    };
    commands.insert_resource(context);
}
