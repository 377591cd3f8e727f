use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use item_reroll::ItemRerollPlugin;
use item_reroll::config::StoragePaths;
use item_reroll::core::events::LogEvent;
use item_reroll::host::HostBridge;
use item_reroll::host::sample::SampleWorld;
use item_reroll::interface::DebugCliPlugin;

/// 配置与偏好所在目录
const HOME_VAR: &str = "ITEM_REROLL_HOME";

fn main() -> anyhow::Result<()> {
    let home = match env::var_os(HOME_VAR) {
        Some(dir) => PathBuf::from(dir),
        None => env::current_dir().context("could not read working directory")?,
    };
    std::fs::create_dir_all(&home)
        .with_context(|| format!("could not create {}", home.display()))?;

    // 没有真实宿主时跑演示场景
    let (host, _) = SampleWorld::demo().build();

    App::new()
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(
            1.0 / 60.0,
        ))))
        .add_plugins(LogPlugin::default())
        .insert_resource(StoragePaths::in_dir(&home))
        .insert_resource(HostBridge::new(host))
        .add_plugins(ItemRerollPlugin)
        .add_plugins(DebugCliPlugin)
        .add_systems(Update, forward_log_event) // 简单打印
        .run();
    Ok(())
}

fn forward_log_event(mut reader: EventReader<LogEvent>) {
    for e in reader.read() {
        println!("> {}", e.0);
    }
}
