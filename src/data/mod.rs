pub mod catalog;
pub mod dummy;
pub mod loader;
pub mod schema;

use bevy::prelude::*;

pub use catalog::{CatalogError, ItemCatalog};
pub use dummy::DummyItemIds;
pub use loader::{CatalogLoader, LoadReport};

use crate::binder::TypeResolver;
use crate::config::RerollConfig;
use crate::core::context::IntegrationContext;
use crate::core::events::LogEvent;
use crate::core::states::AppState;
use crate::host::HostBridge;

// --------------------------- 插件 ---------------------------
pub struct DataPlugin;
impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app
            // Loading 流程：目录一次性构建，之后只读
            .add_systems(OnEnter(AppState::Loading), load_catalog)
            .add_systems(
                Update,
                check_loaded.run_if(in_state(AppState::Loading)),
            );
    }
}

// --------------------------- 系统 ---------------------------
fn load_catalog(
    mut commands: Commands,
    host: Option<Res<HostBridge>>,
    config: Res<RerollConfig>,
    mut log: EventWriter<LogEvent>,
) {
    let Some(host) = host else {
        warn!("no host attached, item catalog is empty");
        commands.insert_resource(ItemCatalog::default());
        commands.insert_resource(LoadReport::default());
        return;
    };

    let dummy = DummyItemIds::new(config.dummy_item_ids.iter().copied());
    let loader = CatalogLoader::new(&config.host.catalog, &dummy);
    let (catalog, report) = loader.load(host.model(), &mut TypeResolver::new());

    match (catalog.min_id(), catalog.max_id()) {
        (Some(lo), Some(hi)) => log.write(LogEvent(format!(
            "Items loaded: {} (id {lo}..={hi})",
            catalog.len()
        ))),
        _ => log.write(LogEvent("Items loaded: 0".into())),
    };
    commands.insert_resource(catalog);
    commands.insert_resource(report);
}

fn check_loaded(
    mut next: ResMut<NextState<AppState>>,
    catalog: Option<Res<ItemCatalog>>,
    context: Option<Res<IntegrationContext>>,
) {
    if catalog.is_some() && context.is_some() {
        next.set(AppState::InGame);
    }
}
