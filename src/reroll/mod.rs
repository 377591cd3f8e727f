pub mod components;
pub mod events;
mod systems;

use bevy::prelude::*;
use crate::core::states::AppState;
use components::*;
use events::*;
use systems::*;

/// 重抽流程：按键 → 扣费 → 逐帧替换
pub struct RerollPlugin;
impl Plugin for RerollPlugin {
    fn build(&self, app: &mut App) {
        app
            .init_resource::<RerollRng>()
            .init_resource::<PassCounter>()
            .init_resource::<RebindMode>()
            .add_event::<KeyPressed>()
            .add_event::<RerollRequested>()
            .add_event::<CostCharged>()
            .add_event::<RerollFinished>()
            .add_event::<RebindKey>()
            .add_systems(
                Update,
                (
                    handle_keys,
                    apply_rebind,
                    sync_price,
                    start_pass,
                    advance_pass,
                )
                    .chain()
                    .run_if(in_state(AppState::InGame)),
            );
    }
}
