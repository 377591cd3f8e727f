use bevy::prelude::*;
use tempfile::TempDir;

use item_reroll::ItemRerollPlugin;
use item_reroll::config::prefs::{PREFS_REROLL_COST, PREFS_REROLL_KEY};
use item_reroll::config::{PreferenceStore, RerollConfig, StoragePaths};
use item_reroll::core::context::IntegrationContext;
use item_reroll::core::states::AppState;
use item_reroll::data::ItemCatalog;
use item_reroll::host::memory::MemoryHost;
use item_reroll::host::sample::{SampleHandles, SampleWorld, item_id, stack};
use item_reroll::host::{HostBridge, HostModel, HostValue};
use item_reroll::reroll::components::{RerollPass, RerollRng};
use item_reroll::reroll::events::{CostCharged, KeyPressed, RerollFinished};

const LOOT: &str = "LootBox_Natural_1";

#[derive(Resource, Default)]
struct Seen {
    finished: Vec<RerollFinished>,
    charged: Vec<(i64, bool)>,
}

fn record(
    mut finished: EventReader<RerollFinished>,
    mut charged: EventReader<CostCharged>,
    mut seen: ResMut<Seen>,
) {
    seen.finished.extend(finished.read().cloned());
    seen.charged
        .extend(charged.read().map(|c| (c.amount, c.outcome.is_paid())));
}

struct Harness {
    app: App,
    handles: SampleHandles,
    dir: TempDir,
}

impl Harness {
    fn new(host: MemoryHost, handles: SampleHandles, config: RerollConfig) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .insert_resource(StoragePaths::in_dir(dir.path()))
            .insert_resource(config)
            .insert_resource(RerollRng::seeded(11))
            .insert_resource(HostBridge::new(host))
            .add_plugins(ItemRerollPlugin)
            .init_resource::<Seen>()
            .add_systems(PostUpdate, record);

        let mut harness = Self { app, handles, dir };
        harness.run(3);
        assert_eq!(
            harness.app.world().resource::<State<AppState>>().get(),
            &AppState::InGame
        );
        harness
    }

    fn run(&mut self, frames: usize) {
        for _ in 0..frames {
            self.app.update();
        }
    }

    fn press(&mut self, key: &str) {
        self.app.world_mut().send_event(KeyPressed(key.to_string()));
    }

    fn host(&self) -> &dyn HostModel {
        self.app.world().resource::<HostBridge>().model()
    }

    fn contents(&self) -> Vec<item_reroll::host::ObjectId> {
        self.handles.contents(self.host(), LOOT)
    }

    fn money(&self) -> Option<i64> {
        self.handles.money(self.host())
    }

    fn seen(&self) -> &Seen {
        self.app.world().resource::<Seen>()
    }

    fn context(&self) -> &IntegrationContext {
        self.app.world().resource::<IntegrationContext>()
    }

    fn saved_prefs(&self) -> PreferenceStore {
        let paths = StoragePaths::in_dir(self.dir.path());
        PreferenceStore::open(&paths.prefs).unwrap()
    }
}

fn three_item_world() -> SampleWorld {
    SampleWorld::new()
        .entry(10, "Rope", 1)
        .entry(20, "Nails", 5)
        .entry(30, "Lamp", 1)
}

fn free_config() -> RerollConfig {
    RerollConfig {
        use_cost: false,
        ..RerollConfig::default()
    }
}

#[test]
fn single_target_at_slot_two_is_replaced_from_catalog() {
    let (mut host, handles) = three_item_world().container(LOOT, &[20]).build();
    // 前两个槽位放非物品对象，唯一的目标落在槽位 2
    let filler = host.define_type("Test", "Test.Filler").build();
    let a = host.create(&filler);
    let b = host.create(&filler);
    let original = handles.contents(&host, LOOT)[0];
    let inv = handles.inventory(LOOT).unwrap();
    host.set(
        inv,
        "content",
        HostValue::List(vec![a.into(), b.into(), original.into()]),
    );

    let mut h = Harness::new(host, handles, free_config());
    assert_eq!(h.app.world().resource::<ItemCatalog>().ids(), &[10, 20, 30]);

    h.press("F9");
    h.run(3);

    let finished = &h.seen().finished;
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].success + finished[0].fail, 1);
    assert_eq!(finished[0].success, 1);

    let contents = h.contents();
    assert_eq!(contents.len(), 3);
    assert_eq!(&contents[..2], &[a, b]);
    let fresh = contents[2];
    assert_ne!(fresh, original);
    let id = item_id(h.host(), fresh).unwrap();
    let count = stack(h.host(), fresh).unwrap();
    match id {
        10 | 30 => assert_eq!(count, 1),
        20 => assert!((1..=5).contains(&count)),
        other => panic!("unexpected id {other}"),
    }
    assert!(h.app.world().get_resource::<RerollPass>().is_none());
    assert!(h.seen().charged.is_empty());
}

#[test]
fn successful_passes_charge_and_raise_the_cost() {
    let (host, handles) = three_item_world()
        .player(&[10], 5000)
        .container(LOOT, &[10, 30])
        .build();
    let mut h = Harness::new(host, handles, RerollConfig::default());
    assert_eq!(h.context().ledger.current(), 100);

    h.press("F9");
    h.run(4);
    assert_eq!(h.money(), Some(4900));
    assert_eq!(h.seen().finished.len(), 1);
    assert_eq!(h.seen().finished[0].success, 2);
    assert_eq!(h.context().ledger.current(), 1100);
    assert_eq!(h.saved_prefs().get_int(PREFS_REROLL_COST), Some(1100));

    h.press("f9");
    h.run(4);
    assert_eq!(h.money(), Some(3800));
    assert_eq!(h.context().ledger.current(), 2100);
    assert_eq!(h.seen().charged, vec![(100, true), (1100, true)]);
    assert_ne!(h.seen().finished[0].pass, h.seen().finished[1].pass);
}

#[test]
fn failed_payment_aborts_before_any_change() {
    let (host, handles) = three_item_world()
        .player(&[], 50)
        .container(LOOT, &[10, 30])
        .build();
    let mut h = Harness::new(host, handles, RerollConfig::default());
    let before = h.contents();

    h.press("F9");
    h.run(3);
    assert_eq!(h.contents(), before);
    assert_eq!(h.money(), Some(50));
    assert!(h.seen().finished.is_empty());
    assert_eq!(h.seen().charged, vec![(100, false)]);
    assert_eq!(h.context().ledger.current(), 100);
    assert!(h.app.world().get_resource::<RerollPass>().is_none());
}

#[test]
fn triggers_during_a_pass_are_rejected() {
    let (host, handles) = three_item_world().container(LOOT, &[10, 20, 30]).build();
    let mut h = Harness::new(host, handles, free_config());

    // 同一帧两次触发
    h.press("F9");
    h.press("F9");
    h.run(1);
    assert!(h.app.world().get_resource::<RerollPass>().is_some());

    // 批次进行中再次触发
    h.press("F9");
    h.run(5);

    let finished = &h.seen().finished;
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0].success, 3);
    assert_eq!(h.contents().len(), 3);
}

#[test]
fn rebind_mode_saves_the_new_key() {
    let (host, handles) = three_item_world().container(LOOT, &[10]).build();
    let mut h = Harness::new(host, handles, free_config());

    h.press("Insert");
    h.run(1);
    h.press("k");
    h.run(1);
    assert_eq!(h.context().trigger().as_str(), "K");
    assert_eq!(h.saved_prefs().get_string(PREFS_REROLL_KEY), Some("K"));
    let paths = StoragePaths::in_dir(h.dir.path());
    let (saved, _) = RerollConfig::load_or_create(&paths.config).unwrap();
    assert_eq!(saved.trigger_key, "K");

    h.press("F9");
    h.run(2);
    assert!(h.seen().finished.is_empty());

    h.press("K");
    h.run(2);
    assert_eq!(h.seen().finished.len(), 1);
}

#[test]
fn escape_cancels_rebind() {
    let (host, handles) = three_item_world().container(LOOT, &[10]).build();
    let mut h = Harness::new(host, handles, free_config());

    h.press("Insert");
    h.press("Escape");
    h.press("J");
    h.run(2);
    assert_eq!(h.context().trigger().as_str(), "F9");
    assert!(h.seen().finished.is_empty());
}

#[test]
fn insert_configured_as_trigger_still_opens_rebind_mode() {
    let (host, handles) = three_item_world().container(LOOT, &[10]).build();
    let config = RerollConfig {
        trigger_key: "Insert".into(),
        ..free_config()
    };
    let mut h = Harness::new(host, handles, config);
    assert_eq!(h.context().trigger().as_str(), "F9");

    h.press("Insert");
    h.press("L");
    h.run(2);
    assert!(h.seen().finished.is_empty());
    assert_eq!(h.context().trigger().as_str(), "L");
}

#[test]
fn companion_price_changes_rebase_the_cost() {
    let (host, handles) = three_item_world()
        .player(&[], 5000)
        .economy()
        .price_source(150)
        .build();
    let mut h = Harness::new(host, handles, RerollConfig::default());
    assert_eq!(h.context().ledger.base(), 150);

    {
        let handles = h.handles.clone();
        let mut bridge = h.app.world_mut().resource_mut::<HostBridge>();
        assert!(handles.set_price(bridge.model_mut(), 600));
    }
    h.run(1);
    assert_eq!(h.context().ledger.base(), 600);
    assert_eq!(h.context().ledger.charge_amount(), 600);
}
