use bevy::prelude::*;

use super::{components::*, events::*};
use crate::config::keys::{CANCEL_KEY, REBIND_KEY};
use crate::config::{KeyName, RerollConfig, StoragePaths};
use crate::core::context::IntegrationContext;
use crate::core::events::LogEvent;
use crate::data::ItemCatalog;
use crate::host::HostBridge;
use crate::inventory::{ItemLocator, SubstitutionEngine};

/// 按键分发：重绑定模式优先，其次触发键，最后是进入重绑定模式
pub fn handle_keys(
    mut keys: EventReader<KeyPressed>,
    mut mode: ResMut<RebindMode>,
    ctx: Res<IntegrationContext>,
    mut requests: EventWriter<RerollRequested>,
    mut rebinds: EventWriter<RebindKey>,
    mut log: EventWriter<LogEvent>,
) {
    for KeyPressed(raw) in keys.read() {
        let pressed = raw.trim();
        if mode.waiting {
            if pressed.eq_ignore_ascii_case(CANCEL_KEY) {
                mode.waiting = false;
                log.write(LogEvent("Rebind cancelled".into()));
                continue;
            }
            if pressed.eq_ignore_ascii_case(REBIND_KEY) {
                continue;
            }
            match KeyName::parse(pressed) {
                Ok(key) => {
                    mode.waiting = false;
                    rebinds.write(RebindKey(key));
                }
                Err(e) => debug!("ignored while rebinding: {e}"),
            }
            continue;
        }

        if ctx.trigger().matches(pressed) {
            requests.write(RerollRequested);
        } else if pressed.eq_ignore_ascii_case(REBIND_KEY) {
            mode.waiting = true;
            log.write(LogEvent(format!(
                "Press a key to bind reroll (current {}, {CANCEL_KEY} cancels)",
                ctx.trigger()
            )));
        }
    }
}

pub fn apply_rebind(
    mut rebinds: EventReader<RebindKey>,
    mut ctx: ResMut<IntegrationContext>,
    mut config: ResMut<RerollConfig>,
    paths: Option<Res<StoragePaths>>,
    mut log: EventWriter<LogEvent>,
) {
    for RebindKey(key) in rebinds.read() {
        let path = paths.as_deref().map(|p| p.config.as_path());
        ctx.rebind(key.clone(), &mut config, path);
        log.write(LogEvent(format!("Reroll key is now {key}")));
    }
}

/// 伴随模组的价格变化在这里落到账本上
pub fn sync_price(mut ctx: ResMut<IntegrationContext>, mut log: EventWriter<LogEvent>) {
    if let Some(base) = ctx.apply_price_updates() {
        log.write(LogEvent(format!(
            "Reroll base cost is now {base} (next {})",
            ctx.ledger.charge_amount()
        )));
    }
}

/// 触发 → 定位目标 → 扣费 → 创建批次
#[allow(clippy::too_many_arguments)]
pub fn start_pass(
    mut commands: Commands,
    mut requests: EventReader<RerollRequested>,
    pass: Option<Res<RerollPass>>,
    host: Option<ResMut<HostBridge>>,
    mut ctx: ResMut<IntegrationContext>,
    config: Res<RerollConfig>,
    mut counter: ResMut<PassCounter>,
    mut charged: EventWriter<CostCharged>,
    mut log: EventWriter<LogEvent>,
) {
    if requests.is_empty() {
        return;
    }
    let Some(mut host) = host else {
        requests.clear();
        warn!("reroll requested but no host is attached");
        return;
    };
    let ctx = &mut *ctx;
    let host = host.model_mut();
    let mut active = pass.is_some();

    for _ in requests.read() {
        if active {
            warn!("reroll already running, trigger ignored");
            log.write(LogEvent("Reroll already in progress".into()));
            continue;
        }

        let located = ItemLocator::new(&config.host.catalog, &config.host.container)
            .locate(host, &mut ctx.types);
        let found = match located {
            Ok(found) => found,
            Err(e) => {
                error!("could not locate items: {e}");
                log.write(LogEvent(format!("Reroll aborted: {e}")));
                continue;
            }
        };
        info!("scan: {}", found.summary());
        if found.targets.is_empty() {
            log.write(LogEvent("Nothing to reroll".into()));
            continue;
        }

        let mut paid = 0;
        if config.use_cost {
            let amount = ctx.ledger.charge_amount();
            let outcome = ctx.pay(host, &config, amount);
            charged.write(CostCharged { amount, outcome });
            if !outcome.is_paid() {
                info!("payment of {amount} failed: {outcome:?}");
                log.write(LogEvent(format!("Not enough money to reroll ({amount})")));
                continue;
            }
            paid = amount;
            log.write(LogEvent(format!("-{amount}")));
        }

        counter.0 += 1;
        let next = RerollPass::new(counter.0, found.targets, paid);
        info!("pass {} started with {} items", next.id, next.total);
        log.write(LogEvent(format!("Rerolling {} items...", next.total)));
        commands.insert_resource(next);
        active = true;
    }
}

/// 每帧只处理一个物品
#[allow(clippy::too_many_arguments)]
pub fn advance_pass(
    mut commands: Commands,
    pass: Option<ResMut<RerollPass>>,
    host: Option<ResMut<HostBridge>>,
    mut ctx: ResMut<IntegrationContext>,
    config: Res<RerollConfig>,
    catalog: Res<ItemCatalog>,
    mut rng: ResMut<RerollRng>,
    mut finished: EventWriter<RerollFinished>,
    mut log: EventWriter<LogEvent>,
) {
    let Some(mut pass) = pass else {
        return;
    };
    let ctx = &mut *ctx;

    if let Some(item) = pass.queue.pop_front() {
        let engine = SubstitutionEngine::new(&config.host.catalog, &config.host.container);
        let result = match host {
            Some(mut host) => {
                engine.reroll(host.model_mut(), &mut ctx.types, &catalog, &mut rng.0, item)
            }
            None => Err(crate::inventory::SubstitutionError::NoContainer(item)),
        };
        match result {
            Ok(fresh) => {
                pass.success += 1;
                debug!("{item:?} -> {fresh:?}");
            }
            Err(e) => {
                pass.fail += 1;
                warn!("reroll of {item:?} failed: {e}");
            }
        }
    }
    if !pass.queue.is_empty() {
        return;
    }

    if config.use_cost && pass.success > 0 {
        let next = ctx.ledger.advance();
        ctx.persist_cost();
        info!("next reroll costs {next}");
    }
    info!(
        "pass {} done: {} ok, {} failed (charged {})",
        pass.id, pass.success, pass.fail, pass.charged
    );
    log.write(LogEvent(format!(
        "Reroll done: {} succeeded, {} failed",
        pass.success, pass.fail
    )));
    finished.write(RerollFinished {
        pass: pass.id,
        success: pass.success,
        fail: pass.fail,
    });
    commands.remove_resource::<RerollPass>();
}
