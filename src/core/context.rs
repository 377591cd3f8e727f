//! 集成上下文：类型缓存、通货绑定、费用账本、价格邮箱、偏好存储集中在一个资源里

use std::path::Path;

use bevy::prelude::*;

use crate::binder::TypeResolver;
use crate::config::prefs::{PREFS_REROLL_COST, PREFS_REROLL_KEY};
use crate::config::{KeyName, PreferenceStore, RerollConfig};
use crate::currency::{
    CostLedger, CurrencyAdapter, FixedPrice, HostNotifier, HostPriceSource, PaymentOutcome,
    Payments, PriceMailbox, PriceSource,
};
use crate::host::HostModel;

#[derive(Resource)]
pub struct IntegrationContext {
    pub prefs: PreferenceStore,
    pub types: TypeResolver,
    pub currency: CurrencyAdapter,
    pub ledger: CostLedger,
    mailbox: PriceMailbox,
    notifier: HostNotifier,
    trigger: KeyName,
}

impl IntegrationContext {
    pub fn load(host: &mut dyn HostModel, config: &RerollConfig, prefs: PreferenceStore) -> Self {
        let trigger = resolve_trigger(config, &prefs);
        let mut types = TypeResolver::new();

        let price: Box<dyn PriceSource + Send + Sync> =
            match HostPriceSource::discover(host, &mut types, &config.host.economy) {
                Some(source) => {
                    info!("external price source found");
                    Box::new(source)
                }
                None => Box::new(FixedPrice(config.fallback_base_cost)),
            };
        let base = price
            .current_price(host)
            .filter(|p| *p > 0)
            .unwrap_or(config.fallback_base_cost);
        let mailbox = PriceMailbox::default();
        if price.on_price_changed(host, mailbox.callback()) {
            debug!("subscribed to price changes");
        }

        let ledger = CostLedger::new(base, config.cost_step, prefs.get_int(PREFS_REROLL_COST));
        let mut currency = CurrencyAdapter::new(
            config.currency.clone(),
            config.host.container.player_tag.clone(),
            config.debug_currency,
        );
        currency.warm_up(host, &mut types);

        let mut context = Self {
            prefs,
            types,
            currency,
            ledger,
            mailbox,
            notifier: HostNotifier::new(config.host.economy.clone()),
            trigger,
        };
        context.persist_cost();
        info!(
            "reroll ready: key {}, cost {} (base {}, step {})",
            context.trigger,
            context.ledger.current(),
            context.ledger.base(),
            context.ledger.step()
        );
        context
    }

    pub fn trigger(&self) -> &KeyName {
        &self.trigger
    }

    /// 取走回调期间积累的价格变化，返回新的基础费用
    pub fn apply_price_updates(&mut self) -> Option<i64> {
        let price = self.mailbox.take()?;
        self.ledger.rebase(price).then(|| {
            info!("base cost changed to {price}, current {}", self.ledger.current());
            self.persist_cost();
            price
        })
    }

    pub fn persist_cost(&mut self) {
        self.prefs.set_int(PREFS_REROLL_COST, self.ledger.current());
        if let Err(e) = self.prefs.save() {
            warn!("could not save reroll cost: {e}");
        }
    }

    /// 写入偏好并改写配置文件
    pub fn rebind(&mut self, key: KeyName, config: &mut RerollConfig, config_path: Option<&Path>) {
        self.prefs.set_string(PREFS_REROLL_KEY, key.as_str());
        if let Err(e) = self.prefs.save() {
            warn!("could not save reroll key: {e}");
        }
        config.trigger_key = key.to_string();
        if let Some(path) = config_path {
            if let Err(e) = config.save(path) {
                warn!("could not rewrite config: {e}");
            }
        }
        info!("reroll key bound to {key}");
        self.trigger = key;
    }

    pub fn pay(&mut self, host: &mut dyn HostModel, config: &RerollConfig, amount: i64) -> PaymentOutcome {
        let mut payments = Payments {
            names: &config.host.economy,
            types: &mut self.types,
            adapter: &mut self.currency,
            notifier: &mut self.notifier,
        };
        payments.try_pay(host, amount)
    }

    pub fn balance(&mut self, host: &mut dyn HostModel) -> Option<i64> {
        self.currency.get_balance(host, &mut self.types)
    }
}

/// 配置里的键优先；配置仍是默认键时，用偏好里保存的键
pub fn resolve_trigger(config: &RerollConfig, prefs: &PreferenceStore) -> KeyName {
    let configured = config.trigger_key();
    if configured != KeyName::default_trigger() {
        return configured;
    }
    match prefs.get_string(PREFS_REROLL_KEY).map(KeyName::parse) {
        Some(Ok(saved)) => saved,
        Some(Err(e)) => {
            warn!("saved reroll key ignored: {e}");
            configured
        }
        None => configured,
    }
}
