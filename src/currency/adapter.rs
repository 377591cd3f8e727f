use bevy::prelude::*;

use crate::binder::{
    Adjustable, BindingTarget, CapabilityBinder, Readable, ResolutionHints, TypeResolver, Writable,
};
use crate::host::HostModel;

/// 数值余额适配器：首次使用时绑定，成功后缓存，不会自动失效
#[derive(Debug, Clone)]
pub struct CurrencyAdapter {
    hints: ResolutionHints,
    player_tag: String,
    debug: bool,
    binding: Option<BindingTarget>,
}

impl CurrencyAdapter {
    pub fn new(hints: ResolutionHints, player_tag: impl Into<String>, debug: bool) -> Self {
        Self {
            hints,
            player_tag: player_tag.into(),
            debug,
            binding: None,
        }
    }

    pub fn binding(&self) -> Option<&BindingTarget> {
        self.binding.as_ref()
    }

    fn ensure_bound(&mut self, host: &dyn HostModel, types: &mut TypeResolver) -> bool {
        if self.binding.is_none() {
            self.binding = CapabilityBinder::new(&self.hints, &self.player_tag)
                .with_debug(self.debug)
                .resolve(host, types);
        }
        self.binding.is_some()
    }

    /// 加载阶段提前绑定一次
    pub fn warm_up(&mut self, host: &dyn HostModel, types: &mut TypeResolver) -> bool {
        let bound = self.ensure_bound(host, types);
        if bound {
            info!("currency bound early");
        } else {
            info!("currency not bound yet, will retry on first use");
        }
        bound
    }

    pub fn get_balance(
        &mut self,
        host: &mut dyn HostModel,
        types: &mut TypeResolver,
    ) -> Option<i64> {
        if !self.ensure_bound(host, types) {
            return None;
        }
        self.binding.as_ref()?.read(host)
    }

    pub fn set_balance(
        &mut self,
        host: &mut dyn HostModel,
        types: &mut TypeResolver,
        value: i64,
    ) -> bool {
        if !self.ensure_bound(host, types) {
            return false;
        }
        self.binding
            .as_ref()
            .is_some_and(|b| b.write(host, value))
    }

    /// 通过增减方法扣款（传入负的金额）；没有增减方法时返回 false
    pub fn spend(&mut self, host: &mut dyn HostModel, types: &mut TypeResolver, amount: i64) -> bool {
        let Some(delta) = amount.checked_neg() else {
            return false;
        };
        if !self.ensure_bound(host, types) {
            return false;
        }
        let ok = self
            .binding
            .as_ref()
            .is_some_and(|b| b.adjust(host, delta));
        if self.debug {
            info!("[currency] spend({amount}) -> {ok}");
        }
        ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryHost;
    use crate::host::sample::{PLAYER_TAG, SampleWorld};
    use crate::host::{HostError, HostValue, ObjectId, ValueKind};

    #[test]
    fn binds_player_wallet_lazily_and_caches_it() {
        let (mut host, handles) = SampleWorld::new().player(&[], 5000).build();
        let mut types = TypeResolver::new();
        let mut adapter = CurrencyAdapter::new(ResolutionHints::default(), PLAYER_TAG, false);
        assert!(adapter.binding().is_none());

        assert_eq!(adapter.get_balance(&mut host, &mut types), Some(5000));
        assert_eq!(adapter.binding().map(|b| b.instance), handles.wallet);

        assert!(adapter.set_balance(&mut host, &mut types, 3800));
        assert_eq!(handles.money(&host), Some(3800));
        // 钱包只有字段，没有增减方法
        assert!(!adapter.spend(&mut host, &mut types, 100));
    }

    #[test]
    fn unbound_adapter_degrades_to_no_ops() {
        let mut host = MemoryHost::new();
        let mut types = TypeResolver::new();
        let mut adapter = CurrencyAdapter::new(ResolutionHints::default(), PLAYER_TAG, true);
        assert!(!adapter.warm_up(&host, &mut types));
        assert_eq!(adapter.get_balance(&mut host, &mut types), None);
        assert!(!adapter.set_balance(&mut host, &mut types, 1));
        assert!(!adapter.spend(&mut host, &mut types, 1));
    }

    #[test]
    fn spend_uses_hinted_adjuster_with_negated_amount() {
        let mut host = MemoryHost::new();
        let ty = host
            .define_type("Game", "Game.Bank")
            .field("vault", ValueKind::Long)
            .method("Balance", &[], ValueKind::Long, |h, this, _| {
                let this = this.ok_or(HostError::MissingObject(ObjectId(0)))?;
                Ok(h.get(this, "vault").cloned().unwrap_or(HostValue::Long(0)))
            })
            .method("Add", &[ValueKind::Long], ValueKind::Void, |h, this, args| {
                let this = this.ok_or(HostError::MissingObject(ObjectId(0)))?;
                let cur = h.get(this, "vault").and_then(HostValue::as_i64).unwrap_or(0);
                let delta = args[0].as_i64().unwrap_or(0);
                h.set(this, "vault", cur + delta);
                Ok(HostValue::Null)
            })
            .build();
        let node = host.spawn_node("BankRoot", None);
        let bank = host.attach(node, &ty);
        host.set(bank, "vault", 900i64);

        let hints = ResolutionHints {
            type_name: Some("Bank".into()),
            get_method: Some("Balance".into()),
            adjust_method: Some("Add".into()),
            ..Default::default()
        };
        let mut types = TypeResolver::new();
        let mut adapter = CurrencyAdapter::new(hints, PLAYER_TAG, false);
        assert!(adapter.spend(&mut host, &mut types, 250));
        assert_eq!(adapter.get_balance(&mut host, &mut types), Some(650));
        assert!(!adapter.spend(&mut host, &mut types, i64::MIN));
    }

    #[test]
    fn late_wallet_is_bound_on_retry() {
        let mut host = MemoryHost::new();
        let mut types = TypeResolver::new();
        let mut adapter = CurrencyAdapter::new(ResolutionHints::default(), PLAYER_TAG, false);
        assert_eq!(adapter.get_balance(&mut host, &mut types), None);

        let ty = host
            .define_type("Game", "Game.Purse")
            .field("credits", ValueKind::Int)
            .build();
        let node = host.spawn_node("PlayerRoot", None);
        let purse = host.attach(node, &ty);
        host.set(purse, "credits", 12);
        assert_eq!(adapter.get_balance(&mut host, &mut types), Some(12));
    }
}
