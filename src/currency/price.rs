//! 外部价格来源（可选伴随模组）

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use bevy::prelude::*;

use crate::binder::TypeResolver;
use crate::binder::ladder::singleton_or_any;
use crate::config::names::EconomyNames;
use crate::host::{HostModel, HostValue, MemberShape, ObjectId, Target};

/// 价格变化回调，参数为新价格
pub type PriceCallback = Box<dyn Fn(i64) + Send + Sync>;

pub trait PriceSource {
    fn current_price(&self, host: &mut dyn HostModel) -> Option<i64>;
    /// 注册变化回调；宿主不支持时返回 false
    fn on_price_changed(&self, host: &mut dyn HostModel, callback: PriceCallback) -> bool;
}

/// 宿主侧的价格设置项：`SettingManager.Instance.<setting>.GetAsLong()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPriceSource {
    setting: ObjectId,
    getter: String,
    event: String,
}

impl HostPriceSource {
    pub fn discover(
        host: &dyn HostModel,
        types: &mut TypeResolver,
        names: &EconomyNames,
    ) -> Option<Self> {
        let manager_ty = types.resolve(host, &names.settings_type)?;
        let manager = singleton_or_any(host, &manager_ty)?;
        let setting = host
            .read(Target::Instance(manager), &names.price_setting)
            .ok()?
            .as_object()?;
        let setting_ty = host.type_of(setting).ok()?;
        let has_getter = host
            .members_named(&setting_ty, &names.price_getter)
            .iter()
            .any(|m| match &m.shape {
                MemberShape::Method { params, returns } => params.is_empty() && returns.is_numeric(),
                _ => false,
            });
        if !has_getter {
            debug!("{} has no usable {}", setting_ty, names.price_getter);
            return None;
        }
        Some(Self {
            setting,
            getter: names.price_getter.clone(),
            event: names.price_event.clone(),
        })
    }
}

impl PriceSource for HostPriceSource {
    fn current_price(&self, host: &mut dyn HostModel) -> Option<i64> {
        host.invoke(Target::Instance(self.setting), &self.getter, &[])
            .ok()?
            .as_i64()
    }

    fn on_price_changed(&self, host: &mut dyn HostModel, callback: PriceCallback) -> bool {
        let subscribed = host.subscribe(
            self.setting,
            &self.event,
            Box::new(move |value: &HostValue| {
                if let Some(price) = value.as_i64() {
                    callback(price);
                }
            }),
        );
        match subscribed {
            Ok(()) => true,
            Err(e) => {
                debug!("price change subscription failed: {e}");
                false
            }
        }
    }
}

/// 价格更新邮箱：回调线程只写，每帧由系统取走最新值
#[derive(Debug, Clone, Default)]
pub struct PriceMailbox(Arc<AtomicI64>);

impl PriceMailbox {
    /// 只接受正数
    pub fn post(&self, price: i64) {
        if price > 0 {
            self.0.store(price, Ordering::Release);
        }
    }

    pub fn take(&self) -> Option<i64> {
        match self.0.swap(0, Ordering::AcqRel) {
            0 => None,
            price => Some(price),
        }
    }

    pub fn callback(&self) -> PriceCallback {
        let mailbox = self.clone();
        Box::new(move |price| mailbox.post(price))
    }
}

/// 没有价格来源时的固定价格
#[derive(Debug, Clone, Copy)]
pub struct FixedPrice(pub i64);

impl PriceSource for FixedPrice {
    fn current_price(&self, _: &mut dyn HostModel) -> Option<i64> {
        Some(self.0)
    }

    fn on_price_changed(&self, _: &mut dyn HostModel, _: PriceCallback) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::sample::SampleWorld;

    #[test]
    fn discovers_setting_and_follows_changes() {
        let (mut host, handles) = SampleWorld::new().price_source(150).build();
        let mut types = TypeResolver::new();
        let source = HostPriceSource::discover(&host, &mut types, &EconomyNames::default()).unwrap();
        assert_eq!(source.current_price(&mut host), Some(150));

        let mailbox = PriceMailbox::default();
        assert!(source.on_price_changed(&mut host, mailbox.callback()));
        assert_eq!(mailbox.take(), None);

        assert!(handles.set_price(&mut host, 400));
        assert_eq!(source.current_price(&mut host), Some(400));
        assert_eq!(mailbox.take(), Some(400));
        assert_eq!(mailbox.take(), None);
    }

    #[test]
    fn missing_companion_yields_no_source() {
        let (host, _) = SampleWorld::new().build();
        let mut types = TypeResolver::new();
        assert!(HostPriceSource::discover(&host, &mut types, &EconomyNames::default()).is_none());
    }

    #[test]
    fn mailbox_ignores_non_positive_prices() {
        let mailbox = PriceMailbox::default();
        mailbox.post(0);
        mailbox.post(-3);
        assert_eq!(mailbox.take(), None);
        mailbox.post(7);
        mailbox.post(9);
        assert_eq!(mailbox.take(), Some(9));
    }
}
