//! 两级支付：外部支付中心优先，失败再走余额适配器

use bevy::prelude::*;

use super::adapter::CurrencyAdapter;
use crate::binder::TypeResolver;
use crate::config::names::EconomyNames;
use crate::host::{HostModel, HostValue, Target};

/// 一次支付的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// 金额 ≤ 0
    Free,
    /// 外部支付中心扣款成功
    Authority,
    /// 余额适配器扣款成功
    Balance,
    /// 外部支付中心拒绝
    Declined,
    Insufficient { balance: i64 },
    /// 余额读不到，或扣款写不回去
    Unavailable,
}

impl PaymentOutcome {
    pub fn is_paid(self) -> bool {
        matches!(self, Self::Free | Self::Authority | Self::Balance)
    }
}

/// 余额不足提示的接收方
pub trait Notifier {
    fn notify(&mut self, host: &mut dyn HostModel, types: &mut TypeResolver, message: &str);
}

/// 调用宿主通知栏的静态 Push(string)，失败只记日志
#[derive(Debug, Clone)]
pub struct HostNotifier {
    names: EconomyNames,
}

impl HostNotifier {
    pub fn new(names: EconomyNames) -> Self {
        Self { names }
    }
}

impl Notifier for HostNotifier {
    fn notify(&mut self, host: &mut dyn HostModel, types: &mut TypeResolver, message: &str) {
        info!("[notify] {message}");
        let Some(ty) = types.resolve(host, &self.names.notification_type) else {
            debug!("notification type {} not loaded", self.names.notification_type);
            return;
        };
        if let Err(e) = host.invoke(
            Target::Static(&ty),
            &self.names.notify_method,
            &[HostValue::from(message)],
        ) {
            debug!("notification push failed: {e}");
        }
    }
}

/// 本地化的余额不足文本；取不到时用通用文案
pub fn shortfall_message(
    host: &mut dyn HostModel,
    types: &mut TypeResolver,
    names: &EconomyNames,
    amount: i64,
) -> String {
    localized_template(host, types, names)
        .map(|t| t.replace("{price}", &amount.to_string()))
        .unwrap_or_else(|| format!("Not enough money ({amount})"))
}

fn localized_template(
    host: &mut dyn HostModel,
    types: &mut TypeResolver,
    names: &EconomyNames,
) -> Option<String> {
    let i18n = types.resolve(host, &names.i18n_type)?;
    let manager = types.resolve(host, &names.localization_type)?;
    let key = host
        .read(Target::Static(&i18n), &names.i18n_key_field)
        .ok()?
        .as_str()
        .filter(|k| !k.is_empty())?
        .to_string();
    let text = host
        .invoke(
            Target::Static(&manager),
            &names.localize_method,
            &[HostValue::Str(key)],
        )
        .ok()?;
    text.as_str().filter(|t| !t.is_empty()).map(str::to_string)
}

/// 支付协议所需的协作者
pub struct Payments<'a> {
    pub names: &'a EconomyNames,
    pub types: &'a mut TypeResolver,
    pub adapter: &'a mut CurrencyAdapter,
    pub notifier: &'a mut dyn Notifier,
}

impl Payments<'_> {
    pub fn try_pay(&mut self, host: &mut dyn HostModel, amount: i64) -> PaymentOutcome {
        if amount <= 0 {
            return PaymentOutcome::Free;
        }

        if let Some(ok) = self.pay_via_authority(host, amount) {
            if ok {
                return PaymentOutcome::Authority;
            }
            self.notify_shortfall(host, amount);
            return PaymentOutcome::Declined;
        }

        let Some(balance) = self.adapter.get_balance(host, self.types) else {
            return PaymentOutcome::Unavailable;
        };
        if balance < amount {
            self.notify_shortfall(host, amount);
            return PaymentOutcome::Insufficient { balance };
        }
        if self.adapter.spend(host, self.types, amount)
            || self.adapter.set_balance(host, self.types, balance - amount)
        {
            PaymentOutcome::Balance
        } else {
            PaymentOutcome::Unavailable
        }
    }

    /// None 表示这一级不可用，需要回退
    fn pay_via_authority(&mut self, host: &mut dyn HostModel, amount: i64) -> Option<bool> {
        let economy = self.types.resolve(host, &self.names.payment_type)?;
        let cost_ty = self.types.resolve(host, &self.names.cost_type)?;
        let cost = match host.construct(&cost_ty, &[HostValue::Long(amount)]) {
            Ok(cost) => cost,
            Err(e) => {
                debug!("cost construction failed: {e}");
                return None;
            }
        };
        let result = host.invoke(
            Target::Static(&economy),
            &self.names.pay_method,
            &[HostValue::Object(cost), HostValue::Bool(true), HostValue::Bool(true)],
        );
        // 临时 cost 对象不再需要
        if let Err(e) = host.destroy(cost) {
            warn!("could not release the cost object: {e}");
        }
        match result {
            Ok(HostValue::Bool(ok)) => Some(ok),
            Ok(other) => {
                debug!("{} returned {:?}, falling back", self.names.pay_method, other.kind());
                None
            }
            Err(e) => {
                debug!("{} failed: {e}, falling back", self.names.pay_method);
                None
            }
        }
    }

    fn notify_shortfall(&mut self, host: &mut dyn HostModel, amount: i64) {
        let message = shortfall_message(host, self.types, self.names, amount);
        self.notifier.notify(host, self.types, &message);
    }
}
