//! 通货：余额适配器、支付协议、价格来源、递增费用

pub mod adapter;
pub mod cost;
pub mod payment;
pub mod price;

pub use adapter::CurrencyAdapter;
pub use cost::CostLedger;
pub use payment::{HostNotifier, Notifier, PaymentOutcome, Payments};
pub use price::{FixedPrice, HostPriceSource, PriceMailbox, PriceSource};
