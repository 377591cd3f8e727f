use bevy::prelude::*;
use uuid::Uuid;

use crate::config::KeyName;
use crate::currency::PaymentOutcome;

/// 宿主转发的按键（原始键名）
#[derive(Event, Debug, Clone)]
pub struct KeyPressed(pub String);

/// 开始一个重抽批次
#[derive(Event, Debug, Clone, Default)]
pub struct RerollRequested;

#[derive(Event, Debug, Clone)]
pub struct CostCharged {
    pub amount: i64,
    pub outcome: PaymentOutcome,
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct RerollFinished {
    pub pass: Uuid,
    pub success: usize,
    pub fail: usize,
}

/// 把触发键改成指定键
#[derive(Event, Debug, Clone)]
pub struct RebindKey(pub KeyName);
