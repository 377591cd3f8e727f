use bevy::prelude::*;

/// 面向用户的一行输出，由 main 打印
#[derive(Event, Debug, Clone)]
pub struct LogEvent(pub String);
