//! 动态能力绑定：类型解析 + 解析阶梯 + 能力 trait

pub mod capability;
pub mod hints;
pub mod ladder;
pub mod resolver;

pub use capability::{
    Adjustable, BindingTarget, Indexed, MemberSlot, MethodHandle, Readable, ResolutionRung,
    Writable,
};
pub use hints::ResolutionHints;
pub use ladder::CapabilityBinder;
pub use resolver::TypeResolver;
