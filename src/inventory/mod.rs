//! 场景物品：定位、分类、同槽位替换

pub mod filter;
pub mod locator;
pub mod substitution;

pub use filter::{Category, FilterResult, ScanFacts, classify, filter};
pub use locator::{ItemLocator, LocateError};
pub use substitution::{ContainerHandle, SubstitutionEngine, SubstitutionError};
