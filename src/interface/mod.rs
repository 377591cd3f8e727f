pub mod debug_cli;

pub use debug_cli::DebugCliPlugin;
