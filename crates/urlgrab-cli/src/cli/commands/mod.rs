//! CLI command handlers. Each command is in its own file.

mod get;
mod info;
mod serve;

pub use get::run_get;
pub use info::run_info;
pub use serve::run_serve;
