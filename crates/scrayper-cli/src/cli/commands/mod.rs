//! CLI command handlers. Each command is in its own file.

mod harvest;
mod ping_db;
mod verify;

pub use harvest::run_harvest;
pub use ping_db::run_ping_db;
pub use verify::run_verify;
