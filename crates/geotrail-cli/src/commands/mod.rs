//! Command implementations for the CLI.

mod extract;
mod inspect;
mod schema;

pub use extract::cmd_extract;
pub use inspect::cmd_inspect;
pub use schema::{cmd_config, cmd_schema};
