//! Command implementations.

pub mod config;
pub mod extract;
pub mod index;
pub mod read;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::index::execute_index;
pub use self::read::execute_read;
