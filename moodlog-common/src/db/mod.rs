//! Database models and queries

pub mod init;
pub mod logs;
pub mod models;

pub use init::*;
pub use logs::*;
pub use models::*;
