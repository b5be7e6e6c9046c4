//! Personal workout tracker: sessions, sets, supplements checklist, body
//! profile and the statistics derived from them, kept in a local SQLite
//! key-value store.

pub mod collections;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod session;
pub mod stats;
pub mod storage;
pub mod types;
pub mod utils;

pub use types::{OutputFmt, emit};
