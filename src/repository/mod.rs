//! Row-level access to the SQLite store.
//!
//! Every function takes `&Connection`, so callers can pass either a pooled
//! connection or an open `Transaction`.

pub mod comments;
pub mod follows;
pub mod notifications;
pub mod posts;
pub mod reports;
pub mod stats;
pub mod uploads;
pub mod users;
