//! Multi-step form workflows for criminal legal aid claims.
//!
//! Two application families share one step engine: non-standard magistrates'
//! fee claims and prior authority applications. Each workflow validates one
//! step at a time, derives task statuses from the stored record and its
//! navigation history, and routes the provider to the next step through a
//! decision tree.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
