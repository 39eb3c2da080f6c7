//! Outbound adapters implementing the domain ports.
//!
//! - [`http`]: reqwest client for the auth, customer and analytics APIs.
//! - [`sample_fallback`]: demo-mode decorator serving seed customers.
//! - [`storage`]: file-backed token slots.
//! - [`scheduler`]: tokio timers for notification expiry.

pub mod http;
pub mod sample_fallback;
pub mod scheduler;
pub mod storage;
