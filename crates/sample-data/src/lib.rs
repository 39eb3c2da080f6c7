//! Fixed sample customer records for offline and demo use.
//!
//! The CRM client falls back to these records when the customer API cannot
//! be reached and the sample fallback mode is enabled. The records are
//! embedded at compile time from `fixtures/sample_customers.json` and are kept
//! independent of the client's domain types; the client validates and
//! converts them on load.
//!
//! # Example
//!
//! ```
//! use sample_data::{find_sample_customer, sample_customers};
//!
//! let customers = sample_customers().expect("embedded fixture parses");
//! assert_eq!(customers.len(), 5);
//!
//! let bob = find_sample_customer("2").expect("embedded fixture parses");
//! assert_eq!(bob.map(|c| c.company), Some("Design Studio".to_owned()));
//! ```

mod error;
mod seed;

pub use error::SampleDataError;
pub use seed::{SampleCustomer, find_sample_customer, sample_customers};
