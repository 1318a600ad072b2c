//! **totem-publisher** drives the Totem static analysis pipeline by hand: it publishes one task
//! request per test subject to the work exchange and echoes every published document.
//!
//! Subjects are IP addresses, domain names or SHA-256 hashes of samples served by the local
//! storage service. The kind of a subject decides which analysis services receive it and whether
//! the sample has to be downloaded first (see [`subject::SubjectKind`]). Everything else, from
//! the broker address to the subject list, comes from [`config::PublisherConfig`], whose defaults
//! match a local test setup.

pub mod broker;
pub mod config;
pub mod error;
pub mod future;
pub mod publisher;
pub mod subject;
pub mod task;

pub use error::{Error, Result};
