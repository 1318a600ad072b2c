//! **keyspace-copy** copies the rows of one table matching a filter from a source keyspace into
//! the table of the same name in a destination keyspace of the same Cassandra cluster.
//!
//! ```text
//! keyspace-copy holmes_totem holmes results "service_name = 'yara'" \
//!     "['10.0.4.80','10.0.4.81']" cassandra password
//! ```
//!
//! The filter is spliced verbatim into `SELECT * FROM <table> WHERE <filter>`, so it must only
//! come from a trusted operator. Each returned row is decoded without any schema knowledge (see
//! [`row`]) and re-inserted with an `INSERT` listing exactly the columns of that row. Rows are
//! streamed page by page and never buffered as a whole; the first failing insert stops the run
//! without rolling back what was already copied.

pub mod args;
pub mod confirm;
pub mod copier;
pub mod error;
pub mod future;
pub mod row;
pub mod session;
pub mod statement;

pub use error::{Error, Result};
