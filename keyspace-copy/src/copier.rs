use std::io::Write;

use derive_more::Constructor;
use tracing::{debug, info};

use crate::args::RawPredicate;
use crate::error::{Error, Result};
use crate::row::Row;
use crate::session::{RowSink, RowSource};
use crate::statement::{select_query, InsertStatement};

/// Outcome of a finished copy.
#[derive(Copy, Clone, Constructor, Debug, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct CopyReport {
    pub copied: u64,
}

/// Streams the rows matching a filter out of the source and re-inserts them, one by one, into
/// the table of the same name in the destination.
pub struct Copier<S, K> {
    source: S,
    sink: K,
    table: String,
    query: String,
}

impl<S: RowSource, K: RowSink> Copier<S, K> {
    pub fn new(source: S, sink: K, table: String, predicate: &RawPredicate) -> Self {
        let query = select_query(&table, predicate);
        Copier {
            source,
            sink,
            table,
            query,
        }
    }

    /// Runs the copy, writing a running count to `output`. The first failing insert aborts the
    /// run; rows inserted before it stay in the destination.
    pub async fn run<W: Write>(&self, output: &mut W) -> Result<CopyReport> {
        info!(table = %self.table, query = %self.query, "Starting copy.");

        let mut copied = 0;
        let mut paging_state = None;

        loop {
            let page = self
                .source
                .fetch_page(self.query.clone(), paging_state.take())
                .await?;
            debug!(rows = page.rows.len(), more = page.paging_state.is_some(), "Fetched page.");

            for cells in page.rows {
                let row = Row::decode(&page.columns, cells)?;
                if row.is_empty() {
                    return Err(Error::UnexpectedResult("row without columns".into()));
                }

                self.sink
                    .insert(InsertStatement::for_row(&self.table, row))
                    .await?;

                copied += 1;
                writeln!(output, "Copied {copied}")?;
            }

            match page.paging_state {
                Some(state) => paging_state = Some(state),
                None => break,
            }
        }

        writeln!(output, "=======")?;
        writeln!(output, "Copied {copied} entries")?;
        output.flush()?;

        info!(copied, "Copy finished.");
        Ok(CopyReport::new(copied))
    }
}
