use std::io::Write;

use tracing::{debug, info};

use crate::broker::TaskBroker;
use crate::config::PublisherConfig;
use crate::error::Result;
use crate::task::TaskRequest;

/// Publishes one task request per selected subject.
pub struct Publisher<B> {
    broker: B,
    config: PublisherConfig,
}

impl<B: TaskBroker> Publisher<B> {
    pub fn new(broker: B, config: PublisherConfig) -> Self {
        Publisher { broker, config }
    }

    /// Declares the work queue, publishes every selected subject in order echoing each document
    /// to `output`, and closes the broker connection. Stops at the first failure.
    pub async fn run<W: Write>(&self, output: &mut W) -> Result<usize> {
        self.broker.declare_queue(self.config.queue_spec()).await?;

        let mut published = 0;
        for subject in self.config.selected_subjects() {
            let document = TaskRequest::for_subject(
                subject,
                &self.config.primary_base_uri,
                &self.config.secondary_base_uri,
                &self.config.tags,
            )
            .to_json()?;

            self.broker
                .publish(
                    self.config.exchange.clone(),
                    self.config.routing_key.clone(),
                    document.clone().into_bytes(),
                )
                .await?;
            debug!(subject = %subject.identifier, kind = ?subject.kind, "Published task request.");

            writeln!(output, "{document}")?;
            writeln!(output)?;
            published += 1;
        }
        output.flush()?;

        self.broker.close().await?;

        info!(count = published, exchange = %self.config.exchange, "Publishing finished.");
        Ok(published)
    }
}
