//! Message broker access: queue declaration, publishing and shutdown behind [`TaskBroker`], with
//! an AMQP implementation on top of `lapin`.

use std::sync::Arc;

use derive_more::Constructor;
use lapin::options::{BasicPublishOptions, QueueDeclareOptions};
use lapin::types::FieldTable;
use lapin::{BasicProperties, Channel, Connection, ConnectionProperties};
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

use crate::error::Result;
use crate::future::BoxFuture;

const REPLY_SUCCESS: u16 = 200;

/// Attributes of a queue to declare.
#[derive(Clone, Constructor, Debug, Eq, PartialEq, Hash)]
pub struct QueueSpec {
    pub name: String,
    pub durable: bool,
    pub exclusive: bool,
    pub auto_delete: bool,
}

impl QueueSpec {
    /// A durable, shared queue which survives its consumers.
    pub fn work_queue(name: String) -> Self {
        QueueSpec::new(name, true, false, false)
    }
}

impl From<&QueueSpec> for QueueDeclareOptions {
    fn from(queue: &QueueSpec) -> Self {
        QueueDeclareOptions {
            durable: queue.durable,
            exclusive: queue.exclusive,
            auto_delete: queue.auto_delete,
            ..Default::default()
        }
    }
}

#[cfg_attr(test, automock)]
pub trait TaskBroker {
    /// Creates the queue if absent. Declaring an existing queue with the same attributes
    /// succeeds.
    fn declare_queue(&self, queue: QueueSpec) -> BoxFuture<'static, Result<()>>;

    fn publish(
        &self,
        exchange: String,
        routing_key: String,
        payload: Vec<u8>,
    ) -> BoxFuture<'static, Result<()>>;

    fn close(&self) -> BoxFuture<'static, Result<()>>;
}

/// One AMQP connection with a single channel.
pub struct AmqpBroker {
    connection: Arc<Connection>,
    channel: Channel,
}

impl AmqpBroker {
    pub async fn connect(uri: &str) -> Result<Self> {
        let connection = Connection::connect(uri, ConnectionProperties::default()).await?;
        let channel = connection.create_channel().await?;

        info!(channel = channel.id(), "Connected to broker.");
        Ok(AmqpBroker {
            connection: Arc::new(connection),
            channel,
        })
    }
}

impl TaskBroker for AmqpBroker {
    fn declare_queue(&self, queue: QueueSpec) -> BoxFuture<'static, Result<()>> {
        let channel = self.channel.clone();

        Box::pin(async move {
            let declared = channel
                .queue_declare(&queue.name, (&queue).into(), FieldTable::default())
                .await?;

            debug!(
                queue = %queue.name,
                messages = declared.message_count(),
                consumers = declared.consumer_count(),
                "Declared queue."
            );
            Ok(())
        })
    }

    fn publish(
        &self,
        exchange: String,
        routing_key: String,
        payload: Vec<u8>,
    ) -> BoxFuture<'static, Result<()>> {
        let channel = self.channel.clone();

        Box::pin(async move {
            // publisher confirms are not enabled on the channel, so there is nothing to wait for
            channel
                .basic_publish(
                    &exchange,
                    &routing_key,
                    BasicPublishOptions::default(),
                    &payload,
                    BasicProperties::default(),
                )
                .await?;

            debug!(%exchange, %routing_key, bytes = payload.len(), "Published.");
            Ok(())
        })
    }

    fn close(&self) -> BoxFuture<'static, Result<()>> {
        let connection = self.connection.clone();

        Box::pin(async move {
            connection.close(REPLY_SUCCESS, "OK").await?;
            info!("Closed broker connection.");
            Ok(())
        })
    }
}
