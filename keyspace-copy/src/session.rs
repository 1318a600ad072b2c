//! Cluster access used by the copier: a paged row source bound to the source keyspace and a row
//! sink bound to the destination keyspace.

use std::sync::Arc;

use cdrs_tokio::authenticators::{SaslAuthenticatorProvider, StaticPasswordAuthenticatorProvider};
use cdrs_tokio::cluster::session::{Session, SessionBuilder, TcpSessionBuilder};
use cdrs_tokio::cluster::{NodeAddress, NodeTcpConfigBuilder, TcpConnectionManager};
use cdrs_tokio::frame::message_response::ResponseBody;
use cdrs_tokio::frame::message_result::{
    BodyResResultRows, ColSpec, ResResultBody, RowsMetadataFlags,
};
use cdrs_tokio::load_balancing::RoundRobinLoadBalancingStrategy;
use cdrs_tokio::statement::StatementParamsBuilder;
use cdrs_tokio::transport::TransportTcp;
use cdrs_tokio::types::CBytes;
use derivative::Derivative;
#[cfg(test)]
use mockall::automock;
use tracing::{debug, info};

use crate::args::{Credentials, Endpoint};
use crate::error::{Error, Result};
use crate::future::BoxFuture;
use crate::statement::InsertStatement;

pub type CurrentSession = Session<
    TransportTcp,
    TcpConnectionManager,
    RoundRobinLoadBalancingStrategy<TransportTcp, TcpConnectionManager>,
>;

/// One page of the source result set, still in wire form. Rows are decoded one at a time by the
/// copier.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Page {
    pub columns: Vec<ColSpec>,
    pub rows: Vec<Vec<CBytes>>,
    /// Present when the server has more pages to return.
    pub paging_state: Option<CBytes>,
}

impl From<BodyResResultRows> for Page {
    fn from(body: BodyResResultRows) -> Self {
        let has_more_pages = body
            .metadata
            .flags
            .contains(RowsMetadataFlags::HAS_MORE_PAGES);

        Page {
            columns: body.metadata.col_specs,
            rows: body.rows_content,
            paging_state: body.metadata.paging_state.filter(|_| has_more_pages),
        }
    }
}

/// Reads pages of rows from the source keyspace.
#[cfg_attr(test, automock)]
pub trait RowSource {
    /// Executes `query` and returns the page following `paging_state`, or the first page when
    /// there is no state.
    fn fetch_page(
        &self,
        query: String,
        paging_state: Option<CBytes>,
    ) -> BoxFuture<'static, Result<Page>>;
}

/// Writes rows into the destination keyspace.
#[cfg_attr(test, automock)]
pub trait RowSink {
    fn insert(&self, statement: InsertStatement) -> BoxFuture<'static, Result<()>>;
}

/// Authenticated cluster description shared by the source and destination sessions.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct ClusterHandle {
    contact_points: Vec<Endpoint>,
    #[derivative(Debug = "ignore")]
    authenticator: Arc<dyn SaslAuthenticatorProvider + Send + Sync>,
}

impl ClusterHandle {
    pub fn new(cluster: &[Endpoint], credentials: &Credentials) -> Self {
        ClusterHandle {
            contact_points: cluster.to_vec(),
            authenticator: Arc::new(StaticPasswordAuthenticatorProvider::new(
                &credentials.username,
                &credentials.password,
            )),
        }
    }

    /// Opens a session with `keyspace` as its current keyspace.
    pub async fn connect(&self, keyspace: &str) -> Result<CurrentSession> {
        debug!(keyspace, contact_points = self.contact_points.len(), "Connecting.");

        let config = self
            .contact_points
            .iter()
            .fold(NodeTcpConfigBuilder::new(), |builder, endpoint| {
                builder.with_contact_point(NodeAddress::from(endpoint.to_string()))
            })
            .with_authenticator_provider(self.authenticator.clone())
            .build()
            .await?;

        let session = TcpSessionBuilder::new(RoundRobinLoadBalancingStrategy::new(), config)
            .with_keyspace(keyspace.to_string())
            .build()
            .await?;

        info!(keyspace, "Connected.");
        Ok(session)
    }
}

/// Paged reads through a session bound to the source keyspace.
pub struct CassandraSource {
    session: Arc<CurrentSession>,
    page_size: i32,
}

impl CassandraSource {
    pub fn new(session: CurrentSession, page_size: i32) -> Self {
        CassandraSource {
            session: Arc::new(session),
            page_size,
        }
    }
}

impl RowSource for CassandraSource {
    fn fetch_page(
        &self,
        query: String,
        paging_state: Option<CBytes>,
    ) -> BoxFuture<'static, Result<Page>> {
        let session = self.session.clone();
        let mut params = StatementParamsBuilder::new().with_page_size(self.page_size);
        if let Some(paging_state) = paging_state {
            params = params.with_paging_state(paging_state);
        }

        Box::pin(async move {
            let body = session
                .query_with_params(query, params.build())
                .await?
                .response_body()?;

            match body {
                ResponseBody::Result(ResResultBody::Rows(rows)) => Ok(rows.into()),
                other => Err(Error::UnexpectedResult(format!(
                    "source query should yield rows, got {other:?}"
                ))),
            }
        })
    }
}

/// Inserts through a session bound to the destination keyspace.
pub struct CassandraSink {
    session: Arc<CurrentSession>,
}

impl CassandraSink {
    pub fn new(session: CurrentSession) -> Self {
        CassandraSink {
            session: Arc::new(session),
        }
    }
}

impl RowSink for CassandraSink {
    fn insert(&self, statement: InsertStatement) -> BoxFuture<'static, Result<()>> {
        let session = self.session.clone();

        Box::pin(async move {
            let params = StatementParamsBuilder::new()
                .with_values(statement.values)
                .build();

            session.query_with_params(statement.query, params).await?;
            Ok(())
        })
    }
}
