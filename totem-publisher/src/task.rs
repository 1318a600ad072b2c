use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::subject::Subject;

/// Work order consumed by Totem. Field names and order form the wire contract.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct TaskRequest {
    #[serde(rename = "primaryURI")]
    pub primary_uri: String,
    #[serde(rename = "secondaryURI")]
    pub secondary_uri: String,
    pub filename: String,
    pub tags: BTreeSet<String>,
    pub attempts: u32,
    pub download: bool,
    /// Service name to service arguments. Test requests never pass arguments.
    pub tasks: BTreeMap<String, Vec<String>>,
}

impl TaskRequest {
    pub fn for_subject(
        subject: &Subject,
        primary_base_uri: &str,
        secondary_base_uri: &str,
        tags: &BTreeSet<String>,
    ) -> Self {
        TaskRequest {
            primary_uri: join_uri(primary_base_uri, &subject.identifier),
            secondary_uri: join_uri(secondary_base_uri, &subject.identifier),
            filename: subject.identifier.clone(),
            tags: tags.clone(),
            attempts: 0,
            download: subject.kind.download(),
            tasks: subject
                .kind
                .tasks()
                .iter()
                .map(|task| (task.to_string(), vec![]))
                .collect(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn join_uri(base: &str, identifier: &str) -> String {
    format!("{}/{identifier}", base.trim_end_matches('/'))
}
