// Queue Domain Model

use serde::{Deserialize, Serialize};

/// Queue identifier
pub type QueueId = String;

/// A physical queue visitors wait in.
///
/// Provisioned by an administrator; the issuance flow only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    pub id: QueueId,
    pub name: String,

    /// Lower bound for every wait estimate handed out by this queue
    pub min_wait_minutes: i64,

    /// Code currently being served at the desk, if any
    pub attending_code_id: Option<String>,

    pub created_at: i64, // epoch ms
}

impl Queue {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        min_wait_minutes: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            min_wait_minutes,
            attending_code_id: None,
            created_at,
        }
    }
}
