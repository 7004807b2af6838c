// Visitor Domain Model

use crate::domain::QueueId;
use serde::{Deserialize, Serialize};

/// Visitor identifier
pub type VisitorId = String;

/// A person registered to wait in a queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visitor {
    pub id: VisitorId,
    pub queue_id: QueueId,

    /// Token handed out at registration, presented to claim a code
    pub token: Option<String>,

    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub identificator: String,

    pub validated: bool,
    /// Visitor agreed to have contact details kept in the visitor-info table
    pub consent: bool,

    pub created_at: i64, // epoch ms
}

impl Visitor {
    pub fn new(
        id: impl Into<String>,
        queue_id: impl Into<String>,
        name: impl Into<String>,
        identificator: impl Into<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            token: None,
            name: name.into(),
            email: None,
            phone: None,
            identificator: identificator.into(),
            validated: false,
            consent: false,
            created_at,
        }
    }
}

/// Side record kept for visitors who consented to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitorInfoRecord {
    pub id: String,
    pub queue_id: QueueId,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub recorded_at: i64, // epoch ms
}

impl VisitorInfoRecord {
    pub fn from_visitor(id: impl Into<String>, visitor: &Visitor, recorded_at: i64) -> Self {
        Self {
            id: id.into(),
            queue_id: visitor.queue_id.clone(),
            name: visitor.name.clone(),
            email: visitor.email.clone(),
            phone: visitor.phone.clone(),
            recorded_at,
        }
    }
}
