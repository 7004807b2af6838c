//! RPC Request/Response Types
//!
//! Defines the JSON-RPC method parameters and results.

use jumpqueue_core::domain::{AccessCode, IssuedCode, Lane, Queue};
use jumpqueue_core::port::{AccessCodeCriteria, StatusFilter};
use serde::{Deserialize, Serialize};

pub use jumpqueue_core::application::LookupRequest;

/// accesscode.issue.v1 / accesscode.issue_vip.v1 - Claim a code with a visitor token
#[derive(Debug, Deserialize)]
pub struct IssueRequest {
    pub token: String,
}

/// accesscode.get.v1 / accesscode.delete.v1
#[derive(Debug, Deserialize)]
pub struct AccessCodeIdRequest {
    pub access_code_id: String,
}

/// accesscode.attending.v1 / queue.get.v1
#[derive(Debug, Deserialize)]
pub struct QueueIdRequest {
    pub queue_id: String,
}

/// accesscode.search.v1 - All fields optional, absent fields do not filter
#[derive(Debug, Default, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub queue_id: Option<String>,
    #[serde(default)]
    pub lane: Option<Lane>,
    #[serde(default)]
    pub identificator: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_before: Option<i64>,
    #[serde(default)]
    pub status: StatusFilter,
}

impl From<SearchRequest> for AccessCodeCriteria {
    fn from(req: SearchRequest) -> Self {
        AccessCodeCriteria {
            queue_id: req.queue_id,
            lane: req.lane,
            identificator: req.identificator,
            email: req.email,
            created_before: req.created_before,
            status: req.status,
        }
    }
}

/// accesscode.save.v1 - Store a pre-built code, typically to seed a lane
#[derive(Debug, Deserialize)]
pub struct SaveAccessCodeRequest {
    /// Generated when absent
    #[serde(default)]
    pub access_code_id: Option<String>,
    pub queue_id: String,
    pub code: i64,
    #[serde(default = "default_lane")]
    pub lane: Lane,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub identificator: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

fn default_lane() -> Lane {
    Lane::Normal
}

/// queue.create.v1
#[derive(Debug, Deserialize)]
pub struct CreateQueueRequest {
    pub queue_id: String,
    pub name: String,
    #[serde(default)]
    pub min_wait_minutes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessCodeView {
    pub access_code_id: String,
    pub queue_id: String,
    /// Zero-padded ticket number as printed, e.g. "007"
    pub ticket: String,
    pub code: u16,
    pub lane: Lane,
    pub state: String,
    pub name: String,
    pub identificator: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,
    pub estimated_at: i64,
}

impl From<AccessCode> for AccessCodeView {
    fn from(code: AccessCode) -> Self {
        Self {
            ticket: code.code.to_string(),
            state: code.state().to_string(),
            access_code_id: code.id,
            queue_id: code.queue_id,
            code: code.code.value(),
            lane: code.lane,
            name: code.name,
            identificator: code.identificator,
            email: code.email,
            phone: code.phone,
            created_at: code.created_at,
            started_at: code.started_at,
            finished_at: code.finished_at,
            estimated_at: code.estimated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueView {
    pub queue_id: String,
    pub name: String,
    pub min_wait_minutes: i64,
    pub attending_code_id: Option<String>,
    pub created_at: i64,
}

impl From<Queue> for QueueView {
    fn from(queue: Queue) -> Self {
        Self {
            queue_id: queue.id,
            name: queue.name,
            min_wait_minutes: queue.min_wait_minutes,
            attending_code_id: queue.attending_code_id,
            created_at: queue.created_at,
        }
    }
}

/// Result of every method returning a code together with its queue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedCodeResponse {
    pub access_code: AccessCodeView,
    pub queue: QueueView,
}

impl From<IssuedCode> for IssuedCodeResponse {
    fn from(issued: IssuedCode) -> Self {
        Self {
            access_code: issued.access_code.into(),
            queue: issued.queue.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub count: usize,
    pub access_codes: Vec<AccessCodeView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub access_code_id: String,
    pub deleted: bool,
}
