// Access Code Domain Model

use crate::domain::error::{DomainError, Result};
use crate::domain::QueueId;
use serde::{Deserialize, Serialize};

/// Access code ID (UUID v4)
pub type AccessCodeId = String;

/// Printed ticket number, always within 1..=999
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct CodeNumber(u16);

impl CodeNumber {
    pub const MIN: CodeNumber = CodeNumber(1);
    pub const MAX: CodeNumber = CodeNumber(999);

    pub fn new(value: i64) -> Result<Self> {
        if (Self::MIN.0 as i64..=Self::MAX.0 as i64).contains(&value) {
            Ok(Self(value as u16))
        } else {
            Err(DomainError::CodeOutOfRange(value))
        }
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Successor on the ticket roll: 999 wraps to 1
    pub fn wrapping_next(self) -> Self {
        if self < Self::MAX {
            Self(self.0 + 1)
        } else {
            Self::MIN
        }
    }
}

impl TryFrom<i64> for CodeNumber {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CodeNumber> for i64 {
    fn from(code: CodeNumber) -> Self {
        code.0 as i64
    }
}

impl std::fmt::Display for CodeNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:03}", self.0)
    }
}

/// Service lane within a queue. Each lane has its own ticket roll.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lane {
    Normal,
    Priority,
}

impl Lane {
    pub fn is_priority(self) -> bool {
        matches!(self, Lane::Priority)
    }

    pub fn from_priority(priority: bool) -> Self {
        if priority {
            Lane::Priority
        } else {
            Lane::Normal
        }
    }
}

impl std::fmt::Display for Lane {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lane::Normal => write!(f, "NORMAL"),
            Lane::Priority => write!(f, "PRIORITY"),
        }
    }
}

/// Service state, derived from the start/end timestamps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccessCodeState {
    Created,
    InService,
    Completed,
}

impl std::fmt::Display for AccessCodeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccessCodeState::Created => write!(f, "CREATED"),
            AccessCodeState::InService => write!(f, "IN_SERVICE"),
            AccessCodeState::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// Access Code Entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessCode {
    pub id: AccessCodeId,
    pub queue_id: QueueId,

    // Visitor identity, copied at issuance
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub identificator: String,

    pub code: CodeNumber,
    pub lane: Lane,

    pub created_at: i64, // epoch ms
    pub started_at: Option<i64>,
    pub finished_at: Option<i64>,

    /// Predicted time the visitor will be called, whole seconds (as epoch ms)
    pub estimated_at: i64,
}

impl AccessCode {
    /// Create a new access code in the CREATED state
    ///
    /// # Arguments
    ///
    /// * `id` - Unique ID (injected, not generated)
    /// * `created_at` - Creation timestamp in epoch ms (injected, not system time)
    /// * `queue_id` - Owning queue
    /// * `code` - Ticket number
    /// * `lane` - Lane the number was drawn from
    pub fn new(
        id: impl Into<String>,
        created_at: i64,
        queue_id: impl Into<String>,
        code: CodeNumber,
        lane: Lane,
    ) -> Self {
        Self {
            id: id.into(),
            queue_id: queue_id.into(),
            name: String::new(),
            email: None,
            phone: None,
            identificator: String::new(),
            code,
            lane,
            created_at,
            started_at: None,
            finished_at: None,
            estimated_at: created_at,
        }
    }

    /// Copy the holder's identity onto the code
    pub fn assign_to(&mut self, visitor: &crate::domain::Visitor) {
        self.name = visitor.name.clone();
        self.email = visitor.email.clone();
        self.phone = visitor.phone.clone();
        self.identificator = visitor.identificator.clone();
    }

    pub fn state(&self) -> AccessCodeState {
        match (self.started_at, self.finished_at) {
            (_, Some(_)) => AccessCodeState::Completed,
            (Some(_), None) => AccessCodeState::InService,
            (None, None) => AccessCodeState::Created,
        }
    }

    pub fn is_consumed(&self) -> bool {
        self.state() == AccessCodeState::Completed
    }

    /// Whole seconds spent at the desk, for completed codes
    pub fn service_secs(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some(end.div_euclid(1000) - start.div_euclid(1000)),
            _ => None,
        }
    }

    /// Transition to IN_SERVICE with explicit timestamp
    pub fn start(&mut self, now_millis: i64) -> Result<()> {
        if self.state() != AccessCodeState::Created {
            return Err(DomainError::InvalidStateTransition {
                from: self.state().to_string(),
                to: AccessCodeState::InService.to_string(),
            });
        }
        self.started_at = Some(now_millis);
        Ok(())
    }

    /// Transition to COMPLETED with explicit timestamp
    pub fn complete(&mut self, now_millis: i64) -> Result<()> {
        if self.state() != AccessCodeState::InService {
            return Err(DomainError::InvalidStateTransition {
                from: self.state().to_string(),
                to: AccessCodeState::Completed.to_string(),
            });
        }
        self.finished_at = Some(now_millis);
        Ok(())
    }
}

/// An access code paired with the queue it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedCode {
    pub access_code: AccessCode,
    pub queue: crate::domain::Queue,
}
