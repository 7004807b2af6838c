// Domain Layer - Pure business logic and entities

pub mod access_code;
pub mod error;
pub mod queue;
pub mod visitor;

// Re-exports
pub use access_code::{AccessCode, AccessCodeId, AccessCodeState, CodeNumber, IssuedCode, Lane};
pub use error::DomainError;
pub use queue::{Queue, QueueId};
pub use visitor::{Visitor, VisitorId, VisitorInfoRecord};
