//! JSON-RPC API Layer
//!
//! Exposes access code issuance, lookup and queries as JSON-RPC 2.0 methods.

pub mod error;
pub mod handler;
pub mod server;
pub mod types;

pub use handler::RpcHandler;
pub use server::{RpcServer, RpcServerConfig, RpcServerError};
