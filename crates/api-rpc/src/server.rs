//! JSON-RPC Server
//!
//! Serves the access code API over HTTP on a TCP address.

use crate::handler::RpcHandler;
use crate::types::{
    AccessCodeIdRequest, CreateQueueRequest, IssueRequest, LookupRequest, QueueIdRequest,
    SaveAccessCodeRequest, SearchRequest,
};
use jsonrpsee::server::{Server, ServerHandle};
use jsonrpsee::RpcModule;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

const DEFAULT_RPC_HOST: &str = "127.0.0.1";
const DEFAULT_RPC_PORT: u16 = 9527;

#[derive(Error, Debug)]
pub enum RpcServerError {
    #[error("Failed to build server on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to register method {method}: {reason}")]
    Register { method: &'static str, reason: String },
}

/// RPC Server Configuration
#[derive(Debug, Clone)]
pub struct RpcServerConfig {
    pub host: String,
    /// 0 picks a free port
    pub port: u16,
}

impl Default for RpcServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
        }
    }
}

/// RPC Server
pub struct RpcServer {
    config: RpcServerConfig,
    handler: Arc<RpcHandler>,
}

/// Register one method whose params deserialize into `$req` and are passed to `$method`
macro_rules! register {
    ($module:expr, $handler:expr, $name:literal, $req:ty, $method:ident) => {{
        let handler = $handler.clone();
        $module
            .register_async_method($name, move |params, _, _| {
                let handler = handler.clone();
                async move {
                    let req: $req = params.parse()?;
                    handler.$method(req).await
                }
            })
            .map_err(|e| RpcServerError::Register {
                method: $name,
                reason: e.to_string(),
            })?;
    }};
}

impl RpcServer {
    pub fn new(config: RpcServerConfig, handler: Arc<RpcHandler>) -> Self {
        Self { config, handler }
    }

    /// Build the method table without binding a socket
    pub fn into_module(self) -> Result<RpcModule<()>, RpcServerError> {
        let mut module = RpcModule::new(());
        let handler = self.handler;

        register!(module, handler, "accesscode.issue.v1", IssueRequest, issue);
        register!(module, handler, "accesscode.issue_vip.v1", IssueRequest, issue_vip);
        register!(module, handler, "accesscode.lookup.v1", LookupRequest, lookup);
        register!(module, handler, "accesscode.get.v1", AccessCodeIdRequest, get);
        register!(module, handler, "accesscode.attending.v1", QueueIdRequest, attending);
        register!(module, handler, "accesscode.search.v1", SearchRequest, search);
        register!(module, handler, "accesscode.save.v1", SaveAccessCodeRequest, save);
        register!(module, handler, "accesscode.delete.v1", AccessCodeIdRequest, delete);
        register!(module, handler, "queue.get.v1", QueueIdRequest, get_queue);
        register!(module, handler, "queue.create.v1", CreateQueueRequest, create_queue);

        Ok(module)
    }

    /// Start the JSON-RPC server, returning the bound address and its handle
    pub async fn start(self) -> Result<(SocketAddr, ServerHandle), RpcServerError> {
        let addr = format!("{}:{}", self.config.host, self.config.port);

        info!(
            host = %self.config.host,
            port = %self.config.port,
            "Starting JSON-RPC server on TCP"
        );

        let server = Server::builder()
            .build(&addr)
            .await
            .map_err(|source| RpcServerError::Bind {
                addr: addr.clone(),
                source,
            })?;
        let local_addr = server.local_addr().map_err(|source| RpcServerError::Bind {
            addr: addr.clone(),
            source,
        })?;

        let module = self.into_module()?;

        info!(addr = %local_addr, "JSON-RPC server started successfully");

        let handle = server.start(module);
        Ok((local_addr, handle))
    }
}
