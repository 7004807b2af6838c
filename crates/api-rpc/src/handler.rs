//! RPC Method Handlers
//!
//! Thin adapters from JSON-RPC params to AccessCodeService calls.

use crate::error::to_rpc_error;
use crate::types::{
    AccessCodeIdRequest, AccessCodeView, CreateQueueRequest, DeleteResponse, IssueRequest,
    IssuedCodeResponse, LookupRequest, QueueIdRequest, QueueView, SaveAccessCodeRequest,
    SearchRequest, SearchResponse,
};
use jsonrpsee::types::ErrorObjectOwned;
use jumpqueue_core::application::AccessCodeService;
use jumpqueue_core::domain::{AccessCode, CodeNumber, Queue};
use jumpqueue_core::port::{AccessCodeCriteria, IdProvider, TimeProvider};
use jumpqueue_core::AppError;
use std::sync::Arc;

/// RPC Handler with injected dependencies
pub struct RpcHandler {
    service: Arc<AccessCodeService>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl RpcHandler {
    pub fn new(
        service: Arc<AccessCodeService>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            service,
            id_provider,
            time_provider,
        }
    }

    /// accesscode.issue.v1
    pub async fn issue(&self, params: IssueRequest) -> Result<IssuedCodeResponse, ErrorObjectOwned> {
        self.service
            .issue_visitor_code(&params.token)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }

    /// accesscode.issue_vip.v1
    pub async fn issue_vip(
        &self,
        params: IssueRequest,
    ) -> Result<IssuedCodeResponse, ErrorObjectOwned> {
        self.service
            .issue_vip_code(&params.token)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }

    /// accesscode.lookup.v1
    pub async fn lookup(&self, params: LookupRequest) -> Result<IssuedCodeResponse, ErrorObjectOwned> {
        self.service
            .lookup_or_issue(params)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }

    /// accesscode.get.v1
    pub async fn get(
        &self,
        params: AccessCodeIdRequest,
    ) -> Result<IssuedCodeResponse, ErrorObjectOwned> {
        self.service
            .find_access_code(&params.access_code_id)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }

    /// accesscode.attending.v1
    pub async fn attending(
        &self,
        params: QueueIdRequest,
    ) -> Result<IssuedCodeResponse, ErrorObjectOwned> {
        self.service
            .attending_access_code(&params.queue_id)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }

    /// accesscode.search.v1
    pub async fn search(&self, params: SearchRequest) -> Result<SearchResponse, ErrorObjectOwned> {
        let criteria = AccessCodeCriteria::from(params);
        let access_codes: Vec<AccessCodeView> = self
            .service
            .search_access_codes(&criteria)
            .await
            .map_err(to_rpc_error)?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(SearchResponse {
            count: access_codes.len(),
            access_codes,
        })
    }

    /// accesscode.save.v1
    pub async fn save(
        &self,
        params: SaveAccessCodeRequest,
    ) -> Result<AccessCodeView, ErrorObjectOwned> {
        let number = CodeNumber::new(params.code)
            .map_err(|e| to_rpc_error(AppError::InvalidInput(e.to_string())))?;
        let id = params
            .access_code_id
            .unwrap_or_else(|| self.id_provider.generate_id());

        let mut code = AccessCode::new(
            id,
            self.time_provider.now_millis(),
            params.queue_id,
            number,
            params.lane,
        );
        code.name = params.name;
        code.identificator = params.identificator;
        code.email = params.email;
        code.phone = params.phone;

        self.service
            .save_access_code(code)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }

    /// accesscode.delete.v1
    pub async fn delete(
        &self,
        params: AccessCodeIdRequest,
    ) -> Result<DeleteResponse, ErrorObjectOwned> {
        self.service
            .delete_access_code(&params.access_code_id)
            .await
            .map_err(to_rpc_error)?;

        Ok(DeleteResponse {
            access_code_id: params.access_code_id,
            deleted: true,
        })
    }

    /// queue.get.v1
    pub async fn get_queue(&self, params: QueueIdRequest) -> Result<QueueView, ErrorObjectOwned> {
        self.service
            .find_queue(&params.queue_id)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }

    /// queue.create.v1
    pub async fn create_queue(
        &self,
        params: CreateQueueRequest,
    ) -> Result<QueueView, ErrorObjectOwned> {
        let queue = Queue::new(
            params.queue_id,
            params.name,
            params.min_wait_minutes,
            self.time_provider.now_millis(),
        );

        self.service
            .create_queue(queue)
            .await
            .map(Into::into)
            .map_err(to_rpc_error)
    }
}
