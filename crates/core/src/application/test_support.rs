// In-memory port implementations for unit tests

use crate::domain::{
    AccessCode, AccessCodeId, AccessCodeState, CodeNumber, Lane, Queue, Visitor,
    VisitorInfoRecord,
};
use crate::error::{AppError, Result};
use crate::port::{
    AccessCodeCriteria, AccessCodeRepository, IssuanceTransaction, QueueRepository,
    StatusFilter, Transaction, TransactionalAccessCodeRepository, VisitorCriteria,
    VisitorInfoSink, VisitorRepository,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Default)]
pub struct InMemoryStore {
    queues: Mutex<Vec<Queue>>,
    visitors: Mutex<Vec<Visitor>>,
    codes: Mutex<Vec<AccessCode>>,
    counters: Mutex<HashMap<(String, Lane), CodeNumber>>,
    visitor_info: Mutex<Vec<VisitorInfoRecord>>,
    fail_visitor_info: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryStore {
    pub fn put_queue(&self, queue: Queue) {
        self.queues.lock().unwrap().push(queue);
    }

    pub fn put_visitor(&self, visitor: Visitor) {
        self.visitors.lock().unwrap().push(visitor);
    }

    pub fn put_code(&self, code: AccessCode) {
        self.apply_insert(code);
    }

    pub fn codes(&self) -> Vec<AccessCode> {
        self.codes.lock().unwrap().clone()
    }

    pub fn visitor(&self, id: &str) -> Option<Visitor> {
        self.visitors
            .lock()
            .unwrap()
            .iter()
            .find(|v| v.id == id)
            .cloned()
    }

    pub fn visitor_info(&self) -> Vec<VisitorInfoRecord> {
        self.visitor_info.lock().unwrap().clone()
    }

    pub fn fail_visitor_info(&self) {
        self.fail_visitor_info.store(true, Ordering::SeqCst);
    }

    /// Number of port calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn apply_insert(&self, code: AccessCode) {
        self.counters
            .lock()
            .unwrap()
            .insert((code.queue_id.clone(), code.lane), code.code);
        self.codes.lock().unwrap().push(code);
    }
}

fn status_matches(code: &AccessCode, status: StatusFilter) -> bool {
    match status {
        StatusFilter::Any => true,
        StatusFilter::Unconsumed => !code.is_consumed(),
        StatusFilter::InService => code.state() == AccessCodeState::InService,
        StatusFilter::Completed => code.state() == AccessCodeState::Completed,
    }
}

fn code_matches(code: &AccessCode, c: &AccessCodeCriteria) -> bool {
    c.queue_id.as_ref().map_or(true, |q| &code.queue_id == q)
        && c.lane.map_or(true, |l| code.lane == l)
        && c.identificator
            .as_ref()
            .map_or(true, |i| &code.identificator == i)
        && c.email
            .as_ref()
            .map_or(true, |e| code.email.as_ref() == Some(e))
        && c.created_before.map_or(true, |t| code.created_at < t)
        && status_matches(code, c.status)
}

#[async_trait]
impl QueueRepository for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> Result<Option<Queue>> {
        self.touch();
        Ok(self
            .queues
            .lock()
            .unwrap()
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn insert(&self, queue: &Queue) -> Result<()> {
        self.touch();
        self.put_queue(queue.clone());
        Ok(())
    }
}

#[async_trait]
impl VisitorRepository for InMemoryStore {
    async fn find(&self, c: &VisitorCriteria) -> Result<Vec<Visitor>> {
        self.touch();
        Ok(self
            .visitors
            .lock()
            .unwrap()
            .iter()
            .filter(|v| {
                c.token.as_ref().map_or(true, |t| v.token.as_ref() == Some(t))
                    && c.identificator
                        .as_ref()
                        .map_or(true, |i| &v.identificator == i)
                    && c.email.as_ref().map_or(true, |e| v.email.as_ref() == Some(e))
                    && c.phone.as_ref().map_or(true, |p| v.phone.as_ref() == Some(p))
            })
            .cloned()
            .collect())
    }

    async fn save(&self, visitor: &Visitor) -> Result<()> {
        self.touch();
        let mut visitors = self.visitors.lock().unwrap();
        match visitors.iter_mut().find(|v| v.id == visitor.id) {
            Some(existing) => *existing = visitor.clone(),
            None => visitors.push(visitor.clone()),
        }
        Ok(())
    }
}

#[async_trait]
impl AccessCodeRepository for InMemoryStore {
    async fn insert(&self, code: &AccessCode) -> Result<()> {
        self.touch();
        self.apply_insert(code.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &AccessCodeId) -> Result<Option<AccessCode>> {
        self.touch();
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.id == id)
            .cloned())
    }

    async fn update(&self, code: &AccessCode) -> Result<()> {
        self.touch();
        let mut codes = self.codes.lock().unwrap();
        let existing = codes
            .iter_mut()
            .find(|c| c.id == code.id)
            .ok_or_else(|| AppError::NotFound(code.id.clone()))?;
        *existing = code.clone();
        Ok(())
    }

    async fn delete(&self, id: &AccessCodeId) -> Result<bool> {
        self.touch();
        let mut codes = self.codes.lock().unwrap();
        let before = codes.len();
        codes.retain(|c| &c.id != id);
        Ok(codes.len() != before)
    }

    async fn search(&self, criteria: &AccessCodeCriteria) -> Result<Vec<AccessCode>> {
        self.touch();
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| code_matches(c, criteria))
            .cloned()
            .collect())
    }

    async fn find_recent_completed(
        &self,
        queue_id: &str,
        limit: usize,
    ) -> Result<Vec<AccessCode>> {
        self.touch();
        let mut done: Vec<_> = self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.queue_id == queue_id && c.started_at.is_some() && c.is_consumed())
            .cloned()
            .collect();
        done.sort_by(|a, b| b.finished_at.cmp(&a.finished_at));
        done.truncate(limit);
        Ok(done)
    }

    async fn count_completed(&self, queue_id: &str) -> Result<i64> {
        self.touch();
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.queue_id == queue_id && c.is_consumed())
            .count() as i64)
    }

    async fn count_pending(&self, queue_id: &str, as_of: i64) -> Result<i64> {
        self.touch();
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.queue_id == queue_id && c.created_at < as_of && !c.is_consumed())
            .count() as i64)
    }
}

/// Buffers inserts until commit
pub struct InMemoryIssuance {
    store: Arc<InMemoryStore>,
    pending: Vec<AccessCode>,
    validate: Vec<String>,
}

#[async_trait]
impl Transaction for InMemoryIssuance {
    async fn commit(self: Box<Self>) -> Result<()> {
        let InMemoryIssuance {
            store,
            pending,
            validate,
        } = *self;
        for code in pending {
            store.apply_insert(code);
        }
        let mut visitors = store.visitors.lock().unwrap();
        for visitor in visitors.iter_mut().filter(|v| validate.contains(&v.id)) {
            visitor.validated = true;
        }
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl IssuanceTransaction for InMemoryIssuance {
    async fn last_code(&mut self, queue_id: &str, lane: Lane) -> Result<Option<CodeNumber>> {
        self.store.touch();
        // Yield so concurrent issuers interleave here without a lane lock
        tokio::task::yield_now().await;
        Ok(self
            .store
            .counters
            .lock()
            .unwrap()
            .get(&(queue_id.to_string(), lane))
            .copied())
    }

    async fn insert(&mut self, code: &AccessCode) -> Result<()> {
        self.store.touch();
        self.pending.push(code.clone());
        Ok(())
    }

    async fn mark_validated(&mut self, visitor_id: &str) -> Result<()> {
        self.store.touch();
        self.validate.push(visitor_id.to_string());
        Ok(())
    }
}

/// Wrapper so the store can hand out transactions holding an Arc to itself
pub struct InMemoryTransactional(pub Arc<InMemoryStore>);

#[async_trait]
impl TransactionalAccessCodeRepository for InMemoryTransactional {
    async fn begin_issuance(&self) -> Result<Box<dyn IssuanceTransaction>> {
        self.0.touch();
        Ok(Box::new(InMemoryIssuance {
            store: Arc::clone(&self.0),
            pending: Vec::new(),
            validate: Vec::new(),
        }))
    }
}

#[async_trait]
impl VisitorInfoSink for InMemoryStore {
    async fn record(&self, info: &VisitorInfoRecord) -> Result<()> {
        self.touch();
        if self.fail_visitor_info.load(Ordering::SeqCst) {
            return Err(AppError::Database("visitor_info unavailable".to_string()));
        }
        self.visitor_info.lock().unwrap().push(info.clone());
        Ok(())
    }
}

/// Completed code created at `created_at`, served for `service_secs`
pub fn completed_code(
    id: &str,
    queue_id: &str,
    code: i64,
    created_at: i64,
    service_secs: i64,
) -> AccessCode {
    let mut c = waiting_code(id, queue_id, code, created_at);
    c.started_at = Some(created_at + 1_000);
    c.finished_at = Some(created_at + 1_000 + service_secs * 1_000);
    c
}

/// Normal-lane code still waiting to be served
pub fn waiting_code(id: &str, queue_id: &str, code: i64, created_at: i64) -> AccessCode {
    AccessCode::new(
        id,
        created_at,
        queue_id,
        CodeNumber::new(code).unwrap(),
        Lane::Normal,
    )
}

pub const NOW: i64 = 1_700_000_000_000;

/// Service wired to an in-memory store with a frozen clock and sequential IDs
pub fn service_for(
    store: &Arc<InMemoryStore>,
    clock: &Arc<crate::port::time_provider::ManualTimeProvider>,
) -> crate::application::AccessCodeService {
    crate::application::AccessCodeService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        Arc::new(InMemoryTransactional(store.clone())),
        store.clone(),
        Arc::new(crate::port::id_provider::SequentialIdProvider::new("id")),
        clock.clone(),
    )
}

/// Store holding queue `q1` with the given floor, plus a clock at NOW
pub fn fixture(
    min_wait_minutes: i64,
) -> (
    Arc<InMemoryStore>,
    Arc<crate::port::time_provider::ManualTimeProvider>,
    crate::application::AccessCodeService,
) {
    let store = Arc::new(InMemoryStore::default());
    store.put_queue(Queue::new("q1", "Front desk", min_wait_minutes, 0));
    let clock = Arc::new(crate::port::time_provider::ManualTimeProvider::new(NOW));
    let service = service_for(&store, &clock);
    (store, clock, service)
}

/// Visitor of `q1` holding `token`
pub fn visitor(id: &str, token: &str) -> Visitor {
    let mut v = Visitor::new(id, "q1", format!("Visitor {}", id), format!("ID-{}", id), 0);
    v.token = Some(token.to_string());
    v.email = Some(format!("{}@example.com", id));
    v.phone = Some(format!("600 000 {}", id));
    v
}
