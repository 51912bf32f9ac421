use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use lru::LruCache;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tower_sessions::session::{Id, Record};
use tower_sessions::session_store::{self, SessionStore as RecordStore};
use tracing::debug;

/// In-memory store for logins in flight.
///
/// Holds at most `capacity` records; the least recently saved one is evicted
/// to make room. Expired records are dropped whenever they are met, so an
/// abandoned login never outlives its expiry by more than the next write.
#[derive(Clone)]
pub struct PendingLoginStore {
    records: Arc<Mutex<LruCache<Id, Record>>>,
}

impl PendingLoginStore {
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            records: Arc::new(Mutex::new(LruCache::new(cap))),
        }
    }

    /// Number of records currently held, expired ones included.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }
}

impl fmt::Debug for PendingLoginStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingLoginStore").finish_non_exhaustive()
    }
}

fn is_expired(record: &Record) -> bool {
    record.expiry_date <= OffsetDateTime::now_utc()
}

/// Records are ordered by last save and share one inactivity window, so the
/// expired ones sit at the least recently used end.
fn prune_expired(records: &mut LruCache<Id, Record>) {
    while let Some((_, record)) = records.peek_lru() {
        if !is_expired(record) {
            break;
        }
        records.pop_lru();
    }
}

#[async_trait]
impl RecordStore for PendingLoginStore {
    async fn create(&self, record: &mut Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        prune_expired(&mut records);

        while records.contains(&record.id) {
            record.id = Id::default();
        }

        if let Some((evicted, _)) = records.push(record.id, record.clone()) {
            debug!(session_id = ?evicted, "Evicting least recently used pending login");
        }
        Ok(())
    }

    async fn save(&self, record: &Record) -> session_store::Result<()> {
        let mut records = self.records.lock().await;
        prune_expired(&mut records);
        records.put(record.id, record.clone());
        Ok(())
    }

    async fn load(&self, session_id: &Id) -> session_store::Result<Option<Record>> {
        let mut records = self.records.lock().await;

        let expired = match records.peek(session_id) {
            Some(record) => is_expired(record),
            None => return Ok(None),
        };
        if expired {
            records.pop(session_id);
            return Ok(None);
        }

        Ok(records.peek(session_id).cloned())
    }

    async fn delete(&self, session_id: &Id) -> session_store::Result<()> {
        self.records.lock().await.pop(session_id);
        Ok(())
    }
}
