//! Status ingestion
//!
//! Each submission is a stateless transform from one request body to six
//! gauge writes, followed by an optional push of the whole registry.

use crate::error::{MetricsError, Result};
use crate::metrics::MetricStore;
use crate::push::Pusher;
use crate::record::StatusRecord;
use log::{debug, info, warn};
use std::sync::Arc;

/// Decodes status records and writes them into a [`MetricStore`].
#[derive(Clone)]
pub struct Ingestor {
    store: Arc<dyn MetricStore>,
    pusher: Option<Arc<dyn Pusher>>,
}

impl Ingestor {
    /// Create an ingestor over `store`, pushing to `pusher` when given.
    pub fn new(store: Arc<dyn MetricStore>, pusher: Option<Arc<dyn Pusher>>) -> Self {
        Self { store, pusher }
    }

    /// Decode `raw` and record it, stamped with the current wall-clock time.
    pub fn submit(&self, raw: &[u8]) -> Result<StatusRecord> {
        self.submit_at(raw, chrono::Utc::now().timestamp())
    }

    /// Decode `raw` and record it, stamped with `now` (unix seconds).
    ///
    /// Nothing is written unless the whole body decodes. Push failures
    /// are logged and never returned.
    pub fn submit_at(&self, raw: &[u8], now: i64) -> Result<StatusRecord> {
        let record = StatusRecord::from_json(raw)?;
        info!("{}", record);

        self.store
            .upsert(&record.instance_id, &record.readings(now));

        if let Some(pusher) = &self.pusher {
            match pusher.push(self.store.gather()) {
                Ok(()) => debug!("pushed metrics to {:?}", pusher.target()),
                Err(e) => warn!("error pushing to {:?}: {}", pusher.target(), e),
            }
        }

        Ok(record)
    }

    /// Current metrics in text exposition format.
    pub fn status(&self) -> std::result::Result<String, MetricsError> {
        self.store.encode()
    }
}
