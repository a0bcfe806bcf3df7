use std::sync::Arc;
use std::time::Duration;

use burrow_core::MappingStore;
use jiff::Timestamp;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Periodically tombstones expired records so they stop occupying the
/// store's live set. Codes stay reserved.
pub fn spawn_expiry_sweeper<S: MappingStore>(store: Arc<S>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            match store.sweep_expired(Timestamp::now()).await {
                Ok(0) => debug!("expiry sweep found nothing"),
                Ok(swept) => info!(swept, "swept expired short urls"),
                Err(err) => warn!(error = %err, "expiry sweep failed"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use burrow_core::{Destination, ReadMappingStore, ShortCode, UrlRecord};
    use burrow_storage::InMemoryStore;
    use jiff::SignedDuration;

    #[tokio::test(start_paused = true)]
    async fn sweeper_tombstones_expired_records() {
        let store = Arc::new(InMemoryStore::new());
        let code = ShortCode::new_unchecked("gone");
        store
            .try_insert(UrlRecord::new(
                code.clone(),
                Destination::from_trusted("https://example.com"),
                Timestamp::now(),
                Some(Timestamp::now() - SignedDuration::from_secs(1)),
            ))
            .await
            .unwrap();

        let handle = spawn_expiry_sweeper(Arc::clone(&store), Duration::from_secs(30));
        assert!(store.lookup(&code).await.unwrap().is_some());

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert!(store.lookup(&code).await.unwrap().is_none());
        assert_eq!(store.reserved_codes(), 1);

        handle.abort();
    }
}
