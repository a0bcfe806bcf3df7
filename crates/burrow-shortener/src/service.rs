use async_trait::async_trait;
use burrow_core::store::with_deadline;
use burrow_core::{
    AllocationError, Destination, EngineConfig, InsertOutcome, MappingStore, ShortCode,
    ShortenParams, Shortener, StorageError, UrlRecord,
};
use burrow_generator::Generator;
use jiff::Timestamp;
use std::sync::Arc;
use tracing::{debug, error, warn};

type Result<T> = std::result::Result<T, AllocationError>;

/// The allocation service: reserves a unique short code for a destination.
///
/// Candidates come from the [`Generator`]; uniqueness is decided solely by the
/// store's conditional insert. Two retry budgets apply per allocation:
/// - collisions move on to the next candidate immediately, up to
///   `max_allocation_attempts` candidates;
/// - transient store failures retry the same candidate after an exponential
///   backoff, up to `transient_retry.max_retries` times.
///
/// Every store call carries `store_timeout`, including drawing a candidate
/// from a generator whose counter lives in the store. Dropping the returned
/// future abandons any in-flight store call.
#[derive(Debug, Clone)]
pub struct AllocationService<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
    config: Arc<EngineConfig>,
}

impl<S: MappingStore, G: Generator> AllocationService<S, G> {
    pub fn new(store: S, generator: G, config: EngineConfig) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(generator), Arc::new(config))
    }

    /// Creates a service over a store shared with other components.
    pub fn from_shared(store: Arc<S>, generator: Arc<G>, config: Arc<EngineConfig>) -> Self {
        Self {
            store,
            generator,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Sleeps before retrying a transient failure, or turns `err` into the
    /// allocation error once it is permanent or the budget is spent.
    ///
    /// `retries` is shared by every store call of one allocation so the
    /// backoff budget bounds the whole call.
    async fn back_off(
        &self,
        err: StorageError,
        retries: &mut u32,
        operation: &'static str,
    ) -> Result<()> {
        let policy = self.config.transient_retry;
        if !err.is_transient() {
            return Err(AllocationError::Storage(err));
        }
        if *retries >= policy.max_retries {
            warn!(operation, retries = *retries, error = %err, "giving up on transient store failures");
            return Err(AllocationError::TransientStoreFailure {
                retries: *retries,
                source: err,
            });
        }

        *retries += 1;
        let delay = policy.delay_for(*retries);
        warn!(
            operation,
            retry = *retries,
            max_retries = policy.max_retries,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            error = %err,
            "transient store failure, backing off"
        );
        tokio::time::sleep(delay).await;
        Ok(())
    }

    /// Draws the candidate for `attempt`. Counter-backed generators may reach
    /// the store, so the call gets the same deadline and retry budget.
    async fn candidate(&self, attempt: u32, retries: &mut u32) -> Result<ShortCode> {
        loop {
            let result = with_deadline(
                self.config.store_timeout,
                "next_code",
                self.generator.generate(attempt),
            )
            .await;

            match result {
                Ok(code) => return Ok(code),
                Err(err) => self.back_off(err, retries, "next_code").await?,
            }
        }
    }

    /// Inserts `record`, retrying transient failures with backoff.
    async fn insert(&self, record: &UrlRecord, retries: &mut u32) -> Result<InsertOutcome> {
        // set once an insert timed out: it may have been applied anyway
        let mut maybe_written = false;

        loop {
            let result = with_deadline(
                self.config.store_timeout,
                "try_insert",
                self.store.try_insert(record.clone()),
            )
            .await;

            match result {
                Ok(InsertOutcome::AlreadyExists) if maybe_written => {
                    return self.reconcile(record, retries).await;
                }
                Ok(outcome) => return Ok(outcome),
                Err(err) => {
                    let timed_out = matches!(err, StorageError::Timeout(_));
                    self.back_off(err, retries, "try_insert").await?;
                    maybe_written |= timed_out;
                }
            }
        }
    }

    /// Decides whether a code reported as taken after a timed-out insert
    /// holds our own write.
    async fn reconcile(&self, record: &UrlRecord, retries: &mut u32) -> Result<InsertOutcome> {
        loop {
            let lookup = with_deadline(
                self.config.store_timeout,
                "lookup",
                self.store.lookup(&record.code),
            )
            .await;

            match lookup {
                Ok(Some(existing)) if existing.destination == record.destination => {
                    debug!(code = %record.code, "timed-out insert had been applied");
                    return Ok(InsertOutcome::Inserted);
                }
                Ok(_) => return Ok(InsertOutcome::AlreadyExists),
                Err(err) => self.back_off(err, retries, "lookup").await?,
            }
        }
    }
}

#[async_trait]
impl<S: MappingStore, G: Generator> Shortener for AllocationService<S, G> {
    async fn shorten(&self, params: ShortenParams) -> Result<ShortCode> {
        // reject bad input before touching the store
        let destination =
            Destination::parse_with_limit(&params.destination, self.config.max_destination_length)?;
        let now = Timestamp::now();
        let expires_at = params.expiration.expires_at(now)?;
        let mut retries = 0;

        if let Some(alias) = params.custom_alias {
            let record = UrlRecord::new(alias.clone(), destination, now, expires_at);
            return match self.insert(&record, &mut retries).await? {
                InsertOutcome::Inserted => Ok(alias),
                InsertOutcome::AlreadyExists => Err(AllocationError::AliasConflict(alias.to_string())),
            };
        }

        let max_attempts = self.config.max_allocation_attempts;
        for attempt in 0..max_attempts {
            let code = self.candidate(attempt, &mut retries).await?;
            let record = UrlRecord::new(code.clone(), destination.clone(), now, expires_at);

            match self.insert(&record, &mut retries).await? {
                InsertOutcome::Inserted => {
                    debug!(code = %code, attempt, "allocated short code");
                    return Ok(code);
                }
                InsertOutcome::AlreadyExists => {
                    debug!(code = %code, attempt, "short code collision");
                }
            }
        }

        error!(
            attempts = max_attempts,
            "every candidate short code collided; the code space may be exhausted"
        );
        Err(AllocationError::CollisionRetryExhausted {
            attempts: max_attempts,
        })
    }
}
