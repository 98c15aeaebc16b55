//! Per-vehicle reconciliation: load, classify, queue, insert.

use std::collections::HashSet;

use log::{debug, error, info, warn};
use lubelogger::{GasRecord, LubeLoggerApi};
use roadtrip::FuelRecord;

use crate::comparator::{ComparatorKey, MatchStrategy};
use crate::error::{Result, SyncError};
use crate::index::{GasRecordIndex, Lookup};
use crate::transform::to_gas_record;

/// How one source record relates to the destination set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// A destination record already has this key.
    Present,
    /// No destination record has this key; the record is queued.
    Missing,
    /// An earlier source record with the same key is already queued.
    DuplicateInSource,
}

/// A source record waiting to be inserted.
#[derive(Debug, Clone)]
pub struct QueuedFillup<'a> {
    pub source_index: usize,
    pub key: ComparatorKey,
    pub record: &'a FuelRecord,
}

/// Why classification stopped before the end of the source records.
#[derive(Debug)]
pub struct ClassifyHalt {
    /// `None` when the destination set itself could not be indexed.
    pub source_index: Option<usize>,
    pub error: SyncError,
}

/// Outcome of the classification pass. The queue keeps source order.
#[derive(Debug, Default)]
pub struct InsertPlan<'a> {
    pub queue: Vec<QueuedFillup<'a>>,
    pub already_present: usize,
    pub duplicates_in_source: usize,
    pub halted: Option<ClassifyHalt>,
}

/// The insert that stopped a batch.
#[derive(Debug)]
pub struct InsertFailure {
    pub queue_index: usize,
    pub source_index: usize,
    pub error: SyncError,
}

/// What a vehicle's sync did.
#[derive(Debug)]
pub struct SyncReport {
    pub vehicle_id: i64,
    pub destination_records: usize,
    pub source_records: usize,
    pub already_present: usize,
    pub duplicates_in_source: usize,
    pub queued: usize,
    pub inserted: usize,
    pub classify_halt: Option<ClassifyHalt>,
    pub insert_failure: Option<InsertFailure>,
}

impl SyncReport {
    /// True when every source record was classified and every queued record inserted.
    pub fn is_clean(&self) -> bool {
        self.classify_halt.is_none() && self.insert_failure.is_none()
    }

    /// Queued records that were never attempted because the batch stopped.
    pub fn not_attempted(&self) -> usize {
        let failed = usize::from(self.insert_failure.is_some());
        self.queued.saturating_sub(self.inserted + failed)
    }
}

/// Classifies `source` against `destination` and builds the insert queue.
///
/// Classification stops at the first record whose key cannot be derived; whatever was
/// queued before that point is kept.
pub fn plan_inserts<'a>(
    destination: &[GasRecord],
    source: &'a [FuelRecord],
    strategy: MatchStrategy,
) -> InsertPlan<'a> {
    let mut plan = InsertPlan::default();

    let index = match GasRecordIndex::build(destination, strategy) {
        Ok(index) => index,
        Err(error) => {
            plan.halted = Some(ClassifyHalt {
                source_index: None,
                error,
            });
            return plan;
        }
    };

    let mut queued_keys: HashSet<ComparatorKey> = HashSet::new();

    for (source_index, record) in source.iter().enumerate() {
        let key = match strategy.key(record) {
            Ok(key) => key,
            Err(error) => {
                plan.halted = Some(ClassifyHalt {
                    source_index: Some(source_index),
                    error,
                });
                break;
            }
        };

        let classification = match index.find(&key) {
            Lookup::Found(existing) => {
                debug!(
                    "Road Trip fillup found in LubeLogger (index={}, comparator={}, odometer={})",
                    source_index, key, existing.odometer
                );
                Classification::Present
            }
            Lookup::NotFound if queued_keys.contains(&key) => Classification::DuplicateInSource,
            Lookup::NotFound => {
                debug!(
                    "Road Trip fillup not in LubeLogger, enqueuing (index={}, comparator={})",
                    source_index, key
                );
                Classification::Missing
            }
        };

        match classification {
            Classification::Present => plan.already_present += 1,
            Classification::DuplicateInSource => {
                warn!(
                    "Skipping Road Trip fillup sharing comparator {} with an earlier queued fillup (index={})",
                    key, source_index
                );
                plan.duplicates_in_source += 1;
            }
            Classification::Missing => {
                queued_keys.insert(key.clone());
                plan.queue.push(QueuedFillup {
                    source_index,
                    key,
                    record,
                });
            }
        }
    }

    plan
}

/// Drives one vehicle's sync against a LubeLogger API.
pub struct Reconciler<'a, A: ?Sized> {
    api: &'a A,
    strategy: MatchStrategy,
}

impl<'a, A> Reconciler<'a, A>
where
    A: LubeLoggerApi + ?Sized,
{
    pub fn new(api: &'a A) -> Self {
        Self {
            api,
            strategy: MatchStrategy::default(),
        }
    }

    pub fn with_strategy(mut self, strategy: MatchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn strategy(&self) -> MatchStrategy {
        self.strategy
    }

    /// Inserts into LubeLogger every fillup in `source` it does not have yet.
    ///
    /// Only a failure to load the destination records is returned as an error. A failed
    /// insert stops the rest of the queue and is reported in the returned [`SyncReport`].
    pub async fn sync_vehicle(&self, vehicle_id: i64, source: &[FuelRecord]) -> Result<SyncReport> {
        debug!("Syncing fillups (vehicle_id={})", vehicle_id);

        let destination = self
            .api
            .gas_records(vehicle_id)
            .await
            .map_err(|err| SyncError::Load {
                vehicle_id,
                source: err,
            })?;

        let plan = plan_inserts(&destination, source, self.strategy);
        if let Some(halt) = &plan.halted {
            error!(
                "Classification stopped early (vehicle_id={}, index={:?}): {}",
                vehicle_id, halt.source_index, halt.error
            );
        }

        info!(
            "Missing fuel records enqueued (vehicle_id={}, queued={}, present={}, duplicates={})",
            vehicle_id,
            plan.queue.len(),
            plan.already_present,
            plan.duplicates_in_source
        );

        let mut inserted = 0;
        let mut insert_failure = None;

        for (queue_index, queued) in plan.queue.iter().enumerate() {
            match self.insert_one(vehicle_id, queued).await {
                Ok(message) => {
                    inserted += 1;
                    info!(
                        "Added Road Trip fillup to LubeLogger (vehicle_id={}, index={}, comparator={}, message={:?})",
                        vehicle_id, queue_index, queued.key, message
                    );
                }
                Err(error) => {
                    error!(
                        "Failed adding Road Trip fillup to LubeLogger (vehicle_id={}, index={}, comparator={}): {}",
                        vehicle_id, queue_index, queued.key, error
                    );
                    insert_failure = Some(InsertFailure {
                        queue_index,
                        source_index: queued.source_index,
                        error,
                    });
                    break;
                }
            }
        }

        Ok(SyncReport {
            vehicle_id,
            destination_records: destination.len(),
            source_records: source.len(),
            already_present: plan.already_present,
            duplicates_in_source: plan.duplicates_in_source,
            queued: plan.queue.len(),
            inserted,
            classify_halt: plan.halted,
            insert_failure,
        })
    }

    async fn insert_one(&self, vehicle_id: i64, queued: &QueuedFillup<'_>) -> Result<String> {
        let gas_record = to_gas_record(queued.record)?;
        let response = self
            .api
            .add_gas_record(vehicle_id, &gas_record)
            .await
            .map_err(SyncError::Insert)?;
        if !response.success {
            return Err(SyncError::Rejected(response.message));
        }
        Ok(response.message)
    }
}
