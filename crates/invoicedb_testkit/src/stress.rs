//! Stress tests for InvoiceDB stores.
//!
//! These helpers drive a store under heavy load and concurrent access and
//! report throughput along with what was stored.

use crate::generators::sample_invoice;
use invoicedb_core::{Database, InvoiceId};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Result of a stress test run.
#[derive(Debug, Clone)]
pub struct StressTestResult {
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Total duration.
    pub duration: Duration,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressTestResult {
    /// Creates a new result.
    pub fn new(successful: usize, failed: usize, duration: Duration) -> Self {
        let total = successful + failed;
        let ops_per_second = if duration.as_secs_f64() > 0.0 {
            total as f64 / duration.as_secs_f64()
        } else {
            0.0
        };

        Self {
            total_ops: total,
            successful_ops: successful,
            failed_ops: failed,
            duration,
            ops_per_second,
        }
    }
}

/// Configuration for stress tests.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Operations per thread.
    pub operations: usize,
    /// Number of concurrent threads.
    pub threads: usize,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            operations: 100,
            threads: 4,
        }
    }
}

/// Outcome of [`run_concurrent_inserts`].
#[derive(Debug, Clone)]
pub struct ConcurrentInsertOutcome {
    /// Throughput and failure counts.
    pub result: StressTestResult,
    /// Every id handed out, sorted ascending.
    pub ids: Vec<InvoiceId>,
}

impl ConcurrentInsertOutcome {
    /// Returns true if no id was handed out twice.
    pub fn ids_unique(&self) -> bool {
        self.ids.windows(2).all(|pair| pair[0] != pair[1])
    }
}

/// Inserts `config.operations` invoices sequentially.
pub fn stress_sequential_inserts(db: &dyn Database, config: &StressConfig) -> StressTestResult {
    let start = Instant::now();
    let mut successful = 0usize;
    let mut failed = 0usize;

    for i in 0..config.operations {
        match db.save(sample_invoice(&format!("SEQ/{i}"))) {
            Ok(_) => successful += 1,
            Err(_) => failed += 1,
        }
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

/// Inserts from `config.threads` threads at once and collects the ids.
pub fn run_concurrent_inserts<D>(db: &Arc<D>, config: &StressConfig) -> ConcurrentInsertOutcome
where
    D: Database + 'static,
{
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let db = Arc::clone(db);
            let operations = config.operations;
            thread::spawn(move || {
                let mut ids = Vec::with_capacity(operations);
                let mut failed = 0usize;
                for i in 0..operations {
                    match db.save(sample_invoice(&format!("T{t}/{i}"))) {
                        Ok(stored) => ids.extend(stored.id),
                        Err(_) => failed += 1,
                    }
                }
                (ids, failed)
            })
        })
        .collect();

    let mut ids = Vec::new();
    let mut failed = 0usize;
    for handle in handles {
        let (thread_ids, thread_failed) = handle.join().expect("Insert thread panicked");
        ids.extend(thread_ids);
        failed += thread_failed;
    }
    ids.sort_unstable();

    ConcurrentInsertOutcome {
        result: StressTestResult::new(ids.len(), failed, start.elapsed()),
        ids,
    }
}

/// Mixes inserts, reads, updates and deletes from several threads.
pub fn stress_mixed_operations<D>(db: &Arc<D>, config: &StressConfig) -> StressTestResult
where
    D: Database + 'static,
{
    let start = Instant::now();

    let handles: Vec<_> = (0..config.threads)
        .map(|t| {
            let db = Arc::clone(db);
            let operations = config.operations;
            thread::spawn(move || {
                let mut successful = 0usize;
                let mut failed = 0usize;
                let mut last = None;

                for i in 0..operations {
                    let outcome = match (i % 4, last) {
                        (0, _) | (_, None) => db
                            .save(sample_invoice(&format!("MIX{t}/{i}")))
                            .map(|stored| last = stored.id),
                        (1, Some(id)) => db.get_by_id(id).map(drop),
                        (2, Some(id)) => db
                            .save(sample_invoice(&format!("MIX{t}/{i}-upd")).with_id(id))
                            .map(drop),
                        (_, Some(id)) => {
                            last = None;
                            db.delete(id)
                        }
                    };
                    match outcome {
                        Ok(()) => successful += 1,
                        Err(_) => failed += 1,
                    }
                }
                (successful, failed)
            })
        })
        .collect();

    let (mut successful, mut failed) = (0usize, 0usize);
    for handle in handles {
        let (s, f) = handle.join().expect("Worker thread panicked");
        successful += s;
        failed += f;
    }

    StressTestResult::new(successful, failed, start.elapsed())
}

#[cfg(test)]
mod tests {
    use super::*;
    use invoicedb_core::{InFileDatabase, InMemoryDatabase};

    fn small() -> StressConfig {
        StressConfig {
            operations: 25,
            threads: 4,
        }
    }

    #[test]
    fn sequential_inserts_all_succeed() {
        let db = InMemoryDatabase::new();
        let result = stress_sequential_inserts(&db, &small());
        assert_eq!(result.successful_ops, 25);
        assert_eq!(result.failed_ops, 0);
        assert_eq!(db.count().unwrap(), 25);
    }

    #[test]
    fn concurrent_inserts_into_file_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let db = Arc::new(InFileDatabase::open(&dir.path().join("concurrent.db")).unwrap());

        let outcome = run_concurrent_inserts(&db, &small());
        assert_eq!(outcome.result.failed_ops, 0);
        assert_eq!(outcome.ids.len(), 100);
        assert!(outcome.ids_unique());
        assert_eq!(outcome.ids.first(), Some(&InvoiceId::new(1)));
        assert_eq!(outcome.ids.last(), Some(&InvoiceId::new(100)));
        assert_eq!(db.count().unwrap(), 100);
    }

    #[test]
    fn mixed_operations_never_fail() {
        // Each thread only touches ids it inserted itself
        let db = Arc::new(InMemoryDatabase::new());
        let result = stress_mixed_operations(&db, &small());
        assert_eq!(result.failed_ops, 0);
        assert_eq!(result.total_ops, 100);
    }
}
