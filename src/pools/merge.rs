/// Merge rules for worker records reported more than once in one response
use super::types::PoolAddressWorkerData;
use std::collections::HashMap;

/// Maximum where a missing side loses; `None` only when both are missing
pub fn max_float(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.max(b)),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// Sum where a missing side counts as 0; `None` only when both are missing
pub fn combine_float(a: Option<f64>, b: Option<f64>) -> Option<f64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}

/// Worker records keyed by name, kept in first-seen order
///
/// A second record under an existing name is folded into the first:
/// best difficulty takes the max, hash rate is summed and online is OR-ed.
#[derive(Debug, Default)]
pub struct WorkerSet {
    workers: Vec<PoolAddressWorkerData>,
    index: HashMap<String, usize>,
}

impl WorkerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, worker: PoolAddressWorkerData) {
        match self.index.get(&worker.name) {
            Some(&position) => {
                let existing = &mut self.workers[position];
                existing.best_difficulty =
                    max_float(existing.best_difficulty, worker.best_difficulty);
                existing.hash_rate = combine_float(existing.hash_rate, worker.hash_rate);
                existing.is_online = existing.is_online || worker.is_online;
            }
            None => {
                self.index.insert(worker.name.clone(), self.workers.len());
                self.workers.push(worker);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Highest best difficulty across all workers
    pub fn max_best_difficulty(&self) -> Option<f64> {
        self.workers
            .iter()
            .fold(None, |acc, worker| max_float(acc, worker.best_difficulty))
    }

    pub fn into_workers(self) -> Vec<PoolAddressWorkerData> {
        self.workers
    }
}

impl FromIterator<PoolAddressWorkerData> for WorkerSet {
    fn from_iter<I: IntoIterator<Item = PoolAddressWorkerData>>(iter: I) -> Self {
        let mut set = WorkerSet::new();
        for worker in iter {
            set.insert(worker);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_float() {
        assert_eq!(max_float(Some(1.0), Some(2.0)), Some(2.0));
        assert_eq!(max_float(Some(-5.0), None), Some(-5.0));
        assert_eq!(max_float(None, Some(3.0)), Some(3.0));
        assert_eq!(max_float(None, None), None);
    }

    #[test]
    fn test_combine_float() {
        assert_eq!(combine_float(Some(1.5), Some(2.0)), Some(3.5));
        assert_eq!(combine_float(None, Some(2.0)), Some(2.0));
        assert_eq!(combine_float(Some(0.0), None), Some(0.0));
        assert_eq!(combine_float(None, None), None);
    }

    #[test]
    fn test_duplicate_workers_are_folded() {
        let set: WorkerSet = vec![
            PoolAddressWorkerData::new("rig1", Some(10.0), Some(100.0), false),
            PoolAddressWorkerData::new("rig2", None, Some(5.0), true),
            PoolAddressWorkerData::new("rig1", Some(40.0), Some(50.0), true),
        ]
        .into_iter()
        .collect();

        assert_eq!(set.len(), 2);
        assert_eq!(set.max_best_difficulty(), Some(40.0));

        let workers = set.into_workers();
        assert_eq!(workers[0].name, "rig1");
        assert_eq!(workers[0].hash_rate, Some(150.0));
        assert_eq!(workers[0].best_difficulty, Some(40.0));
        assert!(workers[0].is_online);
        assert_eq!(workers[1].name, "rig2");
    }

    #[test]
    fn test_empty_set() {
        let set = WorkerSet::new();
        assert!(set.is_empty());
        assert_eq!(set.max_best_difficulty(), None);
        assert!(set.into_workers().is_empty());
    }
}
