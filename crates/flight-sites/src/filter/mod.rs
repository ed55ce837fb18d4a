// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Minimum flight duration filtering.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use log::trace;

use crate::table::TrackTable;

/// Upper bound of the duration threshold, in minutes.
pub const MAX_DURATION_MINUTES: u32 = 1000;

// Number of thresholds kept by `DurationFilter`
const CACHE_CAPACITY: usize = 16;

/// Rows of `table` whose flight lasted at least `min_minutes`.
pub fn filter(table: &TrackTable, min_minutes: u32) -> TrackTable {
    let min_seconds = f64::from(min_minutes) * 60.0;
    table
        .iter()
        .filter(|row| row.duration_seconds >= min_seconds)
        .copied()
        .collect()
}

/// Memoizing [`filter`] bound to one source table.
///
/// Results are keyed by threshold only, so a filter must never outlive the
/// table it was created for. The cache keeps the most recently computed
/// thresholds and evicts the oldest entry first.
#[derive(Debug)]
pub struct DurationFilter {
    source: Arc<TrackTable>,
    cache: HashMap<u32, Arc<TrackTable>>,
    order: VecDeque<u32>,
}

impl DurationFilter {
    pub fn new(source: Arc<TrackTable>) -> Self {
        Self {
            source,
            cache: HashMap::new(),
            order: VecDeque::new(),
        }
    }

    pub fn source(&self) -> &Arc<TrackTable> {
        &self.source
    }

    /// Filtered view for `min_minutes`, computed at most once while cached.
    pub fn apply(&mut self, min_minutes: u32) -> Arc<TrackTable> {
        if min_minutes == 0 {
            return Arc::clone(&self.source);
        }

        if let Some(view) = self.cache.get(&min_minutes) {
            trace!("Duration filter cache hit for {min_minutes} min");
            return Arc::clone(view);
        }

        let view = Arc::new(filter(&self.source, min_minutes));
        if self.order.len() == CACHE_CAPACITY {
            if let Some(evicted) = self.order.pop_front() {
                self.cache.remove(&evicted);
            }
        }
        self.order.push_back(min_minutes);
        self.cache.insert(min_minutes, Arc::clone(&view));
        view
    }

    pub fn cached_thresholds(&self) -> usize {
        self.cache.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::TrackPoint;

    fn table_with_durations(durations: &[f64]) -> TrackTable {
        durations
            .iter()
            .map(|&duration_seconds| TrackPoint {
                origin_lon: 5.9,
                origin_lat: 45.3,
                dest_lon: 5.8,
                dest_lat: 45.2,
                duration_seconds,
            })
            .collect()
    }

    fn durations(table: &TrackTable) -> Vec<f64> {
        table.iter().map(|row| row.duration_seconds).collect()
    }

    #[test]
    fn test_filter_scenario() {
        let table = table_with_durations(&[30.0, 90.0, 600.0, 1200.0]);
        assert_eq!(durations(&filter(&table, 1)), vec![90.0, 600.0, 1200.0]);
        assert_eq!(durations(&filter(&table, 15)), vec![1200.0]);
    }

    #[test]
    fn test_zero_threshold_keeps_everything() {
        let table = table_with_durations(&[0.0, 1.0, 59.9, 86400.0]);
        assert_eq!(filter(&table, 0), table);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let table = table_with_durations(&[59.0, 60.0, 61.0]);
        assert_eq!(durations(&filter(&table, 1)), vec![60.0, 61.0]);
    }

    #[test]
    fn test_higher_threshold_narrows() {
        let table = table_with_durations(&[0.0, 45.0, 300.0, 301.0, 1800.0, 3600.0, 7200.0, 60000.0]);
        let mut previous = filter(&table, 0);
        for minutes in [1, 5, 6, 30, 60, 120, 999, MAX_DURATION_MINUTES] {
            let narrowed = filter(&table, minutes);
            assert!(narrowed.iter().all(|row| previous.rows().contains(row)));
            assert!(narrowed
                .iter()
                .all(|row| row.duration_seconds >= f64::from(minutes) * 60.0));
            previous = narrowed;
        }
    }

    #[test]
    fn test_cached_filter_returns_shared_view() {
        let table = Arc::new(table_with_durations(&[30.0, 90.0, 600.0]));
        let mut cached = DurationFilter::new(Arc::clone(&table));

        let first = cached.apply(1);
        let second = cached.apply(1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(durations(&first), vec![90.0, 600.0]);

        // Zero is the source table itself
        assert!(Arc::ptr_eq(&cached.apply(0), &table));
    }

    #[test]
    fn test_cache_is_bounded() {
        let table = Arc::new(table_with_durations(&[30.0, 90.0, 600.0]));
        let mut cached = DurationFilter::new(table);

        let oldest = cached.apply(1);
        for minutes in 2..=40 {
            cached.apply(minutes);
        }
        assert_eq!(cached.cached_thresholds(), CACHE_CAPACITY);

        let recomputed = cached.apply(1);
        assert!(!Arc::ptr_eq(&oldest, &recomputed));
        assert_eq!(*oldest, *recomputed);
    }
}
