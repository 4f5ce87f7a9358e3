//! Frequency-map aggregation across one or many regions.
//!
//! Two-phase shape: every region scan builds a private map on its own
//! worker, and the private maps are merged centrally with a commutative
//! sum-merge, so no increment is ever lost and completion order never
//! affects the final counts.

use std::collections::HashMap;

use log::{debug, trace};
use rayon::prelude::*;

use crate::error::{CensusError, Result};
use crate::source::{ScopedSource, SourceFactory};

/// Value → count accumulator built from one or more region scans.
pub type FrequencyMap = HashMap<i64, u64>;

/// Region names dropped from multi-region scans without erroring.
/// Case-insensitive, and deliberately *not* applied to single-region calls.
const SKIPPED_REGIONS: [&str; 2] = ["empty", "invalid"];

/// Scan one region into a fresh [`FrequencyMap`].
///
/// Opens via the factory, drains the stream counting every age ≥ 0
/// (negative sentinels are discarded, not errors), and releases the source
/// on every exit path. A release failure after a clean scan aborts the
/// region's result rather than being swallowed.
///
/// # Errors
///
/// [`CensusError::SourceOpen`], [`CensusError::SourceScan`], or
/// [`CensusError::SourceRelease`], each naming `region`.
pub fn aggregate_one<F>(factory: &F, region: &str) -> Result<FrequencyMap>
where
    F: SourceFactory + ?Sized,
{
    let opened = factory.open(region).map_err(|e| CensusError::SourceOpen {
        region: region.to_string(),
        source: e,
    })?;
    let mut source = ScopedSource::new(region, opened);

    let mut counts = FrequencyMap::new();
    match drain(&mut source, &mut counts) {
        Ok(valid) => {
            source.release().map_err(|e| CensusError::SourceRelease {
                region: region.to_string(),
                source: e,
            })?;
            debug!(
                "region {region:?}: {valid} valid ages, {} distinct",
                counts.len()
            );
            Ok(counts)
        }
        // The guard's drop releases the source; the scan error owns the exit.
        Err(e) => Err(CensusError::SourceScan {
            region: region.to_string(),
            source: e,
        }),
    }
}

fn drain(source: &mut ScopedSource<'_>, counts: &mut FrequencyMap) -> anyhow::Result<u64> {
    let mut valid = 0u64;
    while let Some(age) = source.next_age()? {
        if age >= 0 {
            *counts.entry(age).or_insert(0) += 1;
            valid += 1;
        } else {
            trace!("discarding negative sentinel {age}");
        }
    }
    Ok(valid)
}

/// Scan many regions in parallel and merge into one [`FrequencyMap`].
///
/// Entries that are `None`, empty, or case-insensitively equal to a
/// reserved sentinel name are skipped as no-op partitions. The survivors
/// run on the current rayon pool, one private map per region, reduced with
/// a commutative sum-merge.
///
/// Fail-fast: the first region error short-circuits the reduction, so
/// not-yet-started scans are never dispatched; in-flight scans finish but
/// their partial maps are discarded.
///
/// # Errors
///
/// The first region failure, naming that region.
pub fn aggregate_many<F>(factory: &F, regions: &[Option<&str>]) -> Result<FrequencyMap>
where
    F: SourceFactory + ?Sized,
{
    regions
        .par_iter()
        .filter_map(|entry| *entry)
        .filter(|region| is_scannable(region))
        .map(|region| aggregate_one(factory, region))
        .try_reduce(FrequencyMap::new, |mut into, from| {
            merge_into(&mut into, from);
            Ok(into)
        })
}

fn is_scannable(region: &str) -> bool {
    !region.is_empty()
        && !SKIPPED_REGIONS
            .iter()
            .any(|sentinel| region.eq_ignore_ascii_case(sentinel))
}

// Commutative, so reduction order is irrelevant.
fn merge_into(into: &mut FrequencyMap, from: FrequencyMap) {
    for (age, count) in from {
        *into.entry(age).or_insert(0) += count;
    }
}

#[cfg(test)]
mod tests {
    use super::is_scannable;

    #[test]
    fn sentinel_names_are_not_scannable() {
        assert!(!is_scannable(""));
        assert!(!is_scannable("empty"));
        assert!(!is_scannable("EMPTY"));
        assert!(!is_scannable("Invalid"));
        assert!(is_scannable("north"));
        assert!(is_scannable("emptyish"));
    }
}
