//! The public census facade.

use crate::aggregate::{self, FrequencyMap};
use crate::error::{CensusError, Result};
use crate::format::format_ranked;
use crate::source::SourceFactory;
use crate::topk::select_top3;

/// Computes the three most frequent ages per region set.
///
/// Stateless apart from its configuration: nothing persists between calls,
/// so identical inputs always produce identical output.
///
/// # Example
///
/// ```
/// use census::{Census, testing::MemoryFactory};
///
/// let factory = MemoryFactory::default().with_region("north", vec![12, 12, 7]);
/// let census = Census::new(factory);
///
/// let top = census.top3_ages(Some("north"))?;
/// assert_eq!(top, vec!["1:12=2".to_string(), "2:7=1".to_string()]);
/// # Ok::<(), census::CensusError>(())
/// ```
pub struct Census<F> {
    factory: F,
    workers: usize,
}

impl<F: SourceFactory> Census<F> {
    /// Create a census over `factory`, sized to available hardware
    /// concurrency.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            workers: num_cpus::get().max(1),
        }
    }

    /// Override the multi-region worker pool size.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Top-3 ages of a single region, rendered as `"<pos>:<age>=<count>"`.
    ///
    /// `None` and the empty name mean "no data" and yield an empty vec,
    /// never an error.
    ///
    /// # Errors
    ///
    /// A source open/scan/release failure, naming the region.
    pub fn top3_ages(&self, region: Option<&str>) -> Result<Vec<String>> {
        let Some(region) = region.filter(|r| !r.is_empty()) else {
            return Ok(Vec::new());
        };
        let counts = aggregate::aggregate_one(&self.factory, region)?;
        Ok(render(&counts))
    }

    /// Top-3 ages across many regions, scanned in parallel.
    ///
    /// `None`, empty, and sentinel entries are skipped; an entirely empty
    /// *result* is fine (empty vec), but an empty *input list* is a caller
    /// contract violation.
    ///
    /// # Errors
    ///
    /// [`CensusError::InvalidArgument`] for an empty list; otherwise the
    /// first region failure (fail-fast), naming that region.
    pub fn top3_ages_many(&self, regions: &[Option<&str>]) -> Result<Vec<String>> {
        if regions.is_empty() {
            return Err(CensusError::InvalidArgument(
                "top3_ages_many requires a non-empty region list",
            ));
        }
        // Scoped pool: sizing stays per-instance instead of mutating the
        // process-global rayon pool.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;
        let counts = pool.install(|| aggregate::aggregate_many(&self.factory, regions))?;
        Ok(render(&counts))
    }
}

fn render(counts: &FrequencyMap) -> Vec<String> {
    format_ranked(&select_top3(counts))
}
