//! Testing utilities for census aggregation.
//!
//! This module provides the pieces end-user tests (and this crate's own)
//! need to exercise the aggregator without real data feeds:
//!
//! - [`MemoryFactory`]: canned region → ages mapping with release tracking
//! - [`MemorySource`]: finite vec-backed source
//! - [`FailingSource`]: scripted scan/release failures for error paths
//! - [`FileSource`] + [`mock_age_file`]: an I/O-flavored source over a
//!   newline-separated temp file
//!
//! # Quick Start
//!
//! ```
//! use census::Census;
//! use census::testing::MemoryFactory;
//!
//! let factory = MemoryFactory::default()
//!     .with_region("north", vec![10, 10, 15])
//!     .with_region("south", vec![15, -3]);
//!
//! let census = Census::new(factory.clone());
//! let top = census.top3_ages_many(&[Some("north"), Some("south")])?;
//! assert_eq!(top, vec!["1:10=2".to_string(), "2:15=2".to_string()]);
//! assert_eq!(factory.probe().release_count(), 2);
//! # Ok::<(), census::CensusError>(())
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::vec;

use anyhow::{Context, Result, anyhow, bail};
use tempfile::NamedTempFile;

use crate::source::{AgeSource, SourceFactory};

/// Shared release counter, observable from tests.
#[derive(Debug, Default)]
pub struct ReleaseProbe {
    released: AtomicUsize,
}

impl ReleaseProbe {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// How many sources have released so far.
    #[must_use]
    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn mark(&self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// A finite in-memory age stream.
pub struct MemorySource {
    ages: vec::IntoIter<i64>,
    probe: Option<Arc<ReleaseProbe>>,
}

impl MemorySource {
    #[must_use]
    pub fn new(ages: Vec<i64>) -> Self {
        Self {
            ages: ages.into_iter(),
            probe: None,
        }
    }

    /// Track releases of this source on `probe`.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<ReleaseProbe>) -> Self {
        self.probe = Some(probe);
        self
    }
}

impl AgeSource for MemorySource {
    fn next_age(&mut self) -> Result<Option<i64>> {
        Ok(self.ages.next())
    }

    fn release(&mut self) -> Result<()> {
        if let Some(probe) = &self.probe {
            probe.mark();
        }
        Ok(())
    }
}

/// A source scripted to fail, for exercising error paths.
///
/// Yields its canned ages first, then either errors on the next pull
/// ([`scan_failure`](Self::scan_failure)) or exhausts cleanly and errors on
/// release ([`release_failure`](Self::release_failure)). Release is still
/// observable through the probe either way.
pub struct FailingSource {
    ages: vec::IntoIter<i64>,
    fail_scan: bool,
    fail_release: bool,
    probe: Option<Arc<ReleaseProbe>>,
}

impl FailingSource {
    /// Yield `yield_first` values, then fail the scan.
    #[must_use]
    pub fn scan_failure(yield_first: Vec<i64>) -> Self {
        Self {
            ages: yield_first.into_iter(),
            fail_scan: true,
            fail_release: false,
            probe: None,
        }
    }

    /// Yield all of `ages` cleanly, then fail on release.
    #[must_use]
    pub fn release_failure(ages: Vec<i64>) -> Self {
        Self {
            ages: ages.into_iter(),
            fail_scan: false,
            fail_release: true,
            probe: None,
        }
    }

    /// Track release attempts of this source on `probe`.
    #[must_use]
    pub fn with_probe(mut self, probe: Arc<ReleaseProbe>) -> Self {
        self.probe = Some(probe);
        self
    }
}

impl AgeSource for FailingSource {
    fn next_age(&mut self) -> Result<Option<i64>> {
        match self.ages.next() {
            Some(age) => Ok(Some(age)),
            None if self.fail_scan => bail!("synthetic scan failure"),
            None => Ok(None),
        }
    }

    fn release(&mut self) -> Result<()> {
        if let Some(probe) = &self.probe {
            probe.mark();
        }
        if self.fail_release {
            bail!("synthetic release failure");
        }
        Ok(())
    }
}

/// Canned region → ages factory.
///
/// Unknown regions fail at open time. Every source opened through the
/// factory reports its release to the shared [`ReleaseProbe`].
#[derive(Clone, Default)]
pub struct MemoryFactory {
    regions: HashMap<String, Vec<i64>>,
    probe: Arc<ReleaseProbe>,
}

impl MemoryFactory {
    /// Register a region and its age stream.
    #[must_use]
    pub fn with_region(mut self, region: &str, ages: Vec<i64>) -> Self {
        self.regions.insert(region.to_string(), ages);
        self
    }

    /// The probe shared by every source this factory opens.
    #[must_use]
    pub fn probe(&self) -> Arc<ReleaseProbe> {
        Arc::clone(&self.probe)
    }
}

impl SourceFactory for MemoryFactory {
    fn open(&self, region: &str) -> Result<Box<dyn AgeSource>> {
        let ages = self
            .regions
            .get(region)
            .ok_or_else(|| anyhow!("unknown region {region:?}"))?;
        Ok(Box::new(
            MemorySource::new(ages.clone()).with_probe(self.probe()),
        ))
    }
}

/// Reads newline-separated ages from a file; blank lines are skipped.
///
/// Release drops the underlying handle; pulling after release reports
/// exhaustion.
pub struct FileSource {
    lines: Option<io::Lines<BufReader<File>>>,
}

impl FileSource {
    /// Open `path` for scanning.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("opening age file {}", path.display()))?;
        Ok(Self {
            lines: Some(BufReader::new(file).lines()),
        })
    }
}

impl AgeSource for FileSource {
    fn next_age(&mut self) -> Result<Option<i64>> {
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };
        for line in lines {
            let line = line.context("reading age file")?;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let age = trimmed
                .parse::<i64>()
                .with_context(|| format!("malformed age line {trimmed:?}"))?;
            return Ok(Some(age));
        }
        Ok(None)
    }

    fn release(&mut self) -> Result<()> {
        self.lines.take();
        Ok(())
    }
}

/// Write ages to a temp file, one per line, for use with [`FileSource`].
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written.
pub fn mock_age_file(ages: &[i64]) -> io::Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    for age in ages {
        writeln!(file, "{age}")?;
    }
    file.flush()?;
    Ok(file)
}
