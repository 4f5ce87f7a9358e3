//! Pluggable per-region age sources.
//!
//! An [`AgeSource`] is a finite, non-restartable stream of ages for one
//! region plus an explicit release operation. A [`SourceFactory`] maps a
//! region name to a freshly opened source and may fail at open time. Both
//! are external collaborators: how a region reaches a file, a socket, or an
//! in-memory vector is none of this crate's business.

use anyhow::Result;
use log::warn;

/// A lazy, single-use stream of integer ages for one region.
///
/// Implementations may open resources when constructed; the aggregator
/// guarantees [`release`](AgeSource::release) is called exactly once per
/// successful open, on every exit path.
pub trait AgeSource: Send {
    /// Pull the next age, or `Ok(None)` once the stream is exhausted.
    ///
    /// # Errors
    ///
    /// Fails if the underlying medium fails mid-stream; the stream must not
    /// be pulled again afterwards.
    fn next_age(&mut self) -> Result<Option<i64>>;

    /// Release any resources held by this source.
    ///
    /// # Errors
    ///
    /// Fails if the underlying resource cannot be released cleanly.
    fn release(&mut self) -> Result<()>;
}

/// Maps a region name to a newly opened [`AgeSource`].
pub trait SourceFactory: Send + Sync {
    /// Open a source for `region`.
    ///
    /// # Errors
    ///
    /// Fails if the region is unknown or unreachable.
    fn open(&self, region: &str) -> Result<Box<dyn AgeSource>>;
}

/// Plain closures are factories, mirroring a constructor that takes a
/// `Fn(&str) -> Result<Box<dyn AgeSource>>`.
impl<F> SourceFactory for F
where
    F: Fn(&str) -> Result<Box<dyn AgeSource>> + Send + Sync,
{
    fn open(&self, region: &str) -> Result<Box<dyn AgeSource>> {
        self(region)
    }
}

/// Scoped ownership of one opened source.
///
/// Explicit [`release`](ScopedSource::release) consumes the guard and
/// surfaces the release error. Dropping an unreleased guard (scan error or
/// panic mid-stream) still releases; a failure on that path is logged, as
/// the scan error owns the exit.
pub(crate) struct ScopedSource<'a> {
    region: &'a str,
    inner: Option<Box<dyn AgeSource>>,
}

impl<'a> ScopedSource<'a> {
    pub(crate) fn new(region: &'a str, inner: Box<dyn AgeSource>) -> Self {
        Self {
            region,
            inner: Some(inner),
        }
    }

    pub(crate) fn next_age(&mut self) -> Result<Option<i64>> {
        match self.inner.as_mut() {
            Some(source) => source.next_age(),
            None => Ok(None),
        }
    }

    pub(crate) fn release(mut self) -> Result<()> {
        match self.inner.take() {
            Some(mut source) => source.release(),
            None => Ok(()),
        }
    }
}

impl Drop for ScopedSource<'_> {
    fn drop(&mut self) {
        if let Some(mut source) = self.inner.take() {
            if let Err(e) = source.release() {
                warn!(
                    "age source for region {:?} failed to release on drop: {e:#}",
                    self.region
                );
            }
        }
    }
}
