//! # Census
//!
//! A **parallel top-3 age aggregator** over pluggable per-region data
//! sources. Given a factory that maps a region name to a finite stream of
//! integer ages, `census` scans one or many regions, counts every valid
//! age, and renders the three most frequent as `"<position>:<age>=<count>"`.
//!
//! ## Key Features
//!
//! - **Pluggable sources** - bring any [`AgeSource`] via a [`SourceFactory`]
//!   (a plain closure works)
//! - **Parallel multi-region scans** - bounded rayon pool sized to hardware
//!   concurrency, commutative merge so counts never depend on scan order
//! - **Deterministic ranking** - count descending, ties broken by ascending
//!   age, rank derived purely from position
//! - **Disciplined cleanup** - every opened source is released exactly once,
//!   on every exit path, with release failures surfaced rather than swallowed
//! - **Fail-fast multi-region errors** - the first failing region aborts the
//!   run and is named in the error
//!
//! ## Quick Start
//!
//! ```
//! use census::Census;
//! use census::testing::MemoryFactory;
//!
//! # fn main() -> census::Result<()> {
//! let factory = MemoryFactory::default()
//!     .with_region("north", vec![10, 15, 10, 12, 10])
//!     .with_region("south", vec![15, 15, 12, -1]);
//!
//! let census = Census::new(factory);
//!
//! // One region: empty/missing names mean "no data".
//! assert!(census.top3_ages(None)?.is_empty());
//!
//! // Many regions, scanned in parallel and merged.
//! let top = census.top3_ages_many(&[Some("north"), Some("south")])?;
//! assert_eq!(top, vec!["1:10=3", "2:15=3", "3:12=2"]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Concepts
//!
//! ### Sources
//!
//! An [`AgeSource`] is a lazy, single-use stream: pull ages until
//! exhaustion, then release. Negative ages are invalid sentinels and are
//! discarded without erroring. Sources are external collaborators; the
//! [`testing`] module ships in-memory, failing, and file-backed ones.
//!
//! ### Aggregation
//!
//! [`aggregate_one`] drains a single region into a [`FrequencyMap`];
//! [`aggregate_many`] scans regions in parallel, each worker building a
//! private map, merged with a commutative sum. `None`, empty, and the
//! reserved `"empty"`/`"invalid"` names are skipped in list form.
//!
//! ### Selection and formatting
//!
//! [`select_top3`] is a pure reduction of the map to at most three
//! `(age, count)` pairs; [`format_ranked`] renders them positionally, so
//! repeated calls are byte-identical.
//!
//! ## Errors
//!
//! All failures are [`CensusError`] variants. Source-flavored ones carry
//! the offending region; multi-region runs are fail-fast and never produce
//! partial output.

mod aggregate;
mod census;
mod format;
mod source;
mod topk;

pub mod error;
pub mod testing;

pub use aggregate::{FrequencyMap, aggregate_many, aggregate_one};
pub use census::Census;
pub use error::{CensusError, Result};
pub use format::format_ranked;
pub use source::{AgeSource, SourceFactory};
pub use topk::{TOP_K, select_top3};
