// SPDX-FileCopyrightText: 2026 Citabot Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent and entity extraction for inbound messages, plus the
//! slot-filling evaluator that decides when a request is ready to book.
//!
//! The pipeline has two stages: a free deterministic pre-filter and a
//! language-understanding call whose output is validated and
//! confidence-adjusted before anyone acts on it.

pub mod analyzer;
pub mod dates;
pub mod merge;
pub mod prefilter;
pub mod schema;

pub use analyzer::Analyzer;
pub use merge::{MergeOutcome, merge};
pub use prefilter::{Prefilter, PrefilterHits, ServiceCatalog};
