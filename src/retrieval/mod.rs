//! Retrieval pipeline: connectivity preflight, crawl and content extraction
//!
//! The pipeline turns a target URL into either decoded page text or a
//! categorized [`Failure`](crate::failure::Failure) that the analysis stage
//! and the bulk orchestrator can report without further interpretation.

mod pipeline;
mod preflight;

pub use pipeline::{RetrievalOutcome, RetrievalPipeline, RetrievalReport};
pub use preflight::{check_transport, probe_reachability, ProbeReport};
