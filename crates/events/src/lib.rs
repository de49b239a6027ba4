//! Ingestion infrastructure for the papertrail audit engine.
//!
//! - [`RecordBus`] — in-process broadcast hub carrying assembled record
//!   drafts from the mapper to the persistence loop.
//! - [`MutationObserver`] — per-request observer that captures before
//!   state, diffs it against after state, and gates what gets logged.
//! - [`RecordWriter`] — background service that durably appends every
//!   published draft to the record store.

pub mod bus;
pub mod observer;
pub mod writer;

pub use bus::RecordBus;
pub use observer::MutationObserver;
pub use writer::RecordWriter;
