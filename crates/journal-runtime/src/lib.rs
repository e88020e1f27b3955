#![forbid(unsafe_code)]

//! Runtime for the journal pipeline.
//!
//! [`JournalEngine`] owns all pipeline state and the two collaborators: a
//! [`LogSource`] it pulls from and an [`OutputSink`] it renders into.
//! [`run`] drives it on a jittered interval until a [`StopSignal`] fires.
//!
//! All state lives in one engine value on one thread, so nothing here
//! locks except the stop signal.

pub mod engine;
pub mod memory;
pub mod runner;
pub mod source;
pub mod stop;

pub use engine::{EngineError, EngineStats, JournalEngine, Outcome, RenderStatus, TickReport};
pub use memory::{Frame, MemorySink, MemorySource};
pub use runner::{RunSummary, TickSchedule, run};
pub use source::{LogSource, OutputSink, SinkError, SourceError};
pub use stop::{StopSignal, StopTrigger};
