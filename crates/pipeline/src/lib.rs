//! sysfwd - Pipeline
//!
//! Wires the sources, the filter and the drain sink into one forwarding
//! pipeline.
//!
//! # Architecture
//!
//! ```text
//! [Sources]                      [Coordinator]                        [Drain]
//!   /dev/log ──┐
//!   UDP ───────┴─ mpsc<Record> ──┐
//!                                ├─▶ stamp ─▶ FilterEngine ─▶ mpsc<Record> ─▶ DrainSink ─▶ UDP/TCP
//!   FileTailer ── TailStream ────┘            (drop counted)
//! ```
//!
//! # Key Design
//!
//! - **Enable switch as construction guard**: [`Pipeline::build`] returns
//!   `Ok(None)` for a disabled config, so nothing can be started by mistake
//! - **Bounded hand-off**: every stage is joined by a bounded `mpsc` channel
//!   sized by `pipeline.queue_size`; a slow drain backs up into the sources
//! - **Single writer**: only the [`DrainSink`](sysfwd_transport::DrainSink)
//!   task touches the drain connection
//! - **Graceful stop**: inputs are cancelled first, the coordinator drains
//!   its channels, then the sink finishes within the grace period
//!
//! # Example
//!
//! ```ignore
//! use sysfwd_pipeline::Pipeline;
//!
//! let Some(pipeline) = Pipeline::build(&config)? else {
//!     return Ok(()); // forwarding disabled
//! };
//! let running = pipeline.start(cancel.clone()).await?;
//! shutdown_signal().await;
//! let report = running.shutdown(config.pipeline.shutdown_grace).await;
//! ```

mod coordinator;
mod error;
mod metrics;
mod pipeline;
mod stamp;
mod state;

pub use error::{PipelineError, Result};
pub use metrics::{CoordinatorMetrics, PipelineMetricsHandle};
pub use pipeline::{Pipeline, RunningPipeline, ShutdownReport};
pub use stamp::RecordStamper;
pub use state::PipelineState;
