use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use sysfwd_config::Config;
use sysfwd_filter::FilterEngine;
use sysfwd_metrics::{DrainMetricsProvider, DrainMetricsSnapshot, PipelineSnapshot};
use sysfwd_sources::{FileTailer, SourceMetricsHandle, SyslogListener, TailStream};
use sysfwd_transport::{DrainMetricsHandle, DrainSink, DrainTransport, TransportConfig};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::coordinator::Coordinator;
use crate::metrics::{CoordinatorMetrics, PipelineMetricsHandle};
use crate::stamp::RecordStamper;
use crate::state::{PipelineState, StateCell};
use crate::{PipelineError, Result};

// =============================================================================
// Built pipeline
// =============================================================================

/// A configured, not yet running pipeline
///
/// Only exists when forwarding is enabled; see [`Pipeline::build`].
pub struct Pipeline {
    config: Config,
    transport: TransportConfig,
    filter: Arc<FilterEngine>,
    stamper: RecordStamper,
    metrics: Arc<CoordinatorMetrics>,
    state: StateCell,
}

impl Pipeline {
    /// Build a pipeline from configuration
    ///
    /// Returns `Ok(None)` when `enabled = false`: a disabled forwarder has no
    /// pipeline at all, so no listener, tailer or drain connection can exist.
    ///
    /// # Errors
    ///
    /// Returns `PipelineError::Filter` when the filter rules do not load.
    pub fn build(config: &Config) -> Result<Option<Self>> {
        if !config.enabled {
            tracing::info!("forwarding disabled, no pipeline built");
            return Ok(None);
        }

        let filter = FilterEngine::load(&config.filter.rules)?;
        let transport = TransportConfig::from(&config.drain);
        let stamper = RecordStamper::new(&config.instance, config.sources.files.root.clone());

        tracing::info!(
            drain = %transport.address,
            transport = transport.protocol.as_str(),
            hostname = stamper.hostname(),
            sources = ?config.enabled_sources(),
            filter_rules = filter.len(),
            "pipeline built"
        );

        Ok(Some(Self {
            config: config.clone(),
            transport,
            filter: Arc::new(filter),
            stamper,
            metrics: Arc::new(CoordinatorMetrics::new()),
            state: StateCell::new(PipelineState::for_config(config)),
        }))
    }

    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> PipelineMetricsHandle {
        PipelineMetricsHandle::new(Arc::clone(&self.metrics))
    }

    /// Hostname stamped on records that carry none
    pub fn hostname(&self) -> &str {
        self.stamper.hostname()
    }

    /// Start the sources, the coordinator and the drain sink
    ///
    /// Cancelling `cancel` stops the inputs; the coordinator and sink then
    /// finish the records already taken in. Use
    /// [`RunningPipeline::shutdown`] to bound that with a grace period.
    ///
    /// # Errors
    ///
    /// `PipelineError::Startup` when the drain is required to be reachable
    /// and is not, when a socket cannot be bound, or when the file root is
    /// missing. Nothing is left running on error.
    pub async fn start(self, cancel: CancellationToken) -> Result<RunningPipeline> {
        let inputs = cancel.child_token();
        let queue_size = self.config.pipeline.queue_size.max(1);

        let mut transport = DrainTransport::new(self.transport.clone());
        if self.config.drain.require_reachable {
            transport
                .connect()
                .await
                .map_err(|e| PipelineError::startup("drain", e))?;
        }

        let socket = &self.config.sources.socket;
        let listener = if socket.enabled && (socket.path.is_some() || socket.udp_address.is_some())
        {
            let listener = SyslogListener::bind(socket, self.stamper.hostname())
                .map_err(|e| PipelineError::startup("syslog listener", e))?;
            Some(listener)
        } else {
            None
        };

        // Spawns the tailer task, so it goes last among fallible steps
        let lines = if self.config.sources.files.enabled {
            let stream = FileTailer::start(self.config.sources.files.clone(), inputs.clone())
                .map_err(|e| PipelineError::startup("file tailer", e))?;
            Some(stream)
        } else {
            None
        };

        let mut source_handles = Vec::new();
        if let Some(listener) = &listener {
            source_handles.extend(listener.metrics_handles());
        }
        if let Some(stream) = &lines {
            source_handles.push(stream.metrics_handle());
        }

        let (sink_tx, sink_rx) = mpsc::channel(queue_size);
        let sink = DrainSink::new(transport, sink_rx);
        let drain_handle = sink.metrics_handle();
        let sink_task = tokio::spawn(sink.run());

        let mut udp_addr = None;
        let (records, listener_task) = match listener {
            Some(listener) => {
                udp_addr = listener.udp_local_addr();
                let (tx, rx) = mpsc::channel(queue_size);
                let task = tokio::spawn(listener.run(tx, inputs.clone()));
                (Some(rx), Some(task))
            }
            None => (None, None),
        };

        let coordinator = Coordinator::new(
            self.stamper,
            self.filter,
            Arc::clone(&self.metrics),
            sink_tx,
        );
        let coordinator_task = tokio::spawn(coordinator.run(records, lines));

        self.state.set(PipelineState::Running);
        tracing::info!(
            sources = source_handles.len(),
            queue_size,
            "pipeline running"
        );

        Ok(RunningPipeline {
            state: self.state,
            inputs,
            udp_addr,
            listener_task,
            coordinator_task,
            sink_task,
            metrics: self.metrics,
            source_handles,
            drain_handle,
        })
    }
}

// =============================================================================
// Running pipeline
// =============================================================================

/// Final counters returned by [`RunningPipeline::shutdown`]
#[derive(Debug, Clone, Copy)]
pub struct ShutdownReport {
    pub pipeline: PipelineSnapshot,
    pub drain: DrainMetricsSnapshot,
    /// False when the grace period elapsed and in-flight records were abandoned
    pub completed: bool,
}

/// Handle to a started pipeline
pub struct RunningPipeline {
    state: StateCell,
    inputs: CancellationToken,
    udp_addr: Option<SocketAddr>,
    listener_task: Option<JoinHandle<()>>,
    coordinator_task: JoinHandle<Option<TailStream>>,
    sink_task: JoinHandle<DrainMetricsSnapshot>,
    metrics: Arc<CoordinatorMetrics>,
    source_handles: Vec<SourceMetricsHandle>,
    drain_handle: DrainMetricsHandle,
}

impl RunningPipeline {
    pub fn state(&self) -> PipelineState {
        self.state.get()
    }

    /// Get a metrics handle for reporting
    pub fn metrics_handle(&self) -> PipelineMetricsHandle {
        PipelineMetricsHandle::new(Arc::clone(&self.metrics))
    }

    /// One handle per running source
    pub fn source_metrics(&self) -> &[SourceMetricsHandle] {
        &self.source_handles
    }

    pub fn drain_metrics(&self) -> DrainMetricsHandle {
        self.drain_handle.clone()
    }

    /// Bound address of the UDP syslog socket, if configured
    pub fn udp_local_addr(&self) -> Option<SocketAddr> {
        self.udp_addr
    }

    /// Stop the inputs and deliver what is already in flight
    ///
    /// Waits at most `grace` for the coordinator and the drain sink to
    /// finish; after that the remaining tasks are aborted and their records
    /// are lost.
    pub async fn shutdown(self, grace: Duration) -> ShutdownReport {
        self.state.set(PipelineState::Draining);
        tracing::info!(grace = ?grace, "pipeline draining");
        self.inputs.cancel();

        let Self {
            state,
            listener_task,
            coordinator_task,
            sink_task,
            metrics,
            drain_handle,
            ..
        } = self;

        let mut aborts = vec![coordinator_task.abort_handle(), sink_task.abort_handle()];
        if let Some(task) = &listener_task {
            aborts.push(task.abort_handle());
        }

        let drained = tokio::time::timeout(grace, async move {
            if let Some(task) = listener_task
                && let Err(e) = task.await
            {
                tracing::warn!(error = %e, "syslog listener task failed");
            }

            match coordinator_task.await {
                Ok(Some(lines)) => lines.stopped().await,
                Ok(None) => {}
                Err(e) => tracing::warn!(error = %e, "coordinator task failed"),
            }

            if let Err(e) = sink_task.await {
                tracing::warn!(error = %e, "drain sink task failed");
            }
        })
        .await;

        let completed = drained.is_ok();
        if !completed {
            for abort in &aborts {
                abort.abort();
            }
            tracing::warn!(
                grace = ?grace,
                "shutdown grace period elapsed, abandoning in-flight records"
            );
        }

        state.set(PipelineState::Stopped);

        let report = ShutdownReport {
            pipeline: metrics.snapshot(),
            drain: drain_handle.snapshot(),
            completed,
        };
        tracing::info!(
            records_in = report.pipeline.records_in,
            forwarded = report.pipeline.records_forwarded,
            sent = report.drain.records_sent,
            dropped = report.drain.records_dropped,
            "pipeline stopped"
        );
        report
    }
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod pipeline_test;
