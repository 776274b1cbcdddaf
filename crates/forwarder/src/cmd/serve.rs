//! Serve command - run the forwarder until SIGINT/SIGTERM

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use sysfwd_config::Config;
use sysfwd_metrics::{MetricsReporter, SourceMetricsProvider};
use sysfwd_pipeline::{Pipeline, PipelineState, RunningPipeline};

/// Run the serve command
pub async fn run(config: Config, config_path: &Path) -> Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        platform = std::env::consts::OS,
        arch = std::env::consts::ARCH,
        config = %config_path.display(),
        "sysfwd starting"
    );

    let Some(pipeline) = Pipeline::build(&config).context("failed to build pipeline")? else {
        info!(
            state = %PipelineState::for_config(&config),
            "forwarding disabled, nothing to run"
        );
        return Ok(());
    };

    let cancel = CancellationToken::new();
    let running = pipeline
        .start(cancel.clone())
        .await
        .context("failed to start pipeline")?;

    let metrics_task = if config.metrics.enabled {
        let reporter = build_metrics_reporter(&config, &running);
        Some(tokio::spawn(reporter.run(cancel.clone())))
    } else {
        info!("metrics reporting disabled");
        None
    };

    info!(
        drain = %config.drain.address,
        sources = ?config.enabled_sources(),
        "sysfwd running"
    );

    wait_for_shutdown().await?;
    info!("shutdown signal received, draining...");

    let report = running.shutdown(config.pipeline.shutdown_grace).await;
    if !report.completed {
        warn!(
            grace = ?config.pipeline.shutdown_grace,
            "drain did not finish within the grace period"
        );
    }

    // Reporter emits a final report on cancel
    cancel.cancel();
    if let Some(task) = metrics_task
        && let Err(e) = task.await
    {
        warn!(error = %e, "metrics reporter task failed");
    }

    info!(
        forwarded = report.pipeline.records_forwarded,
        filtered = report.pipeline.records_filtered,
        sent = report.drain.records_sent,
        dropped = report.drain.records_dropped,
        "sysfwd shutdown complete"
    );
    Ok(())
}

/// Build the metrics reporter with all component handles
fn build_metrics_reporter(config: &Config, running: &RunningPipeline) -> MetricsReporter {
    let sources: Vec<Arc<dyn SourceMetricsProvider>> = running
        .source_metrics()
        .iter()
        .map(|h| Arc::new(h.clone()) as Arc<dyn SourceMetricsProvider>)
        .collect();

    MetricsReporter::builder()
        .config(config.metrics.clone())
        .pipeline(Arc::new(running.metrics_handle()))
        .sources(sources)
        .drain(Arc::new(running.drain_metrics()))
        .build()
}

async fn wait_for_shutdown() -> Result<()> {
    let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())
        .context("failed to install SIGTERM handler")?;

    tokio::select! {
        result = signal::ctrl_c() => result.context("failed to listen for Ctrl+C")?,
        _ = terminate.recv() => {},
    }
    Ok(())
}
