//! Periodic metrics reporter
//!
//! Runs beside the pipeline, samples every registered provider each
//! `interval`, and logs the result through the configured formatter. With
//! `warn_on_loss` it also raises a warning for records the drain dropped or
//! input a source discarded since the previous report.

use crate::loss::losses_since;
use crate::{
    CollectedDrain, CollectedMetrics, CollectedSource, DrainMetricsProvider, HumanFormatter,
    JsonFormatter, Loss, MetricsFormatter, PipelineMetricsProvider, SourceMetricsProvider,
};
use std::sync::Arc;
use sysfwd_config::{MetricsConfig, MetricsFormat};
use tokio::time::{MissedTickBehavior, interval};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Default)]
struct Providers {
    pipeline: Option<Arc<dyn PipelineMetricsProvider>>,
    sources: Vec<Arc<dyn SourceMetricsProvider>>,
    drains: Vec<Arc<dyn DrainMetricsProvider>>,
}

impl Providers {
    fn collect(&self) -> CollectedMetrics {
        CollectedMetrics {
            pipeline: self.pipeline.as_ref().map(|p| p.pipeline_snapshot()),
            sources: self
                .sources
                .iter()
                .map(|s| CollectedSource {
                    id: s.source_id().to_owned(),
                    source_type: s.source_type().to_owned(),
                    snapshot: s.snapshot(),
                })
                .collect(),
            drains: self
                .drains
                .iter()
                .map(|d| CollectedDrain {
                    id: d.drain_id().to_owned(),
                    transport: d.transport().to_owned(),
                    snapshot: d.snapshot(),
                })
                .collect(),
            ..CollectedMetrics::new()
        }
    }
}

#[derive(Default)]
pub struct MetricsReporterBuilder {
    config: MetricsConfig,
    providers: Providers,
}

impl MetricsReporterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: MetricsConfig) -> Self {
        self.config = config;
        self
    }

    pub fn pipeline(mut self, provider: Arc<dyn PipelineMetricsProvider>) -> Self {
        self.providers.pipeline = Some(provider);
        self
    }

    pub fn source(mut self, provider: Arc<dyn SourceMetricsProvider>) -> Self {
        self.providers.sources.push(provider);
        self
    }

    pub fn sources(mut self, providers: Vec<Arc<dyn SourceMetricsProvider>>) -> Self {
        self.providers.sources.extend(providers);
        self
    }

    pub fn drain(mut self, provider: Arc<dyn DrainMetricsProvider>) -> Self {
        self.providers.drains.push(provider);
        self
    }

    pub fn build(self) -> MetricsReporter {
        let formatter: Box<dyn MetricsFormatter> = match self.config.format {
            MetricsFormat::Human => Box::new(HumanFormatter::new()),
            MetricsFormat::Json => Box::new(JsonFormatter::new()),
        };
        MetricsReporter {
            config: self.config,
            formatter,
            providers: self.providers,
            previous: None,
        }
    }
}

pub struct MetricsReporter {
    config: MetricsConfig,
    formatter: Box<dyn MetricsFormatter>,
    providers: Providers,
    previous: Option<CollectedMetrics>,
}

impl MetricsReporter {
    pub fn builder() -> MetricsReporterBuilder {
        MetricsReporterBuilder::new()
    }

    /// Report every interval until `cancel`, then once more for the totals
    pub async fn run(mut self, cancel: CancellationToken) {
        if !self.config.enabled {
            info!("metrics reporting disabled");
            return;
        }

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.reset();

        info!(
            interval = ?self.config.interval,
            format = ?self.config.format,
            "metrics reporter started"
        );

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.report();
                }
            }
        }

        self.report();
        info!("metrics reporter stopped");
    }

    /// Log one report and return the losses it found
    fn report(&mut self) -> Vec<Loss> {
        let current = self.providers.collect();
        let rates = self
            .previous
            .as_ref()
            .and_then(|previous| current.rates(previous));

        for line in self.formatter.format(&current, rates.as_ref()).lines() {
            info!("{line}");
        }

        let losses = losses_since(&current, self.previous.as_ref());
        if self.config.warn_on_loss {
            for loss in &losses {
                warn!(
                    component = %loss.component,
                    count = loss.count,
                    "{}",
                    loss.kind.describe()
                );
            }
        }

        self.previous = Some(current);
        losses
    }
}
