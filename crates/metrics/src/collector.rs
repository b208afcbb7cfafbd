// Prometheus collector over all instances of a repository
//
// Every scrape: enumerate instances, count them, and for each running one
// spawn a worker that reads its running config and queries the requested
// metric families. The workers are joined before the scrape returns. A failing
// family or instance only results in missing samples.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{CounterVec, GaugeVec, Opts, Registry};
use tokio::runtime::Handle;
use tracing::{debug, warn, Span};

use blasterctl_core::domain::{MetricFlag, SocketCommand};
use blasterctl_core::port::InstanceRepository;

use crate::error::{MetricsError, MetricsResult};
use crate::families::{
    self, Kind, MetricDef, Sample, LABEL_HOSTNAME, METRIC_INSTANCES_RUNNING,
    METRIC_INSTANCES_TOTAL,
};

/// Collector exposing instance counts and per-instance measurements
pub struct InstanceCollector {
    repository: Arc<dyn InstanceRepository>,
    runtime: Handle,
    span: Span,
    hostname: String,
    catalog: Vec<MetricDef>,
    descs: Vec<Desc>,
}

impl InstanceCollector {
    /// Workers are spawned on `runtime`; events use `span` as parent
    pub fn new(
        repository: Arc<dyn InstanceRepository>,
        runtime: Handle,
        span: Span,
    ) -> MetricsResult<Self> {
        let hostname = system_hostname(&span);
        Self::with_hostname(repository, runtime, span, hostname)
    }

    /// Same as `new` with an explicit value for the constant `hostname` label
    pub fn with_hostname(
        repository: Arc<dyn InstanceRepository>,
        runtime: Handle,
        span: Span,
        hostname: impl Into<String>,
    ) -> MetricsResult<Self> {
        let hostname = hostname.into();
        let catalog = families::catalog();
        let descs = catalog
            .iter()
            .map(|def| {
                Desc::new(
                    def.name.clone(),
                    def.help.clone(),
                    def.labels.iter().map(|l| l.to_string()).collect(),
                    HashMap::from([(LABEL_HOSTNAME.to_string(), hostname.clone())]),
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            repository,
            runtime,
            span,
            hostname,
            catalog,
            descs,
        })
    }

    /// Register into an injected registry
    pub fn register(self, registry: &Registry) -> MetricsResult<()> {
        registry.register(Box::new(self))?;
        Ok(())
    }

    /// Run one scrape and return the metric families
    pub async fn scrape(&self) -> Vec<MetricFamily> {
        let mut total = 0usize;
        let mut workers = Vec::new();
        for name in self.repository.instances() {
            total += 1;
            if self.repository.running(&name) {
                let repository = Arc::clone(&self.repository);
                let span = self.span.clone();
                workers.push(
                    self.runtime
                        .spawn(collect_instance(repository, name, span)),
                );
            }
        }
        let running = workers.len();

        let mut samples = Vec::new();
        for joined in join_all(workers).await {
            match joined {
                Ok(instance_samples) => samples.extend(instance_samples),
                Err(e) => warn!(parent: &self.span, error = %e, "Instance worker aborted"),
            }
        }
        debug!(parent: &self.span, total, running, samples = samples.len(), "Scrape finished");

        samples.push(Sample {
            name: METRIC_INSTANCES_TOTAL.to_string(),
            labels: Vec::new(),
            value: total as f64,
        });
        samples.push(Sample {
            name: METRIC_INSTANCES_RUNNING.to_string(),
            labels: Vec::new(),
            value: running as f64,
        });
        self.families(samples)
    }

    fn families(&self, samples: Vec<Sample>) -> Vec<MetricFamily> {
        let mut by_name: HashMap<String, Vec<Sample>> = HashMap::new();
        for sample in samples {
            by_name.entry(sample.name.clone()).or_default().push(sample);
        }

        let mut families = Vec::new();
        for def in &self.catalog {
            let Some(samples) = by_name.remove(&def.name) else {
                continue;
            };
            match self.family(def, &samples) {
                Ok(family) => families.extend(family),
                Err(e) => warn!(parent: &self.span, metric = %def.name, error = %e, "Dropping metric"),
            }
        }
        families
    }

    fn family(&self, def: &MetricDef, samples: &[Sample]) -> prometheus::Result<Vec<MetricFamily>> {
        let opts = Opts::new(def.name.clone(), def.help.clone())
            .const_label(LABEL_HOSTNAME.to_string(), self.hostname.clone());
        match def.kind {
            Kind::Gauge => {
                let vec = GaugeVec::new(opts, def.labels)?;
                for sample in samples {
                    vec.with_label_values(&label_refs(sample)).set(sample.value);
                }
                Ok(vec.collect())
            }
            Kind::Counter => {
                let vec = CounterVec::new(opts, def.labels)?;
                for sample in samples {
                    // Counters cannot go negative
                    vec.with_label_values(&label_refs(sample))
                        .inc_by(sample.value.max(0.0));
                }
                Ok(vec.collect())
            }
        }
    }
}

impl Collector for InstanceCollector {
    fn desc(&self) -> Vec<&Desc> {
        self.descs.iter().collect()
    }

    /// Blocks until all instance workers finished; call it off the async
    /// runtime (for example via `spawn_blocking`).
    fn collect(&self) -> Vec<MetricFamily> {
        futures::executor::block_on(self.scrape())
    }
}

fn label_refs(sample: &Sample) -> Vec<&str> {
    sample.labels.iter().map(String::as_str).collect()
}

/// Worker of one running instance
async fn collect_instance(
    repository: Arc<dyn InstanceRepository>,
    instance: String,
    span: Span,
) -> Vec<Sample> {
    let config = match repository.running_config(&instance).await {
        Ok(Some(config)) => config,
        Ok(None) => {
            debug!(parent: &span, instance = %instance, "No running config, skipping");
            return Vec::new();
        }
        Err(e) => {
            warn!(parent: &span, instance = %instance, error = %e, "Failed to read running config");
            return Vec::new();
        }
    };

    let mut samples = Vec::new();
    for flag in &config.metric_flags {
        let flag = match flag.parse::<MetricFlag>() {
            Ok(flag) => flag,
            Err(e) => {
                warn!(parent: &span, instance = %instance, error = %e, "Ignoring metric flag");
                continue;
            }
        };
        match collect_family(repository.as_ref(), &instance, flag).await {
            Ok(family) => samples.extend(family),
            Err(e) => warn!(parent: &span, instance = %instance, flag = %flag, error = %e, "Skipping metric family"),
        }
    }
    samples
}

async fn collect_family(
    repository: &dyn InstanceRepository,
    instance: &str,
    flag: MetricFlag,
) -> MetricsResult<Vec<Sample>> {
    let command = flag.command();
    let body = repository
        .command(instance, &SocketCommand::new(command))
        .await
        .map_err(|source| MetricsError::Command {
            instance: instance.to_string(),
            command,
            source,
        })?;
    families::decode(flag, instance, &body).map_err(|source| MetricsError::Decode {
        instance: instance.to_string(),
        command,
        source,
    })
}

#[cfg(unix)]
fn system_hostname(span: &Span) -> String {
    match nix::unistd::gethostname() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(e) => {
            warn!(parent: span, error = %e, "Hostname unavailable");
            "unknown".to_string()
        }
    }
}

#[cfg(not(unix))]
fn system_hostname(_span: &Span) -> String {
    "unknown".to_string()
}
