// blasterctl Metrics - Prometheus collector for running instances
//
// One scrape walks the instance store, fans out one task per running
// instance and turns the typed socket responses into metric families.

pub mod collector;
pub mod error;
mod families;

pub use collector::InstanceCollector;
pub use error::{MetricsError, MetricsResult};
