//! # battery-monitor
//!
//! Turns battery-status reports from browser clients into Prometheus gauges.
//!
//! Each report is keyed by the client's hostname and overwrites the
//! previous values for that host. After every accepted report the whole
//! registry can optionally be pushed to a Pushgateway.
//!
//! ## Quick Start
//!
//! ```rust
//! use battery_monitor::{BatteryMetrics, Ingestor};
//! use prometheus::Registry;
//! use std::sync::Arc;
//!
//! let registry = Registry::new();
//! let metrics = BatteryMetrics::register(&registry).unwrap();
//! let ingestor = Ingestor::new(Arc::new(metrics), None);
//!
//! let body = br#"{"hostname":"h1","charging":true,"chargingTime":120,"dischargingTime":0,"level":85,"tabCount":7}"#;
//! ingestor.submit(body).unwrap();
//!
//! let status = ingestor.status().unwrap();
//! assert!(status.contains(r#"level{instance="h1"} 85"#));
//! ```
//!
//! ## Modules
//!
//! - [`record`]: Wire format of a status report
//! - [`metrics`]: Per-instance gauges and the [`MetricStore`] seam
//! - [`push`]: Pushgateway delivery
//! - [`ingestor`]: Decode, record, push
//! - [`error`]: Error types

pub mod error;
pub mod ingestor;
pub mod metrics;
pub mod push;
pub mod record;

pub use error::{DecodeError, IngestError, MetricsError, PushError, Result};
pub use ingestor::Ingestor;
pub use metrics::{BatteryMetrics, MetricStore, INSTANCE_LABEL};
pub use push::{PushGateway, Pusher, JOB_NAME};
pub use record::{Readings, StatusRecord};

/// Port the exporter listens on unless told otherwise
pub const DEFAULT_PORT: u16 = 7088;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
