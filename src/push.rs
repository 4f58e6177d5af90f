//! Pushgateway delivery
//!
//! Pushing is best effort. Callers get a [`PushError`] back but the
//! [`Ingestor`](crate::Ingestor) only logs it.

use crate::error::PushError;
use prometheus::proto::MetricFamily;
use reqwest::Url;
use std::collections::HashMap;

/// Job name every push is grouped under.
pub const JOB_NAME: &str = "battery-monitor";

/// Destination for full-registry pushes.
pub trait Pusher: Send + Sync {
    /// Replace everything stored for this pusher's job with `families`.
    fn push(&self, families: Vec<MetricFamily>) -> Result<(), PushError>;

    /// Human-readable destination, used in logs.
    fn target(&self) -> &str;
}

/// Prometheus Pushgateway reached over HTTP.
///
/// Only constructed from an address that forms a valid push URL, so
/// [`push`](Pusher::push) never hits the client's URL parsing with bad input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushGateway {
    address: String,
    job: String,
    url: Url,
}

impl PushGateway {
    /// Gateway at `address` (`host:port`, scheme optional).
    pub fn new(address: impl Into<String>, job: impl Into<String>) -> Result<Self, PushError> {
        let address = address.into();
        let job = job.into();
        let url = push_url(&address, &job)?;
        Ok(Self { address, job, url })
    }

    /// Gateway for [`JOB_NAME`], or `None` when `address` is blank.
    pub fn from_address(address: &str) -> Result<Option<Self>, PushError> {
        let address = address.trim();
        if address.is_empty() {
            return Ok(None);
        }
        Self::new(address, JOB_NAME).map(Some)
    }

    /// Job this gateway pushes under.
    pub fn job(&self) -> &str {
        &self.job
    }

    /// Full URL pushes are sent to.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Same URL the prometheus client builds: `http://` added when no scheme
/// is given, then `/metrics/job/<job>`.
fn push_url(address: &str, job: &str) -> Result<Url, PushError> {
    let invalid = |message: String| PushError::InvalidAddress {
        address: address.to_string(),
        message,
    };

    if job.contains('/') {
        return Err(invalid(format!("job name {:?} contains '/'", job)));
    }

    let mut base = if address.contains("://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };
    if base.ends_with('/') {
        base.pop();
    }

    let url = Url::parse(&format!("{}/metrics/job/{}", base, job))
        .map_err(|e| invalid(e.to_string()))?;
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

impl Pusher for PushGateway {
    fn push(&self, families: Vec<MetricFamily>) -> Result<(), PushError> {
        prometheus::push_metrics(&self.job, HashMap::new(), &self.address, families, None).map_err(
            |e| PushError::Delivery {
                target: self.address.clone(),
                message: e.to_string(),
            },
        )
    }

    fn target(&self) -> &str {
        &self.address
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_address_disables_push() {
        assert_eq!(PushGateway::from_address(""), Ok(None));
        assert_eq!(PushGateway::from_address("   "), Ok(None));
    }

    #[test]
    fn test_from_address_uses_fixed_job() {
        let gateway = PushGateway::from_address(" localhost:9091 ").unwrap().unwrap();
        assert_eq!(gateway.target(), "localhost:9091");
        assert_eq!(gateway.job(), JOB_NAME);
        assert_eq!(
            gateway.url().as_str(),
            "http://localhost:9091/metrics/job/battery-monitor"
        );
    }

    #[test]
    fn test_explicit_scheme_kept() {
        let gateway = PushGateway::new("https://push.example.com/", JOB_NAME).unwrap();
        assert_eq!(
            gateway.url().as_str(),
            "https://push.example.com/metrics/job/battery-monitor"
        );
    }

    #[test]
    fn test_invalid_address_rejected() {
        for address in ["bad host:9091", "localhost:99999", "[::1"] {
            let result = PushGateway::from_address(address);
            assert!(
                matches!(result, Err(PushError::InvalidAddress { .. })),
                "{:?} -> {:?}",
                address,
                result
            );
        }
    }

    #[test]
    fn test_job_with_slash_rejected() {
        let result = PushGateway::new("localhost:9091", "a/b");
        assert!(matches!(result, Err(PushError::InvalidAddress { .. })));
    }

    #[test]
    fn test_unreachable_gateway_reports_error() {
        // Port 1 on loopback refuses connections
        let gateway = PushGateway::new("127.0.0.1:1", JOB_NAME).unwrap();
        let result = gateway.push(Vec::new());
        assert!(matches!(result, Err(PushError::Delivery { .. })));
    }
}
