// src/probe/mod.rs
pub mod tcp;

use async_trait::async_trait;
use log::{debug, error, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::models::server::{Latency, ServerRecord};
use crate::utils::{port_of, strip_port};

pub use tcp::TcpProbe;

pub const DEFAULT_CONCURRENCY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeTarget {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    Timeout(Duration),
    Unreachable(String),
    Resolve(String),
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout(after) => write!(f, "timed out after {} ms", after.as_millis()),
            Self::Unreachable(e) => write!(f, "unreachable: {}", e),
            Self::Resolve(e) => write!(f, "could not resolve: {}", e),
        }
    }
}

impl std::error::Error for ProbeError {}

pub type ProbeOutcome = Result<Duration, ProbeError>;

#[async_trait]
pub trait Probe: Send + Sync + 'static {
    async fn probe(&self, target: &ProbeTarget) -> ProbeOutcome;
}

/// Probe targets in row order, one per record.
pub fn probe_targets(records: &[ServerRecord], default_port: u16) -> Vec<ProbeTarget> {
    records
        .iter()
        .map(|r| ProbeTarget {
            host: strip_port(&r.host).to_string(),
            port: port_of(&r.host).unwrap_or(default_port),
        })
        .collect()
}

pub struct LatencyProber<P> {
    probe: Arc<P>,
    concurrency: usize,
}

impl<P: Probe> LatencyProber<P> {
    pub fn new(probe: P, concurrency: usize) -> Self {
        Self {
            probe: Arc::new(probe),
            concurrency: concurrency.max(1),
        }
    }

    /// Probes every distinct host, at most `concurrency` at a time, and waits
    /// for all of them. Results keep the order hosts first appear in.
    pub async fn probe_all(&self, targets: &[ProbeTarget]) -> Vec<(String, ProbeOutcome)> {
        let mut unique: Vec<ProbeTarget> = Vec::new();
        for target in targets {
            if !unique.iter().any(|t| t.host == target.host) {
                unique.push(target.clone());
            }
        }

        let permits = Arc::new(Semaphore::new(self.concurrency));
        let mut tasks = JoinSet::new();
        for (index, target) in unique.into_iter().enumerate() {
            let permits = permits.clone();
            let probe = self.probe.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await.ok();
                let outcome = probe.probe(&target).await;
                (index, target.host, outcome)
            });
        }

        let mut results = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => error!("Probe task failed: {}", e),
            }
        }
        results.sort_by_key(|(index, _, _)| *index);

        results
            .into_iter()
            .map(|(_, host, outcome)| {
                match &outcome {
                    Ok(rtt) => debug!("{} answered in {} ms", host, rtt.as_millis()),
                    Err(e) => debug!("{} {}", host, e),
                }
                (host, outcome)
            })
            .collect()
    }
}

/// Sets every record's latency. With `measure` off nothing is probed and
/// all records get the sentinel.
pub async fn append_latency<P: Probe>(
    records: &mut [ServerRecord],
    measure: bool,
    prober: &LatencyProber<P>,
    default_port: u16,
) {
    if !measure {
        for record in records.iter_mut() {
            record.latency = Latency::Sentinel;
        }
        return;
    }

    let targets = probe_targets(records, default_port);
    let results = prober.probe_all(&targets).await;

    let mut reached = 0;
    for (record, target) in records.iter_mut().zip(&targets) {
        record.latency = match results.iter().find(|(host, _)| *host == target.host) {
            Some((_, Ok(rtt))) => {
                reached += 1;
                Latency::Measured(u32::try_from(rtt.as_millis()).unwrap_or(u32::MAX))
            }
            Some((_, Err(e))) => Latency::Unreachable(e.to_string()),
            None => Latency::Unreachable("no probe result".to_string()),
        };
    }
    info!("Measured latency for {} of {} servers", reached, records.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn record(host: &str) -> ServerRecord {
        ServerRecord::new(0, 16, false, host.to_string(), "n".into(), "t".into())
    }

    #[derive(Default)]
    struct CountingProbe {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Probe for CountingProbe {
        async fn probe(&self, _target: &ProbeTarget) -> ProbeOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Duration::from_millis(1))
        }
    }

    struct ScriptedProbe(HashMap<&'static str, ProbeOutcome>);

    #[async_trait]
    impl Probe for ScriptedProbe {
        async fn probe(&self, target: &ProbeTarget) -> ProbeOutcome {
            self.0
                .get(target.host.as_str())
                .cloned()
                .unwrap_or_else(|| Err(ProbeError::Unreachable("unknown".into())))
        }
    }

    struct PanickingProbe;

    #[async_trait]
    impl Probe for PanickingProbe {
        async fn probe(&self, target: &ProbeTarget) -> ProbeOutcome {
            if target.host == "bad" {
                panic!("probe blew up");
            }
            Ok(Duration::from_millis(7))
        }
    }

    #[test]
    fn targets_strip_ports_in_row_order() {
        let records = vec![record("1.2.3.4:12000"), record("ror.example.org"), record("1.2.3.4:12001")];
        let targets = probe_targets(&records, 12000);
        let hosts: Vec<&str> = targets.iter().map(|t| t.host.as_str()).collect();
        assert_eq!(hosts, vec!["1.2.3.4", "ror.example.org", "1.2.3.4"]);
        assert_eq!(targets[1].port, 12000);
        assert_eq!(targets[2].port, 12001);
    }

    #[tokio::test]
    async fn measure_off_never_probes() {
        let probe = CountingProbe::default();
        let calls = probe.calls.clone();
        let prober = LatencyProber::new(probe, DEFAULT_CONCURRENCY);
        let mut records = vec![record("1.1.1.1:12000"), record("2.2.2.2:12000")];
        records[0].latency = Latency::Measured(3);

        append_latency(&mut records, false, &prober, 12000).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(records.iter().all(|r| r.latency == Latency::Sentinel));
        assert!(records.iter().all(|r| r.latency.millis() == 9999));
    }

    #[tokio::test]
    async fn matches_results_back_by_host() {
        let script = HashMap::from([
            ("10.0.0.1", Ok(Duration::from_millis(15))),
            ("10.0.0.2", Err(ProbeError::Timeout(Duration::from_millis(500)))),
            ("10.0.0.3", Ok(Duration::from_millis(42))),
        ]);
        let prober = LatencyProber::new(ScriptedProbe(script), DEFAULT_CONCURRENCY);
        let mut records = vec![
            record("10.0.0.3:12000"),
            record("10.0.0.1:12000"),
            record("10.0.0.2:12000"),
            record("10.0.0.1:12001"),
        ];

        append_latency(&mut records, true, &prober, 12000).await;

        let hosts: Vec<&str> = records.iter().map(|r| r.host.as_str()).collect();
        assert_eq!(hosts, vec!["10.0.0.3:12000", "10.0.0.1:12000", "10.0.0.2:12000", "10.0.0.1:12001"]);
        assert_eq!(records[0].latency, Latency::Measured(42));
        assert_eq!(records[1].latency, Latency::Measured(15));
        assert_eq!(records[2].latency, Latency::Unreachable("timed out after 500 ms".into()));
        assert_eq!(records[3].latency, Latency::Measured(15));
    }

    #[tokio::test]
    async fn duplicate_hosts_are_probed_once() {
        let probe = CountingProbe::default();
        let calls = probe.calls.clone();
        let prober = LatencyProber::new(probe, 4);
        let targets = probe_targets(
            &[record("1.1.1.1:12000"), record("1.1.1.1:12001"), record("2.2.2.2:12000")],
            12000,
        );

        let results = prober.probe_all(&targets).await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        let hosts: Vec<&str> = results.iter().map(|(h, _)| h.as_str()).collect();
        assert_eq!(hosts, vec!["1.1.1.1", "2.2.2.2"]);
    }

    struct SlowProbe {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl Probe for SlowProbe {
        async fn probe(&self, _target: &ProbeTarget) -> ProbeOutcome {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Duration::from_millis(20))
        }
    }

    #[tokio::test]
    async fn concurrency_is_bounded_and_all_hosts_finish() {
        let prober = LatencyProber::new(
            SlowProbe {
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            },
            3,
        );
        let targets: Vec<ProbeTarget> = (0..10)
            .map(|i| ProbeTarget {
                host: format!("10.0.0.{}", i),
                port: 12000,
            })
            .collect();

        let results = prober.probe_all(&targets).await;

        assert_eq!(results.len(), 10);
        assert!(results.iter().all(|(_, r)| r.is_ok()));
        let peak = prober.probe.peak.load(Ordering::SeqCst);
        assert!(peak <= 3, "peak concurrency was {}", peak);
    }

    #[tokio::test]
    async fn failed_probe_task_leaves_a_failure_value() {
        let prober = LatencyProber::new(PanickingProbe, 2);
        let mut records = vec![record("good:12000"), record("bad:12000")];

        append_latency(&mut records, true, &prober, 12000).await;

        assert_eq!(records[0].latency, Latency::Measured(7));
        assert_eq!(records[1].latency, Latency::Unreachable("no probe result".into()));
    }
}
