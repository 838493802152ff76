// src/ingest/scheduler.rs
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ingest::types::CandidateSource;
use crate::ingest::Pipeline;

#[derive(Clone, Copy, Debug)]
pub struct MonitorCfg {
    pub interval_secs: u64,
    /// Stop after this many cycles; `None` runs until the process is killed.
    pub max_cycles: Option<u64>,
}

/// Poll `source` every `interval_secs` and report disclosures. A failed poll
/// only affects its own cycle.
pub async fn run_monitor(pipeline: &Pipeline, source: &dyn CandidateSource, cfg: MonitorCfg) -> u64 {
    let mut ticker = tokio::time::interval(Duration::from_secs(cfg.interval_secs.max(1)));
    // A cycle that overruns the interval pushes the schedule back instead of
    // triggering catch-up cycles.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut cycles = 0u64;
    loop {
        ticker.tick().await;
        tracing::info!(target: "ingest", source = source.name(), "checking SEC RSS feed for 8-K filings");

        let events = pipeline.run_once(source).await;
        cycles += 1;

        tracing::info!(
            target: "ingest",
            cycle = cycles,
            disclosures = events.len(),
            "polling cycle finished"
        );
        if cfg.max_cycles.is_some_and(|max| cycles >= max) {
            return cycles;
        }
        tracing::info!(
            target: "ingest",
            interval_secs = cfg.interval_secs,
            "waiting for next polling tick"
        );
    }
}

pub fn spawn_monitor(
    pipeline: Arc<Pipeline>,
    source: Arc<dyn CandidateSource>,
    cfg: MonitorCfg,
) -> JoinHandle<u64> {
    tokio::spawn(async move { run_monitor(&pipeline, source.as_ref(), cfg).await })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WatchConfig;
    use crate::http::{Fetcher, FixtureFetcher};
    use crate::ingest::types::FilingReference;
    use crate::notify::Reporter;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tokio::time::Instant;

    /// Empty source whose first poll overruns the interval.
    struct SlowFirstPoll {
        overrun: Duration,
        starts: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl CandidateSource for SlowFirstPoll {
        async fn produce_candidates(&self, _fetcher: &dyn Fetcher) -> Vec<FilingReference> {
            let first = {
                let mut g = self.starts.lock().unwrap();
                g.push(Instant::now());
                g.len() == 1
            };
            if first {
                tokio::time::sleep(self.overrun).await;
            }
            Vec::new()
        }

        fn name(&self) -> &'static str {
            "slow-first"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn overrun_cycle_does_not_trigger_catch_up_polls() {
        let pipeline = Pipeline::new(
            Arc::new(FixtureFetcher::new()),
            &WatchConfig::default(),
            Reporter::default(),
        );
        let source = SlowFirstPoll {
            overrun: Duration::from_millis(2_500),
            starts: Mutex::new(Vec::new()),
        };
        let cfg = MonitorCfg {
            interval_secs: 1,
            max_cycles: Some(4),
        };

        assert_eq!(run_monitor(&pipeline, &source, cfg).await, 4);

        let starts = source.starts.lock().unwrap().clone();
        assert_eq!(starts.len(), 4);
        for pair in starts[1..].windows(2) {
            assert!(pair[1] - pair[0] >= Duration::from_secs(1));
        }
    }
}
