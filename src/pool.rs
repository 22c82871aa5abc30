use std::{
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, Mutex,
    },
    time::{Duration, Instant},
};

use console::style;
use separator::Separatable;
use tracing::{debug, error, info};

use crate::{
    error::{Error, Result},
    keypair::KeypairSource,
    pattern::PatternSet,
    progress::{ProgressCounter, Tick},
    sink::{MatchRecord, ResultSink},
};

/// Cancellation token shared between the pool and whoever wants it stopped.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub attempts: u64,
    pub matches: u64,
    /// Progress lines emitted, one per `print_every` boundary.
    pub reports: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Attempts per second over the whole run.
    pub fn rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.attempts as f64 / secs
        } else {
            0.0
        }
    }
}

pub struct WorkerPool {
    threads: usize,
    pattern: PatternSet,
    counter: ProgressCounter,
    sink: ResultSink,
    max_attempts: Option<u64>,
    duration: Option<Duration>,
    stop: StopSignal,
}

impl WorkerPool {
    pub fn new(
        threads: usize,
        pattern: PatternSet,
        counter: ProgressCounter,
        sink: ResultSink,
    ) -> Result<Self> {
        if threads == 0 {
            return Err(Error::invalid("threads", "at least one worker is required"));
        }
        Ok(Self {
            threads,
            pattern,
            counter,
            sink,
            max_attempts: None,
            duration: None,
            stop: StopSignal::new(),
        })
    }

    /// Stop once this many attempts have been counted. Workers already past
    /// the stop check finish their iteration, so the final count may exceed
    /// the bound by at most `threads - 1`.
    pub fn with_max_attempts(mut self, max_attempts: Option<u64>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_duration(mut self, duration: Option<Duration>) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    pub fn counter(&self) -> &ProgressCounter {
        &self.counter
    }

    /// Runs every worker until the stop signal is raised, a bound is hit, or a
    /// worker fails. The first fatal error is returned after all workers exit.
    pub fn run<S: KeypairSource>(&self, source: &S) -> Result<RunSummary> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.threads)
            .thread_name(|i| format!("tailcrunch-worker-{}", i))
            .build()?;

        let start = Instant::now();
        let deadline = self.duration.map(|d| start + d);
        let matches = AtomicU64::new(0);
        let reports = AtomicU64::new(0);
        let failure: Mutex<Option<Error>> = Mutex::new(None);

        info!(
            threads = self.threads,
            pattern = %self.pattern,
            output = %self.sink.path().display(),
            "starting workers"
        );

        pool.scope(|s| {
            for id in 0..self.threads {
                let matches = &matches;
                let reports = &reports;
                let failure = &failure;
                s.spawn(move |_| {
                    if let Err(e) = self.work(id, source, matches, reports, start, deadline) {
                        error!(worker = id, error = %e, "worker halted");
                        self.stop.stop();
                        let mut slot = failure.lock().unwrap_or_else(|p| p.into_inner());
                        slot.get_or_insert(e);
                    }
                });
            }
        });

        let summary = RunSummary {
            attempts: self.counter.total(),
            matches: matches.load(Ordering::Relaxed),
            reports: reports.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        };

        match failure.into_inner().unwrap_or_else(|p| p.into_inner()) {
            Some(e) => Err(e),
            None => {
                info!(
                    attempts = summary.attempts,
                    matches = summary.matches,
                    "workers stopped"
                );
                Ok(summary)
            }
        }
    }

    fn work<S: KeypairSource>(
        &self,
        id: usize,
        source: &S,
        matches: &AtomicU64,
        reports: &AtomicU64,
        start: Instant,
        deadline: Option<Instant>,
    ) -> Result<()> {
        debug!(worker = id, "worker started");

        while !self.stop.is_stopped() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                self.stop.stop();
                break;
            }

            let keypair = source.generate()?;
            if self.pattern.matches(&keypair.address) {
                let record = MatchRecord::new(keypair);
                // persist before announcing; a failure here must halt the run
                self.sink.record(&record)?;
                matches.fetch_add(1, Ordering::Relaxed);
                println!(
                    "{}: Address = {}, PrivateKey = {}",
                    style("Matched Wallet").green().bold(),
                    record.address(),
                    record.private_key()
                );
            }

            let Tick { total, report } = self.counter.tick();
            if report {
                reports.fetch_add(1, Ordering::Relaxed);
                let rate = total as f64 / start.elapsed().as_secs_f64().max(f64::EPSILON);
                println!(
                    "Generated {} wallets ({}/s)",
                    total.separated_string(),
                    (rate as u64).separated_string()
                );
            }
            if self.max_attempts.is_some_and(|max| total >= max) {
                self.stop.stop();
            }
        }

        debug!(worker = id, "worker exiting");
        Ok(())
    }
}
