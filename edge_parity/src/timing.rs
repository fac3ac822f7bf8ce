use std::time::{Duration, Instant};

/// A value together with the monotonic wall time it took to produce.
#[derive(Debug, Clone)]
pub struct Timed<T> {
    pub value: T,
    pub elapsed: Duration,
}

impl<T> Timed<T> {
    pub fn run<F: FnOnce() -> T>(f: F) -> Timed<T> {
        let start = Instant::now();
        let value = f();
        Timed {
            value,
            elapsed: start.elapsed(),
        }
    }
}

impl<T, E> Timed<Result<T, E>> {
    /// Moves the error out so callers can use `?` and keep the timing.
    pub fn transpose(self) -> Result<Timed<T>, E> {
        let elapsed = self.elapsed;
        self.value.map(|value| Timed { value, elapsed })
    }
}

/// Sequential time relative to parallel time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speedup {
    pub sequential: Duration,
    pub parallel: Duration,
}

impl Speedup {
    pub fn new(sequential: Duration, parallel: Duration) -> Self {
        Self {
            sequential,
            parallel,
        }
    }

    /// `sequential / parallel`; values above 1 mean the parallel engine is faster.
    /// Returns None when the parallel time is too small to measure.
    pub fn ratio(&self) -> Option<f64> {
        let parallel = self.parallel.as_secs_f64();
        (parallel > 0.0).then(|| self.sequential.as_secs_f64() / parallel)
    }
}

impl std::fmt::Display for Speedup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.ratio() {
            Some(ratio) => write!(f, "{:.3}x", ratio),
            None => write!(f, "n/a"),
        }
    }
}
