use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Clone, Copy, Debug)]
enum Pattern {
    Zeros,
    Constant(i32),
    Ascending(i32),
    Random { min: i32, max: i32 },
    Runs { max_run: usize, max_value: i32 },
}

/// Deterministic value sequences for column tests.
pub struct ValuesFactory {
    len: usize,
    seed: u64,
    pattern: Pattern,
}

impl ValuesFactory {
    pub fn new() -> Self {
        Self {
            len: 1000,
            seed: 42,
            pattern: Pattern::Random {
                min: i32::MIN,
                max: i32::MAX,
            },
        }
    }

    pub fn with_len(mut self, len: usize) -> Self {
        self.len = len;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn zeros(mut self) -> Self {
        self.pattern = Pattern::Zeros;
        self
    }

    pub fn constant(mut self, value: i32) -> Self {
        self.pattern = Pattern::Constant(value);
        self
    }

    pub fn ascending(mut self, start: i32) -> Self {
        self.pattern = Pattern::Ascending(start);
        self
    }

    pub fn random(mut self, min: i32, max: i32) -> Self {
        self.pattern = Pattern::Random { min, max };
        self
    }

    /// Runs of 1..=max_run repeats of values in 0..=max_value.
    pub fn runs(mut self, max_run: usize, max_value: i32) -> Self {
        self.pattern = Pattern::Runs { max_run, max_value };
        self
    }

    pub fn create(self) -> Vec<i32> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        match self.pattern {
            Pattern::Zeros => vec![0; self.len],
            Pattern::Constant(v) => vec![v; self.len],
            Pattern::Ascending(start) => (0..self.len)
                .map(|i| start.wrapping_add(i as i32))
                .collect(),
            Pattern::Random { min, max } => {
                (0..self.len).map(|_| rng.gen_range(min..=max)).collect()
            }
            Pattern::Runs { max_run, max_value } => {
                let mut out = Vec::with_capacity(self.len);
                while out.len() < self.len {
                    let value = rng.gen_range(0..=max_value);
                    let run = rng.gen_range(1..=max_run.max(1)).min(self.len - out.len());
                    out.extend(std::iter::repeat_n(value, run));
                }
                out
            }
        }
    }
}

impl Default for ValuesFactory {
    fn default() -> Self {
        Self::new()
    }
}
