use std::fmt;
use std::str::FromStr;

use crate::engine::errors::ColumnError;

/// Policy applied when several encoders are applicable to a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OptimizationTarget {
    #[default]
    SmallerSize,
    FasterDecode,
}

impl FromStr for OptimizationTarget {
    type Err = ColumnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "smaller" | "smaller_size" | "size" => Ok(OptimizationTarget::SmallerSize),
            "faster" | "faster_decode" | "speed" => Ok(OptimizationTarget::FasterDecode),
            other => Err(ColumnError::State(format!(
                "unknown optimization target '{other}'"
            ))),
        }
    }
}

impl fmt::Display for OptimizationTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptimizationTarget::SmallerSize => f.write_str("smaller_size"),
            OptimizationTarget::FasterDecode => f.write_str("faster_decode"),
        }
    }
}

/// Single-pass statistics over one chunk of values. Runs are repetitions of
/// the same value three or more times in a row.
#[derive(Clone, Debug)]
pub struct IntFormMetrics {
    target: OptimizationTarget,
    min_value: i32,
    max_value: i32,
    num_run_values: usize,
    num_distinct_runs: usize,
    longest_run: usize,
    current_run: usize,
    previous_value: i32,
    num_values: usize,
}

impl IntFormMetrics {
    pub fn new(target: OptimizationTarget) -> Self {
        Self {
            target,
            min_value: i32::MAX,
            max_value: i32::MIN,
            num_run_values: 0,
            num_distinct_runs: 0,
            longest_run: 0,
            current_run: 0,
            previous_value: 0,
            num_values: 0,
        }
    }

    #[inline]
    pub fn process_next_row(&mut self, val: i32) {
        if self.num_values > 0 && val == self.previous_value {
            self.current_run += 1;
            match self.current_run {
                3 => {
                    self.num_distinct_runs += 1;
                    self.num_run_values += 3;
                }
                n if n > 3 => self.num_run_values += 1,
                _ => {}
            }
        } else {
            self.previous_value = val;
            self.current_run = 1;
        }

        if self.current_run > self.longest_run {
            self.longest_run = self.current_run;
        }
        if val < self.min_value {
            self.min_value = val;
        }
        if val > self.max_value {
            self.max_value = val;
        }
        self.num_values += 1;
    }

    /// Clears all statistics so the accumulator can observe the next chunk.
    pub fn reset(&mut self) {
        *self = Self::new(self.target);
    }

    pub fn optimization_target(&self) -> OptimizationTarget {
        self.target
    }

    pub fn num_values(&self) -> usize {
        self.num_values
    }

    pub fn min_value(&self) -> i32 {
        self.min_value
    }

    pub fn max_value(&self) -> i32 {
        self.max_value
    }

    /// Values that belong to a run of length three or more.
    pub fn num_run_values(&self) -> usize {
        self.num_run_values
    }

    pub fn num_distinct_runs(&self) -> usize {
        self.num_distinct_runs
    }

    pub fn longest_run(&self) -> usize {
        self.longest_run
    }

    pub fn is_constant(&self) -> bool {
        self.num_values > 0 && self.min_value == self.max_value
    }

    pub fn is_zero(&self) -> bool {
        self.is_constant() && self.min_value == 0
    }
}
