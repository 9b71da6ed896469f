use serde::{Deserialize, Serialize};

/// Time pattern of multipliers, applied cyclically
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pattern {
  pub id: Box<str>,
  pub multipliers: Vec<f64>,
}

impl Pattern {
  pub fn new(id: &str, multipliers: Vec<f64>) -> Self {
    Self { id: id.into(), multipliers }
  }

  /// Multiplier for a pattern period, wrapping around the end of the pattern
  pub fn factor(&self, period: i64) -> f64 {
    if self.multipliers.is_empty() {
      return 1.0;
    }
    let k = period.rem_euclid(self.multipliers.len() as i64) as usize;
    self.multipliers[k]
  }
}

/// Pattern period that contains `time`
pub fn pattern_period(time: i64, pattern_start: i64, pattern_step: i64) -> i64 {
  if pattern_step <= 0 {
    return 0;
  }
  (time + pattern_start) / pattern_step
}
