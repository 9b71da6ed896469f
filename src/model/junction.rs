use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Junction {
  /// Base demand (cfs)
  pub basedemand: f64,
  /// Demand pattern
  pub pattern: Option<Box<str>>,
}
