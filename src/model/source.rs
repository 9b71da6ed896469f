use serde::{Deserialize, Serialize};

/// Water quality source types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum SourceType {
  /// Fixed concentration of any external inflow
  Concentration,
  /// Fixed mass inflow rate (mass/min)
  Mass,
  /// Fixed concentration of all flow leaving the node
  Setpoint,
  /// Fixed concentration added to all flow leaving the node
  FlowPaced,
}

/// Water quality source placed at a node
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Source {
  pub source_type: SourceType,
  /// Base source strength
  pub strength: f64,
  /// Time pattern of the source strength
  pub pattern: Option<Box<str>>,
}

impl Source {
  pub fn new(source_type: SourceType, strength: f64) -> Self {
    Self { source_type, strength, pattern: None }
  }

  pub fn with_pattern(mut self, pattern: &str) -> Self {
    self.pattern = Some(pattern.into());
    self
  }
}
