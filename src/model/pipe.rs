use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Eq, PartialEq, Deserialize, Serialize)]
pub enum PipeStatus {
  Open,
  Closed,
  CheckValve
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pipe {
  pub diameter: f64,   // ft
  pub length: f64,     // ft
  pub roughness: f64,
  #[serde(default)]
  pub minor_loss: f64,
  pub status: PipeStatus,
}

impl Pipe {
  pub fn new(length: f64, diameter: f64, roughness: f64) -> Self {
    Self { diameter, length, roughness, minor_loss: 0.0, status: PipeStatus::Open }
  }
}
