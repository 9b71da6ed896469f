use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ValveType {
  PRV, // Pressure Reducing Valve
  PSV, // Pressure Sustaining Valve
  PBV, // Pressure Breaker Valve
  FCV, // Flow Control Valve
  TCV, // Throttle Control Valve
  PCV, // Positional Control Valve
  GPV, // General Purpose Valve
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Valve {
  pub diameter: f64,  // ft
  pub setting: f64,
  pub curve: Option<Box<str>>,
  pub valve_type: ValveType,
  #[serde(default)]
  pub minor_loss: f64,
}

impl Valve {
  pub fn new(valve_type: ValveType, diameter: f64, setting: f64) -> Self {
    Self { diameter, setting, curve: None, valve_type, minor_loss: 0.0 }
  }
}
