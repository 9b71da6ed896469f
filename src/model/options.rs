use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SimulationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum FlowUnits {
  // Imperial units
  CFS,  // Cubic feet per second
  GPM,  // Gallons per minute
  MGD,  // Million gallons per day
  IMGD, // Imperial million gallons per day
  AFD,  // Acre-feet per day
  // Metric units
  LPS,  // Liters per second
  LPM,  // Liters per minute
  MLD,  // Million liters per day
  CMS,  // Cubic meters per second
  CMH,  // Cubic meters per hour
  CMD   // Cubic meters per day
}

impl FlowUnits {
  /// Factor converting internal flow (cfs) to these units
  pub fn factor(&self) -> f64 {
    match self {
      FlowUnits::CFS => 1.0,
      FlowUnits::GPM => GPMperCFS,
      FlowUnits::MGD => 0.64632,
      FlowUnits::IMGD => 0.5382,
      FlowUnits::AFD => 1.9837,
      FlowUnits::LPS => LperFT3,
      FlowUnits::LPM => 1699.0,
      FlowUnits::MLD => 2.4466,
      FlowUnits::CMS => 0.028317,
      FlowUnits::CMH => 101.94,
      FlowUnits::CMD => 2446.6,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum UnitSystem {
  US, // US Customary units
  SI, // International System of Units (metric)
}

impl UnitSystem {
  /// Factor converting internal lengths (ft) to the user's length units
  pub fn length_factor(&self) -> f64 {
    match self {
      UnitSystem::US => 1.0,
      UnitSystem::SI => MperFT,
    }
  }
}

/// Kind of water quality analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum QualityType {
  None,
  Chemical,
  Age,
  Trace,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QualityOptions {
  pub quality_type: QualityType,
  /// Node traced in a source tracing analysis
  pub trace_node: Option<Box<str>>,
  pub bulk_order: f64,
  pub tank_order: f64,
  pub wall_order: f64,
  /// Limiting potential concentration (0 = no limit)
  pub climit: f64,
  /// Tolerance below which adjacent segments are merged
  pub ctol: f64,
  /// Molecular diffusivity (ft^2/s)
  pub diffusivity: f64,
  /// Kinematic viscosity (ft^2/s)
  pub viscosity: f64,
  /// Conversion divisor for concentration source strengths
  pub quality_ucf: f64,
}

impl Default for QualityOptions {
  fn default() -> Self {
    Self {
      quality_type: QualityType::None,
      trace_node: None,
      bulk_order: 1.0,
      tank_order: 1.0,
      wall_order: 1.0,
      climit: 0.0,
      ctol: CTOL,
      diffusivity: DIFFUSIVITY,
      viscosity: VISCOSITY,
      quality_ucf: 1.0,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnergyOptions {
  /// Global energy price per kWh
  pub price: f64,
  /// Pattern modulating the global energy price
  pub price_pattern: Option<Box<str>>,
  /// Pump efficiency used when a pump has no efficiency curve (%)
  pub efficiency: f64,
  pub specific_gravity: f64,
  /// Head tolerance for pump status checks (ft)
  pub head_tolerance: f64,
  /// Lower bound on the pump headloss gradient
  pub rq_tolerance: f64,
}

impl Default for EnergyOptions {
  fn default() -> Self {
    Self {
      price: 0.0,
      price_pattern: None,
      efficiency: EPUMP,
      specific_gravity: SPGRAV,
      head_tolerance: HTOL,
      rq_tolerance: RQTOL,
    }
  }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationOptions {
  pub flow_units: FlowUnits,
  pub unit_system: UnitSystem,

  // times in seconds
  pub duration: i64,
  pub hydraulic_step: i64,
  pub quality_step: i64,
  pub pattern_step: i64,
  pub pattern_start: i64,
  pub report_step: i64,
  pub report_start: i64,

  pub quality: QualityOptions,
  pub energy: EnergyOptions,
}

/// Default implementation for SimulationOptions
impl Default for SimulationOptions {
  fn default() -> Self {
    Self {
      flow_units: FlowUnits::GPM,
      unit_system: UnitSystem::US,
      duration: 0,
      hydraulic_step: 3600,
      quality_step: 0,
      pattern_step: 3600,
      pattern_start: 0,
      report_step: 3600,
      report_start: 0,
      quality: QualityOptions::default(),
      energy: EnergyOptions::default(),
    }
  }
}

impl SimulationOptions {
  /// Check the options for consistency and fill in derived defaults
  pub fn validate(&mut self) -> Result<()> {
    if self.duration < 0 {
      return Err(invalid("duration", "must not be negative"));
    }
    if self.hydraulic_step <= 0 {
      return Err(invalid("hydraulic_step", "must be positive"));
    }
    if self.pattern_step <= 0 {
      return Err(invalid("pattern_step", "must be positive"));
    }
    if self.report_step <= 0 {
      return Err(invalid("report_step", "must be positive"));
    }
    if self.report_start < 0 || self.pattern_start < 0 {
      return Err(invalid("report_start", "start times must not be negative"));
    }
    if self.quality_step < 0 {
      return Err(invalid("quality_step", "must not be negative"));
    }
    if self.quality_step == 0 {
      self.quality_step = (self.hydraulic_step / 10).max(1);
    }
    // quality steps never exceed the hydraulic step
    self.quality_step = self.quality_step.min(self.hydraulic_step);

    let q = &self.quality;
    if q.ctol < 0.0 || q.ctol.is_nan() {
      return Err(invalid("ctol", "must be a non-negative number"));
    }
    if q.diffusivity < 0.0 || q.viscosity <= 0.0 {
      return Err(invalid("diffusivity", "diffusivity and viscosity must be positive"));
    }
    if q.quality_ucf <= 0.0 {
      return Err(invalid("quality_ucf", "must be positive"));
    }
    if self.energy.specific_gravity <= 0.0 {
      return Err(invalid("specific_gravity", "must be positive"));
    }
    Ok(())
  }

  /// Schmidt number of the diffusing constituent (0 disables mass transfer limits)
  pub fn schmidt_number(&self) -> f64 {
    if self.quality.diffusivity > 0.0 {
      self.quality.viscosity / self.quality.diffusivity
    } else {
      0.0
    }
  }
}

fn invalid(name: &'static str, reason: &str) -> SimulationError {
  SimulationError::InvalidOption { name, reason: reason.to_string() }
}
