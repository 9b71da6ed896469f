use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::model::curve::Curve;

/// Tank mixing models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum MixModel {
  /// Complete and instantaneous mixing
  #[default]
  CompleteMix,
  /// Mixing zone plus a stagnant ambient zone
  TwoCompartment,
  /// Plug flow, first in first out
  Fifo,
  /// Stacked plug flow, last in first out
  Lifo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Tank {
  pub initial_level: f64,    // initial level of the tank (ft)
  pub min_level: f64,        // minimum level of the tank (ft)
  pub max_level: f64,        // maximum level of the tank (ft)
  pub diameter: f64,         // nominal diameter of the tank (ft)
  pub min_volume: f64,       // minimum volume of the tank (ft^3)
  pub volume_curve_id: Option<Box<str>>, // id of the volume curve
  #[serde(default)]
  pub mix_model: MixModel,
  /// Mixing zone size as a fraction of the maximum volume (two-compartment model)
  #[serde(default = "default_mix_fraction")]
  pub mix_fraction: f64,
  /// Bulk reaction coefficient (1/s)
  #[serde(default)]
  pub bulk_coeff: f64,
}

fn default_mix_fraction() -> f64 {
  1.0
}

/// Tank dimensions derived from the tank properties and its node elevation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankGeometry {
  pub area: f64,   // cross-sectional area (ft^2), 0 for reservoirs
  pub hmin: f64,   // minimum head (ft)
  pub hmax: f64,   // maximum head (ft)
  pub h0: f64,     // initial head (ft)
  pub vmin: f64,   // minimum volume (ft^3)
  pub vmax: f64,   // maximum volume (ft^3)
  pub v0: f64,     // initial volume (ft^3)
  pub v1max: f64,  // mixing zone volume (ft^3)
}

impl TankGeometry {
  /// Geometry of a reservoir held at a fixed head
  pub fn reservoir(head: f64) -> Self {
    Self { area: 0.0, hmin: head, hmax: head, h0: head, vmin: 0.0, vmax: 0.0, v0: 0.0, v1max: 0.0 }
  }

  pub fn is_reservoir(&self) -> bool {
    self.area == 0.0
  }
}

impl Tank {
  pub fn new(initial_level: f64, min_level: f64, max_level: f64, diameter: f64) -> Self {
    Self {
      initial_level,
      min_level,
      max_level,
      diameter,
      min_volume: 0.0,
      volume_curve_id: None,
      mix_model: MixModel::CompleteMix,
      mix_fraction: 1.0,
      bulk_coeff: 0.0,
    }
  }

  pub fn with_mix_model(mut self, mix_model: MixModel, mix_fraction: f64) -> Self {
    self.mix_model = mix_model;
    self.mix_fraction = mix_fraction;
    self
  }

  /// Derive the head and volume limits of the tank
  pub fn geometry(&self, elevation: f64, volume_curve: Option<&Curve>) -> TankGeometry {
    let hmin = elevation + self.min_level;
    let hmax = elevation + self.max_level;
    let h0 = elevation + self.initial_level;

    let (area, vmin, vmax, v0) = match volume_curve {
      Some(curve) => {
        let vmin = curve.interpolate(self.min_level);
        let vmax = curve.interpolate(self.max_level);
        let v0 = curve.interpolate(self.initial_level);
        // nominal area, only used to tell tanks from reservoirs
        let dh = self.max_level - self.min_level;
        let area = if dh > TINY { (vmax - vmin) / dh } else { PI * self.diameter.powi(2) / 4.0 };
        (area, vmin, vmax, v0)
      }
      None => {
        // linear volume curve
        let area = PI * self.diameter * self.diameter / 4.0; // in ft^2
        let vmin = if self.min_volume > 0.0 { self.min_volume } else { area * self.min_level };
        let v0 = vmin + (self.initial_level - self.min_level) * area;
        let vmax = vmin + (self.max_level - self.min_level) * area;
        (area, vmin, vmax, v0)
      }
    };

    let v1max = (self.mix_fraction.clamp(0.0, 1.0) * vmax).max(0.0);
    TankGeometry { area, hmin, hmax, h0, vmin, vmax, v0, v1max }
  }
}
