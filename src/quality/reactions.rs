//! Bulk and pipe wall reaction kinetics

use crate::constants::*;
use crate::model::options::{QualityType, SimulationOptions};

fn sign(x: f64) -> f64 {
  if x < 0.0 { -1.0 } else { 1.0 }
}

/// Bulk reaction rate (mass/volume/s) of concentration `c` for rate coefficient `kb` and reaction `order`.
/// Negative orders use Michaelis-Menten kinetics with `climit` as half saturation constant,
/// positive orders grow or decay towards `climit` when it is non-zero.
pub fn bulk_rate(c: f64, kb: f64, order: f64, climit: f64) -> f64 {
  let mut c = c;

  if order == 0.0 {
    c = 1.0;
  } else if order < 0.0 {
    let mut c1 = climit + sign(kb) * c;
    if c1.abs() < TINY {
      c1 = sign(c1) * TINY;
    }
    c /= c1;
  } else {
    let c1 = if climit == 0.0 { c } else { (sign(kb) * (climit - c)).max(0.0) };
    c = if order == 1.0 {
      c1
    } else if order == 2.0 {
      c1 * c
    } else {
      c1 * c.max(0.0).powf(order - 1.0)
    };
  }

  kb * c.max(0.0)
}

/// Mass transfer coefficient (ft/s) to the pipe wall from the Sherwood number correlations
pub fn mass_transfer_coefficient(diameter: f64, length: f64, flow: f64, schmidt: f64, diffusivity: f64, viscosity: f64) -> f64 {
  let d = diameter;
  let area = PI * d * d / 4.0;
  let u = flow.abs() / area;
  let re = u * d / viscosity;

  let sh = if re < 1.0 {
    // stagnant flow
    2.0
  } else if re >= 2300.0 {
    // turbulent flow
    0.0149 * re.powf(0.88) * schmidt.powf(0.333)
  } else {
    // laminar flow, Graetz solution
    let y = d / length * re * schmidt;
    3.65 + 0.0668 * y / (1.0 + 0.04 * y.powf(0.667))
  };

  sh * diffusivity / d
}

/// Reaction settings shared by all pipes and tanks of a simulation
#[derive(Debug, Clone)]
pub struct Kinetics {
  pub quality_type: QualityType,
  /// Whether anything reacts at all
  pub react: bool,
  pub bulk_order: f64,
  pub tank_order: f64,
  pub wall_order: f64,
  pub climit: f64,
  pub schmidt: f64,
  pub diffusivity: f64,
  pub viscosity: f64,
  /// Converts user lengths in wall coefficients to feet
  pub elev_units: f64,
}

/// Outcome of reacting one pipe segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipeReaction {
  pub c: f64,
  pub dc_bulk: f64,
  pub dc_wall: f64,
}

impl Kinetics {
  pub fn new(options: &SimulationOptions, react: bool) -> Self {
    let q = &options.quality;
    Self {
      quality_type: q.quality_type,
      react,
      bulk_order: q.bulk_order,
      tank_order: q.tank_order,
      wall_order: q.wall_order,
      climit: q.climit,
      schmidt: options.schmidt_number(),
      diffusivity: q.diffusivity,
      viscosity: q.viscosity,
      elev_units: options.unit_system.length_factor(),
    }
  }

  /// Wall reaction rate coefficient of a pipe for its current flow.
  /// For zero order wall reactions this is the mass transfer coefficient itself.
  pub fn pipe_rate(&self, diameter: f64, length: f64, flow: f64, kw: f64) -> f64 {
    let d = diameter;

    if self.schmidt == 0.0 {
      if self.wall_order == 0.0 {
        return BIG;
      }
      return kw * (4.0 / d) / self.elev_units;
    }

    let kf = mass_transfer_coefficient(d, length, flow, self.schmidt, self.diffusivity, self.viscosity);
    if self.wall_order == 0.0 {
      return kf;
    }

    // resistances of wall reaction and mass transfer in series
    let kw = kw / self.elev_units;
    (4.0 / d) * kw * kf / (kf + kw.abs())
  }

  /// Wall reaction rate (mass/volume/s) of concentration `c` with wall coefficient `kw`
  /// and pipe rate coefficient `kf`
  pub fn wall_rate(&self, c: f64, diameter: f64, kw: f64, kf: f64) -> f64 {
    if kw == 0.0 || diameter == 0.0 {
      return 0.0;
    }
    if self.wall_order == 0.0 {
      // rate is limited by mass transfer
      let kf = sign(kw) * c * kf;
      let mut kw = kw * self.elev_units.powi(2);
      if kf.abs() < kw.abs() {
        kw = kf;
      }
      return kw * 4.0 / diameter;
    }
    c * kf
  }

  /// React a pipe segment over `dt` seconds
  pub fn pipe_react(&self, c: f64, kb: f64, kw: f64, kf: f64, diameter: f64, dt: i64) -> PipeReaction {
    if self.quality_type == QualityType::Age {
      return PipeReaction { c: c + dt as f64 / 3600.0, dc_bulk: 0.0, dc_wall: 0.0 };
    }

    let dc_bulk = bulk_rate(c, kb, self.bulk_order, self.climit) * dt as f64;
    let dc_wall = self.wall_rate(c, diameter, kw, kf) * dt as f64;
    PipeReaction { c: (c + dc_bulk + dc_wall).max(0.0), dc_bulk, dc_wall }
  }

  /// React tank contents over `dt` seconds. Returns the new concentration and its change.
  pub fn tank_react(&self, c: f64, kb: f64, dt: i64) -> (f64, f64) {
    if !self.react {
      return (c, 0.0);
    }
    if self.quality_type == QualityType::Age {
      return (c + dt as f64 / 3600.0, 0.0);
    }

    let dc = bulk_rate(c, kb, self.tank_order, self.climit) * dt as f64;
    ((c + dc).max(0.0), dc)
  }
}
