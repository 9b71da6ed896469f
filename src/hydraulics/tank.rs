use simplelog::{debug, warn};

use crate::constants::*;
use crate::error::Result;
use crate::model::curve::Curve;
use crate::model::network::Network;
use crate::model::tank::TankGeometry;

/// Simulation state of a tank or reservoir
#[derive(Debug, Clone)]
pub struct TankState {
  /// Index of the tank's node
  pub node: usize,
  pub elevation: f64,
  pub geometry: TankGeometry,
  pub volume_curve: Option<Curve>,

  pub volume: f64,  // current volume (ft^3)
  pub head: f64,    // current head (ft)
  pub demand: f64,  // net inflow (cfs), positive when filling
}

impl TankState {
  pub fn new(node: usize, elevation: f64, geometry: TankGeometry, volume_curve: Option<Curve>) -> Self {
    Self { node, elevation, geometry, volume_curve, volume: geometry.v0, head: geometry.h0, demand: 0.0 }
  }

  pub fn is_reservoir(&self) -> bool {
    self.geometry.is_reservoir()
  }

  /// Volume of water in the tank at head `h`
  pub fn find_volume(&self, h: f64) -> f64 {
    match &self.volume_curve {
      Some(curve) => curve.interpolate(h - self.elevation),
      None => self.geometry.vmin + (h - self.geometry.hmin) * self.geometry.area,
    }
  }

  /// Head of the water surface at the current volume
  pub fn find_grade(&self) -> f64 {
    match &self.volume_curve {
      Some(curve) => self.elevation + curve.inverse(self.volume),
      None => self.geometry.hmin + (self.volume - self.geometry.vmin) / self.geometry.area,
    }
  }

  /// Advance the tank volume over `tstep` seconds with an explicit Euler step
  pub fn update_level(&mut self, tstep: i64) {
    if self.is_reservoir() {
      return;
    }
    let TankGeometry { vmin, vmax, .. } = self.geometry;

    self.volume += self.demand * tstep as f64;

    // snap to the limit the tank is moving towards when it is less than a second of flow away
    if self.demand > 0.0 && self.volume + self.demand >= vmax {
      self.volume = vmax;
    } else if self.demand < 0.0 && self.volume + self.demand <= vmin {
      self.volume = vmin;
    }
    self.volume = self.volume.clamp(vmin, vmax);

    self.head = self.find_grade();
  }

  /// Largest time step (s) not exceeding `tstep` that does not overfill or drain the tank
  pub fn required_time_step(&self, tstep: i64) -> i64 {
    if self.is_reservoir() {
      return tstep;
    }

    let h = self.head;    // current tank grade
    let q = self.demand;  // flow into tank

    if q.abs() <= QZERO {
      return tstep;
    }

    let v = if q > 0.0 && h < self.geometry.hmax {
      self.geometry.vmax - self.volume   // volume to fill
    } else if q < 0.0 && h > self.geometry.hmin {
      self.geometry.vmin - self.volume   // volume to drain
    } else {
      return tstep;
    };

    // time to fill or drain
    let t = (v / q).round() as i64;
    if t > 0 && t < tstep { t } else { tstep }
  }
}

/// Integrates tank volumes and levels over hydraulic time steps
#[derive(Debug, Clone, Default)]
pub struct TankIntegrator {
  pub tanks: Vec<TankState>,
}

impl TankIntegrator {
  pub fn new(network: &Network) -> Result<Self> {
    let mut tanks = Vec::new();
    for i in network.tank_indices() {
      let node = &network.nodes[i];
      let Some(geometry) = network.tank_geometry(i)? else { continue };
      let curve = match node.as_tank().and_then(|t| t.volume_curve_id.as_deref()) {
        Some(id) => Some(network.curve(id)?.clone()),
        None => None,
      };
      tanks.push(TankState::new(i, node.elevation, geometry, curve));
    }
    Ok(Self { tanks })
  }

  /// Set the net inflow of every tank from the nodal demands of a hydraulic solution
  pub fn set_demands(&mut self, demands: &[f64]) {
    for tank in self.tanks.iter_mut() {
      tank.demand = demands.get(tank.node).copied().unwrap_or(0.0);
    }
  }

  /// Current (node index, head) of every tank and reservoir
  pub fn heads(&self) -> Vec<(usize, f64)> {
    self.tanks.iter().map(|t| (t.node, t.head)).collect()
  }

  /// Revise the time step to the shortest time any tank needs to fill or drain
  pub fn minimum_time_step(&self, tstep: i64) -> i64 {
    let mut new_tstep = tstep;
    for tank in self.tanks.iter() {
      let t = tank.required_time_step(new_tstep);
      if t < new_tstep {
        debug!("Tank at node {} limits the time step to {} s", tank.node, t);
      }
      new_tstep = t;
    }
    new_tstep
  }

  /// Compute new water levels in all tanks after the current time step
  pub fn step_water_levels(&mut self, tstep: i64) {
    for tank in self.tanks.iter_mut() {
      let was_full = tank.volume >= tank.geometry.vmax;
      let was_empty = tank.volume <= tank.geometry.vmin;
      tank.update_level(tstep);
      if tank.is_reservoir() {
        continue;
      }
      if !was_full && tank.volume >= tank.geometry.vmax {
        warn!("Tank at node {} is full", tank.node);
      } else if !was_empty && tank.volume <= tank.geometry.vmin {
        warn!("Tank at node {} is empty", tank.node);
      }
    }
  }
}
