use simplelog::warn;

use crate::constants::*;
use crate::error::Result;
use crate::model::curve::{Curve, HeadCurveStatistics};
use crate::model::link::{LinkCoefficients, LinkStatus};
use crate::model::network::Network;
use crate::model::options::EnergyOptions;
use crate::model::pattern::{pattern_period, Pattern};
use crate::model::pump::PumpType;

/// Cumulative energy usage statistics of a pump
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PumpEnergy {
  pub time_online: f64,  // hours on line
  pub efficiency: f64,   // efficiency weighted hours
  pub kw_per_flow: f64,  // kw/cfs weighted hours
  pub kw_hours: f64,     // energy used (kWh)
  pub max_kw: f64,       // peak power (kW)
  pub cost: f64,         // cost weighted hours
}

impl PumpEnergy {
  pub fn as_array(&self) -> [f64; 6] {
    [self.time_online, self.efficiency, self.kw_per_flow, self.kw_hours, self.max_kw, self.cost]
  }
}

/// Simulation state of a pump
#[derive(Debug, Clone)]
pub struct PumpState {
  /// Index of the pump's link
  pub link: usize,
  pub start_node: usize,
  pub end_node: usize,
  pub pump_type: PumpType,
  pub statistics: HeadCurveStatistics,
  pub head_curve: Option<Curve>,
  pub efficiency_curve: Option<Curve>,
  pub energy_price: f64,
  pub price_pattern: Option<Pattern>,

  /// Relative speed setting
  pub setting: f64,
  pub status: LinkStatus,
  pub flow: f64,

  // headloss coefficients for the current step
  pub h0: f64,
  pub r: f64,
  pub n: f64,

  pub energy: PumpEnergy,
}

impl PumpState {
  /// Compute the inverse headloss gradient and flow correction of the pump.
  /// Custom curves are linearized around the current speed-adjusted flow.
  pub fn compute_coefficients(&mut self, rq_tolerance: f64) -> LinkCoefficients {
    // closed pumps act as a closed pipe
    if self.status.is_closed() || self.setting == 0.0 {
      return LinkCoefficients::simple(1.0 / CBIG, self.flow);
    }

    let q = self.flow.abs().max(TINY);

    if self.pump_type == PumpType::Custom {
      if let Some(curve) = &self.head_curve {
        let (hh0, rr) = curve.coefficients(q / self.setting);
        self.h0 = -hh0;
        self.r = -rr;
        self.n = 1.0;
      }
    }

    let h0 = self.setting * self.setting * self.h0;
    let n = self.n;
    let mut r = self.r * self.setting.powf(2.0 - n);
    if n != 1.0 {
      r = n * r * q.powf(n - 1.0);
    }

    let g_inv = 1.0 / r.max(rq_tolerance);
    LinkCoefficients::simple(g_inv, self.flow / n + g_inv * h0)
  }

  /// Status of the pump for a head gain `dh` across it
  pub fn status_for_head_gain(&self, dh: f64, head_tolerance: f64) -> LinkStatus {
    let hmax = if self.pump_type == PumpType::ConstHp {
      BIG
    } else {
      self.setting * self.setting * self.statistics.h_max
    };

    if dh > hmax + head_tolerance {
      return LinkStatus::Xhead;
    }
    LinkStatus::Open
  }

  /// Power used (kW) and efficiency (fraction) of the pump at the current flow
  pub fn flow_energy(&self, heads: &[f64], options: &EnergyOptions, flow_factor: f64) -> (f64, f64) {
    if self.status.is_closed() {
      return (0.0, 0.0);
    }

    let q = self.flow.abs();
    let dh = (heads[self.start_node] - heads[self.end_node]).abs();

    let e = match &self.efficiency_curve {
      Some(curve) => curve.interpolate(q * flow_factor),
      None => options.efficiency,
    };
    let e = e.clamp(1.0, 100.0) / 100.0;

    let power = dh * q * options.specific_gravity / 8.814 / e * KWperHP;
    (power, e)
  }

  /// Accumulate energy usage over `dt` hours, returns the power used
  fn update_energy(&mut self, power: f64, efficiency: f64, period: i64, c0: f64, f0: f64, dt: f64) -> f64 {
    if self.status.is_closed() {
      return 0.0;
    }
    let q = QZERO.max(self.flow.abs());

    // pump specific energy cost
    let mut c = if self.energy_price > 0.0 { self.energy_price } else { c0 };
    match &self.price_pattern {
      Some(pattern) => c *= pattern.factor(period),
      None => c *= f0,
    }

    let e = &mut self.energy;
    e.time_online += dt;
    e.efficiency += efficiency * dt;
    e.kw_per_flow += power / q * dt;
    e.kw_hours += power * dt;
    e.max_kw = e.max_kw.max(power);
    e.cost += c * power * dt;

    power
  }
}

/// Tracks pump status, headloss coefficients and energy usage over a simulation
#[derive(Debug, Clone)]
pub struct PumpEnergyAccumulator {
  pub pumps: Vec<PumpState>,
  options: EnergyOptions,
  price_pattern: Option<Pattern>,
  flow_factor: f64,
  duration: i64,
  pattern_start: i64,
  pattern_step: i64,
}

impl PumpEnergyAccumulator {
  pub fn new(network: &Network) -> Result<Self> {
    let mut pumps = Vec::new();
    for i in network.pump_indices() {
      let link = &network.links[i];
      let Some(pump) = link.as_pump() else { continue };

      let statistics = pump.head_curve_statistics.unwrap_or(HeadCurveStatistics {
        h_max: BIG, h_shutoff: 0.0, q_max: BIG, q_initial: 1.0, r: 0.0, n: 1.0,
      });
      let head_curve = match pump.head_curve.as_deref() {
        Some(id) => Some(network.curve(id)?.clone()),
        None => None,
      };
      let efficiency_curve = match pump.efficiency_curve.as_deref() {
        Some(id) => Some(network.curve(id)?.clone()),
        None => None,
      };

      pumps.push(PumpState {
        link: i,
        start_node: link.start_node,
        end_node: link.end_node,
        pump_type: pump.pump_type,
        statistics,
        head_curve,
        efficiency_curve,
        energy_price: pump.energy_price,
        price_pattern: network.pattern(pump.price_pattern.as_deref())?.cloned(),
        setting: pump.speed,
        status: link.initial_status,
        flow: statistics.q_initial,
        // shutoff head is negative to represent head gain
        h0: -statistics.h_shutoff,
        r: statistics.r,
        n: statistics.n,
        energy: PumpEnergy::default(),
      });
    }

    let options = &network.options;
    Ok(Self {
      pumps,
      options: options.energy.clone(),
      price_pattern: network.pattern(options.energy.price_pattern.as_deref())?.cloned(),
      flow_factor: options.flow_units.factor(),
      duration: options.duration,
      pattern_start: options.pattern_start,
      pattern_step: options.pattern_step,
    })
  }

  /// Take over flows and statuses of a hydraulic solution
  pub fn load(&mut self, flows: &[f64], statuses: &[LinkStatus]) {
    for pump in self.pumps.iter_mut() {
      pump.flow = flows[pump.link];
      pump.status = statuses[pump.link];
    }
  }

  /// Check every running pump against its maximum head.
  /// Returns the links of pumps that were shut because they cannot deliver the head.
  pub fn update_status(&mut self, heads: &[f64]) -> Vec<usize> {
    let mut tripped = Vec::new();
    for pump in self.pumps.iter_mut() {
      if pump.status.is_closed() {
        continue;
      }
      let dh = heads[pump.end_node] - heads[pump.start_node];
      let status = pump.status_for_head_gain(dh, self.options.head_tolerance);
      if status == LinkStatus::Xhead {
        warn!("Pump {} cannot deliver head gain {:.2}", pump.link, dh);
        pump.status = status;
        pump.flow = 0.0;
        tripped.push(pump.link);
      }
    }
    tripped
  }

  /// Headloss coefficients of every pump, in pump order
  pub fn coefficients(&mut self) -> Vec<LinkCoefficients> {
    let rq_tolerance = self.options.rq_tolerance;
    self.pumps.iter_mut().map(|p| p.compute_coefficients(rq_tolerance)).collect()
  }

  /// Accumulate energy usage over the hydraulic step starting at `htime`.
  /// Returns the total power (kW) used by all pumps.
  pub fn step_energy(&mut self, htime: i64, hstep: i64, heads: &[f64]) -> f64 {
    let dt = if self.duration == 0 {
      1.0
    } else if htime < self.duration {
      hstep as f64 / 3600.0
    } else {
      0.0
    };
    if dt == 0.0 {
      return 0.0;
    }

    let period = pattern_period(htime, self.pattern_start, self.pattern_step);
    let c0 = self.options.price;
    let f0 = self.price_pattern.as_ref().map_or(1.0, |p| p.factor(period));

    let mut psum = 0.0;
    for pump in self.pumps.iter_mut() {
      let (power, efficiency) = pump.flow_energy(heads, &self.options, self.flow_factor);
      psum += pump.update_energy(power, efficiency, period, c0, f0, dt);
    }
    psum
  }
}
