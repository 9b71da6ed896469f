//! Tank mixing models

use crate::model::tank::MixModel;
use crate::quality::reactions::Kinetics;
use crate::quality::segment::Segment;
use crate::quality::state::QualityTank;

/// Flows through a tank over one quality step
#[derive(Debug, Clone, Copy, Default)]
pub struct TankFlows {
  /// Net inflow rate (cfs), positive when filling
  pub demand: f64,
  /// Volume that entered the tank from its links
  pub volume_in: f64,
  /// Mass that entered the tank from its links
  pub mass_in: f64,
}

impl TankFlows {
  fn inflow_quality(&self) -> f64 {
    if self.volume_in > 0.0 { self.mass_in / self.volume_in } else { 0.0 }
  }
}

/// Mix the inflow of a quality step into a tank with its mixing model.
/// Returns the mass reacted in the tank.
pub fn mix(tank: &mut QualityTank, flows: &TankFlows, kinetics: &Kinetics, ctol: f64, dt: i64) -> f64 {
  match tank.mix_model {
    MixModel::CompleteMix => complete_mix(tank, flows, kinetics, dt),
    MixModel::TwoCompartment => two_compartment(tank, flows, kinetics, dt),
    MixModel::Fifo => fifo(tank, flows, kinetics, ctol, dt),
    MixModel::Lifo => lifo(tank, flows, kinetics, ctol, dt),
  }
}

fn react_segment(seg: &mut Segment, kb: f64, kinetics: &Kinetics, dt: i64) -> f64 {
  let (c, dc) = kinetics.tank_react(seg.c, kb, dt);
  seg.c = c;
  dc.abs() * seg.v
}

fn complete_mix(tank: &mut QualityTank, flows: &TankFlows, kinetics: &Kinetics, dt: i64) -> f64 {
  let (mut c, dc) = kinetics.tank_react(tank.concentration, tank.bulk_coeff, dt);
  let reacted = dc.abs() * tank.volume;

  let vold = tank.volume;
  tank.volume += flows.demand * dt as f64;

  let vin = flows.volume_in;
  let cin = flows.inflow_quality();
  let cmax = c.max(cin);

  if vin > 0.0 {
    c = (c * vold + cin * vin) / (vold + vin);
  }
  tank.concentration = c.min(cmax).max(0.0);
  reacted
}

/// Mixing zone at the back of the segments, ambient zone at the front
fn two_compartment(tank: &mut QualityTank, flows: &TankFlows, kinetics: &Kinetics, dt: i64) -> f64 {
  if tank.segments.len() < 2 {
    return 0.0;
  }
  let (Some(&ambient), Some(&mixing)) = (tank.segments.front(), tank.segments.back()) else { return 0.0 };
  let (mut seg1, mut seg2) = (mixing, ambient);

  let mut reacted = react_segment(&mut seg1, tank.bulk_coeff, kinetics, dt);
  reacted += react_segment(&mut seg2, tank.bulk_coeff, kinetics, dt);

  let vnet = flows.demand * dt as f64;
  let vin = flows.volume_in;
  let cin = flows.inflow_quality();
  let v1max = tank.v1max;

  let mut vt = 0.0;
  if vnet > 0.0 {
    // filling: inflow enters the mixing zone, any excess spills into the ambient zone
    vt = (seg1.v + vnet - v1max).max(0.0);
    if vin > 0.0 {
      seg1.c = (seg1.c * seg1.v + cin * vin) / (seg1.v + vin);
    }
    if vt > 0.0 {
      seg2.c = (seg2.c * seg2.v + seg1.c * vt) / (seg2.v + vt);
    }
  } else if vnet < 0.0 {
    // emptying: the ambient zone drains into the mixing zone
    if seg2.v > 0.0 {
      vt = seg2.v.min(-vnet);
    }
    if vin + vt > 0.0 {
      seg1.c = (seg1.c * seg1.v + cin * vin + seg2.c * vt) / (seg1.v + vin + vt);
    }
  }

  if vt > 0.0 {
    seg1.v = v1max;
    if vnet > 0.0 {
      seg2.v += vt;
    } else {
      seg2.v = (seg2.v - vt).max(0.0);
    }
  } else {
    seg1.v = (seg1.v + vnet).min(v1max).max(0.0);
    seg2.v = 0.0;
  }

  if let Some(front) = tank.segments.front_mut() {
    *front = seg2;
  }
  if let Some(back) = tank.segments.back_mut() {
    *back = seg1;
  }

  tank.volume = (tank.volume + vnet).max(0.0);
  // outflow leaves from the mixing zone
  tank.concentration = seg1.c;
  reacted
}

fn react_all(tank: &mut QualityTank, kinetics: &Kinetics, dt: i64) -> f64 {
  if !kinetics.react {
    return 0.0;
  }
  let kb = tank.bulk_coeff;
  tank.segments.iter_mut().map(|seg| react_segment(seg, kb, kinetics, dt)).sum()
}

/// Plug flow: inflow joins the back, outflow leaves from the front
fn fifo(tank: &mut QualityTank, flows: &TankFlows, kinetics: &Kinetics, ctol: f64, dt: i64) -> f64 {
  if tank.segments.is_empty() {
    return 0.0;
  }
  let reacted = react_all(tank, kinetics, dt);

  let vnet = flows.demand * dt as f64;
  let vin = flows.volume_in;
  let vout = vin - vnet;
  let cin = flows.inflow_quality();

  tank.volume = (tank.volume + vnet).max(0.0);

  let (vsum, msum) = tank.segments.withdraw_front(vout);
  if vsum > 0.0 {
    tank.concentration = msum / vsum;
  } else if let Some(front) = tank.segments.front() {
    tank.concentration = front.c;
  }

  if vin > 0.0 {
    tank.segments.merge_or_push(vin, cin, ctol);
  }
  reacted
}

/// Stacked plug flow: inflow and outflow both at the back
fn lifo(tank: &mut QualityTank, flows: &TankFlows, kinetics: &Kinetics, ctol: f64, dt: i64) -> f64 {
  if tank.segments.is_empty() {
    return 0.0;
  }
  let reacted = react_all(tank, kinetics, dt);

  let vnet = flows.demand * dt as f64;
  let vin = flows.volume_in;
  let cin = flows.inflow_quality();

  tank.volume = (tank.volume + vnet).max(0.0);
  if let Some(back) = tank.segments.back() {
    tank.concentration = back.c;
  }

  if vnet > 0.0 {
    // only the net inflow stays in the tank
    tank.segments.merge_or_push(vnet, cin, ctol);
    if let Some(back) = tank.segments.back() {
      tank.concentration = back.c;
    }
  } else if vnet < 0.0 {
    let (vsum, msum) = tank.segments.withdraw_back(-vnet);
    // released water is mixed with any inflow passing through
    if vsum + vin > 0.0 {
      tank.concentration = (msum + flows.mass_in) / (vsum + vin);
    }
  }
  reacted
}
