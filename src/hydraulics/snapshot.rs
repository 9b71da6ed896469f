use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};
use crate::model::link::LinkStatus;

/// Hydraulic solution at one instant, valid until `time + step`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HydraulicStep {
  /// Elapsed simulation time (s)
  pub time: i64,
  /// Time until the next hydraulic event (s), 0 for the final solution
  pub step: i64,
  /// Nodal demands (cfs); for tanks the net inflow, positive when filling
  pub demands: Vec<f64>,
  /// Nodal heads (ft)
  pub heads: Vec<f64>,
  /// Link flows (cfs), signed by direction
  pub flows: Vec<f64>,
  pub statuses: Vec<LinkStatus>,
}

impl HydraulicStep {
  /// Empty solution for a network of the given size, every link open with zero flow
  pub fn new(time: i64, step: i64, node_count: usize, link_count: usize) -> Self {
    Self {
      time,
      step,
      demands: vec![0.0; node_count],
      heads: vec![0.0; node_count],
      flows: vec![0.0; link_count],
      statuses: vec![LinkStatus::Open; link_count],
    }
  }

  /// Flow through a link, zero when the link is closed
  pub fn link_flow(&self, index: usize) -> f64 {
    if self.statuses[index].is_closed() {
      0.0
    } else {
      self.flows[index]
    }
  }

  /// Check that the solution matches a network of the given size
  pub fn check_sizes(&self, node_count: usize, link_count: usize) -> Result<()> {
    check("node demands", node_count, self.demands.len())?;
    check("node heads", node_count, self.heads.len())?;
    check("link flows", link_count, self.flows.len())?;
    check("link statuses", link_count, self.statuses.len())
  }
}

fn check(what: &'static str, expected: usize, found: usize) -> Result<()> {
  if expected != found {
    return Err(SimulationError::SizeMismatch { what, expected, found });
  }
  Ok(())
}

/// Supplies hydraulic solutions to the quality engine
pub trait HydraulicSource {
  /// Solution in effect at elapsed time `time`. The returned step is measured from `time`.
  fn step_at(&mut self, time: i64) -> Result<HydraulicStep>;
}

/// Hydraulic solutions held in memory, in increasing time order
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
  pub steps: Vec<HydraulicStep>,
}

impl MemorySource {
  pub fn new(steps: Vec<HydraulicStep>) -> Self {
    Self { steps }
  }

  pub fn push(&mut self, step: HydraulicStep) {
    self.steps.push(step);
  }
}

impl HydraulicSource for MemorySource {
  fn step_at(&mut self, time: i64) -> Result<HydraulicStep> {
    let index = self.steps.partition_point(|s| s.time <= time);
    if index == 0 {
      return Err(SimulationError::InvalidHydraulicFile(format!("no hydraulic solution at time {}", time)));
    }

    let record = &self.steps[index - 1];
    let mut step = record.clone();
    step.time = time;
    step.step = if record.step > 0 { (record.time + record.step - time).max(0) } else { 0 };
    Ok(step)
  }
}
