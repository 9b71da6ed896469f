//! Extended period hydraulics around an external steady state solver

pub mod file;
pub mod pump;
pub mod snapshot;
pub mod tank;

use std::path::Path;

use simplelog::{debug, info};

use crate::error::Result;
use crate::hydraulics::file::HydraulicFileWriter;
use crate::hydraulics::pump::PumpEnergyAccumulator;
use crate::hydraulics::snapshot::{HydraulicStep, MemorySource};
use crate::hydraulics::tank::TankIntegrator;
use crate::model::link::{LinkCoefficients, LinkStatus};
use crate::model::network::Network;

/// Steady state flow solver producing one hydraulic solution per call
pub trait HydraulicSolver {
  /// Solve the network at `time` with tanks and reservoirs fixed at the given (node, head) pairs.
  /// The returned step length is ignored, the simulation computes it.
  fn solve(&mut self, network: &Network, time: i64, tank_heads: &[(usize, f64)]) -> Result<HydraulicStep>;
}

/// Extended period simulation: steps tank levels and pump energy between solver calls
pub struct HydraulicSimulation<'a, S: HydraulicSolver> {
  network: &'a Network,
  solver: S,
  pub tanks: TankIntegrator,
  pub pumps: PumpEnergyAccumulator,
  /// Pump headloss coefficients linearized at the last solution, as (link, coefficients)
  pump_coefficients: Vec<(usize, LinkCoefficients)>,
  htime: i64,
  rtime: i64,
  finished: bool,
}

impl<'a, S: HydraulicSolver> HydraulicSimulation<'a, S> {
  pub fn new(network: &'a Network, solver: S) -> Result<Self> {
    Ok(Self {
      network,
      solver,
      tanks: TankIntegrator::new(network)?,
      pumps: PumpEnergyAccumulator::new(network)?,
      pump_coefficients: Vec::new(),
      htime: 0,
      rtime: network.options.report_start,
      finished: false,
    })
  }

  /// Current hydraulic time (s)
  pub fn time(&self) -> i64 {
    self.htime
  }

  pub fn pump_coefficients(&self) -> &[(usize, LinkCoefficients)] {
    &self.pump_coefficients
  }

  /// Solve the network at the current time and advance to the next hydraulic event.
  /// Returns `None` once the final solution has been produced.
  pub fn next_step(&mut self) -> Result<Option<HydraulicStep>> {
    if self.finished {
      return Ok(None);
    }
    let network = self.network;

    let mut step = self.solver.solve(network, self.htime, &self.tanks.heads())?;
    step.check_sizes(network.nodes.len(), network.links.len())?;
    step.time = self.htime;

    // pumps that cannot deliver the head are shut
    self.pumps.load(&step.flows, &step.statuses);
    for link in self.pumps.update_status(&step.heads) {
      step.statuses[link] = LinkStatus::Xhead;
      step.flows[link] = 0.0;
    }
    let coefficients = self.pumps.coefficients();
    self.pump_coefficients = self.pumps.pumps.iter().map(|p| p.link).zip(coefficients).collect();

    self.tanks.set_demands(&step.demands);
    let tstep = self.time_step();
    step.step = tstep;

    let power = self.pumps.step_energy(self.htime, tstep, &step.heads);
    self.tanks.step_water_levels(tstep);
    debug!("Hydraulics at {} s: step {} s, pump power {:.2} kW", self.htime, tstep, power);

    self.htime += tstep;
    if tstep == 0 {
      self.finished = true;
    }
    Ok(Some(step))
  }

  /// Length of the next hydraulic step, zero at the end of the simulation
  fn time_step(&mut self) -> i64 {
    let options = &self.network.options;
    if self.htime >= options.duration {
      return 0;
    }

    let mut tstep = options.hydraulic_step;

    // next pattern boundary
    let t = options.pattern_step - (self.htime + options.pattern_start) % options.pattern_step;
    if t > 0 && t < tstep {
      tstep = t;
    }

    // next reporting time
    while self.rtime <= self.htime {
      self.rtime += options.report_step;
    }
    let t = self.rtime - self.htime;
    if t < tstep {
      tstep = t;
    }

    tstep = tstep.min(options.duration - self.htime);
    self.tanks.minimum_time_step(tstep)
  }

  /// Run the whole simulation, handing every solution to `callback`.
  /// Returns the number of solutions produced.
  pub fn run<F>(&mut self, mut callback: F) -> Result<usize>
  where
    F: FnMut(&HydraulicStep) -> Result<()>,
  {
    let mut count = 0;
    while let Some(step) = self.next_step()? {
      callback(&step)?;
      count += 1;
    }
    info!("Hydraulic simulation finished after {} steps", count);
    Ok(count)
  }

  /// Run the whole simulation and keep the solutions in memory
  pub fn run_to_memory(&mut self) -> Result<MemorySource> {
    let mut source = MemorySource::default();
    self.run(|step| {
      source.push(step.clone());
      Ok(())
    })?;
    Ok(source)
  }

  /// Run the whole simulation and persist the solutions as a binary hydraulics file
  pub fn run_to_file(&mut self, path: impl AsRef<Path>) -> Result<usize> {
    let mut writer = HydraulicFileWriter::create(path, self.network.nodes.len(), self.network.links.len())?;
    let count = self.run(|step| writer.write_step(step))?;
    writer.finish()?;
    Ok(count)
  }
}
