//! Lagrangian water quality transport driven by hydraulic solutions

pub mod mixing;
pub mod output;
pub mod reactions;
pub mod segment;
pub mod sources;
pub mod state;
mod transport;

use simplelog::{debug, info};

use crate::constants::TRACE_QUALITY;
use crate::error::{Result, SimulationError};
use crate::hydraulics::snapshot::{HydraulicSource, HydraulicStep};
use crate::model::network::Network;
use crate::model::options::{QualityType, SimulationOptions};
use crate::model::tank::MixModel;
use crate::quality::output::QualitySink;
use crate::quality::reactions::Kinetics;
use crate::quality::segment::{Segment, Segments};
use crate::quality::state::{NodeSource, QualityLink, QualityNode, QualityTank, ReactionStatistics};

/// Lifecycle of a quality simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationState {
  Idle,
  Running,
  Finished,
}

/// Single species water quality simulation
pub struct QualitySim {
  options: SimulationOptions,
  kinetics: Kinetics,

  nodes: Vec<QualityNode>,
  links: Vec<QualityLink>,
  tanks: Vec<QualityTank>,
  /// Position in `tanks` of every tank or reservoir node
  tank_index: Vec<Option<usize>>,
  trace_node: Option<usize>,

  htime: i64,  // hydraulic time (s)
  qtime: i64,  // quality time (s)
  rtime: i64,  // next reporting time (s)
  periods: usize,

  statistics: ReactionStatistics,
  state: SimulationState,
}

impl QualitySim {
  pub fn new(network: &Network) -> Result<Self> {
    // networks built in code may not have been prepared
    let mut options = network.options.clone();
    options.validate()?;
    let quality = &options.quality;

    let trace_node = match (quality.quality_type, quality.trace_node.as_deref()) {
      (QualityType::Trace, Some(id)) => {
        Some(network.node_index(id).ok_or_else(|| SimulationError::UnknownTraceNode(id.to_string()))?)
      }
      (QualityType::Trace, None) => return Err(SimulationError::UnknownTraceNode(String::new())),
      _ => None,
    };

    let mut nodes = Vec::with_capacity(network.nodes.len());
    for node in network.nodes.iter() {
      let source = match &node.source {
        Some(source) => Some(NodeSource {
          source_type: source.source_type,
          strength: source.strength,
          pattern: network.pattern(source.pattern.as_deref())?.cloned(),
        }),
        None => None,
      };
      nodes.push(QualityNode {
        initial_quality: node.initial_quality,
        is_tank: node.is_fixed(),
        source,
        ..QualityNode::default()
      });
    }

    let mut tanks = Vec::new();
    let mut tank_index = vec![None; network.nodes.len()];
    for i in network.tank_indices() {
      let Some(geometry) = network.tank_geometry(i)? else { continue };
      let node = &network.nodes[i];
      let (mix_model, bulk_coeff) = match node.as_tank() {
        Some(tank) => (tank.mix_model, tank.bulk_coeff),
        None => (MixModel::CompleteMix, 0.0),
      };
      tank_index[i] = Some(tanks.len());
      tanks.push(QualityTank {
        node: i,
        area: geometry.area,
        v1max: geometry.v1max,
        mix_model,
        bulk_coeff,
        initial_volume: geometry.v0,
        initial_quality: node.initial_quality,
        volume: geometry.v0,
        concentration: node.initial_quality,
        segments: Segments::new(),
      });
    }

    let links = network.links.iter().map(|link| QualityLink {
      start: link.start_node,
      end: link.end_node,
      flow_dir: true,
      volume: link.volume(),
      diameter: link.diameter(),
      length: link.length(),
      kb: link.bulk_coeff,
      kw: link.wall_coeff,
      ..QualityLink::default()
    }).collect::<Vec<_>>();

    let react = match quality.quality_type {
      QualityType::None | QualityType::Trace => false,
      QualityType::Age => true,
      QualityType::Chemical => {
        network.links.iter().any(|l| l.is_pipe() && (l.bulk_coeff != 0.0 || l.wall_coeff != 0.0))
          || tanks.iter().any(|t| t.bulk_coeff != 0.0)
      }
    };
    let kinetics = Kinetics::new(&options, react);

    let mut sim = Self {
      rtime: options.report_start,
      options,
      kinetics,
      nodes,
      links,
      tanks,
      tank_index,
      trace_node,
      htime: 0,
      qtime: 0,
      periods: 0,
      statistics: ReactionStatistics::default(),
      state: SimulationState::Idle,
    };
    sim.reset();
    Ok(sim)
  }

  /// Restore the initial conditions so the simulation can run again
  pub fn reset(&mut self) {
    let trace = self.options.quality.quality_type == QualityType::Trace;
    for (i, node) in self.nodes.iter_mut().enumerate() {
      if trace {
        node.initial_quality = if Some(i) == self.trace_node { TRACE_QUALITY } else { 0.0 };
      }
      node.quality = node.initial_quality;
      node.demand = 0.0;
      node.volume_in = 0.0;
      node.mass_in = 0.0;
      node.source_contribution = 0.0;
      node.mass_rate = 0.0;
    }
    for tank in self.tanks.iter_mut() {
      tank.initial_quality = self.nodes[tank.node].initial_quality;
      tank.volume = tank.initial_volume;
      tank.concentration = tank.initial_quality;
      tank.segments.clear();
    }
    for link in self.links.iter_mut() {
      link.flow = 0.0;
      link.flow_dir = true;
      link.segments.clear();
      link.wall_coeff = 0.0;
      link.reaction_rate = 0.0;
    }

    self.htime = 0;
    self.qtime = 0;
    self.rtime = self.options.report_start;
    self.periods = 0;
    self.statistics = ReactionStatistics::default();
    self.state = SimulationState::Idle;
  }

  pub fn state(&self) -> SimulationState {
    self.state
  }

  pub fn options(&self) -> &SimulationOptions {
    &self.options
  }

  /// Current hydraulic time (s)
  pub fn hydraulic_time(&self) -> i64 {
    self.htime
  }

  /// Current quality time (s)
  pub fn quality_time(&self) -> i64 {
    self.qtime
  }

  /// Number of reporting periods saved so far
  pub fn periods(&self) -> usize {
    self.periods
  }

  pub fn statistics(&self) -> ReactionStatistics {
    self.statistics
  }

  pub fn node_quality(&self, index: usize) -> f64 {
    self.nodes[index].quality
  }

  pub fn node(&self, index: usize) -> &QualityNode {
    &self.nodes[index]
  }

  pub fn link(&self, index: usize) -> &QualityLink {
    &self.links[index]
  }

  /// Average quality of a link: volume weighted over its segments,
  /// or the mean of its end nodes when it holds no water
  pub fn link_quality(&self, index: usize) -> f64 {
    if self.options.quality.quality_type == QualityType::None {
      return 0.0;
    }
    let link = &self.links[index];
    match link.segments.average() {
      Some(c) => c,
      None => (self.nodes[link.start].quality + self.nodes[link.end].quality) / 2.0,
    }
  }

  pub fn link_segments(&self, index: usize) -> impl Iterator<Item = &Segment> {
    self.links[index].segments.iter()
  }

  /// Quality state of the tank or reservoir at a node
  pub fn tank(&self, node: usize) -> Option<&QualityTank> {
    self.tank_index.get(node).copied().flatten().map(|k| &self.tanks[k])
  }

  /// Fill every link with a single segment at the quality of its downstream node,
  /// and tanks that use segments with their initial contents
  pub fn initialize_segments(&mut self) {
    for link in self.links.iter_mut() {
      link.flow_dir = link.flow >= 0.0;
      link.segments.clear();

      let j = link.downstream();
      let c = match self.tank_index[j] {
        Some(k) => self.tanks[k].concentration,
        None => self.nodes[j].quality,
      };
      link.segments.push_back(Segment::new(link.volume, c));
    }

    for tank in self.tanks.iter_mut() {
      if tank.is_reservoir() || tank.mix_model == MixModel::CompleteMix {
        continue;
      }
      let c = tank.concentration;
      tank.segments.clear();

      if tank.mix_model == MixModel::TwoCompartment {
        // ambient zone first, then the mixing zone
        let v = (tank.volume - tank.v1max).max(0.0);
        tank.segments.push_back(Segment::new(v, c));
        tank.segments.push_back(Segment::new(tank.volume - v, c));
      } else {
        tank.segments.push_back(Segment::new(tank.volume, c));
      }
    }
  }

  /// Reverse the segments of links whose flow changed direction
  fn reorient_segments(&mut self) {
    for link in self.links.iter_mut() {
      let dir = if link.flow == 0.0 { link.flow_dir } else { link.flow > 0.0 };
      if dir != link.flow_dir {
        link.segments.reverse();
        link.flow_dir = dir;
      }
    }
  }

  /// Take over demands and flows of a hydraulic solution
  fn load_step(&mut self, step: &HydraulicStep) {
    for (node, demand) in self.nodes.iter_mut().zip(step.demands.iter()) {
      node.demand = *demand;
    }
    for (i, link) in self.links.iter_mut().enumerate() {
      link.flow = step.link_flow(i);
    }
  }

  /// Wall rate coefficients of all links for their current flow
  fn rate_coefficients(&mut self) {
    for link in self.links.iter_mut() {
      link.wall_coeff = if link.kw != 0.0 {
        self.kinetics.pipe_rate(link.diameter, link.length, link.flow, link.kw)
      } else {
        0.0
      };
    }
  }

  /// Advance quality up to the current hydraulic time. Returns the length of the interval.
  fn next_quality(&mut self) -> i64 {
    let hydstep = self.htime - self.qtime;
    if self.options.quality.quality_type != QualityType::None && hydstep > 0 {
      self.transport(hydstep);
    }
    self.qtime += hydstep;
    hydstep
  }

  fn save_period<K: QualitySink + ?Sized>(&mut self, sink: &mut K) -> Result<()> {
    let nodes = self.nodes.iter().map(|n| n.quality).collect::<Vec<_>>();
    let links = (0..self.links.len()).map(|i| self.link_quality(i)).collect::<Vec<_>>();
    sink.save_period(self.htime, &nodes, &links)?;
    self.periods += 1;
    self.rtime += self.options.report_step;
    Ok(())
  }

  /// Advance the simulation by one hydraulic solution.
  /// Returns `false` once the final solution (with a zero step) has been processed.
  pub fn step<K: QualitySink + ?Sized>(&mut self, step: &HydraulicStep, sink: &mut K) -> Result<bool> {
    match self.state {
      SimulationState::Finished => return Ok(false),
      SimulationState::Idle => {
        sink.start(self.nodes.len(), self.links.len())?;
        info!("Starting quality simulation of {} nodes and {} links", self.nodes.len(), self.links.len());
        self.state = SimulationState::Running;
      }
      SimulationState::Running => {}
    }
    step.check_sizes(self.nodes.len(), self.links.len())?;
    self.load_step(step);

    // report before advancing htime, as EPANET's C engine does
    if self.htime >= self.rtime {
      self.save_period(sink)?;
    }

    let quality_type = self.options.quality.quality_type;
    if quality_type != QualityType::None && self.qtime < self.options.duration {
      if self.kinetics.react && quality_type != QualityType::Age {
        self.rate_coefficients();
      }
      if self.qtime == 0 {
        self.initialize_segments();
      } else {
        self.reorient_segments();
      }
    }

    self.htime += step.step.max(0);
    let tstep = self.next_quality();
    debug!("Quality advanced to {} s", self.qtime);

    if tstep == 0 {
      sink.finish(self.periods)?;
      self.state = SimulationState::Finished;
      info!("Quality simulation finished with {} reporting periods", self.periods);
      return Ok(false);
    }
    Ok(true)
  }

  /// Run the whole simulation on hydraulic solutions from `source`
  pub fn simulate<H, K>(&mut self, source: &mut H, sink: &mut K) -> Result<usize>
  where
    H: HydraulicSource + ?Sized,
    K: QualitySink + ?Sized,
  {
    loop {
      let step = source.step_at(self.htime)?;
      if !self.step(&step, sink)? {
        break;
      }
    }
    Ok(self.periods)
  }
}
