#![allow(dead_code)]

use epanet_wq::error::Result;
use epanet_wq::hydraulics::snapshot::HydraulicStep;
use epanet_wq::hydraulics::HydraulicSolver;
use epanet_wq::model::link::{Link, LinkType};
use epanet_wq::model::network::Network;
use epanet_wq::model::node::Node;
use epanet_wq::model::options::QualityType;
use epanet_wq::model::pipe::Pipe;

/// 500 gpm in cfs
pub const FLOW: f64 = 500.0 / 448.831;

/// Volume of a 1000 ft pipe of 12 in
pub fn pipe_volume() -> f64 {
  std::f64::consts::PI / 4.0 * 1000.0
}

pub fn pipe(id: &str, start: &str, end: &str, length: f64, diameter: f64) -> Link {
  Link::new(id, start, end, LinkType::Pipe(Pipe::new(length, diameter, 100.0)))
}

/// Reservoir R at quality 10 feeding junction J through a 1000 ft, 12 in pipe P
pub fn single_pipe_network(quality_type: QualityType) -> Network {
  single_pipe_network_with(quality_type, pipe("P", "R", "J", 1000.0, 1.0))
}

/// Single pipe network with a custom link from R to J
pub fn single_pipe_network_with(quality_type: QualityType, link: Link) -> Network {
  let mut network = Network::default();
  network.options.quality.quality_type = quality_type;
  network.options.duration = 3600;
  network.options.hydraulic_step = 3600;
  network.options.quality_step = 60;
  network.options.report_step = 3600;

  network.add_node(Node::reservoir("R", 100.0).with_quality(10.0)).unwrap();
  network.add_node(Node::junction("J", 0.0, FLOW)).unwrap();
  network.add_link(link).unwrap();
  network.prepare().unwrap();
  network
}

/// Hydraulic solution of the single pipe network with a constant flow from R to J
pub fn single_pipe_step(time: i64, step: i64) -> HydraulicStep {
  let mut snapshot = HydraulicStep::new(time, step, 2, 1);
  snapshot.demands = vec![-FLOW, FLOW];
  snapshot.heads = vec![100.0, 90.0];
  snapshot.flows = vec![FLOW];
  snapshot
}

/// Solver returning fixed demands and flows, with tanks at the heads it is given
pub struct FixedSolver {
  pub demands: Vec<f64>,
  pub flows: Vec<f64>,
  pub calls: usize,
}

impl FixedSolver {
  pub fn new(demands: Vec<f64>, flows: Vec<f64>) -> Self {
    Self { demands, flows, calls: 0 }
  }
}

impl HydraulicSolver for FixedSolver {
  fn solve(&mut self, network: &Network, time: i64, tank_heads: &[(usize, f64)]) -> Result<HydraulicStep> {
    self.calls += 1;
    let mut step = HydraulicStep::new(time, 0, network.nodes.len(), network.links.len());
    step.demands = self.demands.clone();
    step.flows = self.flows.clone();
    for (i, node) in network.nodes.iter().enumerate() {
      step.heads[i] = node.elevation;
    }
    for (node, head) in tank_heads {
      step.heads[*node] = *head;
    }
    Ok(step)
  }
}
