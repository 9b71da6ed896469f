mod common;

use approx::{assert_abs_diff_eq, assert_relative_eq};

use common::{pipe, FLOW};
use epanet_wq::hydraulics::snapshot::{HydraulicStep, MemorySource};
use epanet_wq::model::network::Network;
use epanet_wq::model::node::Node;
use epanet_wq::model::options::QualityType;
use epanet_wq::model::pattern::Pattern;
use epanet_wq::model::source::{Source, SourceType};
use epanet_wq::model::tank::Tank;
use epanet_wq::quality::output::QualityResults;
use epanet_wq::quality::QualitySim;

/// Reservoir R feeding junction K through J: R -P1- J -P2- K
fn source_network(reservoir_quality: f64, source: Option<Source>) -> Network {
  let mut network = Network::default();
  network.options.quality.quality_type = QualityType::Chemical;
  network.options.duration = 3600;
  network.options.quality_step = 60;

  network.add_node(Node::reservoir("R", 100.0).with_quality(reservoir_quality)).unwrap();
  let junction = Node::junction("J", 0.0, 0.0);
  network.add_node(match source {
    Some(source) => junction.with_source(source),
    None => junction,
  }).unwrap();
  network.add_node(Node::junction("K", 0.0, FLOW)).unwrap();
  network.add_link(pipe("P1", "R", "J", 1000.0, 1.0)).unwrap();
  network.add_link(pipe("P2", "J", "K", 1000.0, 1.0)).unwrap();
  network.add_pattern(Pattern::new("TRIPLE", vec![3.0]));
  network.prepare().unwrap();
  network
}

fn step(time: i64, step: i64) -> HydraulicStep {
  let mut snapshot = HydraulicStep::new(time, step, 3, 2);
  snapshot.demands = vec![-FLOW, 0.0, FLOW];
  snapshot.heads = vec![100.0, 95.0, 90.0];
  snapshot.flows = vec![FLOW, FLOW];
  snapshot
}

/// Run one hour and return the simulation at its end
fn run(network: &Network) -> QualitySim {
  let mut sim = QualitySim::new(network).unwrap();
  let mut source = MemorySource::new(vec![step(0, 3600), step(3600, 0)]);
  let mut results = QualityResults::default();
  sim.simulate(&mut source, &mut results).unwrap();
  sim
}

#[test]
fn test_source_strength_units_and_pattern() {
  let network = source_network(0.0, Some(Source::new(SourceType::Mass, 120.0)));
  let sim = QualitySim::new(&network).unwrap();
  let source = sim.node(1).source.clone().unwrap();
  // mass/min to mass/s
  assert_relative_eq!(sim.source_quality(&source), 2.0);

  let network = source_network(0.0, Some(Source::new(SourceType::Mass, 120.0).with_pattern("TRIPLE")));
  let sim = QualitySim::new(&network).unwrap();
  let source = sim.node(1).source.clone().unwrap();
  assert_relative_eq!(sim.source_quality(&source), 6.0);

  let network = source_network(0.0, Some(Source::new(SourceType::Concentration, 4.0).with_pattern("TRIPLE")));
  let sim = QualitySim::new(&network).unwrap();
  let source = sim.node(1).source.clone().unwrap();
  assert_relative_eq!(sim.source_quality(&source), 12.0);
}

#[test]
fn test_flow_paced_source_adds_to_passing_water() {
  let network = source_network(10.0, Some(Source::new(SourceType::FlowPaced, 5.0)));
  let sim = run(&network);

  assert_abs_diff_eq!(sim.node_quality(1), 15.0, epsilon = 1e-6);
  assert_abs_diff_eq!(sim.node_quality(2), 15.0, epsilon = 1e-6);
  assert_abs_diff_eq!(sim.link_quality(1), 15.0, epsilon = 1e-6);
  assert!(sim.statistics().source > 0.0);
}

#[test]
fn test_setpoint_source_only_boosts() {
  let boosted = run(&source_network(10.0, Some(Source::new(SourceType::Setpoint, 12.0))));
  assert_abs_diff_eq!(boosted.node_quality(2), 12.0, epsilon = 1e-6);

  let idle = run(&source_network(10.0, Some(Source::new(SourceType::Setpoint, 8.0))));
  assert_abs_diff_eq!(idle.node_quality(2), 10.0, epsilon = 1e-6);
}

#[test]
fn test_mass_source_dilutes_into_flow() {
  let sim = run(&source_network(0.0, Some(Source::new(SourceType::Mass, 120.0))));

  // 2 mass/s into FLOW cfs
  assert_abs_diff_eq!(sim.node_quality(2), 2.0 / FLOW, epsilon = 1e-6);
  // mass injected over the hour
  assert_relative_eq!(sim.statistics().source, 2.0 * 3600.0, max_relative = 1e-9);
  assert_relative_eq!(sim.node(1).mass_rate, 2.0, max_relative = 1e-9);
}

#[test]
fn test_concentration_source_needs_external_inflow() {
  // J has no external inflow, so the source does nothing
  let sim = run(&source_network(10.0, Some(Source::new(SourceType::Concentration, 50.0))));
  assert_abs_diff_eq!(sim.node_quality(2), 10.0, epsilon = 1e-6);
  assert_eq!(sim.node(1).mass_rate, 0.0);
}

#[test]
fn test_reservoir_outflow_counts_as_source_mass() {
  let sim = run(&source_network(10.0, None));
  assert_relative_eq!(sim.statistics().source, 10.0 * FLOW * 3600.0, max_relative = 1e-9);
  assert_eq!(sim.node_quality(0), 10.0);
}

#[test]
fn test_concentration_source_on_external_inflow() {
  // R -P1- J -P2- K, with FLOW entering the network at J
  let mut network = Network::default();
  network.options.quality.quality_type = QualityType::Chemical;
  network.options.duration = 3600;
  network.options.quality_step = 60;
  network.add_node(Node::reservoir("R", 100.0).with_quality(10.0)).unwrap();
  network.add_node(Node::junction("J", 0.0, -FLOW).with_source(Source::new(SourceType::Concentration, 50.0))).unwrap();
  network.add_node(Node::junction("K", 0.0, 2.0 * FLOW)).unwrap();
  network.add_link(pipe("P1", "R", "J", 1000.0, 1.0)).unwrap();
  network.add_link(pipe("P2", "J", "K", 1000.0, 1.0)).unwrap();
  network.prepare().unwrap();

  let inflow_step = |time, step| {
    let mut snapshot = HydraulicStep::new(time, step, 3, 2);
    snapshot.demands = vec![-FLOW, -FLOW, 2.0 * FLOW];
    snapshot.heads = vec![100.0, 95.0, 90.0];
    snapshot.flows = vec![FLOW, 2.0 * FLOW];
    snapshot
  };
  let mut sim = QualitySim::new(&network).unwrap();
  let mut source = MemorySource::new(vec![inflow_step(0, 3600), inflow_step(3600, 0)]);
  sim.simulate(&mut source, &mut QualityResults::default()).unwrap();

  // the injected flow carries 50, the pipe flow 10
  assert_abs_diff_eq!(sim.node_quality(2), 30.0, epsilon = 1e-6);
  assert_abs_diff_eq!(sim.node_quality(1), 30.0, epsilon = 1e-6);
  // -strength * demand per second
  assert_relative_eq!(sim.node(1).mass_rate, 50.0 * FLOW, max_relative = 1e-9);
  assert_relative_eq!(sim.statistics().source, 60.0 * FLOW * 3600.0, max_relative = 1e-9);
}

#[test]
fn test_concentration_source_replaces_draining_tank_quality() {
  // tank T at quality 20 draining into J through P
  let mut network = Network::default();
  network.options.quality.quality_type = QualityType::Chemical;
  network.options.duration = 3600;
  network.options.quality_step = 60;
  let tank = Node::tank("T", 0.0, Tank::new(5.0, 0.0, 10.0, 50.0))
    .with_quality(20.0)
    .with_source(Source::new(SourceType::Concentration, 50.0));
  network.add_node(tank).unwrap();
  network.add_node(Node::junction("J", 0.0, FLOW)).unwrap();
  network.add_link(pipe("P", "T", "J", 1000.0, 1.0)).unwrap();
  network.prepare().unwrap();

  let draining_step = |time, step| {
    let mut snapshot = HydraulicStep::new(time, step, 2, 1);
    snapshot.demands = vec![-FLOW, FLOW];
    snapshot.heads = vec![5.0, 0.0];
    snapshot.flows = vec![FLOW];
    snapshot
  };
  let mut sim = QualitySim::new(&network).unwrap();
  let mut source = MemorySource::new(vec![draining_step(0, 3600), draining_step(3600, 0)]);
  sim.simulate(&mut source, &mut QualityResults::default()).unwrap();

  // the tank water is replaced by the source water, not added to it
  assert_abs_diff_eq!(sim.node_quality(1), 50.0, epsilon = 1e-6);
  // the tank itself keeps its mixed concentration
  assert_abs_diff_eq!(sim.node_quality(0), 20.0, epsilon = 1e-9);
  assert_relative_eq!(sim.node(0).mass_rate, 50.0 * FLOW, max_relative = 1e-9);
}
