mod common;

use std::io::Cursor;

use approx::assert_abs_diff_eq;

use common::{single_pipe_network, single_pipe_step};
use epanet_wq::error::SimulationError;
use epanet_wq::hydraulics::snapshot::MemorySource;
use epanet_wq::model::network::Network;
use epanet_wq::model::options::QualityType;
use epanet_wq::quality::output::{BinaryQualityWriter, QualityOutput, QualityResults, StatisticKind};
use epanet_wq::quality::QualitySim;

fn simulate_to_file(path: &std::path::Path) -> usize {
  let network = single_pipe_network(QualityType::Chemical);
  let mut sim = QualitySim::new(&network).unwrap();
  let mut source = MemorySource::new(vec![single_pipe_step(0, 3600), single_pipe_step(3600, 0)]);
  let mut writer = BinaryQualityWriter::create(path).unwrap();
  sim.simulate(&mut source, &mut writer).unwrap()
}

#[test]
fn test_binary_output_statistics() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("pipe.out");
  assert_eq!(simulate_to_file(&path), 2);

  let mut output = QualityOutput::read(&path).unwrap();
  assert_eq!((output.node_count, output.link_count, output.periods), (2, 1, 2));

  let (nodes, links) = output.read_period(0).unwrap();
  assert_eq!(nodes, vec![10.0, 0.0]);
  assert_abs_diff_eq!(links[0], 5.0, epsilon = 1e-6);

  // the link goes from 5 to 10
  let average = output.statistics(StatisticKind::Average).unwrap();
  assert_eq!(average.periods, 2);
  assert_abs_diff_eq!(average.links[0], 7.5, epsilon = 1e-5);
  assert_abs_diff_eq!(average.nodes[1], 5.0, epsilon = 1e-5);

  let range = output.statistics(StatisticKind::Range).unwrap();
  assert_abs_diff_eq!(range.links[0], 5.0, epsilon = 1e-5);
  assert_eq!(range.nodes[0], 0.0);

  let maximum = output.statistics(StatisticKind::Maximum).unwrap();
  assert_abs_diff_eq!(maximum.nodes[1], 10.0, epsilon = 1e-5);
  let minimum = output.statistics(StatisticKind::Minimum).unwrap();
  assert_eq!(minimum.nodes[1], 0.0);

  let results = output.to_results().unwrap();
  assert_eq!(results.periods(), 2);
  assert!(output.read_period(2).is_err());
}

#[test]
fn test_truncated_output_is_rejected() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("pipe.out");
  simulate_to_file(&path);

  // drop a value from the last period, keep the trailing period count
  let bytes = std::fs::read(&path).unwrap();
  let mut truncated = bytes[..bytes.len() - 8].to_vec();
  truncated.extend_from_slice(&bytes[bytes.len() - 4..]);
  std::fs::write(&path, truncated).unwrap();

  match QualityOutput::read(&path) {
    Err(SimulationError::InvalidOutputFile(_)) => {}
    other => panic!("expected an invalid output file, got {:?}", other.err().map(|e| e.to_string())),
  }

  std::fs::write(&path, [0u8; 6]).unwrap();
  assert!(QualityOutput::read(&path).is_err());
}

#[test]
fn test_statistic_names() {
  assert_eq!("avg".parse::<StatisticKind>().unwrap(), StatisticKind::Average);
  assert_eq!("Maximum".parse::<StatisticKind>().unwrap(), StatisticKind::Maximum);
  assert_eq!("range".parse::<StatisticKind>().unwrap(), StatisticKind::Range);
  assert!("median".parse::<StatisticKind>().is_err());
}

#[test]
fn test_results_written_as_json() {
  let network = single_pipe_network(QualityType::Chemical);
  let mut sim = QualitySim::new(&network).unwrap();
  let mut source = MemorySource::new(vec![single_pipe_step(0, 3600), single_pipe_step(3600, 0)]);
  let mut results = QualityResults::default();
  sim.simulate(&mut source, &mut results).unwrap();

  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("results.json");
  network.write_results(&results, Some(sim.statistics()), &path).unwrap();

  let json: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
  assert_eq!(json["nodes"], serde_json::json!(["R", "J"]));
  assert_eq!(json["links"], serde_json::json!(["P"]));
  assert_eq!(json["times"], serde_json::json!([0, 3600]));
  assert_eq!(json["link_quality"][0][0], serde_json::json!(5.0));
  assert_eq!(json["node_quality"][1][1], serde_json::json!(10.0));
  assert!(json["reactions"]["source"].as_f64().unwrap() > 0.0);

  // the extension picks the format
  let path = dir.path().join("results.mpk");
  network.write_results(&results, None, &path).unwrap();
  assert!(std::fs::metadata(&path).unwrap().len() > 0);
  assert!(network.write_results(&results, None, dir.path().join("results.txt")).is_err());
}

#[test]
fn test_network_round_trip() {
  let network = single_pipe_network(QualityType::Chemical);
  let dir = tempfile::tempdir().unwrap();

  for name in ["net.json", "net.mpk"] {
    let path = dir.path().join(name);
    network.save_network(&path).unwrap();
    let loaded = Network::read_file(&path).unwrap();

    assert_eq!(loaded.nodes.len(), 2);
    assert_eq!(loaded.links.len(), 1);
    assert_eq!(loaded.node_index("J"), Some(1));
    assert_eq!(loaded.link_index("P"), Some(0));
    assert_eq!(loaded.links[0].end_node, 1);
    assert_eq!(loaded.nodes[0].initial_quality, 10.0);
    assert_eq!(loaded.options.quality.quality_type, QualityType::Chemical);
    assert_eq!(loaded.options.quality_step, 60);
  }
}

#[test]
fn test_output_in_memory() {
  let network = single_pipe_network(QualityType::Age);
  let mut sim = QualitySim::new(&network).unwrap();
  let mut source = MemorySource::new(vec![single_pipe_step(0, 3600), single_pipe_step(3600, 0)]);
  let mut writer = BinaryQualityWriter::new(Vec::new());
  sim.simulate(&mut source, &mut writer).unwrap();

  let bytes = writer.into_inner();
  // header, two periods of two nodes and a link, trailing count
  assert_eq!(bytes.len(), 8 + 2 * 3 * 4 + 4);

  let mut output = QualityOutput::new(Cursor::new(bytes)).unwrap();
  let (nodes, _) = output.read_period(1).unwrap();
  assert!(nodes[1] > 0.0);
}
