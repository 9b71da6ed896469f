use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use rmp_serde::Serializer;

use crate::error::Result;
use crate::input::NetworkFormat;
use crate::model::network::Network;
use crate::quality::output::QualityResults;
use crate::quality::state::ReactionStatistics;

#[derive(Serialize)]
struct ResultsOutput<'a> {
  nodes: Vec<&'a str>,
  links: Vec<&'a str>,
  times: &'a [i64],
  node_quality: Vec<Vec<f64>>,
  link_quality: Vec<Vec<f64>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  reactions: Option<ReactionStatistics>,
}

const DIGITS: usize = 3;

// helper function to round to a given number of digits (prevent JSON file bloat due to floating point precision)
fn round_to_digits(value: f64, digits: usize) -> f64 {
  let factor = 10.0_f64.powi(digits as i32);
  (value * factor).round() / factor
}

fn round_all(periods: &[Vec<f64>]) -> Vec<Vec<f64>> {
  periods.iter().map(|p| p.iter().map(|v| round_to_digits(*v, DIGITS)).collect()).collect()
}

impl Network {
  /// Write quality results as JSON or MessagePack, chosen by the file extension
  pub fn write_results(&self, results: &QualityResults, reactions: Option<ReactionStatistics>, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = NetworkFormat::from_path(path)?;
    let writer = BufWriter::new(File::create(path)?);

    let output = ResultsOutput {
      nodes: self.nodes.iter().map(|n| &*n.id).collect(),
      links: self.links.iter().map(|l| &*l.id).collect(),
      times: &results.times,
      node_quality: round_all(&results.nodes),
      link_quality: round_all(&results.links),
      reactions,
    };

    match format {
      NetworkFormat::Json => serde_json::to_writer(writer, &output)?,
      NetworkFormat::MessagePack => {
        let mut serializer = Serializer::new(writer);
        output.serialize(&mut serializer)?;
      }
    }
    Ok(())
  }
}
