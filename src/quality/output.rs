use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use simplelog::{debug, warn};

use crate::error::{Result, SimulationError};
use crate::hydraulics::file::{read_f32s, read_i32};

/// Receives the node and link qualities of every reporting period
pub trait QualitySink {
  fn start(&mut self, node_count: usize, link_count: usize) -> Result<()>;
  fn save_period(&mut self, time: i64, nodes: &[f64], links: &[f64]) -> Result<()>;
  fn finish(&mut self, periods: usize) -> Result<()>;
}

/// Writes reporting periods in the binary quality output format:
/// node and link count, one f32 per node and link for every period, and the period count.
pub struct BinaryQualityWriter<W: Write> {
  writer: W,
}

impl BinaryQualityWriter<BufWriter<File>> {
  pub fn create(path: impl AsRef<Path>) -> Result<Self> {
    Ok(Self::new(BufWriter::new(File::create(path)?)))
  }
}

impl<W: Write> BinaryQualityWriter<W> {
  pub fn new(writer: W) -> Self {
    Self { writer }
  }

  pub fn into_inner(self) -> W {
    self.writer
  }
}

impl<W: Write> QualitySink for BinaryQualityWriter<W> {
  fn start(&mut self, node_count: usize, link_count: usize) -> Result<()> {
    self.writer.write_all(&(node_count as i32).to_le_bytes())?;
    self.writer.write_all(&(link_count as i32).to_le_bytes())?;
    Ok(())
  }

  fn save_period(&mut self, _time: i64, nodes: &[f64], links: &[f64]) -> Result<()> {
    for v in nodes.iter().chain(links.iter()) {
      self.writer.write_all(&(*v as f32).to_le_bytes())?;
    }
    Ok(())
  }

  fn finish(&mut self, periods: usize) -> Result<()> {
    self.writer.write_all(&(periods as i32).to_le_bytes())?;
    self.writer.flush()?;
    Ok(())
  }
}

/// Quality results of all reporting periods kept in memory
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct QualityResults {
  pub times: Vec<i64>,
  /// Node qualities per period
  pub nodes: Vec<Vec<f64>>,
  /// Link qualities per period
  pub links: Vec<Vec<f64>>,
}

impl QualityResults {
  pub fn periods(&self) -> usize {
    self.nodes.len()
  }
}

impl QualitySink for QualityResults {
  fn start(&mut self, _node_count: usize, _link_count: usize) -> Result<()> {
    self.times.clear();
    self.nodes.clear();
    self.links.clear();
    Ok(())
  }

  fn save_period(&mut self, time: i64, nodes: &[f64], links: &[f64]) -> Result<()> {
    self.times.push(time);
    self.nodes.push(nodes.to_vec());
    self.links.push(links.to_vec());
    Ok(())
  }

  fn finish(&mut self, periods: usize) -> Result<()> {
    if periods != self.nodes.len() {
      return Err(SimulationError::SizeMismatch { what: "reporting periods", expected: periods, found: self.nodes.len() });
    }
    Ok(())
  }
}

/// Statistic of quality values over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum StatisticKind {
  Average,
  Minimum,
  Maximum,
  Range,
}

impl FromStr for StatisticKind {
  type Err = String;
  fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
    match s.to_uppercase().as_str() {
      "AVERAGE" | "AVG" => Ok(StatisticKind::Average),
      "MINIMUM" | "MIN" => Ok(StatisticKind::Minimum),
      "MAXIMUM" | "MAX" => Ok(StatisticKind::Maximum),
      "RANGE" => Ok(StatisticKind::Range),
      _ => Err(format!("Invalid statistic: {}", s)),
    }
  }
}

/// Time statistic of every node and link
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeStatistics {
  pub kind: StatisticKind,
  /// Number of periods the statistic was computed over
  pub periods: usize,
  pub nodes: Vec<f64>,
  pub links: Vec<f64>,
}

#[derive(Debug, Clone)]
struct Accumulator {
  sum: Vec<f64>,
  min: Vec<f64>,
  max: Vec<f64>,
}

impl Accumulator {
  fn new(n: usize) -> Self {
    Self { sum: vec![0.0; n], min: vec![f64::INFINITY; n], max: vec![f64::NEG_INFINITY; n] }
  }

  fn add(&mut self, values: &[f64]) {
    for (i, v) in values.iter().enumerate() {
      self.sum[i] += v;
      self.min[i] = self.min[i].min(*v);
      self.max[i] = self.max[i].max(*v);
    }
  }

  fn result(&self, kind: StatisticKind, periods: usize) -> Vec<f64> {
    if periods == 0 {
      return vec![0.0; self.sum.len()];
    }
    match kind {
      StatisticKind::Average => self.sum.iter().map(|s| s / periods as f64).collect(),
      StatisticKind::Minimum => self.min.clone(),
      StatisticKind::Maximum => self.max.clone(),
      StatisticKind::Range => self.max.iter().zip(self.min.iter()).map(|(a, b)| a - b).collect(),
    }
  }
}

/// Reader for binary quality output
pub struct QualityOutput<R: Read + Seek> {
  reader: R,
  pub node_count: usize,
  pub link_count: usize,
  pub periods: usize,
}

impl QualityOutput<BufReader<File>> {
  pub fn read(path: impl AsRef<Path>) -> Result<Self> {
    Self::new(BufReader::new(File::open(path)?))
  }
}

impl<R: Read + Seek> QualityOutput<R> {
  pub fn new(mut reader: R) -> Result<Self> {
    let length = reader.seek(SeekFrom::End(0))?;
    if length < 12 {
      return Err(SimulationError::InvalidOutputFile("file too short".to_string()));
    }

    reader.seek(SeekFrom::Start(0))?;
    let node_count = read_i32(&mut reader)?;
    let link_count = read_i32(&mut reader)?;
    reader.seek(SeekFrom::End(-4))?;
    let periods = read_i32(&mut reader)?;
    if node_count < 0 || link_count < 0 || periods < 0 {
      return Err(SimulationError::InvalidOutputFile("negative count in header".to_string()));
    }

    let (node_count, link_count, periods) = (node_count as usize, link_count as usize, periods as usize);
    let expected = 12 + 4 * (node_count + link_count) as u64 * periods as u64;
    if expected != length {
      return Err(SimulationError::InvalidOutputFile(format!(
        "{} periods of {} nodes and {} links need {} bytes, file has {}",
        periods, node_count, link_count, expected, length
      )));
    }

    debug!("Opened quality output with {} periods", periods);
    Ok(Self { reader, node_count, link_count, periods })
  }

  /// Node and link qualities of reporting period `period`
  pub fn read_period(&mut self, period: usize) -> Result<(Vec<f64>, Vec<f64>)> {
    if period >= self.periods {
      return Err(SimulationError::InvalidOutputFile(format!("period {} out of range", period)));
    }
    let offset = 8 + 4 * (self.node_count + self.link_count) as u64 * period as u64;
    self.reader.seek(SeekFrom::Start(offset))?;
    let nodes = read_f32s(&mut self.reader, self.node_count)?;
    let links = read_f32s(&mut self.reader, self.link_count)?;
    Ok((nodes, links))
  }

  /// Statistic of every node and link over all periods.
  /// Periods that cannot be read are left out.
  pub fn statistics(&mut self, kind: StatisticKind) -> Result<TimeStatistics> {
    let mut nodes = Accumulator::new(self.node_count);
    let mut links = Accumulator::new(self.link_count);
    let mut used = 0;

    for period in 0..self.periods {
      match self.read_period(period) {
        Ok((n, l)) => {
          nodes.add(&n);
          links.add(&l);
          used += 1;
        }
        Err(e) => warn!("Skipping quality period {}: {}", period, e),
      }
    }

    Ok(TimeStatistics {
      kind,
      periods: used,
      nodes: nodes.result(kind, used),
      links: links.result(kind, used),
    })
  }

  /// Read all periods into memory. Times are not stored in the file and are left empty.
  pub fn to_results(&mut self) -> Result<QualityResults> {
    let mut results = QualityResults::default();
    for period in 0..self.periods {
      let (n, l) = self.read_period(period)?;
      results.nodes.push(n);
      results.links.push(l);
    }
    Ok(results)
  }
}
