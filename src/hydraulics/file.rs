use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use simplelog::debug;

use crate::error::{Result, SimulationError};
use crate::hydraulics::snapshot::{HydraulicSource, HydraulicStep};
use crate::model::link::LinkStatus;

/// Identifies a persisted hydraulic solution ("HYDW")
pub const HYDRAULICS_MAGIC: i32 = 0x5748_5944;

const HEADER_SIZE: u64 = 12;

fn record_size(node_count: usize, link_count: usize) -> u64 {
  // time, step, then demand + head per node and flow + status per link
  4 * (2 + 2 * node_count as u64 + 2 * link_count as u64)
}

/// Writes hydraulic solutions as fixed-size little-endian records
pub struct HydraulicFileWriter<W: Write> {
  writer: W,
  node_count: usize,
  link_count: usize,
  records: usize,
}

impl HydraulicFileWriter<BufWriter<File>> {
  pub fn create(path: impl AsRef<Path>, node_count: usize, link_count: usize) -> Result<Self> {
    let file = File::create(path)?;
    Self::new(BufWriter::new(file), node_count, link_count)
  }
}

impl<W: Write> HydraulicFileWriter<W> {
  pub fn new(mut writer: W, node_count: usize, link_count: usize) -> Result<Self> {
    writer.write_all(&HYDRAULICS_MAGIC.to_le_bytes())?;
    writer.write_all(&(node_count as i32).to_le_bytes())?;
    writer.write_all(&(link_count as i32).to_le_bytes())?;
    Ok(Self { writer, node_count, link_count, records: 0 })
  }

  pub fn write_step(&mut self, step: &HydraulicStep) -> Result<()> {
    step.check_sizes(self.node_count, self.link_count)?;

    let w = &mut self.writer;
    w.write_all(&(step.time as i32).to_le_bytes())?;
    w.write_all(&(step.step as i32).to_le_bytes())?;
    for values in [&step.demands, &step.heads, &step.flows] {
      for v in values.iter() {
        w.write_all(&(*v as f32).to_le_bytes())?;
      }
    }
    for status in step.statuses.iter() {
      w.write_all(&(status.code() as f32).to_le_bytes())?;
    }
    self.records += 1;
    Ok(())
  }

  /// Flush the records and hand back the underlying writer
  pub fn finish(mut self) -> Result<W> {
    self.writer.flush()?;
    debug!("Wrote {} hydraulic records", self.records);
    Ok(self.writer)
  }
}

/// Random access reader for a persisted hydraulic solution
pub struct HydraulicFile<R: Read + Seek> {
  reader: R,
  pub node_count: usize,
  pub link_count: usize,
  /// Start time of every record, in file order
  times: Vec<i64>,
}

impl HydraulicFile<BufReader<File>> {
  pub fn open(path: impl AsRef<Path>) -> Result<Self> {
    let file = File::open(path)?;
    Self::new(BufReader::new(file))
  }
}

impl<R: Read + Seek> HydraulicFile<R> {
  pub fn new(mut reader: R) -> Result<Self> {
    reader.seek(SeekFrom::Start(0))?;
    let magic = read_i32(&mut reader)?;
    if magic != HYDRAULICS_MAGIC {
      return Err(SimulationError::InvalidHydraulicFile("not a hydraulics file".to_string()));
    }
    let node_count = read_i32(&mut reader)?;
    let link_count = read_i32(&mut reader)?;
    if node_count < 0 || link_count < 0 {
      return Err(SimulationError::InvalidHydraulicFile("negative element count".to_string()));
    }
    let (node_count, link_count) = (node_count as usize, link_count as usize);

    let size = record_size(node_count, link_count);
    let length = reader.seek(SeekFrom::End(0))?;
    let records = (length.saturating_sub(HEADER_SIZE)) / size;
    if records == 0 {
      return Err(SimulationError::InvalidHydraulicFile("file holds no hydraulic records".to_string()));
    }

    // index record times
    let mut times = Vec::with_capacity(records as usize);
    for k in 0..records {
      reader.seek(SeekFrom::Start(HEADER_SIZE + k * size))?;
      let time = read_i32(&mut reader)? as i64;
      if times.last().is_some_and(|&t| time < t) {
        return Err(SimulationError::InvalidHydraulicFile(format!("record {} goes back in time", k)));
      }
      times.push(time);
    }

    debug!("Indexed {} hydraulic records for {} nodes and {} links", records, node_count, link_count);
    Ok(Self { reader, node_count, link_count, times })
  }

  pub fn len(&self) -> usize {
    self.times.len()
  }

  pub fn is_empty(&self) -> bool {
    self.times.is_empty()
  }

  /// Read the record at position `index`
  pub fn read_record(&mut self, index: usize) -> Result<HydraulicStep> {
    let offset = HEADER_SIZE + index as u64 * record_size(self.node_count, self.link_count);
    self.reader.seek(SeekFrom::Start(offset))?;

    let r = &mut self.reader;
    let time = read_i32(r)? as i64;
    let step = read_i32(r)? as i64;
    let demands = read_f32s(r, self.node_count)?;
    let heads = read_f32s(r, self.node_count)?;
    let flows = read_f32s(r, self.link_count)?;
    let statuses = read_f32s(r, self.link_count)?
      .into_iter()
      .map(|code| {
        LinkStatus::from_code(code as u8)
          .ok_or_else(|| SimulationError::InvalidHydraulicFile(format!("invalid link status code {}", code)))
      })
      .collect::<Result<Vec<_>>>()?;

    Ok(HydraulicStep { time, step, demands, heads, flows, statuses })
  }
}

impl<R: Read + Seek> HydraulicSource for HydraulicFile<R> {
  fn step_at(&mut self, time: i64) -> Result<HydraulicStep> {
    let index = self.times.partition_point(|&t| t <= time);
    if index == 0 {
      return Err(SimulationError::InvalidHydraulicFile(format!("no hydraulic record at time {}", time)));
    }

    let record = self.read_record(index - 1)?;
    let step = if record.step > 0 { (record.time + record.step - time).max(0) } else { 0 };
    Ok(HydraulicStep { time, step, ..record })
  }
}

pub(crate) fn read_i32<R: Read>(reader: &mut R) -> Result<i32> {
  let mut buf = [0u8; 4];
  reader.read_exact(&mut buf)?;
  Ok(i32::from_le_bytes(buf))
}

pub(crate) fn read_f32s<R: Read>(reader: &mut R, count: usize) -> Result<Vec<f64>> {
  let mut buf = vec![0u8; 4 * count];
  reader.read_exact(&mut buf)?;
  Ok(buf.chunks_exact(4).map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]) as f64).collect())
}
