use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::Serialize;
use rmp_serde::Serializer;
use simplelog::info;

use crate::error::{Result, SimulationError};
use crate::model::network::Network;

/// Serialized network formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFormat {
  Json,
  MessagePack,
}

impl NetworkFormat {
  pub fn from_path(path: &Path) -> Result<Self> {
    match path.extension().and_then(|e| e.to_str()) {
      Some("json") => Ok(NetworkFormat::Json),
      Some("mpk") | Some("msgpack") => Ok(NetworkFormat::MessagePack),
      other => Err(SimulationError::Serialization(format!("Unsupported file extension: {:?}", other))),
    }
  }
}

impl Network {
  /// Read a serialized network and prepare it for simulation
  pub fn read_file(path: impl AsRef<Path>) -> Result<Network> {
    let path = path.as_ref();
    let format = NetworkFormat::from_path(path)?;
    let reader = BufReader::new(File::open(path)?);

    let mut network: Network = match format {
      NetworkFormat::Json => serde_json::from_reader(reader)?,
      NetworkFormat::MessagePack => rmp_serde::from_read(reader)?,
    };
    network.prepare()?;

    info!("Loaded network with {} nodes and {} links from {}", network.nodes.len(), network.links.len(), path.display());
    Ok(network)
  }

  /// Save the network in the format given by the file extension
  pub fn save_network(&self, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = NetworkFormat::from_path(path)?;
    let writer = BufWriter::new(File::create(path)?);

    match format {
      NetworkFormat::Json => serde_json::to_writer_pretty(writer, self)?,
      NetworkFormat::MessagePack => {
        let mut serializer = Serializer::new(writer);
        self.serialize(&mut serializer)?;
      }
    }
    Ok(())
  }
}
