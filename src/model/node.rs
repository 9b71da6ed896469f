use serde::{Deserialize, Serialize};

use crate::model::junction::Junction;
use crate::model::reservoir::Reservoir;
use crate::model::source::Source;
use crate::model::tank::Tank;

/// Node struct
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Node {
  pub id: Box<str>,
  pub node_type: NodeType,
  pub elevation: f64,
  /// Initial water quality
  #[serde(default)]
  pub initial_quality: f64,
  /// Water quality source
  #[serde(default)]
  pub source: Option<Source>,
}

/// Node types
#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum NodeType {
  Reservoir(Reservoir),
  Tank(Tank),
  Junction(Junction),
}

impl Node {
  pub fn junction(id: &str, elevation: f64, basedemand: f64) -> Self {
    Self::new(id, elevation, NodeType::Junction(Junction { basedemand, pattern: None }))
  }

  pub fn reservoir(id: &str, elevation: f64) -> Self {
    Self::new(id, elevation, NodeType::Reservoir(Reservoir::default()))
  }

  pub fn tank(id: &str, elevation: f64, tank: Tank) -> Self {
    Self::new(id, elevation, NodeType::Tank(tank))
  }

  fn new(id: &str, elevation: f64, node_type: NodeType) -> Self {
    Self { id: id.into(), node_type, elevation, initial_quality: 0.0, source: None }
  }

  pub fn with_quality(mut self, quality: f64) -> Self {
    self.initial_quality = quality;
    self
  }

  pub fn with_source(mut self, source: Source) -> Self {
    self.source = Some(source);
    self
  }

  /// Tanks and reservoirs have a fixed head during a hydraulic solve
  pub fn is_fixed(&self) -> bool {
    matches!(self.node_type, NodeType::Reservoir(_) | NodeType::Tank(_))
  }

  pub fn as_tank(&self) -> Option<&Tank> {
    match &self.node_type {
      NodeType::Tank(tank) => Some(tank),
      _ => None,
    }
  }
}
