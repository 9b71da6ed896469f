use serde::Serialize;

use crate::model::pattern::Pattern;
use crate::model::source::SourceType;
use crate::model::tank::MixModel;
use crate::quality::segment::Segments;

/// Water quality source with its pattern resolved
#[derive(Debug, Clone)]
pub struct NodeSource {
  pub source_type: SourceType,
  pub strength: f64,
  pub pattern: Option<Pattern>,
}

/// Quality state of a node
#[derive(Debug, Clone, Default)]
pub struct QualityNode {
  pub quality: f64,
  /// Quality the node starts with (and reservoirs are held at)
  pub initial_quality: f64,
  /// Demand (cfs) of the current hydraulic step; tanks: net inflow, positive when filling
  pub demand: f64,
  pub is_tank: bool,
  pub source: Option<NodeSource>,

  // accumulators of the current quality step
  pub volume_in: f64,
  pub mass_in: f64,
  pub source_contribution: f64,
  /// Source mass added over the current hydraulic step, per second after the step ends
  pub mass_rate: f64,
}

/// Quality state of a link
#[derive(Debug, Clone, Default)]
pub struct QualityLink {
  pub start: usize,
  pub end: usize,
  pub flow: f64,
  /// true when flow runs from the start to the end node
  pub flow_dir: bool,
  pub segments: Segments,

  pub volume: f64,
  pub diameter: f64,
  pub length: f64,
  pub kb: f64,
  pub kw: f64,
  /// Wall rate coefficient for the current flow
  pub wall_coeff: f64,
  /// Reaction rate (mass/L/day) over the last quality step
  pub reaction_rate: f64,
}

impl QualityLink {
  pub fn upstream(&self) -> usize {
    if self.flow_dir { self.start } else { self.end }
  }

  pub fn downstream(&self) -> usize {
    if self.flow_dir { self.end } else { self.start }
  }
}

/// Quality state of a tank or reservoir
#[derive(Debug, Clone)]
pub struct QualityTank {
  /// Index of the tank's node
  pub node: usize,
  /// Cross-sectional area, 0 for reservoirs
  pub area: f64,
  pub v1max: f64,
  pub mix_model: MixModel,
  pub bulk_coeff: f64,

  pub initial_volume: f64,
  pub initial_quality: f64,
  pub volume: f64,
  pub concentration: f64,
  pub segments: Segments,
}

impl QualityTank {
  pub fn is_reservoir(&self) -> bool {
    self.area == 0.0
  }
}

/// Cumulative reaction and source mass of a simulation
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReactionStatistics {
  /// Mass reacted in the bulk flow of pipes
  pub bulk: f64,
  /// Mass reacted at pipe walls
  pub wall: f64,
  /// Mass reacted in tanks
  pub tank: f64,
  /// Mass added by sources and reservoir outflow
  pub source: f64,
}
