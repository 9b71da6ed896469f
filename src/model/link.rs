use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::model::pipe::Pipe;
use crate::model::pump::Pump;
use crate::model::valve::Valve;

#[derive(Debug, Clone, Deserialize, Serialize)]
/// Link struct
pub struct Link {
  /// Link ID
  pub id: Box<str>,
  /// Link type (pipe, pump, valve)
  pub link_type: LinkType,
  /// Start node ID
  pub start_node_id: Box<str>,
  /// End node ID
  pub end_node_id: Box<str>,
  /// Initial status (open, closed, active)
  pub initial_status: LinkStatus,
  /// Bulk reaction coefficient (1/s)
  #[serde(default)]
  pub bulk_coeff: f64,
  /// Wall reaction coefficient (ft/s for first order, mass/ft^2/s for zero order)
  #[serde(default)]
  pub wall_coeff: f64,

  /// Cached start and end node indices to avoid looking up the node map every time
  #[serde(skip)]
  pub start_node: usize,
  #[serde(skip)]
  pub end_node: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub enum LinkType {
    Pipe(Pipe),
    Pump(Pump),
    Valve(Valve)
}

// Source: EPANET 2.3 types.h
// Variants are ordered so that every status up to `Closed` means "no flow".
#[derive(PartialEq, Eq, PartialOrd, Ord, Debug, Clone, Copy, Deserialize, Serialize)]
pub enum LinkStatus {
  Xhead,         // pump cannot deliver head (closed)
  TempClosed,    // temporarily closed
  Closed,        // closed
  Open,          // open
  Active,        // valve active (partially open)
  Xflow,         // pump exceeds maximum flow
  XFCV,          // FCV cannot supply flow
  XPressure,     // valve cannot supply pressure
  Filling,       // tank filling
  Emptying,      // tank emptying
  Overflowing    // tank overflowing
}

const STATUSES: [LinkStatus; 11] = [
  LinkStatus::Xhead,
  LinkStatus::TempClosed,
  LinkStatus::Closed,
  LinkStatus::Open,
  LinkStatus::Active,
  LinkStatus::Xflow,
  LinkStatus::XFCV,
  LinkStatus::XPressure,
  LinkStatus::Filling,
  LinkStatus::Emptying,
  LinkStatus::Overflowing,
];

impl LinkStatus {
  pub fn is_closed(&self) -> bool {
    *self <= LinkStatus::Closed
  }

  /// Numeric code used in binary hydraulics files
  pub fn code(&self) -> u8 {
    *self as u8
  }

  pub fn from_code(code: u8) -> Option<LinkStatus> {
    STATUSES.get(code as usize).copied()
  }
}

/// Inverse headloss gradient and flow correction of a link, as used by a gradient solver
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkCoefficients {
  pub g_inv: f64,
  pub y: f64,
}

impl LinkCoefficients {
  pub fn simple(g_inv: f64, y: f64) -> Self {
    Self { g_inv, y }
  }
}

impl Link {
  pub fn new(id: &str, start_node_id: &str, end_node_id: &str, link_type: LinkType) -> Self {
    Self {
      id: id.into(),
      link_type,
      start_node_id: start_node_id.into(),
      end_node_id: end_node_id.into(),
      initial_status: LinkStatus::Open,
      bulk_coeff: 0.0,
      wall_coeff: 0.0,
      start_node: 0,
      end_node: 0,
    }
  }

  pub fn with_reactions(mut self, bulk_coeff: f64, wall_coeff: f64) -> Self {
    self.bulk_coeff = bulk_coeff;
    self.wall_coeff = wall_coeff;
    self
  }

  pub fn with_status(mut self, status: LinkStatus) -> Self {
    self.initial_status = status;
    self
  }

  pub fn is_pipe(&self) -> bool {
    matches!(self.link_type, LinkType::Pipe(_))
  }

  pub fn as_pump(&self) -> Option<&Pump> {
    match &self.link_type {
      LinkType::Pump(pump) => Some(pump),
      _ => None,
    }
  }

  /// Diameter of the link (ft)
  pub fn diameter(&self) -> f64 {
    match &self.link_type {
      LinkType::Pipe(pipe) => pipe.diameter,
      LinkType::Pump(_) => 0.0,
      LinkType::Valve(valve) => valve.diameter,
    }
  }

  /// Length of the link (ft), zero for pumps and valves
  pub fn length(&self) -> f64 {
    match &self.link_type {
      LinkType::Pipe(pipe) => pipe.length,
      _ => 0.0,
    }
  }

  /// Volume of water held in the link (ft^3)
  pub fn volume(&self) -> f64 {
    let d = self.diameter();
    PI * d * d / 4.0 * self.length()
  }
}
