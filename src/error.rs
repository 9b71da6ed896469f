use thiserror::Error;

/// Errors raised while preparing or running a simulation
#[derive(Debug, Error)]
pub enum SimulationError {
  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),
  #[error("Trace node {0} does not exist in the network")]
  UnknownTraceNode(String),
  #[error("Node {0} does not exist in the network")]
  UnknownNode(String),
  #[error("Curve {0} does not exist in the network")]
  UnknownCurve(String),
  #[error("Pattern {0} does not exist in the network")]
  UnknownPattern(String),
  #[error("Invalid curve {id}: {reason}")]
  InvalidCurve { id: String, reason: String },
  #[error("{kind} {id} already exists")]
  DuplicateId { kind: &'static str, id: String },
  #[error("Invalid option {name}: {reason}")]
  InvalidOption { name: &'static str, reason: String },
  #[error("Expected {expected} {what}, found {found}")]
  SizeMismatch { what: &'static str, expected: usize, found: usize },
  #[error("Invalid hydraulics file: {0}")]
  InvalidHydraulicFile(String),
  #[error("Invalid quality output file: {0}")]
  InvalidOutputFile(String),
  #[error("Serialization error: {0}")]
  Serialization(String),
  #[error("Hydraulic solver failed: {0}")]
  Solver(String),
}

pub type Result<T> = std::result::Result<T, SimulationError>;

impl From<serde_json::Error> for SimulationError {
  fn from(err: serde_json::Error) -> Self {
    SimulationError::Serialization(err.to_string())
  }
}

impl From<rmp_serde::encode::Error> for SimulationError {
  fn from(err: rmp_serde::encode::Error) -> Self {
    SimulationError::Serialization(err.to_string())
  }
}

impl From<rmp_serde::decode::Error> for SimulationError {
  fn from(err: rmp_serde::decode::Error) -> Self {
    SimulationError::Serialization(err.to_string())
  }
}

/// Helper trait for turning failed id lookups into errors
pub trait OptionExt<T> {
  fn ok_or_missing(self, kind: MissingKind, id: &str) -> Result<T>;
}

/// Kind of object a failed lookup was searching for
#[derive(Debug, Clone, Copy)]
pub enum MissingKind {
  Node,
  Curve,
  Pattern,
}

impl<T> OptionExt<T> for Option<T> {
  fn ok_or_missing(self, kind: MissingKind, id: &str) -> Result<T> {
    self.ok_or_else(|| match kind {
      MissingKind::Node => SimulationError::UnknownNode(id.to_string()),
      MissingKind::Curve => SimulationError::UnknownCurve(id.to_string()),
      MissingKind::Pattern => SimulationError::UnknownPattern(id.to_string()),
    })
  }
}
