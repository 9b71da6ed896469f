use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Reservoir {
  /// Pattern applied to the reservoir's fixed head
  pub head_pattern: Option<Box<str>>,
}
