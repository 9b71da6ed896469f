use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SimulationError};
use crate::model::curve::{Curve, HeadCurveStatistics};

/// How a pump's head gain is described
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum PumpType {
  /// Constant horsepower
  ConstHp,
  /// Power function fitted to a one or three point curve
  PowerFunc,
  /// Multi-point curve, linearized around the operating point every step
  Custom,
  /// No head curve or power given, the pump acts as an open link
  #[default]
  NoCurve,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Pump {
  /// Initial relative speed setting
  pub speed: f64,
  pub head_curve: Option<Box<str>>,
  /// Power of a constant horsepower pump (hp)
  #[serde(default)]
  pub power: f64,
  #[serde(default)]
  pub efficiency_curve: Option<Box<str>>,
  /// Pump specific energy price (0 = use the global price)
  #[serde(default)]
  pub energy_price: f64,
  #[serde(default)]
  pub price_pattern: Option<Box<str>>,

  #[serde(skip)]
  pub pump_type: PumpType,
  #[serde(skip)]
  pub head_curve_statistics: Option<HeadCurveStatistics>,
}

impl Pump {
  pub fn with_curve(curve_id: &str) -> Self {
    Self {
      speed: 1.0,
      head_curve: Some(curve_id.into()),
      power: 0.0,
      efficiency_curve: None,
      energy_price: 0.0,
      price_pattern: None,
      pump_type: PumpType::NoCurve,
      head_curve_statistics: None,
    }
  }

  pub fn with_power(power: f64) -> Self {
    Self { head_curve: None, power, ..Self::with_curve("") }
  }

  /// Classify the pump and derive its head curve statistics
  pub fn prepare(&mut self, head_curve: Option<&Curve>) -> Result<()> {
    let (pump_type, statistics) = match head_curve {
      Some(curve) => {
        curve.validate()?;
        if let Some(statistics) = curve.head_curve_statistics() {
          (PumpType::PowerFunc, statistics)
        } else if curve.len() >= 2 {
          let n = curve.len();
          if curve.y.windows(2).any(|w| w[1] > w[0]) {
            return Err(SimulationError::InvalidCurve {
              id: curve.id.to_string(),
              reason: "pump head must decrease with flow".to_string(),
            });
          }
          (PumpType::Custom, HeadCurveStatistics {
            h_max: curve.y[0],
            h_shutoff: curve.y[0],
            q_max: curve.x[n - 1],
            q_initial: curve.x[n / 2],
            r: 0.0,
            n: 1.0,
          })
        } else {
          return Err(SimulationError::InvalidCurve {
            id: curve.id.to_string(),
            reason: "cannot fit a pump curve".to_string(),
          });
        }
      }
      None if self.power > 0.0 => {
        (PumpType::ConstHp, HeadCurveStatistics {
          h_max: BIG,
          h_shutoff: 0.0,
          q_max: BIG,
          q_initial: 1.0,
          r: -8.814 * self.power,
          n: -1.0,
        })
      }
      None => {
        (PumpType::NoCurve, HeadCurveStatistics {
          h_max: BIG,
          h_shutoff: 0.0,
          q_max: BIG,
          q_initial: 1.0,
          r: 0.0,
          n: 1.0,
        })
      }
    };
    self.pump_type = pump_type;
    self.head_curve_statistics = Some(statistics);
    Ok(())
  }
}
