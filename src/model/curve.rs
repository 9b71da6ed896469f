use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{Result, SimulationError};

/// Piecewise-linear curve (pump head, pump efficiency or tank volume)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Curve {
  pub id: Box<str>,
  pub x: Vec<f64>,
  pub y: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct HeadCurveStatistics {
  pub h_max: f64,           // maximum head
  pub h_shutoff: f64,       // shutoff head
  pub q_max: f64,           // maximum flow
  pub q_initial: f64,       // design flow (= initial flow)
  pub r: f64,               // flow coefficient
  pub n: f64,               // pump exponent
}

impl Curve {
  pub fn new(id: &str, x: Vec<f64>, y: Vec<f64>) -> Self {
    Self { id: id.into(), x, y }
  }

  pub fn len(&self) -> usize {
    self.x.len()
  }

  pub fn is_empty(&self) -> bool {
    self.x.is_empty()
  }

  /// Check that the curve has points and matching x and y values
  pub fn validate(&self) -> Result<()> {
    let reason = if self.x.is_empty() {
      "curve has no points".to_string()
    } else if self.x.len() != self.y.len() {
      format!("{} x values but {} y values", self.x.len(), self.y.len())
    } else if self.x.iter().chain(self.y.iter()).any(|v| !v.is_finite()) {
      "curve values must be finite".to_string()
    } else {
      return Ok(());
    };
    Err(SimulationError::InvalidCurve { id: self.id.to_string(), reason })
  }

  /// Linear interpolation of y at `x`, held constant beyond the first and last point
  pub fn interpolate(&self, x: f64) -> f64 {
    interpolate(&self.x, &self.y, x)
  }

  /// Linear interpolation of x at `y` (curve read backwards)
  pub fn inverse(&self, y: f64) -> f64 {
    interpolate(&self.y, &self.x, y)
  }

  /// Intercept and slope of the curve segment that brackets `x`
  pub fn coefficients(&self, x: f64) -> (f64, f64) {
    let n = self.x.len();
    if n < 2 {
      return (self.y.first().copied().unwrap_or(0.0), 0.0);
    }

    let mut k2 = self.x.iter().position(|&xi| xi >= x).unwrap_or(n);
    if k2 == 0 {
      k2 = 1;
    } else if k2 == n {
      k2 = n - 1;
    }
    let k1 = k2 - 1;

    let dx = self.x[k2] - self.x[k1];
    let r = if dx.abs() < TINY { 0.0 } else { (self.y[k2] - self.y[k1]) / dx };
    let h0 = self.y[k1] - r * self.x[k1];
    (h0, r)
  }

  /// Fit a power function `h = h0 - r * q^n` to a one or three point head curve.
  /// Returns `None` when the curve has another shape or the fit is not physical.
  pub fn head_curve_statistics(&self) -> Option<HeadCurveStatistics> {

    if self.x.len() == 1 {

      let q = self.x[0];
      let h = self.y[0];
      if q <= 0.0 || h <= 0.0 {
        return None;
      }

      // compute the coefficients for the head curve
      let a = h * 4.0 / 3.0; // maximum head / shutoff head
      let b = (a-h)/(q*q);  // flow coefficient

      return Some(HeadCurveStatistics {
        h_max: a,
        h_shutoff: a,
        q_max: q * 2.0,
        q_initial: q,
        r: b,
        n: 2.0,
      });
    }

    if self.x.len() == 3 && self.x[0] == 0.0 {
      let (h0, h1, h2) = (self.y[0], self.y[1], self.y[2]);
      let (q1, q2) = (self.x[1], self.x[2]);

      let h4 = h0 - h1;
      let h5 = h0 - h2;
      if h0 < TINY || h4 < TINY || h5 < TINY || h1 < h2 || q1 < TINY || q2 <= q1 {
        return None;
      }

      let n = (h5 / h4).ln() / (q2 / q1).ln();
      if n <= 0.0 || n > 20.0 {
        return None;
      }
      let r = h4 / q1.powf(n);
      if r <= 0.0 {
        return None;
      }

      return Some(HeadCurveStatistics {
        h_max: h0,
        h_shutoff: h0,
        q_max: (h0 / r).powf(1.0 / n),
        q_initial: q1,
        r,
        n,
      });
    }

    None
  }
}

fn interpolate(xs: &[f64], ys: &[f64], x: f64) -> f64 {
  let n = xs.len().min(ys.len());
  if n == 0 {
    return 0.0;
  }
  if x <= xs[0] {
    return ys[0];
  }
  for i in 1..n {
    if xs[i] >= x {
      let dx = xs[i] - xs[i - 1];
      let dy = ys[i] - ys[i - 1];
      if dx.abs() < TINY {
        return ys[i];
      }
      return ys[i] - (xs[i] - x) * dy / dx;
    }
  }
  ys[n - 1]
}
