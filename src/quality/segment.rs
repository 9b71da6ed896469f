use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// Slug of water with a uniform concentration
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct Segment {
  pub v: f64,  // volume (ft^3)
  pub c: f64,  // concentration
}

impl Segment {
  pub fn new(v: f64, c: f64) -> Self {
    Self { v, c }
  }
}

/// Ordered segments of a link or tank.
/// The front holds the oldest water (at the outlet), the back the most recently released water.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segments {
  queue: VecDeque<Segment>,
}

impl Segments {
  pub fn new() -> Self {
    Self { queue: VecDeque::new() }
  }

  pub fn len(&self) -> usize {
    self.queue.len()
  }

  pub fn is_empty(&self) -> bool {
    self.queue.is_empty()
  }

  pub fn clear(&mut self) {
    self.queue.clear();
  }

  pub fn iter(&self) -> impl Iterator<Item = &Segment> {
    self.queue.iter()
  }

  pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Segment> {
    self.queue.iter_mut()
  }

  pub fn front(&self) -> Option<&Segment> {
    self.queue.front()
  }

  pub fn back(&self) -> Option<&Segment> {
    self.queue.back()
  }

  pub fn front_mut(&mut self) -> Option<&mut Segment> {
    self.queue.front_mut()
  }

  pub fn back_mut(&mut self) -> Option<&mut Segment> {
    self.queue.back_mut()
  }

  pub fn push_back(&mut self, segment: Segment) {
    self.queue.push_back(segment);
  }

  /// Add water at the back, blending it into the last segment when the
  /// concentrations differ by less than `ctol`
  pub fn merge_or_push(&mut self, v: f64, c: f64, ctol: f64) {
    match self.queue.back_mut() {
      Some(seg) if (seg.c - c).abs() < ctol => {
        let vsum = seg.v + v;
        if vsum > 0.0 {
          seg.c = (seg.c * seg.v + c * v) / vsum;
        }
        seg.v = vsum;
      }
      _ => self.queue.push_back(Segment::new(v, c)),
    }
  }

  /// Withdraw volume `v` from the front. Returns the (volume, mass) withdrawn.
  pub fn withdraw_front(&mut self, v: f64) -> (f64, f64) {
    self.withdraw(v, true)
  }

  /// Withdraw volume `v` from the back. Returns the (volume, mass) withdrawn.
  pub fn withdraw_back(&mut self, v: f64) -> (f64, f64) {
    self.withdraw(v, false)
  }

  // a lone segment always delivers the full volume requested
  fn withdraw(&mut self, mut v: f64, front: bool) -> (f64, f64) {
    let mut vsum = 0.0;
    let mut msum = 0.0;

    while v > 0.0 {
      let last = self.queue.len() == 1;
      let seg = if front { self.queue.front_mut() } else { self.queue.back_mut() };
      let Some(seg) = seg else { break };

      let vseg = if last { v } else { seg.v.min(v) };
      vsum += vseg;
      msum += vseg * seg.c;
      v -= vseg;

      if v >= 0.0 && vseg >= seg.v {
        if front { self.queue.pop_front(); } else { self.queue.pop_back(); }
      } else {
        seg.v -= vseg;
      }
    }
    (vsum, msum)
  }

  /// Flip the order of the segments after a flow reversal
  pub fn reverse(&mut self) {
    self.queue.make_contiguous().reverse();
  }

  pub fn total_volume(&self) -> f64 {
    self.queue.iter().map(|s| s.v).sum()
  }

  pub fn mass(&self) -> f64 {
    self.queue.iter().map(|s| s.v * s.c).sum()
  }

  /// Volume weighted average concentration, `None` when there is no volume
  pub fn average(&self) -> Option<f64> {
    let vsum = self.total_volume();
    if vsum > 0.0 { Some(self.mass() / vsum) } else { None }
  }
}
