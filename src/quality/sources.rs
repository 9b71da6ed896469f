use crate::constants::TINY;
use crate::model::options::QualityType;
use crate::model::pattern::pattern_period;
use crate::model::source::SourceType;
use crate::quality::state::NodeSource;
use crate::quality::QualitySim;

impl QualitySim {
  /// Source strength in effect at the current quality time.
  /// Mass sources are converted from mass/min to mass/s.
  pub fn source_quality(&self, source: &NodeSource) -> f64 {
    let c = match source.source_type {
      SourceType::Mass => source.strength / 60.0,
      _ => source.strength / self.options.quality.quality_ucf,
    };

    match &source.pattern {
      Some(pattern) => {
        let period = pattern_period(self.qtime, self.options.pattern_start, self.options.pattern_step);
        c * pattern.factor(period)
      }
      None => c,
    }
  }

  /// Add the mass of water quality sources to the flow leaving their nodes
  pub(crate) fn source_input(&mut self, dt: i64) {
    let qcutoff = 10.0 * TINY;
    let dt_f = dt as f64;

    for node in self.nodes.iter_mut() {
      node.source_contribution = 0.0;
    }
    if self.options.quality.quality_type != QualityType::Chemical {
      return;
    }
    let counting = self.htime >= self.options.report_start;

    for i in 0..self.nodes.len() {
      let Some(source) = &self.nodes[i].source else { continue };
      if source.strength == 0.0 {
        continue;
      }
      let s = self.source_quality(source);
      let source_type = source.source_type;

      let node = &mut self.nodes[i];
      // total flow volume leaving the node
      let volout = if node.is_tank { node.volume_in - node.demand * dt_f } else { node.volume_in };
      let qout = volout / dt_f;
      if qout <= qcutoff {
        continue;
      }

      let mass_added = match source_type {
        // only added to external inflow
        SourceType::Concentration => {
          if node.demand < 0.0 {
            if node.is_tank {
              node.quality = 0.0;
            }
            -s * node.demand * dt_f
          } else {
            0.0
          }
        }
        SourceType::Mass => s * dt_f,
        // boost to the setpoint
        SourceType::Setpoint => {
          if s > node.quality { (s - node.quality) * volout } else { 0.0 }
        }
        SourceType::FlowPaced => s * volout,
      };

      node.source_contribution = mass_added / volout;
      node.mass_rate += mass_added;
      if counting {
        self.statistics.source += mass_added;
      }
    }

    // reservoir outflow counts as mass inflow
    if counting {
      for tank in self.tanks.iter().filter(|t| t.is_reservoir()) {
        let node = &self.nodes[tank.node];
        let volout = node.volume_in - node.demand * dt_f;
        if volout > 0.0 {
          self.statistics.source += volout * tank.concentration;
        }
      }
    }
  }
}
