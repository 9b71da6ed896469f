use crate::constants::{SECperDAY, TRACE_QUALITY};
use crate::model::options::QualityType;
use crate::quality::mixing::{mix, TankFlows};
use crate::quality::segment::Segment;
use crate::quality::QualitySim;

impl QualitySim {
  /// Transport constituent mass through the network over `tstep` seconds of constant hydraulics
  pub(crate) fn transport(&mut self, tstep: i64) {
    for node in self.nodes.iter_mut() {
      node.mass_rate = 0.0;
    }

    let mut qtime = 0;
    while qtime < tstep {
      let dt = self.options.quality_step.min(tstep - qtime);
      qtime += dt;
      if self.kinetics.react {
        self.update_segments(dt);
      }
      self.accumulate(dt);
      self.update_nodes(dt);
      self.source_input(dt);
      self.release(dt);
    }
    self.update_source_nodes(tstep);
  }

  /// React the contents of every pipe
  fn update_segments(&mut self, dt: i64) {
    let chemical = self.options.quality.quality_type == QualityType::Chemical;
    let counting = self.htime >= self.options.report_start;

    for link in self.links.iter_mut() {
      if link.length == 0.0 {
        continue;
      }
      let mut rsum = 0.0;
      let mut vsum = 0.0;

      for seg in link.segments.iter_mut() {
        let r = self.kinetics.pipe_react(seg.c, link.kb, link.kw, link.wall_coeff, link.diameter, dt);
        if counting {
          self.statistics.bulk += r.dc_bulk.abs() * seg.v;
          self.statistics.wall += r.dc_wall.abs() * seg.v;
        }
        if chemical {
          rsum += (r.c - seg.c).abs() * seg.v;
          vsum += seg.v;
        }
        seg.c = r.c;
      }

      link.reaction_rate = if vsum > 0.0 { rsum / vsum / dt as f64 * SECperDAY } else { 0.0 };
    }
  }

  /// Move the water leaving every link into its downstream node
  fn accumulate(&mut self, dt: i64) {
    for node in self.nodes.iter_mut() {
      node.volume_in = 0.0;
      node.mass_in = 0.0;
      node.source_contribution = 0.0;
    }

    // average quality at the ends of all adjacent links, used where no water arrives
    for link in self.links.iter() {
      if let (Some(front), Some(back)) = (link.segments.front(), link.segments.back()) {
        let down = &mut self.nodes[link.downstream()];
        down.mass_in += front.c;
        down.volume_in += 1.0;
        let up = &mut self.nodes[link.upstream()];
        up.mass_in += back.c;
        up.volume_in += 1.0;
      }
    }
    for node in self.nodes.iter_mut() {
      if node.volume_in > 0.0 {
        node.source_contribution = node.mass_in / node.volume_in;
      }
      node.volume_in = 0.0;
      node.mass_in = 0.0;
    }

    for link in self.links.iter_mut() {
      let v = link.flow.abs() * dt as f64;
      let (vsum, msum) = link.segments.withdraw_front(v);
      let node = &mut self.nodes[link.downstream()];
      node.volume_in += vsum;
      node.mass_in += msum;
    }
  }

  /// New quality of junctions and tanks from the water they received
  fn update_nodes(&mut self, dt: i64) {
    for node in self.nodes.iter_mut().filter(|n| !n.is_tank) {
      // external inflow
      if node.demand < 0.0 {
        node.volume_in -= node.demand * dt as f64;
      }
      node.quality = if node.volume_in > 0.0 { node.mass_in / node.volume_in } else { node.source_contribution };
    }

    self.update_tanks(dt);

    if let Some(trace) = self.trace_node {
      self.nodes[trace].quality = TRACE_QUALITY;
    }
  }

  fn update_tanks(&mut self, dt: i64) {
    let ctol = self.options.quality.ctol;
    let counting = self.htime >= self.options.report_start;

    for tank in self.tanks.iter_mut() {
      let node = &mut self.nodes[tank.node];
      if tank.is_reservoir() {
        node.quality = node.initial_quality;
        continue;
      }

      let flows = TankFlows { demand: node.demand, volume_in: node.volume_in, mass_in: node.mass_in };
      let reacted = mix(tank, &flows, &self.kinetics, ctol, dt);
      if counting {
        self.statistics.tank += reacted;
      }
      node.quality = tank.concentration;
    }
  }

  /// Release water from upstream nodes into the links they feed
  fn release(&mut self, dt: i64) {
    let ctol = self.options.quality.ctol;

    for link in self.links.iter_mut() {
      if link.flow == 0.0 {
        continue;
      }
      let v = link.flow.abs() * dt as f64;
      let node = &self.nodes[link.upstream()];
      let c = node.quality + node.source_contribution;

      if link.segments.is_empty() {
        link.segments.push_back(Segment::new(link.volume, c));
      } else {
        link.segments.merge_or_push(v, c, ctol);
      }
    }
  }

  /// Quality at source nodes after the hydraulic step, with their contribution included
  fn update_source_nodes(&mut self, tstep: i64) {
    if self.options.quality.quality_type != QualityType::Chemical {
      return;
    }

    for (i, node) in self.nodes.iter_mut().enumerate() {
      if node.source.is_none() {
        continue;
      }
      node.quality += node.source_contribution;

      if let Some(k) = self.tank_index[i] {
        let tank = &self.tanks[k];
        if !tank.is_reservoir() {
          node.quality = tank.concentration;
        }
      }
      node.mass_rate /= tstep as f64;
    }
  }
}
