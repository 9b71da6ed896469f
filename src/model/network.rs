use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use simplelog::debug;

use crate::error::{MissingKind, OptionExt, Result, SimulationError};
use crate::model::curve::Curve;
use crate::model::link::{Link, LinkType};
use crate::model::node::{Node, NodeType};
use crate::model::options::SimulationOptions;
use crate::model::pattern::Pattern;
use crate::model::tank::TankGeometry;

#[derive(Default, Deserialize, Serialize)]
pub struct Network {
    #[serde(default)]
    pub options: SimulationOptions,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,

    #[serde(default)]
    pub curves: HashMap<Box<str>, Curve>,
    #[serde(default)]
    pub patterns: HashMap<Box<str>, Pattern>,

    #[serde(skip)]
    pub node_map: HashMap<Box<str>, usize>,
    #[serde(skip)]
    pub link_map: HashMap<Box<str>, usize>,
}

/// Network methods to add nodes and links
impl Network {
  pub fn add_node(&mut self, node: Node) -> Result<()> {
    if self.node_map.contains_key(&node.id) {
      return Err(SimulationError::DuplicateId { kind: "Node", id: node.id.to_string() });
    }
    self.node_map.insert(node.id.clone(), self.nodes.len());
    self.nodes.push(node);
    Ok(())
  }
  pub fn add_link(&mut self, mut link: Link) -> Result<()> {
    if self.link_map.contains_key(&link.id) {
      return Err(SimulationError::DuplicateId { kind: "Link", id: link.id.to_string() });
    }
    link.start_node = self.node_index(&link.start_node_id).ok_or_missing(MissingKind::Node, &link.start_node_id)?;
    link.end_node = self.node_index(&link.end_node_id).ok_or_missing(MissingKind::Node, &link.end_node_id)?;
    self.link_map.insert(link.id.clone(), self.links.len());
    self.links.push(link);
    Ok(())
  }
  pub fn add_curve(&mut self, curve: Curve) {
    self.curves.insert(curve.id.clone(), curve);
  }
  pub fn add_pattern(&mut self, pattern: Pattern) {
    self.patterns.insert(pattern.id.clone(), pattern);
  }
}

/// Lookups
impl Network {
  pub fn node_index(&self, id: &str) -> Option<usize> {
    self.node_map.get(id).copied()
  }

  pub fn link_index(&self, id: &str) -> Option<usize> {
    self.link_map.get(id).copied()
  }

  pub fn curve(&self, id: &str) -> Result<&Curve> {
    self.curves.get(id).ok_or_missing(MissingKind::Curve, id)
  }

  /// Look up an optional pattern reference
  pub fn pattern(&self, id: Option<&str>) -> Result<Option<&Pattern>> {
    match id {
      Some(id) => self.patterns.get(id).ok_or_missing(MissingKind::Pattern, id).map(Some),
      None => Ok(None),
    }
  }

  /// Head and volume limits of a tank or reservoir node; `None` for junctions
  pub fn tank_geometry(&self, index: usize) -> Result<Option<TankGeometry>> {
    let node = &self.nodes[index];
    match &node.node_type {
      NodeType::Tank(tank) => {
        let curve = match tank.volume_curve_id.as_deref() {
          Some(id) => {
            let curve = self.curve(id)?;
            curve.validate()?;
            Some(curve)
          }
          None => None,
        };
        Ok(Some(tank.geometry(node.elevation, curve)))
      }
      NodeType::Reservoir(_) => Ok(Some(TankGeometry::reservoir(node.elevation))),
      NodeType::Junction(_) => Ok(None),
    }
  }

  /// Indices of all tanks and reservoirs, in declaration order
  pub fn tank_indices(&self) -> Vec<usize> {
    self.nodes.iter().enumerate().filter(|(_, n)| n.is_fixed()).map(|(i, _)| i).collect()
  }

  /// Indices of all pumps, in declaration order
  pub fn pump_indices(&self) -> Vec<usize> {
    self.links.iter().enumerate().filter(|(_, l)| l.as_pump().is_some()).map(|(i, _)| i).collect()
  }
}

impl Network {
  /// Validate the options, rebuild the id maps and derive pump curve data.
  /// Must be called once after loading or building a network and before simulating it.
  pub fn prepare(&mut self) -> Result<()> {
    self.options.validate()?;
    self.rebuild_maps()?;

    for curve in self.curves.values() {
      curve.validate()?;
    }

    // resolve the curve references of pumps
    for i in 0..self.links.len() {
      let curve = match &self.links[i].link_type {
        LinkType::Pump(pump) => match pump.head_curve.as_deref() {
          Some(id) => Some(self.curve(id)?.clone()),
          None => None,
        },
        _ => continue,
      };
      if let LinkType::Pump(pump) = &mut self.links[i].link_type {
        pump.prepare(curve.as_ref())?;
        if let Some(id) = pump.efficiency_curve.as_deref() {
          self.curves.get(id).ok_or_missing(MissingKind::Curve, id)?;
        }
      }
    }

    // check pattern references
    for node in self.nodes.iter() {
      if let Some(source) = &node.source {
        self.pattern(source.pattern.as_deref())?;
      }
    }
    for link in self.links.iter() {
      if let Some(pump) = link.as_pump() {
        self.pattern(pump.price_pattern.as_deref())?;
      }
    }
    self.pattern(self.options.energy.price_pattern.as_deref())?;

    debug!("Prepared network with {} nodes, {} links, {} curves and {} patterns",
      self.nodes.len(), self.links.len(), self.curves.len(), self.patterns.len());
    Ok(())
  }

  /// Rebuild the node and link maps and the cached node indices of every link
  fn rebuild_maps(&mut self) -> Result<()> {
    self.node_map.clear();
    self.link_map.clear();
    for (i, node) in self.nodes.iter().enumerate() {
      if self.node_map.insert(node.id.clone(), i).is_some() {
        return Err(SimulationError::DuplicateId { kind: "Node", id: node.id.to_string() });
      }
    }
    for i in 0..self.links.len() {
      let link = &self.links[i];
      if self.link_map.insert(link.id.clone(), i).is_some() {
        return Err(SimulationError::DuplicateId { kind: "Link", id: link.id.to_string() });
      }
      let start = self.node_index(&link.start_node_id).ok_or_missing(MissingKind::Node, &link.start_node_id)?;
      let end = self.node_index(&link.end_node_id).ok_or_missing(MissingKind::Node, &link.end_node_id)?;
      self.links[i].start_node = start;
      self.links[i].end_node = end;
    }
    Ok(())
  }
}
