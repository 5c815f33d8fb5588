//! Static catalogs of grid nodes and storage sites.
//!
//! The registry is built once at startup (from configuration or the built-in
//! ERCOT catalog), validated, and then only read. Generators borrow it; the
//! API shares it behind an `Arc`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Role a node plays on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeCategory {
    /// Net consumer; congestion premiums are high here.
    #[serde(rename = "Load Center", alias = "LoadCenter")]
    LoadCenter,
    /// Net producer; congestion can turn into an export credit.
    #[serde(rename = "Generation")]
    Generation,
}

impl NodeCategory {
    /// Display label used in API records.
    pub fn label(self) -> &'static str {
        match self {
            Self::LoadCenter => "Load Center",
            Self::Generation => "Generation",
        }
    }
}

/// A pricing node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    /// Short code, e.g. `"A"`.
    #[serde(rename = "node")]
    pub id: String,
    /// Human-readable location name.
    pub name: String,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
    /// Load center or generation hub.
    #[serde(rename = "type")]
    pub category: NodeCategory,
    /// Nominal demand (MW); negative for net generation.
    pub demand_mw: f64,
}

/// A battery site attached to a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageSite {
    /// Id of the node hosting the site.
    pub node: String,
    /// Display name.
    pub name: String,
    /// Energy capacity (MWh), > 0.
    pub capacity_mwh: f64,
    /// Round-trip efficiency in (0, 1].
    pub efficiency: f64,
}

/// Catalog validation failures.
#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("registry must contain at least one node")]
    Empty,
    #[error("duplicate node id \"{0}\"")]
    DuplicateNode(String),
    #[error("duplicate storage site for node \"{0}\"")]
    DuplicateStorage(String),
    #[error("storage site \"{0}\" references an unknown node")]
    UnknownStorageNode(String),
    #[error("storage site \"{node}\": capacity must be > 0, got {capacity_mwh}")]
    InvalidCapacity { node: String, capacity_mwh: f64 },
    #[error("storage site \"{node}\": efficiency must be in (0, 1], got {efficiency}")]
    InvalidEfficiency { node: String, efficiency: f64 },
}

/// Immutable node and storage catalogs.
#[derive(Debug, Clone, PartialEq)]
pub struct Registry {
    nodes: Vec<Node>,
    storage: Vec<StorageSite>,
}

impl Registry {
    /// Validates and wraps the given catalogs.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] found.
    pub fn new(nodes: Vec<Node>, storage: Vec<StorageSite>) -> Result<Self, RegistryError> {
        if nodes.is_empty() {
            return Err(RegistryError::Empty);
        }
        for (i, node) in nodes.iter().enumerate() {
            if nodes[..i].iter().any(|n| n.id == node.id) {
                return Err(RegistryError::DuplicateNode(node.id.clone()));
            }
        }
        for (i, site) in storage.iter().enumerate() {
            if storage[..i].iter().any(|s| s.node == site.node) {
                return Err(RegistryError::DuplicateStorage(site.node.clone()));
            }
            if !nodes.iter().any(|n| n.id == site.node) {
                return Err(RegistryError::UnknownStorageNode(site.node.clone()));
            }
            // NaN fails both checks
            if !(site.capacity_mwh > 0.0) {
                return Err(RegistryError::InvalidCapacity {
                    node: site.node.clone(),
                    capacity_mwh: site.capacity_mwh,
                });
            }
            if !(site.efficiency > 0.0 && site.efficiency <= 1.0) {
                return Err(RegistryError::InvalidEfficiency {
                    node: site.node.clone(),
                    efficiency: site.efficiency,
                });
            }
        }
        Ok(Self { nodes, storage })
    }

    /// The built-in ten-node ERCOT catalog with five storage sites.
    pub fn ercot() -> Self {
        Self {
            nodes: default_nodes(),
            storage: default_storage(),
        }
    }

    /// All nodes in catalog order.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All storage sites in catalog order.
    pub fn storage(&self) -> &[StorageSite] {
        &self.storage
    }

    /// Looks a node up by id.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::ercot()
    }
}

fn node(id: &str, name: &str, lat: f64, lon: f64, category: NodeCategory, demand_mw: f64) -> Node {
    Node {
        id: id.to_string(),
        name: name.to_string(),
        lat,
        lon,
        category,
        demand_mw,
    }
}

fn site(node: &str, name: &str, capacity_mwh: f64, efficiency: f64) -> StorageSite {
    StorageSite {
        node: node.to_string(),
        name: name.to_string(),
        capacity_mwh,
        efficiency,
    }
}

/// Five Texas load centers followed by five generation hubs.
pub fn default_nodes() -> Vec<Node> {
    use NodeCategory::{Generation, LoadCenter};
    vec![
        node("A", "North Dallas", 32.85, -96.68, LoadCenter, 4500.0),
        node("B", "Houston Downtown", 29.76, -95.37, LoadCenter, 5200.0),
        node("C", "San Antonio", 29.42, -98.49, LoadCenter, 3100.0),
        node("D", "Austin", 30.27, -97.74, LoadCenter, 2800.0),
        node("E", "Fort Worth", 32.76, -97.33, LoadCenter, 2400.0),
        node("F", "West Texas Wind", 31.94, -101.87, Generation, -1200.0),
        node("G", "Coastal Generation", 28.24, -97.04, Generation, -1800.0),
        node("H", "Panhandle Solar", 34.41, -100.55, Generation, -900.0),
        node("I", "Central Plant", 31.55, -97.15, Generation, -2100.0),
        node("J", "Northeast Reserve", 33.20, -95.50, Generation, -1400.0),
    ]
}

/// Battery sites at four load centers and one coastal hub.
pub fn default_storage() -> Vec<StorageSite> {
    vec![
        site("A", "Dallas Battery Complex", 250.0, 0.88),
        site("B", "Houston Energy Storage", 400.0, 0.89),
        site("C", "San Antonio Battery Park", 180.0, 0.87),
        site("D", "Austin Storage Hub", 220.0, 0.88),
        site("G", "Coastal Storage Facility", 350.0, 0.89),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ercot_catalog_passes_validation() {
        let reg = Registry::new(default_nodes(), default_storage());
        assert_eq!(reg, Ok(Registry::ercot()));
    }

    #[test]
    fn ercot_has_five_of_each_category() {
        let reg = Registry::ercot();
        let load = reg
            .nodes()
            .iter()
            .filter(|n| n.category == NodeCategory::LoadCenter)
            .count();
        assert_eq!(load, 5);
        assert_eq!(reg.nodes().len(), 10);
        assert_eq!(reg.storage().len(), 5);
    }

    #[test]
    fn every_storage_site_resolves_to_a_node() {
        let reg = Registry::ercot();
        for s in reg.storage() {
            assert!(reg.node(&s.node).is_some(), "dangling storage {}", s.node);
        }
    }

    #[test]
    fn catalog_is_identical_across_calls() {
        let a = serde_json::to_string(Registry::ercot().nodes()).unwrap();
        let b = serde_json::to_string(Registry::ercot().nodes()).unwrap();
        assert_eq!(a, b);
        let a = serde_json::to_string(Registry::ercot().storage()).unwrap();
        let b = serde_json::to_string(Registry::ercot().storage()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn node_serializes_with_external_field_names() {
        let json = serde_json::to_value(&Registry::ercot().nodes()[0]).unwrap();
        assert_eq!(json["node"], "A");
        assert_eq!(json["type"], "Load Center");
        assert_eq!(json["demand_mw"], 4500.0);
    }

    #[test]
    fn rejects_empty_catalog() {
        assert_eq!(Registry::new(vec![], vec![]), Err(RegistryError::Empty));
    }

    #[test]
    fn rejects_duplicate_node() {
        let mut nodes = default_nodes();
        nodes.push(nodes[0].clone());
        assert_eq!(
            Registry::new(nodes, vec![]),
            Err(RegistryError::DuplicateNode("A".into()))
        );
    }

    #[test]
    fn rejects_dangling_storage() {
        let storage = vec![site("Z", "Nowhere", 100.0, 0.9)];
        assert_eq!(
            Registry::new(default_nodes(), storage),
            Err(RegistryError::UnknownStorageNode("Z".into()))
        );
    }

    #[test]
    fn rejects_bad_efficiency_and_capacity() {
        let zero_eff = vec![site("A", "x", 100.0, 0.0)];
        assert!(matches!(
            Registry::new(default_nodes(), zero_eff),
            Err(RegistryError::InvalidEfficiency { .. })
        ));
        let over_eff = vec![site("A", "x", 100.0, 1.01)];
        assert!(Registry::new(default_nodes(), over_eff).is_err());
        let unit_eff = vec![site("A", "x", 100.0, 1.0)];
        assert!(Registry::new(default_nodes(), unit_eff).is_ok());
        let no_cap = vec![site("A", "x", 0.0, 0.9)];
        assert!(matches!(
            Registry::new(default_nodes(), no_cap),
            Err(RegistryError::InvalidCapacity { .. })
        ));
    }
}
