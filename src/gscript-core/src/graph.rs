//! Graph database interface and an in-memory implementation
//!
//! Scripts reach the database through the `db` handle; the handle only
//! needs the operations in [`GraphDatabase`]. Property values are kept as
//! JSON so a database can be shared across threads.

use std::path::Path;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Context};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use gscript_shared::Result;

/// Node identifier
pub type NodeId = u64;

/// Relationship identifier
pub type RelationshipId = u64;

/// Snapshot of a node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Node id
    pub id: NodeId,
    /// Labels, in the order they were added
    #[serde(default)]
    pub labels: Vec<String>,
    /// Properties
    #[serde(default)]
    pub properties: IndexMap<String, JsonValue>,
}

/// Snapshot of a relationship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    /// Relationship id
    pub id: RelationshipId,
    /// Start node
    pub start: NodeId,
    /// End node
    pub end: NodeId,
    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: String,
}

/// The graph operations scripts can reach through `db`
pub trait GraphDatabase: Send + Sync {
    /// Ids of nodes with `label`, optionally also matching `key == value`
    fn find_nodes(&self, label: &str, filter: Option<(&str, &JsonValue)>) -> Result<Vec<NodeId>>;

    /// Ids of all nodes
    fn all_nodes(&self) -> Result<Vec<NodeId>>;

    /// A node, `None` when it does not exist
    fn node(&self, id: NodeId) -> Result<Option<NodeRecord>>;

    /// Create a node and return its id
    fn create_node(
        &self,
        labels: &[String],
        properties: IndexMap<String, JsonValue>,
    ) -> Result<NodeId>;

    /// Set one property of a node
    fn set_node_property(&self, id: NodeId, key: &str, value: JsonValue) -> Result<()>;

    /// Create a relationship between two existing nodes
    fn create_relationship(
        &self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
    ) -> Result<RelationshipId>;

    /// Relationships touching `node`, optionally of one type
    fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<&str>,
    ) -> Result<Vec<RelationshipRecord>>;

    /// A relationship, `None` when it does not exist
    fn relationship(&self, id: RelationshipId) -> Result<Option<RelationshipRecord>>;
}

/// Seed file layout: `{"nodes": [...], "relationships": [...]}`
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GraphSeed {
    /// Nodes to create
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Relationships to create; ids may be omitted
    #[serde(default)]
    pub relationships: Vec<SeedRelationship>,
}

/// Relationship entry of a [`GraphSeed`]
#[derive(Debug, Serialize, Deserialize)]
pub struct SeedRelationship {
    /// Start node
    pub start: NodeId,
    /// End node
    pub end: NodeId,
    /// Relationship type
    #[serde(rename = "type")]
    pub rel_type: String,
}

#[derive(Debug, Default)]
struct GraphData {
    nodes: IndexMap<NodeId, NodeRecord>,
    relationships: IndexMap<RelationshipId, RelationshipRecord>,
    next_node: NodeId,
    next_relationship: RelationshipId,
}

/// Graph held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryGraph {
    data: RwLock<GraphData>,
}

impl MemoryGraph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from seed data
    pub fn from_seed(seed: GraphSeed) -> Result<Self> {
        let graph = Self::new();
        {
            let mut data = graph.write()?;
            for node in seed.nodes {
                data.next_node = data.next_node.max(node.id + 1);
                data.nodes.insert(node.id, node);
            }
        }
        for rel in seed.relationships {
            graph.create_relationship(rel.start, rel.end, &rel.rel_type)?;
        }
        Ok(graph)
    }

    /// Load a JSON seed file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph seed {}", path.display()))?;
        let seed: GraphSeed = serde_json::from_str(&text)
            .with_context(|| format!("Invalid graph seed {}", path.display()))?;
        let graph = Self::from_seed(seed)?;
        debug!("Loaded graph seed {}", path.display());
        Ok(graph)
    }

    /// Number of nodes
    pub fn node_count(&self) -> Result<usize> {
        Ok(self.read()?.nodes.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, GraphData>> {
        self.data
            .read()
            .map_err(|e| anyhow!("Graph unavailable: {}", e))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, GraphData>> {
        self.data
            .write()
            .map_err(|e| anyhow!("Graph unavailable: {}", e))
    }
}

impl GraphDatabase for MemoryGraph {
    fn find_nodes(&self, label: &str, filter: Option<(&str, &JsonValue)>) -> Result<Vec<NodeId>> {
        let data = self.read()?;
        Ok(data
            .nodes
            .values()
            .filter(|n| n.labels.iter().any(|l| l == label))
            .filter(|n| filter.map_or(true, |(key, value)| n.properties.get(key) == Some(value)))
            .map(|n| n.id)
            .collect())
    }

    fn all_nodes(&self) -> Result<Vec<NodeId>> {
        Ok(self.read()?.nodes.keys().copied().collect())
    }

    fn node(&self, id: NodeId) -> Result<Option<NodeRecord>> {
        Ok(self.read()?.nodes.get(&id).cloned())
    }

    fn create_node(
        &self,
        labels: &[String],
        properties: IndexMap<String, JsonValue>,
    ) -> Result<NodeId> {
        let mut data = self.write()?;
        let id = data.next_node;
        data.next_node += 1;
        let mut unique = Vec::with_capacity(labels.len());
        for label in labels {
            if !unique.contains(label) {
                unique.push(label.clone());
            }
        }
        data.nodes.insert(
            id,
            NodeRecord {
                id,
                labels: unique,
                properties,
            },
        );
        Ok(id)
    }

    fn set_node_property(&self, id: NodeId, key: &str, value: JsonValue) -> Result<()> {
        let mut data = self.write()?;
        let node = data
            .nodes
            .get_mut(&id)
            .ok_or_else(|| anyhow!("Node {} not found", id))?;
        node.properties.insert(key.to_string(), value);
        Ok(())
    }

    fn create_relationship(
        &self,
        start: NodeId,
        end: NodeId,
        rel_type: &str,
    ) -> Result<RelationshipId> {
        let mut data = self.write()?;
        for id in [start, end] {
            if !data.nodes.contains_key(&id) {
                return Err(anyhow!("Node {} not found", id));
            }
        }
        let id = data.next_relationship;
        data.next_relationship += 1;
        data.relationships.insert(
            id,
            RelationshipRecord {
                id,
                start,
                end,
                rel_type: rel_type.to_string(),
            },
        );
        Ok(id)
    }

    fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<&str>,
    ) -> Result<Vec<RelationshipRecord>> {
        let data = self.read()?;
        Ok(data
            .relationships
            .values()
            .filter(|r| r.start == node || r.end == node)
            .filter(|r| rel_type.map_or(true, |t| r.rel_type == t))
            .cloned()
            .collect())
    }

    fn relationship(&self, id: RelationshipId) -> Result<Option<RelationshipRecord>> {
        Ok(self.read()?.relationships.get(&id).cloned())
    }
}
