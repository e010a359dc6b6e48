//! Script-facing handles over a [`GraphDatabase`]
//!
//! Handles are thin: a node or relationship handle is an id plus the
//! database, and every method reads through to the database.

use std::any::Any;
use std::sync::Arc;

use anyhow::anyhow;
use indexmap::IndexMap;
use serde_json::{json, Value as JsonValue};

use gscript_shared::error::argument_error;
use gscript_shared::graph::{label_name, relationship_type_name};
use gscript_shared::{HostIterator, HostObject, Label, RelationshipType, Result, Value};

use crate::graph::{GraphDatabase, NodeId, NodeRecord, RelationshipId, RelationshipRecord};

fn id_arg(method: &str, value: Option<&Value>) -> Result<u64> {
    value
        .and_then(|v| match v {
            Value::Int(i) => u64::try_from(*i).ok(),
            Value::Float(f) if f.fract() == 0.0 => v.as_i64().and_then(|i| u64::try_from(i).ok()),
            other => other.downcast_host::<NodeHandle>().map(NodeHandle::id),
        })
        .ok_or_else(|| argument_error(method, "expected a node id"))
}

fn node_values(db: &Arc<dyn GraphDatabase>, ids: Vec<NodeId>) -> Value {
    let db = Arc::clone(db);
    Value::host(HostIterator::from_values(
        "NodeIterator",
        ids.into_iter()
            .map(move |id| Value::host(NodeHandle::new(Arc::clone(&db), id))),
    ))
}

/// The `db` handle
pub struct DatabaseHandle {
    db: Arc<dyn GraphDatabase>,
}

impl DatabaseHandle {
    /// Wrap a database
    pub fn new(db: Arc<dyn GraphDatabase>) -> Self {
        Self { db }
    }

    fn find_nodes(&self, args: &[Value]) -> Result<Value> {
        let label = args
            .first()
            .and_then(label_name)
            .ok_or_else(|| argument_error("findNodes", "expected a label"))?;
        let ids = match args.get(1) {
            Some(key) if args.len() > 2 => {
                let key = key.to_string();
                let value = args[2].to_json()?;
                let filter = Some((key.as_str(), &value));
                self.db.find_nodes(&label, filter)?
            }
            _ => self.db.find_nodes(&label, None)?,
        };
        Ok(node_values(&self.db, ids))
    }

    fn create_node(&self, args: &[Value]) -> Result<Value> {
        let labels = args
            .iter()
            .map(|v| label_name(v).ok_or_else(|| argument_error("createNode", "expected labels")))
            .collect::<Result<Vec<_>>>()?;
        let id = self.db.create_node(&labels, IndexMap::new())?;
        Ok(Value::host(NodeHandle::new(Arc::clone(&self.db), id)))
    }
}

impl std::fmt::Debug for DatabaseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseHandle").finish_non_exhaustive()
    }
}

impl HostObject for DatabaseHandle {
    fn type_name(&self) -> &'static str {
        "GraphDatabase"
    }

    fn call_method(&self, name: &str, args: &[Value]) -> Option<Result<Value>> {
        Some(match name {
            "findNodes" => self.find_nodes(args),
            "getAllNodes" => self.db.all_nodes().map(|ids| node_values(&self.db, ids)),
            "getNodeById" => id_arg("getNodeById", args.first()).and_then(|id| {
                match self.db.node(id)? {
                    Some(_) => Ok(Value::host(NodeHandle::new(Arc::clone(&self.db), id))),
                    None => Err(anyhow!("Node {} not found", id)),
                }
            }),
            "createNode" => self.create_node(args),
            _ => return None,
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A node handle
pub struct NodeHandle {
    db: Arc<dyn GraphDatabase>,
    id: NodeId,
}

impl NodeHandle {
    /// Handle for node `id`
    pub fn new(db: Arc<dyn GraphDatabase>, id: NodeId) -> Self {
        Self { db, id }
    }

    /// Node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn record(&self) -> Result<NodeRecord> {
        self.db
            .node(self.id)?
            .ok_or_else(|| anyhow!("Node {} not found", self.id))
    }

    fn property_key(method: &str, args: &[Value]) -> Result<String> {
        args.first()
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| argument_error(method, "expected a property name"))
    }

    fn get_property(&self, args: &[Value]) -> Result<Value> {
        let key = Self::property_key("getProperty", args)?;
        match self.record()?.properties.get(&key) {
            Some(value) => Ok(Value::from_json(value.clone())),
            None => match args.get(1) {
                Some(default) => Ok(default.clone()),
                None => Err(anyhow!("Node {} has no property '{}'", self.id, key)),
            },
        }
    }

    fn set_property(&self, args: &[Value]) -> Result<Value> {
        let key = Self::property_key("setProperty", args)?;
        let value = args.get(1).cloned().unwrap_or(Value::Null);
        self.db.set_node_property(self.id, &key, value.to_json()?)?;
        Ok(Value::Null)
    }

    fn relationships(&self, args: &[Value]) -> Result<Value> {
        let rel_type = args.first().and_then(relationship_type_name);
        let records = self.db.relationships(self.id, rel_type.as_deref())?;
        let db = Arc::clone(&self.db);
        Ok(Value::host(HostIterator::from_values(
            "RelationshipIterator",
            records.into_iter().map(move |r| {
                Value::host(RelationshipHandle::new(Arc::clone(&db), r.id))
            }),
        )))
    }

    fn create_relationship_to(&self, args: &[Value]) -> Result<Value> {
        let other = id_arg("createRelationshipTo", args.first())?;
        let rel_type = args
            .get(1)
            .and_then(relationship_type_name)
            .ok_or_else(|| argument_error("createRelationshipTo", "expected a relationship type"))?;
        let id = self.db.create_relationship(self.id, other, &rel_type)?;
        Ok(Value::host(RelationshipHandle::new(Arc::clone(&self.db), id)))
    }
}

impl std::fmt::Debug for NodeHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node[{}]", self.id)
    }
}

impl HostObject for NodeHandle {
    fn type_name(&self) -> &'static str {
        "Node"
    }

    fn get(&self, name: &str) -> Option<Value> {
        (name == "id").then(|| Value::Int(i64::try_from(self.id).unwrap_or(i64::MAX)))
    }

    fn call_method(&self, name: &str, args: &[Value]) -> Option<Result<Value>> {
        Some(match name {
            "getId" => Ok(self.get("id").unwrap_or(Value::Null)),
            "getProperty" => self.get_property(args),
            "hasProperty" => Self::property_key("hasProperty", args)
                .and_then(|key| Ok(Value::Bool(self.record()?.properties.contains_key(&key)))),
            "setProperty" => self.set_property(args),
            "hasLabel" => {
                let label = args.first().and_then(label_name);
                self.record().map(|r| {
                    Value::Bool(label.is_some_and(|l| r.labels.iter().any(|x| *x == l)))
                })
            }
            "getLabels" => self.record().map(|r| {
                Value::array(r.labels.into_iter().map(|l| Value::host(Label::new(l))).collect())
            }),
            "getRelationships" => self.relationships(args),
            "createRelationshipTo" => self.create_relationship_to(args),
            _ => return None,
        })
    }

    fn equals(&self, other: &dyn HostObject) -> bool {
        other
            .as_any()
            .downcast_ref::<NodeHandle>()
            .is_some_and(|n| n.id == self.id)
    }

    fn to_json(&self) -> JsonValue {
        match self.record() {
            Ok(record) => json!({
                "id": record.id,
                "labels": record.labels,
                "properties": record.properties,
            }),
            Err(_) => json!({ "id": self.id }),
        }
    }

    fn display(&self) -> String {
        format!("Node[{}]", self.id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A relationship handle
pub struct RelationshipHandle {
    db: Arc<dyn GraphDatabase>,
    id: RelationshipId,
}

impl RelationshipHandle {
    /// Handle for relationship `id`
    pub fn new(db: Arc<dyn GraphDatabase>, id: RelationshipId) -> Self {
        Self { db, id }
    }

    fn record(&self) -> Result<RelationshipRecord> {
        self.db
            .relationship(self.id)?
            .ok_or_else(|| anyhow!("Relationship {} not found", self.id))
    }

    fn node(&self, id: NodeId) -> Value {
        Value::host(NodeHandle::new(Arc::clone(&self.db), id))
    }

    fn other_node(&self, args: &[Value]) -> Result<Value> {
        let from = id_arg("getOtherNode", args.first())?;
        let record = self.record()?;
        if record.start == from {
            Ok(self.node(record.end))
        } else if record.end == from {
            Ok(self.node(record.start))
        } else {
            Err(anyhow!(
                "Node {} is not part of relationship {}",
                from,
                self.id
            ))
        }
    }
}

impl std::fmt::Debug for RelationshipHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Relationship[{}]", self.id)
    }
}

impl HostObject for RelationshipHandle {
    fn type_name(&self) -> &'static str {
        "Relationship"
    }

    fn get(&self, name: &str) -> Option<Value> {
        (name == "id").then(|| Value::Int(i64::try_from(self.id).unwrap_or(i64::MAX)))
    }

    fn call_method(&self, name: &str, args: &[Value]) -> Option<Result<Value>> {
        Some(match name {
            "getId" => Ok(self.get("id").unwrap_or(Value::Null)),
            "getType" => self
                .record()
                .map(|r| Value::host(RelationshipType::new(r.rel_type))),
            "getStartNode" => self.record().map(|r| self.node(r.start)),
            "getEndNode" => self.record().map(|r| self.node(r.end)),
            "getOtherNode" => self.other_node(args),
            _ => return None,
        })
    }

    fn equals(&self, other: &dyn HostObject) -> bool {
        other
            .as_any()
            .downcast_ref::<RelationshipHandle>()
            .is_some_and(|r| r.id == self.id)
    }

    fn to_json(&self) -> JsonValue {
        match self.record() {
            Ok(record) => json!(record),
            Err(_) => json!({ "id": self.id }),
        }
    }

    fn display(&self) -> String {
        format!("Relationship[{}]", self.id)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::MemoryGraph;
    use gscript_engine::{Interpreter, ScriptEngine};

    fn interpreter_with_db() -> (Interpreter, Arc<dyn GraphDatabase>) {
        let db: Arc<dyn GraphDatabase> = Arc::new(MemoryGraph::new());
        let interp = Interpreter::default();
        interp.bind("db", Value::host(DatabaseHandle::new(Arc::clone(&db))));
        (interp, db)
    }

    #[test]
    fn test_create_and_find_nodes() {
        let (interp, db) = interpreter_with_db();
        let source = r"
            var ada = db.createNode(Label('User'));
            ada.setProperty('name', 'ada');
            var bob = db.createNode(Label('User'), 'Admin');
            bob.setProperty('name', 'bob');
            var names = [];
            for (var n of db.findNodes(Label('User'))) { names.push(n.getProperty('name')) }
            names.join(',')
        ";
        assert_eq!(interp.eval(source).unwrap(), Value::string("ada,bob"));
        assert_eq!(db.find_nodes("Admin", None).unwrap().len(), 1);

        let found = interp
            .eval("var it = db.findNodes('User', 'name', 'bob'); it.next().hasLabel('Admin')")
            .unwrap();
        assert_eq!(found, Value::Bool(true));
    }

    #[test]
    fn test_relationships_from_scripts() {
        let (interp, _db) = interpreter_with_db();
        let source = r"
            var a = db.createNode('Person');
            var b = db.createNode('Person');
            var rel = a.createRelationshipTo(b, RelationshipType('KNOWS'));
            var back = rel.getOtherNode(b);
            [rel.getType().name(), rel.getStartNode().id, back.getId(), a.getRelationships('KNOWS').hasNext()]
        ";
        let result = interp.eval(source).unwrap().to_json().unwrap();
        assert_eq!(result, json!(["KNOWS", 0, 0, true]));
    }

    #[test]
    fn test_missing_property_uses_default_or_fails() {
        let (interp, _db) = interpreter_with_db();
        interp.eval("var n = db.createNode('Thing')").unwrap();
        assert_eq!(
            interp.eval("n.getProperty('color', 'none')").unwrap(),
            Value::string("none")
        );
        assert!(interp.eval("n.getProperty('color')").is_err());
        assert_eq!(interp.eval("n.hasProperty('color')").unwrap(), Value::Bool(false));
        assert!(interp.eval("db.getNodeById(99)").is_err());
    }

    #[test]
    fn test_node_json_and_equality() {
        let db: Arc<dyn GraphDatabase> = Arc::new(MemoryGraph::new());
        let id = db
            .create_node(&["User".to_string()], IndexMap::new())
            .unwrap();
        let a = Value::host(NodeHandle::new(Arc::clone(&db), id));
        let b = Value::host(NodeHandle::new(Arc::clone(&db), id));
        assert_eq!(a, b);
        assert_eq!(
            a.to_json().unwrap(),
            json!({"id": 0, "labels": ["User"], "properties": {}})
        );
    }
}
