//! Graph handle types
//!
//! Labels and relationship types are plain named tokens on the host side;
//! scripts build them with `label(name)` and `type(name)` and pass them back
//! into database calls.

use serde_json::{json, Value as JsonValue};
use std::any::Any;

use crate::host::HostObject;
use crate::value::Value;
use crate::Result;

/// A node label
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    /// Create a label from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Label name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// A relationship type
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipType(String);

impl RelationshipType {
    /// Create a relationship type from its name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Relationship type name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Accept either a label handle or a plain string where a label is expected
#[must_use]
pub fn label_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => other.downcast_host::<Label>().map(|l| l.name().to_string()),
    }
}

/// Accept either a relationship-type handle or a plain string
#[must_use]
pub fn relationship_type_name(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        other => other
            .downcast_host::<RelationshipType>()
            .map(|t| t.name().to_string()),
    }
}

impl HostObject for Label {
    fn type_name(&self) -> &'static str {
        "Label"
    }

    fn get(&self, name: &str) -> Option<Value> {
        (name == "name").then(|| Value::string(self.name()))
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Option<Result<Value>> {
        match name {
            "name" | "toString" => Some(Ok(Value::string(self.name()))),
            _ => None,
        }
    }

    fn equals(&self, other: &dyn HostObject) -> bool {
        other.as_any().downcast_ref::<Label>() == Some(self)
    }

    fn to_json(&self) -> JsonValue {
        json!({ "label": self.name() })
    }

    fn display(&self) -> String {
        self.name().to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl HostObject for RelationshipType {
    fn type_name(&self) -> &'static str {
        "RelationshipType"
    }

    fn get(&self, name: &str) -> Option<Value> {
        (name == "name").then(|| Value::string(self.name()))
    }

    fn call_method(&self, name: &str, _args: &[Value]) -> Option<Result<Value>> {
        match name {
            "name" | "toString" => Some(Ok(Value::string(self.name()))),
            _ => None,
        }
    }

    fn equals(&self, other: &dyn HostObject) -> bool {
        other.as_any().downcast_ref::<RelationshipType>() == Some(self)
    }

    fn to_json(&self) -> JsonValue {
        json!({ "relationshipType": self.name() })
    }

    fn display(&self) -> String {
        self.name().to_string()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_methods() {
        let label = Label::new("User");
        let name = label.call_method("name", &[]).unwrap().unwrap();
        assert_eq!(name, Value::string("User"));
        assert_eq!(label.get("name"), Some(Value::string("User")));
        assert!(label.call_method("delete", &[]).is_none());
    }

    #[test]
    fn test_labels_and_types_never_compare_equal() {
        let label = Value::host(Label::new("KNOWS"));
        let rel_type = Value::host(RelationshipType::new("KNOWS"));
        assert_ne!(label, rel_type);
    }

    #[test]
    fn test_name_extraction_accepts_strings() {
        assert_eq!(label_name(&Value::string("User")), Some("User".to_string()));
        assert_eq!(
            label_name(&Value::host(Label::new("Admin"))),
            Some("Admin".to_string())
        );
        assert_eq!(label_name(&Value::Int(3)), None);
        assert_eq!(
            relationship_type_name(&Value::host(RelationshipType::new("KNOWS"))),
            Some("KNOWS".to_string())
        );
    }
}
