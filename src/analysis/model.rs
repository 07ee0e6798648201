// Canonical structure of a discovered entity

use serde::{Deserialize, Serialize};

/// The normalized shape of one class, independent of how it was declared.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntityStructure {
    /// Fully qualified name
    pub name: String,
    /// Owning module
    pub module: String,
    /// Ancestors in resolution order, without the root type and self
    pub bases: Vec<String>,
    pub fields: Vec<Field>,
    pub methods: Vec<Method>,
}

/// A field and its best-effort type name (empty when untyped)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub type_name: String,
}

/// A method and its annotated parameters (and `return`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Annotation {
    pub name: String,
    pub type_name: String,
}

impl EntityStructure {
    pub fn new(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            ..Default::default()
        }
    }

    /// Insert or replace a field. A replaced field keeps its position.
    pub fn insert_field(&mut self, name: &str, type_name: impl Into<String>) {
        let type_name = type_name.into();
        match self.fields.iter_mut().find(|f| f.name == name) {
            Some(existing) => existing.type_name = type_name,
            None => self.fields.push(Field {
                name: name.to_string(),
                type_name,
            }),
        }
    }

    /// Insert or replace a method. A replaced method keeps its position.
    pub fn insert_method(&mut self, name: &str, annotations: Vec<Annotation>) {
        match self.methods.iter_mut().find(|m| m.name == name) {
            Some(existing) => existing.annotations = annotations,
            None => self.methods.push(Method {
                name: name.to_string(),
                annotations,
            }),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }
}

impl Method {
    /// Type of an annotated parameter, or of `return`
    pub fn annotation(&self, name: &str) -> Option<&str> {
        self.annotations
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.type_name.as_str())
    }
}
