// Declaration types for parsed Python code
//
// These types describe what a source file declares, before any cross-file
// resolution. They are serializable for debugging.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A printable reference to a type or entity.
///
/// Every place that stringifies a class, base or annotation goes through
/// [`describe`], so the three tiers below render identically everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// Owning module and bare name are both known
    Qualified { module: String, name: String },
    /// Only a bare name is known
    Bare(String),
    /// Neither is known; the expression's source text
    Raw(String),
}

impl TypeRef {
    pub fn qualified(module: &str, name: &str) -> Self {
        TypeRef::Qualified {
            module: module.to_string(),
            name: name.to_string(),
        }
    }

    pub fn bare(name: &str) -> Self {
        TypeRef::Bare(name.to_string())
    }

    pub fn raw(text: &str) -> Self {
        TypeRef::Raw(text.to_string())
    }

    /// The unqualified name, if there is one
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeRef::Qualified { name, .. } | TypeRef::Bare(name) => Some(name),
            TypeRef::Raw(_) => None,
        }
    }
}

/// Render a reference: `module.name`, else `name`, else the raw text.
pub fn describe(reference: &TypeRef) -> String {
    match reference {
        TypeRef::Qualified { module, name } if !module.is_empty() => {
            format!("{}.{}", module, name)
        }
        TypeRef::Qualified { name, .. } => name.clone(),
        TypeRef::Bare(name) => name.clone(),
        TypeRef::Raw(text) => text.clone(),
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&describe(self))
    }
}

/// A source file handed to a resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Dotted module name
    pub module: String,
    /// True for a package's `__init__.py`
    pub is_package: bool,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, module: impl Into<String>, is_package: bool) -> Self {
        Self {
            path: path.into(),
            module: module.into(),
            is_package,
        }
    }
}

/// A parsed Python module
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedModule {
    pub path: PathBuf,
    pub module_name: String,
    /// Classes the module directly exposes, in declaration order
    pub classes: Vec<ClassDecl>,
}

impl ParsedModule {
    pub fn new(path: PathBuf, module_name: String) -> Self {
        Self {
            path,
            module_name,
            classes: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// A class definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassDecl {
    pub name: String,
    pub module: String,
    /// Resolved base expressions, in declaration order
    pub bases: Vec<TypeRef>,
    /// Decorated with a dataclass decorator
    pub is_dataclass: bool,
    /// Class-body bindings in source order; names may repeat
    pub members: Vec<Member>,
    /// Class-level annotations in source order
    pub annotations: Vec<ClassAnnotation>,
    pub line_start: usize,
}

impl ClassDecl {
    pub fn new(name: &str, module: &str, line_start: usize) -> Self {
        Self {
            name: name.to_string(),
            module: module.to_string(),
            bases: Vec::new(),
            is_dataclass: false,
            members: Vec::new(),
            annotations: Vec::new(),
            line_start,
        }
    }

    /// Reference to this class itself
    pub fn reference(&self) -> TypeRef {
        if self.module.is_empty() {
            TypeRef::bare(&self.name)
        } else {
            TypeRef::qualified(&self.module, &self.name)
        }
    }

    /// Last annotation recorded for `name`
    pub fn annotation_for(&self, name: &str) -> Option<&ClassAnnotation> {
        self.annotations.iter().rev().find(|a| a.name == name)
    }
}

/// A name bound in a class body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Member {
    /// A callable defined with `def`
    Method(MethodDecl),
    /// Any other binding: assignment target, nested class, property
    Attribute { name: String },
}

impl Member {
    pub fn name(&self) -> &str {
        match self {
            Member::Method(method) => &method.name,
            Member::Attribute { name } => name,
        }
    }
}

/// A method definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MethodDecl {
    pub name: String,
    pub parameters: Vec<ParameterDecl>,
    pub returns: Option<TypeRef>,
    pub line: usize,
}

impl MethodDecl {
    pub fn new(name: &str, line: usize) -> Self {
        Self {
            name: name.to_string(),
            parameters: Vec::new(),
            returns: None,
            line,
        }
    }
}

/// A method parameter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParameterDecl {
    pub name: String,
    pub annotation: Option<TypeRef>,
}

impl ParameterDecl {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            annotation: None,
        }
    }

    pub fn with_annotation(name: &str, annotation: TypeRef) -> Self {
        Self {
            name: name.to_string(),
            annotation: Some(annotation),
        }
    }
}

/// An annotated class-level name
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassAnnotation {
    pub name: String,
    pub annotation: TypeRef,
    /// `ClassVar[...]` or `InitVar[...]`: never a dataclass field
    pub pseudo_field: bool,
    /// The annotation carries a value, so the name is also a class attribute
    pub has_value: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_tiers() {
        assert_eq!(describe(&TypeRef::qualified("pkg.mod", "Thing")), "pkg.mod.Thing");
        assert_eq!(describe(&TypeRef::bare("Thing")), "Thing");
        assert_eq!(describe(&TypeRef::raw("list[int]")), "list[int]");
    }

    #[test]
    fn test_describe_empty_module_falls_back_to_name() {
        assert_eq!(describe(&TypeRef::qualified("", "Thing")), "Thing");
    }

    #[test]
    fn test_display_matches_describe() {
        let reference = TypeRef::qualified("builtins", "int");
        assert_eq!(reference.to_string(), describe(&reference));
    }

    #[test]
    fn test_class_reference() {
        let class = ClassDecl::new("User", "models.user", 3);
        assert_eq!(describe(&class.reference()), "models.user.User");
        assert!(!class.is_dataclass);
    }

    #[test]
    fn test_annotation_for_takes_last() {
        let mut class = ClassDecl::new("A", "m", 1);
        for ty in ["int", "str"] {
            class.annotations.push(ClassAnnotation {
                name: "x".to_string(),
                annotation: TypeRef::qualified("builtins", ty),
                pseudo_field: false,
                has_value: false,
            });
        }
        let ann = class.annotation_for("x").unwrap();
        assert_eq!(ann.annotation.to_string(), "builtins.str");
        assert!(class.annotation_for("y").is_none());
    }

    #[test]
    fn test_member_name() {
        let attr = Member::Attribute { name: "x".to_string() };
        assert_eq!(attr.name(), "x");
        assert_eq!(Member::Method(MethodDecl::new("run", 2)).name(), "run");
    }
}
