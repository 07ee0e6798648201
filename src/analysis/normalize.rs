// Normalization of resolved classes into EntityStructure

use crate::analysis::model::{Annotation, EntityStructure};
use crate::analysis::mro::ClassIndex;
use crate::error::{Error, Result};
use crate::parser::{describe, ClassDecl, Member, MethodDecl};

/// Names with this prefix are internal and never extracted
pub const INTERNAL_PREFIX: &str = "__";

/// Key under which a method's return annotation is recorded
pub const RETURN_KEY: &str = "return";

/// The two ways a class can declare its fields
#[derive(Debug, Clone, Copy)]
pub enum EntityShape<'a> {
    /// An explicit, typed field list (`@dataclass`)
    Declarative(&'a ClassDecl),
    /// Fields inferred from class-body bindings
    Classic(&'a ClassDecl),
}

impl<'a> EntityShape<'a> {
    pub fn classify(class: &'a ClassDecl) -> Self {
        if class.is_dataclass {
            EntityShape::Declarative(class)
        } else {
            EntityShape::Classic(class)
        }
    }

    pub fn class(&self) -> &'a ClassDecl {
        match self {
            EntityShape::Declarative(class) | EntityShape::Classic(class) => class,
        }
    }

    /// Build the canonical structure of this class
    pub fn extract(&self, index: &ClassIndex<'_>) -> Result<EntityStructure> {
        let class = self.class();
        let name = describe(&class.reference());
        if class.name.is_empty() || name.is_empty() {
            return Err(Error::invariant(format!(
                "class without a name reached normalization (module {}, line {})",
                class.module, class.line_start
            )));
        }

        let bases = index.ancestors(&name);
        let mut entity = EntityStructure::new(name, class.module.clone());

        match self {
            EntityShape::Declarative(_) => declarative_fields(class, &bases, index, &mut entity),
            EntityShape::Classic(_) => classic_fields(class, &mut entity),
        }
        entity.bases = bases;

        for (_, member) in bindings(class) {
            if let Member::Method(method) = member {
                if !method.name.starts_with(INTERNAL_PREFIX) {
                    entity.insert_method(&method.name, method_annotations(method));
                }
            }
        }

        Ok(entity)
    }
}

/// Normalize one class
pub fn normalize(class: &ClassDecl, index: &ClassIndex<'_>) -> Result<EntityStructure> {
    EntityShape::classify(class).extract(index)
}

/// Final binding of every class-body name, positioned where it was first bound
fn bindings(class: &ClassDecl) -> Vec<(&str, &Member)> {
    let mut out: Vec<(&str, &Member)> = Vec::new();
    for member in &class.members {
        match out.iter_mut().find(|(name, _)| *name == member.name()) {
            Some(slot) => slot.1 = member,
            None => out.push((member.name(), member)),
        }
    }
    out
}

/// Dataclass fields: inherited dataclass fields first, then the class's own
fn declarative_fields(
    class: &ClassDecl,
    bases: &[String],
    index: &ClassIndex<'_>,
    entity: &mut EntityStructure,
) {
    let inherited = bases
        .iter()
        .rev()
        .filter_map(|base| index.get(base))
        .filter(|base| base.is_dataclass);

    for source in inherited.chain(std::iter::once(class)) {
        for annotation in &source.annotations {
            if annotation.pseudo_field || annotation.name.starts_with(INTERNAL_PREFIX) {
                continue;
            }
            entity.insert_field(&annotation.name, describe(&annotation.annotation));
        }
    }
}

/// Classic fields: own non-method attributes typed by class annotations
fn classic_fields(class: &ClassDecl, entity: &mut EntityStructure) {
    for (name, member) in bindings(class) {
        if name.starts_with(INTERNAL_PREFIX) {
            continue;
        }
        if let Member::Method(_) = member {
            continue;
        }
        let type_name = class
            .annotation_for(name)
            .map(|a| describe(&a.annotation))
            .unwrap_or_default();
        entity.insert_field(name, type_name);
    }
}

/// Annotated parameters in order, then the return annotation
fn method_annotations(method: &MethodDecl) -> Vec<Annotation> {
    let mut annotations: Vec<Annotation> = method
        .parameters
        .iter()
        .filter_map(|p| {
            p.annotation.as_ref().map(|a| Annotation {
                name: p.name.clone(),
                type_name: describe(a),
            })
        })
        .collect();

    if let Some(returns) = &method.returns {
        annotations.push(Annotation {
            name: RETURN_KEY.to_string(),
            type_name: describe(returns),
        });
    }

    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::format_label;
    use crate::parser::{ClassAnnotation, ParameterDecl, PythonResolver, SourceFile, TypeRef};

    fn annotation(name: &str, ty: TypeRef) -> ClassAnnotation {
        ClassAnnotation {
            name: name.to_string(),
            annotation: ty,
            pseudo_field: false,
            has_value: true,
        }
    }

    fn attribute(name: &str) -> Member {
        Member::Attribute {
            name: name.to_string(),
        }
    }

    fn method(name: &str) -> Member {
        Member::Method(MethodDecl::new(name, 1))
    }

    #[test]
    fn test_classify() {
        let mut class = ClassDecl::new("A", "m", 1);
        assert!(matches!(EntityShape::classify(&class), EntityShape::Classic(_)));
        class.is_dataclass = true;
        assert!(matches!(EntityShape::classify(&class), EntityShape::Declarative(_)));
    }

    #[test]
    fn test_empty_name_is_invariant_violation() {
        let class = ClassDecl::new("", "m", 7);
        let classes = vec![class.clone()];
        let index = ClassIndex::new(&classes);
        assert!(matches!(normalize(&class, &index), Err(Error::Invariant(_))));
    }

    #[test]
    fn test_classic_fields_and_methods() {
        let mut class = ClassDecl::new("Account", "bank", 1);
        class.members = vec![
            attribute("__slots__"),
            attribute("owner"),
            attribute("_balance"),
            method("__init__"),
            method("deposit"),
        ];
        class.annotations = vec![annotation("owner", TypeRef::qualified("builtins", "str"))];
        let classes = vec![class.clone()];
        let index = ClassIndex::new(&classes);

        let entity = normalize(&class, &index).unwrap();
        assert_eq!(entity.name, "bank.Account");
        assert_eq!(entity.module, "bank");
        assert!(entity.bases.is_empty());
        let fields: Vec<(&str, &str)> = entity
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_name.as_str()))
            .collect();
        assert_eq!(fields, vec![("owner", "builtins.str"), ("_balance", "")]);
        let methods: Vec<&str> = entity.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(methods, vec!["deposit"]);
    }

    #[test]
    fn test_rebinding_to_method_moves_out_of_fields() {
        let mut class = ClassDecl::new("A", "m", 1);
        class.members = vec![attribute("run"), attribute("x"), method("run")];
        let classes = vec![class.clone()];
        let index = ClassIndex::new(&classes);

        let entity = normalize(&class, &index).unwrap();
        assert_eq!(entity.fields.len(), 1);
        assert_eq!(entity.fields[0].name, "x");
        assert!(entity.method("run").is_some());
    }

    #[test]
    fn test_method_annotations() {
        let mut run = MethodDecl::new("run", 1);
        run.parameters = vec![
            ParameterDecl::new("self"),
            ParameterDecl::with_annotation("count", TypeRef::qualified("builtins", "int")),
            ParameterDecl::with_annotation("tag", TypeRef::raw("str | None")),
        ];
        run.returns = Some(TypeRef::bare("Result"));

        let annotations = method_annotations(&run);
        let pairs: Vec<(&str, &str)> = annotations
            .iter()
            .map(|a| (a.name.as_str(), a.type_name.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![("count", "builtins.int"), ("tag", "str | None"), ("return", "Result")]
        );
    }

    #[test]
    fn test_dataclass_inherits_fields() {
        let mut base = ClassDecl::new("Base", "m", 1);
        base.is_dataclass = true;
        base.annotations = vec![
            annotation("id", TypeRef::qualified("builtins", "int")),
            annotation("name", TypeRef::qualified("builtins", "str")),
        ];

        let mut child = ClassDecl::new("Child", "m", 5);
        child.is_dataclass = true;
        child.bases = vec![TypeRef::qualified("m", "Base")];
        let mut counter = annotation("registry", TypeRef::raw("ClassVar[int]"));
        counter.pseudo_field = true;
        child.annotations = vec![
            annotation("extra", TypeRef::qualified("builtins", "bool")),
            annotation("name", TypeRef::bare("Name")),
            counter,
        ];

        let classes = vec![base, child.clone()];
        let index = ClassIndex::new(&classes);
        let entity = normalize(&child, &index).unwrap();

        assert_eq!(entity.bases, vec!["m.Base"]);
        let fields: Vec<(&str, &str)> = entity
            .fields
            .iter()
            .map(|f| (f.name.as_str(), f.type_name.as_str()))
            .collect();
        assert_eq!(
            fields,
            vec![("id", "builtins.int"), ("name", "Name"), ("extra", "builtins.bool")]
        );
    }

    fn parse_one(source: &str) -> ClassDecl {
        let mut resolver = PythonResolver::new().unwrap();
        let file = SourceFile::new("m.py", "m", false);
        let mut module = resolver.resolve_source(source, &file).unwrap();
        module.classes.remove(0)
    }

    #[test]
    fn test_property_ignores_getter_return_type() {
        let class = parse_one("class A:\n    @property\n    def size(self) -> int:\n        return 0\n");
        let classes = vec![class.clone()];
        let index = ClassIndex::new(&classes);

        let entity = normalize(&class, &index).unwrap();
        assert_eq!(entity.field("size").unwrap().type_name, "");
        assert!(entity.methods.is_empty());
        assert!(format_label(&entity).contains("|+ size: \\l|"));
    }

    #[test]
    fn test_property_typed_by_class_annotation() {
        let class = parse_one(
            "class A:\n    size: float\n\n    @property\n    def size(self) -> int:\n        return 0\n",
        );
        let classes = vec![class.clone()];
        let index = ClassIndex::new(&classes);

        let entity = normalize(&class, &index).unwrap();
        assert_eq!(entity.field("size").unwrap().type_name, "builtins.float");
    }
}
