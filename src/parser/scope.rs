// Per-file name resolution
//
// A ResolutionContext is built for exactly one module and dropped when the
// load of that module ends, so bindings never leak from one file into the
// next.

use crate::parser::ast::TypeRef;
use std::collections::HashMap;

/// Module that owns the Python builtins
pub const BUILTINS_MODULE: &str = "builtins";

const BUILTIN_TYPES: &[&str] = &[
    "object", "type", "int", "float", "complex", "bool", "str", "bytes", "bytearray",
    "memoryview", "list", "tuple", "dict", "set", "frozenset", "range", "slice",
    "property", "staticmethod", "classmethod", "super", "BaseException", "Exception",
    "ArithmeticError", "AssertionError", "AttributeError", "EOFError", "ImportError",
    "IndexError", "KeyError", "LookupError", "NameError", "NotImplementedError",
    "OSError", "IOError", "RuntimeError", "StopIteration", "TypeError", "ValueError",
    "ZeroDivisionError", "Warning", "UserWarning", "DeprecationWarning",
];

/// What a module-level name is currently bound to
#[derive(Debug, Clone, PartialEq)]
enum Binding {
    /// `class X` in this module
    Class,
    /// `from m import X as Y`: Y -> (m, X)
    Name { module: String, name: String },
    /// `import a.b as ab`: ab -> a.b
    Module(String),
}

/// Name bindings visible at module level; a later binding replaces an earlier one
#[derive(Debug, Clone, Default)]
pub struct ResolutionContext {
    module: String,
    package: String,
    bindings: HashMap<String, Binding>,
}

impl ResolutionContext {
    /// Create a context for `module`; a package's `__init__` is its own package.
    pub fn new(module: &str, is_package: bool) -> Self {
        let package = if is_package {
            module.to_string()
        } else {
            module
                .rsplit_once('.')
                .map(|(parent, _)| parent.to_string())
                .unwrap_or_default()
        };

        Self {
            module: module.to_string(),
            package,
            ..Default::default()
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    /// Record a class defined at module level
    pub fn declare_class(&mut self, name: &str) {
        self.bindings.insert(name.to_string(), Binding::Class);
    }

    /// Record `import dotted [as alias]`
    pub fn bind_import(&mut self, dotted: &str, alias: Option<&str>) {
        match alias {
            Some(alias) => {
                self.bindings
                    .insert(alias.to_string(), Binding::Module(dotted.to_string()));
            }
            None => {
                // `import a.b` binds `a`
                let head = dotted.split('.').next().unwrap_or(dotted);
                self.bindings
                    .insert(head.to_string(), Binding::Module(head.to_string()));
            }
        }
    }

    /// Record `from [.]*module import name [as alias]`
    pub fn bind_from_import(&mut self, module: &str, level: usize, name: &str, alias: Option<&str>) {
        let binding = Binding::Name {
            module: self.absolute_module(module, level),
            name: name.to_string(),
        };
        self.bindings.insert(alias.unwrap_or(name).to_string(), binding);
    }

    /// Turn a possibly relative module path into an absolute one
    pub fn absolute_module(&self, module: &str, level: usize) -> String {
        if level == 0 {
            return module.to_string();
        }

        let mut parts: Vec<&str> = if self.package.is_empty() {
            Vec::new()
        } else {
            self.package.split('.').collect()
        };
        for _ in 1..level {
            parts.pop();
        }
        if !module.is_empty() {
            parts.push(module);
        }
        parts.join(".")
    }

    /// Resolve a bare identifier
    pub fn resolve_name(&self, ident: &str) -> TypeRef {
        match self.bindings.get(ident) {
            Some(Binding::Class) => return TypeRef::qualified(&self.module, ident),
            Some(Binding::Name { module, name }) => return TypeRef::qualified(module, name),
            Some(Binding::Module(_)) | None => {}
        }
        if BUILTIN_TYPES.contains(&ident) {
            return TypeRef::qualified(BUILTINS_MODULE, ident);
        }
        TypeRef::bare(ident)
    }

    /// Resolve a dotted attribute chain such as `models.base.Model`
    pub fn resolve_dotted(&self, dotted: &str) -> TypeRef {
        let Some((prefix, last)) = dotted.rsplit_once('.') else {
            return self.resolve_name(dotted);
        };
        let (head, rest) = match prefix.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (prefix, None),
        };

        let module = match self.bindings.get(head) {
            Some(Binding::Module(module)) => module.clone(),
            // `from pkg import mod` then `mod.X`
            Some(Binding::Name { module, name }) => join_module(module, name),
            // Attribute of a local class: the nested class lives in this module
            Some(Binding::Class) => return TypeRef::qualified(&self.module, last),
            None => return TypeRef::qualified(prefix, last),
        };
        let module = match rest {
            Some(rest) => join_module(&module, rest),
            None => module,
        };
        TypeRef::qualified(&module, last)
    }
}

fn join_module(module: &str, name: &str) -> String {
    if module.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", module, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_import_from_plain_module() {
        let ctx = ResolutionContext::new("pkg.sub.mod", false);
        assert_eq!(ctx.absolute_module("base", 1), "pkg.sub.base");
        assert_eq!(ResolutionContext::new("mod", false).absolute_module("base", 1), "base");
    }

    #[test]
    fn test_relative_import_from_init() {
        let ctx = ResolutionContext::new("pkg.sub", true);
        assert_eq!(ctx.absolute_module("base", 1), "pkg.sub.base");
        assert_eq!(ctx.absolute_module("", 2), "pkg");
    }

    #[test]
    fn test_local_class_is_qualified() {
        let mut ctx = ResolutionContext::new("shapes", false);
        ctx.declare_class("Circle");
        assert_eq!(ctx.resolve_name("Circle"), TypeRef::qualified("shapes", "Circle"));
    }

    #[test]
    fn test_builtins_are_qualified() {
        let ctx = ResolutionContext::new("m", false);
        assert_eq!(ctx.resolve_name("int"), TypeRef::qualified("builtins", "int"));
        assert_eq!(ctx.resolve_name("Exception"), TypeRef::qualified("builtins", "Exception"));
    }

    #[test]
    fn test_unknown_name_is_bare() {
        let ctx = ResolutionContext::new("m", false);
        assert_eq!(ctx.resolve_name("Mystery"), TypeRef::bare("Mystery"));
    }

    #[test]
    fn test_from_import_with_alias() {
        let mut ctx = ResolutionContext::new("app", false);
        ctx.bind_from_import("models.base", 0, "Model", Some("BaseModel"));
        assert_eq!(
            ctx.resolve_name("BaseModel"),
            TypeRef::qualified("models.base", "Model")
        );
        assert_eq!(ctx.resolve_name("Model"), TypeRef::bare("Model"));
    }

    #[test]
    fn test_relative_imports() {
        let mut ctx = ResolutionContext::new("pkg.sub.mod", false);
        ctx.bind_from_import("base", 1, "Base", None);
        ctx.bind_from_import("util", 2, "Helper", None);
        ctx.bind_from_import("", 1, "Sibling", None);
        assert_eq!(ctx.resolve_name("Base"), TypeRef::qualified("pkg.sub.base", "Base"));
        assert_eq!(ctx.resolve_name("Helper"), TypeRef::qualified("pkg.util", "Helper"));
        assert_eq!(ctx.resolve_name("Sibling"), TypeRef::qualified("pkg.sub", "Sibling"));
    }

    #[test]
    fn test_dotted_through_module_alias() {
        let mut ctx = ResolutionContext::new("app", false);
        ctx.bind_import("numpy", Some("np"));
        ctx.bind_import("os.path", None);
        assert_eq!(ctx.resolve_dotted("np.ndarray"), TypeRef::qualified("numpy", "ndarray"));
        assert_eq!(ctx.resolve_dotted("os.path.Thing"), TypeRef::qualified("os.path", "Thing"));
    }

    #[test]
    fn test_dotted_unknown_prefix() {
        let ctx = ResolutionContext::new("app", false);
        assert_eq!(ctx.resolve_dotted("a.b.C"), TypeRef::qualified("a.b", "C"));
        assert_eq!(ctx.resolve_dotted("C"), TypeRef::bare("C"));
    }

    #[test]
    fn test_dotted_nested_class() {
        let mut ctx = ResolutionContext::new("app", false);
        ctx.declare_class("Outer");
        assert_eq!(ctx.resolve_dotted("Outer.Inner"), TypeRef::qualified("app", "Inner"));
    }

    #[test]
    fn test_dotted_through_from_imported_module() {
        let mut ctx = ResolutionContext::new("shop.cart", false);
        ctx.bind_from_import("models", 1, "item", None);
        ctx.bind_from_import("", 1, "util", None);
        assert_eq!(
            ctx.resolve_dotted("item.Item"),
            TypeRef::qualified("shop.models.item", "Item")
        );
        assert_eq!(ctx.resolve_dotted("util.fmt.Printer"), TypeRef::qualified("shop.util.fmt", "Printer"));
    }

    #[test]
    fn test_later_binding_wins() {
        let mut ctx = ResolutionContext::new("ext", false);
        ctx.bind_from_import("base", 0, "Widget", None);
        assert_eq!(ctx.resolve_name("Widget"), TypeRef::qualified("base", "Widget"));

        ctx.declare_class("Widget");
        assert_eq!(ctx.resolve_name("Widget"), TypeRef::qualified("ext", "Widget"));

        ctx.bind_from_import("other", 0, "Widget", None);
        assert_eq!(ctx.resolve_name("Widget"), TypeRef::qualified("other", "Widget"));
    }

    #[test]
    fn test_module_binding_is_not_a_type() {
        let mut ctx = ResolutionContext::new("app", false);
        ctx.bind_import("json", None);
        assert_eq!(ctx.resolve_name("json"), TypeRef::bare("json"));
    }
}
