// Python entity resolver using tree-sitter

use crate::error::{Error, Result};
use crate::parser::ast::*;
use crate::parser::scope::ResolutionContext;
use crate::parser::EntityResolver;
use tracing::debug;
use tree_sitter::{Node, Parser};

const DATACLASS_DECORATORS: &[&str] = &["dataclasses.dataclass", "pydantic.dataclasses.dataclass"];
const PROPERTY_DECORATORS: &[&str] = &[
    "property",
    "cached_property",
    "abstractproperty",
    "getter",
    "setter",
    "deleter",
];
const PSEUDO_FIELD_MARKERS: &[&str] = &["ClassVar", "InitVar"];

/// Resolver for Python source files
pub struct PythonResolver {
    parser: Parser,
}

impl PythonResolver {
    /// Create a new Python resolver
    pub fn new() -> Result<Self> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Parser(format!("Failed to set Python language: {}", e)))?;
        Ok(Self { parser })
    }

    /// Resolve Python source text
    pub fn resolve_source(&mut self, source: &str, file: &SourceFile) -> Result<ParsedModule> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| Error::parser("Failed to parse source"))?;

        let root = tree.root_node();
        if let Some(bad) = first_error(&root) {
            let pos = bad.start_position();
            return Err(Error::parse(
                &file.path,
                format!("invalid syntax (line {}, column {})", pos.row + 1, pos.column + 1),
            ));
        }
        if let Some((bad, message)) = misplaced_statement(&root) {
            return Err(Error::parse(
                &file.path,
                format!("{} (line {})", message, line(&bad)),
            ));
        }

        let bytes = source.as_bytes();
        let mut statements = Vec::new();
        collect_statements(&root, &mut statements);

        // Bindings apply in statement order. A class header sees only what is
        // bound before it; bodies see the module's final bindings, so
        // annotations can refer to classes declared further down the file.
        let mut ctx = ResolutionContext::new(&file.module, file.is_package);
        let mut headers = Vec::new();
        for stmt in &statements {
            match stmt.kind() {
                "import_statement" => bind_import(stmt, bytes, &mut ctx),
                "import_from_statement" => bind_import_from(stmt, bytes, &mut ctx),
                "class_definition" | "decorated_definition" => {
                    let Some(name) = class_node(stmt).and_then(|c| c.child_by_field_name("name"))
                    else {
                        continue;
                    };
                    headers.push((*stmt, ctx.clone()));
                    ctx.declare_class(text(&name, bytes));
                }
                _ => {}
            }
        }

        let mut module = ParsedModule::new(file.path.clone(), file.module.clone());
        for (stmt, header_ctx) in &headers {
            if let Some(class) = parse_class(stmt, bytes, header_ctx, &ctx) {
                if class.name.starts_with("__") {
                    continue;
                }
                debug!(module = %file.module, class = %class.name, "resolved class");
                module.classes.push(class);
            }
        }

        Ok(module)
    }
}

impl EntityResolver for PythonResolver {
    fn extension(&self) -> &'static str {
        "py"
    }

    fn resolve(&mut self, file: &SourceFile) -> Result<ParsedModule> {
        let source = std::fs::read_to_string(&file.path).map_err(|e| {
            Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", file.path.display(), e)))
        })?;
        self.resolve_source(&source, file)
    }
}

fn text<'a>(node: &Node, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or_default()
}

fn line(node: &Node) -> usize {
    node.start_position().row + 1
}

/// First syntax error or missing token in the tree
fn first_error<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    if node.is_error() || node.is_missing() {
        return Some(*node);
    }
    if !node.has_error() {
        return None;
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.children(&mut cursor).collect();
    children.iter().find_map(|child| first_error(child))
}

/// A `return` or `yield` outside any function body
fn misplaced_statement<'t>(node: &Node<'t>) -> Option<(Node<'t>, &'static str)> {
    match node.kind() {
        "function_definition" | "lambda" => return None,
        "return_statement" => return Some((*node, "'return' outside function")),
        "yield" => return Some((*node, "'yield' outside function")),
        _ => {}
    }
    let mut cursor = node.walk();
    let children: Vec<Node<'t>> = node.named_children(&mut cursor).collect();
    children.iter().find_map(|child| misplaced_statement(child))
}

/// Statements of a block, descending into compound statements whose bodies
/// still bind names in the enclosing scope.
fn collect_statements<'t>(node: &Node<'t>, out: &mut Vec<Node<'t>>) {
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "if_statement" | "elif_clause" | "else_clause" | "try_statement" | "except_clause"
            | "except_group_clause" | "finally_clause" | "with_statement" | "block" => {
                collect_statements(&child, out)
            }
            _ => out.push(child),
        }
    }
}

/// The class_definition behind a statement, if any
fn class_node<'t>(node: &Node<'t>) -> Option<Node<'t>> {
    match node.kind() {
        "class_definition" => Some(*node),
        "decorated_definition" => node
            .child_by_field_name("definition")
            .filter(|d| d.kind() == "class_definition"),
        _ => None,
    }
}

fn bind_import(node: &Node, source: &[u8], ctx: &mut ResolutionContext) {
    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        match name.kind() {
            "dotted_name" => ctx.bind_import(text(&name, source), None),
            "aliased_import" => {
                if let Some(dotted) = name.child_by_field_name("name") {
                    let alias = name.child_by_field_name("alias").map(|a| text(&a, source));
                    ctx.bind_import(text(&dotted, source), alias);
                }
            }
            _ => {}
        }
    }
}

fn bind_import_from(node: &Node, source: &[u8], ctx: &mut ResolutionContext) {
    let Some(module_node) = node.child_by_field_name("module_name") else {
        return;
    };

    let (module, level) = if module_node.kind() == "relative_import" {
        let mut level = 0;
        let mut module = "";
        let mut cursor = module_node.walk();
        for part in module_node.named_children(&mut cursor) {
            match part.kind() {
                "import_prefix" => level = text(&part, source).chars().filter(|c| *c == '.').count(),
                "dotted_name" => module = text(&part, source),
                _ => {}
            }
        }
        (module, level)
    } else {
        (text(&module_node, source), 0)
    };

    let mut cursor = node.walk();
    for name in node.children_by_field_name("name", &mut cursor) {
        match name.kind() {
            "dotted_name" => ctx.bind_from_import(module, level, text(&name, source), None),
            "aliased_import" => {
                if let Some(original) = name.child_by_field_name("name") {
                    let alias = name.child_by_field_name("alias").map(|a| text(&a, source));
                    ctx.bind_from_import(module, level, text(&original, source), alias);
                }
            }
            _ => {}
        }
    }
}

fn is_dotted_chain(node: &Node) -> bool {
    match node.kind() {
        "identifier" => true,
        "attribute" => {
            node.child_by_field_name("object").is_some_and(|o| is_dotted_chain(&o))
                && node
                    .child_by_field_name("attribute")
                    .is_some_and(|a| a.kind() == "identifier")
        }
        _ => false,
    }
}

/// Resolve an expression used as a type or entity reference
fn resolve_expression(node: &Node, source: &[u8], ctx: &ResolutionContext) -> TypeRef {
    match node.kind() {
        "identifier" => ctx.resolve_name(text(node, source)),
        "attribute" if is_dotted_chain(node) => {
            let dotted: String = text(node, source).chars().filter(|c| !c.is_whitespace()).collect();
            ctx.resolve_dotted(&dotted)
        }
        "type" => match node.named_child(0) {
            Some(inner) => resolve_expression(&inner, source, ctx),
            None => TypeRef::raw(text(node, source)),
        },
        // `a.B` in annotation position
        "member_type" if is_dotted_text(text(node, source)) => {
            let dotted: String = text(node, source).chars().filter(|c| !c.is_whitespace()).collect();
            ctx.resolve_dotted(&dotted)
        }
        "string" => TypeRef::raw(strip_quotes(text(node, source))),
        _ => TypeRef::raw(text(node, source)),
    }
}

/// Resolve a base class expression; `Generic[T]` resolves to `Generic`
fn resolve_base(node: &Node, source: &[u8], ctx: &ResolutionContext) -> TypeRef {
    match node.kind() {
        "subscript" | "generic_type" => match node.child_by_field_name("value").or_else(|| node.named_child(0)) {
            Some(value) => resolve_expression(&value, source, ctx),
            None => TypeRef::raw(text(node, source)),
        },
        _ => resolve_expression(node, source, ctx),
    }
}

fn is_dotted_text(s: &str) -> bool {
    s.split('.').all(|part| {
        let part = part.trim();
        !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_')
    })
}

fn strip_quotes(s: &str) -> &str {
    let s = s.trim_start_matches(|c: char| c.is_ascii_alphabetic());
    for quote in ["\"\"\"", "'''", "\"", "'"] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|rest| rest.strip_suffix(quote)) {
            return inner.trim();
        }
    }
    s
}

/// Decorators of a decorated definition, resolved to their callee
fn parse_decorators(node: &Node, source: &[u8], ctx: &ResolutionContext) -> Vec<TypeRef> {
    let mut decorators = Vec::new();
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "decorator" {
            continue;
        }
        if let Some(expr) = child.named_child(0) {
            let callee = if expr.kind() == "call" {
                expr.child_by_field_name("function").unwrap_or(expr)
            } else {
                expr
            };
            decorators.push(resolve_expression(&callee, source, ctx));
        }
    }
    decorators
}

fn is_dataclass_decorator(decorator: &TypeRef) -> bool {
    match decorator {
        TypeRef::Bare(name) => name == "dataclass",
        other => DATACLASS_DECORATORS.contains(&describe(other).as_str()),
    }
}

fn is_property_decorator(decorator: &TypeRef) -> bool {
    decorator.name().is_some_and(|n| PROPERTY_DECORATORS.contains(&n))
}

/// Parse a module-level class statement. Decorators and bases resolve
/// against `header`, the bindings in effect where the class is defined.
fn parse_class(
    node: &Node,
    source: &[u8],
    header: &ResolutionContext,
    ctx: &ResolutionContext,
) -> Option<ClassDecl> {
    let class = class_node(node)?;
    let name = class.child_by_field_name("name")?;
    let mut decl = ClassDecl::new(text(&name, source), ctx.module(), line(node));
    if node.kind() == "decorated_definition" {
        decl.is_dataclass = parse_decorators(node, source, header)
            .iter()
            .any(is_dataclass_decorator);
    }

    if let Some(superclasses) = class.child_by_field_name("superclasses") {
        let mut cursor = superclasses.walk();
        for base in superclasses.named_children(&mut cursor) {
            match base.kind() {
                "keyword_argument" | "list_splat" | "dictionary_splat" | "comment" => {}
                _ => decl.bases.push(resolve_base(&base, source, header)),
            }
        }
    }

    if let Some(body) = class.child_by_field_name("body") {
        parse_class_body(&body, source, ctx, &mut decl);
    }

    Some(decl)
}

/// Record the bindings of a class body in source order
fn parse_class_body(body: &Node, source: &[u8], ctx: &ResolutionContext, decl: &mut ClassDecl) {
    let mut statements = Vec::new();
    collect_statements(body, &mut statements);

    for stmt in statements {
        match stmt.kind() {
            "function_definition" => {
                if let Some(method) = parse_method(&stmt, source, ctx) {
                    decl.members.push(Member::Method(method));
                }
            }
            "class_definition" => {
                if let Some(name) = stmt.child_by_field_name("name") {
                    decl.members.push(Member::Attribute {
                        name: text(&name, source).to_string(),
                    });
                }
            }
            "decorated_definition" => {
                let Some(definition) = stmt.child_by_field_name("definition") else {
                    continue;
                };
                let decorators = parse_decorators(&stmt, source, ctx);
                match definition.kind() {
                    // A property is an attribute, typed like any other
                    "function_definition" if decorators.iter().any(is_property_decorator) => {
                        if let Some(name) = definition.child_by_field_name("name") {
                            decl.members.push(Member::Attribute {
                                name: text(&name, source).to_string(),
                            });
                        }
                    }
                    "function_definition" => {
                        if let Some(method) = parse_method(&definition, source, ctx) {
                            decl.members.push(Member::Method(method));
                        }
                    }
                    "class_definition" => {
                        if let Some(name) = definition.child_by_field_name("name") {
                            decl.members.push(Member::Attribute {
                                name: text(&name, source).to_string(),
                            });
                        }
                    }
                    _ => {}
                }
            }
            "expression_statement" => {
                let mut cursor = stmt.walk();
                for child in stmt.named_children(&mut cursor) {
                    if child.kind() == "assignment" {
                        parse_assignment(&child, source, ctx, decl);
                    }
                }
            }
            _ => {}
        }
    }
}

/// Record targets and annotation of a class-level assignment
fn parse_assignment(node: &Node, source: &[u8], ctx: &ResolutionContext, decl: &mut ClassDecl) {
    let Some(left) = node.child_by_field_name("left") else {
        return;
    };
    let right = node.child_by_field_name("right");

    if let Some(annotation) = node.child_by_field_name("type") {
        if left.kind() == "identifier" {
            decl.annotations.push(ClassAnnotation {
                name: text(&left, source).to_string(),
                annotation: resolve_expression(&annotation, source, ctx),
                pseudo_field: is_pseudo_field(&annotation, source, ctx),
                has_value: right.is_some(),
            });
        }
    }

    let Some(right) = right else {
        return;
    };

    let mut targets = Vec::new();
    collect_targets(&left, source, &mut targets);
    for name in targets {
        decl.members.push(Member::Attribute {
            name: name.to_string(),
        });
    }

    // `a = b = value`
    if right.kind() == "assignment" {
        parse_assignment(&right, source, ctx, decl);
    }
}

fn collect_targets<'a>(node: &Node, source: &'a [u8], out: &mut Vec<&'a str>) {
    match node.kind() {
        "identifier" => out.push(text(node, source)),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "expression_list" | "tuple" | "list" => {
            let mut cursor = node.walk();
            for child in node.named_children(&mut cursor) {
                collect_targets(&child, source, out);
            }
        }
        _ => {}
    }
}

/// `ClassVar[...]` and `InitVar[...]` never become dataclass fields
fn is_pseudo_field(annotation: &Node, source: &[u8], ctx: &ResolutionContext) -> bool {
    let expr = match annotation.kind() {
        "type" => match annotation.named_child(0) {
            Some(inner) => inner,
            None => return false,
        },
        _ => *annotation,
    };
    let head = resolve_base(&expr, source, ctx);
    head.name().is_some_and(|n| PSEUDO_FIELD_MARKERS.contains(&n))
}

/// Parse a function definition inside a class body
fn parse_method(node: &Node, source: &[u8], ctx: &ResolutionContext) -> Option<MethodDecl> {
    let name = node.child_by_field_name("name")?;
    let mut method = MethodDecl::new(text(&name, source), line(node));

    if let Some(parameters) = node.child_by_field_name("parameters") {
        method.parameters = parse_parameters(&parameters, source, ctx);
    }
    if let Some(returns) = node.child_by_field_name("return_type") {
        method.returns = Some(resolve_expression(&returns, source, ctx));
    }

    Some(method)
}

/// Parse method parameters
fn parse_parameters(node: &Node, source: &[u8], ctx: &ResolutionContext) -> Vec<ParameterDecl> {
    let mut params = Vec::new();
    let mut cursor = node.walk();

    for child in node.named_children(&mut cursor) {
        match child.kind() {
            "identifier" => params.push(ParameterDecl::new(text(&child, source))),
            "list_splat_pattern" | "dictionary_splat_pattern" => {
                if let Some(name) = splat_name(&child, source) {
                    params.push(ParameterDecl::new(name));
                }
            }
            "default_parameter" => {
                if let Some(name) = child.child_by_field_name("name") {
                    params.push(ParameterDecl::new(text(&name, source)));
                }
            }
            "typed_parameter" => {
                let name = child.named_child(0).and_then(|n| match n.kind() {
                    "identifier" => Some(text(&n, source)),
                    "list_splat_pattern" | "dictionary_splat_pattern" => splat_name(&n, source),
                    _ => None,
                });
                if let Some(name) = name {
                    params.push(annotated(name, child.child_by_field_name("type"), source, ctx));
                }
            }
            "typed_default_parameter" => {
                if let Some(name) = child.child_by_field_name("name") {
                    params.push(annotated(
                        text(&name, source),
                        child.child_by_field_name("type"),
                        source,
                        ctx,
                    ));
                }
            }
            _ => {}
        }
    }

    params
}

fn splat_name<'a>(node: &Node, source: &'a [u8]) -> Option<&'a str> {
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "identifier")
        .map(|c| text(&c, source));
    found
}

fn annotated(name: &str, ty: Option<Node>, source: &[u8], ctx: &ResolutionContext) -> ParameterDecl {
    match ty {
        Some(ty) => ParameterDecl::with_annotation(name, resolve_expression(&ty, source, ctx)),
        None => ParameterDecl::new(name),
    }
}
