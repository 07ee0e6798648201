// UML record labels
//
// Renders an EntityStructure as a Graphviz record label:
// {Name (b1, b2)|+ x: int\l|+ run()\l}

use crate::analysis::EntityStructure;

/// Line terminator for left-justified record lines
const LINE_END: &str = "\\l";

/// Visibility glyph for a member name
pub fn visibility(name: &str) -> char {
    if name.starts_with('_') {
        '-'
    } else {
        '+'
    }
}

/// Build the record label for one entity
pub fn format_label(entity: &EntityStructure) -> String {
    let mut header = escape_record(&entity.name);
    if !entity.bases.is_empty() {
        let bases: Vec<String> = entity.bases.iter().map(|b| escape_record(b)).collect();
        header.push_str(&format!(" ({})", bases.join(", ")));
    }

    let fields: Vec<String> = entity
        .fields
        .iter()
        .map(|f| {
            format!(
                "{} {}: {}",
                visibility(&f.name),
                escape_record(&f.name),
                escape_record(&f.type_name)
            )
        })
        .collect();

    let methods: Vec<String> = entity
        .methods
        .iter()
        .map(|m| format!("{} {}()", visibility(&m.name), escape_record(&m.name)))
        .collect();

    format!("{{{}|{}|{}}}", header, block(&fields), block(&methods))
}

fn block(lines: &[String]) -> String {
    let mut out = lines.join(LINE_END);
    out.push_str(LINE_END);
    out
}

/// Escape the characters Graphviz treats as record structure
fn escape_record(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '{' | '}' | '|' | '<' | '>') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
