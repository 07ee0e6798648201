// Ancestor resolution order across every analyzed class

use crate::parser::{describe, ClassDecl};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// The universal root type, never listed as an ancestor
pub const ROOT_TYPE: &str = "builtins.object";

/// All resolved classes of a run, keyed by qualified name.
///
/// Classes outside the index are treated as leaves whose only parent is
/// the root type.
pub struct ClassIndex<'a> {
    classes: HashMap<String, &'a ClassDecl>,
    linearizations: RefCell<HashMap<String, Option<Vec<String>>>>,
}

impl<'a> ClassIndex<'a> {
    pub fn new(classes: impl IntoIterator<Item = &'a ClassDecl>) -> Self {
        let mut index = HashMap::new();
        for class in classes {
            let key = describe(&class.reference());
            if index.contains_key(&key) {
                debug!(class = %key, "duplicate class definition; keeping the first");
                continue;
            }
            index.insert(key, class);
        }

        Self {
            classes: index,
            linearizations: RefCell::new(HashMap::new()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&'a ClassDecl> {
        self.classes.get(key).copied()
    }

    /// Declared parents of `key`
    fn parents(&self, key: &str) -> Vec<String> {
        if key == ROOT_TYPE {
            return Vec::new();
        }
        match self.classes.get(key) {
            Some(class) if !class.bases.is_empty() => class.bases.iter().map(describe).collect(),
            _ => vec![ROOT_TYPE.to_string()],
        }
    }

    /// Ancestors of `key` in resolution order, without `key` and the root type
    pub fn ancestors(&self, key: &str) -> Vec<String> {
        let linearization = match self.c3(key, &mut Vec::new()) {
            Some(linearization) => linearization,
            None => {
                warn!(class = %key, "inconsistent class hierarchy; using depth-first order");
                self.depth_first(key)
            }
        };

        linearization
            .into_iter()
            .filter(|k| k != key && k != ROOT_TYPE)
            .collect()
    }

    /// C3 linearization, `None` for cycles and inconsistent hierarchies
    fn c3(&self, key: &str, stack: &mut Vec<String>) -> Option<Vec<String>> {
        if let Some(cached) = self.linearizations.borrow().get(key) {
            return cached.clone();
        }
        if stack.iter().any(|k| k == key) {
            return None;
        }

        stack.push(key.to_string());
        let parents = self.parents(key);
        let mut sequences = Vec::with_capacity(parents.len() + 1);
        let mut consistent = true;
        for parent in &parents {
            match self.c3(parent, stack) {
                Some(linearization) => sequences.push(linearization),
                None => {
                    consistent = false;
                    break;
                }
            }
        }
        stack.pop();

        let result = if consistent {
            sequences.push(parents);
            merge(sequences).map(|tail| {
                let mut linearization = vec![key.to_string()];
                linearization.extend(tail);
                linearization
            })
        } else {
            None
        };

        self.linearizations
            .borrow_mut()
            .insert(key.to_string(), result.clone());
        result
    }

    /// Left-to-right depth-first order without duplicates, root type last
    fn depth_first(&self, key: &str) -> Vec<String> {
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.visit(key, &mut order, &mut seen);
        order.retain(|k| k != ROOT_TYPE);
        order.push(ROOT_TYPE.to_string());
        order
    }

    fn visit(&self, key: &str, order: &mut Vec<String>, seen: &mut HashSet<String>) {
        if !seen.insert(key.to_string()) {
            return;
        }
        order.push(key.to_string());
        for parent in self.parents(key) {
            self.visit(&parent, order, seen);
        }
    }
}

/// The C3 merge step
fn merge(mut sequences: Vec<Vec<String>>) -> Option<Vec<String>> {
    let mut result = Vec::new();
    loop {
        sequences.retain(|s| !s.is_empty());
        if sequences.is_empty() {
            return Some(result);
        }

        let candidate = sequences
            .iter()
            .map(|s| &s[0])
            .find(|head| !sequences.iter().any(|s| s[1..].contains(head)))?
            .clone();

        for sequence in sequences.iter_mut() {
            if sequence[0] == candidate {
                sequence.remove(0);
            }
        }
        result.push(candidate);
    }
}
