use std::collections::{HashMap, HashSet};

const SHADOW_SUFFIX: &str = "_shadow";

/// Tracks every name declared so far in a tree, plus the renames
/// active in each lexical block.
#[derive(Debug)]
pub(super) struct RenameTable {
    declared: HashSet<String>,
    /// Innermost block last. Each block maps an original name to
    /// the name it was given for the rest of that block.
    scopes: Vec<HashMap<String, String>>,
}

impl RenameTable {
    pub(super) fn new() -> Self {
        Self {
            declared: HashSet::new(),
            scopes: vec![HashMap::new()],
        }
    }

    pub(super) fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pops the innermost block, forgetting the renames made inside it.
    pub(super) fn pop_scope(&mut self) {
        // The root block is never popped
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Declares `name` in the innermost block and returns the name it
    /// should be written as. A name that was already declared anywhere
    /// in the tree gets a fresh `_shadow` name.
    pub(super) fn declare(&mut self, name: &str) -> String {
        let res = if self.declared.contains(name) {
            self.fresh_name(name)
        } else {
            name.to_owned()
        };

        self.declared.insert(res.clone());

        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_owned(), res.clone());
        }

        res
    }

    /// The name a reference to `name` should be written as.
    pub(super) fn resolve(&self, name: &str) -> String {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name))
            .cloned()
            .unwrap_or_else(|| name.to_owned())
    }

    /// `name_shadow`, then `name_shadow0`, `name_shadow1`...
    fn fresh_name(&self, name: &str) -> String {
        let base = format!("{}{}", name, SHADOW_SUFFIX);

        if !self.declared.contains(&base) {
            return base;
        }

        (0..)
            .map(|i| format!("{}{}", base, i))
            .find(|candidate| !self.declared.contains(candidate))
            .unwrap_or(base)
    }
}
