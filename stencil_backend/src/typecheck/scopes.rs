use std::collections::HashMap;

use crate::{
    tree::ROOT_VARIABLE,
    types::{TypeId, DYNAMIC},
};

/// The key the cursor type is stored under in a frame.
pub const CURSOR: &str = ".";

/// The variables visible in one lexical block, and the type of the cursor there.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScopeFrame {
    variables: HashMap<String, TypeId>,
}

impl ScopeFrame {
    fn new(cursor: TypeId) -> Self {
        let mut variables = HashMap::new();
        variables.insert(CURSOR.to_owned(), cursor);
        Self { variables }
    }

    pub fn cursor(&self) -> TypeId {
        self.variables.get(CURSOR).copied().unwrap_or(DYNAMIC)
    }

    pub fn get(&self, name: &str) -> Option<TypeId> {
        self.variables.get(name).copied()
    }

    /// Every name in this frame, including [`CURSOR`].
    pub fn variables(&self) -> &HashMap<String, TypeId> {
        &self.variables
    }
}

/// The frames a tree opens, kept in the order they were first opened.
///
/// Type checking opens frames with [`ScopeStack::push`]. Later passes walk
/// the same tree again after [`ScopeStack::rewind`], reopening each frame
/// in turn with [`ScopeStack::enter`], so they see exactly the types
/// type checking recorded.
#[derive(Clone, Debug, PartialEq)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
    /// Indices into `frames`, innermost last. Never empty.
    active: Vec<usize>,
    /// The frame `enter` opens next.
    replay: usize,
}

impl ScopeStack {
    pub fn new(root_cursor: TypeId) -> Self {
        Self {
            frames: vec![ScopeFrame::new(root_cursor)],
            active: vec![0],
            replay: 1,
        }
    }

    /// Opens a brand new frame with the given cursor type.
    pub fn push(&mut self, cursor: TypeId) {
        self.frames.push(ScopeFrame::new(cursor));
        self.active.push(self.frames.len() - 1);
    }

    /// Reopens the next recorded frame.
    /// Returns `false` if every frame has been entered already.
    pub fn enter(&mut self) -> bool {
        if self.replay >= self.frames.len() {
            return false;
        }

        self.active.push(self.replay);
        self.replay += 1;
        true
    }

    /// Closes the innermost frame. The root frame stays open.
    pub fn leave(&mut self) {
        if self.active.len() > 1 {
            self.active.pop();
        }
    }

    /// Goes back to the root frame, ready to replay the frames with `enter`.
    pub fn rewind(&mut self) {
        self.active.truncate(1);
        self.replay = 1;
    }

    /// The number of open frames, the root included.
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    pub fn current(&self) -> &ScopeFrame {
        let index = self.active.last().copied().unwrap_or(0);
        &self.frames[index]
    }

    fn current_mut(&mut self) -> &mut ScopeFrame {
        let index = self.active.last().copied().unwrap_or(0);
        &mut self.frames[index]
    }

    pub fn root(&self) -> &ScopeFrame {
        &self.frames[0]
    }

    /// Every frame ever opened, in the order they were opened.
    pub fn frames(&self) -> &[ScopeFrame] {
        &self.frames
    }

    pub fn cursor(&self) -> TypeId {
        self.current().cursor()
    }

    pub fn root_cursor(&self) -> TypeId {
        self.root().cursor()
    }

    /// Records `name` in the innermost frame.
    pub fn add_variable(&mut self, name: impl ToString, ty: TypeId) {
        self.current_mut().variables.insert(name.to_string(), ty);
    }

    /// Whether the innermost frame declares `name`.
    pub fn has_variable(&self, name: &str) -> bool {
        self.current().variables.contains_key(name)
    }

    /// The type of `name` in the innermost frame only.
    pub fn get_variable(&self, name: &str) -> Option<TypeId> {
        self.current().get(name)
    }

    /// Looks `name` up from the innermost open frame outwards.
    /// `$` is always the root cursor.
    pub fn find_variable(&self, name: &str) -> Option<TypeId> {
        if name == ROOT_VARIABLE {
            return Some(self.root_cursor());
        }

        self.active
            .iter()
            .rev()
            .find_map(|&index| self.frames[index].get(name))
    }
}
