use tracing::trace;

/// Number of snapshots each history stack holds.
pub const MAX_SAVED_STATES: usize = 100;

/// Bounded LIFO of snapshots.
///
/// Overflow policy: when full, the stack is truncated to `capacity - 1`
/// entries by dropping from the most recently pushed end, then the new
/// snapshot is pushed. Only the newest entry is ever replaced; the oldest
/// history survives.
#[derive(Debug, Clone)]
pub struct SnapshotStack<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> SnapshotStack<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, snapshot: T) {
        if self.items.len() >= self.capacity {
            self.items.truncate(self.capacity - 1);
        }
        self.items.push(snapshot);
    }

    pub fn pop(&mut self) -> Option<T> {
        self.items.pop()
    }

    pub fn peek(&self) -> Option<&T> {
        self.items.last()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.items.iter()
    }
}

/// Independent undo and redo stacks.
///
/// The redo stack is not cleared by fresh edits; callers decide when to
/// push to which stack.
#[derive(Debug, Clone)]
pub struct History<T> {
    undo: SnapshotStack<T>,
    redo: SnapshotStack<T>,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self::with_capacity(MAX_SAVED_STATES)
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo: SnapshotStack::with_capacity(capacity),
            redo: SnapshotStack::with_capacity(capacity),
        }
    }

    pub fn push_undo(&mut self, snapshot: T) {
        self.undo.push(snapshot);
        trace!(undo = self.undo.len(), "push undo");
    }

    pub fn pop_undo(&mut self) -> Option<T> {
        self.undo.pop()
    }

    pub fn push_redo(&mut self, snapshot: T) {
        self.redo.push(snapshot);
        trace!(redo = self.redo.len(), "push redo");
    }

    pub fn pop_redo(&mut self) -> Option<T> {
        self.redo.pop()
    }

    pub fn undo_stack(&self) -> &SnapshotStack<T> {
        &self.undo
    }

    pub fn redo_stack(&self) -> &SnapshotStack<T> {
        &self.redo
    }
}
