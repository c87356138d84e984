use scene::ApplicationState;

/// An independent copy of the whole application state, taken for the
/// undo/redo history. Read-only once taken.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(ApplicationState);

impl Snapshot {
    pub fn state(&self) -> &ApplicationState {
        &self.0
    }

    pub fn into_state(self) -> ApplicationState {
        self.0
    }
}

/// Holds the single live application state.
#[derive(Debug)]
pub struct StateStore {
    state: ApplicationState,
}

impl StateStore {
    pub fn new(mut state: ApplicationState) -> Self {
        state.normalize();
        Self { state }
    }

    pub fn get(&self) -> &ApplicationState {
        &self.state
    }

    pub fn get_mut(&mut self) -> &mut ApplicationState {
        &mut self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.state.clone())
    }

    /// Copies `new` into the live slot and re-derives defaults.
    pub fn replace(&mut self, new: &ApplicationState) {
        self.state = new.clone();
        self.state.normalize();
    }
}
