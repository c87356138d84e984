pub mod categories;
pub mod state;

pub use categories::*;
pub use state::*;
