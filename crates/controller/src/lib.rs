pub mod error;
pub mod store;
pub mod updates;
pub mod viewer;
pub mod widgets;

pub use error::*;
pub use store::*;
pub use updates::*;
pub use viewer::*;
pub use widgets::*;
