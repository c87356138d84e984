pub mod color;
pub mod math;
pub mod number;

// Foundation crate: small, well-tested primitives only.
pub use color::*;
pub use math::*;
pub use number::*;
