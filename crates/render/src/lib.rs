pub mod bridge;
pub mod recording;
pub mod renderer;
pub mod section;

pub use bridge::*;
pub use recording::*;
pub use renderer::*;
pub use section::*;
