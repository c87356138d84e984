pub mod document;
pub mod query;
pub mod section_range;
pub mod share_url;

pub use document::*;
pub use query::*;
pub use section_range::*;
pub use share_url::*;
