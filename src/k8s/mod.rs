pub mod ignore;
pub mod replacement;
pub mod resources;

pub use ignore::IgnoreSet;
pub use resources::{GroupResourceKind, list_resources};
