//! Workspace facade, re-exports the `pixl` umbrella crate.
pub use pixl::*;
