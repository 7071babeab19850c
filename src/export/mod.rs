//! Project export formats.
//!
//! This module produces the documents handed to external renderers.

pub mod bbmodel;

pub use bbmodel::{create_project, Project};
