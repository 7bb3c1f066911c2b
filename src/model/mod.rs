//! Model module
//!
//! Artifact format, the `Regressor` seam and the artifact store.

mod artifact;
mod store;

pub use artifact::{ModelArtifact, Regressor};
pub use store::ModelStore;
