//! Credential state and single-flight refresh coordination.

pub mod refresh;
pub mod secret;
pub mod store;

pub use refresh::*;
pub use secret::*;
pub use store::*;
