//! Common plugin infrastructure for plugin-loader
//!
//! Holds the data model exchanged between the loader and its collaborators,
//! and the capability traits (import, registration) the loader is built on.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ImportError, RegistrationError};
pub use traits::*;
pub use types::*;
