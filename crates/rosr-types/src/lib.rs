//! Foundation types for research object storage (ROSR).
//!
//! Every other ROSR crate depends on `rosr-types`.
//!
//! # Key Types
//!
//! - [`Uri`] -- Absolute URI with resolve / relativize / rebase helpers
//! - [`UserMetadata`] -- The identity acting on a research object
//! - [`Role`] -- Coarse user role
//! - [`EvoType`] -- Evolution class of a research object (LIVE, SNAPSHOT, ARCHIVED)

pub mod error;
pub mod evo;
pub mod uri;
pub mod user;

pub use error::TypeError;
pub use evo::EvoType;
pub use uri::Uri;
pub use user::{Role, UserMetadata};
