//! Auth-domain scope policy, credential encoders, and token models.

pub mod credential;
pub mod scope;
pub mod token;

pub use credential::*;
pub use scope::*;
pub use token::*;
