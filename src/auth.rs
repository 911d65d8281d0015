//! Auth-domain values handed between the client, the strategy, and verify callbacks.

pub mod profile;
pub mod token;

pub use profile::*;
pub use token::*;
