// Authentication helpers.
// Opaque bearer tokens; no signature or expiry checks are made client-side.

pub mod token;

pub use token::{TokenScope, TokenStore};
