//! Bearer token verification

mod handler;
mod types;

#[cfg(test)]
mod tests;

pub use handler::TokenVerifier;
pub use types::Claims;
