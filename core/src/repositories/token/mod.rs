//! Token repository module.

mod r#trait;
pub use r#trait::TokenRepository;

#[cfg(test)]
mod mock;
#[cfg(test)]
pub use mock::MockTokenRepository;
