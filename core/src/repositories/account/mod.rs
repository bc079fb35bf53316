//! Account repository module.

mod r#trait;
pub use r#trait::AccountRepository;

#[cfg(test)]
mod mock;
#[cfg(test)]
pub use mock::MockAccountRepository;
