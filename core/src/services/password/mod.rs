//! Password strength policy and slow, salted hashing.

mod hasher;
mod policy;

pub use hasher::{BcryptPasswordHasher, PasswordHasher};
pub use policy::PasswordPolicy;
