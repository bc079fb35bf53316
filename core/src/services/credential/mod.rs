//! Credential authority: password resets, refresh token exchange and sessions

mod service;


pub use service::CredentialAuthority;
