//! Business services containing domain logic and use cases.

pub mod authority;
pub mod credential;
pub mod password;
pub mod token;

// Re-export commonly used types
pub use authority::AuthorityFacade;
pub use credential::CredentialAuthority;
pub use password::{BcryptPasswordHasher, PasswordHasher, PasswordPolicy};
pub use token::{
    AccessTokenSigner, CleanupResult, TokenCleanupConfig, TokenCleanupService, TokenStore,
    TokenValidator,
};
