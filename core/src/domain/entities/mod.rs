//! Domain entities representing core business objects.

pub mod account;
pub mod token;

pub use account::Account;
pub use token::{
    Claims, IssuedToken, Token, TokenKind, TokenPair, TokenVerdict, ACCESS_TOKEN_EXPIRY_MINUTES,
    REFRESH_TOKEN_EXPIRY_DAYS, RESET_TOKEN_EXPIRY_MINUTES,
};
