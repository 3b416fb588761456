// Credential primitives: bcrypt password hashes and session-bound JWTs

pub mod jwt;
pub mod password;

pub use jwt::{create_token, verify_token, Claims};
