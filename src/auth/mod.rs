pub mod jwt;

pub use jwt::{Claims, generate_token, validate_token};
