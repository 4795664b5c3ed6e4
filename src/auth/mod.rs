pub mod extractor;
pub mod password;
pub mod service;

pub use extractor::{AdminUser, AuthUser};
