pub mod auth;
pub mod error;
pub mod import;
pub mod models;
pub mod phone;
pub mod store;
pub mod template;
pub mod text;
pub mod whatsapp;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;
