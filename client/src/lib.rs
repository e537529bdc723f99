//! Dashboard client core: talks to the boda API and the WhatsApp service and
//! keeps the client-side state (identity, roster, lists, session) the
//! dashboard and the guest panel render from.

pub mod config;
pub mod envelope;
pub mod error;
pub mod http;
pub mod import;
pub mod lists;
pub mod messaging;
pub mod panel;
pub mod questions;
pub mod roster;
pub mod services;
pub mod session;
pub mod whatsapp;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::ApiClient;
pub use session::{IdentityProvider, Session};

#[cfg(test)]
mod tests;
