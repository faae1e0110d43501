//! EduFun Integration - EduFun server client
//!
//! Provides authentication and the per-user profile document, over HTTP or
//! in memory.

pub mod error;
pub mod types;
pub mod auth;
pub mod profile;
pub mod memory;
pub mod client;

#[cfg(test)]
mod test_server;

pub use auth::{AuthManager, AuthService};
pub use client::ServerClient;
pub use error::IntegrationError;
pub use memory::{MemoryAuth, MemoryProfileRepository};
pub use profile::{ProfileApi, ProfileRepository, ProfileUpdate};
pub use types::*;
