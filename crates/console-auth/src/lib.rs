//! # console-auth
//!
//! Session/token lifecycle for the admin console gateway: the token bundle
//! data model, pure expiry policy, cookie-backed credential store, upstream
//! auth client, and the single-flight refresh coordinator.

pub mod client;
pub mod policy;
pub mod refresh;
pub mod store;
pub mod token;

pub use client::{AuthClient, LoginRequest, RefreshRequest, TokenExchange};
pub use refresh::RefreshCoordinator;
pub use store::{CredentialStore, LoadedSession, SessionUpdate};
pub use token::{Token, TokenBundle, UserRole};
