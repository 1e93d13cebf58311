//! Request/response DTOs.
//!
//! The auth wire shapes (`LoginRequest`, `RefreshRequest`, `Token`) live in
//! `console-auth`; this module holds the document and utility shapes.

pub mod response;
