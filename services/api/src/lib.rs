//! Avatar Gateway Library Crate
//!
//! This library contains all the logic for the avatar's proxy gateway: the
//! configuration, the upstream clients, the API handlers, and routing. The
//! `api` binary is a thin wrapper around this library.

pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod state;
pub mod upstream;
