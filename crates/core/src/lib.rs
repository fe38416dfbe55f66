//! Session orchestration for the robot avatar.
//!
//! This crate holds everything that runs next to the face renderer: the
//! session state machine, the capability traits it is driven through, the
//! HTTP client for the proxy gateway, and the display binding.

pub mod conversation;
pub mod display;
pub mod gateway_client;
pub mod media;
pub mod robot;
pub mod session;
