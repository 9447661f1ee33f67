//! # waldo-relay
//!
//! Turns the single shared robot connection into many concurrent,
//! independently-timed command futures.
//!
//! [`CommandRelay`] owns the pending-command table and the correlation-id
//! counter. It does not own the connection's lifecycle: the transport layer
//! binds an outbound channel when the robot connects and unbinds it when the
//! socket closes. Every pending command settles exactly once — on a matching
//! result, on its own timeout, or when the registered link drops.
//!
//! ## Crate Position
//!
//! Depends on: waldo-core.
//! Depended on by: waldo-tools, waldo-runtime, waldo-server.

#![deny(unsafe_code)]

mod relay;

pub use relay::{CommandRelay, LinkId};
