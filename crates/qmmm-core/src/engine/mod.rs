//! # Engine Module
//!
//! The stateful layer between the stateless [`crate::core`] building blocks and
//! the [`crate::workflows`] entry points.
//!
//! - **Host Interface** ([`host`]) - The [`host::StructureHost`] capability trait the workflows are written against
//! - **Session** ([`session`]) - An in-memory host holding loaded objects and named selections
//! - **Progress Monitoring** ([`progress`]) - Progress events for front ends
//! - **Error Handling** ([`error`]) - Selection and host errors

pub mod error;
pub mod host;
pub mod progress;
pub mod session;
