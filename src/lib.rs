//! Image update checking.
//!
//! [`image`] parses container image references and answers membership
//! questions about lists of them.  [`trigger`] turns a polling interval
//! and webhook calls into a single stream of "check now" pulses, which
//! [`poll`] consumes.

pub mod config;
pub mod image;
pub mod poll;
pub mod runtime;
pub mod trigger;
pub mod webhook;
