//! ipnotify: external IP address change notifier
//!
//! A library for determining the externally visible IP address by
//! consensus across several echo services, and for deciding when that
//! address is worth an email.
//!
//! The pipeline for one invocation lives in [`orchestrator`]; the
//! throttling policy is the pure function [`decision::decide`].

pub mod config;
pub mod decision;
pub mod echo;
pub mod notify;
pub mod orchestrator;
pub mod state;
pub mod time;
