//! Core application modules
//!
//! This module contains configuration, constants, logging, the transport to
//! the audit server and the submission session.

pub mod config;
pub mod constants;
pub mod logging;
pub mod providers;
pub mod session;
pub mod transport;
