//! API data models
//!
//! This module contains the request and response structures exchanged with
//! the audit server.

pub mod audit;
