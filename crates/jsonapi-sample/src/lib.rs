//! # JSON:API Sample Library
//!
//! An author resource bound over HTTP, exposed as a library for integration
//! testing.

pub mod clients;
pub mod error;
pub mod lifecycle;
pub mod model;
