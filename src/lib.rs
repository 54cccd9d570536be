//! ami-cleanup: find public machine images across regions, group copies
//! under their source image, and make chosen images private in bulk.
//!
//! This library exposes the core modules for use by the binary and by tests.

pub mod app;
pub mod aws;
pub mod collector;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod lineage;
pub mod logging;
pub mod model;
pub mod multiplexer;
pub mod provider;
pub mod selector;
pub mod state;
pub mod view;
