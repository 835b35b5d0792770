//! Shared infrastructure for the Comply services.

pub mod logging;
