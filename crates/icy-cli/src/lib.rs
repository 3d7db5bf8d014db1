//! Command-line front end for the icy-scaler pipeline.

pub mod cli;
pub mod commands;
pub mod logging;
pub mod summary;
