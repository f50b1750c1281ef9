//! Command-line front end for strata session configuration

pub mod cli;
pub mod commands;
