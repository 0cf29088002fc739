// Frameworks: configuration loading and the command-line front end.

pub mod cli;
pub mod config;
