//! Scripts for planning & running dependency-ordered contract deployments.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod cli;
mod commands;
pub mod constants;
pub mod deployer;
pub mod errors;
pub mod manifest;
pub mod utils;
