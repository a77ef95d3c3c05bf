//! Registration & dependency-ordered execution of contract deployments.
//!
//! Units are registered into a [`registry::Registry`] from explicit data,
//! ordered by the [`sequencer::Sequencer`], and executed one at a time against
//! a [`deployer::Deployer`], with deployed handles persisted in a
//! [`ledger::Ledger`].

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod constants;
pub mod deployer;
pub mod errors;
pub mod ledger;
pub mod registry;
pub mod sequencer;

pub use deploy_common::types::{DeployedHandles, DeploymentUnit, Handle, UnitName};
