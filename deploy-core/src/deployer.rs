//! The interface through which the sequencer provisions & configures units

use std::fmt::Display;

use deploy_common::types::{DeployedHandles, DeploymentUnit, Handle};

/// The external capabilities the sequencer drives for every unit.
///
/// Both actions receive the handles of every unit completed earlier in the run,
/// so that a unit can be wired to the addresses of its dependencies.
#[allow(async_fn_in_trait)]
pub trait Deployer {
    /// The error type of the deployer, stringified into a
    /// [`DeployError`](crate::errors::DeployError) by the sequencer
    type Error: Display;

    /// Provision the given unit, returning the handle of the deployed artifact
    async fn deploy(
        &mut self,
        unit: &DeploymentUnit,
        deployed: &DeployedHandles,
    ) -> Result<Handle, Self::Error>;

    /// Apply post-deployment configuration to the given unit
    async fn update_parameters(
        &mut self,
        unit: &DeploymentUnit,
        handle: Handle,
        deployed: &DeployedHandles,
    ) -> Result<(), Self::Error>;
}
