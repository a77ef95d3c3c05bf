//! A deployer that provisions & configures units by running the shell commands
//! declared in the manifest

use deploy_core::{deployer::Deployer, DeployedHandles, DeploymentUnit, Handle, UnitName};
use indexmap::IndexMap;
use tracing::debug;

use crate::{
    constants::DEPLOYED_ADDRESS_ENV_VAR,
    errors::ScriptError,
    manifest::UnitCommands,
    utils::{parse_deployed_address, run_capturing_stdout, unit_command},
};

/// Runs each unit's manifest commands through the shell
#[derive(Clone, Debug, Default)]
pub struct CommandDeployer {
    /// The commands of every unit
    commands: IndexMap<UnitName, UnitCommands>,
}

impl CommandDeployer {
    /// Create a deployer over the given unit commands
    pub fn new(commands: IndexMap<UnitName, UnitCommands>) -> Self {
        Self { commands }
    }

    /// The commands of the given unit
    fn commands_for(&self, unit: &DeploymentUnit) -> Result<&UnitCommands, ScriptError> {
        self.commands
            .get(unit.name.as_str())
            .ok_or_else(|| ScriptError::MissingCommand(unit.name.to_string()))
    }
}

impl Deployer for CommandDeployer {
    type Error = ScriptError;

    async fn deploy(
        &mut self,
        unit: &DeploymentUnit,
        deployed: &DeployedHandles,
    ) -> Result<Handle, Self::Error> {
        let commands = self.commands_for(unit)?;
        let cmd = unit_command(&commands.deploy, unit, deployed);
        let stdout = run_capturing_stdout(cmd).await?;

        parse_deployed_address(&stdout)
    }

    async fn update_parameters(
        &mut self,
        unit: &DeploymentUnit,
        handle: Handle,
        deployed: &DeployedHandles,
    ) -> Result<(), Self::Error> {
        let Some(update) = &self.commands_for(unit)?.update_parameters else {
            debug!(unit = %unit.name, "no parameter update declared");
            return Ok(());
        };

        let mut cmd = unit_command(update, unit, deployed);
        cmd.env(DEPLOYED_ADDRESS_ENV_VAR, format!("{handle:#x}"));
        run_capturing_stdout(cmd).await?;

        Ok(())
    }
}
