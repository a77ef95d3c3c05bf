//! Utilities for running unit commands

use std::{process::Stdio, str::FromStr};

use alloy_primitives::Address;
use deploy_core::{DeployedHandles, DeploymentUnit, Handle};
use tokio::process::Command;
use tracing::debug;

use crate::{
    constants::{
        DEPENDENCY_ENV_VAR_PREFIX, SHELL_COMMAND, SHELL_COMMAND_FLAG, UNIT_NAME_ENV_VAR,
    },
    errors::ScriptError,
};

/// The name of the environment variable holding the address of the given unit.
///
/// The name is upper-cased & non-alphanumerics become `_`, so `ParametersStorage`
/// maps to `DEPLOYED_PARAMETERSSTORAGE` and `commit-manager.v1` to
/// `DEPLOYED_COMMIT_MANAGER_V1`
pub fn dependency_env_var(name: &str) -> String {
    let suffix: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();

    format!("{DEPENDENCY_ENV_VAR_PREFIX}{suffix}")
}

/// Build the shell invocation of a unit command, exposing the unit's name and the
/// addresses of all completed units through the environment
pub fn unit_command(command: &str, unit: &DeploymentUnit, deployed: &DeployedHandles) -> Command {
    let mut cmd = Command::new(SHELL_COMMAND);
    cmd.arg(SHELL_COMMAND_FLAG).arg(command);
    cmd.env(UNIT_NAME_ENV_VAR, unit.name.as_str());
    for (name, handle) in deployed {
        cmd.env(dependency_env_var(name.as_str()), format!("{handle:#x}"));
    }

    cmd
}

/// Run the command to completion, streaming its stderr and returning its stdout
pub async fn run_capturing_stdout(mut cmd: Command) -> Result<String, ScriptError> {
    cmd.stdout(Stdio::piped()).stderr(Stdio::inherit());
    debug!(command = ?cmd.as_std(), "running command");

    let output = cmd
        .output()
        .await
        .map_err(|e| ScriptError::CommandSpawn(e.to_string()))?;
    if !output.status.success() {
        return Err(ScriptError::CommandFailed(format!(
            "exited with {}",
            output.status
        )));
    }

    String::from_utf8(output.stdout).map_err(|e| ScriptError::CommandFailed(e.to_string()))
}

/// Parse the deployed address from the last non-empty line of a command's output
pub fn parse_deployed_address(stdout: &str) -> Result<Handle, ScriptError> {
    let line = stdout
        .lines()
        .map(str::trim)
        .rev()
        .find(|line| !line.is_empty())
        .ok_or_else(|| ScriptError::AddressParsing("command printed nothing".to_string()))?;

    Address::from_str(line).map_err(|e| ScriptError::AddressParsing(format!("`{line}`: {e}")))
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use deploy_core::{DeployedHandles, DeploymentUnit};

    use crate::errors::ScriptError;

    use super::{dependency_env_var, parse_deployed_address, run_capturing_stdout, unit_command};

    #[test]
    fn test_dependency_env_var() {
        assert_eq!(dependency_env_var("Hub"), "DEPLOYED_HUB");
        assert_eq!(
            dependency_env_var("commit-manager.v1"),
            "DEPLOYED_COMMIT_MANAGER_V1"
        );
    }

    #[test]
    fn test_parse_last_line() {
        let stdout = "Compiling...\nDeployer: 0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266\n0x5fbdb2315678afecb367f032d93f642f64180aa3\n\n";

        let addr = parse_deployed_address(stdout).unwrap();

        assert_eq!(
            addr,
            "0x5fbdb2315678afecb367f032d93f642f64180aa3"
                .parse::<Address>()
                .unwrap()
        );
    }

    #[test]
    fn test_parse_invalid_output() {
        assert!(matches!(
            parse_deployed_address(""),
            Err(ScriptError::AddressParsing(_))
        ));
        assert!(matches!(
            parse_deployed_address("deployed!"),
            Err(ScriptError::AddressParsing(_))
        ));
    }

    #[tokio::test]
    async fn test_command_environment() {
        let unit = DeploymentUnit::new("ParametersStorage");
        let mut deployed = DeployedHandles::new();
        deployed.insert("Hub".into(), Address::with_last_byte(1));

        let cmd = unit_command("echo $DEPLOY_UNIT $DEPLOYED_HUB", &unit, &deployed);
        let stdout = run_capturing_stdout(cmd).await.unwrap();

        assert_eq!(
            stdout.trim(),
            format!("ParametersStorage {:#x}", Address::with_last_byte(1))
        );
    }

    #[tokio::test]
    async fn test_command_failure() {
        let unit = DeploymentUnit::new("Hub");
        let cmd = unit_command("exit 3", &unit, &DeployedHandles::new());

        let res = run_capturing_stdout(cmd).await;

        assert!(matches!(res, Err(ScriptError::CommandFailed(_))));
    }
}
