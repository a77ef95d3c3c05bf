//! Definitions of errors that can occur during the execution of the deploy scripts

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use deploy_core::errors::DeployError;

/// Errors that can occur during the execution of the deploy scripts
#[derive(Debug)]
pub enum ScriptError {
    /// Error reading the deployment manifest
    ReadManifest(String),
    /// Two units in the manifest map to the same `DEPLOYED_<NAME>` variable
    EnvVarCollision(String),
    /// A unit has no commands in the manifest
    MissingCommand(String),
    /// Error spawning a unit command
    CommandSpawn(String),
    /// A unit command exited unsuccessfully
    CommandFailed(String),
    /// Error parsing the deployed address from a command's output
    AddressParsing(String),
    /// Error registering, ordering, or executing the deployment
    Deploy(DeployError),
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ScriptError::ReadManifest(s) => write!(f, "error reading manifest: {}", s),
            ScriptError::EnvVarCollision(s) => write!(f, "conflicting unit names: {}", s),
            ScriptError::MissingCommand(s) => write!(f, "no commands for unit `{}`", s),
            ScriptError::CommandSpawn(s) => write!(f, "error spawning command: {}", s),
            ScriptError::CommandFailed(s) => write!(f, "command failed: {}", s),
            ScriptError::AddressParsing(s) => write!(f, "error parsing deployed address: {}", s),
            ScriptError::Deploy(e) => write!(f, "{}", e),
        }
    }
}

impl Error for ScriptError {}

impl From<DeployError> for ScriptError {
    fn from(e: DeployError) -> Self {
        ScriptError::Deploy(e)
    }
}
