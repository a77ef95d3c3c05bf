//! Definitions of errors that can occur while registering, ordering, or executing deployments

use std::{
    error::Error,
    fmt::{self, Display, Formatter},
};

use deploy_common::types::{Handle, UnitName};
use itertools::Itertools;

/// Errors that can occur while registering, ordering, or executing deployments
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployError {
    /// A unit with the same name is already registered
    DuplicateUnit(UnitName),
    /// A unit depends on a name that was never registered
    UnknownDependency {
        /// The unit declaring the dependency
        unit: UnitName,
        /// The unregistered dependency
        dependency: UnitName,
    },
    /// The dependency graph contains a cycle through the given units
    CyclicDependency(Vec<UnitName>),
    /// A requested tag is not carried by any registered unit
    UnknownTag(String),
    /// The deploy action of a unit failed
    DeployActionFailed {
        /// The unit being deployed
        unit: UnitName,
        /// The collaborator's failure
        reason: String,
    },
    /// A unit was deployed but its handle could not be recorded in the ledger
    RecordFailed {
        /// The deployed unit
        unit: UnitName,
        /// The handle of the unrecorded deployment
        handle: Handle,
        /// The ledger's failure
        reason: String,
    },
    /// The parameter update of a deployed unit failed
    ParameterUpdateFailed {
        /// The unit being configured
        unit: UnitName,
        /// The collaborator's failure
        reason: String,
    },
    /// Error reading the `deployments.json` file
    ReadDeployments(String),
    /// Error writing the `deployments.json` file
    WriteDeployments(String),
}

impl DeployError {
    /// The unit the error is attributed to, if any
    pub fn unit(&self) -> Option<&UnitName> {
        match self {
            DeployError::DuplicateUnit(unit)
            | DeployError::UnknownDependency { unit, .. }
            | DeployError::DeployActionFailed { unit, .. }
            | DeployError::RecordFailed { unit, .. }
            | DeployError::ParameterUpdateFailed { unit, .. } => Some(unit),
            DeployError::CyclicDependency(units) => units.first(),
            DeployError::UnknownTag(_)
            | DeployError::ReadDeployments(_)
            | DeployError::WriteDeployments(_) => None,
        }
    }
}

impl Display for DeployError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DeployError::DuplicateUnit(unit) => write!(f, "unit `{}` is already registered", unit),
            DeployError::UnknownDependency { unit, dependency } => write!(
                f,
                "unit `{}` depends on unregistered unit `{}`",
                unit, dependency
            ),
            DeployError::CyclicDependency(units) => {
                // Close the loop back onto the first unit
                let path = units.iter().chain(units.first()).join(" -> ");
                write!(f, "cyclic dependency: {}", path)
            }
            DeployError::UnknownTag(tag) => write!(f, "no unit is tagged `{}`", tag),
            DeployError::DeployActionFailed { unit, reason } => {
                write!(f, "error deploying `{}`: {}", unit, reason)
            }
            DeployError::RecordFailed {
                unit,
                handle,
                reason,
            } => write!(
                f,
                "`{}` deployed at {:#x} but not recorded: {}",
                unit, handle, reason
            ),
            DeployError::ParameterUpdateFailed { unit, reason } => {
                write!(f, "error updating parameters of `{}`: {}", unit, reason)
            }
            DeployError::ReadDeployments(s) => write!(f, "error reading deployments: {}", s),
            DeployError::WriteDeployments(s) => write!(f, "error writing deployments: {}", s),
        }
    }
}

impl Error for DeployError {}
