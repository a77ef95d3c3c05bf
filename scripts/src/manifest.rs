//! The deployment manifest: the units to deploy and the commands that deploy
//! & configure each of them

use std::{collections::BTreeSet, fs, path::Path};

use deploy_core::{registry::Registry, DeploymentUnit, UnitName};
use indexmap::IndexMap;
use serde::Deserialize;

use crate::{errors::ScriptError, utils::dependency_env_var};

/// The commands bound to a single unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitCommands {
    /// Shell command deploying the unit, printing the deployed address as
    /// the last line of its output
    pub deploy: String,
    /// Shell command updating the unit's parameters once deployed
    pub update_parameters: Option<String>,
}

/// A unit declaration in the manifest
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UnitManifest {
    /// The logical name of the unit
    pub name: UnitName,
    /// The tags under which the unit can be selected
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// The names of the units this unit depends on
    #[serde(default)]
    pub dependencies: Vec<UnitName>,
    /// Shell command deploying the unit
    pub deploy: String,
    /// Shell command updating the unit's parameters once deployed
    #[serde(default)]
    pub update_parameters: Option<String>,
}

/// The deployment manifest, e.g. `deploy.json`
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeployManifest {
    /// The declared units, in registration order
    pub units: Vec<UnitManifest>,
}

impl DeployManifest {
    /// Read the manifest at the given path
    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| ScriptError::ReadManifest(format!("{}: {}", path.display(), e)))?;

        Self::parse(&contents)
    }

    /// Parse a manifest from its JSON contents
    pub fn parse(contents: &str) -> Result<Self, ScriptError> {
        serde_json::from_str(contents).map_err(|e| ScriptError::ReadManifest(e.to_string()))
    }

    /// Split the manifest into the unit registry & the commands of each unit
    ///
    /// Units are exposed to each other's commands through `DEPLOYED_<NAME>`
    /// variables, so two names mapping to the same variable are rejected
    pub fn into_parts(self) -> Result<(Registry, IndexMap<UnitName, UnitCommands>), ScriptError> {
        let mut registry = Registry::new();
        let mut commands = IndexMap::new();
        let mut env_vars: IndexMap<String, UnitName> = IndexMap::new();
        for UnitManifest {
            name,
            tags,
            dependencies,
            deploy,
            update_parameters,
        } in self.units
        {
            let env_var = dependency_env_var(name.as_str());
            if let Some(existing) = env_vars.get(&env_var) {
                if existing != &name {
                    return Err(ScriptError::EnvVarCollision(format!(
                        "`{existing}` and `{name}` both map to `{env_var}`"
                    )));
                }
            }

            let unit = DeploymentUnit::new(name.clone())
                .with_tags(tags)
                .with_dependencies(dependencies);
            registry.register(unit)?;
            env_vars.insert(env_var, name.clone());
            commands.insert(
                name,
                UnitCommands {
                    deploy,
                    update_parameters,
                },
            );
        }

        Ok((registry, commands))
    }
}
