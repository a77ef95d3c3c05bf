//! Type definitions for deployment units and their deployed handles

use std::{
    borrow::Borrow,
    collections::BTreeSet,
    fmt::{self, Display},
};

use alloy_primitives::Address;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The handle of a deployed unit, i.e. the address of the deployed contract
pub type Handle = Address;

/// The handles of the units completed so far in a run, in execution order
pub type DeployedHandles = IndexMap<UnitName, Handle>;

/// The logical name of a deployment unit, e.g. `Hub` or `ParametersStorage`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitName(String);

impl UnitName {
    /// Create a unit name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UnitName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Borrow<str> for UnitName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for UnitName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for UnitName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for UnitName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// A named deployable artifact, along with the tags used to select it
/// and the units that must be deployed before it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentUnit {
    /// The logical name of the unit
    pub name: UnitName,
    /// The tags under which the unit can be selected
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// The names of the units this unit depends on, in declaration order
    #[serde(default)]
    pub dependencies: Vec<UnitName>,
}

impl DeploymentUnit {
    /// Create a unit with no tags & no dependencies
    pub fn new(name: impl Into<UnitName>) -> Self {
        Self {
            name: name.into(),
            tags: BTreeSet::new(),
            dependencies: Vec::new(),
        }
    }

    /// Add the given tags to the unit
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Append the given names to the unit's dependencies
    pub fn with_dependencies<I, N>(mut self, dependencies: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<UnitName>,
    {
        self.dependencies
            .extend(dependencies.into_iter().map(Into::into));
        self
    }

    /// Whether the unit carries at least one of the given tags
    pub fn has_any_tag<S: AsRef<str>>(&self, tags: &[S]) -> bool {
        tags.iter().any(|tag| {
            let tag: &str = tag.as_ref();
            self.tags.contains(tag)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DeploymentUnit, UnitName};

    #[test]
    fn test_unit_deserialize_defaults() {
        let unit: DeploymentUnit = serde_json::from_str(r#"{ "name": "Hub" }"#).unwrap();

        assert_eq!(unit.name, UnitName::from("Hub"));
        assert!(unit.tags.is_empty());
        assert!(unit.dependencies.is_empty());
    }

    #[test]
    fn test_unit_deserialize_full() {
        let unit: DeploymentUnit = serde_json::from_str(
            r#"{ "name": "ParametersStorage", "tags": ["ParametersStorage", "v1"], "dependencies": ["Hub"] }"#,
        )
        .unwrap();

        let expected = DeploymentUnit::new("ParametersStorage")
            .with_tags(["ParametersStorage", "v1"])
            .with_dependencies(["Hub"]);
        assert_eq!(unit, expected);
    }

    #[test]
    fn test_has_any_tag() {
        let unit = DeploymentUnit::new("ParametersStorage").with_tags(["v1"]);

        assert!(unit.has_any_tag(&["v2", "v1"]));
        assert!(!unit.has_any_tag(&["v2"]));
        assert!(!unit.has_any_tag::<&str>(&[]));
    }

    #[test]
    fn test_name_lookup_by_str() {
        let mut handles = super::DeployedHandles::new();
        handles.insert(UnitName::from("Hub"), super::Handle::ZERO);

        assert!(handles.contains_key("Hub"));
        assert!(!handles.contains_key("Staking"));
    }
}
