//! The registry of deployment units, keyed by unit name

use deploy_common::types::{DeploymentUnit, UnitName};
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::errors::DeployError;

/// An insertion-ordered set of uniquely named deployment units.
///
/// The registry only stores units; dependency references are resolved when the
/// registry is handed to the [`Sequencer`](crate::sequencer::Sequencer).
#[derive(Clone, Debug, Default)]
pub struct Registry {
    /// The registered units, in registration order
    units: IndexMap<UnitName, DeploymentUnit>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register all of the given units, failing on the first duplicate name
    pub fn from_units<I>(units: I) -> Result<Self, DeployError>
    where
        I: IntoIterator<Item = DeploymentUnit>,
    {
        let mut registry = Self::new();
        for unit in units {
            registry.register(unit)?;
        }

        Ok(registry)
    }

    /// Register a unit
    pub fn register(&mut self, unit: DeploymentUnit) -> Result<(), DeployError> {
        if self.units.contains_key(&unit.name) {
            return Err(DeployError::DuplicateUnit(unit.name));
        }

        debug!(unit = %unit.name, dependencies = ?unit.dependencies, "registered unit");
        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    /// Look up a unit by name
    pub fn get(&self, name: &str) -> Option<&DeploymentUnit> {
        self.units.get(name)
    }

    /// Whether a unit with the given name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// The position of the unit in registration order
    pub(crate) fn index_of(&self, name: &str) -> Option<usize> {
        self.units.get_index_of(name)
    }

    /// The unit at the given registration position
    pub(crate) fn get_index(&self, index: usize) -> Option<&DeploymentUnit> {
        self.units.get_index(index).map(|(_, unit)| unit)
    }

    /// The number of registered units
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Iterate over the units in registration order
    pub fn iter(&self) -> impl Iterator<Item = &DeploymentUnit> {
        self.units.values()
    }

    /// Select the units carrying any of the given tags, together with everything
    /// they transitively depend on.
    ///
    /// The returned registry keeps the original registration order. An empty tag
    /// list selects every unit.
    pub fn select_tags<S: AsRef<str>>(&self, tags: &[S]) -> Result<Self, DeployError> {
        if tags.is_empty() {
            return Ok(self.clone());
        }

        for tag in tags {
            let tag: &str = tag.as_ref();
            if !self.iter().any(|unit| unit.tags.contains(tag)) {
                return Err(DeployError::UnknownTag(tag.to_string()));
            }
        }

        // Walk the dependencies of the tagged units
        let mut selected: IndexSet<&UnitName> = IndexSet::new();
        let mut stack: Vec<&DeploymentUnit> =
            self.iter().filter(|unit| unit.has_any_tag(tags)).collect();

        while let Some(unit) = stack.pop() {
            if !selected.insert(&unit.name) {
                continue;
            }

            for dependency in &unit.dependencies {
                let dep_unit =
                    self.units
                        .get(dependency)
                        .ok_or_else(|| DeployError::UnknownDependency {
                            unit: unit.name.clone(),
                            dependency: dependency.clone(),
                        })?;
                stack.push(dep_unit);
            }
        }

        let units = self
            .units
            .iter()
            .filter(|(name, _)| selected.contains(name))
            .map(|(name, unit)| (name.clone(), unit.clone()))
            .collect();

        Ok(Self { units })
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a DeploymentUnit;
    type IntoIter = indexmap::map::Values<'a, UnitName, DeploymentUnit>;

    fn into_iter(self) -> Self::IntoIter {
        self.units.values()
    }
}

#[cfg(test)]
mod tests {
    use deploy_common::types::DeploymentUnit;

    use crate::errors::DeployError;

    use super::Registry;

    /// Build the registry used across the selection tests
    fn test_registry() -> Registry {
        Registry::from_units([
            DeploymentUnit::new("Hub").with_tags(["Hub", "v1"]),
            DeploymentUnit::new("ParametersStorage")
                .with_tags(["ParametersStorage", "v1"])
                .with_dependencies(["Hub"]),
            DeploymentUnit::new("Staking")
                .with_tags(["Staking"])
                .with_dependencies(["Hub", "ParametersStorage"]),
            DeploymentUnit::new("ScoringProxy")
                .with_tags(["ScoringProxy"])
                .with_dependencies(["Hub"]),
        ])
        .unwrap()
    }

    /// The names of the units in a registry, in order
    fn names(registry: &Registry) -> Vec<&str> {
        registry.iter().map(|unit| unit.name.as_str()).collect()
    }

    #[test]
    fn test_register_duplicate() {
        let mut registry = Registry::new();
        registry.register(DeploymentUnit::new("Hub")).unwrap();

        let res = registry.register(DeploymentUnit::new("Hub").with_tags(["v2"]));

        assert_eq!(res, Err(DeployError::DuplicateUnit("Hub".into())));
        assert_eq!(registry.len(), 1);
        // The original registration is kept
        assert!(registry.get("Hub").unwrap().tags.is_empty());
    }

    #[test]
    fn test_from_units_duplicate() {
        let res = Registry::from_units([
            DeploymentUnit::new("Hub"),
            DeploymentUnit::new("Staking"),
            DeploymentUnit::new("Hub"),
        ]);

        assert_eq!(res.unwrap_err(), DeployError::DuplicateUnit("Hub".into()));
    }

    #[test]
    fn test_registration_order_preserved() {
        let registry = test_registry();
        assert_eq!(
            names(&registry),
            vec!["Hub", "ParametersStorage", "Staking", "ScoringProxy"]
        );
    }

    #[test]
    fn test_select_tags_pulls_dependencies() {
        let registry = test_registry();

        let selected = registry.select_tags(&["Staking"]).unwrap();

        assert_eq!(names(&selected), vec!["Hub", "ParametersStorage", "Staking"]);
    }

    #[test]
    fn test_select_tags_union() {
        let registry = test_registry();

        let selected = registry.select_tags(&["ScoringProxy", "v1"]).unwrap();

        assert_eq!(
            names(&selected),
            vec!["Hub", "ParametersStorage", "ScoringProxy"]
        );
    }

    #[test]
    fn test_select_no_tags_selects_all() {
        let registry = test_registry();
        let selected = registry.select_tags::<&str>(&[]).unwrap();
        assert_eq!(selected.len(), registry.len());
    }

    #[test]
    fn test_select_unknown_tag() {
        let registry = test_registry();

        let res = registry.select_tags(&["v1", "v3"]);

        assert_eq!(res.unwrap_err(), DeployError::UnknownTag("v3".to_string()));
    }

    #[test]
    fn test_select_unknown_dependency() {
        let registry = Registry::from_units([
            DeploymentUnit::new("CommitManagerV1")
                .with_tags(["CommitManagerV1"])
                .with_dependencies(["Hub"]),
        ])
        .unwrap();

        let res = registry.select_tags(&["CommitManagerV1"]);

        assert_eq!(
            res.unwrap_err(),
            DeployError::UnknownDependency {
                unit: "CommitManagerV1".into(),
                dependency: "Hub".into(),
            }
        );
    }
}
