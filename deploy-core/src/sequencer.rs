//! Dependency ordering & sequential execution of registered units

use std::collections::BTreeSet;

use deploy_common::types::{DeployedHandles, DeploymentUnit, Handle, UnitName};
use indexmap::{IndexMap, IndexSet};
use itertools::Itertools;
use tracing::{debug, info, warn};

use crate::{deployer::Deployer, errors::DeployError, ledger::Ledger, registry::Registry};

/// The execution state of a registered unit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitState {
    /// Registered, not yet executed in this run
    Registered,
    /// Deploy or parameter update in progress
    Executing,
    /// Deployed & configured
    Done,
    /// Deploy or parameter update failed
    Failed,
}

/// Options controlling a sequencer run
#[derive(Clone, Copy, Debug, Default)]
pub struct SequencerOptions {
    /// Deploy every unit even if the ledger already records a handle for it
    pub redeploy: bool,
}

/// The result of executing a single unit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitOutcome {
    /// The unit's name
    pub name: UnitName,
    /// The unit's deployed handle
    pub handle: Handle,
    /// Whether the handle was taken from the ledger rather than freshly deployed
    pub reused: bool,
}

/// The outcomes of a successful run, in execution order
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// The per-unit outcomes
    pub outcomes: Vec<UnitOutcome>,
}

impl RunSummary {
    /// The handle of the given unit
    pub fn handle(&self, name: &str) -> Option<Handle> {
        self.outcomes
            .iter()
            .find(|outcome| outcome.name.as_str() == name)
            .map(|outcome| outcome.handle)
    }

    /// The number of units freshly deployed in the run
    pub fn num_deployed(&self) -> usize {
        self.outcomes.iter().filter(|outcome| !outcome.reused).count()
    }

    /// The number of units whose handle was reused from the ledger
    pub fn num_reused(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.reused).count()
    }
}

/// Compute an execution order in which every unit follows all of its dependencies.
///
/// Uses Kahn's algorithm; when several units are ready at once, the one registered
/// first runs first.
pub fn execution_order(registry: &Registry) -> Result<Vec<UnitName>, DeployError> {
    let dependencies = resolve_dependencies(registry)?;
    let num_units = dependencies.len();

    let mut in_degree: Vec<usize> = dependencies.iter().map(IndexSet::len).collect();
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); num_units];
    for (unit, deps) in dependencies.iter().enumerate() {
        for &dep in deps {
            dependents[dep].push(unit);
        }
    }

    let mut ready: BTreeSet<usize> = (0..num_units).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(num_units);
    while let Some(next) = ready.pop_first() {
        order.push(next);
        for &dependent in &dependents[next] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() != num_units {
        let cycle = find_cycle(&dependencies, &in_degree);
        return Err(DeployError::CyclicDependency(
            cycle.into_iter().filter_map(|i| unit_name(registry, i)).collect(),
        ));
    }

    Ok(order
        .into_iter()
        .filter_map(|i| unit_name(registry, i))
        .collect())
}

/// Map every unit's dependencies to registration indices, rejecting unregistered names.
///
/// Repeated dependencies of one unit are collapsed.
fn resolve_dependencies(registry: &Registry) -> Result<Vec<IndexSet<usize>>, DeployError> {
    registry
        .iter()
        .map(|unit| {
            unit.dependencies
                .iter()
                .map(|dependency| {
                    registry.index_of(dependency.as_str()).ok_or_else(|| {
                        DeployError::UnknownDependency {
                            unit: unit.name.clone(),
                            dependency: dependency.clone(),
                        }
                    })
                })
                .collect()
        })
        .collect()
}

/// Extract one cycle from the units Kahn's algorithm could not order.
///
/// Every unordered unit has an unordered dependency, so walking unordered
/// dependencies from any of them must revisit a unit. The cycle is rotated to
/// start at its earliest-registered unit.
fn find_cycle(dependencies: &[IndexSet<usize>], in_degree: &[usize]) -> Vec<usize> {
    let blocked = |i: usize| in_degree[i] > 0;
    let Some(start) = (0..dependencies.len()).find(|&i| blocked(i)) else {
        return Vec::new();
    };

    let mut path: IndexSet<usize> = IndexSet::new();
    let mut current = start;
    while path.insert(current) {
        match dependencies[current].iter().copied().find(|&dep| blocked(dep)) {
            Some(dep) => current = dep,
            None => return path.into_iter().collect(),
        }
    }

    // `current` is the first revisited unit, the cycle runs from it to the end
    let cycle_start = path.get_index_of(&current).unwrap_or_default();
    let mut cycle: Vec<usize> = path.into_iter().skip(cycle_start).collect();
    if let Some(min_pos) = cycle.iter().position_min() {
        cycle.rotate_left(min_pos);
    }

    cycle
}

/// The name of the unit at the given registration index
fn unit_name(registry: &Registry, index: usize) -> Option<UnitName> {
    registry.get_index(index).map(|unit| unit.name.clone())
}

/// Executes a validated registry in dependency order, one unit at a time
#[derive(Debug)]
pub struct Sequencer {
    /// The units to execute
    registry: Registry,
    /// The execution order, computed at construction
    order: Vec<UnitName>,
    /// The run options
    options: SequencerOptions,
    /// The state of every unit, in execution order
    states: IndexMap<UnitName, UnitState>,
}

impl Sequencer {
    /// Validate the registry & compute its execution order.
    ///
    /// Fails on unregistered dependencies or cycles, before anything is executed.
    pub fn new(registry: Registry, options: SequencerOptions) -> Result<Self, DeployError> {
        let order = execution_order(&registry)?;
        debug!(order = %order.iter().join(", "), "computed execution order");

        let states = order
            .iter()
            .map(|name| (name.clone(), UnitState::Registered))
            .collect();

        Ok(Self {
            registry,
            order,
            options,
            states,
        })
    }

    /// The execution order
    pub fn order(&self) -> &[UnitName] {
        &self.order
    }

    /// The registry being executed
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The state of the given unit
    pub fn state(&self, name: &str) -> Option<UnitState> {
        self.states.get(name).copied()
    }

    /// The state of every unit, in execution order
    pub fn states(&self) -> &IndexMap<UnitName, UnitState> {
        &self.states
    }

    /// Deploy then configure every unit in order, halting at the first failure.
    ///
    /// Units with a handle in the ledger are not redeployed unless
    /// [`SequencerOptions::redeploy`] is set, but their parameters are still
    /// updated. Freshly deployed handles are recorded in the ledger as soon as
    /// the deploy action returns.
    pub async fn run<D, L>(
        &mut self,
        deployer: &mut D,
        ledger: &mut L,
    ) -> Result<RunSummary, DeployError>
    where
        D: Deployer,
        L: Ledger,
    {
        let Self {
            registry,
            order,
            options,
            states,
        } = self;
        states
            .values_mut()
            .for_each(|state| *state = UnitState::Registered);

        let mut deployed = DeployedHandles::new();
        let mut summary = RunSummary::default();
        for name in order.iter() {
            let Some(unit) = registry.get(name.as_str()) else {
                continue;
            };
            states.insert(name.clone(), UnitState::Executing);

            let res = execute_unit(unit, options, &deployed, deployer, ledger).await;
            let outcome = match res {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(unit = %name, error = %e, "halting deployment");
                    states.insert(name.clone(), UnitState::Failed);
                    return Err(e);
                }
            };

            states.insert(name.clone(), UnitState::Done);
            deployed.insert(name.clone(), outcome.handle);
            summary.outcomes.push(outcome);
        }

        info!(
            deployed = summary.num_deployed(),
            reused = summary.num_reused(),
            "deployment complete"
        );
        Ok(summary)
    }
}

/// Deploy (or reuse) & configure a single unit
async fn execute_unit<D, L>(
    unit: &DeploymentUnit,
    options: &SequencerOptions,
    deployed: &DeployedHandles,
    deployer: &mut D,
    ledger: &mut L,
) -> Result<UnitOutcome, DeployError>
where
    D: Deployer,
    L: Ledger,
{
    let recorded = if options.redeploy {
        None
    } else {
        ledger.get(unit.name.as_str())
    };

    let (handle, reused) = match recorded {
        Some(handle) => {
            info!(unit = %unit.name, address = %handle, "reusing recorded deployment");
            (handle, true)
        }
        None => {
            info!(unit = %unit.name, "deploying unit");
            let handle = deployer.deploy(unit, deployed).await.map_err(|e| {
                DeployError::DeployActionFailed {
                    unit: unit.name.clone(),
                    reason: e.to_string(),
                }
            })?;
            ledger
                .record(&unit.name, handle)
                .map_err(|e| DeployError::RecordFailed {
                    unit: unit.name.clone(),
                    handle,
                    reason: e.to_string(),
                })?;
            info!(unit = %unit.name, address = %handle, "deployed unit");
            (handle, false)
        }
    };

    debug!(unit = %unit.name, "updating parameters");
    deployer
        .update_parameters(unit, handle, deployed)
        .await
        .map_err(|e| DeployError::ParameterUpdateFailed {
            unit: unit.name.clone(),
            reason: e.to_string(),
        })?;

    Ok(UnitOutcome {
        name: unit.name.clone(),
        handle,
        reused,
    })
}
