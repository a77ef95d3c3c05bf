//! Implementations of the deploy script commands

use std::path::Path;

use deploy_core::{
    ledger::{JsonFileLedger, Ledger},
    sequencer::{Sequencer, SequencerOptions},
};
use tracing::info;

use crate::{
    cli::{PlanArgs, RunArgs},
    deployer::CommandDeployer,
    errors::ScriptError,
    manifest::DeployManifest,
};

/// Print the execution order of the selected units, marking those already
/// recorded in the deployments file
pub fn plan(
    args: PlanArgs,
    manifest_path: &Path,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let (registry, _) = DeployManifest::load(manifest_path)?.into_parts()?;
    let selected = registry.select_tags(args.tags.as_slice())?;
    let sequencer = Sequencer::new(selected, SequencerOptions::default())?;
    let ledger = JsonFileLedger::open(deployments_path)?;

    for line in plan_lines(&sequencer, &ledger) {
        println!("{line}");
    }

    Ok(())
}

/// Render one line per unit in execution order
pub fn plan_lines(sequencer: &Sequencer, ledger: &impl Ledger) -> Vec<String> {
    sequencer
        .order()
        .iter()
        .enumerate()
        .map(|(i, name)| match ledger.get(name.as_str()) {
            Some(handle) => format!("{:>3}. {name} (deployed at {handle:#x})", i + 1),
            None => format!("{:>3}. {name}", i + 1),
        })
        .collect()
}

/// Deploy & configure the selected units in dependency order
pub async fn run(
    args: RunArgs,
    manifest_path: &Path,
    deployments_path: &Path,
) -> Result<(), ScriptError> {
    let (registry, commands) = DeployManifest::load(manifest_path)?.into_parts()?;
    let options = SequencerOptions {
        redeploy: args.redeploy,
    };
    let mut sequencer = Sequencer::new(registry.select_tags(args.tags.as_slice())?, options)?;
    let mut ledger = JsonFileLedger::open(deployments_path)?;
    let mut deployer = CommandDeployer::new(commands);

    info!(
        units = sequencer.order().len(),
        deployments = %deployments_path.display(),
        "starting deployment"
    );
    let summary = sequencer.run(&mut deployer, &mut ledger).await?;

    for outcome in &summary.outcomes {
        let status = if outcome.reused { "reused" } else { "deployed" };
        println!("{} {status} at {:#x}", outcome.name, outcome.handle);
    }

    Ok(())
}

/// Print the contents of the deployments file
pub fn list(deployments_path: &Path) -> Result<(), ScriptError> {
    let ledger = JsonFileLedger::open(deployments_path)?;
    for (name, handle) in ledger.entries() {
        println!("{name}: {handle:#x}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use alloy_primitives::Address;
    use deploy_core::{
        ledger::{InMemoryLedger, Ledger},
        registry::Registry,
        sequencer::{Sequencer, SequencerOptions},
        DeploymentUnit,
    };

    use super::plan_lines;

    #[test]
    fn test_plan_marks_recorded_units() {
        let registry = Registry::from_units([
            DeploymentUnit::new("ParametersStorage").with_dependencies(["Hub"]),
            DeploymentUnit::new("Hub"),
        ])
        .unwrap();
        let sequencer = Sequencer::new(registry, SequencerOptions::default()).unwrap();
        let mut ledger = InMemoryLedger::new();
        ledger
            .record(&"Hub".into(), Address::with_last_byte(1))
            .unwrap();

        let lines = plan_lines(&sequencer, &ledger);

        assert_eq!(
            lines,
            vec![
                format!("  1. Hub (deployed at {:#x})", Address::with_last_byte(1)),
                "  2. ParametersStorage".to_string(),
            ]
        );
    }
}
