//! The ledger of deployed handles, consulted before re-invoking a deploy action

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use alloy_primitives::Address;
use deploy_common::types::{DeployedHandles, Handle, UnitName};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Serializer, Value};
use tracing::debug;

use crate::{
    constants::{DEPLOYMENTS_FILE_INDENT, DEPLOYMENTS_KEY},
    errors::DeployError,
};

/// A record of the handles of previously deployed units
pub trait Ledger {
    /// The recorded handle of the given unit, if it was deployed before
    fn get(&self, name: &str) -> Option<Handle>;

    /// Record the handle of a freshly deployed unit, replacing any previous entry
    fn record(&mut self, name: &UnitName, handle: Handle) -> Result<(), DeployError>;

    /// All recorded handles
    fn entries(&self) -> &DeployedHandles;
}

/// A ledger that lives only as long as the process
#[derive(Clone, Debug, Default)]
pub struct InMemoryLedger {
    /// The recorded handles
    entries: DeployedHandles,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for InMemoryLedger {
    fn get(&self, name: &str) -> Option<Handle> {
        self.entries.get(name).copied()
    }

    fn record(&mut self, name: &UnitName, handle: Handle) -> Result<(), DeployError> {
        self.entries.insert(name.clone(), handle);
        Ok(())
    }

    fn entries(&self) -> &DeployedHandles {
        &self.entries
    }
}

/// A ledger persisted to a `deployments.json` file of the form
/// `{ "deployments": { "<unit>": "<address>" } }`.
///
/// The file is rewritten after every recorded deployment. Top-level keys other
/// than `deployments` are preserved.
#[derive(Clone, Debug)]
pub struct JsonFileLedger {
    /// The path of the deployments file
    path: PathBuf,
    /// The full contents of the deployments file
    document: Value,
    /// The parsed handles
    entries: DeployedHandles,
}

impl JsonFileLedger {
    /// Open the deployments file at the given path, treating a missing file as
    /// an empty ledger
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DeployError> {
        let path = path.as_ref().to_path_buf();
        if !path.exists() {
            return Ok(Self {
                path,
                document: Value::Object(Default::default()),
                entries: DeployedHandles::new(),
            });
        }

        let contents =
            fs::read_to_string(&path).map_err(|e| DeployError::ReadDeployments(e.to_string()))?;
        let document: Value = serde_json::from_str(&contents)
            .map_err(|e| DeployError::ReadDeployments(e.to_string()))?;
        let entries = parse_deployments(&document)?;
        debug!(path = %path.display(), entries = entries.len(), "opened deployments file");

        Ok(Self {
            path,
            document,
            entries,
        })
    }

    /// The path of the deployments file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the document back to the deployments file
    fn persist(&self) -> Result<(), DeployError> {
        let mut buf = Vec::new();
        let formatter = PrettyFormatter::with_indent(DEPLOYMENTS_FILE_INDENT);
        let mut ser = Serializer::with_formatter(&mut buf, formatter);
        self.document
            .serialize(&mut ser)
            .map_err(|e| DeployError::WriteDeployments(e.to_string()))?;

        fs::write(&self.path, buf).map_err(|e| DeployError::WriteDeployments(e.to_string()))
    }
}

impl Ledger for JsonFileLedger {
    fn get(&self, name: &str) -> Option<Handle> {
        self.entries.get(name).copied()
    }

    fn record(&mut self, name: &UnitName, handle: Handle) -> Result<(), DeployError> {
        self.document[DEPLOYMENTS_KEY][name.as_str()] = Value::String(format!("{handle:#x}"));
        self.entries.insert(name.clone(), handle);
        self.persist()
    }

    fn entries(&self) -> &DeployedHandles {
        &self.entries
    }
}

/// Parse the unit handles out of a deployments document
fn parse_deployments(document: &Value) -> Result<DeployedHandles, DeployError> {
    if !document.is_object() {
        return Err(DeployError::ReadDeployments(
            "deployments file is not a JSON object".to_string(),
        ));
    }

    let deployments = match document.get(DEPLOYMENTS_KEY) {
        None | Some(Value::Null) => return Ok(DeployedHandles::new()),
        Some(Value::Object(deployments)) => deployments,
        Some(_) => {
            return Err(DeployError::ReadDeployments(format!(
                "`{DEPLOYMENTS_KEY}` is not a JSON object"
            )))
        }
    };

    deployments
        .iter()
        .map(|(name, addr)| {
            let addr_str = addr.as_str().ok_or_else(|| {
                DeployError::ReadDeployments(format!("address of `{name}` is not a string"))
            })?;
            let handle = Address::from_str(addr_str)
                .map_err(|e| DeployError::ReadDeployments(format!("`{name}`: {e}")))?;

            Ok((UnitName::from(name.as_str()), handle))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use alloy_primitives::Address;
    use serde_json::Value;

    use crate::errors::DeployError;

    use super::{JsonFileLedger, Ledger};

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = JsonFileLedger::open(dir.path().join("deployments.json")).unwrap();

        assert!(ledger.entries().is_empty());
        assert!(ledger.get("Hub").is_none());
    }

    #[test]
    fn test_record_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        let hub = Address::with_last_byte(1);

        let mut ledger = JsonFileLedger::open(&path).unwrap();
        ledger.record(&"Hub".into(), hub).unwrap();

        let reopened = JsonFileLedger::open(&path).unwrap();
        assert_eq!(reopened.get("Hub"), Some(hub));

        let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(
            document["deployments"]["Hub"],
            Value::String(format!("{hub:#x}"))
        );
    }

    #[test]
    fn test_record_preserves_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, r#"{ "network": "devnet", "deployments": {} }"#).unwrap();

        let mut ledger = JsonFileLedger::open(&path).unwrap();
        ledger
            .record(&"Staking".into(), Address::with_last_byte(7))
            .unwrap();

        let document: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(document["network"], Value::String("devnet".to_string()));
        assert!(document["deployments"]["Staking"].is_string());
    }

    #[test]
    fn test_malformed_address() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, r#"{ "deployments": { "Hub": "0x1234" } }"#).unwrap();

        let res = JsonFileLedger::open(&path);

        assert!(matches!(res, Err(DeployError::ReadDeployments(_))));
    }

    #[test]
    fn test_deployments_not_an_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deployments.json");
        fs::write(&path, r#"{ "deployments": [] }"#).unwrap();

        let res = JsonFileLedger::open(&path);

        assert!(matches!(res, Err(DeployError::ReadDeployments(_))));
    }
}
