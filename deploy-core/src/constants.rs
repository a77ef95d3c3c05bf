//! Constants used by the deployment sequencer

/// The deployments key in the `deployments.json` file
pub const DEPLOYMENTS_KEY: &str = "deployments";

/// The number of spaces used to indent the `deployments.json` file
pub const DEPLOYMENTS_FILE_INDENT: &[u8] = b"    ";
