//! Constants used in the deploy scripts

/// The default path of the deployment manifest
pub const DEFAULT_MANIFEST_PATH: &str = "deploy.json";

/// The default path of the deployments file
pub const DEFAULT_DEPLOYMENTS_PATH: &str = "deployments.json";

/// The log filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";

/// The shell used to run unit commands
pub const SHELL_COMMAND: &str = "sh";

/// The flag passing a command string to the shell
pub const SHELL_COMMAND_FLAG: &str = "-c";

/// The environment variable holding the name of the unit being executed
pub const UNIT_NAME_ENV_VAR: &str = "DEPLOY_UNIT";

/// The environment variable holding the unit's own address, set for parameter updates
pub const DEPLOYED_ADDRESS_ENV_VAR: &str = "DEPLOYED_ADDRESS";

/// The prefix of the environment variables holding the addresses of completed units
pub const DEPENDENCY_ENV_VAR_PREFIX: &str = "DEPLOYED_";
