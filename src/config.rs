use tracing::{debug, info};

/// Relative path of the publication list inside the website repository.
pub const PUBLIST_REL_PATH: &str = "_data/publist.yml";

/// Branch the website publishes from.
pub const BRANCH: &str = "master";

/// Remote the orchestrator pushes to.
pub const REMOTE: &str = "origin";

/// Commit message used for every publication update.
pub const COMMIT_MESSAGE: &str = "Update publications";

/// Append-only log file written by orchestrate runs, relative to the
/// working directory the orchestrator is invoked from.
pub const LOG_FILE: &str = "orchestration.log";

/// Upper bound on concurrent detail lookups against the Pure API.
pub const MAX_IN_FLIGHT_REQUESTS: usize = 8;

const DEFAULT_BASE_URL: &str = "https://api-pure.soton.ac.uk";
const DEFAULT_PROJECT_ID: &str = "520617";

/// Runtime configuration for the Pure API client.
///
/// Defaults are the institutional endpoint and project; both can be
/// overridden through the environment (`PURE_BASE_URL`, `PURE_PROJECT_ID`).
/// The API is only reachable from inside the institutional network
/// perimeter, typically via VPN.
#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub project_id: String,
}

impl Config {
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("PURE_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let project_id =
            std::env::var("PURE_PROJECT_ID").unwrap_or_else(|_| DEFAULT_PROJECT_ID.to_string());
        Self {
            base_url,
            project_id,
        }
    }

    pub fn trace_loaded(&self) {
        info!(
            base_url = %self.base_url,
            project_id = %self.project_id,
            "Loaded Config"
        );
        debug!(?self, "Config loaded (full debug)");
    }
}
