use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use url::{form_urlencoded, Url};

use crate::{ConsoleError, FailureKind};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_bytes: u64,
    /// Value of the console's `sessionid` cookie for an authenticated staff session.
    pub session_id: Option<String>,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(60),
            max_bytes: 20 * 1024 * 1024,
            session_id: None,
        }
    }
}

/// Locations of the console endpoints, relative to `server_url`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleEndpoints {
    pub server_url: String,
    pub registries: String,
    pub sets: String,
    pub metadata_formats: String,
    pub execute_request: String,
    pub download_xml: String,
    pub activate: String,
    pub deactivate: String,
    pub delete: String,
    pub harvest: String,
    pub update: String,
    pub check: String,
    pub check_harvest: String,
    pub check_update: String,
    pub view: String,
    pub add: String,
    /// Contains an `{id}` placeholder.
    pub edit_registry: String,
    /// Contains an `{id}` placeholder.
    pub edit_harvest: String,
}

impl ConsoleEndpoints {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            registries: "oaipmh_harvester/rest/registry/".to_string(),
            sets: "admin/harvesters/registry/all/sets".to_string(),
            metadata_formats: "admin/harvesters/registry/all/metadataPrefix".to_string(),
            execute_request: "admin/harvesters/registry/get/data".to_string(),
            download_xml: "admin/harvesters/build/download/data".to_string(),
            activate: "admin/harvesters/registry/activate".to_string(),
            deactivate: "admin/harvesters/registry/deactivate".to_string(),
            delete: "admin/harvesters/registry/delete".to_string(),
            harvest: "admin/harvesters/registry/harvest".to_string(),
            update: "admin/harvesters/registry/update".to_string(),
            check: "admin/harvesters/registry/check".to_string(),
            check_harvest: "admin/harvesters/registry/check/harvest".to_string(),
            check_update: "admin/harvesters/registry/check/update".to_string(),
            view: "admin/harvesters/registry/view".to_string(),
            add: "admin/harvesters/registry/add".to_string(),
            edit_registry: "admin/harvesters/registry/{id}/edit/".to_string(),
            edit_harvest: "admin/harvesters/registry/harvest/{id}/edit/".to_string(),
        }
    }

    /// Resolves an endpoint path against the server URL.
    pub fn resolve(&self, path: &str) -> Result<Url, ConsoleError> {
        let mut base = self.server_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .and_then(|base| base.join(path.trim_start_matches('/')))
            .map_err(|err| ConsoleError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    /// Resolves a path whose `{id}` segment names the registry.
    pub fn resolve_for_registry(&self, path: &str, registry_id: &str) -> Result<Url, ConsoleError> {
        let segment: String = form_urlencoded::byte_serialize(registry_id.as_bytes()).collect();
        self.resolve(&path.replace("{id}", &segment))
    }
}

impl Default for ConsoleEndpoints {
    fn default() -> Self {
        Self::new("http://localhost:8000/")
    }
}

/// Produces the timestamp embedded in downloaded XML file names.
pub type TimestampFn = Arc<dyn Fn() -> String + Send + Sync>;

#[derive(Clone)]
pub struct EngineConfig {
    pub endpoints: ConsoleEndpoints,
    pub client: ClientSettings,
    pub output_dir: PathBuf,
    pub download_timestamp: TimestampFn,
}

impl EngineConfig {
    pub fn default_with_output(output_dir: PathBuf) -> Self {
        Self {
            endpoints: ConsoleEndpoints::default(),
            client: ClientSettings::default(),
            output_dir,
            download_timestamp: Arc::new(|| "download".to_string()),
        }
    }
}
