use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

/// Sequence number echoed back with option-list results.
pub type Generation = u64;
/// Sequence number echoed back with execution results.
pub type RequestId = u64;

/// Registry operations exposed by the console endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryOperation {
    Activate,
    Deactivate,
    Delete,
    Harvest,
    Update,
}

/// Edit forms served per registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditTarget {
    Registry,
    Harvest,
}

/// One `{key, value}` entry of the sets endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SetOption {
    pub key: String,
    pub value: String,
}

/// A registry as listed by the REST endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegistryRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub harvest_rate: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub harvest: bool,
    #[serde(default)]
    pub last_update: Option<String>,
    #[serde(default)]
    pub is_harvesting: bool,
    #[serde(default)]
    pub is_updating: bool,
    #[serde(default = "default_true")]
    pub is_activated: bool,
    #[serde(default)]
    pub is_queued: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HarvestStatusRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub registry_id: String,
    pub is_harvesting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpdateStatusRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub registry_id: String,
    pub is_updating: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub last_update: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AvailabilityBody {
    pub is_available: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessageBody {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TemplateBody {
    pub template: String,
}

fn default_true() -> bool {
    true
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    RegistriesLoaded(Result<Vec<RegistryRecord>, ConsoleError>),
    SetsLoaded {
        generation: Generation,
        result: Result<Vec<SetOption>, ConsoleError>,
    },
    MetadataFormatsLoaded {
        generation: Generation,
        result: Result<Vec<String>, ConsoleError>,
    },
    RequestFinished {
        request_id: RequestId,
        result: Result<String, ConsoleError>,
    },
    XmlSaved(Result<PathBuf, ConsoleError>),
    RegistryOperationFinished {
        operation: RegistryOperation,
        registry_id: String,
        result: Result<(), ConsoleError>,
    },
    AvailabilityChecked {
        registry_id: String,
        result: Result<bool, ConsoleError>,
    },
    /// `refresh` is echoed back from the poll command.
    HarvestStatus {
        refresh: bool,
        result: Result<Vec<HarvestStatusRecord>, ConsoleError>,
    },
    UpdateStatus {
        refresh: bool,
        result: Result<Vec<UpdateStatusRecord>, ConsoleError>,
    },
    RegistryDetails {
        registry_id: String,
        result: Result<String, ConsoleError>,
    },
    RegistryAdded(Result<(), ConsoleError>),
    EditFormLoaded {
        target: EditTarget,
        registry_id: String,
        result: Result<String, ConsoleError>,
    },
    RegistryEdited {
        target: EditTarget,
        registry_id: String,
        result: Result<(), ConsoleError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleError {
    pub kind: FailureKind,
    pub message: String,
}

impl ConsoleError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConsoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            // Server error text is shown verbatim.
            FailureKind::HttpStatus(code) if self.message.trim().is_empty() => {
                write!(f, "http status {code}")
            }
            FailureKind::HttpStatus(_) => f.write_str(&self.message),
            _ => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl std::error::Error for ConsoleError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Io,
    Network,
    /// The background runtime is gone; nothing can be executed.
    EngineStopped,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "unexpected response"),
            FailureKind::Io => write!(f, "io error"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::EngineStopped => write!(f, "engine stopped"),
        }
    }
}
