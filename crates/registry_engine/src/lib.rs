//! Registry engine: HTTP calls to the console endpoints and command execution.
mod client;
mod engine;
mod persist;
mod settings;
mod types;

pub use client::{filename_from_disposition, ConsoleApi, ReqwestConsoleClient, XmlDownload};
pub use engine::{EngineCommand, EngineHandle};
pub use persist::{
    ensure_output_dir, sanitize_file_component, save_xml_download, xml_download_filename,
    AtomicFileWriter, PersistError,
};
pub use settings::{ClientSettings, ConsoleEndpoints, EngineConfig, TimestampFn};
pub use types::{
    ConsoleError, EditTarget, EngineEvent, FailureKind, Generation, HarvestStatusRecord, RegistryOperation,
    RegistryRecord, RequestId, SetOption, UpdateStatusRecord,
};
