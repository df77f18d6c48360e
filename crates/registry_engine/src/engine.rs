use std::path::PathBuf;
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use console_logging::{console_error, console_info};

use crate::client::{ConsoleApi, ReqwestConsoleClient};
use crate::persist::save_xml_download;
use crate::settings::TimestampFn;
use crate::{
    ConsoleError, EditTarget, EngineConfig, EngineEvent, FailureKind, Generation,
    RegistryOperation, RequestId,
};

/// Work items accepted by the engine thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    LoadRegistries,
    LoadSets {
        generation: Generation,
        provider_id: String,
    },
    LoadMetadataFormats {
        generation: Generation,
        provider_id: String,
    },
    ExecuteRequest {
        request_id: RequestId,
        base_url: String,
        args_json: String,
    },
    DownloadXml,
    RegistryOperation {
        operation: RegistryOperation,
        registry_id: String,
    },
    CheckRegistry {
        registry_id: String,
        url: String,
    },
    /// `refresh` marks polls issued by the periodic refresh cycle.
    PollHarvestStatus {
        refresh: bool,
    },
    PollUpdateStatus {
        refresh: bool,
    },
    ViewRegistry {
        registry_id: String,
    },
    AddRegistry {
        url: String,
        harvest_rate: u64,
        harvest: bool,
    },
    LoadEditForm {
        target: EditTarget,
        registry_id: String,
    },
    EditRegistry {
        registry_id: String,
        harvest_rate: u64,
        harvest: bool,
    },
    EditHarvest {
        registry_id: String,
        metadata_formats: Vec<String>,
        sets: Vec<String>,
    },
}

impl EngineCommand {
    /// The event this command reports when it cannot run at all.
    pub fn into_failure(self, err: ConsoleError) -> EngineEvent {
        match self {
            EngineCommand::LoadRegistries => EngineEvent::RegistriesLoaded(Err(err)),
            EngineCommand::LoadSets { generation, .. } => EngineEvent::SetsLoaded {
                generation,
                result: Err(err),
            },
            EngineCommand::LoadMetadataFormats { generation, .. } => {
                EngineEvent::MetadataFormatsLoaded {
                    generation,
                    result: Err(err),
                }
            }
            EngineCommand::ExecuteRequest { request_id, .. } => EngineEvent::RequestFinished {
                request_id,
                result: Err(err),
            },
            EngineCommand::DownloadXml => EngineEvent::XmlSaved(Err(err)),
            EngineCommand::RegistryOperation {
                operation,
                registry_id,
            } => EngineEvent::RegistryOperationFinished {
                operation,
                registry_id,
                result: Err(err),
            },
            EngineCommand::CheckRegistry { registry_id, .. } => EngineEvent::AvailabilityChecked {
                registry_id,
                result: Err(err),
            },
            EngineCommand::PollHarvestStatus { refresh } => EngineEvent::HarvestStatus {
                refresh,
                result: Err(err),
            },
            EngineCommand::PollUpdateStatus { refresh } => EngineEvent::UpdateStatus {
                refresh,
                result: Err(err),
            },
            EngineCommand::ViewRegistry { registry_id } => EngineEvent::RegistryDetails {
                registry_id,
                result: Err(err),
            },
            EngineCommand::AddRegistry { .. } => EngineEvent::RegistryAdded(Err(err)),
            EngineCommand::LoadEditForm {
                target,
                registry_id,
            } => EngineEvent::EditFormLoaded {
                target,
                registry_id,
                result: Err(err),
            },
            EngineCommand::EditRegistry { registry_id, .. } => EngineEvent::RegistryEdited {
                target: EditTarget::Registry,
                registry_id,
                result: Err(err),
            },
            EngineCommand::EditHarvest { registry_id, .. } => EngineEvent::RegistryEdited {
                target: EditTarget::Harvest,
                registry_id,
                result: Err(err),
            },
        }
    }
}

struct Downloads {
    output_dir: PathBuf,
    timestamp: TimestampFn,
}

/// Handle to the background runtime executing console calls.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ConsoleError> {
        let api = ReqwestConsoleClient::new(config.endpoints, config.client)?;
        Self::with_api(
            Arc::new(api),
            config.output_dir,
            config.download_timestamp,
        )
    }

    /// Runs commands against any [`ConsoleApi`] implementation.
    pub fn with_api(
        api: Arc<dyn ConsoleApi>,
        output_dir: PathBuf,
        timestamp: TimestampFn,
    ) -> Result<Self, ConsoleError> {
        let runtime = tokio::runtime::Runtime::new().map_err(|err| {
            ConsoleError::new(
                FailureKind::EngineStopped,
                format!("failed to start engine runtime: {err}"),
            )
        })?;
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel();
        let downloads = Arc::new(Downloads {
            output_dir,
            timestamp,
        });

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let downloads = downloads.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    let event = handle_command(api.as_ref(), &downloads, command).await;
                    let _ = event_tx.send(event);
                });
            }
            console_info!("Engine command channel closed");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    /// Queues a command; fails once the engine thread has exited.
    pub fn submit(&self, command: EngineCommand) -> Result<(), ConsoleError> {
        self.cmd_tx.send(command).map_err(|err| {
            console_error!("Engine rejected {:?}", err.0);
            ConsoleError::new(FailureKind::EngineStopped, "engine thread has exited")
        })
    }

    /// Waits for the next event. `Disconnected` means no event will ever arrive.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<EngineEvent, mpsc::RecvTimeoutError> {
        match self.event_rx.lock() {
            Ok(event_rx) => event_rx.recv_timeout(timeout),
            Err(_) => Err(mpsc::RecvTimeoutError::Disconnected),
        }
    }
}

async fn handle_command(
    api: &dyn ConsoleApi,
    downloads: &Downloads,
    command: EngineCommand,
) -> EngineEvent {
    match command {
        EngineCommand::LoadRegistries => EngineEvent::RegistriesLoaded(api.list_registries().await),
        EngineCommand::LoadSets {
            generation,
            provider_id,
        } => EngineEvent::SetsLoaded {
            generation,
            result: api.list_sets(&provider_id).await,
        },
        EngineCommand::LoadMetadataFormats {
            generation,
            provider_id,
        } => EngineEvent::MetadataFormatsLoaded {
            generation,
            result: api.list_metadata_formats(&provider_id).await,
        },
        EngineCommand::ExecuteRequest {
            request_id,
            base_url,
            args_json,
        } => EngineEvent::RequestFinished {
            request_id,
            result: api.execute_request(&base_url, &args_json).await,
        },
        EngineCommand::DownloadXml => {
            let result = match api.download_xml().await {
                Ok(download) => save_xml_download(
                    &downloads.output_dir,
                    download.filename.as_deref(),
                    &(downloads.timestamp)(),
                    &download.bytes,
                )
                .map_err(|err| ConsoleError::new(FailureKind::Io, err.to_string())),
                Err(err) => Err(err),
            };
            EngineEvent::XmlSaved(result)
        }
        EngineCommand::RegistryOperation {
            operation,
            registry_id,
        } => {
            let result = api.registry_operation(operation, &registry_id).await;
            EngineEvent::RegistryOperationFinished {
                operation,
                registry_id,
                result,
            }
        }
        EngineCommand::CheckRegistry { registry_id, url } => EngineEvent::AvailabilityChecked {
            registry_id,
            result: api.check_registry(&url).await,
        },
        EngineCommand::PollHarvestStatus { refresh } => EngineEvent::HarvestStatus {
            refresh,
            result: api.harvest_status().await,
        },
        EngineCommand::PollUpdateStatus { refresh } => EngineEvent::UpdateStatus {
            refresh,
            result: api.update_status().await,
        },
        EngineCommand::ViewRegistry { registry_id } => {
            let result = api.view_registry(&registry_id).await;
            EngineEvent::RegistryDetails {
                registry_id,
                result,
            }
        }
        EngineCommand::AddRegistry {
            url,
            harvest_rate,
            harvest,
        } => EngineEvent::RegistryAdded(api.add_registry(&url, harvest_rate, harvest).await),
        EngineCommand::LoadEditForm {
            target,
            registry_id,
        } => {
            let result = api.edit_form(target, &registry_id).await;
            EngineEvent::EditFormLoaded {
                target,
                registry_id,
                result,
            }
        }
        EngineCommand::EditRegistry {
            registry_id,
            harvest_rate,
            harvest,
        } => {
            let result = api.edit_registry(&registry_id, harvest_rate, harvest).await;
            EngineEvent::RegistryEdited {
                target: EditTarget::Registry,
                registry_id,
                result,
            }
        }
        EngineCommand::EditHarvest {
            registry_id,
            metadata_formats,
            sets,
        } => {
            let result = api.edit_harvest(&registry_id, &metadata_formats, &sets).await;
            EngineEvent::RegistryEdited {
                target: EditTarget::Harvest,
                registry_id,
                result,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detached_handle() -> EngineHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        drop(cmd_rx);
        drop(event_tx);
        EngineHandle {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        }
    }

    #[test]
    fn stopped_engine_rejects_commands() {
        let handle = detached_handle();
        let err = handle
            .submit(EngineCommand::LoadRegistries)
            .expect_err("submit should fail");
        assert_eq!(err.kind, FailureKind::EngineStopped);
    }

    #[test]
    fn stopped_engine_reports_disconnect_instead_of_timeout() {
        let handle = detached_handle();
        assert_eq!(
            handle.recv_timeout(Duration::from_millis(10)),
            Err(mpsc::RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn rejected_command_maps_to_its_failure_event() {
        let err = ConsoleError::new(FailureKind::EngineStopped, "gone");
        let event = EngineCommand::ExecuteRequest {
            request_id: 4,
            base_url: "http://example.org/oai".to_string(),
            args_json: "{}".to_string(),
        }
        .into_failure(err.clone());
        assert_eq!(
            event,
            EngineEvent::RequestFinished {
                request_id: 4,
                result: Err(err.clone()),
            }
        );

        let event = EngineCommand::EditHarvest {
            registry_id: "5".to_string(),
            metadata_formats: Vec::new(),
            sets: Vec::new(),
        }
        .into_failure(err.clone());
        assert_eq!(
            event,
            EngineEvent::RegistryEdited {
                target: EditTarget::Harvest,
                registry_id: "5".to_string(),
                result: Err(err),
            }
        );
    }
}
