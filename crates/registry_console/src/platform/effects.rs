use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use console_logging::{console_error, console_info, console_warn};
use registry_core::{
    EditKind, Effect, HarvestStatus, Msg, PollOrigin, RegistryAction, RegistryRow, SetEntry,
    UpdateStatus,
};
use registry_engine::{
    ConsoleError, EditTarget, EngineCommand, EngineConfig, EngineEvent, EngineHandle,
    RegistryOperation, RegistryRecord,
};

pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, msg_tx: mpsc::Sender<Msg>) -> anyhow::Result<Self> {
        let engine = EngineHandle::new(config)?;
        let runner = Self { engine, msg_tx };
        runner.spawn_event_loop();
        Ok(runner)
    }

    /// Commands the engine cannot accept are answered with their failure message.
    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            let command = command_for(effect);
            if let Err(err) = self.engine.submit(command.clone()) {
                console_error!("Dropping effect: {}", err);
                let _ = self.msg_tx.send(msg_for(command.into_failure(err)));
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || loop {
            let event = match engine.recv_timeout(Duration::from_millis(200)) {
                Ok(event) => event,
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => {
                    console_error!("Engine event channel closed");
                    break;
                }
            };
            if msg_tx.send(msg_for(event)).is_err() {
                console_info!("Event loop stopped; receiver gone");
                break;
            }
        });
    }
}

fn command_for(effect: Effect) -> EngineCommand {
    match effect {
        Effect::LoadRegistries => EngineCommand::LoadRegistries,
        Effect::LoadSets {
            generation,
            provider_id,
        } => EngineCommand::LoadSets {
            generation,
            provider_id,
        },
        Effect::LoadMetadataFormats {
            generation,
            provider_id,
        } => EngineCommand::LoadMetadataFormats {
            generation,
            provider_id,
        },
        Effect::ExecuteRequest {
            request_id,
            request,
        } => {
            console_info!(
                "ExecuteRequest request_id={} url={}",
                request_id,
                request.base_url
            );
            EngineCommand::ExecuteRequest {
                request_id,
                args_json: request.params.to_json(),
                base_url: request.base_url,
            }
        }
        Effect::DownloadXml => EngineCommand::DownloadXml,
        Effect::RunRegistryAction {
            action,
            registry_id,
        } => EngineCommand::RegistryOperation {
            operation: operation_for(action),
            registry_id,
        },
        Effect::CheckAvailability { registry_id, url } => {
            EngineCommand::CheckRegistry { registry_id, url }
        }
        Effect::PollHarvestStatus { origin } => EngineCommand::PollHarvestStatus {
            refresh: origin == PollOrigin::Refresh,
        },
        Effect::PollUpdateStatus { origin } => EngineCommand::PollUpdateStatus {
            refresh: origin == PollOrigin::Refresh,
        },
        Effect::ViewRegistry { registry_id } => EngineCommand::ViewRegistry { registry_id },
        Effect::AddRegistry {
            url,
            harvest_rate,
            harvest,
        } => EngineCommand::AddRegistry {
            url,
            harvest_rate,
            harvest,
        },
        Effect::LoadEditForm { kind, registry_id } => EngineCommand::LoadEditForm {
            target: target_for(kind),
            registry_id,
        },
        Effect::EditRegistry {
            registry_id,
            harvest_rate,
            harvest,
        } => EngineCommand::EditRegistry {
            registry_id,
            harvest_rate,
            harvest,
        },
        Effect::EditHarvest {
            registry_id,
            selection,
        } => EngineCommand::EditHarvest {
            registry_id,
            metadata_formats: selection.metadata_formats,
            sets: selection.sets,
        },
    }
}

fn msg_for(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::RegistriesLoaded(result) => Msg::RegistriesLoaded(
            flatten(result).map(|records| records.into_iter().map(registry_row).collect()),
        ),
        EngineEvent::SetsLoaded { generation, result } => Msg::SetsLoaded {
            generation,
            result: flatten(result).map(|sets| {
                sets.into_iter()
                    .map(|set| SetEntry {
                        key: set.key,
                        value: set.value,
                    })
                    .collect()
            }),
        },
        EngineEvent::MetadataFormatsLoaded { generation, result } => Msg::MetadataFormatsLoaded {
            generation,
            result: flatten(result),
        },
        EngineEvent::RequestFinished { request_id, result } => Msg::RequestFinished {
            request_id,
            result: flatten(result),
        },
        EngineEvent::XmlSaved(result) => {
            Msg::XmlSaved(flatten(result).map(|path| path.display().to_string()))
        }
        EngineEvent::RegistryOperationFinished {
            operation,
            registry_id,
            result,
        } => Msg::RegistryActionFinished {
            action: action_for(operation),
            registry_id,
            result: flatten(result),
        },
        EngineEvent::AvailabilityChecked {
            registry_id,
            result,
        } => Msg::AvailabilityChecked {
            registry_id,
            result: flatten(result),
        },
        EngineEvent::HarvestStatus { refresh, result } => Msg::HarvestStatusReceived {
            origin: origin_for(refresh),
            result: flatten(result).map(|records| {
                records
                    .into_iter()
                    .map(|record| HarvestStatus {
                        registry_id: record.registry_id,
                        is_harvesting: record.is_harvesting,
                    })
                    .collect()
            }),
        },
        EngineEvent::UpdateStatus { refresh, result } => Msg::UpdateStatusReceived {
            origin: origin_for(refresh),
            result: flatten(result).map(|records| {
                records
                    .into_iter()
                    .map(|record| UpdateStatus {
                        registry_id: record.registry_id,
                        is_updating: record.is_updating,
                        name: record.name,
                        last_update: record.last_update,
                    })
                    .collect()
            }),
        },
        EngineEvent::RegistryDetails {
            registry_id,
            result,
        } => Msg::RegistryDetailsLoaded {
            registry_id,
            result: flatten(result),
        },
        EngineEvent::RegistryAdded(result) => Msg::RegistryAdded(flatten(result)),
        EngineEvent::EditFormLoaded {
            target,
            registry_id,
            result,
        } => Msg::EditFormLoaded {
            kind: kind_for(target),
            registry_id,
            result: flatten(result),
        },
        EngineEvent::RegistryEdited {
            target,
            registry_id,
            result,
        } => Msg::RegistryEdited {
            kind: kind_for(target),
            registry_id,
            result: flatten(result),
        },
    }
}

fn origin_for(refresh: bool) -> PollOrigin {
    if refresh {
        PollOrigin::Refresh
    } else {
        PollOrigin::Action
    }
}

fn target_for(kind: EditKind) -> EditTarget {
    match kind {
        EditKind::Registry => EditTarget::Registry,
        EditKind::Harvest => EditTarget::Harvest,
    }
}

fn kind_for(target: EditTarget) -> EditKind {
    match target {
        EditTarget::Registry => EditKind::Registry,
        EditTarget::Harvest => EditKind::Harvest,
    }
}

/// The core only sees the text an operator should read.
fn flatten<T>(result: Result<T, ConsoleError>) -> Result<T, String> {
    result.map_err(|err| {
        console_warn!("Console call failed: {}", err);
        err.to_string()
    })
}

fn registry_row(record: RegistryRecord) -> RegistryRow {
    let mut row = RegistryRow::new(record.id, record.name, record.url);
    row.is_activated = record.is_activated;
    row.harvest = record.harvest;
    row.harvest_rate = record.harvest_rate;
    row.last_update = record.last_update;
    row.is_harvesting = record.is_harvesting;
    row.is_updating = record.is_updating;
    row
}

fn operation_for(action: RegistryAction) -> RegistryOperation {
    match action {
        RegistryAction::Activate => RegistryOperation::Activate,
        RegistryAction::Deactivate => RegistryOperation::Deactivate,
        RegistryAction::Delete => RegistryOperation::Delete,
        RegistryAction::Harvest => RegistryOperation::Harvest,
        RegistryAction::Update => RegistryOperation::Update,
    }
}

fn action_for(operation: RegistryOperation) -> RegistryAction {
    match operation {
        RegistryOperation::Activate => RegistryAction::Activate,
        RegistryOperation::Deactivate => RegistryAction::Deactivate,
        RegistryOperation::Delete => RegistryAction::Delete,
        RegistryOperation::Harvest => RegistryAction::Harvest,
        RegistryOperation::Update => RegistryAction::Update,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_core::{DataProvider, HarvestSelection, RequestForm, Verb};
    use registry_engine::FailureKind;

    #[test]
    fn execute_effect_carries_params_as_json() {
        let form = RequestForm {
            data_provider: Some(DataProvider::new("1", "http://repo.example/oai")),
            verb: Some(Verb::Identify),
            ..RequestForm::default()
        };
        let request = registry_core::build_request(&form);
        let command = command_for(Effect::ExecuteRequest {
            request_id: 3,
            request,
        });
        assert_eq!(
            command,
            EngineCommand::ExecuteRequest {
                request_id: 3,
                base_url: "http://repo.example/oai".into(),
                args_json: r#"{"verb":"Identify"}"#.into(),
            }
        );
    }

    #[test]
    fn registry_record_keeps_activation_and_status() {
        let record = RegistryRecord {
            id: "4".into(),
            name: "Repo".into(),
            url: "http://repo.example/oai".into(),
            harvest_rate: Some(60),
            description: None,
            harvest: true,
            last_update: Some("2024-01-01".into()),
            is_harvesting: true,
            is_updating: false,
            is_activated: false,
            is_queued: false,
        };
        let row = registry_row(record);
        assert_eq!(row.id, "4");
        assert!(!row.is_activated);
        assert!(row.is_harvesting);
        assert_eq!(row.harvest_rate, Some(60));
    }

    #[test]
    fn status_poll_origin_survives_the_engine() {
        let command = command_for(Effect::PollUpdateStatus {
            origin: PollOrigin::Action,
        });
        assert_eq!(command, EngineCommand::PollUpdateStatus { refresh: false });

        let msg = msg_for(EngineEvent::UpdateStatus {
            refresh: false,
            result: Ok(Vec::new()),
        });
        assert_eq!(
            msg,
            Msg::UpdateStatusReceived {
                origin: PollOrigin::Action,
                result: Ok(Vec::new()),
            }
        );
    }

    #[test]
    fn harvest_selection_becomes_repeated_ids() {
        let command = command_for(Effect::EditHarvest {
            registry_id: "5".into(),
            selection: HarvestSelection {
                metadata_formats: vec!["11".into()],
                sets: vec!["21".into(), "22".into()],
            },
        });
        assert_eq!(
            command,
            EngineCommand::EditHarvest {
                registry_id: "5".into(),
                metadata_formats: vec!["11".into()],
                sets: vec!["21".into(), "22".into()],
            }
        );
    }

    #[test]
    fn edit_events_keep_their_kind() {
        let msg = msg_for(EngineEvent::EditFormLoaded {
            target: EditTarget::Harvest,
            registry_id: "5".into(),
            result: Ok("<form/>".into()),
        });
        assert_eq!(
            msg,
            Msg::EditFormLoaded {
                kind: EditKind::Harvest,
                registry_id: "5".into(),
                result: Ok("<form/>".into()),
            }
        );
    }

    #[test]
    fn rejected_execution_finishes_the_request() {
        let err = ConsoleError {
            kind: FailureKind::EngineStopped,
            message: "engine thread has exited".into(),
        };
        let command = command_for(Effect::DownloadXml);
        assert_eq!(
            msg_for(command.into_failure(err.clone())),
            Msg::XmlSaved(Err("engine stopped: engine thread has exited".into()))
        );

        let command = EngineCommand::ExecuteRequest {
            request_id: 9,
            base_url: "http://repo.example/oai".into(),
            args_json: "{}".into(),
        };
        assert_eq!(
            msg_for(command.into_failure(err)),
            Msg::RequestFinished {
                request_id: 9,
                result: Err("engine stopped: engine thread has exited".into()),
            }
        );
    }

    #[test]
    fn operations_map_both_ways() {
        for action in [
            RegistryAction::Activate,
            RegistryAction::Deactivate,
            RegistryAction::Delete,
            RegistryAction::Harvest,
            RegistryAction::Update,
        ] {
            assert_eq!(action_for(operation_for(action)), action);
        }
    }
}
