use crate::{EditKind, HarvestSelection, OaiRequest, RegistryAction, RegistryId};

/// Sequence number tagging provider-dependent option loads.
pub type Generation = u64;
/// Sequence number tagging OAI-PMH executions.
pub type RequestId = u64;

/// Who asked for a status poll. Only refresh polls settle a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOrigin {
    Refresh,
    Action,
}

/// Work the shell must perform on behalf of the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
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
        request: OaiRequest,
    },
    DownloadXml,
    RunRegistryAction {
        action: RegistryAction,
        registry_id: RegistryId,
    },
    CheckAvailability {
        registry_id: RegistryId,
        url: String,
    },
    PollHarvestStatus {
        origin: PollOrigin,
    },
    PollUpdateStatus {
        origin: PollOrigin,
    },
    ViewRegistry {
        registry_id: RegistryId,
    },
    AddRegistry {
        url: String,
        harvest_rate: u64,
        harvest: bool,
    },
    LoadEditForm {
        kind: EditKind,
        registry_id: RegistryId,
    },
    EditRegistry {
        registry_id: RegistryId,
        harvest_rate: u64,
        harvest: bool,
    },
    EditHarvest {
        registry_id: RegistryId,
        selection: HarvestSelection,
    },
}
