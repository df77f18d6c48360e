use crate::{
    EditKind, Generation, HarvestSelection, HarvestStatus, PollOrigin, RegistryAction,
    RegistryDraft, RegistryEdit, RegistryId, RegistryRow, RequestId, SetEntry, UpdateStatus,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Data provider select changed; carries the combined `"<id>|<url>"` value.
    ProviderChanged(String),
    /// Verb select changed; carries the verb code.
    VerbChanged(String),
    SetChanged(String),
    MetadataPrefixChanged(String),
    IdentifierChanged(String),
    ResumptionTokenChanged(String),
    FromDateChanged(String),
    UntilDateChanged(String),
    /// Sets fetched for the provider selected at `generation`.
    SetsLoaded {
        generation: Generation,
        result: Result<Vec<SetEntry>, String>,
    },
    /// Metadata prefixes fetched for the provider selected at `generation`.
    MetadataFormatsLoaded {
        generation: Generation,
        result: Result<Vec<String>, String>,
    },
    /// User pressed Submit in the request builder.
    SubmitClicked,
    /// Execution endpoint answered (or failed); `Ok` carries the rendered message.
    RequestFinished {
        request_id: RequestId,
        result: Result<String, String>,
    },
    DownloadXmlClicked,
    /// Downloaded XML was written; `Ok` carries the file path.
    XmlSaved(Result<String, String>),
    /// Reload the registry list from the server.
    RegistriesRequested,
    RegistriesLoaded(Result<Vec<RegistryRow>, String>),
    RegistryActionClicked {
        action: RegistryAction,
        registry_id: RegistryId,
    },
    /// "Harvest all" / "Update all".
    RegistryActionAllClicked(RegistryAction),
    RegistryActionFinished {
        action: RegistryAction,
        registry_id: RegistryId,
        result: Result<(), String>,
    },
    CheckClicked(RegistryId),
    CheckAllClicked,
    AvailabilityChecked {
        registry_id: RegistryId,
        result: Result<bool, String>,
    },
    HarvestStatusReceived {
        origin: PollOrigin,
        result: Result<Vec<HarvestStatus>, String>,
    },
    UpdateStatusReceived {
        origin: PollOrigin,
        result: Result<Vec<UpdateStatus>, String>,
    },
    ViewRegistryClicked(RegistryId),
    RegistryDetailsLoaded {
        registry_id: RegistryId,
        result: Result<String, String>,
    },
    AddRegistrySubmitted(RegistryDraft),
    RegistryAdded(Result<(), String>),
    /// Opens the edit form of the given kind for a registry.
    EditClicked {
        kind: EditKind,
        registry_id: RegistryId,
    },
    /// Rendered edit form fetched from the server.
    EditFormLoaded {
        kind: EditKind,
        registry_id: RegistryId,
        result: Result<String, String>,
    },
    RegistryEditSubmitted {
        registry_id: RegistryId,
        edit: RegistryEdit,
    },
    HarvestSelectionSubmitted {
        registry_id: RegistryId,
        selection: HarvestSelection,
    },
    RegistryEdited {
        kind: EditKind,
        registry_id: RegistryId,
        result: Result<(), String>,
    },
    /// One second of the status refresh countdown elapsed.
    RefreshTick,
    /// Wakes the event loop without changing state.
    NoOp,
}
