//! Registry console core: typed OAI-PMH request builder, registry list
//! state and the pure update function driving both.
mod effect;
mod form;
mod msg;
mod options;
mod params;
mod registry;
mod state;
mod update;
mod validate;
mod verb;
mod view_model;

pub use effect::{Effect, Generation, PollOrigin, RequestId};
pub use form::{select_value, text_value, DataProvider, RawRequestForm, RequestForm, UNSET_SELECT};
pub use msg::Msg;
pub use options::{
    metadata_prefix_options, set_options, SelectControl, SelectOption, SetEntry,
    PLACEHOLDER_LABEL,
};
pub use params::{assemble_params, build_request, OaiParams, OaiRequest};
pub use registry::{
    parse_harvest_rate, provider_choices, Availability, EditKind, HarvestSelection,
    HarvestStatus, RegistryAction, RegistryDraft, RegistryEdit, RegistryFormError, RegistryId,
    RegistryRow, UpdateStatus,
};
pub use state::{AppState, DEFAULT_REFRESH_SECONDS};
pub use update::update;
pub use validate::{validate, ValidationError};
pub use verb::Verb;
pub use view_model::{
    AddRegistryView, AppViewModel, RefreshView, RegistryDetailsView, RegistryEditorView,
    RequestBuilderView,
};
