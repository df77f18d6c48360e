use crate::{EditKind, RegistryRow, RequestForm, SelectControl, SelectOption};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBuilderView {
    pub provider_choices: Vec<SelectOption>,
    pub form: RequestForm,
    pub set_control: SelectControl,
    pub metadata_prefix_control: SelectControl,
    pub submit_enabled: bool,
    /// The "please wait" banner is shown while a request is in flight.
    pub waiting: bool,
    pub error_banner: Option<String>,
    /// Rendered response of the last successful request.
    pub result_message: Option<String>,
    pub download_visible: bool,
    pub saved_xml_path: Option<String>,
    /// Direct protocol URL for the current form, when it validates.
    pub request_preview: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDetailsView {
    pub registry_id: String,
    pub name: String,
    pub loading: bool,
    pub content: Option<String>,
    pub error: Option<String>,
}

/// Open edit form; `form` is the server-rendered form once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEditorView {
    pub kind: EditKind,
    pub registry_id: String,
    pub name: String,
    pub loading: bool,
    pub form: Option<String>,
    pub pending: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AddRegistryView {
    pub pending: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshView {
    pub countdown: u32,
    pub refreshing: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppViewModel {
    pub builder: RequestBuilderView,
    pub registries: Vec<RegistryRow>,
    pub registries_loading: bool,
    pub registry_error: Option<String>,
    pub registry_details: Option<RegistryDetailsView>,
    pub registry_editor: Option<RegistryEditorView>,
    pub add_registry: AddRegistryView,
    pub refresh: RefreshView,
    pub dirty: bool,
}
