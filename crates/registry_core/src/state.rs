use console_logging::{console_debug, console_info, console_warn};

use crate::form::{select_value, text_value};
use crate::options::{metadata_prefix_options, set_options};
use crate::view_model::{
    AddRegistryView, AppViewModel, RefreshView, RegistryDetailsView, RegistryEditorView,
    RequestBuilderView,
};
use crate::{
    build_request, provider_choices, validate, Availability, DataProvider, EditKind, Effect,
    Generation, HarvestSelection, HarvestStatus, PollOrigin, RegistryAction, RegistryDraft,
    RegistryEdit, RegistryRow, RequestForm, RequestId, SelectControl, SetEntry, UpdateStatus,
    Verb,
};

/// Seconds between two background status refreshes of the registry list.
pub const DEFAULT_REFRESH_SECONDS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DetailsContent {
    Loading,
    Loaded(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegistryDetails {
    registry_id: String,
    name: String,
    content: DetailsContent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RegistryEditor {
    kind: EditKind,
    registry_id: String,
    name: String,
    form: DetailsContent,
    pending: bool,
    errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    form: RequestForm,
    set_control: SelectControl,
    metadata_prefix_control: SelectControl,
    options_generation: Generation,
    next_request_id: RequestId,
    in_flight: Option<RequestId>,
    error_banner: Option<String>,
    result_message: Option<String>,
    download_visible: bool,
    saved_xml_path: Option<String>,
    registries: Vec<RegistryRow>,
    registries_loading: bool,
    registry_error: Option<String>,
    details: Option<RegistryDetails>,
    editor: Option<RegistryEditor>,
    add_registry_pending: bool,
    add_registry_errors: Vec<String>,
    refresh_interval: u32,
    refresh_countdown: u32,
    refreshing: bool,
    harvest_poll_pending: bool,
    update_poll_pending: bool,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::with_refresh_interval(DEFAULT_REFRESH_SECONDS)
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_refresh_interval(seconds: u32) -> Self {
        let seconds = seconds.max(1);
        Self {
            form: RequestForm::default(),
            set_control: SelectControl::placeholder(),
            metadata_prefix_control: SelectControl::placeholder(),
            options_generation: 0,
            next_request_id: 1,
            in_flight: None,
            error_banner: None,
            result_message: None,
            download_visible: false,
            saved_xml_path: None,
            registries: Vec::new(),
            registries_loading: false,
            registry_error: None,
            details: None,
            editor: None,
            add_registry_pending: false,
            add_registry_errors: Vec::new(),
            refresh_interval: seconds,
            refresh_countdown: seconds,
            refreshing: false,
            harvest_poll_pending: false,
            update_poll_pending: false,
            dirty: false,
        }
    }

    pub fn form(&self) -> &RequestForm {
        &self.form
    }

    pub fn options_generation(&self) -> Generation {
        self.options_generation
    }

    pub fn request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn view(&self) -> AppViewModel {
        let request_preview = validate(&self.form)
            .ok()
            .and_then(|()| build_request(&self.form).direct_url().ok())
            .map(|url| url.to_string());

        AppViewModel {
            builder: RequestBuilderView {
                provider_choices: provider_choices(&self.registries),
                form: self.form.clone(),
                set_control: self.set_control.clone(),
                metadata_prefix_control: self.metadata_prefix_control.clone(),
                submit_enabled: self.in_flight.is_none(),
                waiting: self.in_flight.is_some(),
                error_banner: self.error_banner.clone(),
                result_message: self.result_message.clone(),
                download_visible: self.download_visible,
                saved_xml_path: self.saved_xml_path.clone(),
                request_preview,
            },
            registries: self.registries.clone(),
            registries_loading: self.registries_loading,
            registry_error: self.registry_error.clone(),
            registry_details: self.details.as_ref().map(|details| RegistryDetailsView {
                registry_id: details.registry_id.clone(),
                name: details.name.clone(),
                loading: details.content == DetailsContent::Loading,
                content: match &details.content {
                    DetailsContent::Loaded(html) => Some(html.clone()),
                    _ => None,
                },
                error: match &details.content {
                    DetailsContent::Failed(text) => Some(text.clone()),
                    _ => None,
                },
            }),
            registry_editor: self.editor.as_ref().map(|editor| RegistryEditorView {
                kind: editor.kind,
                registry_id: editor.registry_id.clone(),
                name: editor.name.clone(),
                loading: editor.form == DetailsContent::Loading,
                form: match &editor.form {
                    DetailsContent::Loaded(html) => Some(html.clone()),
                    _ => None,
                },
                pending: editor.pending,
                errors: match &editor.form {
                    DetailsContent::Failed(text) => {
                        let mut errors = vec![text.clone()];
                        errors.extend(editor.errors.iter().cloned());
                        errors
                    }
                    _ => editor.errors.clone(),
                },
            }),
            add_registry: AddRegistryView {
                pending: self.add_registry_pending,
                errors: self.add_registry_errors.clone(),
            },
            refresh: RefreshView {
                countdown: self.refresh_countdown,
                refreshing: self.refreshing,
            },
            dirty: self.dirty,
        }
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Returns whether a re-render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn clear_error_banner(&mut self) {
        self.error_banner = None;
    }

    // ---- request builder -------------------------------------------------

    /// Applies a new data-provider selection and returns the option loads it needs.
    pub(crate) fn select_provider(&mut self, provider: Option<DataProvider>) -> Vec<Effect> {
        self.clear_error_banner();
        self.form.data_provider = provider;
        self.form.set = None;
        self.form.metadata_prefix = None;
        self.set_control.reset();
        self.metadata_prefix_control.reset();
        self.options_generation += 1;
        self.mark_dirty();

        match &self.form.data_provider {
            Some(provider) => {
                let generation = self.options_generation;
                vec![
                    Effect::LoadSets {
                        generation,
                        provider_id: provider.id.clone(),
                    },
                    Effect::LoadMetadataFormats {
                        generation,
                        provider_id: provider.id.clone(),
                    },
                ]
            }
            None => Vec::new(),
        }
    }

    pub(crate) fn select_verb(&mut self, verb: Option<Verb>) {
        self.clear_error_banner();
        self.form.verb = verb;
        self.mark_dirty();
    }

    pub(crate) fn select_set(&mut self, raw: &str) {
        self.clear_error_banner();
        match select_value(raw) {
            None => self.form.set = None,
            Some(value) if self.set_control.enabled && self.set_control.contains(&value) => {
                self.form.set = Some(value);
            }
            Some(value) => {
                console_warn!("Ignoring set {:?}: not offered by the selected provider", value);
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn select_metadata_prefix(&mut self, raw: &str) {
        self.clear_error_banner();
        match select_value(raw) {
            None => self.form.metadata_prefix = None,
            Some(value)
                if self.metadata_prefix_control.enabled
                    && self.metadata_prefix_control.contains(&value) =>
            {
                self.form.metadata_prefix = Some(value);
            }
            Some(value) => {
                console_warn!(
                    "Ignoring metadata prefix {:?}: not offered by the selected provider",
                    value
                );
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn edit_text(&mut self, field: TextField, raw: &str) {
        self.clear_error_banner();
        let value = text_value(raw);
        match field {
            TextField::Identifier => self.form.identifier = value,
            TextField::ResumptionToken => self.form.resumption_token = value,
            TextField::FromDate => self.form.from_date = value,
            TextField::UntilDate => self.form.until_date = value,
        }
        self.mark_dirty();
    }

    pub(crate) fn apply_sets(&mut self, generation: Generation, result: Result<Vec<SetEntry>, String>) {
        if generation != self.options_generation {
            console_debug!(
                "Discarding stale sets (generation {} != {})",
                generation,
                self.options_generation
            );
            return;
        }
        self.form.set = None;
        match result {
            Ok(entries) => self.set_control.populate(set_options(&entries)),
            Err(err) => {
                console_warn!("Failed to load sets: {}", err);
                self.set_control.reset();
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn apply_metadata_formats(
        &mut self,
        generation: Generation,
        result: Result<Vec<String>, String>,
    ) {
        if generation != self.options_generation {
            console_debug!(
                "Discarding stale metadata formats (generation {} != {})",
                generation,
                self.options_generation
            );
            return;
        }
        self.form.metadata_prefix = None;
        match result {
            Ok(prefixes) => self
                .metadata_prefix_control
                .populate(metadata_prefix_options(&prefixes)),
            Err(err) => {
                console_warn!("Failed to load metadata formats: {}", err);
                self.metadata_prefix_control.reset();
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn submit(&mut self) -> Vec<Effect> {
        if self.in_flight.is_some() {
            console_debug!("Submit ignored: a request is already in flight");
            return Vec::new();
        }
        self.clear_error_banner();
        self.download_visible = false;
        self.result_message = None;
        self.mark_dirty();

        if let Err(err) = validate(&self.form) {
            self.error_banner = Some(err.to_string());
            return Vec::new();
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.in_flight = Some(request_id);
        let request = build_request(&self.form);
        console_info!(
            "Submitting request #{} to {} with {}",
            request_id,
            request.base_url,
            request.params.to_json()
        );
        vec![Effect::ExecuteRequest {
            request_id,
            request,
        }]
    }

    pub(crate) fn finish_request(&mut self, request_id: RequestId, result: Result<String, String>) {
        if self.in_flight != Some(request_id) {
            console_debug!("Ignoring completion of request #{}", request_id);
            return;
        }
        self.in_flight = None;
        match result {
            Ok(message) => {
                self.result_message = Some(message);
                self.download_visible = true;
            }
            Err(text) => {
                console_warn!("Request #{} failed: {}", request_id, text);
                self.error_banner = Some(text);
            }
        }
        self.mark_dirty();
    }

    pub(crate) fn request_download(&mut self) -> Vec<Effect> {
        if self.download_visible {
            vec![Effect::DownloadXml]
        } else {
            Vec::new()
        }
    }

    pub(crate) fn apply_xml_saved(&mut self, result: Result<String, String>) {
        match result {
            Ok(path) => self.saved_xml_path = Some(path),
            Err(text) => self.error_banner = Some(text),
        }
        self.mark_dirty();
    }

    // ---- registry list ---------------------------------------------------

    pub(crate) fn request_registries(&mut self) -> Vec<Effect> {
        self.registries_loading = true;
        self.mark_dirty();
        vec![Effect::LoadRegistries]
    }

    /// Replaces the registry list and returns option loads if the provider selection changed.
    pub(crate) fn apply_registries(&mut self, result: Result<Vec<RegistryRow>, String>) -> Vec<Effect> {
        self.registries_loading = false;
        self.mark_dirty();
        let rows = match result {
            Ok(rows) => rows,
            Err(err) => {
                console_warn!("Failed to load registries: {}", err);
                self.registry_error = Some(err);
                return Vec::new();
            }
        };
        self.registry_error = None;
        self.registries = rows;

        let selection_still_offered = self.form.data_provider.as_ref().is_none_or(|selected| {
            self.registries.iter().any(|registry| {
                registry.is_activated
                    && registry.id == selected.id
                    && registry.url == selected.base_url
            })
        });
        if selection_still_offered {
            Vec::new()
        } else {
            console_info!("Selected data provider is no longer available; clearing selection");
            self.select_provider(None)
        }
    }

    fn registry_mut(&mut self, registry_id: &str) -> Option<&mut RegistryRow> {
        self.registries
            .iter_mut()
            .find(|registry| registry.id == registry_id)
    }

    pub(crate) fn start_registry_action(
        &mut self,
        action: RegistryAction,
        registry_id: String,
    ) -> Vec<Effect> {
        let Some(row) = self.registry_mut(&registry_id) else {
            console_warn!("Unknown registry {:?} for {}", registry_id, action);
            return Vec::new();
        };
        match action {
            RegistryAction::Harvest => row.is_harvesting = true,
            RegistryAction::Update => row.is_updating = true,
            RegistryAction::Activate | RegistryAction::Deactivate | RegistryAction::Delete => {}
        }
        self.registry_error = None;
        self.mark_dirty();
        vec![Effect::RunRegistryAction {
            action,
            registry_id,
        }]
    }

    pub(crate) fn start_registry_action_all(&mut self, action: RegistryAction) -> Vec<Effect> {
        if !matches!(action, RegistryAction::Harvest | RegistryAction::Update) {
            console_warn!("{} cannot be applied to every registry", action);
            return Vec::new();
        }
        let ids: Vec<String> = self
            .registries
            .iter()
            .filter(|registry| registry.is_activated)
            .map(|registry| registry.id.clone())
            .collect();
        ids.into_iter()
            .flat_map(|id| self.start_registry_action(action, id))
            .collect()
    }

    pub(crate) fn finish_registry_action(
        &mut self,
        action: RegistryAction,
        registry_id: &str,
        result: Result<(), String>,
    ) -> Vec<Effect> {
        self.mark_dirty();
        if let Err(text) = result {
            console_warn!("Failed to {} registry {}: {}", action, registry_id, text);
            if let Some(row) = self.registry_mut(registry_id) {
                match action {
                    RegistryAction::Harvest => row.is_harvesting = false,
                    RegistryAction::Update => row.is_updating = false,
                    _ => {}
                }
            }
            self.registry_error = Some(text);
            return Vec::new();
        }

        console_info!("Registry {}: {} accepted", registry_id, action);
        let origin = PollOrigin::Action;
        match action {
            action if action.reloads_list() => self.request_registries(),
            RegistryAction::Harvest => vec![Effect::PollHarvestStatus { origin }],
            RegistryAction::Update => vec![Effect::PollUpdateStatus { origin }],
            _ => Vec::new(),
        }
    }

    pub(crate) fn start_check(&mut self, registry_id: &str) -> Vec<Effect> {
        let Some(row) = self.registry_mut(registry_id) else {
            console_warn!("Unknown registry {:?} for availability check", registry_id);
            return Vec::new();
        };
        row.availability = Availability::Checking;
        let effect = Effect::CheckAvailability {
            registry_id: row.id.clone(),
            url: row.url.clone(),
        };
        self.mark_dirty();
        vec![effect]
    }

    pub(crate) fn start_check_all(&mut self) -> Vec<Effect> {
        let ids: Vec<String> = self.registries.iter().map(|row| row.id.clone()).collect();
        ids.iter().flat_map(|id| self.start_check(id)).collect()
    }

    pub(crate) fn apply_availability(&mut self, registry_id: &str, result: Result<bool, String>) {
        let Some(row) = self.registry_mut(registry_id) else {
            return;
        };
        row.availability = match result {
            Ok(true) => Availability::Available,
            Ok(false) => Availability::Unavailable,
            Err(err) => {
                console_warn!("Availability check for {} failed: {}", registry_id, err);
                Availability::CheckFailed
            }
        };
        self.mark_dirty();
    }

    pub(crate) fn apply_harvest_status(
        &mut self,
        origin: PollOrigin,
        result: Result<Vec<HarvestStatus>, String>,
    ) {
        match result {
            Ok(statuses) => {
                for status in statuses {
                    if let Some(row) = self.registry_mut(&status.registry_id) {
                        row.is_harvesting = status.is_harvesting;
                    }
                }
            }
            Err(err) => console_warn!("Failed to poll harvest status: {}", err),
        }
        if origin == PollOrigin::Refresh {
            self.harvest_poll_pending = false;
            self.settle_refresh();
        }
        self.mark_dirty();
    }

    pub(crate) fn apply_update_status(
        &mut self,
        origin: PollOrigin,
        result: Result<Vec<UpdateStatus>, String>,
    ) {
        match result {
            Ok(statuses) => {
                for status in statuses {
                    if let Some(row) = self.registry_mut(&status.registry_id) {
                        row.is_updating = status.is_updating;
                        if !status.is_updating {
                            row.name = status.name;
                            row.last_update = status.last_update;
                        }
                    }
                }
            }
            Err(err) => console_warn!("Failed to poll update status: {}", err),
        }
        if origin == PollOrigin::Refresh {
            self.update_poll_pending = false;
            self.settle_refresh();
        }
        self.mark_dirty();
    }

    pub(crate) fn open_details(&mut self, registry_id: String) -> Vec<Effect> {
        let name = self
            .registries
            .iter()
            .find(|registry| registry.id == registry_id)
            .map(|registry| registry.name.clone())
            .unwrap_or_default();
        self.details = Some(RegistryDetails {
            registry_id: registry_id.clone(),
            name,
            content: DetailsContent::Loading,
        });
        self.mark_dirty();
        vec![Effect::ViewRegistry { registry_id }]
    }

    pub(crate) fn apply_details(&mut self, registry_id: &str, result: Result<String, String>) {
        let Some(details) = self
            .details
            .as_mut()
            .filter(|details| details.registry_id == registry_id)
        else {
            return;
        };
        details.content = match result {
            Ok(html) => DetailsContent::Loaded(html),
            Err(text) => DetailsContent::Failed(text),
        };
        self.mark_dirty();
    }

    pub(crate) fn submit_registry(&mut self, draft: RegistryDraft) -> Vec<Effect> {
        self.mark_dirty();
        if self.add_registry_pending {
            return Vec::new();
        }
        if let Err(errors) = draft.validate() {
            self.add_registry_errors = errors.iter().map(ToString::to_string).collect();
            return Vec::new();
        }
        let Some(harvest_rate) = draft.parsed_harvest_rate() else {
            return Vec::new();
        };
        self.add_registry_errors.clear();
        self.add_registry_pending = true;
        vec![Effect::AddRegistry {
            url: draft.url.trim().to_string(),
            harvest_rate,
            harvest: draft.harvest,
        }]
    }

    pub(crate) fn finish_add_registry(&mut self, result: Result<(), String>) -> Vec<Effect> {
        self.add_registry_pending = false;
        self.mark_dirty();
        match result {
            Ok(()) => self.request_registries(),
            Err(text) => {
                self.add_registry_errors = vec![text];
                Vec::new()
            }
        }
    }

    // ---- edit forms ------------------------------------------------------

    pub(crate) fn open_editor(&mut self, kind: EditKind, registry_id: String) -> Vec<Effect> {
        let name = self
            .registries
            .iter()
            .find(|registry| registry.id == registry_id)
            .map(|registry| registry.name.clone())
            .unwrap_or_default();
        self.editor = Some(RegistryEditor {
            kind,
            registry_id: registry_id.clone(),
            name,
            form: DetailsContent::Loading,
            pending: false,
            errors: Vec::new(),
        });
        self.mark_dirty();
        vec![Effect::LoadEditForm { kind, registry_id }]
    }

    fn editor_mut(&mut self, kind: EditKind, registry_id: &str) -> Option<&mut RegistryEditor> {
        self.editor
            .as_mut()
            .filter(|editor| editor.kind == kind && editor.registry_id == registry_id)
    }

    pub(crate) fn apply_edit_form(
        &mut self,
        kind: EditKind,
        registry_id: &str,
        result: Result<String, String>,
    ) {
        let Some(editor) = self.editor_mut(kind, registry_id) else {
            console_debug!("Discarding {} form for registry {}", kind, registry_id);
            return;
        };
        editor.form = match result {
            Ok(html) => DetailsContent::Loaded(html),
            Err(text) => DetailsContent::Failed(text),
        };
        self.mark_dirty();
    }

    /// Returns the editor ready to take a submission, if one is open for this registry.
    fn editor_for_submit(&mut self, kind: EditKind, registry_id: &str) -> Option<&mut RegistryEditor> {
        let editor = self.editor_mut(kind, registry_id);
        if editor.is_none() {
            console_warn!("No {} form open for registry {}", kind, registry_id);
        }
        editor.filter(|editor| !editor.pending)
    }

    pub(crate) fn submit_registry_edit(&mut self, registry_id: String, edit: RegistryEdit) -> Vec<Effect> {
        let Some(editor) = self.editor_for_submit(EditKind::Registry, &registry_id) else {
            return Vec::new();
        };
        let effects = match edit.validate() {
            Ok(harvest_rate) => {
                editor.errors.clear();
                editor.pending = true;
                vec![Effect::EditRegistry {
                    registry_id,
                    harvest_rate,
                    harvest: edit.harvest,
                }]
            }
            Err(err) => {
                editor.errors = vec![err.to_string()];
                Vec::new()
            }
        };
        self.mark_dirty();
        effects
    }

    pub(crate) fn submit_harvest_selection(
        &mut self,
        registry_id: String,
        selection: HarvestSelection,
    ) -> Vec<Effect> {
        let Some(editor) = self.editor_for_submit(EditKind::Harvest, &registry_id) else {
            return Vec::new();
        };
        editor.errors.clear();
        editor.pending = true;
        self.mark_dirty();
        vec![Effect::EditHarvest {
            registry_id,
            selection,
        }]
    }

    pub(crate) fn finish_edit(
        &mut self,
        kind: EditKind,
        registry_id: &str,
        result: Result<(), String>,
    ) -> Vec<Effect> {
        let Some(editor) = self.editor_mut(kind, registry_id) else {
            return Vec::new();
        };
        editor.pending = false;
        match result {
            Ok(()) => {
                console_info!("Registry {}: {} edited", registry_id, kind);
                self.editor = None;
                self.request_registries()
            }
            Err(text) => {
                console_warn!("Failed to edit {} of registry {}: {}", kind, registry_id, text);
                editor.errors = vec![text];
                self.mark_dirty();
                Vec::new()
            }
        }
    }

    // ---- status refresh --------------------------------------------------

    pub(crate) fn refresh_tick(&mut self) -> Vec<Effect> {
        if self.refreshing {
            return Vec::new();
        }
        self.refresh_countdown = self.refresh_countdown.saturating_sub(1);
        if self.refresh_countdown > 0 {
            return Vec::new();
        }
        self.refreshing = true;
        self.harvest_poll_pending = true;
        self.update_poll_pending = true;
        self.mark_dirty();
        let origin = PollOrigin::Refresh;
        vec![
            Effect::PollUpdateStatus { origin },
            Effect::PollHarvestStatus { origin },
        ]
    }

    fn settle_refresh(&mut self) {
        if self.refreshing && !self.harvest_poll_pending && !self.update_poll_pending {
            self.refreshing = false;
            self.refresh_countdown = self.refresh_interval;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextField {
    Identifier,
    ResumptionToken,
    FromDate,
    UntilDate,
}
