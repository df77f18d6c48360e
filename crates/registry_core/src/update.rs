use crate::state::TextField;
use crate::{AppState, DataProvider, Effect, Msg, Verb};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ProviderChanged(raw) => state.select_provider(DataProvider::parse(&raw)),
        Msg::VerbChanged(code) => {
            state.select_verb(Verb::from_code(&code));
            Vec::new()
        }
        Msg::SetChanged(raw) => {
            state.select_set(&raw);
            Vec::new()
        }
        Msg::MetadataPrefixChanged(raw) => {
            state.select_metadata_prefix(&raw);
            Vec::new()
        }
        Msg::IdentifierChanged(raw) => edit(&mut state, TextField::Identifier, &raw),
        Msg::ResumptionTokenChanged(raw) => edit(&mut state, TextField::ResumptionToken, &raw),
        Msg::FromDateChanged(raw) => edit(&mut state, TextField::FromDate, &raw),
        Msg::UntilDateChanged(raw) => edit(&mut state, TextField::UntilDate, &raw),
        Msg::SetsLoaded { generation, result } => {
            state.apply_sets(generation, result);
            Vec::new()
        }
        Msg::MetadataFormatsLoaded { generation, result } => {
            state.apply_metadata_formats(generation, result);
            Vec::new()
        }
        Msg::SubmitClicked => state.submit(),
        Msg::RequestFinished { request_id, result } => {
            state.finish_request(request_id, result);
            Vec::new()
        }
        Msg::DownloadXmlClicked => state.request_download(),
        Msg::XmlSaved(result) => {
            state.apply_xml_saved(result);
            Vec::new()
        }
        Msg::RegistriesRequested => state.request_registries(),
        Msg::RegistriesLoaded(result) => state.apply_registries(result),
        Msg::RegistryActionClicked {
            action,
            registry_id,
        } => state.start_registry_action(action, registry_id),
        Msg::RegistryActionAllClicked(action) => state.start_registry_action_all(action),
        Msg::RegistryActionFinished {
            action,
            registry_id,
            result,
        } => state.finish_registry_action(action, &registry_id, result),
        Msg::CheckClicked(registry_id) => state.start_check(&registry_id),
        Msg::CheckAllClicked => state.start_check_all(),
        Msg::AvailabilityChecked {
            registry_id,
            result,
        } => {
            state.apply_availability(&registry_id, result);
            Vec::new()
        }
        Msg::HarvestStatusReceived { origin, result } => {
            state.apply_harvest_status(origin, result);
            Vec::new()
        }
        Msg::UpdateStatusReceived { origin, result } => {
            state.apply_update_status(origin, result);
            Vec::new()
        }
        Msg::ViewRegistryClicked(registry_id) => state.open_details(registry_id),
        Msg::RegistryDetailsLoaded {
            registry_id,
            result,
        } => {
            state.apply_details(&registry_id, result);
            Vec::new()
        }
        Msg::AddRegistrySubmitted(draft) => state.submit_registry(draft),
        Msg::RegistryAdded(result) => state.finish_add_registry(result),
        Msg::EditClicked { kind, registry_id } => state.open_editor(kind, registry_id),
        Msg::EditFormLoaded {
            kind,
            registry_id,
            result,
        } => {
            state.apply_edit_form(kind, &registry_id, result);
            Vec::new()
        }
        Msg::RegistryEditSubmitted { registry_id, edit } => {
            state.submit_registry_edit(registry_id, edit)
        }
        Msg::HarvestSelectionSubmitted {
            registry_id,
            selection,
        } => state.submit_harvest_selection(registry_id, selection),
        Msg::RegistryEdited {
            kind,
            registry_id,
            result,
        } => state.finish_edit(kind, &registry_id, result),
        Msg::RefreshTick => state.refresh_tick(),
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn edit(state: &mut AppState, field: TextField, raw: &str) -> Vec<Effect> {
    state.edit_text(field, raw);
    Vec::new()
}
