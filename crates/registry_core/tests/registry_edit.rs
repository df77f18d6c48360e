use registry_core::{
    update, AppState, EditKind, Effect, HarvestSelection, Msg, RegistryEdit, RegistryRow,
};

fn init_logging() {
    console_logging::initialize_for_tests();
}

fn loaded() -> AppState {
    let rows = vec![RegistryRow::new("4", "Delta", "http://delta.example.org/oai")];
    let (state, _) = update(AppState::new(), Msg::RegistriesLoaded(Ok(rows)));
    state
}

fn open(state: AppState, kind: EditKind) -> AppState {
    let (state, effects) = update(
        state,
        Msg::EditClicked {
            kind,
            registry_id: "4".to_string(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::LoadEditForm {
            kind,
            registry_id: "4".to_string(),
        }]
    );
    state
}

fn edit(rate: &str, harvest: bool) -> Msg {
    Msg::RegistryEditSubmitted {
        registry_id: "4".to_string(),
        edit: RegistryEdit {
            harvest_rate: rate.to_string(),
            harvest,
        },
    }
}

#[test]
fn edit_form_loads_into_the_editor() {
    init_logging();
    let state = open(loaded(), EditKind::Registry);
    let editor = state.view().registry_editor.expect("editor");
    assert!(editor.loading);
    assert_eq!(editor.name, "Delta");

    let (state, _) = update(
        state,
        Msg::EditFormLoaded {
            kind: EditKind::Registry,
            registry_id: "4".to_string(),
            result: Ok("<form>rate</form>".to_string()),
        },
    );
    let editor = state.view().registry_editor.expect("editor");
    assert!(!editor.loading);
    assert_eq!(editor.form.as_deref(), Some("<form>rate</form>"));
}

#[test]
fn form_for_another_editor_is_discarded() {
    init_logging();
    let state = open(loaded(), EditKind::Harvest);
    let (state, _) = update(
        state,
        Msg::EditFormLoaded {
            kind: EditKind::Registry,
            registry_id: "4".to_string(),
            result: Ok("<form/>".to_string()),
        },
    );
    assert!(state.view().registry_editor.expect("editor").loading);
}

#[test]
fn invalid_harvest_rate_blocks_the_post() {
    init_logging();
    let state = open(loaded(), EditKind::Registry);
    let (state, effects) = update(state, edit("-3", true));
    assert!(effects.is_empty());
    assert_eq!(
        state.view().registry_editor.expect("editor").errors,
        vec!["Please enter a positive integer.".to_string()]
    );

    let (state, effects) = update(state, edit("120", false));
    assert_eq!(
        effects,
        vec![Effect::EditRegistry {
            registry_id: "4".to_string(),
            harvest_rate: 120,
            harvest: false,
        }]
    );
    let editor = state.view().registry_editor.expect("editor");
    assert!(editor.pending);
    assert!(editor.errors.is_empty());
}

#[test]
fn submit_without_open_form_is_ignored() {
    init_logging();
    let (state, effects) = update(loaded(), edit("60", true));
    assert!(effects.is_empty());
    assert!(state.view().registry_editor.is_none());
}

#[test]
fn successful_edit_closes_editor_and_reloads() {
    init_logging();
    let state = open(loaded(), EditKind::Registry);
    let (state, _) = update(state, edit("60", true));
    let (state, effects) = update(
        state,
        Msg::RegistryEdited {
            kind: EditKind::Registry,
            registry_id: "4".to_string(),
            result: Ok(()),
        },
    );
    assert_eq!(effects, vec![Effect::LoadRegistries]);
    assert!(state.view().registry_editor.is_none());
}

#[test]
fn harvest_selection_is_posted_and_errors_shown() {
    init_logging();
    let state = open(loaded(), EditKind::Harvest);
    let selection = HarvestSelection {
        metadata_formats: vec!["11".to_string()],
        sets: vec!["21".to_string(), "22".to_string()],
    };
    let (state, effects) = update(
        state,
        Msg::HarvestSelectionSubmitted {
            registry_id: "4".to_string(),
            selection: selection.clone(),
        },
    );
    assert_eq!(
        effects,
        vec![Effect::EditHarvest {
            registry_id: "4".to_string(),
            selection,
        }]
    );

    let (state, effects) = update(
        state,
        Msg::RegistryEdited {
            kind: EditKind::Harvest,
            registry_id: "4".to_string(),
            result: Err("Select a valid choice.".to_string()),
        },
    );
    assert!(effects.is_empty());
    let editor = state.view().registry_editor.expect("editor");
    assert!(!editor.pending);
    assert_eq!(editor.errors, vec!["Select a valid choice.".to_string()]);
}
