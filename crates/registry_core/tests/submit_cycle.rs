use registry_core::{update, AppState, Effect, Msg, OaiRequest};

fn init_logging() {
    console_logging::initialize_for_tests();
}

/// Provider 5 with `oai_dc` offered and selected.
fn ready_state() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::ProviderChanged("5|http://example.org/oai".to_string()),
    );
    let generation = state.options_generation();
    let (state, _) = update(
        state,
        Msg::MetadataFormatsLoaded {
            generation,
            result: Ok(vec!["oai_dc".to_string()]),
        },
    );
    let (state, _) = update(state, Msg::MetadataPrefixChanged("oai_dc".to_string()));
    state
}

fn execute_effect(effects: &[Effect]) -> (u64, OaiRequest) {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::ExecuteRequest {
                request_id,
                request,
            } => Some((*request_id, request.clone())),
            _ => None,
        })
        .expect("execute effect")
}

#[test]
fn validation_failure_shows_banner_and_skips_network() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::SubmitClicked);

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(
        view.builder.error_banner.as_deref(),
        Some("Please pick a data provider.")
    );
    assert!(view.builder.submit_enabled);
    assert!(!view.builder.waiting);
}

#[test]
fn any_field_change_clears_the_error_banner() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::SubmitClicked);
    assert_eq!(
        state.view().builder.error_banner.as_deref(),
        Some("Please pick a verb.")
    );

    let (state, _) = update(state, Msg::FromDateChanged("2020-01-01T00:00:00Z".to_string()));
    assert_eq!(state.view().builder.error_banner, None);
}

#[test]
fn valid_submit_disables_button_until_completion() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::VerbChanged("2".to_string()));
    let (state, _) = update(
        state,
        Msg::IdentifierChanged("oai:example:123".to_string()),
    );
    let (state, effects) = update(state, Msg::SubmitClicked);

    let (request_id, request) = execute_effect(&effects);
    assert_eq!(request.base_url, "http://example.org/oai");
    assert_eq!(
        request.params.to_json(),
        r#"{"metadataPrefix":"oai_dc","identifier":"oai:example:123","verb":"GetRecord"}"#
    );
    let view = state.view();
    assert!(!view.builder.submit_enabled);
    assert!(view.builder.waiting);
    assert!(!view.builder.download_visible);

    let (state, effects) = update(state, Msg::SubmitClicked);
    assert!(effects.is_empty(), "overlapping submit must be ignored");

    let (state, _) = update(
        state,
        Msg::RequestFinished {
            request_id,
            result: Ok("<div>record</div>".to_string()),
        },
    );
    let view = state.view();
    assert!(view.builder.submit_enabled);
    assert!(!view.builder.waiting);
    assert_eq!(view.builder.result_message.as_deref(), Some("<div>record</div>"));
    assert!(view.builder.download_visible);
    assert_eq!(view.builder.error_banner, None);
}

#[test]
fn server_failure_shows_raw_text_and_reenables_submit() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::VerbChanged("1".to_string()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    let (request_id, _) = execute_effect(&effects);

    let (state, _) = update(
        state,
        Msg::RequestFinished {
            request_id,
            result: Err("&lt;urlopen error timed out&gt;".to_string()),
        },
    );

    let view = state.view();
    assert!(view.builder.submit_enabled);
    assert_eq!(
        view.builder.error_banner.as_deref(),
        Some("&lt;urlopen error timed out&gt;")
    );
    assert!(!view.builder.download_visible);
    assert_eq!(view.builder.result_message, None);
}

#[test]
fn unknown_completion_is_ignored() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::VerbChanged("1".to_string()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    let (request_id, _) = execute_effect(&effects);

    let (state, _) = update(
        state,
        Msg::RequestFinished {
            request_id: request_id + 10,
            result: Ok("late".to_string()),
        },
    );
    assert!(state.request_in_flight());
    assert_eq!(state.view().builder.result_message, None);
}

#[test]
fn resubmitting_clears_previous_result() {
    init_logging();
    let (state, _) = update(ready_state(), Msg::VerbChanged("4".to_string()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    let (first, _) = execute_effect(&effects);
    let (state, _) = update(
        state,
        Msg::RequestFinished {
            request_id: first,
            result: Ok("sets".to_string()),
        },
    );

    let (state, effects) = update(state, Msg::SubmitClicked);
    let (second, _) = execute_effect(&effects);
    assert_ne!(first, second);
    let view = state.view();
    assert_eq!(view.builder.result_message, None);
    assert!(!view.builder.download_visible);
}

#[test]
fn download_is_only_offered_after_success() {
    init_logging();
    let (state, effects) = update(ready_state(), Msg::DownloadXmlClicked);
    assert!(effects.is_empty());

    let (state, _) = update(state, Msg::VerbChanged("6".to_string()));
    let (state, effects) = update(state, Msg::SubmitClicked);
    let (request_id, _) = execute_effect(&effects);
    let (state, _) = update(
        state,
        Msg::RequestFinished {
            request_id,
            result: Ok("formats".to_string()),
        },
    );

    let (state, effects) = update(state, Msg::DownloadXmlClicked);
    assert_eq!(effects, vec![Effect::DownloadXml]);

    let (state, _) = update(
        state,
        Msg::XmlSaved(Ok("output/OAI_PMH_BUILD_REQ_x_.xml".to_string())),
    );
    assert_eq!(
        state.view().builder.saved_xml_path.as_deref(),
        Some("output/OAI_PMH_BUILD_REQ_x_.xml")
    );
}

#[test]
fn preview_url_appears_once_form_validates() {
    init_logging();
    let state = ready_state();
    assert_eq!(state.view().builder.request_preview, None);

    let (state, _) = update(state, Msg::VerbChanged("3".to_string()));
    assert_eq!(
        state.view().builder.request_preview.as_deref(),
        Some("http://example.org/oai?metadataPrefix=oai_dc&verb=ListRecords")
    );
}
