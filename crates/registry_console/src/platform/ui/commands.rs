use registry_core::{
    AppViewModel, EditKind, HarvestSelection, RegistryAction, RegistryDraft, RegistryEdit,
    SelectOption, Verb, UNSET_SELECT,
};

pub const USAGE: &str = "\
Request builder:
  provider <registry id|0>   verb <code|name|0>   set <spec|0>   prefix <prefix|0>
  identifier [text]   token [text]   from [date]   until [date]
  submit   download
Registries:
  registries   view <id>   check <id>   check-all
  activate <id>   deactivate <id>   delete <id>
  harvest <id>   harvest-all   update <id>   update-all
  add <url> <harvest rate> [harvest]
  edit <id>   edit <id> <harvest rate> [harvest]
  edit-harvest <id>   edit-harvest <id> formats=<ids,..> sets=<ids,..>
Other:
  help   quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Dispatch(registry_core::Msg),
    Help,
    Quit,
    Unknown(String),
    Empty,
}

/// Parses one input line against the current view.
///
/// The provider select is keyed by `"<id>|<url>"`; operators type just the id.
pub fn parse(line: &str, view: &AppViewModel) -> Command {
    use registry_core::Msg;

    let line = line.trim();
    if line.is_empty() {
        return Command::Empty;
    }
    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };

    let msg = match name.to_ascii_lowercase().as_str() {
        "help" | "?" => return Command::Help,
        "quit" | "exit" => return Command::Quit,
        "provider" => Msg::ProviderChanged(provider_value(rest, &view.builder.provider_choices)),
        "verb" => Msg::VerbChanged(verb_code(rest)),
        "set" => Msg::SetChanged(select_or_unset(rest)),
        "prefix" => Msg::MetadataPrefixChanged(select_or_unset(rest)),
        "identifier" => Msg::IdentifierChanged(rest.to_string()),
        "token" => Msg::ResumptionTokenChanged(rest.to_string()),
        "from" => Msg::FromDateChanged(rest.to_string()),
        "until" => Msg::UntilDateChanged(rest.to_string()),
        "submit" => Msg::SubmitClicked,
        "download" => Msg::DownloadXmlClicked,
        "registries" => Msg::RegistriesRequested,
        "check-all" => Msg::CheckAllClicked,
        "harvest-all" => Msg::RegistryActionAllClicked(RegistryAction::Harvest),
        "update-all" => Msg::RegistryActionAllClicked(RegistryAction::Update),
        "activate" | "deactivate" | "delete" | "harvest" | "update" | "check" | "view" | "edit"
        | "edit-harvest"
            if rest.is_empty() =>
        {
            return Command::Unknown(format!("{name} needs a registry id"));
        }
        "activate" => action(RegistryAction::Activate, rest),
        "deactivate" => action(RegistryAction::Deactivate, rest),
        "delete" => action(RegistryAction::Delete, rest),
        "harvest" => action(RegistryAction::Harvest, rest),
        "update" => action(RegistryAction::Update, rest),
        "check" => Msg::CheckClicked(rest.to_string()),
        "view" => Msg::ViewRegistryClicked(rest.to_string()),
        "add" => Msg::AddRegistrySubmitted(registry_draft(rest)),
        "edit" => registry_edit(rest),
        "edit-harvest" => harvest_edit(rest),
        _ => return Command::Unknown(format!("unknown command: {name}")),
    };
    Command::Dispatch(msg)
}

fn action(action: RegistryAction, registry_id: &str) -> registry_core::Msg {
    registry_core::Msg::RegistryActionClicked {
        action,
        registry_id: registry_id.to_string(),
    }
}

fn select_or_unset(raw: &str) -> String {
    if raw.is_empty() {
        UNSET_SELECT.to_string()
    } else {
        raw.to_string()
    }
}

fn provider_value(raw: &str, choices: &[SelectOption]) -> String {
    if raw.is_empty() || raw == UNSET_SELECT {
        return UNSET_SELECT.to_string();
    }
    choices
        .iter()
        .find(|choice| {
            choice
                .value
                .split_once('|')
                .is_some_and(|(id, _)| id == raw)
        })
        .map(|choice| choice.value.clone())
        .unwrap_or_else(|| raw.to_string())
}

/// Accepts a select code, the protocol name or the label, case-insensitively.
fn verb_code(raw: &str) -> String {
    Verb::ALL
        .into_iter()
        .find(|verb| {
            raw == verb.code()
                || raw.eq_ignore_ascii_case(verb.as_str())
                || raw.eq_ignore_ascii_case(verb.label())
        })
        .map(|verb| verb.code().to_string())
        .unwrap_or_else(|| select_or_unset(raw))
}

fn registry_draft(rest: &str) -> RegistryDraft {
    let mut parts = rest.split_whitespace();
    let url = parts.next().unwrap_or_default().to_string();
    let harvest_rate = parts.next().unwrap_or_default().to_string();
    let harvest = parts.next().is_some_and(|flag| flag.eq_ignore_ascii_case("harvest"));
    RegistryDraft {
        url,
        harvest_rate,
        harvest,
    }
}

/// `edit <id>` opens the form; with a rate it submits the edit.
fn registry_edit(rest: &str) -> registry_core::Msg {
    let (registry_id, fields) = split_id(rest);
    if fields.is_empty() {
        return registry_core::Msg::EditClicked {
            kind: EditKind::Registry,
            registry_id,
        };
    }
    let mut parts = fields.split_whitespace();
    let harvest_rate = parts.next().unwrap_or_default().to_string();
    let harvest = parts.next().is_some_and(|flag| flag.eq_ignore_ascii_case("harvest"));
    registry_core::Msg::RegistryEditSubmitted {
        registry_id,
        edit: RegistryEdit {
            harvest_rate,
            harvest,
        },
    }
}

/// `formats=` and `sets=` take comma-separated ids; a missing key selects nothing.
fn harvest_edit(rest: &str) -> registry_core::Msg {
    let (registry_id, fields) = split_id(rest);
    if fields.is_empty() {
        return registry_core::Msg::EditClicked {
            kind: EditKind::Harvest,
            registry_id,
        };
    }
    let mut selection = HarvestSelection::default();
    for field in fields.split_whitespace() {
        if let Some(ids) = field.strip_prefix("formats=") {
            selection.metadata_formats = id_list(ids);
        } else if let Some(ids) = field.strip_prefix("sets=") {
            selection.sets = id_list(ids);
        }
    }
    registry_core::Msg::HarvestSelectionSubmitted {
        registry_id,
        selection,
    }
}

fn split_id(rest: &str) -> (String, &str) {
    match rest.split_once(char::is_whitespace) {
        Some((id, fields)) => (id.to_string(), fields.trim()),
        None => (rest.to_string(), ""),
    }
}

fn id_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use registry_core::{update, AppState, Msg, RegistryRow};

    fn view_with_registry() -> AppViewModel {
        let rows = vec![RegistryRow::new("7", "Repo", "http://repo.example/oai")];
        let (state, _) = update(AppState::new(), Msg::RegistriesLoaded(Ok(rows)));
        state.view()
    }

    #[test]
    fn provider_id_resolves_to_select_value() {
        let view = view_with_registry();
        assert_eq!(
            parse("provider 7", &view),
            Command::Dispatch(Msg::ProviderChanged("7|http://repo.example/oai".into()))
        );
        assert_eq!(
            parse("provider 0", &view),
            Command::Dispatch(Msg::ProviderChanged("0".into()))
        );
    }

    #[test]
    fn verb_accepts_name_or_code() {
        let view = AppState::new().view();
        assert_eq!(
            parse("verb ListRecords", &view),
            Command::Dispatch(Msg::VerbChanged("3".into()))
        );
        assert_eq!(
            parse("verb get record", &view),
            Command::Dispatch(Msg::VerbChanged("2".into()))
        );
        assert_eq!(
            parse("verb 6", &view),
            Command::Dispatch(Msg::VerbChanged("6".into()))
        );
    }

    #[test]
    fn text_fields_take_the_rest_of_the_line() {
        let view = AppState::new().view();
        assert_eq!(
            parse("identifier oai:repo:1", &view),
            Command::Dispatch(Msg::IdentifierChanged("oai:repo:1".into()))
        );
        assert_eq!(
            parse("from", &view),
            Command::Dispatch(Msg::FromDateChanged(String::new()))
        );
    }

    #[test]
    fn registry_commands_need_an_id() {
        let view = AppState::new().view();
        assert_eq!(
            parse("harvest 3", &view),
            Command::Dispatch(Msg::RegistryActionClicked {
                action: RegistryAction::Harvest,
                registry_id: "3".into(),
            })
        );
        assert!(matches!(parse("delete", &view), Command::Unknown(_)));
    }

    #[test]
    fn add_builds_a_draft() {
        let view = AppState::new().view();
        assert_eq!(
            parse("add http://repo.example/oai 60 harvest", &view),
            Command::Dispatch(Msg::AddRegistrySubmitted(RegistryDraft {
                url: "http://repo.example/oai".into(),
                harvest_rate: "60".into(),
                harvest: true,
            }))
        );
    }

    #[test]
    fn edit_opens_then_submits() {
        let view = AppState::new().view();
        assert_eq!(
            parse("edit 4", &view),
            Command::Dispatch(Msg::EditClicked {
                kind: EditKind::Registry,
                registry_id: "4".into(),
            })
        );
        assert_eq!(
            parse("edit 4 120 harvest", &view),
            Command::Dispatch(Msg::RegistryEditSubmitted {
                registry_id: "4".into(),
                edit: RegistryEdit {
                    harvest_rate: "120".into(),
                    harvest: true,
                },
            })
        );
        assert!(matches!(parse("edit", &view), Command::Unknown(_)));
    }

    #[test]
    fn edit_harvest_splits_id_lists() {
        let view = AppState::new().view();
        assert_eq!(
            parse("edit-harvest 4", &view),
            Command::Dispatch(Msg::EditClicked {
                kind: EditKind::Harvest,
                registry_id: "4".into(),
            })
        );
        assert_eq!(
            parse("edit-harvest 4 formats=11,12 sets=21", &view),
            Command::Dispatch(Msg::HarvestSelectionSubmitted {
                registry_id: "4".into(),
                selection: HarvestSelection {
                    metadata_formats: vec!["11".into(), "12".into()],
                    sets: vec!["21".into()],
                },
            })
        );
    }

    #[test]
    fn unknown_and_meta_commands() {
        let view = AppState::new().view();
        assert_eq!(parse("  ", &view), Command::Empty);
        assert_eq!(parse("help", &view), Command::Help);
        assert_eq!(parse("QUIT", &view), Command::Quit);
        assert!(matches!(parse("frobnicate", &view), Command::Unknown(_)));
    }
}
