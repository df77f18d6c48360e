use registry_core::{
    AppViewModel, Availability, RegistryEditorView, RegistryRow, RequestBuilderView,
    SelectControl, Verb,
};

/// Turns the view model into the lines printed after each state change.
pub fn render(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    render_builder(&view.builder, &mut lines);
    lines.push(String::new());
    render_registries(view, &mut lines);
    lines
}

fn render_builder(builder: &RequestBuilderView, lines: &mut Vec<String>) {
    let form = &builder.form;
    let provider = form
        .data_provider
        .as_ref()
        .map(|provider| {
            let encoded = provider.encode();
            builder
                .provider_choices
                .iter()
                .find(|choice| choice.value == encoded)
                .map(|choice| format!("{} ({})", choice.label, provider.base_url))
                .unwrap_or_else(|| provider.base_url.clone())
        })
        .unwrap_or_else(|| "Pick one".to_string());

    lines.push("== Request builder ==".to_string());
    lines.push(format!("Data provider:   {provider}"));
    lines.push(format!(
        "Verb:            {}",
        form.verb.map(Verb::label).unwrap_or("Pick one")
    ));
    lines.push(format!(
        "Set:             {}",
        select_line(form.set.as_deref(), &builder.set_control)
    ));
    lines.push(format!(
        "Metadata prefix: {}",
        select_line(form.metadata_prefix.as_deref(), &builder.metadata_prefix_control)
    ));
    lines.push(format!("Identifier:      {}", text(form.identifier.as_deref())));
    lines.push(format!(
        "Resumption token: {}",
        text(form.resumption_token.as_deref())
    ));
    lines.push(format!("From:            {}", text(form.from_date.as_deref())));
    lines.push(format!("Until:           {}", text(form.until_date.as_deref())));

    if let Some(url) = &builder.request_preview {
        lines.push(format!("Request URL:     {url}"));
    }
    if builder.waiting {
        lines.push("Please wait, the request is being executed...".to_string());
    }
    if let Some(error) = &builder.error_banner {
        lines.push(format!("Error: {error}"));
    }
    if let Some(message) = &builder.result_message {
        lines.push("-- Result --".to_string());
        lines.extend(message.lines().map(str::to_string));
    }
    if builder.download_visible {
        lines.push("XML available: type `download` to save it.".to_string());
    }
    if let Some(path) = &builder.saved_xml_path {
        lines.push(format!("Saved XML to {path}"));
    }
}

fn select_line(selected: Option<&str>, control: &SelectControl) -> String {
    if !control.enabled {
        return "(pick a data provider first)".to_string();
    }
    let choices = control
        .options
        .iter()
        .skip(1)
        .map(|option| {
            if option.value == option.label {
                option.value.clone()
            } else {
                format!("{} [{}]", option.value, option.label)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("{} | choices: {}", text(selected), choices)
}

fn text(value: Option<&str>) -> &str {
    value.unwrap_or("-")
}

fn render_registries(view: &AppViewModel, lines: &mut Vec<String>) {
    lines.push("== Registries ==".to_string());
    if view.registries_loading {
        lines.push("Loading registries...".to_string());
    }
    if let Some(error) = &view.registry_error {
        lines.push(format!("Error: {error}"));
    }
    if view.registries.is_empty() && !view.registries_loading {
        lines.push("No registries.".to_string());
    }
    lines.extend(view.registries.iter().map(registry_line));

    if let Some(details) = &view.registry_details {
        lines.push(format!("-- {} (#{}) --", details.name, details.registry_id));
        if details.loading {
            lines.push("Loading details...".to_string());
        }
        if let Some(content) = &details.content {
            lines.extend(content.lines().map(str::to_string));
        }
        if let Some(error) = &details.error {
            lines.push(format!("Error: {error}"));
        }
    }

    if let Some(editor) = &view.registry_editor {
        render_editor(editor, lines);
    }

    if view.add_registry.pending {
        lines.push("Adding registry...".to_string());
    }
    for error in &view.add_registry.errors {
        lines.push(format!("Add registry: {error}"));
    }

    if view.refresh.refreshing {
        lines.push("Refreshing harvest and update status...".to_string());
    }
}

fn render_editor(editor: &RegistryEditorView, lines: &mut Vec<String>) {
    lines.push(format!(
        "-- Edit {} of {} (#{}) --",
        editor.kind, editor.name, editor.registry_id
    ));
    if editor.loading {
        lines.push("Loading form...".to_string());
    }
    if let Some(form) = &editor.form {
        lines.extend(form.lines().map(str::to_string));
    }
    if editor.pending {
        lines.push("Saving...".to_string());
    }
    for error in &editor.errors {
        lines.push(format!("Edit: {error}"));
    }
}

fn registry_line(row: &RegistryRow) -> String {
    let mut flags = Vec::new();
    if !row.is_activated {
        flags.push("deactivated");
    }
    if row.is_harvesting {
        flags.push("harvesting");
    }
    if row.is_updating {
        flags.push("updating");
    }
    match row.availability {
        Availability::Unknown => {}
        Availability::Checking => flags.push("checking"),
        Availability::Available => flags.push("available"),
        Availability::Unavailable => flags.push("unavailable"),
        Availability::CheckFailed => flags.push("check failed"),
    }

    let mut line = format!("[{}] {} {}", row.id, row.name, row.url);
    if let Some(last_update) = &row.last_update {
        line.push_str(&format!(" | last update {last_update}"));
    }
    if !flags.is_empty() {
        line.push_str(&format!(" | {}", flags.join(", ")));
    }
    line
}
