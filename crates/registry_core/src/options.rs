use crate::form::UNSET_SELECT;

pub const PLACEHOLDER_LABEL: &str = "----------";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }

    pub fn placeholder() -> Self {
        Self::new(UNSET_SELECT, PLACEHOLDER_LABEL)
    }
}

/// A set advertised by a data provider: `key` is the display name, `value` the setSpec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetEntry {
    pub key: String,
    pub value: String,
}

/// A provider-dependent select box (sets or metadata prefixes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectControl {
    pub enabled: bool,
    pub options: Vec<SelectOption>,
}

impl Default for SelectControl {
    fn default() -> Self {
        Self::placeholder()
    }
}

impl SelectControl {
    /// Disabled control holding only the placeholder entry.
    pub fn placeholder() -> Self {
        Self {
            enabled: false,
            options: vec![SelectOption::placeholder()],
        }
    }

    /// Replaces the contents with the placeholder followed by `entries`, and enables it.
    pub fn populate(&mut self, entries: impl IntoIterator<Item = SelectOption>) {
        self.options.clear();
        self.options.push(SelectOption::placeholder());
        self.options.extend(entries);
        self.enabled = true;
    }

    pub fn reset(&mut self) {
        *self = Self::placeholder();
    }

    pub fn contains(&self, value: &str) -> bool {
        value != UNSET_SELECT && self.options.iter().any(|option| option.value == value)
    }
}

pub fn set_options(entries: &[SetEntry]) -> Vec<SelectOption> {
    entries
        .iter()
        .map(|entry| SelectOption::new(entry.value.clone(), entry.key.clone()))
        .collect()
}

pub fn metadata_prefix_options(prefixes: &[String]) -> Vec<SelectOption> {
    prefixes
        .iter()
        .map(|prefix| SelectOption::new(prefix.clone(), prefix.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn populate_twice_does_not_duplicate_entries() {
        let prefixes = vec!["oai_dc".to_string(), "marc21".to_string()];
        let mut control = SelectControl::placeholder();
        control.populate(metadata_prefix_options(&prefixes));
        let first = control.clone();
        control.populate(metadata_prefix_options(&prefixes));

        assert_eq!(control, first);
        assert_eq!(control.options.len(), 3);
        assert_eq!(control.options[0], SelectOption::placeholder());
        assert!(control.enabled);
    }

    #[test]
    fn set_options_use_spec_as_value() {
        let options = set_options(&[SetEntry {
            key: "Physics".to_string(),
            value: "phys".to_string(),
        }]);
        assert_eq!(options, vec![SelectOption::new("phys", "Physics")]);
    }

    #[test]
    fn placeholder_value_is_never_a_real_choice() {
        let control = SelectControl::placeholder();
        assert!(!control.enabled);
        assert!(!control.contains("0"));
    }
}
