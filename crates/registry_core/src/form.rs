use crate::Verb;

/// Value of an unset select box.
pub const UNSET_SELECT: &str = "0";

/// A registered OAI-PMH endpoint picked in the request builder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataProvider {
    pub id: String,
    pub base_url: String,
}

impl DataProvider {
    pub fn new(id: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            base_url: base_url.into(),
        }
    }

    /// Decodes the combined `"<id>|<baseUrl>"` select value.
    ///
    /// Returns `None` for the `"0"` sentinel, for blank input and for values
    /// without a `|` separator.
    pub fn parse(raw: &str) -> Option<DataProvider> {
        let raw = select_value(raw)?;
        let (id, base_url) = raw.split_once('|')?;
        Some(DataProvider::new(id, base_url))
    }

    pub fn encode(&self) -> String {
        format!("{}|{}", self.id, self.base_url)
    }
}

/// Typed request-builder state. `None` always means "not set by the user".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestForm {
    pub data_provider: Option<DataProvider>,
    pub verb: Option<Verb>,
    pub set: Option<String>,
    pub metadata_prefix: Option<String>,
    pub identifier: Option<String>,
    pub resumption_token: Option<String>,
    pub from_date: Option<String>,
    pub until_date: Option<String>,
}

/// Request-builder fields exactly as an input surface holds them:
/// `"0"` for an untouched select box, `""` for an empty text input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRequestForm {
    pub data_provider: String,
    pub verb: String,
    pub set: String,
    pub metadata_prefix: String,
    pub identifier: String,
    pub resumption_token: String,
    pub from_date: String,
    pub until_date: String,
}

impl Default for RawRequestForm {
    fn default() -> Self {
        Self {
            data_provider: UNSET_SELECT.to_string(),
            verb: UNSET_SELECT.to_string(),
            set: UNSET_SELECT.to_string(),
            metadata_prefix: UNSET_SELECT.to_string(),
            identifier: String::new(),
            resumption_token: String::new(),
            from_date: String::new(),
            until_date: String::new(),
        }
    }
}

impl RawRequestForm {
    pub fn parse(&self) -> RequestForm {
        RequestForm {
            data_provider: DataProvider::parse(&self.data_provider),
            verb: Verb::from_code(&self.verb),
            set: select_value(&self.set),
            metadata_prefix: select_value(&self.metadata_prefix),
            identifier: text_value(&self.identifier),
            resumption_token: text_value(&self.resumption_token),
            from_date: text_value(&self.from_date),
            until_date: text_value(&self.until_date),
        }
    }
}

/// Select-box value: the `"0"` sentinel and empty strings are unset.
pub fn select_value(raw: &str) -> Option<String> {
    if raw.is_empty() || raw == UNSET_SELECT {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Free-text value: only the empty string is unset; whitespace is kept verbatim.
pub fn text_value(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_splits_on_first_separator() {
        let provider = DataProvider::parse("5|http://example.org/oai").unwrap();
        assert_eq!(provider.id, "5");
        assert_eq!(provider.base_url, "http://example.org/oai");
        assert_eq!(provider.encode(), "5|http://example.org/oai");
    }

    #[test]
    fn provider_sentinels_are_unset() {
        assert_eq!(DataProvider::parse("0"), None);
        assert_eq!(DataProvider::parse(""), None);
        assert_eq!(DataProvider::parse("no-separator"), None);
    }

    #[test]
    fn raw_form_defaults_parse_to_empty_form() {
        assert_eq!(RawRequestForm::default().parse(), RequestForm::default());
    }

    #[test]
    fn text_fields_keep_whitespace() {
        assert_eq!(text_value("  "), Some("  ".to_string()));
        assert_eq!(select_value("0"), None);
        assert_eq!(select_value("oai_dc"), Some("oai_dc".to_string()));
    }
}
