use serde::ser::{Serialize, SerializeMap, Serializer};
use url::Url;

use crate::RequestForm;

/// OAI-PMH query arguments in the order they are assembled.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OaiParams {
    entries: Vec<(&'static str, String)>,
}

impl OaiParams {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, key: &'static str, value: impl Into<String>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> + '_ {
        self.entries.iter().map(|(key, value)| (*key, value.as_str()))
    }

    pub fn keys(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(key, _)| *key).collect()
    }

    /// JSON object sent as the `args_url` argument of the execution endpoint.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Serialize for OaiParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Target endpoint plus arguments for one OAI-PMH call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OaiRequest {
    pub base_url: String,
    pub params: OaiParams,
}

impl OaiRequest {
    /// The equivalent direct protocol URL, e.g. `http://host/oai?verb=Identify`.
    pub fn direct_url(&self) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(&self.base_url)?;
        if !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        Ok(url)
    }
}

/// Serializes only the fields the user actually set.
pub fn assemble_params(form: &RequestForm) -> OaiParams {
    let mut params = OaiParams::new();

    let optional = [
        ("set", &form.set),
        ("metadataPrefix", &form.metadata_prefix),
        ("identifier", &form.identifier),
        ("resumptionToken", &form.resumption_token),
        ("from", &form.from_date),
        ("until", &form.until_date),
    ];
    for (key, value) in optional {
        if let Some(value) = value.as_deref().filter(|value| !value.is_empty()) {
            params.insert(key, value);
        }
    }

    if let Some(verb) = form.verb {
        params.insert("verb", verb.as_str());
    }

    params
}

pub fn build_request(form: &RequestForm) -> OaiRequest {
    OaiRequest {
        base_url: form
            .data_provider
            .as_ref()
            .map(|provider| provider.base_url.clone())
            .unwrap_or_default(),
        params: assemble_params(form),
    }
}
