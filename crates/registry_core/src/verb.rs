use std::fmt;

/// The six OAI-PMH protocol verbs offered by the request builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Identify,
    GetRecord,
    ListRecords,
    ListSets,
    ListIdentifiers,
    ListMetadataFormats,
}

impl Verb {
    /// All verbs in select-box order.
    pub const ALL: [Verb; 6] = [
        Verb::Identify,
        Verb::GetRecord,
        Verb::ListRecords,
        Verb::ListSets,
        Verb::ListIdentifiers,
        Verb::ListMetadataFormats,
    ];

    /// Decodes a select-box code. `"0"` and unknown codes mean "no verb picked".
    pub fn from_code(code: &str) -> Option<Verb> {
        match code.trim() {
            "1" => Some(Verb::Identify),
            "2" => Some(Verb::GetRecord),
            "3" => Some(Verb::ListRecords),
            "4" => Some(Verb::ListSets),
            "5" => Some(Verb::ListIdentifiers),
            "6" => Some(Verb::ListMetadataFormats),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Verb::Identify => "1",
            Verb::GetRecord => "2",
            Verb::ListRecords => "3",
            Verb::ListSets => "4",
            Verb::ListIdentifiers => "5",
            Verb::ListMetadataFormats => "6",
        }
    }

    /// Canonical protocol name sent as the `verb` argument.
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Identify => "Identify",
            Verb::GetRecord => "GetRecord",
            Verb::ListRecords => "ListRecords",
            Verb::ListSets => "ListSets",
            Verb::ListIdentifiers => "ListIdentifiers",
            Verb::ListMetadataFormats => "ListMetadataFormats",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Verb::Identify => "Identify",
            Verb::GetRecord => "Get Record",
            Verb::ListRecords => "List Records",
            Verb::ListSets => "List Sets",
            Verb::ListIdentifiers => "List Identifiers",
            Verb::ListMetadataFormats => "List Metadata Formats",
        }
    }

    /// List-style verbs that accept a resumption token in place of a prefix.
    pub fn is_resumable_listing(self) -> bool {
        matches!(self, Verb::ListRecords | Verb::ListIdentifiers)
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
