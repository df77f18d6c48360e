use std::fmt;

use thiserror::Error;

use crate::options::SelectOption;
use crate::form::UNSET_SELECT;

pub type RegistryId = String;

/// Result of the last availability check for a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Availability {
    #[default]
    Unknown,
    Checking,
    Available,
    Unavailable,
    CheckFailed,
}

/// Server-side operations that can be triggered from the registry list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegistryAction {
    Activate,
    Deactivate,
    Delete,
    Harvest,
    Update,
}

impl RegistryAction {
    /// Actions after which the registry list must be reloaded.
    pub fn reloads_list(self) -> bool {
        matches!(
            self,
            RegistryAction::Activate | RegistryAction::Deactivate | RegistryAction::Delete
        )
    }
}

impl fmt::Display for RegistryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RegistryAction::Activate => "activate",
            RegistryAction::Deactivate => "deactivate",
            RegistryAction::Delete => "delete",
            RegistryAction::Harvest => "harvest",
            RegistryAction::Update => "update",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRow {
    pub id: RegistryId,
    pub name: String,
    pub url: String,
    pub is_activated: bool,
    pub harvest: bool,
    pub harvest_rate: Option<u64>,
    pub last_update: Option<String>,
    pub is_harvesting: bool,
    pub is_updating: bool,
    pub availability: Availability,
}

impl RegistryRow {
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            is_activated: true,
            harvest: false,
            harvest_rate: None,
            last_update: None,
            is_harvesting: false,
            is_updating: false,
            availability: Availability::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestStatus {
    pub registry_id: RegistryId,
    pub is_harvesting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateStatus {
    pub registry_id: RegistryId,
    pub is_updating: bool,
    pub name: String,
    pub last_update: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryFormError {
    #[error("Please enter a URL.")]
    MissingUrl,
    #[error("Please enter a positive integer.")]
    InvalidHarvestRate,
}

/// Add-registry form as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryDraft {
    pub url: String,
    pub harvest_rate: String,
    pub harvest: bool,
}

impl RegistryDraft {
    /// Collects every problem with the draft rather than stopping at the first.
    pub fn validate(&self) -> Result<(), Vec<RegistryFormError>> {
        let mut errors = Vec::new();
        if self.url.trim().is_empty() {
            errors.push(RegistryFormError::MissingUrl);
        }
        if self.parsed_harvest_rate().is_none() {
            errors.push(RegistryFormError::InvalidHarvestRate);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    pub fn parsed_harvest_rate(&self) -> Option<u64> {
        parse_harvest_rate(&self.harvest_rate)
    }
}

/// Whole, strictly positive number of seconds; `"60.0"` is accepted as 60.
pub fn parse_harvest_rate(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(rate) = raw.parse::<u64>() {
        return (rate > 0).then_some(rate);
    }
    let rate = raw.parse::<f64>().ok()?;
    if rate.is_finite() && rate.fract() == 0.0 && rate > 0.0 && rate <= u64::MAX as f64 {
        Some(rate as u64)
    } else {
        None
    }
}

/// The two edit forms a registry row offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditKind {
    /// Harvest rate and the automatic-harvesting switch.
    Registry,
    /// Which metadata formats and sets get harvested.
    Harvest,
}

impl fmt::Display for EditKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EditKind::Registry => f.write_str("registry"),
            EditKind::Harvest => f.write_str("harvest configuration"),
        }
    }
}

/// Edit-registry form as typed by the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEdit {
    pub harvest_rate: String,
    pub harvest: bool,
}

impl RegistryEdit {
    /// Returns the harvest rate to send.
    pub fn validate(&self) -> Result<u64, RegistryFormError> {
        parse_harvest_rate(&self.harvest_rate).ok_or(RegistryFormError::InvalidHarvestRate)
    }
}

/// Metadata formats and sets to harvest, by their server-side ids.
/// Anything not listed stops being harvested.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HarvestSelection {
    pub metadata_formats: Vec<String>,
    pub sets: Vec<String>,
}

/// Data-provider select entries: the "Pick one" sentinel, then every activated registry.
pub fn provider_choices(registries: &[RegistryRow]) -> Vec<SelectOption> {
    let mut choices = vec![SelectOption::new(UNSET_SELECT, "Pick one")];
    choices.extend(
        registries
            .iter()
            .filter(|registry| registry.is_activated)
            .map(|registry| {
                SelectOption::new(
                    format!("{}|{}", registry.id, registry.url),
                    registry.name.clone(),
                )
            }),
    );
    choices
}
