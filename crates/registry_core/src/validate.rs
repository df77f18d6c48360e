use thiserror::Error;

use crate::{RequestForm, Verb};

/// Reason a request-builder form cannot be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please pick a data provider.")]
    MissingDataProvider,
    #[error("Please pick a verb.")]
    MissingVerb,
    #[error("Please pick a metadata prefix.")]
    MissingMetadataPrefix,
    #[error("Please provide an identifier.")]
    MissingIdentifier,
}

/// Checks the form against the per-verb requirements. The first failing rule wins.
pub fn validate(form: &RequestForm) -> Result<(), ValidationError> {
    if form.data_provider.is_none() {
        return Err(ValidationError::MissingDataProvider);
    }
    let verb = form.verb.ok_or(ValidationError::MissingVerb)?;

    match verb {
        Verb::GetRecord => {
            if form.metadata_prefix.is_none() {
                return Err(ValidationError::MissingMetadataPrefix);
            }
            let has_identifier = form
                .identifier
                .as_deref()
                .is_some_and(|identifier| !identifier.trim().is_empty());
            if !has_identifier {
                return Err(ValidationError::MissingIdentifier);
            }
        }
        verb if verb.is_resumable_listing() => {
            if form.metadata_prefix.is_none() && form.resumption_token.is_none() {
                return Err(ValidationError::MissingMetadataPrefix);
            }
        }
        _ => {}
    }

    Ok(())
}
