use registry_core::{validate, RawRequestForm, ValidationError};

fn form(provider: &str, verb: &str) -> RawRequestForm {
    RawRequestForm {
        data_provider: provider.to_string(),
        verb: verb.to_string(),
        ..RawRequestForm::default()
    }
}

const PROVIDER: &str = "5|http://example.org/oai";

#[test]
fn missing_provider_wins_over_everything() {
    for verb in ["0", "1", "2", "3", "4", "5", "6"] {
        let raw = RawRequestForm {
            metadata_prefix: "oai_dc".to_string(),
            identifier: "oai:example:1".to_string(),
            ..form("0", verb)
        };
        assert_eq!(
            validate(&raw.parse()),
            Err(ValidationError::MissingDataProvider)
        );
    }
}

#[test]
fn missing_verb_is_reported_second() {
    assert_eq!(
        validate(&form(PROVIDER, "0").parse()),
        Err(ValidationError::MissingVerb)
    );
    assert_eq!(
        ValidationError::MissingVerb.to_string(),
        "Please pick a verb."
    );
}

#[test]
fn get_record_requires_prefix_before_identifier() {
    let no_prefix = RawRequestForm {
        identifier: "oai:example:123".to_string(),
        ..form(PROVIDER, "2")
    };
    assert_eq!(
        validate(&no_prefix.parse()),
        Err(ValidationError::MissingMetadataPrefix)
    );

    for blank in ["", "   ", "\t\n"] {
        let blank_identifier = RawRequestForm {
            metadata_prefix: "oai_dc".to_string(),
            identifier: blank.to_string(),
            ..form(PROVIDER, "2")
        };
        let err = validate(&blank_identifier.parse()).unwrap_err();
        assert_eq!(err, ValidationError::MissingIdentifier);
        assert_eq!(err.to_string(), "Please provide an identifier.");
    }

    let complete = RawRequestForm {
        metadata_prefix: "oai_dc".to_string(),
        identifier: "oai:example:123".to_string(),
        ..form(PROVIDER, "2")
    };
    assert_eq!(validate(&complete.parse()), Ok(()));
}

#[test]
fn listing_verbs_accept_prefix_or_resumption_token() {
    for verb in ["3", "5"] {
        let bare = form(PROVIDER, verb);
        let err = validate(&bare.parse()).unwrap_err();
        assert_eq!(err.to_string(), "Please pick a metadata prefix.");

        let with_prefix = RawRequestForm {
            metadata_prefix: "oai_dc".to_string(),
            ..form(PROVIDER, verb)
        };
        assert_eq!(validate(&with_prefix.parse()), Ok(()));

        let with_token = RawRequestForm {
            resumption_token: "token-42".to_string(),
            ..form(PROVIDER, verb)
        };
        assert_eq!(validate(&with_token.parse()), Ok(()));
    }
}

#[test]
fn other_verbs_need_only_provider_and_verb() {
    for verb in ["1", "4", "6"] {
        assert_eq!(validate(&form(PROVIDER, verb).parse()), Ok(()));

        let noisy = RawRequestForm {
            set: "phys".to_string(),
            identifier: "   ".to_string(),
            from_date: "2020-01-01T00:00:00Z".to_string(),
            ..form(PROVIDER, verb)
        };
        assert_eq!(validate(&noisy.parse()), Ok(()));
    }
}

#[test]
fn unknown_verb_code_counts_as_unset() {
    assert_eq!(
        validate(&form(PROVIDER, "9").parse()),
        Err(ValidationError::MissingVerb)
    );
}
