use super::*;

macro_rules! test_enum_completeness {
    ($enum_type:ty, $test_name:ident) => {
        #[test]
        fn $test_name() {
            for variant in <$enum_type>::value_variants() {
                let possible_value = variant.to_possible_value();
                assert!(
                    possible_value.is_some(),
                    "PossibleValue should exist for all variants"
                );

                // Round-trip through the primary name
                let possible_val = possible_value.unwrap();
                let primary_name = possible_val.get_name();
                let parsed: Result<$enum_type, _> = primary_name.parse();
                assert_eq!(
                    parsed.unwrap(),
                    *variant,
                    "Round-trip should preserve variant"
                );
            }
        }
    };
}

macro_rules! test_fromstr_aliases {
    ($enum_type:ty, $test_name:ident, $expected_mappings:expr) => {
        #[test]
        fn $test_name() {
            let mappings: &[(&str, $enum_type)] = &$expected_mappings;

            for (input, expected) in mappings {
                let parsed: Result<$enum_type, _> = input.parse();
                assert!(
                    parsed.is_ok(),
                    "Failed to parse '{}' for {}",
                    input,
                    stringify!($enum_type)
                );
                assert_eq!(parsed.unwrap(), *expected);
            }
        }
    };
}

test_enum_completeness!(LogFormat, test_log_format_completeness);
test_enum_completeness!(LogOutput, test_log_output_completeness);
test_enum_completeness!(ColorIntent, test_color_intent_completeness);

test_fromstr_aliases!(
    LogFormat,
    test_log_format_aliases,
    [
        ("txt", LogFormat::Text),
        ("json", LogFormat::Json),
        ("full", LogFormat::Pretty),
    ]
);

test_fromstr_aliases!(
    ColorIntent,
    test_color_intent_aliases,
    [
        ("detect", ColorIntent::Auto),
        ("force", ColorIntent::Always),
        ("off", ColorIntent::Never),
    ]
);

#[test]
fn test_unknown_value_is_parse_error() {
    let err = "sparkly".parse::<LogFormat>().unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { ref value, .. } if value == "sparkly"));
}

#[test]
fn test_log_level_from_verbosity_boundary_conditions() {
    assert_eq!(LogLevel::from_verbosity(0), LogLevel::Error);
    assert_eq!(LogLevel::from_verbosity(2), LogLevel::Info);
    assert_eq!(LogLevel::from_verbosity(4), LogLevel::Trace);
    assert_eq!(LogLevel::from_verbosity(u8::MAX), LogLevel::Trace);
}

#[test]
fn test_log_level_directives() {
    assert_eq!(LogLevel::Warning.as_directive(), "warn");
    assert_eq!(LogLevel::Trace.as_directive(), "trace");
}

#[test]
fn test_color_intent_resolution() {
    assert!(ColorIntent::Auto.resolve(true));
    assert!(!ColorIntent::Auto.resolve(false));
    assert!(ColorIntent::Always.resolve(false));
    assert!(!ColorIntent::Never.resolve(true));
}

#[test]
fn test_missing_variable_display() {
    let error = ConfigError::MissingVariable { name: "MYSQL_DB" };
    assert_eq!(
        error.to_string(),
        "Required environment variable MYSQL_DB is not set"
    );
}
