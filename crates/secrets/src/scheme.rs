//! Secret reference schemes
//!
//! Identifiers are matched against an ordered list of rules and the first
//! match wins. Order matters: the key/value pattern also matches JSON and raw
//! identifiers containing an `@`, and the raw pattern also matches
//! `sm:aws:json:...`, so the JSON rule is checked first and the raw rule last.

use crate::Error;
use regex::{Captures, Regex};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// A recognised secret reference with its captured parts
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SecretReference {
    /// `sm:aws:json:<secret-name>`: the whole JSON document
    Json {
        /// Name or ARN of the secret
        secret_name: String,
    },
    /// `sm:aws:<key>@<secret-name>`: one top-level field of a JSON document
    KeyValue {
        /// Field to extract from the document
        key: String,
        /// Name or ARN of the secret
        secret_name: String,
    },
    /// `sm:aws:<secret-name>`: the raw string value
    Raw {
        /// Name or ARN of the secret
        secret_name: String,
    },
}

impl SecretReference {
    /// Name of the secret to fetch from the backend
    #[must_use]
    pub fn secret_name(&self) -> &str {
        match self {
            Self::Json { secret_name }
            | Self::KeyValue { secret_name, .. }
            | Self::Raw { secret_name } => secret_name,
        }
    }

    /// Short label for logs
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Json { .. } => "json",
            Self::KeyValue { .. } => "key-value",
            Self::Raw { .. } => "raw",
        }
    }
}

impl fmt::Display for SecretReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json { secret_name } => write!(f, "sm:aws:json:{secret_name}"),
            Self::KeyValue { key, secret_name } => write!(f, "sm:aws:{key}@{secret_name}"),
            Self::Raw { secret_name } => write!(f, "sm:aws:{secret_name}"),
        }
    }
}

impl FromStr for SecretReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        classify(s).ok_or_else(|| Error::InvalidSecretScheme {
            identifier: s.to_string(),
        })
    }
}

struct SchemeRule {
    pattern: Regex,
    extract: fn(&Captures<'_>) -> SecretReference,
}

impl SchemeRule {
    #[allow(clippy::expect_used)]
    fn new(pattern: &str, extract: fn(&Captures<'_>) -> SecretReference) -> Self {
        Self {
            pattern: Regex::new(pattern).expect("scheme patterns are valid regexes"),
            extract,
        }
    }
}

static RULES: LazyLock<[SchemeRule; 3]> = LazyLock::new(|| {
    [
        SchemeRule::new(r"^sm:aws:json:([^@]+)$", |caps| SecretReference::Json {
            secret_name: caps[1].to_string(),
        }),
        // Greedy key: the last '@' separates the key from the secret name.
        // Either side may be empty; the fetch then fails or the key is absent.
        SchemeRule::new(r"^sm:aws:(.*)@(.*)$", |caps| SecretReference::KeyValue {
            key: caps[1].to_string(),
            secret_name: caps[2].to_string(),
        }),
        SchemeRule::new(r"^sm:aws:([^@]+)$", |caps| SecretReference::Raw {
            secret_name: caps[1].to_string(),
        }),
    ]
});

/// Classify an identifier, returning `None` when no scheme matches.
///
/// A `None` result is not an error: such values are literals.
#[must_use]
pub fn classify(identifier: &str) -> Option<SecretReference> {
    RULES.iter().find_map(|rule| {
        rule.pattern
            .captures(identifier)
            .map(|caps| (rule.extract)(&caps))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> SecretReference {
        SecretReference::Raw {
            secret_name: name.to_string(),
        }
    }

    #[test]
    fn test_json_scheme() {
        assert_eq!(
            classify("sm:aws:json:MyApp/valid-pair"),
            Some(SecretReference::Json {
                secret_name: "MyApp/valid-pair".to_string()
            })
        );
    }

    #[test]
    fn test_key_value_scheme() {
        assert_eq!(
            classify("sm:aws:principal@MyApp/valid-pair"),
            Some(SecretReference::KeyValue {
                key: "principal".to_string(),
                secret_name: "MyApp/valid-pair".to_string()
            })
        );
    }

    #[test]
    fn test_raw_scheme() {
        assert_eq!(classify("sm:aws:/path/to/secret"), Some(raw("/path/to/secret")));
    }

    #[test]
    fn test_json_prefix_with_at_is_key_value() {
        assert_eq!(
            classify("sm:aws:json:user@db"),
            Some(SecretReference::KeyValue {
                key: "json:user".to_string(),
                secret_name: "db".to_string()
            })
        );
    }

    #[test]
    fn test_last_at_separates_secret_name() {
        assert_eq!(
            classify("sm:aws:a@b@c"),
            Some(SecretReference::KeyValue {
                key: "a@b".to_string(),
                secret_name: "c".to_string()
            })
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("not-real:scheme@invalid"), None);
        assert_eq!(classify("plain value"), None);
        assert_eq!(classify(""), None);
        assert_eq!(classify("sm:aws:"), None);
        assert_eq!(classify("sm:aws:json:"), Some(raw("json:")));
        assert_eq!(classify("sm:gcp:thing"), None);
        assert_eq!(classify(" sm:aws:thing"), None);
    }

    #[test]
    fn test_empty_key_or_name_is_still_key_value() {
        assert_eq!(
            classify("sm:aws:@secret"),
            Some(SecretReference::KeyValue {
                key: String::new(),
                secret_name: "secret".to_string()
            })
        );
        assert_eq!(
            classify("sm:aws:key@"),
            Some(SecretReference::KeyValue {
                key: "key".to_string(),
                secret_name: String::new()
            })
        );
        assert_eq!(
            classify("sm:aws:@"),
            Some(SecretReference::KeyValue {
                key: String::new(),
                secret_name: String::new()
            })
        );
    }

    #[test]
    fn test_display_round_trips_identifier() {
        for id in [
            "sm:aws:json:MyApp/doc",
            "sm:aws:user@MyApp/doc",
            "sm:aws:MyApp/token",
        ] {
            let parsed: SecretReference = id.parse().unwrap();
            assert_eq!(parsed.to_string(), id);
        }
    }

    #[test]
    fn test_from_str_rejects_unrecognized() {
        let err = "plain".parse::<SecretReference>().unwrap_err();
        assert!(matches!(err, Error::InvalidSecretScheme { identifier } if identifier == "plain"));
    }

    #[test]
    fn test_secret_name_and_kind() {
        let reference = classify("sm:aws:user@db").unwrap();
        assert_eq!(reference.secret_name(), "db");
        assert_eq!(reference.kind(), "key-value");
        assert_eq!(raw("x").kind(), "raw");
    }
}
