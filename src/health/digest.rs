//! Order-independent digest of an app's config vars.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::types::ConfigVars;

/// What the config-vars digest covers.
///
/// `Values` notices any edit. `Keys` only notices added or removed variables,
/// for deployments that do not want secret values to influence anything
/// persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DigestMode {
    #[default]
    Values,
    Keys,
}

impl FromStr for DigestMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "values" | "full" => Ok(Self::Values),
            "keys" => Ok(Self::Keys),
            other => Err(format!("'{}', expected: values, keys", other)),
        }
    }
}

impl fmt::Display for DigestMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Values => f.write_str("values"),
            Self::Keys => f.write_str("keys"),
        }
    }
}

/// `<mode>:<hex SHA-256>` over the canonical JSON of `vars`.
///
/// Canonical form is compact JSON with keys sorted, so equal mappings hash
/// equally whatever order the API returned them in.
pub fn config_digest(vars: &ConfigVars, mode: DigestMode) -> String {
    let canonical = match mode {
        DigestMode::Values => {
            let object: Map<String, Value> = vars
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            Value::Object(object)
        }
        DigestMode::Keys => Value::Array(vars.keys().cloned().map(Value::String).collect()),
    };

    format!(
        "{}:{}",
        mode,
        hex::encode(Sha256::digest(canonical.to_string().as_bytes()))
    )
}

/// Mode a stored digest was taken under, `None` for unprefixed digests.
pub fn digest_mode_of(digest: &str) -> Option<DigestMode> {
    let (prefix, _) = digest.split_once(':')?;
    prefix.parse().ok()
}
