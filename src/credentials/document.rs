use std::fmt;

use serde_json::Value;
use zeroize::Zeroizing;

pub const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Keys every uploaded key file must carry, in the order they are checked.
pub const REQUIRED_KEYS: [&str; 6] = [
    "type",
    "project_id",
    "private_key_id",
    "private_key",
    "client_email",
    "client_id",
];

/// Returns the first required key absent from `doc`.
///
/// Presence is all that is checked here; a non-object document has no keys
/// at all and so reports `type`.
pub fn first_missing_key(doc: &Value) -> Option<&'static str> {
    let obj = match doc.as_object() {
        Some(obj) => obj,
        None => return Some(REQUIRED_KEYS[0]),
    };
    REQUIRED_KEYS.iter().copied().find(|key| !obj.contains_key(*key))
}

/// Typed view of a service-account key file.
#[derive(Clone)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key_id: String,
    pub private_key: Zeroizing<String>,
    pub client_email: String,
    pub client_id: String,
    /// As written in the file; `None` when the file names no token endpoint.
    pub token_uri: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // private_key is never printed
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("client_id", &self.client_id)
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("field '{0}' must be a string")]
    NotAString(&'static str),

    #[error("unsupported credential type '{0}', expected 'service_account'")]
    UnsupportedType(String),
}

impl ServiceAccountKey {
    /// Builds typed credentials from a document that already passed
    /// [`first_missing_key`].
    pub fn from_document(doc: &Value) -> Result<Self, KeyError> {
        let kind = string_field(doc, "type")?;
        if kind != SERVICE_ACCOUNT_TYPE {
            return Err(KeyError::UnsupportedType(kind.to_string()));
        }

        let token_uri = match doc.get("token_uri") {
            None | Some(Value::Null) => None,
            Some(_) => Some(string_field(doc, "token_uri")?.to_string()),
        };

        Ok(Self {
            project_id: string_field(doc, "project_id")?.to_string(),
            private_key_id: string_field(doc, "private_key_id")?.to_string(),
            private_key: Zeroizing::new(string_field(doc, "private_key")?.to_string()),
            client_email: string_field(doc, "client_email")?.to_string(),
            client_id: string_field(doc, "client_id")?.to_string(),
            token_uri,
        })
    }
}

fn string_field<'a>(doc: &'a Value, key: &'static str) -> Result<&'a str, KeyError> {
    doc.get(key)
        .and_then(Value::as_str)
        .ok_or(KeyError::NotAString(key))
}
