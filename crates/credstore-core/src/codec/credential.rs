//! JSON codec for [`Credential`] values
//!
//! Two wire formats are understood:
//!
//! - **legacy**: no type tag. Login credentials are recognised by the
//!   literal `"user":` appearing in the text; everything else is a plain
//!   credential.
//!   ```json
//!   {"user":"alice","password":"p","authenticateSudo":true}
//!   {"identity":"key-id","credential":"secret"}
//!   ```
//! - **tagged**: the same objects with an explicit `"type"` field.
//!   ```json
//!   {"type":"login","user":"alice"}
//!   ```
//!
//! Decoding accepts both regardless of the configured output format.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::traits::{Codec, CodecError, CodecResult};
use crate::types::{Blob, Credential, LoginCredential, PlainCredential};

const LOGIN_PROBE: &str = "\"user\":";
const TYPE_FIELD: &str = "type";

/// Output format used by [`CredentialCodec::encode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireFormat {
    /// Untagged objects, byte-compatible with existing stores
    #[default]
    Legacy,
    /// Objects carrying a `"type"` discriminant
    Tagged,
}

impl WireFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            WireFormat::Legacy => "legacy",
            WireFormat::Tagged => "tagged",
        }
    }
}

impl FromStr for WireFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(WireFormat::Legacy),
            "tagged" => Ok(WireFormat::Tagged),
            other => Err(format!("unknown wire format '{}'", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JsonLoginCredential {
    user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    private_key: Option<String>,
    /// Only ever written as `true`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    authenticate_sudo: Option<bool>,
}

impl From<&LoginCredential> for JsonLoginCredential {
    fn from(login: &LoginCredential) -> Self {
        Self {
            user: login.user.clone(),
            password: login.password.clone(),
            private_key: login.private_key.clone(),
            authenticate_sudo: login.authenticate_sudo.then_some(true),
        }
    }
}

impl From<JsonLoginCredential> for LoginCredential {
    fn from(val: JsonLoginCredential) -> Self {
        LoginCredential {
            user: val.user,
            password: val.password,
            private_key: val.private_key,
            authenticate_sudo: val.authenticate_sudo == Some(true),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonPlainCredential {
    identity: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credential: Option<String>,
}

impl From<&PlainCredential> for JsonPlainCredential {
    fn from(plain: &PlainCredential) -> Self {
        Self {
            identity: plain.identity.clone(),
            credential: plain.credential.clone(),
        }
    }
}

impl From<JsonPlainCredential> for PlainCredential {
    fn from(val: JsonPlainCredential) -> Self {
        PlainCredential {
            identity: val.identity,
            credential: val.credential,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum TaggedCredential {
    Plain(JsonPlainCredential),
    Login(JsonLoginCredential),
}

/// Byte codec for [`Credential`] values
///
/// # Example
///
/// ```
/// use credstore_core::codec::{Codec, CredentialCodec};
/// use credstore_core::types::{Credential, LoginCredential};
///
/// let codec = CredentialCodec::new();
/// let login: Credential = LoginCredential::builder("alice").password("p").build().into();
/// let blob = codec.encode(&login).unwrap();
/// assert_eq!(blob.as_bytes(), Some(&br#"{"user":"alice","password":"p"}"#[..]));
/// assert_eq!(codec.decode(&blob).unwrap(), login);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialCodec {
    format: WireFormat,
}

impl CredentialCodec {
    /// Codec writing the legacy untagged format
    pub fn new() -> Self {
        Self::with_format(WireFormat::Legacy)
    }

    pub fn with_format(format: WireFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> WireFormat {
        self.format
    }

    fn to_json(&self, credential: &Credential) -> CodecResult<Vec<u8>> {
        let bytes = match (self.format, credential) {
            (WireFormat::Legacy, Credential::Login(login)) => {
                serde_json::to_vec(&JsonLoginCredential::from(login))?
            }
            (WireFormat::Legacy, Credential::Plain(plain)) => {
                serde_json::to_vec(&JsonPlainCredential::from(plain))?
            }
            (WireFormat::Tagged, Credential::Login(login)) => {
                serde_json::to_vec(&TaggedCredential::Login(login.into()))?
            }
            (WireFormat::Tagged, Credential::Plain(plain)) => {
                serde_json::to_vec(&TaggedCredential::Plain(plain.into()))?
            }
        };
        Ok(bytes)
    }
}

fn validate(credential: &Credential) -> CodecResult<()> {
    match credential {
        Credential::Login(login) if login.user.is_empty() => {
            Err(CodecError::invalid_argument("login credential requires a user"))
        }
        Credential::Plain(plain) if plain.identity.is_empty() => {
            Err(CodecError::invalid_argument("credential requires an identity"))
        }
        _ => Ok(()),
    }
}

/// Decode credential JSON text
///
/// An explicit `"type"` tag wins; without one the legacy `"user":` probe
/// picks between the login and plain shapes.
fn credential_from_json(text: &str) -> CodecResult<Credential> {
    let value: Value = serde_json::from_str(text)?;
    if value.get(TYPE_FIELD).is_some() {
        let tagged: TaggedCredential = serde_json::from_value(value)?;
        return Ok(match tagged {
            TaggedCredential::Plain(plain) => Credential::Plain(plain.into()),
            TaggedCredential::Login(login) => Credential::Login(login.into()),
        });
    }

    if text.contains(LOGIN_PROBE) {
        let val: JsonLoginCredential = serde_json::from_value(value)?;
        Ok(Credential::Login(val.into()))
    } else {
        let val: JsonPlainCredential = serde_json::from_value(value)?;
        Ok(Credential::Plain(val.into()))
    }
}

impl Codec<Blob, Credential> for CredentialCodec {
    fn encode(&self, value: &Credential) -> CodecResult<Blob> {
        validate(value)?;
        Ok(Blob::from_bytes(self.to_json(value)?))
    }

    fn decode(&self, raw: &Blob) -> CodecResult<Credential> {
        let bytes = raw.read()?;
        if bytes.is_empty() {
            return Err(CodecError::invalid_argument("empty credential data"));
        }
        let text = std::str::from_utf8(&bytes)?;
        credential_from_json(text)
    }
}
