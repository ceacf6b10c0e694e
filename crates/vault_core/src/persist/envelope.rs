//! Versioned slot envelope.
//!
//! Stored layout: `{"schema_version": N, "data": <value>}`. Values written
//! before the envelope existed are bare JSON and are read as version 0.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Envelope version written by this binary.
pub const CURRENT_SCHEMA_VERSION: u32 = 1;

const VERSION_FIELD: &str = "schema_version";
const DATA_FIELD: &str = "data";

#[derive(Serialize)]
struct EnvelopeRef<'a, T: Serialize + ?Sized> {
    schema_version: u32,
    data: &'a T,
}

#[derive(Clone, Copy)]
struct SlotMigration {
    from: u32,
    migrate: fn(Value) -> Value,
}

/// Steps from version N to N+1, in order.
const SLOT_MIGRATIONS: &[SlotMigration] = &[SlotMigration {
    from: 0,
    migrate: unversioned_to_v1,
}];

/// Successful decode result.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Stored at the current version.
    Current(T),
    /// Stored at an older version and migrated in memory.
    Migrated { from: u32, value: T },
}

impl<T> Decoded<T> {
    pub fn into_value(self) -> T {
        match self {
            Self::Current(value) | Self::Migrated { value, .. } => value,
        }
    }
}

#[derive(Debug)]
pub enum EnvelopeError {
    /// Raw text is not JSON.
    Malformed(serde_json::Error),
    /// Envelope written by a newer binary.
    UnsupportedVersion { found: u64, latest: u32 },
    /// JSON is well formed but does not match the expected shape.
    Data(serde_json::Error),
    /// No migration step registered for this version.
    MissingMigration(u32),
}

impl Display for EnvelopeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "slot value is not valid JSON: {err}"),
            Self::UnsupportedVersion { found, latest } => write!(
                f,
                "slot schema version {found} is newer than supported {latest}"
            ),
            Self::Data(err) => write!(f, "slot data has unexpected shape: {err}"),
            Self::MissingMigration(version) => {
                write!(f, "no slot migration registered from version {version}")
            }
        }
    }
}

impl Error for EnvelopeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Data(err) => Some(err),
            Self::UnsupportedVersion { .. } | Self::MissingMigration(_) => None,
        }
    }
}

impl EnvelopeError {
    /// Short machine-readable reason for log events.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::UnsupportedVersion { .. } => "unsupported_version",
            Self::Data(_) => "decode_failed",
            Self::MissingMigration(_) => "missing_migration",
        }
    }
}

/// Wraps `value` in a current-version envelope.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string(&EnvelopeRef {
        schema_version: CURRENT_SCHEMA_VERSION,
        data: value,
    })
}

/// Decodes a stored slot value, migrating older layouts.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<Decoded<T>, EnvelopeError> {
    let parsed: Value = serde_json::from_str(raw).map_err(EnvelopeError::Malformed)?;
    let (version, data) = split_envelope(parsed);

    if version > u64::from(CURRENT_SCHEMA_VERSION) {
        return Err(EnvelopeError::UnsupportedVersion {
            found: version,
            latest: CURRENT_SCHEMA_VERSION,
        });
    }
    // Bounded by CURRENT_SCHEMA_VERSION above.
    let version = version as u32;

    let migrated = migrate(version, data)?;
    let value = serde_json::from_value(migrated).map_err(EnvelopeError::Data)?;
    if version == CURRENT_SCHEMA_VERSION {
        Ok(Decoded::Current(value))
    } else {
        Ok(Decoded::Migrated {
            from: version,
            value,
        })
    }
}

fn split_envelope(parsed: Value) -> (u64, Value) {
    match parsed {
        Value::Object(mut map)
            if map.len() == 2
                && map.get(VERSION_FIELD).is_some_and(Value::is_u64)
                && map.contains_key(DATA_FIELD) =>
        {
            let version = map.get(VERSION_FIELD).and_then(Value::as_u64).unwrap_or(0);
            let data = map.remove(DATA_FIELD).unwrap_or(Value::Null);
            (version, data)
        }
        other => (0, other),
    }
}

fn migrate(from: u32, mut data: Value) -> Result<Value, EnvelopeError> {
    for version in from..CURRENT_SCHEMA_VERSION {
        let step = SLOT_MIGRATIONS
            .iter()
            .find(|step| step.from == version)
            .ok_or(EnvelopeError::MissingMigration(version))?;
        data = (step.migrate)(data);
    }
    Ok(data)
}

// Unversioned values already have the v1 data layout; only the wrapper is new.
fn unversioned_to_v1(data: Value) -> Value {
    data
}
