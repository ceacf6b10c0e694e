//! Slot-level load/save with defaults and write policy.
//!
//! # Responsibility
//! - Read the four vault slots, substituting defaults on any failure.
//! - Re-save all slots in one transaction after a mutation.
//!
//! # Invariants
//! - `load*` never surfaces an error to the caller.
//! - Under `WritePolicy::BestEffort`, save failures are logged and swallowed.
//! - A slot holding a newer envelope version is left untouched by `load`.

use super::envelope::{self, Decoded, EnvelopeError};
use crate::model::material::Material;
use crate::model::theme::ThemeConfig;
use crate::repo::slot_repo::{RepoError, SlotRepository};
use log::{debug, error, info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Slot keys used by the vault.
pub mod keys {
    pub const MATERIALS: &str = "mp-vault-materials";
    pub const CATEGORIES: &str = "mp-vault-categories";
    pub const DOMAINS: &str = "mp-vault-domains";
    pub const THEME: &str = "mp-vault-theme";

    pub const ALL: [&str; 4] = [MATERIALS, CATEGORIES, DOMAINS, THEME];
}

pub type StorageResult<T> = Result<T, StorageError>;

/// What happens when a slot write fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WritePolicy {
    /// Log and continue.
    #[default]
    BestEffort,
    /// Return the failure to the mutating caller.
    Strict,
}

impl FromStr for WritePolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "best_effort" | "best-effort" => Ok(Self::BestEffort),
            "strict" => Ok(Self::Strict),
            other => Err(format!(
                "unsupported write policy `{other}`; expected best_effort|strict"
            )),
        }
    }
}

#[derive(Debug)]
pub enum StorageError {
    Repo(RepoError),
    Encode {
        key: &'static str,
        source: serde_json::Error,
    },
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode { key, source } => write!(f, "failed to encode slot `{key}`: {source}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Encode { source, .. } => Some(source),
        }
    }
}

impl From<RepoError> for StorageError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Why a load fell back to the default value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultReason {
    Absent,
    Empty,
    ReadFailed,
    Malformed,
    UnsupportedVersion,
    DecodeFailed,
}

impl DefaultReason {
    fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Empty => "empty",
            Self::ReadFailed => "read_failed",
            Self::Malformed => "malformed",
            Self::UnsupportedVersion => "unsupported_version",
            Self::DecodeFailed => "decode_failed",
        }
    }
}

/// How a loaded value was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Stored,
    Migrated { from: u32 },
    Defaulted(DefaultReason),
}

/// Borrowed view of everything the vault persists.
#[derive(Debug, Clone, Copy)]
pub struct SlotSnapshot<'a> {
    pub materials: &'a [Material],
    pub categories: &'a [String],
    pub domains: &'a [String],
    pub theme: &'a ThemeConfig,
}

/// Persistence adapter: typed slot access over a `SlotRepository`.
pub struct VaultStorage<R: SlotRepository> {
    repo: R,
    policy: WritePolicy,
}

impl<R: SlotRepository> VaultStorage<R> {
    pub fn new(repo: R, policy: WritePolicy) -> Self {
        Self { repo, policy }
    }

    pub fn policy(&self) -> WritePolicy {
        self.policy
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Reads slot `key`, returning `default` when it cannot be used.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load_with_outcome(key, default).0
    }

    /// Same as `load`, also reporting where the value came from.
    pub fn load_with_outcome<T: DeserializeOwned>(
        &self,
        key: &str,
        default: T,
    ) -> (T, LoadOutcome) {
        let raw = match self.repo.get_slot(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return defaulted(key, default, DefaultReason::Absent, None),
            Err(err) => {
                let reason = DefaultReason::ReadFailed;
                return defaulted(key, default, reason, Some(&err as &dyn Error));
            }
        };
        if raw.trim().is_empty() {
            return defaulted(key, default, DefaultReason::Empty, None);
        }

        match envelope::decode::<T>(&raw) {
            Ok(Decoded::Current(value)) => {
                debug!("event=slot_load module=persist status=ok key={key}");
                (value, LoadOutcome::Stored)
            }
            Ok(Decoded::Migrated { from, value }) => {
                info!("event=slot_load module=persist status=ok key={key} migrated_from={from}");
                (value, LoadOutcome::Migrated { from })
            }
            Err(err) => {
                let reason = match err {
                    EnvelopeError::Malformed(_) => DefaultReason::Malformed,
                    EnvelopeError::UnsupportedVersion { .. } => DefaultReason::UnsupportedVersion,
                    EnvelopeError::Data(_) | EnvelopeError::MissingMigration(_) => {
                        DefaultReason::DecodeFailed
                    }
                };
                defaulted(key, default, reason, Some(&err as &dyn Error))
            }
        }
    }

    /// Writes one slot, honoring the write policy.
    pub fn save<T: Serialize + ?Sized>(&self, key: &'static str, value: &T) -> StorageResult<()> {
        let result = encode_slot(key, value).and_then(|raw| {
            self.repo
                .put_slot(key, &raw)
                .map_err(StorageError::from)
        });
        self.apply_policy("slot_save", 1, result)
    }

    /// Re-saves all four slots in one transaction, honoring the write policy.
    pub fn save_all(&self, snapshot: &SlotSnapshot<'_>) -> StorageResult<()> {
        let result = encode_snapshot(snapshot).and_then(|entries| {
            self.repo
                .put_slots(&entries)
                .map_err(StorageError::from)
        });
        self.apply_policy("slot_save_all", keys::ALL.len(), result)
    }

    fn apply_policy(
        &self,
        event: &str,
        slots: usize,
        result: StorageResult<()>,
    ) -> StorageResult<()> {
        match result {
            Ok(()) => {
                debug!("event={event} module=persist status=ok slots={slots}");
                Ok(())
            }
            Err(err) => match self.policy {
                WritePolicy::BestEffort => {
                    warn!(
                        "event={event} module=persist status=error policy=best_effort slots={slots} error={err}"
                    );
                    Ok(())
                }
                WritePolicy::Strict => {
                    error!(
                        "event={event} module=persist status=error policy=strict slots={slots} error={err}"
                    );
                    Err(err)
                }
            },
        }
    }
}

fn encode_slot<T: Serialize + ?Sized>(key: &'static str, value: &T) -> StorageResult<String> {
    envelope::encode(value).map_err(|source| StorageError::Encode { key, source })
}

fn encode_snapshot(snapshot: &SlotSnapshot<'_>) -> StorageResult<Vec<(&'static str, String)>> {
    Ok(vec![
        (keys::MATERIALS, encode_slot(keys::MATERIALS, snapshot.materials)?),
        (keys::CATEGORIES, encode_slot(keys::CATEGORIES, snapshot.categories)?),
        (keys::DOMAINS, encode_slot(keys::DOMAINS, snapshot.domains)?),
        (keys::THEME, encode_slot(keys::THEME, snapshot.theme)?),
    ])
}

fn defaulted<T>(
    key: &str,
    default: T,
    reason: DefaultReason,
    err: Option<&dyn Error>,
) -> (T, LoadOutcome) {
    match (reason, err) {
        (DefaultReason::Absent | DefaultReason::Empty, _) => debug!(
            "event=slot_load module=persist status=default key={key} reason={}",
            reason.as_str()
        ),
        (_, Some(err)) => warn!(
            "event=slot_load module=persist status=default key={key} reason={} error={err}",
            reason.as_str()
        ),
        (_, None) => warn!(
            "event=slot_load module=persist status=default key={key} reason={}",
            reason.as_str()
        ),
    }
    (default, LoadOutcome::Defaulted(reason))
}
