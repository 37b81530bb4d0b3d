//! Snapshot persistence layer
//!
//! The engine keeps all state in memory and writes one full snapshot to a
//! single storage slot after every mutation. Reads at startup are
//! all-or-nothing: malformed stored data is discarded wholesale and the
//! engine starts from defaults.

use crate::models::{
    BankAccount, BudgetPlan, Challenge, Level, Notification, Profile, SipPlan, Theme, Transaction,
    VideoItem,
};
use crate::Result;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;

/// Full persisted state for one installation.
///
/// Every field carries a serde default so snapshots written by older
/// builds still hydrate; there is no version/migration field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub profile: Option<Profile>,
    #[serde(default)]
    pub budget_plan: Option<BudgetPlan>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub bank_accounts: Vec<BankAccount>,
    #[serde(default)]
    pub transactions: VecDeque<Transaction>,
    #[serde(default)]
    pub videos: Vec<VideoItem>,
    #[serde(default)]
    pub watched: BTreeMap<Uuid, bool>,
    #[serde(default)]
    pub rewards: i64,
    #[serde(default)]
    pub level: Level,
    #[serde(default)]
    pub challenges: Vec<Challenge>,
    #[serde(default)]
    pub notifications: VecDeque<Notification>,
    #[serde(default)]
    pub privacy_mode: bool,
    #[serde(default)]
    pub streak_days: u32,
    #[serde(default)]
    pub sip_plans: VecDeque<SipPlan>,
}

/// Trait for snapshot persistence
pub trait SnapshotStore: Send + Sync {
    /// Load the stored snapshot, or `None` when nothing usable is stored.
    fn load(&self) -> Result<Option<Snapshot>>;
    /// Replace the stored snapshot. Last writer wins.
    fn save(&self, snapshot: &Snapshot) -> Result<()>;
}

impl<S: SnapshotStore> SnapshotStore for std::sync::Arc<S> {
    fn load(&self) -> Result<Option<Snapshot>> {
        (**self).load()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        (**self).save(snapshot)
    }
}

/// In-memory snapshot store for tests and throwaway sessions
#[derive(Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stored snapshot, if any.
    pub fn stored(&self) -> Option<Snapshot> {
        self.slot.lock().expect("snapshot slot poisoned").clone()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        Ok(self.slot.lock().expect("snapshot slot poisoned").clone())
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        *self.slot.lock().expect("snapshot slot poisoned") = Some(snapshot.clone());
        Ok(())
    }
}

/// Envelope written to disk: snapshot plus an integrity hash over it.
#[derive(Serialize, Deserialize)]
struct PersistedState {
    hash: String,
    state: Snapshot,
}

/// File-backed snapshot store, one JSON document per installation
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SnapshotStore for JsonFileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        let raw = match fs::read(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let persisted: PersistedState = match serde_json::from_slice(&raw) {
            Ok(p) => p,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding malformed snapshot");
                return Ok(None);
            }
        };

        if persisted.hash != compute_snapshot_hash(&persisted.state) {
            warn!(path = %self.path.display(), "discarding snapshot with bad integrity hash");
            return Ok(None);
        }

        Ok(Some(persisted.state))
    }

    fn save(&self, snapshot: &Snapshot) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let persisted = PersistedState {
            hash: compute_snapshot_hash(snapshot),
            state: snapshot.clone(),
        };

        let file = fs::File::create(&self.path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), &persisted)?;
        Ok(())
    }
}

/// Compute SHA256 hash of a snapshot for integrity verification
/// Uses zero-copy streaming serialization into hasher
pub fn compute_snapshot_hash(snapshot: &Snapshot) -> String {
    let mut hasher = Sha256::new();

    // Stream JSON directly into hasher (no intermediate String)
    if serde_json::to_writer(&mut HashWriter(&mut hasher), snapshot).is_err() {
        return String::new();
    }

    hex::encode(hasher.finalize())
}

/// Adapter to allow writing into Sha256 via std::io::Write
struct HashWriter<'a, H: Digest>(&'a mut H);

impl<H: Digest> Write for HashWriter<'_, H> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.update(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

//
// ================= Shared JSON-record helpers =================
//
// The auth directory and the legacy ledger persist their own records in
// the same discard-on-malformed style as the snapshot slot.

pub(crate) fn read_json_record<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "discarding malformed record");
            Ok(None)
        }
    }
}

pub(crate) fn write_json_record<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::File::create(path)?;
    serde_json::to_writer(std::io::BufWriter::new(file), value)?;
    Ok(())
}

//
// ================= Tests =================
//
