//! Per-instance state containers.
//!
//! A container is bound to exactly one composed schema; many containers of
//! the same node kind share that schema object, never their values. Values
//! live in a slot vector indexed by the schema's declaration order.

mod snapshot;


use crate::{
    error::{Error, UsageError},
    serial::SerialAllocator,
    serialize::{self, SerializeError},
};
use paramdb_schema::Registry;
use paramdb_types::{ChangeMask, SetterPolicy, Value};
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;

// re-exports
pub use snapshot::{SNAPSHOT_VERSION, Snapshot, SnapshotEntry};

///
/// SnapshotError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum SnapshotError {
    #[error("no backup to restore")]
    NoBackup,

    #[error(transparent)]
    Serialize(#[from] SerializeError),

    #[error("unsupported snapshot version {version}")]
    UnsupportedVersion { version: u8 },
}

///
/// ParamSet
///
/// The per-instance value store bound to a composed schema. Reads and writes
/// are name-keyed and fail on names outside the bound schema. Every
/// successful write stamps the full change mask on both the container and the
/// schema-level definition.
///

#[derive(Debug)]
pub struct ParamSet {
    kind: String,
    schema: Arc<Registry>,
    slots: Vec<Option<Value>>,
    assigned: ChangeMask,
    backups: Vec<Vec<u8>>,
    serial: u64,
    read_only: bool,
}

impl ParamSet {
    /// Bind a new container to a composed schema, defaulting every slot.
    #[must_use]
    pub fn new(kind: impl Into<String>, schema: Arc<Registry>, serial: u64) -> Self {
        let slots = schema.iter().map(|d| d.default.clone()).collect();

        Self {
            kind: kind.into(),
            schema,
            slots,
            assigned: ChangeMask::empty(),
            backups: Vec::new(),
            serial,
            read_only: false,
        }
    }

    /// Deep copy with a freshly allocated serial number. Serials identify
    /// distinct logical instances, not value equality.
    #[must_use]
    pub fn duplicate(&self, serials: &SerialAllocator) -> Self {
        Self {
            kind: self.kind.clone(),
            schema: self.schema.clone(),
            slots: self.slots.clone(),
            assigned: self.assigned,
            backups: self.backups.clone(),
            serial: serials.allocate(),
            read_only: self.read_only,
        }
    }

    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[must_use]
    pub const fn schema(&self) -> &Arc<Registry> {
        &self.schema
    }

    #[must_use]
    pub const fn serial(&self) -> u64 {
        self.serial
    }

    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Aggregate change state of this container.
    #[must_use]
    pub const fn assigned(&self) -> ChangeMask {
        self.assigned
    }

    /// Switch to read-only. Irreversible; every later mutation fails.
    pub const fn make_read_only(&mut self) {
        self.read_only = true;
    }

    // ---- access --------------------------------------------------------

    /// Read a value. Falls back to the declared default (slots are defaulted
    /// at construction); fails when the name is outside the schema or the
    /// slot holds no value and never had a default.
    pub fn get(&self, name: &str) -> Result<&Value, UsageError> {
        let pos = self.position(name)?;

        self.slots[pos].as_ref().ok_or_else(|| UsageError::NoValue {
            name: name.to_string(),
        })
    }

    /// Write a value through the definition's setter policy.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<(), UsageError> {
        self.check_writable()?;
        let pos = self.position(name)?;
        let policy = self
            .schema
            .def_at(pos)
            .map(|d| d.setter().clone())
            .unwrap_or_default();

        match policy {
            SetterPolicy::Unrestricted => self.store(pos, value.into()),
            SetterPolicy::Frozen => {
                return Err(UsageError::RestrictedWrite {
                    name: name.to_string(),
                });
            }
            SetterPolicy::Custom(hook) => {
                let writes = hook(value.into()).map_err(|source| UsageError::Setter {
                    name: name.to_string(),
                    source,
                })?;

                // Resolve every target before storing anything; a bad target
                // name must not leave earlier fan-out writes behind.
                let mut resolved = Vec::with_capacity(writes.len());
                for (target, derived) in writes {
                    resolved.push((self.position(&target)?, derived));
                }

                // Fan-out writes land raw; re-running hooks here could loop.
                for (target_pos, derived) in resolved {
                    self.store(target_pos, derived);
                }
            }
        }

        Ok(())
    }

    /// Clear a value. Stamps change bits like any write.
    pub fn remove(&mut self, name: &str) -> Result<Option<Value>, UsageError> {
        self.check_writable()?;
        let pos = self.position(name)?;

        let old = self.slots[pos].take();
        self.stamp(pos);

        Ok(old)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.schema
            .position(name)
            .is_some_and(|pos| self.slots[pos].is_some())
    }

    /// Names of assigned (or defaulted) parameters, in schema order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.schema
            .iter()
            .zip(&self.slots)
            .filter(|(_, slot)| slot.is_some())
            .map(|(def, _)| def.name())
    }

    /// `(name, value)` pairs for assigned parameters, in schema order.
    pub fn items(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .iter()
            .zip(&self.slots)
            .filter_map(|(def, slot)| slot.as_ref().map(|v| (def.name(), v)))
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    // ---- change tracking -----------------------------------------------

    /// Values changed under `mask`: container-level and definition-level
    /// bits must both intersect it. `None` when this container was never
    /// touched under `mask` (fast path; distinct from an empty map).
    #[must_use]
    pub fn changed_since(&self, mask: ChangeMask) -> Option<BTreeMap<String, Value>> {
        if !self.assigned.touches(mask) {
            return None;
        }

        let fields = self
            .schema
            .iter()
            .zip(&self.slots)
            .filter(|(def, slot)| def.assigned().touches(mask) && slot.is_some())
            .filter_map(|(def, slot)| slot.clone().map(|v| (def.name().to_string(), v)))
            .collect();

        Some(fields)
    }

    /// Clear change bits on the container and on every definition of its
    /// schema, once the bit-owning event has completed.
    pub fn clear_changed(&mut self, mask: ChangeMask) {
        self.assigned.remove(mask);
        for def in self.schema.iter() {
            def.clear_assigned(mask);
        }
    }

    // ---- backup / restore ----------------------------------------------

    /// Number of stacked backups.
    #[must_use]
    pub fn backup_depth(&self) -> usize {
        self.backups.len()
    }

    /// Serialize the persisted value-set and push it onto the backup stack.
    /// Clears the container's since-backup bit. Fails on a read-only
    /// container like any other mutation.
    pub fn back_up(&mut self) -> Result<(), Error> {
        self.check_writable()?;

        let entries = self
            .schema
            .iter()
            .zip(&self.slots)
            .filter(|(def, slot)| def.persist && slot.is_some())
            .filter_map(|(def, slot)| {
                slot.clone().map(|value| SnapshotEntry {
                    name: def.name().to_string(),
                    value,
                })
            })
            .collect();

        let blob = serialize::serialize(&Snapshot::new(entries)).map_err(SnapshotError::from)?;
        self.backups.push(blob);
        self.assigned.remove(ChangeMask::BACKUP);

        Ok(())
    }

    /// Pop the most recent backup and restore every persisted value from it.
    ///
    /// Names in `preserve` keep their current value when it differs from the
    /// restored one; such a preserved override is re-stamped dirty so later
    /// "what changed" queries see it.
    pub fn restore_backup(&mut self, preserve: &[&str]) -> Result<(), Error> {
        self.check_writable()?;
        for name in preserve {
            self.position(name)?;
        }

        // Decode and version-check against the top of the stack; only a
        // restorable snapshot is popped. A corrupt blob stays put.
        let blob = self.backups.last().ok_or(SnapshotError::NoBackup)?;
        let snapshot: Snapshot = serialize::deserialize(blob).map_err(SnapshotError::from)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                version: snapshot.version,
            }
            .into());
        }
        self.backups.pop();

        let schema = Arc::clone(&self.schema);
        for (pos, def) in schema.iter().enumerate() {
            if !def.persist {
                continue;
            }

            let restored = snapshot.value_of(def.name()).cloned();

            if preserve.contains(&def.name()) && self.slots[pos] != restored {
                // Keep the current value; it is newly dirty relative to the
                // restored state.
                self.stamp(pos);
                continue;
            }

            self.slots[pos] = restored;
        }

        Ok(())
    }

    // ---- internals -----------------------------------------------------

    /// Raw write used by the sync engine: bypasses setter policy, keeps
    /// stamping. Remote values were already produced by a policy-checked
    /// write on the originating process.
    pub(crate) fn store_raw(&mut self, name: &str, value: Value) -> Result<(), UsageError> {
        self.check_writable()?;
        let pos = self.position(name)?;
        self.store(pos, value);

        Ok(())
    }

    fn position(&self, name: &str) -> Result<usize, UsageError> {
        self.schema
            .position(name)
            .ok_or_else(|| UsageError::UnknownParam {
                kind: self.kind.clone(),
                name: name.to_string(),
            })
    }

    const fn check_writable(&self) -> Result<(), UsageError> {
        if self.read_only {
            return Err(UsageError::ReadOnly {
                serial: self.serial,
            });
        }

        Ok(())
    }

    fn store(&mut self, pos: usize, value: Value) {
        self.slots[pos] = Some(value);
        self.stamp(pos);
    }

    fn stamp(&mut self, pos: usize) {
        self.assigned.insert(ChangeMask::ANYTHING);
        if let Some(def) = self.schema.def_at(pos) {
            def.stamp(ChangeMask::ANYTHING);
        }
    }
}
