//! Distributed-state synchronization.
//!
//! Two-phase, caller-invoked, complete-barrier protocol: gather the fields
//! changed since the last round from every container in a stable traversal
//! order, exchange deltas with every rank, then reconcile. Disagreeing
//! concurrent writes to the same field are a hard failure that leaves local
//! state untouched; identical concurrent values reconcile silently.

mod local;
mod transport;


use crate::{
    error::UsageError,
    obs::{SyncTraceEvent, SyncTraceSink},
    state::ParamSet,
};
use paramdb_types::{ChangeMask, Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

// re-exports
pub use local::{LocalTransport, local_transports};
pub use transport::{SyncTransport, TransportError};

///
/// SyncError
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum SyncError {
    #[error(
        "conflicting values for '{field}' on container '{container}': {left:?} vs {right:?}"
    )]
    Conflict {
        container: String,
        field: String,
        left: Value,
        right: Value,
    },

    #[error("failed to apply delta to container '{container}': {source}")]
    Apply {
        container: String,
        #[source]
        source: UsageError,
    },

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("delta received for unknown container '{id}'")]
    UnknownContainer { id: String },
}

///
/// ContainerDelta
///
/// The fields one process changed on one logical container since the last
/// round. `id` is the caller-supplied stable identity (a tree path), shared
/// across processes; serial numbers are process-local and never cross the
/// wire.
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ContainerDelta {
    pub id: String,
    pub fields: BTreeMap<String, Value>,
}

///
/// SyncReport
///

#[derive(Clone, Copy, Debug, Default, derive_more::Display, Eq, PartialEq)]
#[display("gathered {gathered} container(s), applied {applied} field(s)")]
pub struct SyncReport {
    /// Containers this process contributed deltas for.
    pub gathered: usize,
    /// Foreign field values applied locally.
    pub applied: usize,
}

/// Run one sync round over `containers`, which every process must list in
/// the same stable traversal order with the same ids.
///
/// On success every container's since-distribute bit is cleared. On conflict
/// the round aborts before applying anything; the caller retries or fails
/// the run.
pub fn sync_round(
    containers: &mut [(&str, &mut ParamSet)],
    transport: &mut dyn SyncTransport,
    trace: &dyn SyncTraceSink,
) -> Result<SyncReport, SyncError> {
    let rank = transport.rank();
    trace.on_event(SyncTraceEvent::RoundStart {
        rank,
        containers: containers.len(),
    });

    // Phase 1: gather local deltas.
    let mut local = Vec::new();
    for (id, set) in containers.iter() {
        if let Some(fields) = set.changed_since(ChangeMask::DISTRIBUTE)
            && !fields.is_empty()
        {
            local.push(ContainerDelta {
                id: (*id).to_string(),
                fields,
            });
        }
    }
    trace.on_event(SyncTraceEvent::Gathered {
        rank,
        deltas: local.len(),
    });

    // Phase 2: blocking all-gather, then reconcile.
    let all = transport.exchange(local.clone())?;

    let local_by_id: BTreeMap<&str, &BTreeMap<String, Value>> =
        local.iter().map(|d| (d.id.as_str(), &d.fields)).collect();

    // Merge foreign deltas first, surfacing peer-vs-peer disagreement.
    let mut merged: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for (peer, deltas) in all.iter().enumerate() {
        if peer == rank {
            continue;
        }
        for delta in deltas {
            let entry = merged.entry(delta.id.clone()).or_default();
            for (field, value) in &delta.fields {
                match entry.get(field) {
                    Some(existing) if existing != value => {
                        trace.on_event(SyncTraceEvent::Conflict {
                            container: &delta.id,
                            field,
                        });
                        return Err(SyncError::Conflict {
                            container: delta.id.clone(),
                            field: field.clone(),
                            left: existing.clone(),
                            right: value.clone(),
                        });
                    }
                    _ => {
                        entry.insert(field.clone(), value.clone());
                    }
                }
            }
        }
    }

    // Then peer-vs-local disagreement, before anything is applied.
    for (id, fields) in &merged {
        let Some(ours) = local_by_id.get(id.as_str()) else {
            continue;
        };
        for (field, value) in fields {
            if let Some(mine) = ours.get(field)
                && mine != value
            {
                trace.on_event(SyncTraceEvent::Conflict {
                    container: id,
                    field,
                });
                return Err(SyncError::Conflict {
                    container: id.clone(),
                    field: field.clone(),
                    left: mine.clone(),
                    right: value.clone(),
                });
            }
        }
    }

    // Apply foreign values we did not compute ourselves.
    let index: BTreeMap<String, usize> = containers
        .iter()
        .enumerate()
        .map(|(i, (id, _))| ((*id).to_string(), i))
        .collect();

    // Resolve every delta to a local container and every field to a schema
    // slot before the first store; a failed round must leave local state
    // untouched, exactly like the conflict paths above.
    for (id, fields) in &merged {
        let Some(&pos) = index.get(id) else {
            return Err(SyncError::UnknownContainer { id: id.clone() });
        };

        let set = &*containers[pos].1;
        if set.is_read_only() {
            return Err(SyncError::Apply {
                container: id.clone(),
                source: UsageError::ReadOnly {
                    serial: set.serial(),
                },
            });
        }
        for field in fields.keys() {
            if set.schema().position(field).is_none() {
                return Err(SyncError::Apply {
                    container: id.clone(),
                    source: UsageError::UnknownParam {
                        kind: set.kind().to_string(),
                        name: field.clone(),
                    },
                });
            }
        }
    }

    let mut applied = 0;
    for (id, fields) in &merged {
        let Some(&pos) = index.get(id) else {
            return Err(SyncError::UnknownContainer { id: id.clone() });
        };

        let ours = local_by_id.get(id.as_str());
        let mut applied_here = 0;
        for (field, value) in fields {
            // Same-value concurrent writes were vetted above; skip them.
            if ours.is_some_and(|mine| mine.contains_key(field)) {
                continue;
            }
            containers[pos]
                .1
                .store_raw(field, value.clone())
                .map_err(|source| SyncError::Apply {
                    container: id.clone(),
                    source,
                })?;
            applied_here += 1;
        }

        trace.on_event(SyncTraceEvent::Applied {
            container: id,
            fields: applied_here,
        });
        applied += applied_here;
    }

    // The round is complete on every rank; the since-distribute class resets.
    for (_, set) in containers.iter_mut() {
        set.clear_changed(ChangeMask::DISTRIBUTE);
    }
    trace.on_event(SyncTraceEvent::RoundFinish { applied });

    Ok(SyncReport {
        gathered: local.len(),
        applied,
    })
}
