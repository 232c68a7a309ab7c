//! Schema composition: per-kind contributions from independent plugins,
//! composed lazily into one locked registry per node kind.
//!
//! Contract: contributions for a kind are accepted until that kind's schema
//! is first composed; afterwards they fail loudly. Kinds with no fields of
//! their own share their ancestor's composed registry by reference, so the
//! number of distinct registries is bounded by the number of kinds that
//! actually introduce parameters.

#[cfg(test)]
mod tests;

use crate::{
    def::ParamDef,
    error::{DefinitionError, ErrorTree},
    registry::Registry,
    validate::naming,
};
use std::{
    collections::{BTreeMap, HashSet},
    sync::{Arc, RwLock},
};

///
/// Composer
///
/// Explicitly-owned arena of composed schemas, keyed by node kind. One
/// composer per process; the container factory holds it and triggers
/// composition on first instantiation of each kind.
///

#[derive(Debug, Default)]
pub struct Composer {
    inner: RwLock<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    kinds: BTreeMap<String, KindDecl>,
    composed: BTreeMap<String, Arc<Registry>>,
    /// The one kind allowed to compose from multiple ancestors.
    multi_taken: Option<String>,
}

#[derive(Debug)]
struct KindDecl {
    ancestors: Vec<String>,
    defs: Vec<Arc<ParamDef>>,
}

impl Composer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node kind and its single structural ancestor.
    pub fn declare_kind(
        &self,
        kind: impl Into<String>,
        ancestor: Option<&str>,
    ) -> Result<(), DefinitionError> {
        let ancestors = ancestor.map(str::to_string).into_iter().collect();
        self.declare(kind.into(), ancestors)
    }

    /// Declare a node kind with multiple ancestors.
    ///
    /// Single-ancestor composition is the supported rule; exactly one kind in
    /// the whole hierarchy may take this escape hatch. A second use is
    /// rejected so it surfaces as a design decision, not a convenience.
    pub fn declare_kind_multi(
        &self,
        kind: impl Into<String>,
        ancestors: &[&str],
    ) -> Result<(), DefinitionError> {
        let kind = kind.into();

        if ancestors.len() > 1 {
            let mut inner = self.write();
            if let Some(taken_by) = &inner.multi_taken
                && taken_by != &kind
            {
                return Err(DefinitionError::MultiAncestorExhausted {
                    kind,
                    taken_by: taken_by.clone(),
                });
            }
            inner.multi_taken = Some(kind.clone());
        }

        self.declare(kind, ancestors.iter().map(|&a| a.to_string()).collect())
    }

    fn declare(&self, kind: String, ancestors: Vec<String>) -> Result<(), DefinitionError> {
        naming::validate_kind_name(&kind)?;
        for ancestor in &ancestors {
            naming::validate_kind_name(ancestor)?;
        }

        let mut inner = self.write();
        if inner.kinds.contains_key(&kind) {
            return Err(DefinitionError::DuplicateKind { kind });
        }

        inner.kinds.insert(
            kind,
            KindDecl {
                ancestors,
                defs: Vec::new(),
            },
        );

        Ok(())
    }

    /// Contribute one parameter definition to its owning kind.
    ///
    /// Many independent callers may contribute to the same kind; the first
    /// composition of that kind closes the window.
    pub fn contribute(&self, def: ParamDef) -> Result<(), DefinitionError> {
        let mut inner = self.write();
        let kind = def.owner().to_string();

        if inner.composed.contains_key(&kind) {
            return Err(DefinitionError::ComposedKind { kind });
        }

        let Some(decl) = inner.kinds.get_mut(&kind) else {
            return Err(DefinitionError::UnknownKind { kind });
        };

        if decl.defs.iter().any(|d| d.name() == def.name()) {
            return Err(DefinitionError::DuplicateParam {
                owner: kind,
                name: def.name().to_string(),
            });
        }

        decl.defs.push(Arc::new(def));

        Ok(())
    }

    /// Contribute a whole fragment of definitions.
    pub fn contribute_all(
        &self,
        defs: impl IntoIterator<Item = ParamDef>,
    ) -> Result<(), DefinitionError> {
        for def in defs {
            self.contribute(def)?;
        }

        Ok(())
    }

    /// Composed schema for `kind`, composing it (and its ancestry) on first
    /// use. Idempotent: later calls return the same `Arc`.
    pub fn schema_for(&self, kind: &str) -> Result<Arc<Registry>, DefinitionError> {
        let mut inner = self.write();
        let mut visiting = HashSet::new();

        compose(&mut inner, kind, &mut visiting)
    }

    /// Whether `kind`'s schema has been composed already.
    #[must_use]
    pub fn is_composed(&self, kind: &str) -> bool {
        self.read().composed.contains_key(kind)
    }

    /// Declared kind names, sorted.
    #[must_use]
    pub fn kinds(&self) -> Vec<String> {
        self.read().kinds.keys().cloned().collect()
    }

    /// Compose every declared kind, aggregating all failures.
    ///
    /// Intended as the fail-fast gate after plugin registration and before
    /// any simulation work.
    pub fn validate(&self) -> Result<(), ErrorTree> {
        let mut errs = ErrorTree::new();

        for kind in self.kinds() {
            if let Err(e) = self.schema_for(&kind) {
                errs.add_at(kind, e);
            }
        }

        errs.result()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner
            .read()
            .expect("composer RwLock poisoned while acquiring read lock")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner
            .write()
            .expect("composer RwLock poisoned while acquiring write lock")
    }
}

// Recursive composition over the ancestor chain. `visiting` detects cycles.
fn compose(
    inner: &mut Inner,
    kind: &str,
    visiting: &mut HashSet<String>,
) -> Result<Arc<Registry>, DefinitionError> {
    if let Some(schema) = inner.composed.get(kind) {
        return Ok(schema.clone());
    }

    if !inner.kinds.contains_key(kind) {
        return Err(DefinitionError::UnknownKind {
            kind: kind.to_string(),
        });
    }

    if !visiting.insert(kind.to_string()) {
        return Err(DefinitionError::CyclicAncestry {
            kind: kind.to_string(),
        });
    }

    let (ancestors, defs) = {
        let decl = &inner.kinds[kind];
        (decl.ancestors.clone(), decl.defs.clone())
    };

    let mut ancestor_schemas = Vec::with_capacity(ancestors.len());
    for ancestor in &ancestors {
        ancestor_schemas.push(compose(inner, ancestor, visiting)?);
    }

    // A kind with no fields of its own and a single ancestor *is* that
    // ancestor's schema, by reference.
    let schema = if defs.is_empty() && ancestor_schemas.len() == 1 {
        ancestor_schemas[0].clone()
    } else {
        let mut registry = Registry::new();
        let mut inherited = HashSet::new();

        for ancestor_schema in &ancestor_schemas {
            for def in ancestor_schema.iter() {
                if !inherited.insert(def.name().to_string()) {
                    return Err(collision(kind, def.name()));
                }
                registry.add(def.clone()).map_err(|_| collision(kind, def.name()))?;
            }
        }

        for def in defs {
            if inherited.contains(def.name()) {
                return Err(collision(kind, def.name()));
            }
            registry.add(def)?;
        }

        registry.lock();
        Arc::new(registry)
    };

    visiting.remove(kind);
    inner.composed.insert(kind.to_string(), schema.clone());

    Ok(schema)
}

fn collision(kind: &str, name: &str) -> DefinitionError {
    DefinitionError::AncestorCollision {
        kind: kind.to_string(),
        name: name.to_string(),
    }
}
