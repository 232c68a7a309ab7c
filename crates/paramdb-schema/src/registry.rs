use crate::{def::ParamDef, error::DefinitionError};
use paramdb_types::{ChangeMask, Location};
use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

///
/// Registry
///
/// Ordered, lockable collection of parameter definitions. Mutable until
/// `lock()`; every filter returns a fresh unlocked registry, so the filters
/// compose. `(owner, name)` pairs are unique; the composed schema of a node
/// kind is a locked registry.
///

#[derive(Debug, Default)]
pub struct Registry {
    defs: Vec<Arc<ParamDef>>,
    index: HashMap<(String, String), usize>,
    locked: bool,
    // Single-owner registries resolve bare names in O(1); mixed-owner
    // registries fall back to a scan. An optimization, not a contract.
    single_owner: Option<String>,
    by_name: HashMap<String, usize>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a definition. Fails once locked or on a duplicate
    /// `(owner, name)` pair.
    pub fn add(&mut self, def: Arc<ParamDef>) -> Result<(), DefinitionError> {
        if self.locked {
            return Err(DefinitionError::LockedRegistry);
        }
        if self.contains_key(def.owner(), def.name()) {
            return Err(DefinitionError::DuplicateParam {
                owner: def.owner().to_string(),
                name: def.name().to_string(),
            });
        }

        self.push(def);

        Ok(())
    }

    /// Append every definition of `other`. Fails on the first duplicate.
    pub fn extend(&mut self, other: &Self) -> Result<(), DefinitionError> {
        for def in &other.defs {
            self.add(def.clone())?;
        }

        Ok(())
    }

    /// Freeze the registry. Idempotent; all mutation fails afterwards.
    pub const fn lock(&mut self) {
        self.locked = true;
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.locked
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.defs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    #[must_use]
    pub fn contains_key(&self, owner: &str, name: &str) -> bool {
        self.index
            .contains_key(&(owner.to_string(), name.to_string()))
    }

    /// Look up a definition by bare name. O(1) when this registry describes a
    /// single owner kind, otherwise the first match in declaration order.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ParamDef>> {
        if self.single_owner.is_some() {
            return self.by_name.get(name).map(|&i| &self.defs[i]);
        }

        self.defs.iter().find(|d| d.name() == name)
    }

    /// Look up a definition by `(owner, name)`.
    #[must_use]
    pub fn get_for(&self, owner: &str, name: &str) -> Option<&Arc<ParamDef>> {
        self.index
            .get(&(owner.to_string(), name.to_string()))
            .map(|&i| &self.defs[i])
    }

    /// Definition at a declaration-order position.
    #[must_use]
    pub fn def_at(&self, pos: usize) -> Option<&Arc<ParamDef>> {
        self.defs.get(pos)
    }

    /// Position of a bare name in declaration order.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        if self.single_owner.is_some() {
            return self.by_name.get(name).copied();
        }

        self.defs.iter().position(|d| d.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<ParamDef>> {
        self.defs.iter()
    }

    /// Parameter names in declaration order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.defs.iter().map(|d| d.name()).collect()
    }

    /// Definitions tagged with `category`.
    #[must_use]
    pub fn filter_by_category(&self, category: &str) -> Self {
        self.filtered(|d| d.categories.contains(category))
    }

    /// Definitions whose location intersects `flags`.
    #[must_use]
    pub fn filter_by_location(&self, flags: Location) -> Self {
        self.filtered(|d| d.location.intersects(flags))
    }

    /// Definitions whose schema-level assigned mask intersects `mask`.
    #[must_use]
    pub fn filter_since(&self, mask: ChangeMask) -> Self {
        self.filtered(|d| d.assigned().touches(mask))
    }

    /// Definitions owned by `kind`.
    #[must_use]
    pub fn for_owner(&self, kind: &str) -> Self {
        self.filtered(|d| d.owner() == kind)
    }

    /// The definitions a durable-storage flush under `mask` must write:
    /// persisted and touched since the relevant event.
    #[must_use]
    pub fn to_persist_list(&self, mask: ChangeMask) -> Vec<Arc<ParamDef>> {
        self.defs
            .iter()
            .filter(|d| d.persist && d.assigned().touches(mask))
            .cloned()
            .collect()
    }

    /// Distinct owner kinds in declaration order.
    #[must_use]
    pub fn owners(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.defs
            .iter()
            .map(|d| d.owner())
            .filter(|o| seen.insert(*o))
            .collect()
    }

    fn filtered(&self, keep: impl Fn(&ParamDef) -> bool) -> Self {
        let mut out = Self::new();
        for def in self.defs.iter().filter(|d| keep(d.as_ref())) {
            // Uniqueness already holds in `self`.
            out.push(def.clone());
        }

        out
    }

    fn push(&mut self, def: Arc<ParamDef>) {
        let pos = self.defs.len();

        match (&self.single_owner, pos) {
            (_, 0) => {
                self.single_owner = Some(def.owner().to_string());
                self.by_name.insert(def.name().to_string(), pos);
            }
            (Some(owner), _) if owner == def.owner() => {
                self.by_name.insert(def.name().to_string(), pos);
            }
            _ => {
                self.single_owner = None;
                self.by_name.clear();
            }
        }

        self.index
            .insert((def.owner().to_string(), def.name().to_string()), pos);
        self.defs.push(def);
    }
}

#[cfg(test)]
mod tests {
    use super::Registry;
    use crate::def::ParamDef;
    use paramdb_types::{ChangeMask, Location};
    use std::sync::Arc;

    fn def(name: &str, owner: &str) -> Arc<ParamDef> {
        Arc::new(
            ParamDef::define(name, owner)
                .default(0.0)
                .build()
                .expect("valid definition"),
        )
    }

    #[test]
    fn preserves_declaration_order() {
        let mut reg = Registry::new();
        for name in ["power", "flux", "burnup"] {
            reg.add(def(name, "block")).expect("unique");
        }

        assert_eq!(reg.names(), vec!["power", "flux", "burnup"]);
    }

    #[test]
    fn rejects_duplicate_owner_name_pair() {
        let mut reg = Registry::new();
        reg.add(def("mass", "block")).expect("first add");

        let err = reg.add(def("mass", "block")).unwrap_err();
        assert!(err.to_string().contains("mass"));

        // Same name under a different owner is a distinct slot.
        reg.add(def("mass", "component")).expect("other owner");
    }

    #[test]
    fn lock_is_idempotent_and_final() {
        let mut reg = Registry::new();
        reg.add(def("power", "block")).expect("add");

        reg.lock();
        reg.lock();

        assert!(reg.is_locked());
        assert!(reg.add(def("flux", "block")).is_err());

        let mut other = Registry::new();
        other.add(def("flux", "block")).expect("add");
        assert!(reg.extend(&other).is_err());
    }

    #[test]
    fn extend_rejects_duplicates_across_registries() {
        let mut left = Registry::new();
        left.add(def("mass", "block")).expect("add");

        let mut right = Registry::new();
        right.add(def("mass", "block")).expect("add");

        let err = left.extend(&right).unwrap_err();
        assert!(err.to_string().contains("mass"));
    }

    #[test]
    fn bare_name_lookup_works_for_mixed_owners() {
        let mut reg = Registry::new();
        reg.add(def("power", "block")).expect("add");
        reg.add(def("mass", "component")).expect("add");

        assert_eq!(reg.get("mass").map(|d| d.owner()), Some("component"));
        assert_eq!(reg.get_for("block", "power").map(|d| d.name()), Some("power"));
        assert!(reg.get("missing").is_none());
        assert_eq!(reg.owners(), vec!["block", "component"]);
    }

    #[test]
    fn filters_compose_and_return_unlocked_registries() {
        let mut reg = Registry::new();
        reg.add(Arc::new(
            ParamDef::define("flux", "block")
                .category("neutronics")
                .location(Location::AVERAGE)
                .build()
                .expect("valid"),
        ))
        .expect("add");
        reg.add(Arc::new(
            ParamDef::define("power", "block")
                .category("neutronics")
                .category("thermal")
                .location(Location::VOLUME_INTEGRATED)
                .build()
                .expect("valid"),
        ))
        .expect("add");
        reg.lock();

        let neutronics = reg.filter_by_category("neutronics");
        assert_eq!(neutronics.len(), 2);
        assert!(!neutronics.is_locked());

        let narrowed = neutronics.filter_by_location(Location::VOLUME_INTEGRATED);
        assert_eq!(narrowed.names(), vec!["power"]);
    }

    #[test]
    fn persist_list_requires_persist_and_touched_mask() {
        let mut reg = Registry::new();
        let persisted = def("power", "block");
        let transient = Arc::new(
            ParamDef::define("scratch", "block")
                .persist(false)
                .build()
                .expect("valid"),
        );
        reg.add(persisted.clone()).expect("add");
        reg.add(transient.clone()).expect("add");

        assert!(reg.to_persist_list(ChangeMask::ANYTHING).is_empty());

        persisted.stamp(ChangeMask::ANYTHING);
        transient.stamp(ChangeMask::ANYTHING);

        let flush: Vec<_> = reg
            .to_persist_list(ChangeMask::ANYTHING)
            .iter()
            .map(|d| d.name().to_string())
            .collect();
        assert_eq!(flush, vec!["power"]);

        let since = reg.filter_since(ChangeMask::DISTRIBUTE);
        assert_eq!(since.len(), 2);
    }
}
