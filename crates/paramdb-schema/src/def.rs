use crate::{error::DefinitionError, validate::naming};
use paramdb_types::{ChangeMask, Location, SetterPolicy, Value, ValueCodec};
use std::{
    collections::BTreeSet,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
};

///
/// ParamDef
///
/// Definition of one named, typed parameter slot: identity, metadata, default,
/// persistence, access policy, and the schema-level assigned mask.
///
/// The assigned mask is shared by every state container of the owning kind.
/// It records which change classes have touched *any* instance's value for
/// this parameter; the durable-storage writer uses it to decide write
/// eligibility without walking instances.
///

pub struct ParamDef {
    name: String,
    owner: String,
    key: String,
    pub unit: String,
    pub description: String,
    pub location: Location,
    pub persist: bool,
    pub default: Option<Value>,
    pub categories: BTreeSet<String>,
    codec: Option<Arc<dyn ValueCodec>>,
    setter: SetterPolicy,
    assigned: AtomicU8,
}

impl ParamDef {
    /// Start defining a parameter for an owning node kind.
    pub fn define(name: impl Into<String>, owner: impl Into<String>) -> ParamDefBuilder {
        ParamDefBuilder::new(name.into(), owner.into())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Derived storage key, unique across the whole schema.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn codec(&self) -> Option<&Arc<dyn ValueCodec>> {
        self.codec.as_ref()
    }

    #[must_use]
    pub const fn setter(&self) -> &SetterPolicy {
        &self.setter
    }

    /// Which change classes have touched any instance's value since the
    /// corresponding bits were last cleared.
    #[must_use]
    pub fn assigned(&self) -> ChangeMask {
        ChangeMask::from_bits_truncate(self.assigned.load(Ordering::Relaxed))
    }

    /// Stamp change bits after a successful write.
    pub fn stamp(&self, mask: ChangeMask) {
        self.assigned.fetch_or(mask.bits(), Ordering::Relaxed);
    }

    /// Clear change bits once the bit-owning event has completed.
    pub fn clear_assigned(&self, mask: ChangeMask) {
        self.assigned.fetch_and(!mask.bits(), Ordering::Relaxed);
    }
}

impl fmt::Debug for ParamDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParamDef")
            .field("key", &self.key)
            .field("unit", &self.unit)
            .field("location", &self.location)
            .field("persist", &self.persist)
            .field("default", &self.default)
            .field("categories", &self.categories)
            .field("codec", &self.codec.as_ref().map(|_| ".."))
            .field("setter", &self.setter)
            .field("assigned", &self.assigned())
            .finish()
    }
}

///
/// ParamDefBuilder
///

pub struct ParamDefBuilder {
    name: String,
    owner: String,
    unit: String,
    description: String,
    location: Location,
    persist: bool,
    default: Option<Value>,
    categories: BTreeSet<String>,
    codec: Option<Arc<dyn ValueCodec>>,
    setter: SetterPolicy,
}

impl ParamDefBuilder {
    fn new(name: String, owner: String) -> Self {
        Self {
            name,
            owner,
            unit: String::new(),
            description: String::new(),
            location: Location::default(),
            persist: true,
            default: None,
            categories: BTreeSet::new(),
            codec: None,
            setter: SetterPolicy::Unrestricted,
        }
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub const fn location(mut self, location: Location) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub const fn persist(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    #[must_use]
    pub fn default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.insert(category.into());
        self
    }

    #[must_use]
    pub fn codec(mut self, codec: Arc<dyn ValueCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    #[must_use]
    pub fn setter(mut self, setter: SetterPolicy) -> Self {
        self.setter = setter;
        self
    }

    /// Validate and finish the definition.
    pub fn build(self) -> Result<ParamDef, DefinitionError> {
        naming::validate_param_name(&self.name)?;
        naming::validate_kind_name(&self.owner)?;

        if let Some(default) = &self.default
            && !default.is_scalar()
        {
            return Err(DefinitionError::MutableDefault {
                name: self.name,
                tag: default.tag(),
            });
        }

        if self.codec.is_some() && !self.persist {
            return Err(DefinitionError::TransientCodec { name: self.name });
        }

        let key = format!("{}/{}", self.owner, self.name);

        Ok(ParamDef {
            name: self.name,
            owner: self.owner,
            key,
            unit: self.unit,
            description: self.description,
            location: self.location,
            persist: self.persist,
            default: self.default,
            categories: self.categories,
            codec: self.codec,
            setter: self.setter,
            assigned: AtomicU8::new(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::ParamDef;
    use paramdb_types::{ChangeMask, Location, Value, ValueTag};

    #[test]
    fn builds_with_derived_key() {
        let def = ParamDef::define("power", "block")
            .unit("W")
            .description("total thermal power")
            .location(Location::VOLUME_INTEGRATED)
            .default(0.0)
            .build()
            .expect("valid definition");

        assert_eq!(def.name(), "power");
        assert_eq!(def.owner(), "block");
        assert_eq!(def.key(), "block/power");
        assert!(def.persist);
        assert_eq!(def.default, Some(Value::Float(0.0)));
        assert!(def.assigned().is_empty());
    }

    #[test]
    fn rejects_bad_characters_in_name() {
        let err = ParamDef::define("axial-mesh", "block").build().unwrap_err();
        assert!(err.to_string().contains("axial-mesh"));
    }

    #[test]
    fn rejects_mutable_default() {
        let err = ParamDef::define("pins", "block")
            .default(Value::List(vec![Value::Int(1)]))
            .build()
            .unwrap_err();

        assert!(matches!(
            err,
            crate::DefinitionError::MutableDefault { tag: ValueTag::List, .. }
        ));
    }

    #[test]
    fn rejects_codec_on_transient_param() {
        struct NullCodec;
        impl paramdb_types::ValueCodec for NullCodec {
            fn pack(
                &self,
                value: &Value,
            ) -> Result<paramdb_types::Packed, paramdb_types::CodecError> {
                Ok(paramdb_types::Packed::new(value.clone()))
            }
            fn unpack(
                &self,
                raw: Value,
                _version: u8,
                _attrs: &std::collections::BTreeMap<String, String>,
            ) -> Result<Value, paramdb_types::CodecError> {
                Ok(raw)
            }
        }

        let err = ParamDef::define("flux", "block")
            .persist(false)
            .codec(std::sync::Arc::new(NullCodec))
            .build()
            .unwrap_err();

        assert!(matches!(err, crate::DefinitionError::TransientCodec { .. }));
    }

    #[test]
    fn stamp_and_clear_are_independent_per_bit() {
        let def = ParamDef::define("power", "block").build().expect("valid");

        def.stamp(ChangeMask::ANYTHING);
        assert!(def.assigned().touches(ChangeMask::BACKUP));

        def.clear_assigned(ChangeMask::BACKUP);
        assert!(!def.assigned().touches(ChangeMask::BACKUP));
        assert!(def.assigned().touches(ChangeMask::DISTRIBUTE));
    }
}
