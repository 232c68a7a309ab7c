use crate::{error::Error, serial::SerialAllocator, state::ParamSet};
use paramdb_schema::Composer;
use std::sync::Arc;

///
/// ParamFactory
///
/// Builds state containers for node kinds. Owns the serial allocator and
/// holds the composer, so constructing the first container of a kind is what
/// triggers that kind's schema composition.
///

#[derive(Debug)]
pub struct ParamFactory {
    composer: Arc<Composer>,
    serials: SerialAllocator,
}

impl ParamFactory {
    #[must_use]
    pub fn new(composer: Arc<Composer>) -> Self {
        Self {
            composer,
            serials: SerialAllocator::new(),
        }
    }

    #[must_use]
    pub const fn composer(&self) -> &Arc<Composer> {
        &self.composer
    }

    #[must_use]
    pub const fn serials(&self) -> &SerialAllocator {
        &self.serials
    }

    /// New defaulted container for `kind`, composing its schema on first use.
    pub fn new_set(&self, kind: &str) -> Result<ParamSet, Error> {
        let schema = self.composer.schema_for(kind)?;

        Ok(ParamSet::new(kind, schema, self.serials.allocate()))
    }

    /// Deep copy with a fresh serial from this factory's allocator.
    #[must_use]
    pub fn duplicate(&self, set: &ParamSet) -> ParamSet {
        set.duplicate(&self.serials)
    }
}
