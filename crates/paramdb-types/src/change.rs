bitflags::bitflags! {
    /// Change-tracking flag set stamped on parameter definitions and state
    /// containers.
    ///
    /// Each bit answers one "has anything changed since X" question. A write
    /// stamps every bit; the owner of a given bit clears only that bit when
    /// its event completes (a sync round clears `DISTRIBUTE`, a backup clears
    /// `BACKUP`, and so on).
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct ChangeMask: u8 {
        /// Changed since container initialization.
        const INIT = 0x01;
        /// Changed since the last external transmission.
        const TRANSMIT = 0x02;
        /// Changed since the last distributed-state sync round.
        const DISTRIBUTE = 0x04;
        /// Changed since the last geometry transformation.
        const GEOMETRY = 0x08;
        /// Changed since the last backup snapshot.
        const BACKUP = 0x10;
    }
}

impl ChangeMask {
    /// Every change class at once; the mask stamped by any successful write.
    pub const ANYTHING: Self = Self::all();

    /// True when any bit of `mask` is set here.
    #[must_use]
    pub const fn touches(self, mask: Self) -> bool {
        self.intersects(mask)
    }
}
