//! Definition-time validation helpers shared by the builder and composer.

pub mod naming;
