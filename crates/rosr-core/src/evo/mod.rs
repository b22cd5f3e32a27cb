//! Research object evolution: LIVE objects, their SNAPSHOT and ARCHIVED
//! copies, and the metadata linking them.

pub mod builder;
pub mod info;

mod copy;

pub use builder::{
    extract_evo_type, for_type, ArchiveBuilder, CopyTerms, EvoBuilder, LiveBuilder, SnapshotBuilder,
};
pub use info::{EvoCopy, EvoInfo, ImmutableEvoInfo, LiveEvoInfo};
