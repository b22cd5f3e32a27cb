use chrono::{DateTime, Utc};
use rosr_graph::Graph;
use rosr_types::{EvoType, Uri};

use super::builder::{extract_evo_type, for_type};

/// One snapshot or archive made from a live research object.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvoCopy {
    pub uri: Uri,
    pub evo_type: EvoType,
    pub copied_at: Option<DateTime<Utc>>,
}

/// Evolution information of a live research object.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LiveEvoInfo {
    /// Copies, oldest first.
    pub copies: Vec<EvoCopy>,
}

impl LiveEvoInfo {
    pub(crate) fn extract(graph: &Graph, ro: &Uri) -> Self {
        let mut copies: Vec<EvoCopy> = [EvoType::Snapshot, EvoType::Archived]
            .into_iter()
            .flat_map(|evo_type| {
                let strategy = for_type(evo_type);
                strategy
                    .extract_copies(graph, ro)
                    .into_iter()
                    .map(move |uri| EvoCopy {
                        copied_at: strategy.extract_copy_time(graph, &uri),
                        uri,
                        evo_type,
                    })
            })
            .collect();
        copies.sort_by(|a, b| a.copied_at.cmp(&b.copied_at).then_with(|| a.uri.cmp(&b.uri)));
        Self { copies }
    }

    pub fn snapshots(&self) -> impl Iterator<Item = &EvoCopy> {
        self.copies.iter().filter(|c| c.evo_type == EvoType::Snapshot)
    }

    pub fn archives(&self) -> impl Iterator<Item = &EvoCopy> {
        self.copies.iter().filter(|c| c.evo_type == EvoType::Archived)
    }
}

/// Evolution information of a snapshot or archive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImmutableEvoInfo {
    pub evo_type: EvoType,
    /// The live research object this is a copy of.
    pub live: Uri,
    pub copied_at: Option<DateTime<Utc>>,
    pub copied_by: Option<Uri>,
    pub copied_by_name: Option<String>,
}

impl ImmutableEvoInfo {
    pub(crate) fn extract(graph: &Graph, ro: &Uri, evo_type: EvoType) -> Option<Self> {
        let strategy = for_type(evo_type);
        let live = strategy.extract_copy_of(graph, ro)?;
        let (copied_by, copied_by_name) = match strategy.extract_copy_author(graph, ro) {
            Some((uri, name)) => (Some(uri), name),
            None => (None, None),
        };
        Some(Self {
            evo_type,
            live,
            copied_at: strategy.extract_copy_time(graph, ro),
            copied_by,
            copied_by_name,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvoInfo {
    Live(LiveEvoInfo),
    Immutable(ImmutableEvoInfo),
}

impl EvoInfo {
    /// Read the evolution information of `ro`. The evolution graph wins;
    /// the manifest is consulted for the type when the graph is silent.
    pub(crate) fn extract(evo_graph: &Graph, manifest: &Graph, ro: &Uri) -> Option<Self> {
        let evo_type = extract_evo_type(evo_graph, ro)
            .or_else(|| extract_evo_type(manifest, ro))
            .unwrap_or_default();
        match evo_type {
            EvoType::Live => Some(EvoInfo::Live(LiveEvoInfo::extract(evo_graph, ro))),
            immutable => ImmutableEvoInfo::extract(evo_graph, ro, immutable)
                .or_else(|| ImmutableEvoInfo::extract(manifest, ro, immutable))
                .map(EvoInfo::Immutable),
        }
    }

    pub fn evo_type(&self) -> EvoType {
        match self {
            EvoInfo::Live(_) => EvoType::Live,
            EvoInfo::Immutable(info) => info.evo_type,
        }
    }

    pub fn as_live(&self) -> Option<&LiveEvoInfo> {
        match self {
            EvoInfo::Live(info) => Some(info),
            EvoInfo::Immutable(_) => None,
        }
    }

    pub fn as_immutable(&self) -> Option<&ImmutableEvoInfo> {
        match self {
            EvoInfo::Immutable(info) => Some(info),
            EvoInfo::Live(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evo::builder::{ArchiveBuilder, EvoBuilder, LiveBuilder, SnapshotBuilder};
    use chrono::TimeZone;

    fn uri(s: &str) -> Uri {
        Uri::parse(s).unwrap()
    }

    #[test]
    fn live_copies_are_ordered_by_time() {
        let live = uri("http://ex/ro1/");
        let mut g = Graph::new();
        LiveBuilder.save_type(&mut g, &live);
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        SnapshotBuilder.save_has_copy(&mut g, &live, &uri("http://ex/s/"));
        SnapshotBuilder.save_copy_time(&mut g, &uri("http://ex/s/"), &late);
        ArchiveBuilder.save_has_copy(&mut g, &live, &uri("http://ex/a/"));
        ArchiveBuilder.save_copy_time(&mut g, &uri("http://ex/a/"), &early);

        let info = EvoInfo::extract(&g, &Graph::new(), &live).unwrap();
        let live_info = info.as_live().unwrap();
        let order: Vec<_> = live_info.copies.iter().map(|c| c.uri.as_str()).collect();
        assert_eq!(order, vec!["http://ex/a/", "http://ex/s/"]);
        assert_eq!(live_info.snapshots().count(), 1);
        assert_eq!(live_info.archives().count(), 1);
    }

    #[test]
    fn immutable_info_points_to_live() {
        let copy = uri("http://ex/ro2/");
        let mut g = Graph::new();
        SnapshotBuilder.save_type(&mut g, &copy);
        SnapshotBuilder.save_copy_of(&mut g, &copy, &uri("http://ex/ro1/"));
        let info = EvoInfo::extract(&g, &Graph::new(), &copy).unwrap();
        assert_eq!(info.evo_type(), EvoType::Snapshot);
        assert_eq!(info.as_immutable().unwrap().live, uri("http://ex/ro1/"));
    }

    #[test]
    fn immutable_without_origin_is_none() {
        let copy = uri("http://ex/ro2/");
        let mut g = Graph::new();
        ArchiveBuilder.save_type(&mut g, &copy);
        assert!(EvoInfo::extract(&g, &Graph::new(), &copy).is_none());
    }

    #[test]
    fn untyped_object_is_live() {
        let info = EvoInfo::extract(&Graph::new(), &Graph::new(), &uri("http://ex/ro/")).unwrap();
        assert_eq!(info.evo_type(), EvoType::Live);
    }
}
