//! Vocabulary IRIs used by research object metadata.

pub mod rdf {
    pub const NS: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

pub mod xsd {
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
}

/// OAI-ORE aggregation terms.
pub mod ore {
    pub const NS: &str = "http://www.openarchives.org/ore/terms/";

    // Classes
    pub const AGGREGATION: &str = "http://www.openarchives.org/ore/terms/Aggregation";
    pub const AGGREGATED_RESOURCE: &str = "http://www.openarchives.org/ore/terms/AggregatedResource";
    pub const PROXY: &str = "http://www.openarchives.org/ore/terms/Proxy";
    pub const RESOURCE_MAP: &str = "http://www.openarchives.org/ore/terms/ResourceMap";

    // Properties
    pub const AGGREGATES: &str = "http://www.openarchives.org/ore/terms/aggregates";
    pub const IS_AGGREGATED_BY: &str = "http://www.openarchives.org/ore/terms/isAggregatedBy";
    pub const PROXY_FOR: &str = "http://www.openarchives.org/ore/terms/proxyFor";
    pub const PROXY_IN: &str = "http://www.openarchives.org/ore/terms/proxyIn";
    pub const DESCRIBES: &str = "http://www.openarchives.org/ore/terms/describes";
    pub const IS_DESCRIBED_BY: &str = "http://www.openarchives.org/ore/terms/isDescribedBy";
}

/// Wf4Ever research object terms.
pub mod ro {
    pub const NS: &str = "http://purl.org/wf4ever/ro#";

    // Classes
    pub const RESEARCH_OBJECT: &str = "http://purl.org/wf4ever/ro#ResearchObject";
    pub const RESOURCE: &str = "http://purl.org/wf4ever/ro#Resource";
    pub const FOLDER: &str = "http://purl.org/wf4ever/ro#Folder";
    pub const FOLDER_ENTRY: &str = "http://purl.org/wf4ever/ro#FolderEntry";
    pub const AGGREGATED_ANNOTATION: &str = "http://purl.org/wf4ever/ro#AggregatedAnnotation";
    pub const MANIFEST: &str = "http://purl.org/wf4ever/ro#Manifest";

    // Properties
    pub const ENTRY_NAME: &str = "http://purl.org/wf4ever/ro#entryName";
    pub const ROOT_FOLDER: &str = "http://purl.org/wf4ever/ro#rootFolder";
}

/// Annotation ontology terms.
pub mod ao {
    pub const NS: &str = "http://purl.org/ao/";

    pub const ANNOTATION: &str = "http://purl.org/ao/Annotation";
    pub const BODY: &str = "http://purl.org/ao/body";
    pub const ANNOTATES_RESOURCE: &str = "http://purl.org/ao/annotatesResource";
}

/// Research object evolution terms.
pub mod roevo {
    pub const NS: &str = "http://purl.org/wf4ever/roevo#";

    // Classes
    pub const LIVE_RO: &str = "http://purl.org/wf4ever/roevo#LiveRO";
    pub const SNAPSHOT_RO: &str = "http://purl.org/wf4ever/roevo#SnapshotRO";
    pub const ARCHIVED_RO: &str = "http://purl.org/wf4ever/roevo#ArchivedRO";

    // Properties
    pub const IS_SNAPSHOT_OF: &str = "http://purl.org/wf4ever/roevo#isSnapshotOf";
    pub const HAS_SNAPSHOT: &str = "http://purl.org/wf4ever/roevo#hasSnapshot";
    pub const SNAPSHOTED_AT_TIME: &str = "http://purl.org/wf4ever/roevo#snapshotedAtTime";
    pub const SNAPSHOTED_BY: &str = "http://purl.org/wf4ever/roevo#snapshotedBy";
    pub const IS_ARCHIVE_OF: &str = "http://purl.org/wf4ever/roevo#isArchiveOf";
    pub const HAS_ARCHIVE: &str = "http://purl.org/wf4ever/roevo#hasArchive";
    pub const ARCHIVED_AT_TIME: &str = "http://purl.org/wf4ever/roevo#archivedAtTime";
    pub const ARCHIVED_BY: &str = "http://purl.org/wf4ever/roevo#archivedBy";
}

pub mod dcterms {
    pub const NS: &str = "http://purl.org/dc/terms/";

    pub const CREATOR: &str = "http://purl.org/dc/terms/creator";
    pub const CREATED: &str = "http://purl.org/dc/terms/created";
    pub const MODIFIED: &str = "http://purl.org/dc/terms/modified";
    pub const FORMAT: &str = "http://purl.org/dc/terms/format";
}

pub mod foaf {
    pub const NS: &str = "http://xmlns.com/foaf/0.1/";

    pub const AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
    pub const NAME: &str = "http://xmlns.com/foaf/0.1/name";
}
