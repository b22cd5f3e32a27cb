//! Annotations: a body document associated with one or more targets.
//!
//! Targets must be the research object itself or something it aggregates.
//! A body may be internal or external; internal N-Triples bodies are also
//! stored as a named graph under the body URI so their statements join the
//! research object description.

use std::collections::{BTreeMap, BTreeSet};

use rosr_content::stats::clean_path;
use rosr_graph::vocab::ao;
use rosr_graph::{ntriples, Graph, Term};
use rosr_types::Uri;
use tracing::{debug, warn};

use crate::error::{RoError, RoResult};
use crate::research_object::{cached, ResearchObject};
use crate::thing::{AggregatedResource, AnnotationInfo, ResourceKind, Thing};

/// Returns `true` for media types carried as N-Triples.
fn is_ntriples(mime_type: &str) -> bool {
    mime_type
        .split(';')
        .next()
        .map(str::trim)
        .is_some_and(|essence| {
            essence.eq_ignore_ascii_case(ntriples::MEDIA_TYPE)
                || essence.eq_ignore_ascii_case(ntriples::RELATIVE_MEDIA_TYPE)
        })
}

impl ResearchObject<'_> {
    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    /// Target URI to the annotations about it.
    pub fn annotations_by_target(&self) -> RoResult<&BTreeMap<Uri, BTreeSet<Uri>>> {
        cached(&self.annotations_by_target, || {
            let mut index: BTreeMap<Uri, BTreeSet<Uri>> = BTreeMap::new();
            for (uri, info) in self.annotation_infos()? {
                for target in &info.targets {
                    index.entry(target.clone()).or_default().insert(uri.clone());
                }
            }
            Ok(index)
        })
    }

    /// Body URI to the annotations using it.
    pub fn annotations_by_body(&self) -> RoResult<&BTreeMap<Uri, BTreeSet<Uri>>> {
        cached(&self.annotations_by_body, || {
            let mut index: BTreeMap<Uri, BTreeSet<Uri>> = BTreeMap::new();
            for (uri, info) in self.annotation_infos()? {
                index.entry(info.body.clone()).or_default().insert(uri.clone());
            }
            Ok(index)
        })
    }

    /// Annotations targeting `target`.
    pub fn annotations_about(&self, target: &Uri) -> RoResult<Vec<&AggregatedResource>> {
        let aggregated = self.aggregated()?;
        Ok(self
            .annotations_by_target()?
            .get(target)
            .into_iter()
            .flatten()
            .filter_map(|uri| aggregated.get(uri))
            .collect())
    }

    fn annotation_infos(&self) -> RoResult<impl Iterator<Item = (&Uri, &AnnotationInfo)>> {
        Ok(self
            .aggregated()?
            .iter()
            .filter_map(|(uri, r)| Some((uri, r.as_annotation()?))))
    }

    /// The reserved annotation whose body is the evolution information.
    pub(crate) fn is_evo_annotation(&self, resource: &AggregatedResource) -> bool {
        resource
            .as_annotation()
            .is_some_and(|a| &a.body == self.evo_map.uri())
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// Annotate `targets` with `body`. References are absolute or relative
    /// to this research object; `id` names the annotation, otherwise a UUID
    /// does.
    ///
    /// An internal body that is not aggregated yet is aggregated first.
    pub fn annotate(
        &mut self,
        body: &str,
        targets: &[&str],
        id: Option<&str>,
    ) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let body = self.resolve_body(body)?;
        let targets = self.resolve_targets(targets)?;
        let uri = self.builder.build_annotation_uri(&self.uri, id)?;
        self.ensure_unused(&uri)?;
        let thing = self.builder.build_thing(uri);
        let annotation = self.write_op(|ro| ro.annotate_internal(thing, body, targets))?;
        self.publish_update(annotation.uri());
        Ok(annotation)
    }

    /// Store `content` at `path` (or replace it if already aggregated), then
    /// annotate `targets` with it.
    ///
    /// Every reference and the body itself are checked before anything is
    /// written; a failure part way leaves the previous content in place.
    pub fn annotate_with_body(
        &mut self,
        path: &str,
        content: &[u8],
        mime_type: &str,
        targets: &[&str],
        id: Option<&str>,
    ) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let path = clean_path(path)?;
        let body = self.resolve_body(&path)?;
        let targets = self.resolve_targets(targets)?;
        let uri = self.builder.build_annotation_uri(&self.uri, id)?;
        self.ensure_unused(&uri)?;
        let replaced = match self.aggregated_resource(&body)? {
            Some(r) if r.is_resource() => true,
            Some(_) => {
                return Err(RoError::Conflict(format!("{body} is not a plain resource")));
            }
            None => {
                self.ensure_unused(&body)?;
                false
            }
        };
        self.parse_body(&body, content, mime_type)?;

        let previous = if replaced && self.is_internal(&body)? {
            let info = self.builder.content().get_file_info(&self.uri, &path)?;
            Some((self.builder.content().get_file(&self.uri, &path)?, info.mime_type))
        } else {
            None
        };
        let thing = self.builder.build_thing(uri);
        let body_thing = self.builder.build_thing(body.clone());
        let result = self.write_op(|ro| {
            let stats = if replaced {
                let stats = ro.builder.content().put_file(&ro.uri, &path, content, mime_type)?;
                Some(stats)
            } else {
                ro.aggregate_internal(body_thing, Some((content, mime_type)))?;
                None
            };
            let annotation = ro.annotate_internal(thing, body.clone(), targets)?;
            Ok((annotation, stats))
        });
        let (annotation, stats) = match result {
            Ok(done) => done,
            Err(e) => {
                self.restore_body(&path, previous);
                return Err(e);
            }
        };
        if let Some(stats) = stats {
            self.refresh_stats(&body, stats);
        }
        self.publish_update(&body);
        self.publish_update(annotation.uri());
        Ok(annotation)
    }

    /// Annotate from an N-Triples description holding exactly one
    /// `ao:Annotation`, with its `ao:body` and `ao:annotatesResource`
    /// statements. An annotation IRI inside this object is kept, otherwise
    /// one is minted.
    pub fn annotate_from_description(&mut self, description: &str) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let graph = ntriples::parse(description, Some(&self.uri))?;
        let subject = match graph.instances_of(ao::ANNOTATION).as_slice() {
            [one] => (*one).clone(),
            [] => return Err(RoError::BadRequest("no annotation in the description".into())),
            many => {
                return Err(RoError::BadRequest(format!(
                    "{} annotations in the description, expected one",
                    many.len()
                )));
            }
        };
        let body = graph
            .object(&subject, ao::BODY)
            .and_then(Term::as_iri)
            .ok_or_else(|| RoError::BadRequest(format!("annotation {subject} has no body")))?;
        let targets: Vec<&str> = graph
            .objects(&subject, ao::ANNOTATES_RESOURCE)
            .filter_map(Term::as_iri)
            .collect();

        let body = self.resolve_body(body)?;
        let targets = self.resolve_targets(&targets)?;
        let uri = match subject.to_uri().filter(|u| u.is_within(&self.uri) && u != &self.uri) {
            Some(uri) => {
                self.ensure_not_reserved(&uri)?;
                uri
            }
            None => self.builder.build_annotation_uri(&self.uri, None)?,
        };
        self.ensure_unused(&uri)?;
        let thing = self.builder.build_thing(uri);
        let annotation = self.write_op(|ro| ro.annotate_internal(thing, body, targets))?;
        debug!(ro = %self.uri, annotation = %annotation.uri(), "annotated from description");
        self.publish_update(annotation.uri());
        Ok(annotation)
    }

    /// Replace the body and targets of an annotation.
    pub fn update_annotation(
        &mut self,
        uri: &Uri,
        body: &str,
        targets: &[&str],
    ) -> RoResult<AggregatedResource> {
        self.ensure_mutable()?;
        let mut annotation = self.user_annotation(uri)?;
        let body = self.resolve_body(body)?;
        let targets = self.resolve_targets(targets)?;
        let updated = self.write_op(|ro| {
            ro.prepare_body(&body)?;
            annotation.kind = ResourceKind::Annotation(AnnotationInfo { body, targets });
            ro.save_member(annotation.clone())?;
            Ok(annotation)
        })?;
        debug!(ro = %self.uri, annotation = %uri, "updated annotation");
        self.publish_update(uri);
        Ok(updated)
    }

    /// De-aggregate an annotation. Its body stays.
    pub fn delete_annotation(&mut self, uri: &Uri) -> RoResult<()> {
        self.ensure_mutable()?;
        let annotation = self.user_annotation(uri)?;
        self.write_op(|ro| ro.delete_annotation_internal(&annotation))?;
        self.publish_update(uri);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    /// Aggregate the annotation. No precondition checks.
    pub(crate) fn annotate_internal(
        &mut self,
        thing: Thing,
        body: Uri,
        targets: BTreeSet<Uri>,
    ) -> RoResult<AggregatedResource> {
        self.prepare_body(&body)?;
        self.add_member(AggregatedResource {
            thing,
            aggregation: self.uri.clone(),
            proxy: None,
            kind: ResourceKind::Annotation(AnnotationInfo { body, targets }),
        })
    }

    pub(crate) fn delete_annotation_internal(&mut self, annotation: &AggregatedResource) -> RoResult<()> {
        self.remove_entries_for(annotation.uri())?;
        self.remove_member(annotation.uri())
    }

    /// Aggregate an internal body that is not aggregated yet and load its
    /// statements into the metadata store.
    fn prepare_body(&mut self, body: &Uri) -> RoResult<()> {
        if !self.is_internal(body)? {
            return Ok(());
        }
        if self.aggregated_resource(body)?.is_none() {
            let thing = self.builder.build_thing(body.clone());
            self.aggregate_internal(thing, None)?;
        }
        let path = self.content_path(body)?;
        let stats = self.builder.content().get_file_info(&self.uri, &path)?;
        if is_ntriples(&stats.mime_type) {
            let content = self.builder.content().get_file(&self.uri, &path)?;
            self.store_body_graph(body, &content, &stats.mime_type)?;
        }
        Ok(())
    }

    /// Parse an N-Triples body; `None` for other media types.
    fn parse_body(&self, body: &Uri, content: &[u8], mime_type: &str) -> RoResult<Option<Graph>> {
        if !is_ntriples(mime_type) {
            return Ok(None);
        }
        let text = std::str::from_utf8(content)
            .map_err(|e| RoError::BadRequest(format!("annotation body {body} is not UTF-8: {e}")))?;
        Ok(Some(ntriples::parse(text, Some(&self.uri))?))
    }

    /// Parse an N-Triples body and store it as the named graph `body`.
    /// Other media types are left alone.
    pub(crate) fn store_body_graph(&self, body: &Uri, content: &[u8], mime_type: &str) -> RoResult<()> {
        if let Some(graph) = self.parse_body(body, content, mime_type)? {
            self.builder.graphs().write_graph(body, &graph)?;
            debug!(ro = %self.uri, body = %body, triples = graph.len(), "stored annotation body graph");
        }
        Ok(())
    }

    /// Put back the bytes a failed [`annotate_with_body`](Self::annotate_with_body)
    /// overwrote, or drop the file it created.
    fn restore_body(&self, path: &str, previous: Option<(Vec<u8>, String)>) {
        let content = self.builder.content();
        let restored = match &previous {
            Some((bytes, mime_type)) => content.put_file(&self.uri, path, bytes, mime_type).map(drop),
            None => content.delete_file(&self.uri, path).map(drop),
        };
        if let Err(e) = restored {
            warn!(ro = %self.uri, path, error = %e, "could not restore annotation body");
        }
    }

    fn resolve_body(&self, body: &str) -> RoResult<Uri> {
        let body = self.uri.resolve(body)?;
        self.ensure_not_reserved(&body)?;
        Ok(body)
    }

    fn resolve_targets(&self, targets: &[&str]) -> RoResult<BTreeSet<Uri>> {
        if targets.is_empty() {
            return Err(RoError::BadRequest("An annotation must have at least one target".into()));
        }
        let mut resolved = BTreeSet::new();
        for target in targets {
            let uri = self.uri.resolve(target)?;
            if !self.is_uri_used(&uri)? {
                return Err(RoError::BadRequest(format!(
                    "Annotation target {uri} is not part of the research object"
                )));
            }
            resolved.insert(uri);
        }
        Ok(resolved)
    }

    /// An annotation the user may change: aggregated, and not the reserved
    /// evolution annotation.
    fn user_annotation(&self, uri: &Uri) -> RoResult<AggregatedResource> {
        let annotation = self
            .aggregated_resource(uri)?
            .filter(|r| r.is_annotation())
            .cloned()
            .ok_or_else(|| RoError::NotFound(format!("annotation {uri}")))?;
        if self.is_evo_annotation(&annotation) {
            return Err(RoError::Forbidden(format!(
                "annotation {uri} is managed by the system"
            )));
        }
        Ok(annotation)
    }
}
