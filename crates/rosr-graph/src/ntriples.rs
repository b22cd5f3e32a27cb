//! N-Triples reader and writer.
//!
//! Graphs mirrored into a research object's content are written with IRIs
//! relative to the research object's base, so the files stay valid when the
//! whole object is moved or copied. Reading resolves relative IRIs against
//! the supplied base; a relative IRI with no base is a parse error.
//!
//! Relative IRIs are not part of N-Triples proper. Documents written with a
//! base are labelled [`RELATIVE_MEDIA_TYPE`]; only documents written
//! without one are [`MEDIA_TYPE`].

use rosr_types::Uri;
use tracing::debug;

use crate::error::{GraphError, GraphResult};
use crate::graph::Graph;
use crate::term::{Literal, Term, Triple};

/// Media type of N-Triples documents.
pub const MEDIA_TYPE: &str = "application/n-triples";

/// Media type of documents written with a base: N-Triples syntax whose
/// IRIs may be relative to the containing research object.
pub const RELATIVE_MEDIA_TYPE: &str = "application/x-rosr-relative-n-triples";

/// The media type of a document written by [`write`] with `base`.
pub fn media_type(base: Option<&Uri>) -> &'static str {
    match base {
        Some(_) => RELATIVE_MEDIA_TYPE,
        None => MEDIA_TYPE,
    }
}

/// Serialize a graph, one statement per line, in deterministic order.
///
/// IRIs under `base` are written relative to it.
pub fn write(graph: &Graph, base: Option<&Uri>) -> String {
    let mut out = String::new();
    for triple in graph {
        write_term(&mut out, &triple.subject, base);
        out.push(' ');
        write_iri(&mut out, &triple.predicate, base);
        out.push(' ');
        write_term(&mut out, &triple.object, base);
        out.push_str(" .\n");
    }
    out
}

fn write_term(out: &mut String, term: &Term, base: Option<&Uri>) {
    match term {
        Term::Iri(iri) => write_iri(out, iri, base),
        Term::Blank(id) => {
            out.push_str("_:");
            out.push_str(id);
        }
        Term::Literal(lit) => {
            out.push('"');
            escape_into(out, &lit.value);
            out.push('"');
            if let Some(lang) = &lit.language {
                out.push('@');
                out.push_str(lang);
            } else if let Some(datatype) = &lit.datatype {
                out.push_str("^^<");
                out.push_str(datatype);
                out.push('>');
            }
        }
    }
}

fn write_iri(out: &mut String, iri: &str, base: Option<&Uri>) {
    out.push('<');
    out.push_str(&relative_form(iri, base));
    out.push('>');
}

fn relative_form(iri: &str, base: Option<&Uri>) -> String {
    let Some(base) = base else {
        return iri.to_string();
    };
    let Ok(uri) = Uri::parse(iri) else {
        return iri.to_string();
    };
    match base.relativize(&uri) {
        // `<>` resolves to the base itself; anything else that relativizes
        // to nothing (the base without its slash) stays absolute.
        Some(relative) if relative.is_empty() && uri != *base => iri.to_string(),
        // A leading-colon or scheme-like segment would read back as absolute.
        Some(relative) if relative.split('/').next().is_some_and(|s| s.contains(':')) => {
            iri.to_string()
        }
        Some(relative) => relative,
        None => iri.to_string(),
    }
}

fn escape_into(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
}

/// Parse an N-Triples document.
pub fn parse(input: &str, base: Option<&Uri>) -> GraphResult<Graph> {
    let mut graph = Graph::new();
    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let mut cursor = Cursor::new(line, line_no, base);
        cursor.skip_ws();
        if cursor.at_end() || cursor.peek() == Some('#') {
            continue;
        }
        let subject = cursor.subject()?;
        cursor.skip_ws();
        let predicate = cursor.iri()?;
        cursor.skip_ws();
        let object = cursor.object()?;
        cursor.skip_ws();
        cursor.expect('.')?;
        cursor.skip_ws();
        if !cursor.at_end() && cursor.peek() != Some('#') {
            return Err(cursor.error("trailing characters after statement"));
        }
        graph.insert_triple(Triple::new(subject, predicate, object));
    }
    debug!(triples = graph.len(), "parsed n-triples document");
    Ok(graph)
}

struct Cursor<'a> {
    rest: &'a str,
    line: usize,
    base: Option<&'a Uri>,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str, line_no: usize, base: Option<&'a Uri>) -> Self {
        Self {
            rest: line,
            line: line_no,
            base,
        }
    }

    fn error(&self, reason: impl Into<String>) -> GraphError {
        GraphError::Parse {
            line: self.line,
            reason: reason.into(),
        }
    }

    fn at_end(&self) -> bool {
        self.rest.is_empty()
    }

    fn peek(&self) -> Option<char> {
        self.rest.chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.rest = &self.rest[c.len_utf8()..];
        Some(c)
    }

    fn skip_ws(&mut self) {
        self.rest = self.rest.trim_start_matches([' ', '\t']);
    }

    fn expect(&mut self, expected: char) -> GraphResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected '{expected}', found '{c}'"))),
            None => Err(self.error(format!("expected '{expected}', found end of line"))),
        }
    }

    fn subject(&mut self) -> GraphResult<Term> {
        match self.peek() {
            Some('<') => Ok(Term::Iri(self.iri()?)),
            Some('_') => self.blank(),
            _ => Err(self.error("subject must be an IRI or blank node")),
        }
    }

    fn object(&mut self) -> GraphResult<Term> {
        match self.peek() {
            Some('<') => Ok(Term::Iri(self.iri()?)),
            Some('_') => self.blank(),
            Some('"') => self.literal(),
            _ => Err(self.error("object must be an IRI, blank node or literal")),
        }
    }

    fn raw_iri(&mut self) -> GraphResult<String> {
        self.expect('<')?;
        let end = self
            .rest
            .find('>')
            .ok_or_else(|| self.error("unterminated IRI"))?;
        let raw = unescape(&self.rest[..end]).map_err(|reason| self.error(reason))?;
        self.rest = &self.rest[end + 1..];
        Ok(raw)
    }

    fn iri(&mut self) -> GraphResult<String> {
        let raw = self.raw_iri()?;
        resolve(&raw, self.base)
    }

    fn blank(&mut self) -> GraphResult<Term> {
        self.expect('_')?;
        self.expect(':')?;
        let end = self
            .rest
            .find(char::is_whitespace)
            .unwrap_or(self.rest.len());
        // Labels may contain dots but never end with one; a trailing dot is
        // the statement terminator.
        let label = self.rest[..end].trim_end_matches('.');
        if label.is_empty() {
            return Err(self.error("empty blank node label"));
        }
        self.rest = &self.rest[label.len()..];
        Ok(Term::Blank(label.to_string()))
    }

    fn literal(&mut self) -> GraphResult<Term> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                None => return Err(self.error("unterminated literal")),
                Some('"') => break,
                Some('\\') => {
                    let decoded = self.escape()?;
                    value.push(decoded);
                }
                Some(c) => value.push(c),
            }
        }
        let mut lit = Literal {
            value,
            datatype: None,
            language: None,
        };
        if self.rest.starts_with("^^") {
            self.rest = &self.rest[2..];
            lit.datatype = Some(self.iri()?);
        } else if self.peek() == Some('@') {
            self.bump();
            let end = self
                .rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
                .unwrap_or(self.rest.len());
            if end == 0 {
                return Err(self.error("empty language tag"));
            }
            lit.language = Some(self.rest[..end].to_string());
            self.rest = &self.rest[end..];
        }
        Ok(Term::Literal(lit))
    }

    fn escape(&mut self) -> GraphResult<char> {
        match self.bump() {
            Some('t') => Ok('\t'),
            Some('n') => Ok('\n'),
            Some('r') => Ok('\r'),
            Some('b') => Ok('\u{8}'),
            Some('f') => Ok('\u{c}'),
            Some('"') => Ok('"'),
            Some('\'') => Ok('\''),
            Some('\\') => Ok('\\'),
            Some('u') => self.hex_escape(4),
            Some('U') => self.hex_escape(8),
            Some(c) => Err(self.error(format!("unknown escape '\\{c}'"))),
            None => Err(self.error("dangling escape")),
        }
    }

    fn hex_escape(&mut self, digits: usize) -> GraphResult<char> {
        let hex = self.rest.get(..digits).ok_or_else(|| self.error("truncated unicode escape"))?;
        let c = decode_hex(hex, digits).map_err(|reason| self.error(reason))?;
        self.rest = &self.rest[digits..];
        Ok(c)
    }
}

/// Decode exactly `digits` ASCII hex digits into a character.
fn decode_hex(hex: &str, digits: usize) -> Result<char, String> {
    if hex.len() != digits || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(format!("bad unicode escape {hex:?}"));
    }
    let code = u32::from_str_radix(hex, 16).map_err(|e| e.to_string())?;
    char::from_u32(code).ok_or_else(|| format!("invalid code point U+{code:X}"))
}

fn unescape(raw: &str) -> Result<String, String> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let digits = match chars.next() {
            Some('u') => 4,
            Some('U') => 8,
            other => return Err(format!("invalid IRI escape {other:?}")),
        };
        let hex: String = chars.by_ref().take(digits).collect();
        out.push(decode_hex(&hex, digits)?);
    }
    Ok(out)
}

/// Resolve an IRI as read from a document to its absolute, normalized form.
fn resolve(raw: &str, base: Option<&Uri>) -> GraphResult<String> {
    let resolved = match base {
        Some(base) => base.resolve(raw),
        None => Uri::parse(raw),
    };
    match resolved {
        Ok(uri) => Ok(uri.as_str().to_string()),
        Err(e) => Err(GraphError::InvalidIri {
            iri: raw.to_string(),
            reason: e.to_string(),
        }),
    }
}
