//! Span-preserving TOML editing.
//!
//! A small lexer records, for every header and key/value line, the byte spans
//! of keys and values. Lookups resolve a path against those records; writes
//! splice an encoded value into the original text.

use std::collections::HashMap;
use std::ops::Range;

use ::toml::{Table, Value};
use serde::Serialize;
use tracing::debug;

use super::{
    default_namespace, line_insertion, line_start, scoped_path, Edit, EditError, StructuralEditor,
};
use crate::config::SyntaxError;
use crate::keypath::{KeyPath, Segment};

/// Structural editor for TOML documents.
#[derive(Debug, Clone)]
pub struct TomlEditor {
    namespace: Option<String>,
}

impl Default for TomlEditor {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl TomlEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `namespace` as the wrapping table instead of `markata-go`;
    /// `None` resolves every path from the document root.
    pub fn with_namespace(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
        }
    }

    fn parse<'a>(&self, source: &'a [u8]) -> Result<(&'a str, Document), EditError> {
        let text = std::str::from_utf8(source)?;
        text.parse::<Table>().map_err(SyntaxError::from)?;
        let doc = Document::parse(text)?;
        Ok((text, doc))
    }

    fn scope(&self, doc: &Document, path: &KeyPath) -> KeyPath {
        let namespace = self.namespace.as_deref();
        let uses_namespace = namespace.is_some_and(|ns| doc.is_empty() || doc.mentions(ns));
        scoped_path(path, namespace, uses_namespace)
    }
}

impl StructuralEditor for TomlEditor {
    type Value = Value;

    fn get(&self, source: &[u8], path: &KeyPath) -> Result<Value, EditError> {
        let (text, doc) = self.parse(source)?;
        let path = self.scope(&doc, path);
        match doc.resolve(path.segments()) {
            Some(Target::Value { node, .. }) => decode_value(&text[node.span()]),
            _ => lookup(text, &path),
        }
    }

    fn plan_set<T: Serialize + ?Sized>(
        &self,
        source: &[u8],
        path: &KeyPath,
        value: &T,
    ) -> Result<Edit, EditError> {
        let (text, doc) = self.parse(source)?;
        let path = self.scope(&doc, path);
        let encoded = encode(value)?;

        let edit = match doc.resolve(path.segments()) {
            Some(Target::Value { node, .. }) => Edit::replace(node.span(), encoded),
            Some(Target::Section(_)) => {
                return Err(EditError::unresolvable(&path, "path names a table section"))
            }
            None if doc.defines_table(path.segments()) => {
                return Err(EditError::unresolvable(&path, "path names a table"))
            }
            None => doc.plan_insert(text, &path, &encoded)?,
        }
        .with_line_endings(text);

        let patched = edit.apply(source)?;
        if let Err(err) = std::str::from_utf8(&patched)?.parse::<Table>() {
            return Err(EditError::unresolvable(
                &path,
                format!("edited document does not parse: {}", err.message()),
            ));
        }
        debug!(%path, start = edit.start, end = edit.end, "planned toml edit");
        Ok(edit)
    }

    fn locate_key(&self, source: &[u8], path: &KeyPath) -> Option<Range<usize>> {
        let (_, doc) = self.parse(source).ok()?;
        let path = self.scope(&doc, path);
        match doc.resolve(path.segments())? {
            Target::Value { key_span, .. } => Some(key_span),
            Target::Section(section) => section.header.clone(),
        }
    }
}

fn decode_value(raw: &str) -> Result<Value, EditError> {
    let mut table = format!("value = {raw}\n")
        .parse::<Table>()
        .map_err(SyntaxError::from)?;
    table
        .remove("value")
        .ok_or_else(|| EditError::NotFound("value".to_string()))
}

/// Navigates the fully decoded document; used for whole tables.
fn lookup(text: &str, path: &KeyPath) -> Result<Value, EditError> {
    let table = text.parse::<Table>().map_err(SyntaxError::from)?;
    let mut current = Value::Table(table);
    for segment in path.segments() {
        let next = match current {
            Value::Table(mut table) => table.remove(&segment.name),
            _ => None,
        };
        current = match (next, segment.index) {
            (Some(value), None) => value,
            (Some(Value::Array(mut items)), Some(i)) if i < items.len() => items.swap_remove(i),
            _ => return Err(EditError::NotFound(path.to_string())),
        };
    }
    Ok(current)
}

fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String, EditError> {
    let value = Value::try_from(value).map_err(|e| EditError::Encode(e.to_string()))?;
    Ok(encode_value(&value))
}

/// Inline TOML for `value`: tables become `{ k = v }`, never headers.
fn encode_value(value: &Value) -> String {
    match value {
        Value::String(s) => encode_string(s),
        Value::Array(items) => {
            let items: Vec<_> = items.iter().map(encode_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Table(table) if table.is_empty() => "{}".to_string(),
        Value::Table(table) => {
            let entries: Vec<_> = table
                .iter()
                .map(|(k, v)| format!("{} = {}", format_key(k), encode_value(v)))
                .collect();
            format!("{{ {} }}", entries.join(", "))
        }
        other => other.to_string(),
    }
}

fn encode_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

fn is_bare_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn format_key(key: &str) -> String {
    if is_bare_key(key) {
        key.to_string()
    } else {
        encode_string(key)
    }
}

fn dotted(names: impl Iterator<Item = String>) -> String {
    names.collect::<Vec<_>>().join(".")
}

/// Leading whitespace of the line containing `offset`.
fn indentation(text: &str, offset: usize) -> &str {
    let prefix = &text[line_start(text, offset)..offset];
    if prefix.chars().all(|c| c == ' ' || c == '\t') {
        prefix
    } else {
        ""
    }
}

#[derive(Debug)]
enum Node {
    Scalar(Range<usize>),
    Array {
        span: Range<usize>,
        items: Vec<Node>,
    },
    Table {
        span: Range<usize>,
        entries: Vec<Entry>,
    },
}

impl Node {
    fn span(&self) -> Range<usize> {
        match self {
            Node::Scalar(span) => span.clone(),
            Node::Array { span, .. } | Node::Table { span, .. } => span.clone(),
        }
    }

    fn item(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Array { items, .. } => items.get(index),
            _ => None,
        }
    }
}

/// A `key = value` pair, either on its own line or inside an inline table.
#[derive(Debug)]
struct Entry {
    keys: Vec<String>,
    key_span: Range<usize>,
    value: Node,
    /// Offset just past the entry's line (or its value, when inline).
    line_end: usize,
}

/// The root table or a `[header]` / `[[header]]` and the entries under it.
#[derive(Debug)]
struct Section {
    /// Absolute path with array-of-tables elements indexed.
    path: Vec<Segment>,
    header: Option<Range<usize>>,
    header_line_end: usize,
    entries: Vec<Entry>,
    /// Start of the next header's line, or the end of the document.
    region_end: usize,
}

impl Section {
    fn append(&self, text: &str, line: &str) -> Edit {
        let (at, indent) = match self.entries.last() {
            Some(entry) => (entry.line_end, indentation(text, entry.key_span.start)),
            None if self.header.is_some() => (self.header_line_end, ""),
            None => (0, ""),
        };
        Edit::insert(at, line_insertion(text, at, &format!("{indent}{line}")))
    }
}

enum Target<'d> {
    Value { key_span: Range<usize>, node: &'d Node },
    Section(&'d Section),
}

#[derive(Debug)]
struct Document {
    sections: Vec<Section>,
}

impl Document {
    fn parse(text: &str) -> Result<Self, EditError> {
        let mut lexer = Lexer::new(text);
        let mut sections = vec![Section {
            path: Vec::new(),
            header: None,
            header_line_end: 0,
            entries: Vec::new(),
            region_end: text.len(),
        }];
        let mut counters = HashMap::new();

        loop {
            lexer.skip_trivia();
            let Some(byte) = lexer.peek() else { break };
            if byte == b'[' {
                let start = lexer.pos;
                let (keys, array) = lexer.header()?;
                let span = start..lexer.pos;
                let header_line_end = lexer.finish_line()?;
                if let Some(previous) = sections.last_mut() {
                    previous.region_end = line_start(text, start);
                }
                sections.push(Section {
                    path: header_path(&keys, array, &mut counters),
                    header: Some(span),
                    header_line_end,
                    entries: Vec::new(),
                    region_end: text.len(),
                });
            } else {
                let entry = lexer.entry()?;
                if let Some(section) = sections.last_mut() {
                    section.entries.push(entry);
                }
            }
        }

        Ok(Self { sections })
    }

    fn is_empty(&self) -> bool {
        self.sections.len() == 1 && self.sections[0].entries.is_empty()
    }

    fn mentions(&self, name: &str) -> bool {
        self.sections.iter().any(|section| {
            section.path.first().is_some_and(|s| s.name == name)
                || (section.header.is_none()
                    && section.entries.iter().any(|e| e.keys[0] == name))
        })
    }

    fn resolve(&self, path: &[Segment]) -> Option<Target<'_>> {
        if let Some(section) = self
            .sections
            .iter()
            .find(|s| s.header.is_some() && s.path == path)
        {
            return Some(Target::Section(section));
        }
        self.sections.iter().find_map(|section| {
            let rest = strip_prefix(path, &section.path)?;
            if rest.is_empty() {
                return None;
            }
            section.entries.iter().find_map(|e| descend(e, rest))
        })
    }

    /// Whether a header or dotted key below `path` already makes it a table.
    /// An unindexed segment matches every element of an array of tables.
    fn defines_table(&self, path: &[Segment]) -> bool {
        self.sections.iter().any(|section| {
            (section.header.is_some() && covers(&section.path, path))
                || section.entries.iter().any(|entry| {
                    let full: Vec<Segment> = section
                        .path
                        .iter()
                        .cloned()
                        .chain(entry.keys.iter().map(Segment::new))
                        .collect();
                    full.len() > path.len() && covers(&full, path)
                })
        })
    }

    fn plan_insert(&self, text: &str, path: &KeyPath, encoded: &str) -> Result<Edit, EditError> {
        let Some((leaf, parent)) = path.segments().split_last() else {
            return Err(EditError::unresolvable(path, "empty path"));
        };
        if leaf.index.is_some() {
            return Err(EditError::unresolvable(path, "cannot create array elements"));
        }
        let key = format_key(&leaf.name);
        let line = format!("{key} = {encoded}");

        if parent.is_empty() {
            return Ok(self.sections[0].append(text, &line));
        }
        match self.resolve(parent) {
            Some(Target::Value {
                node: Node::Table { span, entries },
                ..
            }) => {
                return Ok(match entries.last() {
                    Some(last) => Edit::insert(last.value.span().end, format!(", {line}")),
                    None => Edit::replace(span.clone(), format!("{{ {line} }}")),
                })
            }
            Some(Target::Value { .. }) => {
                return Err(EditError::unresolvable(path, "parent is not a table"))
            }
            Some(Target::Section(section)) => return Ok(section.append(text, &line)),
            None => {}
        }

        // `a.b = 1` style entries under an enclosing section.
        for section in &self.sections {
            let Some(rest) = strip_prefix(parent, &section.path) else {
                continue;
            };
            if rest.is_empty() || rest.iter().any(|s| s.index.is_some()) {
                continue;
            }
            // The longest dotted prefix already in use, e.g. `theme.palette`
            // anchors `theme.variables.x`.
            let anchor = (1..=rest.len()).rev().find_map(|n| {
                section.entries.iter().rfind(|e| {
                    e.keys.len() > n && e.keys.iter().zip(&rest[..n]).all(|(k, s)| *k == s.name)
                })
            });
            if let Some(entry) = anchor {
                let keys = rest.iter().map(|s| format_key(&s.name));
                let line = format!("{} = {encoded}", dotted(keys.chain([key.clone()])));
                let indent = indentation(text, entry.key_span.start);
                return Ok(Edit::insert(
                    entry.line_end,
                    line_insertion(text, entry.line_end, &format!("{indent}{line}")),
                ));
            }
        }

        self.insert_section(text, path, parent, &line)
    }

    /// Emits a new `[parent]` table holding `line`.
    fn insert_section(
        &self,
        text: &str,
        path: &KeyPath,
        parent: &[Segment],
        line: &str,
    ) -> Result<Edit, EditError> {
        let header = dotted(parent.iter().map(|s| format_key(&s.name)));
        let block = format!("[{header}]\n{line}\n");

        let at = match parent.iter().rposition(|s| s.index.is_some()) {
            None => text.len(),
            Some(i) => {
                let element = &parent[..=i];
                self.sections
                    .iter()
                    .filter(|s| s.path.starts_with(element))
                    .map(|s| s.region_end)
                    .max()
                    .ok_or_else(|| {
                        EditError::unresolvable(
                            path,
                            format!("no element {}", KeyPath::new(element.to_vec())),
                        )
                    })?
            }
        };

        if at < text.len() {
            return Ok(Edit::insert(at, format!("{block}\n")));
        }
        let separator = if text.is_empty() {
            ""
        } else if text.ends_with('\n') {
            "\n"
        } else {
            "\n\n"
        };
        Ok(Edit::insert(at, format!("{separator}{block}")))
    }
}

/// `defined` starts with `path`, names equal and indices equal where `path`
/// has one.
fn covers(defined: &[Segment], path: &[Segment]) -> bool {
    defined.len() >= path.len()
        && defined
            .iter()
            .zip(path)
            .all(|(d, p)| d.name == p.name && (p.index.is_none() || p.index == d.index))
}

fn strip_prefix<'p>(path: &'p [Segment], prefix: &[Segment]) -> Option<&'p [Segment]> {
    path.strip_prefix(prefix)
}

fn descend<'d>(entry: &'d Entry, rest: &[Segment]) -> Option<Target<'d>> {
    let n = entry.keys.len();
    if rest.len() < n {
        return None;
    }
    for (i, key) in entry.keys.iter().enumerate() {
        let segment = &rest[i];
        if segment.name != *key || (i + 1 < n && segment.index.is_some()) {
            return None;
        }
    }

    let mut node = &entry.value;
    if let Some(index) = rest[n - 1].index {
        node = node.item(index)?;
    }
    let rest = &rest[n..];
    if rest.is_empty() {
        return Some(Target::Value {
            key_span: entry.key_span.clone(),
            node,
        });
    }
    match node {
        Node::Table { entries, .. } => entries.iter().find_map(|e| descend(e, rest)),
        _ => None,
    }
}

/// Absolute path of a header. `[[x]]` opens element `n` of `x`; plain
/// headers below it refer to its latest element.
fn header_path(
    keys: &[String],
    array: bool,
    counters: &mut HashMap<String, usize>,
) -> Vec<Segment> {
    let mut path: Vec<Segment> = Vec::with_capacity(keys.len());
    for (i, key) in keys.iter().enumerate() {
        path.push(Segment::new(key.clone()));
        let id = KeyPath::new(path.clone()).to_string();
        let index = if array && i + 1 == keys.len() {
            let count = counters.entry(id).or_insert(0);
            *count += 1;
            Some(*count - 1)
        } else {
            counters.get(&id).map(|count| count - 1)
        };
        if let Some(segment) = path.last_mut() {
            segment.index = index;
        }
    }
    path
}

struct Lexer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn looking_at(&self, s: &str) -> bool {
        self.bytes
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(s.as_bytes()))
    }

    fn error(&self, message: impl Into<String>) -> EditError {
        EditError::Malformed {
            offset: self.pos,
            message: message.into(),
        }
    }

    fn expect(&mut self, byte: u8) -> Result<(), EditError> {
        if self.peek() == Some(byte) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error(format!("expected '{}'", byte as char)))
        }
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        if self.peek() == Some(b'#') {
            while self.peek().is_some_and(|b| b != b'\n') {
                self.pos += 1;
            }
        }
    }

    /// Skips whitespace, comments and newlines.
    fn skip_trivia(&mut self) {
        loop {
            self.skip_ws();
            self.skip_comment();
            match self.peek() {
                Some(b'\n') => self.pos += 1,
                Some(b'\r') if self.peek_at(1) == Some(b'\n') => self.pos += 2,
                _ => break,
            }
        }
    }

    /// Consumes the rest of the line and returns the offset after it.
    fn finish_line(&mut self) -> Result<usize, EditError> {
        self.skip_ws();
        self.skip_comment();
        match self.peek() {
            None => {}
            Some(b'\n') => self.pos += 1,
            Some(b'\r') if self.peek_at(1) == Some(b'\n') => self.pos += 2,
            Some(_) => return Err(self.error("expected end of line")),
        }
        Ok(self.pos)
    }

    fn header(&mut self) -> Result<(Vec<String>, bool), EditError> {
        let array = self.peek_at(1) == Some(b'[');
        self.pos += if array { 2 } else { 1 };
        let (keys, _) = self.key()?;
        self.skip_ws();
        self.expect(b']')?;
        if array {
            self.expect(b']')?;
        }
        Ok((keys, array))
    }

    fn entry(&mut self) -> Result<Entry, EditError> {
        let (keys, key_span) = self.key()?;
        self.skip_ws();
        self.expect(b'=')?;
        self.skip_ws();
        let value = self.value()?;
        let line_end = self.finish_line()?;
        Ok(Entry {
            keys,
            key_span,
            value,
            line_end,
        })
    }

    /// A possibly dotted key and the span from its first to last character.
    fn key(&mut self) -> Result<(Vec<String>, Range<usize>), EditError> {
        self.skip_ws();
        let start = self.pos;
        let mut keys = Vec::new();
        loop {
            keys.push(self.simple_key()?);
            let end = self.pos;
            self.skip_ws();
            if self.peek() == Some(b'.') {
                self.pos += 1;
                self.skip_ws();
            } else {
                return Ok((keys, start..end));
            }
        }
    }

    fn simple_key(&mut self) -> Result<String, EditError> {
        match self.peek() {
            Some(b'"') => {
                let span = self.basic_string()?;
                Ok(unescape(&self.text[span.start + 1..span.end - 1]))
            }
            Some(b'\'') => {
                let span = self.literal_string()?;
                Ok(self.text[span.start + 1..span.end - 1].to_string())
            }
            _ => {
                let start = self.pos;
                while self
                    .peek()
                    .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
                {
                    self.pos += 1;
                }
                if start == self.pos {
                    Err(self.error("expected a key"))
                } else {
                    Ok(self.text[start..self.pos].to_string())
                }
            }
        }
    }

    fn value(&mut self) -> Result<Node, EditError> {
        match self.peek() {
            Some(b'"') if self.looking_at("\"\"\"") => Ok(Node::Scalar(self.multiline_string(b'"')?)),
            Some(b'"') => Ok(Node::Scalar(self.basic_string()?)),
            Some(b'\'') if self.looking_at("'''") => Ok(Node::Scalar(self.multiline_string(b'\'')?)),
            Some(b'\'') => Ok(Node::Scalar(self.literal_string()?)),
            Some(b'[') => self.array(),
            Some(b'{') => self.inline_table(),
            Some(_) => self.bare_scalar(),
            None => Err(self.error("expected a value")),
        }
    }

    fn basic_string(&mut self) -> Result<Range<usize>, EditError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                Some(b'\\') => self.pos += 2,
                Some(b'"') => {
                    self.pos += 1;
                    return Ok(start..self.pos);
                }
                Some(b'\n') | None => return Err(self.error("unterminated string")),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn literal_string(&mut self) -> Result<Range<usize>, EditError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                Some(b'\'') => {
                    self.pos += 1;
                    return Ok(start..self.pos);
                }
                Some(b'\n') | None => return Err(self.error("unterminated string")),
                Some(_) => self.pos += 1,
            }
        }
    }

    fn multiline_string(&mut self, quote: u8) -> Result<Range<usize>, EditError> {
        let start = self.pos;
        let delimiter = [quote; 3];
        self.pos += 3;
        loop {
            match self.peek() {
                None => return Err(self.error("unterminated multi-line string")),
                Some(b'\\') if quote == b'"' => self.pos += 2,
                Some(b) if b == quote && self.bytes[self.pos..].starts_with(&delimiter) => {
                    self.pos += 3;
                    // Up to two quotes directly before the delimiter are content.
                    let mut extra = 0;
                    while extra < 2 && self.peek() == Some(quote) {
                        self.pos += 1;
                        extra += 1;
                    }
                    return Ok(start..self.pos);
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn array(&mut self) -> Result<Node, EditError> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b']') => {
                    self.pos += 1;
                    return Ok(Node::Array {
                        span: start..self.pos,
                        items,
                    });
                }
                None => return Err(self.error("unterminated array")),
                Some(_) => {}
            }
            items.push(self.value()?);
            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b']') => {}
                _ => return Err(self.error("expected ',' or ']'")),
            }
        }
    }

    fn inline_table(&mut self) -> Result<Node, EditError> {
        let start = self.pos;
        self.pos += 1;
        let mut entries = Vec::new();
        loop {
            self.skip_trivia();
            match self.peek() {
                Some(b'}') => {
                    self.pos += 1;
                    return Ok(Node::Table {
                        span: start..self.pos,
                        entries,
                    });
                }
                None => return Err(self.error("unterminated inline table")),
                Some(_) => {}
            }
            let (keys, key_span) = self.key()?;
            self.skip_ws();
            self.expect(b'=')?;
            self.skip_ws();
            let value = self.value()?;
            let line_end = value.span().end;
            entries.push(Entry {
                keys,
                key_span,
                value,
                line_end,
            });
            self.skip_trivia();
            match self.peek() {
                Some(b',') => self.pos += 1,
                Some(b'}') => {}
                _ => return Err(self.error("expected ',' or '}'")),
            }
        }
    }

    /// Numbers, booleans and date-times.
    fn bare_scalar(&mut self) -> Result<Node, EditError> {
        let start = self.pos;
        self.scan_bare();
        // 1979-05-27 07:32:00
        if is_date(&self.text[start..self.pos])
            && self.peek() == Some(b' ')
            && self.peek_at(1).is_some_and(|b| b.is_ascii_digit())
        {
            self.pos += 1;
            self.scan_bare();
        }
        if start == self.pos {
            Err(self.error("expected a value"))
        } else {
            Ok(Node::Scalar(start..self.pos))
        }
    }

    fn scan_bare(&mut self) {
        while self.peek().is_some_and(|b| {
            !matches!(
                b,
                b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}' | b'#' | b'='
            )
        }) {
            self.pos += 1;
        }
    }
}

fn is_date(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 10
        && b.iter().enumerate().all(|(i, c)| match i {
            4 | 7 => *c == b'-',
            _ => c.is_ascii_digit(),
        })
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('u') => out.extend(take_hex(&mut chars, 4)),
            Some('U') => out.extend(take_hex(&mut chars, 8)),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

fn take_hex(chars: &mut std::str::Chars<'_>, len: usize) -> Option<char> {
    let hex: String = chars.by_ref().take(len).collect();
    u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32)
}
