//! Span-preserving YAML editing.
//!
//! The tree is built from `yaml-rust2` marked events. Event markers give node
//! starts; node ends are recovered from the text (quotes, plain scalars up to
//! a comment or line end, block scalars by indentation, flow collections by
//! bracket matching).

use std::ops::Range;

use serde::Serialize;
use serde_yaml::Value;
use tracing::debug;
use yaml_rust2::parser::{Event, MarkedEventReceiver, Parser};
use yaml_rust2::scanner::{Marker, TScalarStyle};

use super::{
    default_namespace, line_insertion, line_start, next_line_start, scoped_path, Edit, EditError,
    StructuralEditor,
};
use crate::config::SyntaxError;
use crate::keypath::{KeyPath, Segment};

/// Structural editor for YAML documents.
#[derive(Debug, Clone)]
pub struct YamlEditor {
    namespace: Option<String>,
}

impl Default for YamlEditor {
    fn default() -> Self {
        Self {
            namespace: default_namespace(),
        }
    }
}

impl YamlEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(namespace: Option<&str>) -> Self {
        Self {
            namespace: namespace.map(str::to_string),
        }
    }

    fn parse<'a>(&self, source: &'a [u8]) -> Result<(&'a str, Option<Node>), EditError> {
        let text = std::str::from_utf8(source)?;
        serde_yaml::from_str::<Value>(text).map_err(SyntaxError::from)?;
        Ok((text, build(text)?))
    }

    fn scope(&self, root: Option<&Node>, path: &KeyPath) -> KeyPath {
        let namespace = self.namespace.as_deref();
        let uses_namespace = namespace.is_some_and(|ns| match root {
            None | Some(Node::Scalar { empty: true, .. }) => true,
            Some(node) => node.pair(ns).is_some(),
        });
        scoped_path(path, namespace, uses_namespace)
    }
}

impl StructuralEditor for YamlEditor {
    type Value = Value;

    fn get(&self, source: &[u8], path: &KeyPath) -> Result<Value, EditError> {
        let (text, root) = self.parse(source)?;
        let path = self.scope(root.as_ref(), path);
        let found = root
            .as_ref()
            .and_then(|root| resolve(root, path.segments()))
            .ok_or_else(|| EditError::NotFound(path.to_string()))?;
        decode(text, found.node)
    }

    fn plan_set<T: Serialize + ?Sized>(
        &self,
        source: &[u8],
        path: &KeyPath,
        value: &T,
    ) -> Result<Edit, EditError> {
        let (text, root) = self.parse(source)?;
        let path = self.scope(root.as_ref(), path);
        let encoded = Encoded::new(value)?;

        let edit = match root.as_ref().and_then(|root| resolve(root, path.segments())) {
            Some(found) => plan_replace(text, &found, &encoded),
            None => plan_insert(text, root.as_ref(), &path, &encoded)?,
        }
        .with_line_endings(text);

        let patched = edit.apply(source)?;
        if let Err(err) = serde_yaml::from_slice::<Value>(&patched) {
            return Err(EditError::unresolvable(
                &path,
                format!("edited document does not parse: {err}"),
            ));
        }
        debug!(%path, start = edit.start, end = edit.end, "planned yaml edit");
        Ok(edit)
    }

    fn locate_key(&self, source: &[u8], path: &KeyPath) -> Option<Range<usize>> {
        let (_, root) = self.parse(source).ok()?;
        let path = self.scope(root.as_ref(), path);
        resolve(root.as_ref()?, path.segments()).map(|found| found.key_span)
    }
}

/// A value rendered for block context, plus its JSON form for flow context.
struct Encoded {
    block: String,
    flow: String,
    /// Non-empty sequence or mapping; must start on its own line.
    nested: bool,
}

impl Encoded {
    fn new<T: Serialize + ?Sized>(value: &T) -> Result<Self, EditError> {
        let value = serde_yaml::to_value(value).map_err(|e| EditError::Encode(e.to_string()))?;
        let block = serde_yaml::to_string(&value)
            .map_err(|e| EditError::Encode(e.to_string()))?
            .trim_end_matches('\n')
            .to_string();
        let flow = serde_json::to_string(&value).map_err(|e| EditError::Encode(e.to_string()))?;
        let nested = match &value {
            Value::Sequence(items) => !items.is_empty(),
            Value::Mapping(map) => !map.is_empty(),
            _ => false,
        };
        Ok(Self {
            block,
            flow,
            nested,
        })
    }

    fn is_single_line(&self) -> bool {
        !self.nested && !self.block.contains('\n')
    }

    /// Text following `key:` for a key at column `key_col`.
    fn after_colon(&self, key_col: usize) -> String {
        let mut lines = self.block.lines();
        let first = lines.next().unwrap_or_default();
        let rest: Vec<&str> = lines.collect();
        if self.nested {
            let all: Vec<&str> = std::iter::once(first).chain(rest).collect();
            format!("\n{}", indent_lines(&all, key_col + 2))
        } else if rest.is_empty() {
            format!(" {first}")
        } else {
            // Block scalar: the indicator stays on the key line.
            format!(" {first}\n{}", indent_lines(&rest, key_col))
        }
    }
}

fn indent_lines(lines: &[&str], by: usize) -> String {
    let pad = " ".repeat(by);
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                String::new()
            } else {
                format!("{pad}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_key(name: &str) -> String {
    serde_yaml::to_string(name)
        .map(|s| s.trim_end().to_string())
        .unwrap_or_else(|_| format!("{name:?}"))
}

fn column(text: &str, offset: usize) -> usize {
    offset - line_start(text, offset)
}

fn decode(text: &str, node: &Node) -> Result<Value, EditError> {
    let span = node.span();
    let raw = &text[span.clone()];
    match node {
        Node::Scalar { empty: true, .. } => Ok(Value::Null),
        // Block scalar lines keep their indentation relative to a key.
        Node::Scalar { .. } => {
            let mut wrapper: serde_yaml::Mapping =
                serde_yaml::from_str(&format!("value: {raw}")).map_err(SyntaxError::from)?;
            Ok(wrapper.remove("value").unwrap_or(Value::Null))
        }
        _ => {
            let padded = format!("{}{raw}", " ".repeat(column(text, span.start)));
            let value = serde_yaml::from_str(&dedent(&padded)).map_err(SyntaxError::from)?;
            Ok(value)
        }
    }
}

fn dedent(s: &str) -> String {
    let indent = s
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);
    s.lines()
        .map(|line| line.get(indent..).unwrap_or_default())
        .collect::<Vec<_>>()
        .join("\n")
}

fn plan_replace(text: &str, found: &Found<'_>, encoded: &Encoded) -> Edit {
    let span = found.node.span();
    match found.pair {
        Some(pair) if !pair.flow => {
            if encoded.is_single_line() && found.node.is_inline(text, pair.colon) {
                Edit::replace(span, encoded.block.clone())
            } else {
                let key_col = column(text, pair.key_span.start);
                let end = span.end.max(pair.colon + 1);
                Edit::replace(pair.colon + 1..end, encoded.after_colon(key_col))
            }
        }
        Some(_) if found.node.is_empty() => Edit::replace(span, format!(" {}", encoded.flow)),
        _ => Edit::replace(span, encoded.flow.clone()),
    }
}

fn plan_insert(
    text: &str,
    root: Option<&Node>,
    path: &KeyPath,
    encoded: &Encoded,
) -> Result<Edit, EditError> {
    let segments = path.segments();
    let Some(root) = root else {
        ensure_unindexed(path, segments)?;
        return Ok(Edit::insert(0, line_insertion(text, 0, &chain(segments, 0, encoded))));
    };

    let (depth, node, holder) = deepest(root, path)?;
    let remaining = &segments[depth..];
    if remaining.is_empty() {
        return Err(EditError::unresolvable(path, "path already exists"));
    }
    ensure_unindexed(path, remaining)?;

    match node {
        Node::Mapping {
            flow: false,
            span,
            entries,
        } => {
            let indent = entries
                .first()
                .map_or(0, |pair| column(text, pair.key_span.start));
            let at = next_line_start(text, span.end);
            Ok(Edit::insert(
                at,
                line_insertion(text, at, &chain(remaining, indent, encoded)),
            ))
        }
        Node::Mapping {
            flow: true,
            span,
            entries,
        } => {
            let (first, rest) = remaining.split_first().ok_or_else(|| {
                EditError::unresolvable(path, "nothing to insert")
            })?;
            let inner = rest.iter().rev().fold(encoded.flow.clone(), |inner, segment| {
                format!("{{{}: {inner}}}", format_key(&segment.name))
            });
            let entry = format!("{}: {inner}", format_key(&first.name));
            Ok(match entries.last() {
                Some(last) => Edit::insert(last.value_end(), format!(", {entry}")),
                None => Edit::replace(span.clone(), format!("{{{entry}}}")),
            })
        }
        Node::Scalar { empty: true, span } => match holder {
            Some(pair) if !pair.flow => {
                let key_col = column(text, pair.key_span.start);
                Ok(Edit::insert(
                    span.start,
                    format!("\n{}", chain(remaining, key_col + 2, encoded)),
                ))
            }
            None if depth == 0 => Ok(Edit::insert(
                text.len(),
                line_insertion(text, text.len(), &chain(remaining, 0, encoded)),
            )),
            _ => Err(EditError::unresolvable(path, "parent is not a block mapping")),
        },
        _ => Err(EditError::unresolvable(path, "parent is not a mapping")),
    }
}

fn ensure_unindexed(path: &KeyPath, segments: &[Segment]) -> Result<(), EditError> {
    if segments.iter().any(|s| s.index.is_some()) {
        return Err(EditError::unresolvable(path, "cannot create array elements"));
    }
    Ok(())
}

/// Nested `key:` lines for `segments`, the last one holding the value.
fn chain(segments: &[Segment], indent: usize, encoded: &Encoded) -> String {
    segments
        .iter()
        .enumerate()
        .map(|(depth, segment)| {
            let col = indent + 2 * depth;
            let key = format_key(&segment.name);
            if depth + 1 == segments.len() {
                format!("{}{key}:{}", " ".repeat(col), encoded.after_colon(col))
            } else {
                format!("{}{key}:", " ".repeat(col))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct Found<'d> {
    node: &'d Node,
    /// The mapping entry holding `node`, unless the path ends in an index.
    pair: Option<&'d Pair>,
    key_span: Range<usize>,
}

fn resolve<'d>(root: &'d Node, segments: &[Segment]) -> Option<Found<'d>> {
    let mut found = Found {
        node: root,
        pair: None,
        key_span: 0..0,
    };
    for segment in segments {
        let pair = found.node.pair(&segment.name)?;
        found = Found {
            node: &pair.value,
            pair: Some(pair),
            key_span: pair.key_span.clone(),
        };
        if let Some(index) = segment.index {
            found.node = found.node.item(index)?;
            found.pair = None;
        }
    }
    Some(found)
}

/// Walks as far as `path` exists. Returns how many segments matched, the
/// last node reached and the entry holding it.
fn deepest<'d>(
    root: &'d Node,
    path: &KeyPath,
) -> Result<(usize, &'d Node, Option<&'d Pair>), EditError> {
    let mut node = root;
    let mut holder = None;
    for (depth, segment) in path.segments().iter().enumerate() {
        let Some(pair) = node.pair(&segment.name) else {
            return Ok((depth, node, holder));
        };
        node = &pair.value;
        holder = Some(pair);
        if let Some(index) = segment.index {
            node = node.item(index).ok_or_else(|| {
                EditError::unresolvable(path, format!("{} has no element {index}", segment.name))
            })?;
            holder = None;
        }
    }
    Ok((path.len(), node, holder))
}

#[derive(Debug)]
enum Node {
    Scalar {
        span: Range<usize>,
        /// No value was written; `span` is empty and sits after the colon.
        empty: bool,
    },
    Sequence {
        span: Range<usize>,
        items: Vec<Node>,
    },
    Mapping {
        span: Range<usize>,
        flow: bool,
        entries: Vec<Pair>,
    },
}

impl Node {
    fn span(&self) -> Range<usize> {
        match self {
            Node::Scalar { span, .. } | Node::Sequence { span, .. } | Node::Mapping { span, .. } => {
                span.clone()
            }
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self, Node::Scalar { empty: true, .. })
    }

    /// Written on the same line as its key and not a block scalar.
    fn is_inline(&self, text: &str, colon: usize) -> bool {
        let span = self.span();
        !self.is_empty()
            && span.start > colon
            && !text[colon..span.start].contains('\n')
            && !matches!(text.as_bytes().get(span.start), Some(b'|' | b'>'))
    }

    fn pair(&self, key: &str) -> Option<&Pair> {
        match self {
            Node::Mapping { entries, .. } => entries.iter().find(|pair| pair.key == key),
            _ => None,
        }
    }

    fn item(&self, index: usize) -> Option<&Node> {
        match self {
            Node::Sequence { items, .. } => items.get(index),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Pair {
    key: String,
    key_span: Range<usize>,
    colon: usize,
    /// Entry of a `{...}` mapping.
    flow: bool,
    value: Node,
}

impl Pair {
    fn value_end(&self) -> usize {
        if self.value.is_empty() {
            self.colon + 1
        } else {
            self.value.span().end
        }
    }
}

fn build(text: &str) -> Result<Option<Node>, EditError> {
    let mut builder = TreeBuilder::new(text);
    let mut parser = Parser::new_from_str(text);
    if let Err(err) = parser.load(&mut builder, false) {
        return Err(EditError::Malformed {
            offset: builder.byte(err.marker().index()),
            message: err.to_string(),
        });
    }
    Ok(builder.root)
}

enum Open {
    Sequence {
        start: usize,
        flow: bool,
        items: Vec<Node>,
    },
    Mapping {
        start: usize,
        flow: bool,
        entries: Vec<Pair>,
        pending: Option<(String, Range<usize>)>,
    },
}

impl Open {
    fn is_flow(&self) -> bool {
        match self {
            Open::Sequence { flow, .. } | Open::Mapping { flow, .. } => *flow,
        }
    }
}

struct TreeBuilder<'a> {
    text: &'a str,
    /// Byte offset of each char index, plus one past the end.
    offsets: Vec<usize>,
    stack: Vec<Open>,
    root: Option<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn new(text: &'a str) -> Self {
        let offsets = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(text.len()))
            .collect();
        Self {
            text,
            offsets,
            stack: Vec::new(),
            root: None,
        }
    }

    fn byte(&self, char_index: usize) -> usize {
        self.offsets
            .get(char_index)
            .copied()
            .unwrap_or(self.text.len())
    }

    fn in_flow(&self) -> bool {
        self.stack.iter().any(Open::is_flow)
    }

    fn scalar(&mut self, value: String, at: usize, empty: bool) {
        let text = self.text;
        let flow = self.in_flow();
        if let Some(Open::Mapping { pending: pending @ None, .. }) = self.stack.last_mut() {
            let end = if empty {
                at
            } else {
                scalar_end(text, at, Context::Key { flow })
            };
            *pending = Some((value, at..end));
            return;
        }
        let span = if empty {
            at..at
        } else if flow {
            at..scalar_end(text, at, Context::Flow)
        } else {
            let owner = self.owner_column(at);
            at..scalar_end(text, at, Context::Block { owner })
        };
        self.complete(Node::Scalar { span, empty });
    }

    /// Column a continuation line of a block value at `at` must exceed: the
    /// value's key, or the dash of its sequence entry.
    fn owner_column(&self, at: usize) -> Option<usize> {
        match self.stack.last()? {
            Open::Mapping {
                pending: Some((_, key_span)),
                ..
            } => Some(column(self.text, key_span.start)),
            Open::Sequence { .. } => dash_before(self.text, at).map(|dash| column(self.text, dash)),
            Open::Mapping { pending: None, .. } => None,
        }
    }

    fn complete(&mut self, node: Node) {
        let text = self.text;
        match self.stack.last_mut() {
            None => self.root = Some(node),
            Some(Open::Sequence { items, .. }) => items.push(node),
            Some(Open::Mapping {
                entries,
                pending,
                flow,
                ..
            }) => match pending.take() {
                // Complex keys are kept only for their span.
                None => *pending = Some((String::new(), node.span())),
                Some((key, key_span)) => {
                    let colon = find_colon(text, key_span.end);
                    let value = match node {
                        Node::Scalar { empty: true, .. } => Node::Scalar {
                            span: colon + 1..colon + 1,
                            empty: true,
                        },
                        other => other,
                    };
                    entries.push(Pair {
                        key,
                        key_span,
                        colon,
                        flow: *flow,
                        value,
                    });
                }
            },
        }
    }

    fn close(&mut self) {
        let text = self.text;
        let node = match self.stack.pop() {
            Some(Open::Sequence { start, flow, items }) => {
                let span = if flow {
                    start..flow_end(text, start)
                } else {
                    let start = items
                        .first()
                        .map_or(start, |item| dash_before(text, item.span().start).unwrap_or(start));
                    let end = items.last().map_or(start, |item| item.span().end);
                    start..end
                };
                Node::Sequence { span, items }
            }
            Some(Open::Mapping {
                start,
                flow,
                entries,
                ..
            }) => {
                let span = if flow {
                    start..flow_end(text, start)
                } else {
                    let start = entries.first().map_or(start, |pair| pair.key_span.start);
                    let end = entries.last().map_or(start, Pair::value_end);
                    start..end
                };
                Node::Mapping {
                    span,
                    flow,
                    entries,
                }
            }
            None => return,
        };
        self.complete(node);
    }
}

impl MarkedEventReceiver for TreeBuilder<'_> {
    fn on_event(&mut self, event: Event, marker: Marker) {
        let at = self.byte(marker.index());
        let byte = self.text.as_bytes().get(at).copied();
        match event {
            Event::Scalar(value, style, ..) => {
                // Missing values arrive as a plain `~` that isn't in the text.
                let empty = style == TScalarStyle::Plain && value == "~" && byte != Some(b'~');
                self.scalar(value, at, empty);
            }
            Event::Alias(_) => self.scalar(String::new(), at, false),
            Event::SequenceStart(..) => self.stack.push(Open::Sequence {
                start: at,
                flow: byte == Some(b'['),
                items: Vec::new(),
            }),
            Event::MappingStart(..) => self.stack.push(Open::Mapping {
                start: at,
                flow: byte == Some(b'{'),
                entries: Vec::new(),
                pending: None,
            }),
            Event::SequenceEnd | Event::MappingEnd => self.close(),
            _ => {}
        }
    }
}

fn find_colon(text: &str, from: usize) -> usize {
    let bytes = text.as_bytes();
    let mut i = from;
    while matches!(bytes.get(i), Some(b' ' | b'\t')) {
        i += 1;
    }
    if bytes.get(i) == Some(&b':') {
        i
    } else {
        from
    }
}

fn dash_before(text: &str, item_start: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    let mut i = item_start;
    while i > 0 && matches!(bytes[i - 1], b' ' | b'\t') {
        i -= 1;
    }
    (i > 0 && bytes[i - 1] == b'-').then(|| i - 1)
}

/// Where a scalar sits, for finding its end.
#[derive(Debug, Clone, Copy)]
enum Context {
    Key { flow: bool },
    Flow,
    /// A block value; continuation lines must be indented past `owner`.
    Block { owner: Option<usize> },
}

fn scalar_end(text: &str, at: usize, context: Context) -> usize {
    match (text.as_bytes().get(at), context) {
        (Some(b'"' | b'\''), _) => quoted_end(text, at),
        (Some(b'|' | b'>'), Context::Block { .. }) => block_scalar_end(text, at),
        _ => plain_end(text, at, context),
    }
}

fn quoted_end(text: &str, at: usize) -> usize {
    let bytes = text.as_bytes();
    let quote = bytes[at];
    let mut i = at + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' if quote == b'"' => i += 2,
            b'\'' if quote == b'\'' && bytes.get(i + 1) == Some(&b'\'') => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Why a plain scalar's text stopped on a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    LineEnd,
    Comment,
    /// `: ` or, in flow context, `,` `]` `}`.
    Indicator,
}

/// End of the plain text starting at `at` on its line, without trailing
/// blanks.
fn plain_segment(text: &str, at: usize, flow: bool) -> (usize, Stop) {
    let bytes = text.as_bytes();
    let mut i = at;
    let mut stop = Stop::LineEnd;
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();
        if b == b'\n' || b == b'\r' {
            break;
        }
        if b == b'#' && i > at && matches!(bytes[i - 1], b' ' | b'\t') {
            stop = Stop::Comment;
            break;
        }
        let mapping_indicator = b == b':'
            && (matches!(next, None | Some(b' ' | b'\t' | b'\n' | b'\r'))
                || (flow && matches!(next, Some(b',' | b'}' | b']'))));
        if mapping_indicator || (flow && matches!(b, b',' | b']' | b'}')) {
            stop = Stop::Indicator;
            break;
        }
        i += 1;
    }
    while i > at && matches!(bytes[i - 1], b' ' | b'\t') {
        i -= 1;
    }
    (i, stop)
}

/// End of a plain scalar, following continuation lines for values.
fn plain_end(text: &str, at: usize, context: Context) -> usize {
    let (mut end, stop) = match context {
        Context::Key { flow } => return plain_segment(text, at, flow).0,
        Context::Flow => plain_segment(text, at, true),
        Context::Block { .. } => plain_segment(text, at, false),
    };
    if stop != Stop::LineEnd {
        return end;
    }

    let mut pos = next_line_start(text, end);
    while pos < text.len() {
        let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
        let line = text[pos..line_end].trim_end_matches('\r');
        let content = line.trim_start_matches([' ', '\t']);
        let content_start = pos + (line.len() - content.len());
        pos = line_end + 1;
        if content.is_empty() {
            continue;
        }
        if content.starts_with('#') {
            break;
        }

        let (segment_end, stop) = match context {
            Context::Block { owner } => {
                if owner.map_or(true, |owner| indent_width(line) <= owner) {
                    break;
                }
                let (segment_end, stop) = plain_segment(text, content_start, false);
                if stop == Stop::Indicator {
                    // A `key:` line starts the next entry.
                    break;
                }
                (segment_end, stop)
            }
            _ => plain_segment(text, content_start, true),
        };
        if segment_end > content_start {
            end = segment_end;
        }
        if stop != Stop::LineEnd {
            break;
        }
    }
    end
}

/// End of the last content line indented deeper than the indicator's line.
fn block_scalar_end(text: &str, at: usize) -> usize {
    let base = indent_width(&text[line_start(text, at)..]);
    let first_end = text[at..].find('\n').map_or(text.len(), |i| at + i);
    let mut end = at + text[at..first_end].trim_end_matches('\r').len();
    let mut pos = next_line_start(text, at);
    while pos < text.len() {
        let line_end = text[pos..].find('\n').map_or(text.len(), |i| pos + i);
        let line = text[pos..line_end].trim_end_matches('\r');
        if !line.trim().is_empty() {
            if indent_width(line) <= base {
                break;
            }
            end = pos + line.len();
        }
        pos = line_end + 1;
    }
    end
}

fn indent_width(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

/// Offset just past the bracket closing the flow collection opened at `at`.
fn flow_end(text: &str, at: usize) -> usize {
    let bytes = text.as_bytes();
    let mut depth = 0usize;
    let mut i = at;
    while i < bytes.len() {
        match bytes[i] {
            b'[' | b'{' => depth += 1,
            b']' | b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return i + 1;
                }
            }
            b'"' | b'\'' if opens_quote(bytes, at, i) => {
                i = quoted_end(text, i);
                continue;
            }
            b'#' if i > at && matches!(bytes[i - 1], b' ' | b'\t' | b'\n') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
                continue;
            }
            _ => {}
        }
        i += 1;
    }
    bytes.len()
}

/// A quote opens a quoted scalar only where a flow node may start.
fn opens_quote(bytes: &[u8], start: usize, i: usize) -> bool {
    bytes[start..i]
        .iter()
        .rev()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|b| matches!(b, b'[' | b'{' | b',' | b':'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(s: &str) -> KeyPath {
        KeyPath::parse(s).unwrap()
    }

    fn set(src: &str, key: &str, value: impl Serialize) -> String {
        let out = YamlEditor::new().set(src.as_bytes(), &path(key), &value).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn get(src: &str, key: &str) -> Value {
        YamlEditor::new().get(src.as_bytes(), &path(key)).unwrap()
    }

    #[test]
    fn test_replace_nested_scalar_changes_only_value() {
        let src = "markata-go:\n  theme:\n    palette: light\n";
        assert_eq!(
            set(src, "theme.palette", "dark"),
            "markata-go:\n  theme:\n    palette: dark\n"
        );
    }

    #[test]
    fn test_comments_survive() {
        let src = "# site\nmarkata-go:\n  title: Old  # keep\n  url: x\n";
        assert_eq!(
            set(src, "title", "New"),
            "# site\nmarkata-go:\n  title: New  # keep\n  url: x\n"
        );
    }

    #[test]
    fn test_insert_into_existing_mapping() {
        let src = "markata-go:\n  title: a\n  theme:\n    palette: light\n";
        let out = set(src, "theme.name", "x");
        assert_eq!(
            out,
            "markata-go:\n  title: a\n  theme:\n    palette: light\n    name: x\n"
        );

        let out = set(src, "url", "https://example.com");
        assert!(out.starts_with(src));
        assert_eq!(get(&out, "url"), Value::String("https://example.com".into()));
    }

    #[test]
    fn test_insert_creates_nested_chain() {
        let out = set("markata-go:\n  title: a\n", "seo.og_image", "x.png");
        assert_eq!(out, "markata-go:\n  title: a\n  seo:\n    og_image: x.png\n");
    }

    #[test]
    fn test_empty_document_gets_namespace() {
        let out = set("", "title", "Site");
        assert_eq!(out, "markata-go:\n  title: Site\n");
        assert_eq!(get(&out, "title"), Value::String("Site".into()));
    }

    #[test]
    fn test_null_values() {
        let src = "markata-go:\n  theme:\n  title: a\n";
        assert_eq!(get(src, "theme"), Value::Null);
        assert_eq!(
            set(src, "theme.palette", "dark"),
            "markata-go:\n  theme:\n    palette: dark\n  title: a\n"
        );
        assert_eq!(set(src, "theme", "x"), "markata-go:\n  theme: x\n  title: a\n");
    }

    #[test]
    fn test_replace_block_sequence() {
        let src = "markata-go:\n  glob:\n    patterns:\n      - a\n      - b\n  title: t\n";
        assert_eq!(
            get(src, "glob.patterns"),
            Value::Sequence(vec!["a".into(), "b".into()])
        );
        let out = set(src, "glob.patterns", vec!["x"]);
        assert_eq!(
            out,
            "markata-go:\n  glob:\n    patterns:\n      - x\n  title: t\n"
        );
        assert_eq!(get(&out, "title"), Value::String("t".into()));
    }

    #[test]
    fn test_scalar_becomes_list() {
        let src = "markata-go:\n  hooks: default\n";
        let out = set(src, "hooks", vec!["a", "b"]);
        assert_eq!(out, "markata-go:\n  hooks:\n    - a\n    - b\n");
    }

    #[test]
    fn test_sequence_elements() {
        let src = "markata-go:\n  nav:\n    - title: Home\n      url: /\n    - title: Blog\n      url: /blog/\n";
        assert_eq!(get(src, "nav[1].title"), Value::String("Blog".into()));
        let out = set(src, "nav[0].url", "/home/");
        assert!(out.contains("      url: /home/\n    - title: Blog"));
        assert!(matches!(
            YamlEditor::new().set(src.as_bytes(), &path("nav[2].url"), "x"),
            Err(EditError::Unresolvable { .. })
        ));
    }

    #[test]
    fn test_flow_mapping() {
        let src = "markata-go: {title: a}\n";
        let out = set(src, "url", "x");
        assert_eq!(out, "markata-go: {title: a, url: \"x\"}\n");
        assert_eq!(get(&out, "url"), Value::String("x".into()));
        assert_eq!(set(src, "title", "b"), "markata-go: {title: \"b\"}\n");
    }

    #[test]
    fn test_block_scalar() {
        let src = "markata-go:\n  description: |\n    line one\n    line two\n  title: x\n";
        assert_eq!(
            get(src, "description"),
            Value::String("line one\nline two\n".into())
        );
        let out = set(src, "seo.og_image", "a.png");
        assert!(out.ends_with("  title: x\n  seo:\n    og_image: a.png\n"));
    }

    #[test]
    fn test_multi_line_plain_scalar() {
        let src = "markata-go:\n  title: My long\n    site title\n  url: x\n";
        assert_eq!(get(src, "title"), Value::String("My long site title".into()));

        let out = set(src, "title", "dark");
        assert_eq!(out, "markata-go:\n  title: dark\n  url: x\n");
        assert_eq!(get(&out, "title"), Value::String("dark".into()));
        assert_eq!(get(&out, "url"), Value::String("x".into()));

        let out = set(src, "title", vec!["a"]);
        assert_eq!(out, "markata-go:\n  title:\n    - a\n  url: x\n");
    }

    #[test]
    fn test_multi_line_scalar_in_sequence() {
        let src = "markata-go:\n  hooks:\n    - first\n      hook\n    - second\n";
        assert_eq!(
            get(src, "hooks"),
            Value::Sequence(vec!["first hook".into(), "second".into()])
        );
        let out = set(src, "hooks[0]", "one");
        assert_eq!(out, "markata-go:\n  hooks:\n    - \"one\"\n    - second\n");
    }

    #[test]
    fn test_empty_value_before_quoted_key() {
        let src = "markata-go:\n  theme:\n  \"title\": a\n";
        assert_eq!(get(src, "theme"), Value::Null);
        assert_eq!(get(src, "title"), Value::String("a".into()));
        assert_eq!(
            set(src, "theme", "x"),
            "markata-go:\n  theme: x\n  \"title\": a\n"
        );

        let quoted = "markata-go:\n  theme: \"~\"\n";
        assert_eq!(get(quoted, "theme"), Value::String("~".into()));
    }

    #[test]
    fn test_crlf_documents_keep_crlf() {
        let src = "markata-go:\r\n  title: a\r\n";
        assert_eq!(set(src, "title", "b"), "markata-go:\r\n  title: b\r\n");
        assert_eq!(
            set(src, "theme.palette", "dark"),
            "markata-go:\r\n  title: a\r\n  theme:\r\n    palette: dark\r\n"
        );
    }

    #[test]
    fn test_unnamespaced_document() {
        let src = "title: a\nurl: b\n";
        assert_eq!(set(src, "url", "c"), "title: a\nurl: c\n");
        assert_eq!(get(src, "title"), Value::String("a".into()));
    }

    #[test]
    fn test_invalid_yaml() {
        assert!(matches!(
            YamlEditor::new().set(b"a: [\n", &path("a"), "x"),
            Err(EditError::Syntax(_))
        ));
        assert!(matches!(
            YamlEditor::new().get(b"markata-go:\n  a: 1\n", &path("b")),
            Err(EditError::NotFound(_))
        ));
    }

    #[test]
    fn test_locate_key() {
        let src = "markata-go:\n  theme:\n    palette: light\n";
        let span = YamlEditor::new()
            .locate_key(src.as_bytes(), &path("theme.palette"))
            .unwrap();
        assert_eq!(&src[span], "palette");
    }
}
