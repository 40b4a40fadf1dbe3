/*!
The read surface over a parsed document.

A [`Value`] is a copyable handle: a borrow of the owning [`Parser`] plus
the index of a node in its arena. Everything a value can hand out (nested
values, objects, arrays, decoded byte slices) carries the same borrow, so
none of it can outlive the next parse.

Strings and numbers are lazy. A string value keeps the raw, still-escaped
span of the input and only unescapes (into the parser's scratch arena,
memoized) when the decoded bytes are first asked for; strings without a
single `\` never pay for a copy at all. A number keeps its raw lexeme and
caches the converted double on first use. Object keys work the same way:
lookups compare the raw span directly when the stored key has no escapes
and fall back to the memoized decoded form when it does.
*/

use std::{cell::Cell, fmt, ops::Range, str};

use thiserror::Error;

use crate::{arena::ArenaSlice, unescape::unescape_in_place};

use super::Parser;

/// A raw `(offset, len)` window into the parser's copy of the input, or
/// into one of the arena's flat side tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
    pub(crate) start: u32,
    pub(crate) len: u32,
}

impl Span {
    #[inline]
    pub(crate) fn empty() -> Self {
        Span { start: 0, len: 0 }
    }

    #[inline]
    fn bytes<'doc>(&self, buf: &'doc [u8]) -> &'doc [u8] {
        &buf[self.start as usize..(self.start + self.len) as usize]
    }

    #[inline]
    fn indices(&self) -> Range<u32> {
        self.start..self.start + self.len
    }
}

/// A parsed value record in the arena.
pub(crate) enum Node {
    /// Pair span in the arena's pair table.
    Object(Span),
    /// Element span in the arena's element table.
    Array(Span),
    Str(StrNode),
    Num(NumNode),
    Bool(bool),
    Null,
}

/// A raw string plus its lazily-decoded form. Doubles as object key
/// storage.
pub(crate) struct StrNode {
    raw: Span,
    escaped: bool,
    decoded: Cell<Option<ArenaSlice>>,
}

impl StrNode {
    #[inline]
    pub(crate) fn new(raw: Span, escaped: bool) -> Self {
        StrNode {
            raw,
            escaped,
            decoded: Cell::new(None),
        }
    }
}

/// A raw number lexeme plus its lazily-converted double.
pub(crate) struct NumNode {
    raw: Span,
    float: Cell<Option<f64>>,
}

impl NumNode {
    #[inline]
    pub(crate) fn new(raw: Span) -> Self {
        NumNode {
            raw,
            float: Cell::new(None),
        }
    }

    /// The lexeme as a double, converted once. A lexeme the conversion
    /// rejects is `0.0`; the kind check happened before we got here.
    fn float(&self, parser: &Parser) -> f64 {
        if let Some(float) = self.float.get() {
            return float;
        }

        let float = str::from_utf8(self.raw.bytes(&parser.buf))
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(0.0);
        self.float.set(Some(float));

        float
    }
}

/// An object entry: raw key storage plus the node index of its value.
pub(crate) struct Pair {
    pub(crate) key: StrNode,
    pub(crate) value: u32,
}

/**
The kind of a [`Value`].
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Object,
    Array,
    String,
    Number,
    True,
    False,
    Null,
}

impl Kind {
    /// The lowercase name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Object => "object",
            Kind::Array => "array",
            Kind::String => "string",
            Kind::Number => "number",
            Kind::True => "true",
            Kind::False => "false",
            Kind::Null => "null",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/**
A fallible accessor was called on a value of the wrong kind.
*/
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("value doesn't contain {want}; it contains {found}")]
pub struct KindError {
    want: &'static str,
    found: Kind,
}

impl KindError {
    fn new(want: &'static str, found: Kind) -> Self {
        KindError { want, found }
    }

    /// The kind the value actually has.
    pub fn found(&self) -> Kind {
        self.found
    }
}

/**
A handle to a value in a parsed document.

Handles are `Copy` and borrow the parser that produced them; they are
invalidated (at compile time) by the parser's next parse.
*/
#[derive(Clone, Copy)]
pub struct Value<'doc> {
    parser: &'doc Parser,
    node: u32,
}

impl<'doc> Value<'doc> {
    #[inline]
    pub(crate) fn new(parser: &Parser, node: u32) -> Value<'_> {
        Value { parser, node }
    }

    #[inline]
    fn node(&self) -> &'doc Node {
        &self.parser.arena.nodes[self.node as usize]
    }

    /// The kind of this value.
    pub fn kind(&self) -> Kind {
        match self.node() {
            Node::Object(_) => Kind::Object,
            Node::Array(_) => Kind::Array,
            Node::Str(_) => Kind::String,
            Node::Num(_) => Kind::Number,
            Node::Bool(true) => Kind::True,
            Node::Bool(false) => Kind::False,
            Node::Null => Kind::Null,
        }
    }

    /// This value as an object.
    pub fn object(&self) -> Result<Object<'doc>, KindError> {
        match self.node() {
            Node::Object(pairs) => Ok(Object {
                parser: self.parser,
                pairs: *pairs,
            }),
            _ => Err(KindError::new("an object", self.kind())),
        }
    }

    /// This value as an array.
    pub fn array(&self) -> Result<Array<'doc>, KindError> {
        match self.node() {
            Node::Array(elems) => Ok(Array {
                parser: self.parser,
                elems: *elems,
            }),
            _ => Err(KindError::new("an array", self.kind())),
        }
    }

    /**
    The decoded bytes of this string value.

    The first call unescapes the raw span into the parser's scratch arena
    and memoizes the result; later calls return the memoized slice. The
    bytes are whatever the input held; the parser doesn't insist on
    UTF-8.
    */
    pub fn string_bytes(&self) -> Result<&'doc [u8], KindError> {
        match self.node() {
            Node::Str(s) => Ok(decoded_bytes(self.parser, s)),
            _ => Err(KindError::new("a string", self.kind())),
        }
    }

    /**
    This number value as a signed integer.

    A number whose lexeme isn't integer-shaped converts to `0`; the kind
    check already passed, so a bad lexeme is a decode fallback, not an
    error.
    */
    pub fn int(&self) -> Result<i64, KindError> {
        match self.node() {
            Node::Num(num) => {
                let int = str::from_utf8(num.raw.bytes(&self.parser.buf))
                    .ok()
                    .and_then(|raw| raw.parse().ok())
                    .unwrap_or(0);

                Ok(int)
            }
            _ => Err(KindError::new("a number", self.kind())),
        }
    }

    /**
    This number value as a double.

    Converted once and cached; a lexeme the conversion rejects is `0.0`.
    */
    pub fn float64(&self) -> Result<f64, KindError> {
        match self.node() {
            Node::Num(num) => Ok(num.float(self.parser)),
            _ => Err(KindError::new("a number", self.kind())),
        }
    }

    /// This value as a bool. `null` is not a bool.
    pub fn bool(&self) -> Result<bool, KindError> {
        match self.node() {
            Node::Bool(bool) => Ok(*bool),
            _ => Err(KindError::new("a bool", self.kind())),
        }
    }

    /**
    Walk `path` down from this value.

    Each segment is an object key, or an index when the current value is
    an array. Returns `None` as soon as a segment doesn't resolve.
    */
    pub fn get(&self, path: &[&str]) -> Option<Value<'doc>> {
        let mut at = *self;

        for segment in path {
            at = at.step(segment)?;
        }

        Some(at)
    }

    fn step(&self, segment: &str) -> Option<Value<'doc>> {
        match self.node() {
            Node::Object(pairs) => find_key(self.parser, *pairs, segment.as_bytes()),
            Node::Array(elems) => {
                let index = segment.parse::<usize>().ok()?;

                if index >= elems.len as usize {
                    return None;
                }

                let node = self.parser.arena.elems[elems.start as usize + index];
                Some(Value::new(self.parser, node))
            }
            _ => None,
        }
    }

    /// Whether `path` resolves to a value.
    pub fn exists(&self, path: &[&str]) -> bool {
        self.get(path).is_some()
    }

    /// The object at `path`, or `None` if the path is missing or holds
    /// some other kind.
    pub fn get_object(&self, path: &[&str]) -> Option<Object<'doc>> {
        self.get(path)?.object().ok()
    }

    /// The array at `path`, or `None` on a missing path or kind mismatch.
    pub fn get_array(&self, path: &[&str]) -> Option<Array<'doc>> {
        self.get(path)?.array().ok()
    }

    /// The decoded string bytes at `path`, or `None` on a missing path or
    /// kind mismatch, distinguishable from an empty string.
    pub fn get_string_bytes(&self, path: &[&str]) -> Option<&'doc [u8]> {
        self.get(path)?.string_bytes().ok()
    }

    /// The integer at `path`, or `0` on any miss.
    pub fn get_int(&self, path: &[&str]) -> i64 {
        self.get(path).and_then(|v| v.int().ok()).unwrap_or(0)
    }

    /// The double at `path`, or `0.0` on any miss.
    pub fn get_float64(&self, path: &[&str]) -> f64 {
        self.get(path).and_then(|v| v.float64().ok()).unwrap_or(0.0)
    }

    /// The bool at `path`, or `false` on any miss.
    pub fn get_bool(&self, path: &[&str]) -> bool {
        self.get(path).and_then(|v| v.bool().ok()).unwrap_or(false)
    }

    /**
    Collect every value whose location matches `path` at any depth.

    The search descends through all nested objects and arrays; at each
    object it matches the next unconsumed segment against the entry keys
    and restarts from the full path where a key doesn't match, so a match
    may begin anywhere in the tree. Arrays found once the path is consumed
    are flattened into their elements. Results come back in pre-order.
    */
    pub fn in_depth_search(&self, path: &[&str]) -> Vec<Value<'doc>> {
        let mut found = Vec::new();
        search(*self, path, path, &mut found);

        found
    }
}

fn search<'doc>(
    value: Value<'doc>,
    full: &[&str],
    remaining: &[&str],
    found: &mut Vec<Value<'doc>>,
) {
    let (head, rest) = match remaining.split_first() {
        Some(split) => split,
        None => return collect(value, found),
    };

    match value.node() {
        Node::Object(pairs) => {
            for at in pairs.indices() {
                let pair = &value.parser.arena.pairs[at as usize];
                let member = Value::new(value.parser, pair.value);

                if key_matches(value.parser, &pair.key, head.as_bytes()) {
                    search(member, full, rest, found);
                } else if key_matches(value.parser, &pair.key, full[0].as_bytes()) {
                    // a fresh match can begin at this key even though the
                    // previous segments matched above it
                    search(member, full, &full[1..], found);
                } else {
                    search(member, full, full, found);
                }
            }
        }
        Node::Array(elems) => {
            for at in elems.indices() {
                let elem = value.parser.arena.elems[at as usize];
                search(Value::new(value.parser, elem), full, remaining, found);
            }
        }
        _ => (),
    }
}

fn collect<'doc>(value: Value<'doc>, found: &mut Vec<Value<'doc>>) {
    match value.node() {
        Node::Array(elems) => {
            for at in elems.indices() {
                let elem = value.parser.arena.elems[at as usize];
                collect(Value::new(value.parser, elem), found);
            }
        }
        _ => found.push(value),
    }
}

fn find_key<'doc>(parser: &'doc Parser, pairs: Span, want: &[u8]) -> Option<Value<'doc>> {
    for at in pairs.indices() {
        let pair = &parser.arena.pairs[at as usize];

        // duplicates are kept in insertion order; the first match wins
        if key_matches(parser, &pair.key, want) {
            return Some(Value::new(parser, pair.value));
        }
    }

    None
}

/// Compare a stored (raw) key against a logical lookup key.
fn key_matches(parser: &Parser, key: &StrNode, want: &[u8]) -> bool {
    if !key.escaped {
        return key.raw.bytes(&parser.buf) == want;
    }

    decoded_bytes(parser, key) == want
}

/// The decoded form of a string node, unescaped into scratch on first
/// access.
fn decoded_bytes<'doc>(parser: &'doc Parser, node: &StrNode) -> &'doc [u8] {
    if !node.escaped {
        return node.raw.bytes(&parser.buf);
    }

    if let Some(handle) = node.decoded.get() {
        return parser.arena.scratch.get(handle);
    }

    let raw = node.raw.bytes(&parser.buf);
    let (handle, copied) = parser.arena.scratch.alloc(raw);
    let len = unescape_in_place(copied);
    node.decoded.set(Some(handle.truncated(len)));

    &copied[..len]
}

/**
An object: ordered `(key, value)` entries, duplicates retained.
*/
#[derive(Clone, Copy)]
pub struct Object<'doc> {
    parser: &'doc Parser,
    pairs: Span,
}

impl<'doc> Object<'doc> {
    /// The number of entries.
    pub fn len(&self) -> usize {
        self.pairs.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.len == 0
    }

    /// Look `key` up among the entries; on duplicates the first match
    /// wins.
    pub fn get(&self, key: &str) -> Option<Value<'doc>> {
        find_key(self.parser, self.pairs, key.as_bytes())
    }

    /**
    Visit the entries in insertion order.

    Keys are yielded in decoded form.
    */
    pub fn entries(&self) -> Entries<'doc> {
        Entries {
            parser: self.parser,
            range: self.pairs.indices(),
        }
    }
}

impl<'doc> IntoIterator for Object<'doc> {
    type Item = (&'doc [u8], Value<'doc>);
    type IntoIter = Entries<'doc>;

    fn into_iter(self) -> Entries<'doc> {
        self.entries()
    }
}

/// Iterator over an object's entries, in insertion order.
pub struct Entries<'doc> {
    parser: &'doc Parser,
    range: Range<u32>,
}

impl<'doc> Iterator for Entries<'doc> {
    type Item = (&'doc [u8], Value<'doc>);

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.range.next()?;
        let pair = &self.parser.arena.pairs[at as usize];

        Some((
            decoded_bytes(self.parser, &pair.key),
            Value::new(self.parser, pair.value),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for Entries<'_> {}

/**
An array: an ordered sequence of values.
*/
#[derive(Clone, Copy)]
pub struct Array<'doc> {
    parser: &'doc Parser,
    elems: Span,
}

impl<'doc> Array<'doc> {
    /// The number of elements.
    pub fn len(&self) -> usize {
        self.elems.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.elems.len == 0
    }

    /// The element at `index`, if it's in bounds.
    pub fn get(&self, index: usize) -> Option<Value<'doc>> {
        if index >= self.elems.len as usize {
            return None;
        }

        let node = self.parser.arena.elems[self.elems.start as usize + index];
        Some(Value::new(self.parser, node))
    }

    /// Visit the elements in order.
    pub fn iter(&self) -> Elems<'doc> {
        Elems {
            parser: self.parser,
            range: self.elems.indices(),
        }
    }
}

impl<'doc> IntoIterator for Array<'doc> {
    type Item = Value<'doc>;
    type IntoIter = Elems<'doc>;

    fn into_iter(self) -> Elems<'doc> {
        self.iter()
    }
}

/// Iterator over an array's elements, in order.
pub struct Elems<'doc> {
    parser: &'doc Parser,
    range: Range<u32>,
}

impl<'doc> Iterator for Elems<'doc> {
    type Item = Value<'doc>;

    fn next(&mut self) -> Option<Self::Item> {
        let at = self.range.next()?;
        let node = self.parser.arena.elems[at as usize];

        Some(Value::new(self.parser, node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.range.size_hint()
    }
}

impl ExactSizeIterator for Elems<'_> {}

impl<'doc> Value<'doc> {
    /**
    Append the canonical JSON serialization of this value to `dst`.

    Strings are re-escaped from their decoded form: quotes, backslashes,
    and C0 controls get escapes; everything else, decoded Unicode
    included, is emitted as raw bytes. Numbers are re-emitted from their
    converted double: integer decimal when integral, six-decimal fixed
    otherwise.
    */
    pub fn write_to(&self, dst: &mut Vec<u8>) {
        match self.node() {
            Node::Object(pairs) => write_object(self.parser, *pairs, dst),
            Node::Array(elems) => {
                dst.push(b'[');

                for (nth, at) in elems.indices().enumerate() {
                    if nth > 0 {
                        dst.push(b',');
                    }

                    let elem = self.parser.arena.elems[at as usize];
                    Value::new(self.parser, elem).write_to(dst);
                }

                dst.push(b']');
            }
            Node::Str(s) => write_escaped(decoded_bytes(self.parser, s), dst),
            Node::Num(num) => write_number(num.float(self.parser), dst),
            Node::Bool(true) => dst.extend_from_slice(b"true"),
            Node::Bool(false) => dst.extend_from_slice(b"false"),
            Node::Null => dst.extend_from_slice(b"null"),
        }
    }
}

fn write_object(parser: &Parser, pairs: Span, dst: &mut Vec<u8>) {
    dst.push(b'{');

    for (nth, at) in pairs.indices().enumerate() {
        if nth > 0 {
            dst.push(b',');
        }

        let pair = &parser.arena.pairs[at as usize];
        write_escaped(decoded_bytes(parser, &pair.key), dst);
        dst.push(b':');
        Value::new(parser, pair.value).write_to(dst);
    }

    dst.push(b'}');
}

fn write_escaped(bytes: &[u8], dst: &mut Vec<u8>) {
    dst.push(b'"');

    for &byte in bytes {
        match byte {
            b'"' => dst.extend_from_slice(b"\\\""),
            b'\\' => dst.extend_from_slice(b"\\\\"),
            b'\n' => dst.extend_from_slice(b"\\n"),
            b'\r' => dst.extend_from_slice(b"\\r"),
            b'\t' => dst.extend_from_slice(b"\\t"),
            0x08 => dst.extend_from_slice(b"\\b"),
            0x0c => dst.extend_from_slice(b"\\f"),
            byte if byte < 0x20 => {
                dst.extend_from_slice(b"\\u00");
                dst.push(HEX[(byte >> 4) as usize]);
                dst.push(HEX[(byte & 0x0f) as usize]);
            }
            byte => dst.push(byte),
        }
    }

    dst.push(b'"');
}

const HEX: &[u8; 16] = b"0123456789abcdef";

fn write_number(float: f64, dst: &mut Vec<u8>) {
    use std::io::Write as _;

    if float.is_finite() && float == float.trunc() && float.abs() < i64::MAX as f64 {
        // writing into a `Vec` can't fail
        let _ = write!(dst, "{}", float as i64);
    } else {
        let _ = write!(dst, "{:.6}", float);
    }
}

impl fmt::Display for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dst = Vec::new();
        self.write_to(&mut dst);

        f.write_str(&String::from_utf8_lossy(&dst))
    }
}

impl fmt::Display for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dst = Vec::new();
        write_object(self.parser, self.pairs, &mut dst);

        f.write_str(&String::from_utf8_lossy(&dst))
    }
}

impl fmt::Display for Array<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut dst = Vec::new();
        dst.push(b'[');

        for (nth, at) in self.elems.indices().enumerate() {
            if nth > 0 {
                dst.push(b',');
            }

            let elem = self.parser.arena.elems[at as usize];
            Value::new(self.parser, elem).write_to(&mut dst);
        }

        dst.push(b']');

        f.write_str(&String::from_utf8_lossy(&dst))
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Value").field(&format_args!("{}", self)).finish()
    }
}

impl fmt::Debug for Object<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Object").field(&format_args!("{}", self)).finish()
    }
}

impl fmt::Debug for Array<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Array").field(&format_args!("{}", self)).finish()
    }
}

#[cfg(any(test, feature = "serde_json"))]
impl<'doc> Value<'doc> {
    /**
    Convert this value into a [`serde_json::Value`].

    Strings decode first (lossily, if the input held invalid UTF-8).
    Numbers convert from their raw lexeme; a lexeme `serde_json` rejects
    becomes a JSON string of the lexeme.
    */
    pub fn to_value(&self) -> serde_json::Value {
        use std::str::FromStr;

        match self.node() {
            Node::Str(s) => serde_json::Value::String(
                String::from_utf8_lossy(decoded_bytes(self.parser, s)).into_owned(),
            ),
            Node::Num(num) => {
                let raw = str::from_utf8(num.raw.bytes(&self.parser.buf)).unwrap_or_default();

                match serde_json::Number::from_str(raw) {
                    Ok(number) => serde_json::Value::Number(number),
                    _ => serde_json::Value::String(raw.to_owned()),
                }
            }
            Node::Bool(bool) => serde_json::Value::Bool(*bool),
            Node::Null => serde_json::Value::Null,
            Node::Object(pairs) => {
                let mut map = serde_json::Map::with_capacity(pairs.len as usize);

                for at in pairs.indices() {
                    let pair = &self.parser.arena.pairs[at as usize];
                    let key = String::from_utf8_lossy(decoded_bytes(self.parser, &pair.key));

                    map.insert(
                        key.into_owned(),
                        Value::new(self.parser, pair.value).to_value(),
                    );
                }

                serde_json::Value::Object(map)
            }
            Node::Array(elems) => {
                let mut array = Vec::with_capacity(elems.len as usize);

                for at in elems.indices() {
                    let elem = self.parser.arena.elems[at as usize];
                    array.push(Value::new(self.parser, elem).to_value());
                }

                serde_json::Value::Array(array)
            }
        }
    }
}
