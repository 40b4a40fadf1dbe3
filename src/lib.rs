/*!
# `magpie-json`

## 🐦⚡

A lazy JSON parser for workloads that chew through large numbers of
documents and read only fragments of them.

`parse` builds a cheap index of the document (every value node lives in
an arena owned by the parser, and strings and numbers keep their raw
input bytes); decoding happens on first access, memoized. Reusing one
parser (or renting from a [`ParserPool`]) means the arena's allocations
are reused too, so a warmed-up parser gets through a document with close
to zero heap traffic:

```
use magpie_json::Parser;

let mut parser = Parser::new();

let doc = parser.parse(r#"{"user": {"name": "magpie", "logins": 3}}"#)?;

assert_eq!(b"magpie", doc.get_string_bytes(&["user", "name"]).unwrap());
assert_eq!(3, doc.get_int(&["user", "logins"]));
assert!(!doc.exists(&["user", "password"]));
# Ok::<(), magpie_json::ParseError>(())
```

Values borrow the parser that produced them, so the borrow checker
enforces the lifetime story: parse again (or return the parser to its
pool) and every outstanding value, object, array, and decoded byte slice
from the previous document stops compiling.

The read surface comes in two parallel flavors: fallible accessors
([`Value::object`], [`Value::int`], ...) that report a [`KindError`] on a
type mismatch, and total getters ([`Value::get_int`],
[`Value::get_string_bytes`], ...) that walk a key path and substitute
zero/`None` for anything missing or mismatched.
*/

mod arena;
mod pool;
mod tokenizer;
mod unescape;

pub mod de;

pub use de::{
    Array, Elems, Entries, Found, Kind, KindError, Object, ParseError, Parser, Value, MAX_DEPTH,
};
pub use pool::ParserPool;
