/*!
A shared free list of parsers.

Parsers are cheap to make but expensive to warm up: the arena only stops
allocating once it has seen a few documents. The pool lets many concurrent
callers share a bounded set of warmed-up parsers instead of each paying
that cost per parse.

The pool is the only concurrent piece of the crate. Individual parsers are
single-threaded; a parser is `Send` (it can move between renters) but not
`Sync`, and the values it hands out borrow it, so the compiler stops a
renter from keeping anything once the parser goes back in the pool.
*/

use parking_lot::Mutex;

use crate::de::Parser;

/// How many idle parsers the pool holds onto; `put` drops the rest so a
/// burst of renters doesn't pin their arenas forever.
const MAX_IDLE: usize = 64;

/**
A thread-safe pool of [`Parser`]s.

```
use magpie_json::ParserPool;

let pool = ParserPool::new();

let mut parser = pool.get();
let doc = parser.parse(r#"{"answer": 42}"#)?;
assert_eq!(42, doc.get_int(&["answer"]));

pool.put(parser);
# Ok::<(), magpie_json::ParseError>(())
```
*/
#[derive(Default)]
pub struct ParserPool {
    idle: Mutex<Vec<Parser>>,
}

impl ParserPool {
    pub fn new() -> Self {
        ParserPool::default()
    }

    /**
    Take a parser from the pool, making a fresh one if none are idle.

    Never blocks beyond the free-list lock.
    */
    pub fn get(&self) -> Parser {
        self.idle.lock().pop().unwrap_or_default()
    }

    /**
    Return a parser for reuse.

    The pool may drop the parser instead of keeping it. Values obtained
    from the parser can't still be live here, because they borrow it.
    */
    pub fn put(&self, parser: Parser) {
        let mut idle = self.idle.lock();

        if idle.len() < MAX_IDLE {
            idle.push(parser);
        }
    }
}
