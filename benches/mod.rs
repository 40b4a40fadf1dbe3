#![cfg(unstable)]
#![feature(test)]
extern crate test;

use magpie_json::{Parser, ParserPool};

const EVENT: &str = "{\"@t\":\"2020-02-19T09:57:01.123Z\",\"@mt\":\"Scanned {Count} documents in {Elapsed} ms\",\"@m\":\"Scanned 17 documents in 4.600000 ms\",\"@x\":\"at de::scan(documents)\\nat pool::run()\\nat main()\",\"Count\":17,\"Elapsed\":4.600000,\"Environment\":\"production\",\"tags\":[\"scan\",\"json\",\"arena\"],\"source\":{\"module\":\"de\",\"line\":204}}";

fn big_object() -> String {
    let mut input = String::from("{");

    for i in 0..10_000 {
        if i > 0 {
            input.push(',');
        }

        input.push_str(&format!("\"key_{}\":\"value_{}\"", i, i));
    }

    input.push('}');
    input
}

#[bench]
fn parse_event(b: &mut test::Bencher) {
    let mut parser = Parser::new();

    b.bytes = EVENT.len() as u64;
    b.iter(|| {
        let doc = parser.parse(EVENT).unwrap();
        test::black_box(doc.kind());
    })
}

#[bench]
fn parse_event_sparse_read(b: &mut test::Bencher) {
    let mut parser = Parser::new();

    b.bytes = EVENT.len() as u64;
    b.iter(|| {
        let doc = parser.parse(EVENT).unwrap();
        test::black_box(doc.get_string_bytes(&["@m"]).unwrap().len())
    })
}

#[bench]
fn parse_event_full_read(b: &mut test::Bencher) {
    let mut parser = Parser::new();

    b.bytes = EVENT.len() as u64;
    b.iter(|| {
        let doc = parser.parse(EVENT).unwrap();

        let mut bytes = 0;
        for (key, value) in doc.object().unwrap().entries() {
            bytes += key.len();

            if let Ok(s) = value.string_bytes() {
                bytes += s.len();
            }
        }

        test::black_box(bytes)
    })
}

#[bench]
fn parse_event_pooled(b: &mut test::Bencher) {
    let pool = ParserPool::new();

    b.bytes = EVENT.len() as u64;
    b.iter(|| {
        let mut parser = pool.get();

        {
            let doc = parser.parse(EVENT).unwrap();
            test::black_box(doc.kind());
        }

        pool.put(parser);
    })
}

#[bench]
fn parse_event_value_serde_json(b: &mut test::Bencher) {
    b.bytes = EVENT.len() as u64;
    b.iter(|| {
        let v: serde_json::Value = serde_json::from_str(EVENT).unwrap();
        v
    })
}

#[bench]
fn parse_big_object_lookup(b: &mut test::Bencher) {
    let input = big_object();
    let mut parser = Parser::new();

    b.bytes = input.len() as u64;
    b.iter(|| {
        let doc = parser.parse(&input).unwrap();
        test::black_box(doc.get_string_bytes(&["key_9999"]).unwrap().len())
    })
}

#[bench]
fn parse_big_object_value_serde_json(b: &mut test::Bencher) {
    let input = big_object();

    b.bytes = input.len() as u64;
    b.iter(|| {
        let v: serde_json::Value = serde_json::from_str(&input).unwrap();
        test::black_box(v["key_9999"].as_str().unwrap().len())
    })
}

#[bench]
fn reserialize_event(b: &mut test::Bencher) {
    let mut parser = Parser::new();
    let doc = parser.parse(EVENT).unwrap();
    let mut out = Vec::with_capacity(EVENT.len());

    b.bytes = EVENT.len() as u64;
    b.iter(|| {
        out.clear();
        doc.write_to(&mut out);
        test::black_box(out.len())
    })
}

#[bench]
fn unescape_stacktrace(b: &mut test::Bencher) {
    let mut parser = Parser::new();

    b.bytes = EVENT.len() as u64;
    b.iter(|| {
        // re-parse so the memoized decode doesn't short-circuit the work
        let doc = parser.parse(EVENT).unwrap();
        test::black_box(doc.get_string_bytes(&["@x"]).unwrap().len())
    })
}
