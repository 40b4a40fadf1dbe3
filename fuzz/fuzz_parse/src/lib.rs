pub fn parse(input: &[u8]) {
    // Make sure we don't panic when reading documents
    let mut parser = magpie_json::Parser::new();

    let doc = match parser.parse_bytes(input) {
        Ok(doc) => doc,
        Err(_) => return,
    };

    // exercise the lazy decode and serialization paths
    let mut out = Vec::new();
    doc.write_to(&mut out);

    // If serde_json also accepts the input then the trees must agree
    if let Ok(expected) = serde_json::from_slice::<serde_json::Value>(input) {
        assert_eq!(expected, doc.to_value());
    }
}
