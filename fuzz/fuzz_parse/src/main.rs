fn main() {
    #![allow(unreachable_code)]

    #[cfg(not(feature = "afl"))]
    panic!("fuzz targets need to be run with the `afl` Cargo feature.");

    #[cfg(feature = "afl")]
    afl::fuzz!(|input: &[u8]| { fuzz_parse::parse(input) });
}
