/*!
Converts toolchain details into Cargo cfgs that can then be used in code.

The only cfg emitted today is `unstable`, which gates the `#[bench]` suite
onto compilers that support feature flags.
*/

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-check-cfg=cfg(unstable)");

    if version_check::is_feature_flaggable().unwrap_or(false) {
        println!("cargo:rustc-cfg=unstable");
    }
}
