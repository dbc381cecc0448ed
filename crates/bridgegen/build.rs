//! Build script for bridgegen
//!
//! The builtin templates are compiled in with `include_str!`, so any edit
//! under templates/ has to retrigger the build.

fn main() {
    println!("cargo:rerun-if-changed=templates/");
    println!("cargo:rerun-if-changed=build.rs");
}
