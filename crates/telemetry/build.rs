//! Records the compiler version reported as `py_version` on every event.

fn main() {
    let version = rustc_version::version()
        .map(|v| v.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=BENTO_RUSTC_VERSION={}", version);
    println!("cargo:rerun-if-changed=build.rs");
}
