use rustc_version::version;

fn main() {
    // Get the version of Rust used to compile, surfaced in the startup
    // log line.
    let v = version().unwrap();
    println!("cargo:rustc-env=RUSTC_VERSION={v}");
}
