/// Builds the gRPC client and server code for the `echo.proto` definition
/// using `tonic-prost-build`.
///
/// The Protocol Buffer definitions in `proto/` are compiled into Rust modules
/// with gRPC bindings under the crate's `OUT_DIR`. An encoded file descriptor
/// set is written next to them so the server can expose gRPC reflection.
///
/// # Files and Paths
///
/// - Proto file: `proto/echo.proto`
/// - Includes: `proto/`
/// - Descriptor set: `$OUT_DIR/echo_descriptor.bin`
///
/// # Panics
///
/// Panics if `OUT_DIR` is unset or code generation fails.
///
/// # Output
///
/// Generated code is included in Rust via:
///
/// ```rust,ignore
/// pub mod proto {
///     tonic::include_proto!("service");
/// }
/// ```
use std::env;
use std::path::PathBuf;
fn main() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let descriptor_path = out_dir.join("echo_descriptor.bin");

    let mut config = tonic_prost_build::Config::new();
    config.file_descriptor_set_path(&descriptor_path);

    println!("cargo:rerun-if-changed=proto/echo.proto");

    tonic_prost_build::configure()
        .compile_with_config(config, &["proto/echo.proto"], &["proto"])
        .unwrap();
}
