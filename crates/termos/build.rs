//! Build script for the `termos` firmware crate.
//!
//! When building inside a workspace, the linker may not find `memory.x` if it
//! only exists at the workspace root. This script copies `config/memory.x` into
//! `OUT_DIR` and adds that directory to the link search path so `cortex-m-rt`'s
//! `link.x` can include it.
//!
//! It also sets the required linker args (`--nmagic` and `-Tlink.x`) and links
//! the native `drivers` static library providing the board driver functions
//! declared in `hal_interface`.
//!
//! Notes:
//! - The library is searched in `drivers/build/Release` under the workspace
//!   root, or in the directory given by `TERMOS_DRIVERS_DIR`.
//! - Nothing is emitted for host builds: the firmware only links for a
//!   bare-metal target.

use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-env-changed=TERMOS_DRIVERS_DIR");
    if env::var("CARGO_CFG_TARGET_OS").as_deref() != Ok("none") {
        return;
    }

    let l_crate_dir =
        PathBuf::from(env::var_os("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set"));
    let l_workspace_root = l_crate_dir
        .parent()
        .and_then(|l_dir| l_dir.parent())
        .expect("termos crate must live two levels under the workspace root")
        .to_path_buf();

    // ---- Ensure the linker can find memory.x ----
    let l_memory_x_src = l_workspace_root.join("config").join("memory.x");
    if !l_memory_x_src.exists() {
        panic!(
            "Expected linker memory script at {:?}. \
             Make sure `memory.x` exists in config folder.",
            l_memory_x_src
        );
    }

    let l_out_dir = PathBuf::from(env::var_os("OUT_DIR").expect("OUT_DIR not set"));
    let l_memory_x_dst = l_out_dir.join("memory.x");

    fs::copy(&l_memory_x_src, &l_memory_x_dst).unwrap_or_else(|e| {
        panic!(
            "Failed to copy {:?} to {:?}: {}",
            l_memory_x_src, l_memory_x_dst, e
        )
    });

    // Add OUT_DIR to the linker search path so `link.x` can include `memory.x`.
    println!("cargo:rustc-link-search={}", l_out_dir.display());

    // Re-run when the memory layout changes.
    println!("cargo:rerun-if-changed={}", l_memory_x_src.display());

    // ---- Linker arguments required for cortex-m-rt embedded targets ----
    // `--nmagic` is required when memory regions are not aligned to 0x10000.
    println!("cargo:rustc-link-arg=--nmagic");
    println!("cargo:rustc-link-arg=-Tlink.x");

    // ---- Link the native drivers static library (built elsewhere) ----
    let l_drivers_lib_dir = env::var_os("TERMOS_DRIVERS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            l_workspace_root
                .join("drivers")
                .join("build")
                .join("Release")
        });
    println!(
        "cargo:rustc-link-search=native={}",
        l_drivers_lib_dir.display()
    );
    println!("cargo:rustc-link-lib=static=drivers");
}
