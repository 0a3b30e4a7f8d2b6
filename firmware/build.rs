// Copyright (c) 2025 Kevin Thomas
// Licensed under the MIT License. See LICENSE file in the project root for full license information.

//! Build script for the kitibot firmware
//!
//! Configures the linker for the RP2350 by copying the memory layout
//! definition into the build output directory, adding it to the linker
//! search path, and registering it as a rebuild trigger.
//!
//! # Memory Layout
//! The `memory.x` file defines the RP2350's memory regions:
//! - **FLASH**: 4MB starting at 0x10000000 (program code storage)
//! - **RAM**: 512KB starting at 0x20000000 (runtime data)
//! - **SRAM8**: 4KB starting at 0x20080000 (dedicated memory bank 8)
//! - **SRAM9**: 4KB starting at 0x20081000 (dedicated memory bank 9)
//!
//! # Linker Integration
//! Integrates with `cortex-m-rt` through the `-Tlink.x` linker argument
//! specified in `.cargo/config.toml`.

use std::env;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

fn main() {
    // Get the output directory where cargo places build artifacts
    let out = &PathBuf::from(env::var_os("OUT_DIR").unwrap());

    // Copy memory.x to the output directory for the linker to find
    File::create(out.join("memory.x"))
        .unwrap()
        .write_all(include_bytes!("memory.x"))
        .unwrap();

    // Tell cargo to add the output directory to the linker search path
    println!("cargo:rustc-link-search={}", out.display());

    // Rebuild if memory.x changes
    println!("cargo:rerun-if-changed=memory.x");
}
