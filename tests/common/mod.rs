#![allow(dead_code)]

use anyhow::Result;
use picoman::PicomanContext;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Manifest shaped like the ones generated by the Pico project generator
pub const PICO_MANIFEST: &str = "\
cmake_minimum_required(VERSION 3.13)

include(pico_sdk_import.cmake)

project(blink C CXX ASM)
set(CMAKE_C_STANDARD 11)

pico_sdk_init()

add_executable(blink
    blink.c
)

pico_enable_stdio_usb(blink 1)

target_link_libraries(blink
    pico_stdlib
    hardware_pio
)

pico_add_extra_outputs(blink)
";

/// Test workspace fixture: library root, project root and config in one
/// temporary directory
pub struct TestWorkspace {
    pub temp_dir: TempDir,
    pub ctx: PicomanContext,
}

impl TestWorkspace {
    /// Create a new workspace with empty library and project roots
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let ctx = PicomanContext::new_explicit(
            temp_dir.path().join(".pclibs"),
            temp_dir.path().join("PicoProjects"),
            temp_dir.path().join(".config/picoman/config"),
        )?;

        Ok(Self { temp_dir, ctx })
    }

    /// Get the temporary directory path
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a project directory with the given manifest
    pub fn project(&self, name: &str, manifest: &str) -> Result<PathBuf> {
        let dir = self.ctx.project_root.join(name);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("CMakeLists.txt"), manifest)?;
        Ok(dir)
    }

    /// Pretend a library is installed by creating its directory
    pub fn install_library(&self, name: &str) -> Result<PathBuf> {
        let dir = self.ctx.lib_root.join(name);
        fs::create_dir_all(&dir)?;
        fs::write(dir.join("CMakeLists.txt"), format!("add_library({name} INTERFACE)\n"))?;
        Ok(dir)
    }

    /// Current manifest text of a project
    pub fn manifest(&self, name: &str) -> Result<String> {
        Ok(fs::read_to_string(
            self.ctx.project_root.join(name).join("CMakeLists.txt"),
        )?)
    }

    /// The `add_subdirectory` line written for an installed library
    pub fn subdirectory_line(&self, name: &str) -> String {
        format!(
            "add_subdirectory(\"{}\" \"${{CMAKE_BINARY_DIR}}/{name}_build\")",
            self.ctx.lib_root.join(name).display()
        )
    }

    /// `pman` with HOME and all picoman locations pointing into the workspace
    pub fn pman(&self) -> Result<assert_cmd::Command> {
        let mut cmd = assert_cmd::Command::cargo_bin("pman")?;
        cmd.env("HOME", self.path())
            .env("PICOMAN_CONFIG_PATH", &self.ctx.config_path)
            .env("PICOMAN_LIB_PATH", &self.ctx.lib_root)
            .env("PICOMAN_PROJECTS_PATH", &self.ctx.project_root)
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG");
        Ok(cmd)
    }
}
