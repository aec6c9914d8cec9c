//! Build-time hints for locating the FFmpeg libraries.
//!
//! `ffmpeg-sys-next` does the actual discovery. This script only surfaces
//! actionable warnings when the usual environment is missing, so a failed
//! link points at the fix instead of a wall of linker output.

use std::env;
use std::path::{Path, PathBuf};

const WATCHED_VARIABLES: [&str; 5] = [
    "FFMPEG_DIR",
    "PKG_CONFIG_PATH",
    "VCPKG_ROOT",
    "VCPKGRS_DYNAMIC",
    "VCPKGRS_TRIPLET",
];

fn warn(message: impl AsRef<str>) {
    println!("cargo:warning={}", message.as_ref());
}

fn main() {
    for variable in WATCHED_VARIABLES {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    if let Some(ffmpeg_dir) = env::var_os("FFMPEG_DIR") {
        let ffmpeg_dir = PathBuf::from(ffmpeg_dir);
        if !ffmpeg_dir.join("include").is_dir() {
            warn(format!(
                "FFMPEG_DIR={} has no include/ directory; vidframes needs the FFmpeg development headers.",
                ffmpeg_dir.display(),
            ));
        }
        return;
    }

    match env::var("CARGO_CFG_TARGET_OS").unwrap_or_default().as_str() {
        "windows" => check_vcpkg(),
        "linux" | "macos" | "freebsd" => {}
        other => warn(format!(
            "No FFmpeg discovery hints for target OS '{other}'. Set FFMPEG_DIR if the build fails to link."
        )),
    }
}

fn check_vcpkg() {
    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        warn(
            "FFMPEG_DIR is not set. On Windows, install FFmpeg via vcpkg and set VCPKG_ROOT or FFMPEG_DIR.",
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let installed = Path::new(&vcpkg_root).join("installed").join(&triplet);

    if !installed.exists() {
        warn(format!(
            "VCPKG_ROOT is set but no FFmpeg install was found at {}.",
            installed.display(),
        ));
        return;
    }

    warn(format!(
        "Using vcpkg FFmpeg at {0}. Set FFMPEG_DIR={0} to skip this lookup.",
        installed.display(),
    ));
    if env::var_os("VCPKGRS_DYNAMIC").is_none() {
        warn("Set VCPKGRS_DYNAMIC=1 when linking a dynamic vcpkg FFmpeg build.");
    }
}
