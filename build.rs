use std::{env, path::PathBuf};

/// Print FFmpeg discovery hints for Windows builds, where `ffmpeg-sys-next`
/// cannot rely on pkg-config.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_DYNAMIC", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Ok(vcpkg_root) = env::var("VCPKG_ROOT") else {
        println!(
            "cargo:warning=FFMPEG_DIR is not set. Install FFmpeg (e.g. via vcpkg) and point FFMPEG_DIR at it to build turnstills on Windows."
        );
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);

    if candidate.is_dir() {
        println!(
            "cargo:warning=Found vcpkg FFmpeg at {0}; set FFMPEG_DIR={0} to use it explicitly.",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=VCPKG_ROOT is set but {} does not exist.",
            candidate.display()
        );
    }
}
