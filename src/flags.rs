use std::ffi::OsString;
use std::path::PathBuf;

use crate::volume::TARGET_LABEL;

pub const USAGE: &str = "usage: upload-uf2 <UF2_PATH> [--label <LABEL>] [-v]...";

xflags::xflags! {
    /// Copy a UF2 firmware image onto a drive in UF2 boot loader mode.
    cmd upload-uf2 {
        /// UF2 firmware path.
        required uf2_path: PathBuf
        /// Further arguments are accepted and ignored.
        repeated rest: OsString
        /// Volume label of the boot loader drive (default: RPI-RP2).
        optional --label label: String
        /// Increase log verbosity, can be repeated.
        repeated -v, --verbose
    }
}

impl UploadUf2 {
    pub fn label(&self) -> &str {
        self.label.as_deref().unwrap_or(TARGET_LABEL)
    }

    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        }
    }
}
