use std::path::{Path, PathBuf};

use anyhow::Context;
use xshell::Shell;

/// Copy a file into the root of a mounted volume.
///
/// The file keeps its name and replaces an existing file with the same
/// name. Returns the path of the copy.
pub fn copy_to_mount(shell: &Shell, source: &Path, mount: &Path) -> anyhow::Result<PathBuf> {
    let file_name = source
        .file_name()
        .with_context(|| format!("`{}` does not name a file", source.display()))?;
    let destination = mount.join(file_name);

    shell.copy_file(source, &destination)?;

    Ok(destination)
}
