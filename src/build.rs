use std::{
    path::Path,
    process::{Command, ExitStatus},
    time::Instant,
};

use anyhow::{Context, Result, bail};

/// Spawn the build command in `workdir` with inherited stdio and wait for it.
///
/// A non-zero exit is logged and returned, not treated as an error. Only a
/// failure to resolve or spawn the program is an error.
pub fn trigger(command: &[String], workdir: &Path) -> Result<ExitStatus> {
    let Some((program, args)) = command.split_first() else {
        bail!("build command is empty");
    };
    let resolved = which::which_in(program, std::env::var_os("PATH"), workdir).with_context(
        || format!("build program '{program}' not found in PATH. Install it or adjust `build`."),
    )?;

    tracing::info!(command = %command.join(" "), workdir = %workdir.display(), "running build");
    let start = Instant::now();
    let status = Command::new(&resolved)
        .args(args)
        .current_dir(workdir)
        .status()
        .with_context(|| format!("failed to spawn build command `{}`", command.join(" ")))?;

    if status.success() {
        tracing::info!(elapsed = ?start.elapsed(), "build finished");
    } else {
        tracing::warn!(
            code = status.code().unwrap_or(-1),
            elapsed = ?start.elapsed(),
            "build exited unsuccessfully"
        );
    }
    Ok(status)
}
