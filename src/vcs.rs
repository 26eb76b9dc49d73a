use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, Result, bail};
use clap::ValueEnum;
use serde::Deserialize;

/// Version control backend that knows which files belong to the repo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum VcsKind {
    #[default]
    Git,
    Jj,
}

impl VcsKind {
    pub fn as_str(self) -> &'static str {
        match self {
            VcsKind::Git => "git",
            VcsKind::Jj => "jj",
        }
    }
}

/// List every tracked file under `root`, joined onto `root`.
pub fn tracked_files(kind: VcsKind, root: &Path) -> Result<Vec<PathBuf>> {
    match kind {
        // -z keeps paths with unusual bytes unquoted.
        VcsKind::Git => list_files("git", &["ls-files", "-z"], b'\0', root),
        VcsKind::Jj => list_files("jj", &["file", "list"], b'\n', root),
    }
}

/// Run a listing command in `root` and split its stdout on `separator`,
/// dropping empty records.
pub(crate) fn list_files(
    program: &str,
    args: &[&str],
    separator: u8,
    root: &Path,
) -> Result<Vec<PathBuf>> {
    let output = Command::new(program)
        .args(args)
        .current_dir(root)
        .stdin(std::process::Stdio::null())
        .output()
        .with_context(|| format!("failed to run {} {}", program, args.join(" ")))?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "{} {} exited with status {}: {}",
            program,
            args.join(" "),
            output.status.code().unwrap_or(-1),
            stderr.trim()
        );
    }

    Ok(split_records(&output.stdout, separator)
        .map(|record| root.join(record))
        .collect())
}

/// Split listing output into paths. Records stay raw bytes so tracked names
/// that are not UTF-8 still stat; `\r` is only stripped from line records.
fn split_records(stdout: &[u8], separator: u8) -> impl Iterator<Item = OsString> + '_ {
    stdout
        .split(move |byte| *byte == separator)
        .map(move |record| match (separator, record) {
            (b'\n', [rest @ .., b'\r']) => rest,
            _ => record,
        })
        .filter(|record| !record.is_empty())
        .map(record_to_os_string)
}

#[cfg(unix)]
fn record_to_os_string(record: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    std::ffi::OsStr::from_bytes(record).to_os_string()
}

#[cfg(not(unix))]
fn record_to_os_string(record: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(record).into_owned())
}
