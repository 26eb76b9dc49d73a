use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};

use crate::cli::InitOpts;
use crate::config::{DEFAULT_BUILD_COMMAND, DEFAULT_CONFIG_FILE};

const DEFAULT_ARTIFACT: &str = "dist/bundle.js";

fn render_template(artifact: &str) -> String {
    let artifact = toml::Value::String(artifact.to_string());
    let build = toml::Value::String(DEFAULT_BUILD_COMMAND.to_string());
    format!(
        r#"# assetgate

# Built file whose freshness is checked against every tracked file.
artifact = {artifact}

# Command spawned when the artifact is stale.
build = {build}

# "git" or "jj"
vcs = "git"
"#
    )
}

pub(crate) fn write_template(path: &Path, artifact: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
    }

    fs::write(path, render_template(artifact))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

pub fn run(opts: InitOpts) -> Result<()> {
    let target = resolve_path(opts.path);
    if target.exists() && !opts.force {
        bail!(
            "{} already exists; refusing to overwrite (pass --force)",
            target.display()
        );
    }

    let artifact = opts.artifact.as_deref().unwrap_or(DEFAULT_ARTIFACT);
    write_template(&target, artifact)?;
    println!("created {}", target.display());
    Ok(())
}

fn resolve_path(path: Option<PathBuf>) -> PathBuf {
    match path {
        Some(p) if p.is_absolute() => p,
        Some(p) => std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(p),
        None => std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(DEFAULT_CONFIG_FILE),
    }
}
