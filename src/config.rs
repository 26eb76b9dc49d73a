use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use shellexpand::tilde;

use crate::{cli::GateOpts, vcs::VcsKind};

pub const DEFAULT_CONFIG_FILE: &str = "assetgate.toml";
pub const DEFAULT_BUILD_COMMAND: &str = "deno task build";

/// Contents of assetgate.toml. Every field is optional so CLI flags can fill gaps.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Built artifact whose freshness is checked.
    #[serde(default)]
    pub artifact: Option<String>,
    /// Build command line, split shell-style.
    #[serde(default, alias = "command")]
    pub build: Option<String>,
    #[serde(default)]
    pub vcs: Option<VcsKind>,
    /// Repository root; defaults to the config file's directory.
    #[serde(default)]
    pub root: Option<String>,
}

/// Fully resolved settings for one gate run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateSettings {
    pub artifact: PathBuf,
    /// Program followed by its arguments.
    pub build: Vec<String>,
    pub vcs: VcsKind,
    pub root: PathBuf,
}

pub fn expand_path(raw: &str) -> PathBuf {
    let tilde_expanded = tilde(raw).into_owned();
    let env_expanded = match shellexpand::env(&tilde_expanded) {
        Ok(val) => val.into_owned(),
        Err(_) => tilde_expanded,
    };
    PathBuf::from(env_expanded)
}

pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    parse(&contents).with_context(|| format!("failed to parse config at {}", path.display()))
}

pub fn parse(contents: &str) -> Result<Config> {
    Ok(toml::from_str(contents)?)
}

/// Resolve settings from the current directory.
pub fn resolve(opts: &GateOpts) -> Result<GateSettings> {
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    resolve_in(opts, &cwd)
}

/// Merge CLI options over the config file, resolving relative paths from `cwd`.
pub fn resolve_in(opts: &GateOpts, cwd: &Path) -> Result<GateSettings> {
    let (cfg, base_dir) = match &opts.config {
        Some(path) => {
            let path = absolutize(path.clone(), cwd);
            let cfg = load(&path)?;
            let dir = path.parent().map(Path::to_path_buf).unwrap_or(cwd.to_path_buf());
            (cfg, dir)
        }
        None => {
            let path = cwd.join(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                (load(&path)?, cwd.to_path_buf())
            } else {
                (Config::default(), cwd.to_path_buf())
            }
        }
    };

    let root = match opts.root.as_deref().or(cfg.root.as_deref()) {
        Some(raw) => absolutize(expand_path(raw), &base_dir),
        None => base_dir,
    };

    let Some(raw_artifact) = opts.artifact.as_deref().or(cfg.artifact.as_deref()) else {
        bail!(
            "no artifact configured. Pass --artifact or set `artifact` in {}.",
            DEFAULT_CONFIG_FILE
        );
    };
    let artifact = absolutize(expand_path(raw_artifact), &root);

    let raw_build = opts
        .build
        .as_deref()
        .or(cfg.build.as_deref())
        .unwrap_or(DEFAULT_BUILD_COMMAND);
    let build = shell_words::split(raw_build)
        .with_context(|| format!("failed to parse build command `{raw_build}`"))?;
    if build.is_empty() {
        bail!("build command is empty");
    }

    Ok(GateSettings {
        artifact,
        build,
        vcs: opts.vcs.or(cfg.vcs).unwrap_or_default(),
        root,
    })
}

fn absolutize(path: PathBuf, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_full_config() {
        let cfg = parse(
            r#"
artifact = "resources/preview/app.js"
build = "npm run build -- --minify"
vcs = "jj"
root = "../.."
"#,
        )
        .unwrap();
        assert_eq!(cfg.artifact.as_deref(), Some("resources/preview/app.js"));
        assert_eq!(cfg.build.as_deref(), Some("npm run build -- --minify"));
        assert_eq!(cfg.vcs, Some(VcsKind::Jj));
        assert_eq!(cfg.root.as_deref(), Some("../.."));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(parse("artefact = \"x.js\"").is_err());
    }

    #[test]
    fn expand_path_supports_tilde_and_env() {
        let home = std::env::var("HOME").expect("HOME must be set for tests");
        let expected = PathBuf::from(&home).join("projects/demo");

        assert_eq!(expand_path("~/projects/demo"), expected);
        assert_eq!(expand_path("$HOME/projects/demo"), expected);
    }

    #[test]
    fn defaults_without_config_file() {
        let tmp = TempDir::new().unwrap();
        let opts = GateOpts {
            artifact: Some("dist/app.js".to_string()),
            ..GateOpts::default()
        };

        let settings = resolve_in(&opts, tmp.path()).unwrap();
        assert_eq!(settings.artifact, tmp.path().join("dist/app.js"));
        assert_eq!(settings.build, vec!["deno", "task", "build"]);
        assert_eq!(settings.vcs, VcsKind::Git);
        assert_eq!(settings.root, tmp.path());
    }

    #[test]
    fn missing_artifact_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = resolve_in(&GateOpts::default(), tmp.path()).unwrap_err();
        assert!(err.to_string().contains("no artifact configured"));
    }

    #[test]
    fn cli_overrides_config_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(DEFAULT_CONFIG_FILE),
            r#"
artifact = "from-config.js"
build = "make bundle"
vcs = "jj"
"#,
        )
        .unwrap();
        let opts = GateOpts {
            artifact: Some("from-cli.js".to_string()),
            vcs: Some(VcsKind::Git),
            ..GateOpts::default()
        };

        let settings = resolve_in(&opts, tmp.path()).unwrap();
        assert_eq!(settings.artifact, tmp.path().join("from-cli.js"));
        assert_eq!(settings.build, vec!["make", "bundle"]);
        assert_eq!(settings.vcs, VcsKind::Git);
    }

    #[test]
    fn relative_root_resolves_from_config_dir() {
        let tmp = TempDir::new().unwrap();
        let pkg = tmp.path().join("web/preview");
        fs::create_dir_all(&pkg).unwrap();
        fs::write(
            pkg.join("gate.toml"),
            "artifact = \"out/app.js\"\nroot = \"..\"\n",
        )
        .unwrap();
        let opts = GateOpts {
            config: Some(PathBuf::from("web/preview/gate.toml")),
            ..GateOpts::default()
        };

        let settings = resolve_in(&opts, tmp.path()).unwrap();
        assert_eq!(settings.root, pkg.join(".."));
        assert_eq!(settings.artifact, pkg.join("..").join("out/app.js"));
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let opts = GateOpts {
            config: Some(PathBuf::from("nope.toml")),
            artifact: Some("app.js".to_string()),
            ..GateOpts::default()
        };
        assert!(resolve_in(&opts, tmp.path()).is_err());
    }

    #[test]
    fn empty_build_command_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let opts = GateOpts {
            artifact: Some("app.js".to_string()),
            build: Some("   ".to_string()),
            ..GateOpts::default()
        };
        let err = resolve_in(&opts, tmp.path()).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }
}
