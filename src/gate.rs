use anyhow::Result;

use crate::{
    build,
    cli::{CheckOpts, RunOpts},
    config::{self, GateSettings},
    staleness::{self, StaleReason, Verdict},
    vcs,
};

/// Check the artifact and run the build if it is stale.
pub fn run(opts: RunOpts) -> Result<()> {
    let settings = config::resolve(&opts.gate)?;
    let verdict = if opts.force {
        Verdict::stale(StaleReason::Forced)
    } else {
        evaluate(&settings)
    };
    run_with(&settings, &verdict)?;
    Ok(())
}

/// Print the verdict and return whether the artifact is stale.
pub fn check(opts: &CheckOpts) -> Result<bool> {
    let settings = config::resolve(&opts.gate)?;
    let verdict = evaluate(&settings);
    println!("{}", describe(&verdict));
    Ok(verdict.is_stale())
}

/// Process exit code for `check`: 1 when stale and `--exit-code` was given.
pub fn check_exit_code(stale: bool, exit_code: bool) -> Option<i32> {
    (stale && exit_code).then_some(1)
}

pub fn evaluate(settings: &GateSettings) -> Verdict {
    tracing::debug!(
        artifact = %settings.artifact.display(),
        root = %settings.root.display(),
        vcs = settings.vcs.as_str(),
        "checking artifact freshness"
    );
    staleness::evaluate(&settings.artifact, || {
        vcs::tracked_files(settings.vcs, &settings.root)
    })
}

/// Build when `verdict` is stale. Returns whether a build was spawned.
pub fn run_with(settings: &GateSettings, verdict: &Verdict) -> Result<bool> {
    match &verdict.reason {
        Some(reason) => {
            tracing::info!(%reason, artifact = %settings.artifact.display(), "artifact is stale");
            build::trigger(&settings.build, &settings.root)?;
            Ok(true)
        }
        None => {
            tracing::info!(artifact = %settings.artifact.display(), "artifact is up to date");
            Ok(false)
        }
    }
}

fn describe(verdict: &Verdict) -> String {
    match &verdict.reason {
        Some(reason) => format!("stale: {reason}"),
        None => "up to date".to_string(),
    }
}
