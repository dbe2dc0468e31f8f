//! `build`: publish, wait for CI, download the APK

use super::{
    backend, ctrl_c_token, load_config, poll_config, publisher, require_gh, resolve_credential,
};
use apkbuilder_android::BuildType;
use apkbuilder_cli::output::{format_duration, format_size, Status};
use apkbuilder_cli::{GlobalArgs, TerminalSink};
use apkbuilder_core::config::Config;
use apkbuilder_core::credential::Credential;
use apkbuilder_core::git::PushMode;
use apkbuilder_core::{Error, Result};
use apkbuilder_pipeline::{ArtifactSpec, BuildOutcome, RemoteBuild, Revision, SystemClock};

pub async fn run(
    global: &GlobalArgs,
    build_type: BuildType,
    expect_remote_head: Option<String>,
) -> anyhow::Result<()> {
    let config = load_config(global)?;
    config.repo_slug()?;
    let credential = resolve_credential(&config)?;
    if credential.is_some() {
        require_gh()?;
    }

    let mode = match expect_remote_head {
        Some(sha) => PushMode::ForceWithLease(sha),
        None => PushMode::Force,
    };

    let revision = publisher(&config).publish(credential.as_ref(), &mode)?;
    Status::success(&format!(
        "Pushed {} to {}",
        revision.short(),
        config.schema.build.branch
    ));

    let credential = credential.ok_or_else(Error::missing_credential)?;
    await_build(&config, &credential, &revision, build_type).await?;
    Ok(())
}

/// Wait for `revision`'s run and download its APK, reporting on the terminal
pub(crate) async fn await_build(
    config: &Config,
    credential: &Credential,
    revision: &Revision,
    build_type: BuildType,
) -> Result<()> {
    let backend = backend(config, credential)?;
    let artifact = ArtifactSpec::for_build(build_type, config.schema.build.artifact_name.as_deref());
    let out_dir = config.output_dir();
    let mut sink = TerminalSink::new();

    let outcome = RemoteBuild::new(&backend, &SystemClock, poll_config(config))
        .with_cancel(ctrl_c_token())
        .complete(revision, &artifact, &out_dir, &mut sink)
        .await;

    match outcome {
        Ok(BuildOutcome::Delivered {
            artifact: path,
            elapsed,
            ..
        }) => {
            sink.finish(true, &format!("Build finished in {}", format_duration(elapsed)));
            let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
            Status::success(&format!("Saved {} ({})", path.display(), format_size(size)));
            Ok(())
        }
        Ok(failed @ BuildOutcome::Failed { .. }) => {
            sink.finish(false, "Build failed");
            failed.into_result().map(|_| ())
        }
        Err(e) => {
            sink.finish(false, &e.message);
            Err(e)
        }
    }
}
