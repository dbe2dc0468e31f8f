//! `download`: fetch the APK of a successful run

use super::{backend, ctrl_c_token, load_config, require_gh, resolve_credential};
use apkbuilder_android::BuildType;
use apkbuilder_cli::output::{format_size, Status};
use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::Error;
use apkbuilder_pipeline::{ArtifactRetriever, ArtifactSpec};

pub async fn run(
    global: &GlobalArgs,
    build_type: BuildType,
    run_id: Option<u64>,
) -> anyhow::Result<()> {
    let config = load_config(global)?;
    let credential = resolve_credential(&config)?.ok_or_else(Error::missing_credential)?;
    require_gh()?;
    let backend = backend(&config, &credential)?;

    let artifact = ArtifactSpec::for_build(build_type, config.schema.build.artifact_name.as_deref());
    let path = ArtifactRetriever::new(&backend, config.schema.poll.success_window)
        .with_cancel(ctrl_c_token())
        .retrieve(run_id, &artifact, &config.output_dir())
        .await?;

    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
    Status::success(&format!("Saved {} ({})", path.display(), format_size(size)));
    Ok(())
}
