//! `zip`: archive the project into the output directory

use super::load_config;
use apkbuilder_cli::output::{format_size, Status};
use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::git::archive_worktree;
use apkbuilder_core::Error;

const ARCHIVE: &str = "project.zip";

pub fn run(global: &GlobalArgs) -> anyhow::Result<()> {
    let config = load_config(global)?;
    let project_dir = config.project_dir();
    if !project_dir.is_dir() {
        return Err(Error::directory_not_found(&project_dir).into());
    }

    let out_dir = config.output_dir();
    std::fs::create_dir_all(&out_dir)
        .map_err(|e| Error::from(e).with_context(format!("Failed to create {}", out_dir.display())))?;
    let out = out_dir.join(ARCHIVE);

    // Same exclusions as a publish: no token, no earlier downloads
    archive_worktree(&project_dir, &config.publish_excludes(), &out)?;

    let size = std::fs::metadata(&out).map(|m| m.len()).unwrap_or(0);
    Status::success(&format!("Wrote {} ({})", out.display(), format_size(size)));
    Ok(())
}
