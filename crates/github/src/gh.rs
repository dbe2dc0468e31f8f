//! Artifact download through the GitHub CLI
//!
//! Artifacts are served as zip archives; `gh run download` fetches and
//! unpacks them. `gh` refuses to overwrite files, so it unpacks into a
//! staging directory inside the destination and the file is then renamed
//! over any earlier download.

use crate::error::{ApiError, ApiResult};
use apkbuilder_core::credential::Credential;
use apkbuilder_core::remote::RepoSlug;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info};

/// Download artifact `name` of `run_id` into `dest`, creating it if needed
///
/// The `gh` child is killed if the returned future is dropped.
pub async fn download_artifact(
    repo: &RepoSlug,
    token: &Credential,
    run_id: u64,
    name: &str,
    dest: &Path,
) -> ApiResult<PathBuf> {
    fs::create_dir_all(dest)
        .map_err(|e| ApiError::Download(format!("cannot create {}: {e}", dest.display())))?;
    let staging = tempfile::Builder::new()
        .prefix(".apkbuilder-download-")
        .tempdir_in(dest)
        .map_err(|e| ApiError::Download(format!("cannot stage in {}: {e}", dest.display())))?;

    let run_arg = run_id.to_string();
    let repo_arg = if repo.host == "github.com" {
        repo.full_name()
    } else {
        repo.to_string()
    };

    info!(run_id, artifact = name, dest = %dest.display(), "Downloading artifact");

    let output = Command::new("gh")
        .args(["run", "download", run_arg.as_str()])
        .args(["--repo", repo_arg.as_str(), "--name", name])
        .arg("--dir")
        .arg(staging.path())
        .current_dir(dest)
        .env("GH_TOKEN", token.expose())
        .env("GH_PROMPT_DISABLED", "1")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| ApiError::Download(format!("failed to run gh: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let stdout = String::from_utf8_lossy(&output.stdout);
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        return Err(ApiError::Download(detail.trim().to_string()));
    }

    install(staging.path(), name, dest)
}

/// Move the unpacked artifact from `staging` to `dest/name`
///
/// The archive usually holds a file called `name`; an archive holding a
/// single file under another name is accepted too.
fn install(staging: &Path, name: &str, dest: &Path) -> ApiResult<PathBuf> {
    let unpacked = extracted_file(staging, name)?;
    let target = dest.join(name);
    debug!(from = %unpacked.display(), to = %target.display(), "Installing artifact");

    fs::rename(&unpacked, &target)
        .map_err(|e| ApiError::Download(format!("cannot write {}: {e}", target.display())))?;
    Ok(target)
}

fn extracted_file(staging: &Path, name: &str) -> ApiResult<PathBuf> {
    let named = staging.join(name);
    if named.is_file() {
        return Ok(named);
    }

    let files: Vec<PathBuf> = fs::read_dir(staging)
        .map_err(|e| ApiError::Download(format!("cannot read {}: {e}", staging.display())))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    match files.as_slice() {
        [only] => Ok(only.clone()),
        _ => Err(ApiError::Download(format!(
            "artifact {name} unpacked to {} files, expected one",
            files.len()
        ))),
    }
}
