//! Gradle build system integration
//!
//! Maps build types to Gradle tasks and APK names, and runs the project's
//! Gradle wrapper for local builds.

use apkbuilder_core::error::{Error, ErrorCode, Result};
use apkbuilder_core::process::run_command_streaming_in_dir;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Gradle's build directory for the app module, relative to the project root
pub const BUILD_DIR: &str = "app/build";

/// Android build variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum BuildType {
    /// Debuggable, debug-signed build
    #[default]
    Debug,
    /// Optimised release build
    Release,
}

impl BuildType {
    /// Lowercase variant name as Gradle spells it in paths
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
        }
    }

    /// Gradle task producing the APK
    pub fn assemble_task(&self) -> &'static str {
        match self {
            Self::Debug => "assembleDebug",
            Self::Release => "assembleRelease",
        }
    }

    /// File name of the APK Gradle produces, also the CI artifact name
    pub fn apk_name(&self) -> String {
        format!("app-{}.apk", self.as_str())
    }

    /// Where a local build leaves the APK, relative to the project root
    pub fn output_path(&self) -> PathBuf {
        Path::new(BUILD_DIR)
            .join("outputs/apk")
            .join(self.as_str())
            .join(self.apk_name())
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Platform-specific wrapper script name
pub fn wrapper_script() -> &'static str {
    if cfg!(windows) {
        "gradlew.bat"
    } else {
        "./gradlew"
    }
}

/// Run a Gradle task through the project's wrapper, streaming output
pub fn run_task(project_dir: &Path, task: &str) -> Result<()> {
    let wrapper = project_dir.join(wrapper_script().trim_start_matches("./"));
    if !wrapper.exists() {
        return Err(Error::new(
            ErrorCode::FileNotFound,
            format!("Gradle wrapper not found in {}", project_dir.display()),
        )
        .with_suggestion("Generate the wrapper with `gradle wrapper` in the project directory"));
    }

    info!(task, dir = %project_dir.display(), "Running Gradle task");
    let code = run_command_streaming_in_dir(wrapper_script(), &[task], project_dir)?;
    if code == 0 {
        Ok(())
    } else {
        Err(Error::new(
            ErrorCode::GradleError,
            format!("Gradle task {task} failed with exit code {code}"),
        ))
    }
}

/// Build an APK locally, returning its path
pub fn assemble(project_dir: &Path, build_type: BuildType) -> Result<PathBuf> {
    run_task(project_dir, build_type.assemble_task())?;

    let apk = project_dir.join(build_type.output_path());
    if apk.exists() {
        Ok(apk)
    } else {
        Err(Error::new(
            ErrorCode::FileNotFound,
            format!("Gradle finished but {} is missing", apk.display()),
        ))
    }
}

/// Delete the app module's build directory
///
/// Returns whether there was anything to delete.
pub fn remove_build_dir(project_dir: &Path) -> Result<bool> {
    let build_dir = project_dir.join(BUILD_DIR);
    if !build_dir.exists() {
        return Ok(false);
    }
    debug!(path = %build_dir.display(), "Removing build directory");
    std::fs::remove_dir_all(&build_dir).map_err(|e| {
        Error::from(e).with_context(format!("Failed to remove {}", build_dir.display()))
    })?;
    Ok(true)
}
