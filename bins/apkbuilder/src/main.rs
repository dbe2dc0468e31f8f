//! apkbuilder
//!
//! Publishes an Android project to GitHub, waits for the GitHub Actions build
//! of that push, and downloads the APK.

use apkbuilder_android::BuildType;
use apkbuilder_cli::output::Status;
use apkbuilder_cli::GlobalArgs;
use apkbuilder_core::error::exit_codes;
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;

const LONG_ABOUT: &str = "\
Publishes an Android project to GitHub, waits for the GitHub Actions build \
of that push, and downloads the APK.

`build` force-pushes the project to the configured branch. apkbuilder \
assumes it is the only writer to that branch: the last push wins and \
overwrites whatever was there. Pass --expect-remote-head to refuse the \
push if someone else moved the branch.

The token is read from APKBUILDER_TOKEN, then GITHUB_TOKEN, then the \
`token` stored by `apkbuilder init --token`.

Exit codes: 0 success, 1 local failure, 3 precondition, 4 transport, \
5 remote build failed, 6 conflict, 124 timeout, 130 cancelled.";

#[derive(Parser)]
#[command(name = "apkbuilder")]
#[command(about = "Build Android APKs on GitHub Actions")]
#[command(long_about = LONG_ABOUT)]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write apkbuilder.toml for a project
    Init(commands::init::InitArgs),

    /// Push the project, wait for the CI build, download the APK
    Build {
        /// Build type
        #[arg(value_enum, default_value_t = BuildType::Debug)]
        build_type: BuildType,

        /// Only push if the remote branch is still at this commit
        #[arg(long, value_name = "SHA")]
        expect_remote_head: Option<String>,
    },

    /// Wait for the CI build of the current HEAD without pushing
    Wait {
        /// Build type
        #[arg(value_enum, default_value_t = BuildType::Debug)]
        build_type: BuildType,
    },

    /// Download the APK of the newest successful build
    Download {
        /// Build type
        #[arg(value_enum, default_value_t = BuildType::Debug)]
        build_type: BuildType,

        /// Take the artifact from this run instead
        #[arg(long)]
        run_id: Option<u64>,
    },

    /// Print the project configuration as JSON
    Info,

    /// Push a commit that tracks only .github/workflows
    #[command(name = "clean-repo")]
    CleanRepo,

    /// Fast-forward the local project from the CI branch
    Refresh,

    /// Zip the project, minus .git and the config, into the output directory
    Zip,

    /// Delete app/build
    #[command(name = "remove-build")]
    RemoveBuild,

    /// Build locally with the Gradle wrapper
    Assemble {
        /// Build type
        #[arg(value_enum, default_value_t = BuildType::Debug)]
        build_type: BuildType,
    },

    /// Change the application name
    #[command(name = "set-name")]
    SetName {
        /// New application name
        name: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.global.no_color {
        owo_colors::set_override(false);
    }
    init_tracing(&cli.global);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("{} failed to start runtime: {}", "Error:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let global = &cli.global;
    match cli.command {
        Commands::Init(args) => commands::init::run(global, &args),
        Commands::Build {
            build_type,
            expect_remote_head,
        } => commands::build::run(global, build_type, expect_remote_head).await,
        Commands::Wait { build_type } => commands::wait::run(global, build_type).await,
        Commands::Download { build_type, run_id } => {
            commands::download::run(global, build_type, run_id).await
        }
        Commands::Info => commands::info::run(global),
        Commands::CleanRepo => commands::clean_repo::run(global),
        Commands::Refresh => commands::refresh::run(global),
        Commands::Zip => commands::zip::run(global),
        Commands::RemoveBuild => commands::remove_build::run(global),
        Commands::Assemble { build_type } => commands::assemble::run(global, build_type),
        Commands::SetName { name } => commands::set_name::run(global, &name),
    }
}

fn init_tracing(global: &GlobalArgs) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(global.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Print the error and pick the exit code from its kind
fn report(err: &anyhow::Error) -> ExitCode {
    let code = match err.downcast_ref::<apkbuilder_core::Error>() {
        Some(e) => {
            tracing::debug!(code = %e.code, category = e.code.category(), kind = ?e.kind(), "Command failed");
            eprintln!("{} {}", "Error:".red().bold(), e.message);
            if let Some(context) = &e.context {
                eprintln!("  {}", context.dimmed());
            }
            if let Some(suggestion) = &e.suggestion {
                Status::warning(suggestion);
            }
            if let Some(link) = &e.link {
                Status::link("Inspect", link);
            }
            e.kind().exit_code()
        }
        None => {
            eprintln!("{} {:#}", "Error:".red().bold(), err);
            exit_codes::FAILURE
        }
    };
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}
