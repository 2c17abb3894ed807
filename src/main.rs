mod cli;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

use cli::Cli;
use safe_patch::color::{color_enabled_stdout, paint, YELLOW};
use safe_patch::guidance;
use safe_patch::interrupt;
use safe_patch::lock::acquire_tree_lock;
use safe_patch::orchestrator::{Disposition, SafeApply, SafeApplyOptions};
use safe_patch::ports::{Prompter, Vcs};
use safe_patch::preflight::{ensure_tools, REQUIRED_TOOLS};
use safe_patch::ui::{
    print_banner_line, print_error, print_rejects, print_success, print_warning, AutoConfirm,
    ConsoleProgress, StdinPrompter,
};
use safe_patch::{
    resolve_source_dir, set_color_mode, telemetry, ExecService, FsRejectScanner, GitVcs,
    InterruptFlag, PatchError, PatchResult, RunContext, Settings, ShellPatchTool, TempCwd,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::from_env();
    if let Some(mode) = cli.color.or(settings.color) {
        set_color_mode(mode);
    }
    telemetry::init(cli.verbose);
    if let Err(e) = interrupt::install_handlers() {
        warn!(error = %e, "could not install signal handlers");
    }
    let ctx = RunContext::new(InterruptFlag::from_signals());

    match run(&cli, &settings, &ctx) {
        Ok(code) => ExitCode::from(code),
        Err(PatchError::Interrupted) => {
            print_error("\n\nInterrupted by user");
            ExitCode::from(PatchError::Interrupted.exit_code())
        }
        Err(e) => {
            print_error(&e.to_string());
            if let Some(hint) = guidance::hint_for(&e) {
                print_warning(hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn absolute(p: &Path) -> PatchResult<PathBuf> {
    if p.is_absolute() {
        return Ok(p.to_path_buf());
    }
    let cwd = std::env::current_dir().map_err(anyhow::Error::new)?;
    Ok(cwd.join(p))
}

fn run(cli: &Cli, settings: &Settings, ctx: &RunContext) -> PatchResult<u8> {
    let patch = absolute(&cli.patch_file)?;
    if !patch.is_file() {
        return Err(PatchError::resolution(format!(
            "Patch file not found: {}",
            patch.display()
        )));
    }
    ensure_tools(REQUIRED_TOOLS)?;

    let (version, release) = match (cli.version.as_deref(), cli.release.as_deref()) {
        (Some(v), Some(r)) => (Some(v), Some(r)),
        (None, None) => (None, None),
        _ => {
            print_warning(
                "--version and --release must be given together; autodetecting the source tree",
            );
            (None, None)
        }
    };
    let root = absolute(&cli.root)?;
    let src_dir = match resolve_source_dir(&root, version, release, &settings.source_prefix) {
        Ok(dir) => dir,
        Err(e) => {
            print_error(&format!("Could not find source directory: {e}"));
            print_warning("Have you run 'make setup' yet?");
            return Ok(1);
        }
    };

    print_banner_line("Safe Patch Application");
    println!("Source dir: {}", src_dir.display());
    println!(
        "Patch file: {}",
        patch
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );

    let exec = ExecService::default().with_echo(cli.verbose);
    let vcs = GitVcs::new(&exec);
    if !vcs.is_repository(&src_dir) {
        return Err(PatchError::NotARepository { path: src_dir });
    }
    let _lock = acquire_tree_lock(&src_dir)?;
    let _cwd = TempCwd::enter(&src_dir).map_err(anyhow::Error::new)?;

    let tool = ShellPatchTool::new(&exec);
    let rejects = FsRejectScanner;
    let progress = ConsoleProgress::new(false);
    let prompter: &dyn Prompter = if cli.yes { &AutoConfirm } else { &StdinPrompter };
    let tag = cli
        .checkpoint_tag
        .clone()
        .unwrap_or_else(|| settings.checkpoint_tag.clone());
    let options = SafeApplyOptions {
        checkpoint_tag: tag.clone(),
        fuzz: cli.fuzz.unwrap_or(settings.fuzz),
        no_revert: cli.no_revert,
    };

    let report = SafeApply::new(&tool, &vcs, &rejects, prompter)
        .with_options(options)
        .with_progress(&progress)
        .run(ctx, &src_dir, &patch)?;

    match &report.disposition {
        Disposition::Aborted => println!("Aborted"),
        Disposition::Applied(_) => {
            print_success("\nPatch applied successfully!");
            guidance::print_revert_later(&src_dir, &tag);
        }
        Disposition::Rejected { rejects, restored } => {
            print_error("Patch failed with rejected hunks:");
            print_rejects(rejects, &report.excerpts);
            print_error("\nPatch application failed!");
            if *restored {
                println!(
                    "\n{}",
                    paint(color_enabled_stdout(), YELLOW, "Repository restored to previous state")
                );
            } else {
                print_warning("Changes left in place for inspection (--no-revert flag)");
                guidance::print_manual_revert(&src_dir, &tag);
            }
            return Err(PatchError::ApplyConflict {
                patch,
                rejects: rejects.clone(),
            });
        }
    }
    Ok(report.exit_code())
}
