//! Apply the whole ordered patch set to the source tree, stopping at the first failure.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing::warn;

use safe_patch::interrupt;
use safe_patch::lock::acquire_tree_lock;
use safe_patch::orchestrator::BatchApply;
use safe_patch::preflight::{ensure_tools, REQUIRED_TOOLS};
use safe_patch::ui::{print_error, print_rejects, print_success, print_warning, ConsoleProgress};
use safe_patch::{
    format_elapsed, list_patches, resolve_source_dir, set_color_mode, telemetry, ApplyOutcome,
    ColorMode, Direction, ExecService, FsRejectScanner, GitVcs, InterruptFlag, OutputMode,
    PatchError, PatchResult, RunContext, Settings, ShellPatchTool, TempCwd, PATCH_SUFFIX,
};

#[derive(Parser, Debug)]
#[command(
    name = "apply-patches",
    about = "Apply every patch in order to the source tree",
    disable_version_flag = true
)]
struct Args {
    /// Directory holding the source tree(s) and the patches directory
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Source tree version (requires --release)
    #[arg(long)]
    version: Option<String>,

    /// Source tree release (requires --version)
    #[arg(long)]
    release: Option<String>,

    /// Patches directory [default: <root>/patches]
    #[arg(long = "patches-dir")]
    patches_dir: Option<PathBuf>,

    /// Maximum context lines patch may ignore per hunk [default: 2]
    #[arg(long)]
    fuzz: Option<u32>,

    /// Take the patch set back out, last patch first
    #[arg(long, short = 'R')]
    reverse: bool,

    /// Only report failures
    #[arg(long, short = 's')]
    silent: bool,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum)]
    color: Option<ColorMode>,

    /// Echo commands and enable debug logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let settings = Settings::from_env();
    if let Some(mode) = args.color.or(settings.color) {
        set_color_mode(mode);
    }
    telemetry::init(args.verbose);
    if let Err(e) = interrupt::install_handlers() {
        warn!(error = %e, "could not install signal handlers");
    }
    let ctx = RunContext::new(InterruptFlag::from_signals());

    let code = match run(&args, &settings, &ctx) {
        Ok(code) => code,
        Err(e) => {
            if matches!(e, PatchError::Interrupted) {
                print_error("\n\nInterrupted by user");
            } else {
                print_error(&e.to_string());
                if let Some(hint) = safe_patch::guidance::hint_for(&e) {
                    print_warning(hint);
                }
            }
            e.exit_code()
        }
    };
    ExitCode::from(code)
}

fn absolute(p: &Path) -> PatchResult<PathBuf> {
    std::fs::canonicalize(p)
        .map_err(|e| PatchError::resolution(format!("{}: {e}", p.display())))
}

fn run(args: &Args, settings: &Settings, ctx: &RunContext) -> PatchResult<u8> {
    ensure_tools(REQUIRED_TOOLS)?;
    let root = absolute(&args.root)?;
    let (version, release) = match (args.version.as_deref(), args.release.as_deref()) {
        (Some(v), Some(r)) => (Some(v), Some(r)),
        (None, None) => (None, None),
        _ => {
            print_warning(
                "--version and --release must be given together; autodetecting the source tree",
            );
            (None, None)
        }
    };
    let src_dir = resolve_source_dir(&root, version, release, &settings.source_prefix)?;

    let patches_dir = args
        .patches_dir
        .clone()
        .or_else(|| settings.patches_dir.clone())
        .unwrap_or_else(|| root.join("patches"));
    let patches_dir = absolute(&patches_dir)?;
    let patches = list_patches(&patches_dir, PATCH_SUFFIX)?;

    let _lock = acquire_tree_lock(&src_dir)?;
    let _cwd = TempCwd::enter(&src_dir).map_err(anyhow::Error::new)?;

    let exec = ExecService::default().with_echo(args.verbose);
    let vcs = GitVcs::new(&exec);
    let output = if args.silent {
        OutputMode::Discard
    } else {
        OutputMode::Inherit
    };
    let tool = ShellPatchTool::new(&exec).with_apply_output(output);
    let rejects = FsRejectScanner;
    let progress = ConsoleProgress::new(args.silent);

    let direction = if args.reverse {
        Direction::Reverse
    } else {
        Direction::Forward
    };
    let report = BatchApply::new(&tool, &vcs, &rejects)
        .with_fuzz(args.fuzz.unwrap_or(settings.fuzz))
        .with_direction(direction)
        .with_progress(&progress)
        .run(ctx, &src_dir, &patches)?;

    if let Some(entry) = report.halting_entry() {
        match &entry.outcome {
            ApplyOutcome::Rejected(paths) => {
                print_error(&format!("Patch {} had rejected hunks", entry.patch));
                print_rejects(paths, &[]);
            }
            ApplyOutcome::Failed(reason) => {
                print_error(&format!("Patch {} failed: {reason}", entry.patch));
            }
            _ => {}
        }
        println!("\nElapsed time: {}", format_elapsed(report.elapsed));
        return Ok(report.exit_code());
    }

    if !args.silent {
        let skipped_as = match direction {
            Direction::Forward => "already applied",
            Direction::Reverse => "not applied",
        };
        print_success(&format!(
            "{} patch(es) processed, {} {skipped_as}",
            report.entries.len(),
            report.skipped()
        ));
    }
    if ctx.should_report_elapsed() {
        println!("\nElapsed time: {}", format_elapsed(report.elapsed));
    }
    Ok(report.exit_code())
}
