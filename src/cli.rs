use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "safe-patch",
    about = "Safely apply a patch with automatic rollback on failure",
    disable_version_flag = true,
    after_help = concat!(
        "Examples:\n",
        "  safe-patch patches/network-patches.patch\n",
        "  safe-patch patches/librewolf/search-config.patch --version 144.0.2 --release beta.26",
    )
)]
pub(crate) struct Cli {
    /// Path to the patch file to apply
    pub patch_file: PathBuf,

    /// Source tree version (requires --release)
    #[arg(long)]
    pub version: Option<String>,

    /// Source tree release (requires --version)
    #[arg(long)]
    pub release: Option<String>,

    /// Don't revert on failure; leave changes for inspection
    #[arg(long = "no-revert")]
    pub no_revert: bool,

    /// Name of the checkpoint tag [default: safe-patch-checkpoint]
    #[arg(long = "checkpoint-tag")]
    pub checkpoint_tag: Option<String>,

    /// Maximum context lines patch may ignore per hunk [default: 2]
    #[arg(long)]
    pub fuzz: Option<u32>,

    /// Directory holding the source tree(s)
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Continue without asking when the patch already appears applied
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Colorize output: auto|always|never
    #[arg(long = "color", value_enum)]
    pub color: Option<safe_patch::ColorMode>,

    /// Echo commands and enable debug logging
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
