use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "upa", version)]
#[command(about = "Your simple command line UPA: list, copy, move, rename and group images", long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// No output at all; confirmations become fatal
    #[arg(short, long, visible_alias = "silent", global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Debug output, every line tagged with its level
    #[arg(long, visible_alias = "debug", global = true)]
    pub verbose: bool,

    /// Suppress warnings but keep every other output
    #[arg(long, global = true)]
    pub suppress_warnings: bool,

    /// List the supported file formats
    #[arg(long)]
    pub supported_formats: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List all (filtered) images found in the source directories
    List(ListingArgs),
    /// Copy all (filtered) images to the target directory
    Copy(TransferArgs),
    /// Move all (filtered) images to the target directory
    Move(TransferArgs),
    /// Rename all (filtered) images after their creation time
    Rename(RenameArgs),
    /// Move all (filtered) images into dated folders below the target directory
    Group(GroupArgs),
    /// Resize or convert images
    Transform(TransformArgs),
}

impl Commands {
    pub fn name(&self) -> &'static str {
        match self {
            Commands::List(_) => "list",
            Commands::Copy(_) => "copy",
            Commands::Move(_) => "move",
            Commands::Rename(_) => "rename",
            Commands::Group(_) => "group",
            Commands::Transform(_) => "transform",
        }
    }

    pub fn wants_progress(&self) -> bool {
        match self {
            Commands::List(_) => false,
            Commands::Copy(args) | Commands::Move(args) => args.io.run.progress,
            Commands::Rename(args) => args.run.progress,
            Commands::Group(args) => args.io.run.progress,
            Commands::Transform(args) => args.io.run.progress,
        }
    }
}

#[derive(Debug, Args)]
pub struct ListingArgs {
    /// Source directory (repeatable)
    #[arg(short = 's', long = "source", visible_alias = "dir", default_value = "./")]
    pub sources: Vec<PathBuf>,

    /// Traverse the source directories recursively
    #[arg(short, long)]
    pub recursive: bool,

    /// Match the file names against the given regex
    #[arg(long = "match", visible_alias = "regex", value_name = "REGEX")]
    pub pattern: Option<String>,

    /// chrono format of --after and --before [default: %Y-%m-%d]
    #[arg(long)]
    pub datetime_format: Option<String>,

    /// Only images created after the given date (exclusive)
    #[arg(long, value_name = "DATETIME")]
    pub after: Option<String>,

    /// Only images created before the given date (exclusive)
    #[arg(long, value_name = "DATETIME")]
    pub before: Option<String>,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Show a progress bar
    #[arg(short, long)]
    pub progress: bool,

    /// Simulate every file operation without doing it
    #[arg(long, visible_alias = "noop")]
    pub dry_run: bool,
}

#[derive(Debug, Args)]
pub struct IoArgs {
    /// Target directory
    #[arg(short = 't', long = "target", visible_alias = "dest", default_value = "./")]
    pub target: PathBuf,

    /// Create a missing target directory
    #[arg(long, visible_alias = "mkdirs")]
    pub create_directories: bool,

    /// Overwrite existing images without asking
    #[arg(long, visible_alias = "overwrite")]
    pub force: bool,

    /// Skip existing images without asking
    #[arg(long, visible_alias = "skip")]
    pub skip_existing: bool,

    #[command(flatten)]
    pub run: RunArgs,
}

#[derive(Debug, Args)]
pub struct TransferArgs {
    #[command(flatten)]
    pub listing: ListingArgs,

    #[command(flatten)]
    pub io: IoArgs,
}

#[derive(Debug, Args)]
pub struct RenameArgs {
    #[command(flatten)]
    pub listing: ListingArgs,

    #[command(flatten)]
    pub run: RunArgs,

    /// chrono format of the new file names [default: %Y%m%d_%H%M%S%3f]
    #[arg(long, value_name = "DATETIME_FORMAT")]
    pub scheme: Option<String>,
}

#[derive(Debug, Args)]
pub struct GroupArgs {
    #[command(flatten)]
    pub listing: ListingArgs,

    #[command(flatten)]
    pub io: IoArgs,

    /// chrono format of the dated folder names [default: %Y-%m-%d]
    #[arg(long, value_name = "DATE_FORMAT")]
    pub date_format: Option<String>,

    /// Event name appended to the folder name
    #[arg(long)]
    pub event: Option<String>,

    /// Location name appended to the folder name
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Args)]
pub struct TransformArgs {
    #[command(flatten)]
    pub listing: ListingArgs,

    #[command(flatten)]
    pub io: IoArgs,

    /// Keep the original and work on a copy with this file name suffix
    #[arg(long, default_value = "_new")]
    pub suffix: String,

    /// New image width in px
    #[arg(short, long)]
    pub width: Option<u32>,

    /// New image height in px
    #[arg(long)]
    pub height: Option<u32>,

    /// New image format (see --supported-formats)
    #[arg(long)]
    pub format: Option<String>,

    /// New image quality between 0 and 100
    #[arg(long, default_value_t = 70, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: u8,
}
