use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rosr_types::Uri;

#[derive(Parser)]
#[command(
    name = "rosr",
    about = "Research object storage -- aggregate, annotate, snapshot and archive",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file; defaults apply when it does not exist
    #[arg(short, long, global = true, default_value = "rosr.toml")]
    pub config: PathBuf,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an empty LIVE research object
    Create(CreateArgs),
    /// Show the aggregation of a research object
    Show(RoArgs),
    /// List research objects
    List(ListArgs),
    /// Aggregate a local file or an external resource
    Aggregate(AggregateArgs),
    /// Annotate resources of a research object
    Annotate(AnnotateArgs),
    /// Create a folder from an N-Triples description
    Folder(FolderArgs),
    /// List the entries of a folder
    Entries(EntriesArgs),
    /// Copy a LIVE research object into a snapshot
    Snapshot(CopyArgs),
    /// Copy a LIVE research object into an archive
    Archive(CopyArgs),
    /// Show evolution information
    Evo(RoArgs),
    /// Delete a research object and everything it aggregates
    Delete(RoArgs),
}

#[derive(Args)]
pub struct CreateArgs {
    pub ro: Uri,
}

#[derive(Args)]
pub struct RoArgs {
    pub ro: Uri,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only research objects created by this user URI
    #[arg(long)]
    pub creator: Option<Uri>,
}

#[derive(Args)]
pub struct AggregateArgs {
    pub ro: Uri,
    /// Path inside the research object, or the resource URI with --external
    pub target: String,
    /// Local file with the content; defaults to `target`
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    #[arg(short, long)]
    pub mime: Option<String>,
    #[arg(long)]
    pub external: bool,
}

#[derive(Args)]
pub struct AnnotateArgs {
    pub ro: Uri,
    /// Body reference, absolute or relative to the research object
    pub body: String,
    #[arg(short, long = "target", required = true)]
    pub targets: Vec<String>,
    #[arg(long)]
    pub id: Option<String>,
    /// Local file to store as the body first
    #[arg(short, long)]
    pub file: Option<PathBuf>,
    #[arg(short, long)]
    pub mime: Option<String>,
}

#[derive(Args)]
pub struct FolderArgs {
    pub ro: Uri,
    /// Folder path inside the research object
    pub path: String,
    /// N-Triples description of the folder and its entries
    pub description: PathBuf,
    #[arg(long)]
    pub root: bool,
}

#[derive(Args)]
pub struct EntriesArgs {
    pub folder: Uri,
}

#[derive(Args)]
pub struct CopyArgs {
    pub ro: Uri,
    pub target: Uri,
}
