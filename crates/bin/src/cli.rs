//! CLI argument definitions for the driveacl binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use driveacl::graph::InviteRole;

/// Role granted by an invite
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    /// Read and modify the item
    Write,
    /// View the item only
    Read,
}

impl From<RoleArg> for InviteRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Write => InviteRole::Write,
            RoleArg::Read => InviteRole::Read,
        }
    }
}

/// Inspect and edit OneDrive sharing permissions
#[derive(Parser, Debug)]
#[command(name = "driveacl")]
#[command(about = "driveacl: inspect and edit OneDrive sharing ACLs")]
#[command(version)]
pub struct Cli {
    /// rclone remote name used for the fallback token
    #[arg(long, global = true, default_value = "OneDrive", env = "DRIVEACL_REMOTE")]
    pub remote: String,

    /// Path of the elevated token file (default: the platform config dir)
    #[arg(long, global = true, env = "DRIVEACL_TOKEN_FILE")]
    pub token_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the sharing permissions on an item
    List(ListArgs),
    /// Grant a user access to an item
    Invite(InviteArgs),
    /// Remove a user's access to an item
    Remove(RemoveArgs),
    /// Remove every explicit grant from an item
    Strip(StripArgs),
    /// Remove a user's access across many items
    BulkRemoveUser(BulkRemoveArgs),
    /// Walk the drive and list shared items
    Scan(ScanArgs),
    /// Acquire an elevated token interactively
    Auth,
    /// Show the active credential and its capability
    Status,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Drive path of the item, e.g. "Documents/report.docx"
    pub path: String,
}

#[derive(clap::Args, Debug)]
pub struct InviteArgs {
    /// Drive path of the item
    pub path: String,

    /// Email address of the recipient
    pub email: String,

    /// Role to grant
    #[arg(short, long, default_value = "read")]
    pub role: RoleArg,
}

#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Drive path of the item
    pub path: String,

    /// Email address whose grants are removed
    pub email: String,
}

#[derive(clap::Args, Debug)]
pub struct StripArgs {
    /// Drive path of the item
    pub path: String,
}

#[derive(clap::Args, Debug)]
pub struct BulkRemoveArgs {
    /// Email address whose grants are removed
    pub email: String,

    /// Drive paths of the items
    #[arg(required = true)]
    pub paths: Vec<String>,

    /// Show what would be removed without removing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// Folder to scan under (default: the drive root)
    #[arg(long)]
    pub root: Option<String>,

    /// Stop after this many shared items
    #[arg(long, default_value_t = 1000)]
    pub max_results: usize,
}
