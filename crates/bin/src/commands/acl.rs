//! ACL inspection and mutation commands.

use std::io::{self, BufRead, Write};

use driveacl::Session;
use driveacl::engine::{AclEngine, RemoveOutcome};
use driveacl::graph::GraphClient;

use crate::cli::{BulkRemoveArgs, InviteArgs, ListArgs, RemoveArgs, StripArgs};
use crate::output;

pub async fn list(
    engine: &AclEngine<GraphClient>,
    session: &mut Session,
    args: &ListArgs,
) -> driveacl::Result<()> {
    let (item, entries) = engine.list_acl(session, &args.path).await?;
    output::print_permissions(&item.path, &entries);
    Ok(())
}

pub async fn invite(
    engine: &AclEngine<GraphClient>,
    session: &mut Session,
    args: &InviteArgs,
) -> driveacl::Result<()> {
    let receipt = engine
        .invite(session, &args.path, &args.email, args.role.into())
        .await?;
    println!(
        "granted {} access on {} to {}",
        receipt.role.as_str(),
        receipt.item.path,
        receipt.email
    );
    for entry in &receipt.granted {
        println!("  permission {}", entry.id);
    }
    Ok(())
}

pub async fn remove(
    engine: &AclEngine<GraphClient>,
    session: &mut Session,
    args: &RemoveArgs,
) -> driveacl::Result<()> {
    match engine
        .remove_by_email(session, &args.path, &args.email)
        .await?
    {
        RemoveOutcome::Removed { permission_ids } => {
            println!(
                "removed {} grant(s) for {} on {}",
                permission_ids.len(),
                args.email,
                args.path
            );
        }
        RemoveOutcome::NothingToRemove => {
            println!("{} holds no grant on {}", args.email, args.path);
        }
    }
    Ok(())
}

pub async fn strip(
    engine: &AclEngine<GraphClient>,
    session: &mut Session,
    args: &StripArgs,
) -> driveacl::Result<()> {
    let report = engine.strip_explicit(session, &args.path).await?;
    output::print_strip_report(&args.path, &report);
    if !report.is_clean() {
        std::process::exit(1);
    }
    Ok(())
}

pub async fn bulk_remove(
    engine: &AclEngine<GraphClient>,
    session: &mut Session,
    args: &BulkRemoveArgs,
) -> driveacl::Result<()> {
    if args.dry_run {
        return bulk_dry_run(engine, session, args).await;
    }

    if !args.yes && !confirm_bulk(&args.email, args.paths.len())? {
        println!("aborted");
        return Ok(());
    }

    let report = engine
        .bulk_remove_user(session, &args.paths, &args.email)
        .await?;
    output::print_bulk_report(&args.email, &report);
    if !report.failures.is_empty() || report.aborted {
        std::process::exit(1);
    }
    Ok(())
}

/// List what a bulk removal would touch without mutating anything.
async fn bulk_dry_run(
    engine: &AclEngine<GraphClient>,
    session: &mut Session,
    args: &BulkRemoveArgs,
) -> driveacl::Result<()> {
    for path in &args.paths {
        match engine.list_acl(session, path).await {
            Ok((item, entries)) => {
                let targets: Vec<&str> = entries
                    .iter()
                    .filter(|p| !p.is_owner() && p.grants_to(&args.email))
                    .map(|p| p.id.as_str())
                    .collect();
                if targets.is_empty() {
                    println!("{}: no grant for {}", item.path, args.email);
                } else {
                    println!("{}: would remove {}", item.path, targets.join(", "));
                }
            }
            Err(e) if e.is_not_found() => println!("{path}: not found"),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn confirm_bulk(email: &str, count: usize) -> io::Result<bool> {
    print!("Remove {email} from {count} path(s)? [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    let answer = answer.trim().to_ascii_lowercase();
    Ok(answer == "y" || answer == "yes")
}
