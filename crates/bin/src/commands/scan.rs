//! Drive scan command: walk folders and report shared items.

use driveacl::Session;
use driveacl::engine::AclEngine;
use driveacl::graph::{AclApi, GraphClient};
use driveacl::scanner::SharedItemScanner;

use crate::cli::ScanArgs;
use crate::output;

pub async fn run(
    engine: &AclEngine<GraphClient>,
    session: &mut Session,
    args: &ScanArgs,
) -> driveacl::Result<()> {
    let credential = session.credential().clone();
    let api = engine.api();

    let mut scanner = match &args.root {
        Some(root) => {
            let item = api.resolve_item(&credential, root).await?;
            SharedItemScanner::rooted_at(api, credential, item)
        }
        None => SharedItemScanner::new(api, credential),
    };

    let mut found = 0usize;
    while found < args.max_results {
        match scanner.next().await? {
            Some(hit) => {
                output::print_shared_item(&hit);
                found += 1;
            }
            None => break,
        }
    }

    if found == args.max_results {
        println!("(stopped at {} results)", args.max_results);
    }
    println!(
        "{} shared item(s) across {} folder(s)",
        found,
        scanner.folders_listed()
    );
    Ok(())
}
