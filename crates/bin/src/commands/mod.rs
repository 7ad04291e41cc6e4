//! Command implementations and shared session plumbing.

pub mod acl;
pub mod auth;
pub mod scan;

use driveacl::engine::AclEngine;
use driveacl::graph::GraphClient;
use driveacl::{CredentialStore, Session};

use crate::cli::{Cli, Commands};

fn build_store(cli: &Cli) -> driveacl::Result<CredentialStore> {
    let store = match &cli.token_file {
        Some(path) => CredentialStore::with_token_path(path.clone())?,
        None => CredentialStore::discover()?,
    };
    Ok(store)
}

fn load_session(cli: &Cli) -> driveacl::Result<Session> {
    let store = build_store(cli)?;
    Ok(Session::load(store, cli.remote.clone())?)
}

pub async fn run(cli: Cli) -> driveacl::Result<()> {
    match &cli.command {
        Commands::List(args) => {
            let mut session = load_session(&cli)?;
            let engine = AclEngine::new(GraphClient::new()?);
            acl::list(&engine, &mut session, args).await
        }
        Commands::Invite(args) => {
            let mut session = load_session(&cli)?;
            let engine = AclEngine::new(GraphClient::new()?);
            acl::invite(&engine, &mut session, args).await
        }
        Commands::Remove(args) => {
            let mut session = load_session(&cli)?;
            let engine = AclEngine::new(GraphClient::new()?);
            acl::remove(&engine, &mut session, args).await
        }
        Commands::Strip(args) => {
            let mut session = load_session(&cli)?;
            let engine = AclEngine::new(GraphClient::new()?);
            acl::strip(&engine, &mut session, args).await
        }
        Commands::BulkRemoveUser(args) => {
            let mut session = load_session(&cli)?;
            let engine = AclEngine::new(GraphClient::new()?);
            acl::bulk_remove(&engine, &mut session, args).await
        }
        Commands::Scan(args) => {
            let mut session = load_session(&cli)?;
            let engine = AclEngine::new(GraphClient::new()?);
            scan::run(&engine, &mut session, args).await
        }
        Commands::Auth => {
            let store = build_store(&cli)?;
            auth::acquire(store, &cli.remote).await
        }
        Commands::Status => {
            let session = load_session(&cli)?;
            auth::status(&session);
            Ok(())
        }
    }
}
