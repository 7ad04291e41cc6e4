//! Credential acquisition and status commands.

use driveacl::oauth::AcquisitionFlow;
use driveacl::{CapabilityLevel, CredentialStore, Session, capability};

pub async fn acquire(store: CredentialStore, remote: &str) -> driveacl::Result<()> {
    let flow = AcquisitionFlow::new()?;
    println!("Opening your browser for authorization...");
    println!("If nothing opens, visit:\n  {}", flow.authorization_url());

    let credential = flow.acquire(&store).await?;
    let level = capability::resolve(&credential);

    println!("Token saved to {}", store.token_path().display());
    match level {
        CapabilityLevel::Full => println!("Capability: full (ACL editing enabled)"),
        level => {
            println!("Capability: {level}");
            println!(
                "The issued scopes do not allow ACL editing; \
                 read operations will still use the {remote} fallback token."
            );
        }
    }
    Ok(())
}

pub fn status(session: &Session) {
    let cred = session.credential();
    println!("remote:      {}", session.remote());
    println!("source:      {}", cred.provenance);
    println!("capability:  {}", session.capability());
    match cred.expires_at {
        Some(at) => {
            let state = if cred.is_stale() { " (stale)" } else { "" };
            println!("expires:     {at}{state}");
        }
        None => println!("expires:     unknown"),
    }
    match &cred.scope {
        Some(scope) => println!("scopes:      {scope}"),
        None => println!("scopes:      (none recorded)"),
    }
}
