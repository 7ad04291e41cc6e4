//! Fixed endpoints, identifiers, and tunables shared across the crate.

use std::time::Duration;

/// Microsoft identity platform authorization endpoint.
pub const AUTH_ENDPOINT: &str =
    "https://login.microsoftonline.com/common/oauth2/v2.0/authorize";

/// Microsoft identity platform token endpoint.
pub const TOKEN_ENDPOINT: &str =
    "https://login.microsoftonline.com/common/oauth2/v2.0/token";

/// Base URL for Microsoft Graph v1.0.
pub const GRAPH_BASE: &str = "https://graph.microsoft.com/v1.0";

/// OAuth client id of rclone's published OneDrive app registration.
pub const CLIENT_ID: &str = "b15665d9-eda6-4092-8539-0eec376afd59";

/// Client secret paired with [`CLIENT_ID`]. Public knowledge, not a secret of
/// this tool.
pub const CLIENT_SECRET: &str = "qtyfaBBYA403=unZUP40~_#";

/// Loopback port the authorization redirect lands on. Must match the
/// redirect URI registered for [`CLIENT_ID`].
pub const CALLBACK_PORT: u16 = 53682;

/// Scopes requested when acquiring an elevated credential: file read/write
/// plus sharing management, and `offline_access` for a refresh token.
pub const ELEVATED_SCOPES: &[&str] = &[
    "Files.Read",
    "Files.ReadWrite",
    "Files.ReadWrite.All",
    "Sites.Manage.All",
    "offline_access",
];

/// Scope token granting write access to the user's own files.
pub const SCOPE_FILES_READWRITE: &str = "Files.ReadWrite";

/// Scope token granting write access to all reachable files.
pub const SCOPE_FILES_READWRITE_ALL: &str = "Files.ReadWrite.All";

/// Scope token required for managing sharing permissions.
pub const SCOPE_SITES_MANAGE_ALL: &str = "Sites.Manage.All";

/// Prefix shared by every file-read scope token.
pub const SCOPE_FILES_READ_PREFIX: &str = "Files.Read";

/// Per-request timeout for all Graph and token-endpoint calls.
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// How long the acquisition flow waits for the browser redirect. Generous
/// because it waits on a human.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(300);

/// Freshness buffer applied to expiry checks, guarding against tokens that
/// expire mid-request.
pub const EXPIRY_BUFFER_SECS: i64 = 300;

/// Wait applied to a 429 response that carries no `Retry-After` hint.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(60);

/// Wait applied before retrying a transient 5xx response.
pub const TRANSIENT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Bound on automatic retries of a single remote call.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;
