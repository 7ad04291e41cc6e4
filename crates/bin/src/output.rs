//! Output formatting helpers for permission listings and reports.

use driveacl::engine::{BulkRemoveReport, StripReport};
use driveacl::graph::{PermissionEntry, Role};
use driveacl::scanner::SharedItem;

/// Print a table with aligned columns.
///
/// `headers` and each row in `rows` must have the same length.
pub fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    if rows.is_empty() {
        return;
    }

    let col_count = headers.len();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate().take(col_count) {
            widths[i] = widths[i].max(cell.len());
        }
    }

    let header_line: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{:<width$}", h, width = widths[i]))
        .collect();
    println!("{}", header_line.join("  "));

    for row in rows {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .take(col_count)
            .map(|(i, cell)| format!("{:<width$}", cell, width = widths[i]))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn role_name(role: Role) -> &'static str {
    match role {
        Role::Owner => "owner",
        Role::Write => "write",
        Role::Read => "read",
        Role::Unknown => "other",
    }
}

/// One table row describing a permission entry.
pub fn permission_row(entry: &PermissionEntry) -> Vec<String> {
    let roles: Vec<&str> = entry.roles.iter().copied().map(role_name).collect();

    let grantee = if let Some(link) = &entry.link {
        format!(
            "<{} link, {}>",
            link.link_type.as_deref().unwrap_or("sharing"),
            link.scope.as_deref().unwrap_or("unknown scope"),
        )
    } else {
        let names: Vec<String> = entry
            .identities()
            .map(|id| {
                id.email
                    .clone()
                    .or_else(|| id.display_name.clone())
                    .unwrap_or_else(|| "<unknown>".to_string())
            })
            .collect();
        if names.is_empty() {
            "<no identity>".to_string()
        } else {
            names.join(", ")
        }
    };

    let kind = if entry.is_inherited() {
        "inherited"
    } else {
        "explicit"
    };

    vec![entry.id.clone(), roles.join(","), grantee, kind.to_string()]
}

pub fn print_permissions(path: &str, entries: &[PermissionEntry]) {
    if entries.is_empty() {
        println!("{path}: no permissions");
        return;
    }
    println!("{path}:");
    let rows: Vec<Vec<String>> = entries.iter().map(permission_row).collect();
    print_table(&["ID", "ROLES", "GRANTEE", "KIND"], &rows);
}

pub fn print_strip_report(path: &str, report: &StripReport) {
    println!(
        "{path}: removed {} grant(s), {} already absent",
        report.removed.len(),
        report.already_absent.len()
    );
    for failure in &report.failures {
        eprintln!("  failed to remove {}: {}", failure.permission_id, failure.error);
    }
    if report.aborted {
        eprintln!("  aborted: the credential was rejected mid-run");
    }
}

pub fn print_bulk_report(email: &str, report: &BulkRemoveReport) {
    println!(
        "{email}: removed from {} path(s), no grant on {}, {} path(s) not found",
        report.removed.len(),
        report.no_grant.len(),
        report.not_found.len()
    );
    for path in &report.not_found {
        eprintln!("  not found: {path}");
    }
    for failure in &report.failures {
        eprintln!("  failed on {}: {}", failure.path, failure.error);
    }
    if report.aborted {
        eprintln!("  aborted: the credential was rejected mid-run; remaining paths untouched");
    }
}

pub fn print_shared_item(hit: &SharedItem) {
    let kind = if hit.is_folder { "folder" } else { "file" };
    let scope = hit.scope.as_deref().unwrap_or("unknown");
    println!("{:<6}  {:<10}  {}", kind, scope, hit.item.path);
}
