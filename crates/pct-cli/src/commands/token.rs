//! Token commands.
//!
//! `pct create` - Create a fresh token.
//! `pct show` - Print a token.
//! `pct merge` - Merge claims into a flow's authoritative token.
//! `pct delete` - Delete tokens by code.

use anyhow::Context;
use pct_core::{Claims, ClaimsToken, PermissionGrant};
use pct_service::PctService;

fn print_token(token: &ClaimsToken) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(token)?);
    Ok(())
}

/// Parse identity claims given as a JSON object.
fn parse_claims(raw: &str) -> anyhow::Result<Claims> {
    Claims::from_json(raw).context("Claims must be a JSON object, e.g. '{\"sub\":\"alice\"}'")
}

pub async fn create(service: &PctService, client: &str) -> anyhow::Result<()> {
    let token = service.create_token(client).await;
    print_token(&token)
}

pub async fn show(service: &PctService, code: &str) -> anyhow::Result<()> {
    let token = service
        .find_by_code(code)
        .await
        .with_context(|| format!("No token with code {}", code))?;
    print_token(&token)
}

pub async fn merge(
    service: &PctService,
    client: &str,
    current: Option<&str>,
    ticket: Option<&str>,
    claims: Option<&str>,
) -> anyhow::Result<()> {
    let current = match current {
        Some(code) => Some(
            service
                .find_by_code(code)
                .await
                .with_context(|| format!("No current token with code {}", code))?,
        ),
        None => None,
    };
    let id_claims = claims.map(parse_claims).transpose()?;
    let grants: Vec<PermissionGrant> = ticket
        .map(PermissionGrant::with_ticket_token)
        .into_iter()
        .collect();

    let outcome = service
        .merge_claims(current, id_claims.as_ref(), client, &grants)
        .await;
    if outcome.is_degraded() {
        eprintln!("⚠ Claims merged in memory only; the store rejected the update");
    }
    print_token(outcome.token())
}

/// Individual deletes are best effort, so this reports the request only.
fn delete_summary(requested: usize) -> String {
    format!(
        "✔ Requested deletion of {} token(s); store failures are logged",
        requested
    )
}

pub async fn delete(service: &PctService, codes: &[String]) -> anyhow::Result<()> {
    service.delete_many(codes).await;
    println!("{}", delete_summary(codes.len()));
    Ok(())
}
