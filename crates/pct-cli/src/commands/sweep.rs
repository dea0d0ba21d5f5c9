//! `pct sweep` - Delete expired tokens once or on an interval.

use anyhow::Context;
use chrono::{DateTime, Utc};
use pct_service::{PctService, spawn_periodic};

/// Parse a reference instant given as RFC 3339.
fn parse_now(raw: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match raw {
        Some(raw) => Ok(DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid RFC 3339 instant: {}", raw))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

pub async fn run_once(service: &PctService, now: Option<&str>) -> anyhow::Result<()> {
    let now = parse_now(now)?;
    let report = service.sweep_expired(now).await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub async fn run_periodic(service: &PctService, every: &str) -> anyhow::Result<()> {
    let interval = humantime::parse_duration(every)
        .with_context(|| format!("Invalid interval: {}", every))?;
    anyhow::ensure!(!interval.is_zero(), "Interval must be greater than zero");

    tracing::info!(
        "Sweeping expired tokens every {} (batch size {})",
        humantime::format_duration(interval),
        service.sweeper().batch_size()
    );
    let handle = spawn_periodic(service.sweeper().clone(), interval);

    tokio::signal::ctrl_c().await?;
    handle.abort();
    tracing::info!("Sweeper stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_now() {
        assert_eq!(
            parse_now(Some("2026-10-19T12:00:00+02:00")).unwrap(),
            Utc.with_ymd_and_hms(2026, 10, 19, 10, 0, 0).unwrap()
        );
        assert!(parse_now(Some("yesterday")).is_err());
        assert!(parse_now(None).is_ok());
    }
}
