use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use derive_more::Display;
use futures::future::select_ok;
use once_cell::sync::Lazy;
use std::sync::RwLock;
use std::time::Instant;
use tracing::debug;

#[derive(Debug, Display)]
pub enum TimeSyncError {
    #[display(fmt = "time source unreachable: {}", _0)]
    Unreachable(String),
    #[display(fmt = "time source returned HTTP {}", _0)]
    BadStatus(u16),
    #[display(fmt = "time source returned an unparseable payload")]
    BadPayload,
    #[display(fmt = "no configured time source produced a usable timestamp")]
    AllSourcesFailed,
}

impl std::error::Error for TimeSyncError {}

/// Last confirmed network timestamp, paired with the monotonic instant it was
/// taken at. "Now" is always derived from this pair, never from a fresh read
/// of the system clock.
struct Anchor {
    server_epoch_ms: i64,
    at: Instant,
}

static ANCHOR: Lazy<RwLock<Option<Anchor>>> = Lazy::new(|| RwLock::new(None));

pub fn is_synced() -> bool {
    ANCHOR.read().expect("time anchor poisoned").is_some()
}

/// Anchored "now". `None` until the first successful sync.
pub fn now_utc() -> Option<DateTime<Utc>> {
    let guard = ANCHOR.read().expect("time anchor poisoned");
    guard.as_ref().and_then(|anchor| {
        let elapsed_ms = anchor.at.elapsed().as_millis() as i64;
        Utc.timestamp_millis_opt(anchor.server_epoch_ms + elapsed_ms)
            .single()
    })
}

/// Spread between the anchored clock and the host system clock, in
/// milliseconds. Large values indicate a skewed or tampered host clock.
pub fn host_drift_ms() -> Option<i64> {
    now_utc().map(|anchored| anchored.timestamp_millis() - Utc::now().timestamp_millis())
}

fn set_anchor(server_epoch_ms: i64) {
    *ANCHOR.write().expect("time anchor poisoned") = Some(Anchor {
        server_epoch_ms,
        at: Instant::now(),
    });
}

/// Race all configured sources and anchor on the first usable response.
/// Returns the offset between network and host time in milliseconds.
pub async fn sync_once(
    client: &reqwest::Client,
    sources: &[String],
    tz: FixedOffset,
) -> Result<i64, TimeSyncError> {
    if sources.is_empty() {
        return Err(TimeSyncError::AllSourcesFailed);
    }

    let races: Vec<_> = sources
        .iter()
        .map(|url| {
            let client = client.clone();
            let url = url.clone();
            Box::pin(async move { fetch_epoch_ms(&client, &url, tz).await })
        })
        .collect();

    match select_ok(races).await {
        Ok((server_epoch_ms, _slower)) => {
            let offset_ms = server_epoch_ms - Utc::now().timestamp_millis();
            set_anchor(server_epoch_ms);
            debug!(offset_ms, "time anchor updated");
            Ok(offset_ms)
        }
        Err(_) => Err(TimeSyncError::AllSourcesFailed),
    }
}

async fn fetch_epoch_ms(
    client: &reqwest::Client,
    url: &str,
    tz: FixedOffset,
) -> Result<i64, TimeSyncError> {
    let response = client
        .get(url)
        .header("Accept", "application/json, text/plain, */*")
        .send()
        .await
        .map_err(|e| TimeSyncError::Unreachable(e.to_string()))?;

    if !response.status().is_success() {
        return Err(TimeSyncError::BadStatus(response.status().as_u16()));
    }

    let body = response
        .text()
        .await
        .map_err(|e| TimeSyncError::Unreachable(e.to_string()))?;

    parse_epoch_ms(&body, tz).ok_or(TimeSyncError::BadPayload)
}

/// Accepts either a JSON document carrying the timestamp under one of the
/// field names used by the public time APIs, or a bare timestamp string.
pub(crate) fn parse_epoch_ms(body: &str, tz: FixedOffset) -> Option<i64> {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["dateTime", "datetime", "utc_datetime", "iso"] {
            if let Some(stamp) = value.get(key).and_then(|v| v.as_str()) {
                if let Some(ms) = parse_stamp(stamp, tz) {
                    return Some(ms);
                }
            }
        }
        if let Some(stamp) = value.as_str() {
            return parse_stamp(stamp, tz);
        }
    }

    parse_stamp(body.trim().trim_matches('"'), tz)
}

fn parse_stamp(stamp: &str, tz: FixedOffset) -> Option<i64> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(stamp) {
        return Some(dt.timestamp_millis());
    }

    // Sources that omit the offset report wall time in the requested zone.
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(stamp, fmt) {
            return tz
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.timestamp_millis());
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tpe() -> FixedOffset {
        FixedOffset::east_opt(8 * 3600).unwrap()
    }

    #[test]
    fn parses_rfc3339_with_offset() {
        let ms = parse_epoch_ms(r#"{"dateTime":"2026-03-02T09:00:00+08:00"}"#, tpe()).unwrap();
        assert_eq!(ms, 1772413200000);
    }

    #[test]
    fn parses_naive_wall_time_in_requested_zone() {
        // timeapi.io style: no offset in the stamp
        let with_offset = parse_epoch_ms(r#"{"dateTime":"2026-03-02T09:00:00+08:00"}"#, tpe());
        let naive = parse_epoch_ms(r#"{"dateTime":"2026-03-02T09:00:00.1234567"}"#, tpe());
        assert_eq!(naive.map(|ms| ms / 1000), with_offset.map(|ms| ms / 1000));
    }

    #[test]
    fn parses_worldtimeapi_field() {
        let body = r#"{"abbreviation":"CST","utc_datetime":"2026-03-02T01:00:00.000000+00:00"}"#;
        assert_eq!(parse_epoch_ms(body, tpe()), Some(1772413200000));
    }

    #[test]
    fn parses_bare_quoted_string() {
        assert_eq!(
            parse_epoch_ms("\"2026-03-02T01:00:00Z\"", tpe()),
            Some(1772413200000)
        );
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_epoch_ms("not a timestamp", tpe()), None);
        assert_eq!(parse_epoch_ms(r#"{"status":"ok"}"#, tpe()), None);
    }

    #[test]
    fn anchored_now_is_monotonic() {
        set_anchor(1772413200000);
        let a = now_utc().unwrap();
        let b = now_utc().unwrap();
        assert!(b >= a);
        assert!(is_synced());
    }
}
