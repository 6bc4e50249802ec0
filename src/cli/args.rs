//! Argument parsers and argument groups shared by several subcommands.

use chrono::{NaiveDateTime, Utc};
use clap::Args;
use locomatix::NameValues;

/// Seconds either side of a single given bound, and the look-back when
/// neither bound is given.
pub const DEFAULT_WINDOW: i64 = 3600;

#[derive(Debug, Args)]
pub struct QueryArg {
    /// LQL query, e.g. `SELECT Object FROM cars`
    pub query: String,
}

/// `-b/--starttime` and `-e/--endtime`.
#[derive(Debug, Args)]
pub struct TimeWindow {
    /// Window start (epoch seconds or MM/DD/YYYY:HH:MM:SS, UTC)
    #[arg(short = 'b', long = "starttime", value_parser = parse_time)]
    pub start: Option<i64>,

    /// Window end (epoch seconds or MM/DD/YYYY:HH:MM:SS, UTC)
    #[arg(short = 'e', long = "endtime", value_parser = parse_time)]
    pub end: Option<i64>,
}

impl TimeWindow {
    /// Fills in whatever bound is missing.
    pub fn resolve(&self) -> (i64, i64) {
        resolve_window(self.start, self.end, now())
    }
}

/// `-l/--lat`, `-g/--long` and `-r/--radius` describing a circle.
#[derive(Debug, Args)]
pub struct CircleArgs {
    /// Latitude of the centre
    #[arg(short = 'l', long = "lat", allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude of the centre
    #[arg(short = 'g', long = "long", allow_negative_numbers = true)]
    pub longitude: f64,

    /// Radius in meters
    #[arg(short = 'r', long)]
    pub radius: f64,
}

impl CircleArgs {
    pub fn region(&self) -> locomatix::Region {
        locomatix::Region::circle(self.latitude, self.longitude, self.radius)
    }
}

pub fn resolve_window(start: Option<i64>, end: Option<i64>, now: i64) -> (i64, i64) {
    match (start, end) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, s.saturating_add(DEFAULT_WINDOW)),
        (None, Some(e)) => (e.saturating_sub(DEFAULT_WINDOW), e),
        (None, None) => (now.saturating_sub(DEFAULT_WINDOW), now),
    }
}

pub fn now() -> i64 {
    Utc::now().timestamp()
}

/// Epoch seconds, fractional epoch seconds, or `MM/DD/YYYY:HH:MM:SS` in UTC.
pub fn parse_time(s: &str) -> Result<i64, String> {
    let s = s.trim();
    if let Ok(secs) = s.parse::<i64>() {
        return Ok(secs);
    }
    if let Ok(secs) = s.parse::<f64>() {
        if secs.is_finite() {
            return Ok(secs as i64);
        }
    }
    NaiveDateTime::parse_from_str(s, "%m/%d/%Y:%H:%M:%S")
        .map(|t| t.and_utc().timestamp())
        .map_err(|_| format!("`{s}` is neither epoch seconds nor MM/DD/YYYY:HH:MM:SS"))
}

/// `name=value`; only the first `=` separates.
pub fn parse_name_value(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got `{s}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing name in `{s}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

pub fn parse_bool(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Ok(true),
        "no" | "false" | "0" | "off" => Ok(false),
        other => Err(format!("expected yes or no, got `{other}`")),
    }
}

/// Repeated `-v name=value` flags, in order.
pub fn name_values(pairs: &[(String, String)]) -> NameValues {
    pairs.iter().cloned().collect()
}
