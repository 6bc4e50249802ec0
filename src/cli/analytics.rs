use anyhow::{Context, Result};
use clap::Args;
use locomatix::request::{GetLocationHistory, GetSpaceActivity};
use locomatix::{Client, ErrorMode, FeedKey, LxGridAggregates, Rectangle, Response};

use super::args::{CircleArgs, TimeWindow, now};
use super::objects::ObjectArgs;
use super::output::Output;

#[derive(Debug, Args)]
pub struct LocationHistoryArgs {
    #[command(flatten)]
    pub object: ObjectArgs,

    #[command(flatten)]
    pub window: TimeWindow,
}

#[derive(Debug, Args)]
pub struct QueryLocationHistoryArgs {
    /// LQL query, e.g. `SELECT Location FROM cars WITH oid "car-a"`
    pub query: String,

    #[command(flatten)]
    pub window: TimeWindow,
}

#[derive(Debug, Args)]
pub struct SpaceActivityArgs {
    /// Name of the feed
    pub feed: String,

    #[command(flatten)]
    pub circle: CircleArgs,

    #[command(flatten)]
    pub window: TimeWindow,
}

#[derive(Debug, Args)]
pub struct QuerySpaceActivityArgs {
    /// LQL query selecting the objects
    pub query: String,

    #[command(flatten)]
    pub circle: CircleArgs,

    #[command(flatten)]
    pub window: TimeWindow,
}

/// Bounding box, look-back and grid shared by both histogram commands.
#[derive(Debug, Args)]
pub struct GridArgs {
    /// Lower latitude of the bounding box
    #[arg(allow_negative_numbers = true)]
    pub latlow: f64,

    /// Lower longitude of the bounding box
    #[arg(allow_negative_numbers = true)]
    pub longlow: f64,

    /// Upper latitude of the bounding box
    #[arg(allow_negative_numbers = true)]
    pub lathigh: f64,

    /// Upper longitude of the bounding box
    #[arg(allow_negative_numbers = true)]
    pub longhigh: f64,

    /// Seconds back from now
    #[arg(value_name = "TIME_INTERVAL")]
    pub interval: u32,

    /// Horizontal slices of the grid
    #[arg(long, default_value_t = 50)]
    pub hslices: u32,

    /// Vertical slices of the grid
    #[arg(long, default_value_t = 50)]
    pub vslices: u32,
}

impl GridArgs {
    fn rectangle(&self) -> Rectangle {
        Rectangle::new(self.latlow, self.longlow, self.lathigh, self.longhigh)
    }

    fn window(&self) -> (i64, i64) {
        let end = now();
        (end - i64::from(self.interval), end)
    }
}

#[derive(Debug, Args)]
pub struct HistogramArgs {
    /// Name of the feed
    pub feed: String,

    #[command(flatten)]
    pub grid: GridArgs,
}

#[derive(Debug, Args)]
pub struct QueryHistogramArgs {
    /// LQL query selecting the objects
    pub query: String,

    #[command(flatten)]
    pub grid: GridArgs,
}

pub fn location_history(client: &Client, out: &Output, args: LocationHistoryArgs) -> Result<()> {
    let key = args.object.key();
    let (start, end) = args.window.resolve();
    let request = GetLocationHistory::new(&key, start, end);
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to get location history for ({key})"))
}

pub fn query_location_history(
    client: &Client,
    out: &Output,
    args: QueryLocationHistoryArgs,
) -> Result<()> {
    let (start, end) = args.window.resolve();
    let request = GetLocationHistory::query(&args.query, start, end);
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to get location history for ({})", args.query))
}

pub fn space_activity(client: &Client, out: &Output, args: SpaceActivityArgs) -> Result<()> {
    let (start, end) = args.window.resolve();
    let request = GetSpaceActivity::new(&FeedKey::new(&args.feed), args.circle.region(), start, end);
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to get space activity for feed ({})", args.feed))
}

pub fn query_space_activity(
    client: &Client,
    out: &Output,
    args: QuerySpaceActivityArgs,
) -> Result<()> {
    let (start, end) = args.window.resolve();
    let request = GetSpaceActivity::query(&args.query, args.circle.region(), start, end);
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to get space activity for ({})", args.query))
}

pub fn histogram(client: &Client, out: &Output, args: HistogramArgs) -> Result<()> {
    let grid = &args.grid;
    let (start, end) = grid.window();
    let response = client
        .get_histogram(
            &FeedKey::new(&args.feed),
            grid.rectangle(),
            (grid.hslices, grid.vslices),
            start,
            end,
        )
        .with_context(|| format!("failed to get histogram for feed ({})", args.feed))?;
    print_grid(out, &response)
}

pub fn query_histogram(client: &Client, out: &Output, args: QueryHistogramArgs) -> Result<()> {
    let grid = &args.grid;
    let (start, end) = grid.window();
    let response = client
        .query_histogram(
            &args.query,
            grid.rectangle(),
            (grid.hslices, grid.vslices),
            start,
            end,
        )
        .with_context(|| format!("failed to get histogram for ({})", args.query))?;
    print_grid(out, &response)
}

/// One row of counts per line.
fn print_grid(out: &Output, response: &Response<LxGridAggregates>) -> Result<()> {
    if out.is_raw() {
        out.body(response);
        return Ok(());
    }
    for row in &response.data.counts {
        println!("{}", serde_json::to_string(row)?);
    }
    Ok(())
}
