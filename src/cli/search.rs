use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use locomatix::request::{SearchNearby, SearchRegion};
use locomatix::{Client, ErrorMode, ObjectRegion};

use super::args::CircleArgs;
use super::objects::ObjectArgs;
use super::output::Output;

#[derive(Debug, Args)]
pub struct SearchNearbyArgs {
    #[command(flatten)]
    pub object: ObjectArgs,

    /// Search radius in meters
    #[arg(short = 'r', long)]
    pub radius: f64,

    /// Feeds to search; repeat for more than one
    #[arg(short = 'm', long = "from", action = ArgAction::Append, required = true)]
    pub from_feeds: Vec<String>,
}

#[derive(Debug, Args)]
pub struct QuerySearchNearbyArgs {
    #[command(flatten)]
    pub object: ObjectArgs,

    /// Search radius in meters
    #[arg(short = 'r', long)]
    pub radius: f64,

    /// LQL query selecting the candidates
    pub query: String,
}

#[derive(Debug, Args)]
pub struct SearchRegionArgs {
    #[command(flatten)]
    pub circle: CircleArgs,

    /// Feeds to search; repeat for more than one
    #[arg(short = 'm', long = "from", action = ArgAction::Append, required = true)]
    pub from_feeds: Vec<String>,
}

#[derive(Debug, Args)]
pub struct QuerySearchRegionArgs {
    #[command(flatten)]
    pub circle: CircleArgs,

    /// LQL query selecting the candidates
    pub query: String,
}

pub fn nearby(client: &Client, out: &Output, args: SearchNearbyArgs) -> Result<()> {
    let key = args.object.key();
    let request = SearchNearby::new(
        key.clone(),
        ObjectRegion::circle(args.radius),
        &args.from_feeds,
    );
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to retrieve search nearby list for ({key})"))
}

pub fn query_nearby(client: &Client, out: &Output, args: QuerySearchNearbyArgs) -> Result<()> {
    let key = args.object.key();
    let request = SearchNearby::query(key.clone(), ObjectRegion::circle(args.radius), &args.query);
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to retrieve search nearby list for ({key})"))
}

pub fn region(client: &Client, out: &Output, args: SearchRegionArgs) -> Result<()> {
    let request = SearchRegion::new(args.circle.region(), &args.from_feeds);
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to search region in {}", args.from_feeds.join(", ")))
}

pub fn query_region(client: &Client, out: &Output, args: QuerySearchRegionArgs) -> Result<()> {
    let request = SearchRegion::query(args.circle.region(), &args.query);
    out.pages(client.paginate(request, ErrorMode::Propagate))
        .with_context(|| format!("failed to search region for ({})", args.query))
}
