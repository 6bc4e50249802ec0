use anyhow::{Context, Result};
use clap::Args;
use locomatix::request::ListObjects;
use locomatix::{Client, ErrorMode, FeedKey, LocationFix, ObjectKey};

use super::args::{QueryArg, name_values, now, parse_name_value, parse_time};
use super::output::Output;

#[derive(Debug, Args)]
pub struct FeedArg {
    /// Name of the feed
    pub feed: String,
}

/// An object id and the feed it lives in.
#[derive(Debug, Args)]
pub struct ObjectArgs {
    pub objectid: String,

    /// Feed of the object
    #[arg(short = 'f', long)]
    pub feed: String,
}

impl ObjectArgs {
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.objectid, &self.feed)
    }
}

#[derive(Debug, Args)]
pub struct CreateObjectArgs {
    #[command(flatten)]
    pub object: ObjectArgs,

    /// Name-value pair (name=value); may repeat
    #[arg(short = 'v', long = "nv", value_name = "NAME=VALUE", value_parser = parse_name_value)]
    pub nv: Vec<(String, String)>,

    /// Initial latitude
    #[arg(short = 'l', long = "lat", allow_negative_numbers = true, requires = "longitude")]
    pub latitude: Option<f64>,

    /// Initial longitude
    #[arg(short = 'g', long = "long", allow_negative_numbers = true, requires = "latitude")]
    pub longitude: Option<f64>,

    /// Time of the initial location (defaults to now)
    #[arg(short = 't', long, value_parser = parse_time, requires = "latitude")]
    pub time: Option<i64>,
}

#[derive(Debug, Args)]
pub struct UpdateAttributesArgs {
    #[command(flatten)]
    pub object: ObjectArgs,

    /// Name-value pair (name=value); may repeat
    #[arg(short = 'v', long = "nv", value_name = "NAME=VALUE", value_parser = parse_name_value)]
    pub nv: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct UpdateLocationArgs {
    #[command(flatten)]
    pub object: ObjectArgs,

    /// Latitude of the location
    #[arg(short = 'l', long = "lat", allow_negative_numbers = true)]
    pub latitude: f64,

    /// Longitude of the location
    #[arg(short = 'g', long = "long", allow_negative_numbers = true)]
    pub longitude: f64,

    /// Time of the location (defaults to now)
    #[arg(short = 't', long, value_parser = parse_time)]
    pub time: Option<i64>,

    /// Seconds before this location expires
    #[arg(long)]
    pub ttl: Option<u64>,

    /// Name-value pair (name=value); may repeat
    #[arg(short = 'v', long = "nv", value_name = "NAME=VALUE", value_parser = parse_name_value)]
    pub nv: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct GetLocationArgs {
    #[command(flatten)]
    pub object: ObjectArgs,

    /// Return the last location even if it has expired
    #[arg(long)]
    pub allow_expired: bool,
}

/// Ids of every object in `feed`; the first failed page is an error.
pub fn feed_object_ids(client: &Client, feed: &FeedKey) -> Result<Vec<String>> {
    client
        .paginate(ListObjects::feed(feed), ErrorMode::Propagate)
        .items()
        .map(|object| object.map(|o| o.object_id))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("listing objects in {}", feed.feed))
}

pub fn create(client: &Client, out: &Output, args: CreateObjectArgs) -> Result<()> {
    let key = args.object.key();
    let location = match (args.latitude, args.longitude) {
        (Some(lat), Some(long)) => Some(LocationFix::new(lat, long, args.time.unwrap_or_else(now))),
        _ => None,
    };
    let response = client
        .create_object(&key, &name_values(&args.nv), location)
        .with_context(|| format!("creating object ({key})"))?;
    out.status(&response, format!("Successfully created object: {}", key.object_id));
    Ok(())
}

pub fn delete(client: &Client, out: &Output, args: ObjectArgs) -> Result<()> {
    let key = args.key();
    let response = client
        .delete_object(&key)
        .with_context(|| format!("deleting object ({key})"))?;
    out.status(&response, format!("Successfully deleted object: {}", key.object_id));
    Ok(())
}

pub fn delete_all(client: &Client, out: &Output, args: FeedArg) -> Result<()> {
    let feed = FeedKey::new(&args.feed);
    let ids = feed_object_ids(client, &feed)?;
    let deleted = out
        .delete_each("objects", &ids, |id| {
            client
                .delete_object(&ObjectKey::new(id.as_str(), args.feed.as_str()))
                .with_context(|| format!("deleting object ({id} in {})", args.feed))
        })
        .context("failed to delete all objects")?;
    if !out.is_raw() {
        println!("Successfully deleted {deleted} objects from feed: {}", args.feed);
    }
    Ok(())
}

pub fn list(client: &Client, out: &Output, args: FeedArg) -> Result<()> {
    let feed = FeedKey::new(&args.feed);
    out.pages(client.paginate(ListObjects::feed(&feed), ErrorMode::Propagate))
        .with_context(|| format!("listing objects in {}", args.feed))
}

pub fn query(client: &Client, out: &Output, args: QueryArg) -> Result<()> {
    out.pages(client.paginate(ListObjects::query(&args.query), ErrorMode::Propagate))
        .with_context(|| format!("failed to query for ({})", args.query))
}

pub fn update_attributes(client: &Client, out: &Output, args: UpdateAttributesArgs) -> Result<()> {
    let key = args.object.key();
    let response = client
        .update_attributes(&key, &name_values(&args.nv))
        .with_context(|| format!("updating attributes for object ({key})"))?;
    out.status(
        &response,
        format!("Successfully updated attributes for object: {}", key.object_id),
    );
    Ok(())
}

pub fn get_attributes(client: &Client, out: &Output, args: ObjectArgs) -> Result<()> {
    let key = args.key();
    let response = client
        .get_attributes(&key)
        .with_context(|| format!("getting attributes for object ({key})"))?;
    out.value(&response)
}

pub fn update_location(client: &Client, out: &Output, args: UpdateLocationArgs) -> Result<()> {
    let key = args.object.key();
    let mut fix = LocationFix::new(args.latitude, args.longitude, args.time.unwrap_or_else(now));
    if let Some(ttl) = args.ttl {
        fix = fix.with_ttl(ttl);
    }
    let response = client
        .update_location(&key, fix, &name_values(&args.nv))
        .with_context(|| format!("updating location for object ({key})"))?;
    out.status(
        &response,
        format!("Successfully updated location of object: {}", key.object_id),
    );
    Ok(())
}

pub fn get_location(client: &Client, out: &Output, args: GetLocationArgs) -> Result<()> {
    let key = args.object.key();
    let response = client
        .get_location(&key, args.allow_expired)
        .with_context(|| format!("getting location for object ({key})"))?;
    out.value(&response)
}
