use anyhow::{Context, Result};
use clap::Args;
use locomatix::request::ListFeeds;
use locomatix::{Client, ErrorMode, Expiry, FeedKey, ObjectKey};

use super::args::{name_values, parse_name_value};
use super::objects::feed_object_ids;
use super::output::Output;

#[derive(Debug, Args)]
pub struct CreateFeedArgs {
    /// Name of the feed
    pub feed: String,

    /// Seconds an idle object is kept, or `forever`
    #[arg(value_name = "DELETE_AFTER", allow_negative_numbers = true)]
    pub object_expiry: Expiry,

    /// Seconds a location is kept, or `forever`
    #[arg(value_name = "FLUSH_LOCATION", allow_negative_numbers = true)]
    pub location_expiry: Expiry,

    /// Name-value pair (name=value); may repeat
    #[arg(short = 'v', long = "nv", value_name = "NAME=VALUE", value_parser = parse_name_value)]
    pub nv: Vec<(String, String)>,
}

#[derive(Debug, Args)]
pub struct DeleteFeedArgs {
    /// Feeds to delete
    #[arg(required = true)]
    pub feeds: Vec<String>,

    /// Delete every object in the feed first
    #[arg(short = 'r', long)]
    pub remove: bool,
}

pub fn create(client: &Client, out: &Output, args: CreateFeedArgs) -> Result<()> {
    let feed = FeedKey::new(&args.feed);
    let response = client
        .create_feed(
            &feed,
            args.object_expiry,
            args.location_expiry,
            &name_values(&args.nv),
        )
        .with_context(|| format!("creating feed {}", args.feed))?;
    out.status(&response, format!("Successfully created feed: {}", args.feed));
    Ok(())
}

pub fn delete(client: &Client, out: &Output, args: DeleteFeedArgs) -> Result<()> {
    for name in &args.feeds {
        let feed = FeedKey::new(name);
        if args.remove {
            let ids = feed_object_ids(client, &feed)?;
            out.delete_each("objects", &ids, |id| {
                client
                    .delete_object(&ObjectKey::new(id.as_str(), name.as_str()))
                    .with_context(|| format!("deleting object ({id} in {name})"))
            })?;
        }
        let response = client
            .delete_feed(&feed)
            .with_context(|| format!("deleting feed {name}"))?;
        out.body(&response);
    }
    println!("Successfully deleted feeds: {}", args.feeds.join(" "));
    Ok(())
}

pub fn list(client: &Client, out: &Output) -> Result<()> {
    out.pages(client.paginate(ListFeeds::new(), ErrorMode::Propagate))
        .context("listing feeds")
}
