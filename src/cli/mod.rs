use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use locomatix::{Client, ClientConfig, Overrides};

mod analytics;
mod args;
mod feeds;
mod fences;
mod objects;
mod output;
mod search;
mod zones;

use output::Output;

#[derive(Debug, Parser)]
#[command(
    name = "lx",
    version,
    about = "Command-line tools for the Locomatix location tracking API"
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Customer id [env: LX_CUSTID]
    #[arg(short = 'c', long, global = true)]
    pub custid: Option<String>,

    /// Customer key [env: LX_KEY]
    #[arg(short = 'k', long, global = true)]
    pub key: Option<String>,

    /// Customer secret key [env: LX_SECRET_KEY]
    #[arg(short = 's', long = "secret-key", global = true)]
    pub secret_key: Option<String>,

    /// Service host [env: LX_HOST]
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Service port (443 with SSL, 80 without) [env: LX_PORT]
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Use HTTPS (yes/no) [env: LX_USE_SSL]
    #[arg(long = "use-ssl", global = true, value_name = "BOOL", value_parser = args::parse_bool)]
    pub use_ssl: Option<bool>,

    /// Print raw response bodies instead of messages
    #[arg(long, global = true)]
    pub raw: bool,

    /// Log requests and responses to stderr
    #[arg(long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a feed
    CreateFeed(feeds::CreateFeedArgs),
    /// Delete feeds, optionally removing their objects first
    DeleteFeed(feeds::DeleteFeedArgs),
    /// List all feeds
    ListFeeds,

    /// Create an object
    CreateObject(objects::CreateObjectArgs),
    /// Delete an object
    DeleteObject(objects::ObjectArgs),
    /// Delete every object in a feed
    DeleteAllObjects(objects::FeedArg),
    /// List the objects in a feed
    ListObjects(objects::FeedArg),
    /// List the objects matching an LQL query
    QueryObjects(args::QueryArg),
    /// Replace an object's attributes
    UpdateAttributes(objects::UpdateAttributesArgs),
    /// Show an object's attributes
    GetAttributes(objects::ObjectArgs),
    /// Report an object's location
    UpdateLocation(objects::UpdateLocationArgs),
    /// Show an object's latest location
    GetLocation(objects::GetLocationArgs),

    /// Find objects near another object
    SearchNearby(search::SearchNearbyArgs),
    /// Find objects near another object with an LQL query
    QuerySearchNearby(search::QuerySearchNearbyArgs),
    /// Find objects within a circle
    SearchRegion(search::SearchRegionArgs),
    /// Find objects within a circle with an LQL query
    QuerySearchRegion(search::QuerySearchRegionArgs),

    /// Create a zone around an object
    CreateZone(zones::CreateZoneArgs),
    /// Activate zones
    ActivateZone(zones::ZonesArgs),
    /// Show a zone
    GetZone(zones::ZoneArgs),
    /// Deactivate zones
    DeactivateZone(zones::ZonesArgs),
    /// Delete a zone
    DeleteZone(zones::ZoneArgs),
    /// Delete every zone around an object
    DeleteAllZones(objects::ObjectArgs),
    /// List the zones around an object
    ListZones(objects::ObjectArgs),

    /// Create a fence
    CreateFence(fences::CreateFenceArgs),
    /// Activate fences
    ActivateFence(fences::FencesArgs),
    /// Show a fence
    GetFence(fences::FenceArg),
    /// Deactivate fences
    DeactivateFence(fences::FencesArgs),
    /// Delete a fence
    DeleteFence(fences::FenceArg),
    /// Delete every fence
    DeleteAllFences,
    /// List all fences
    ListFences,

    /// Show an object's past locations
    GetLocationHistory(analytics::LocationHistoryArgs),
    /// Show past locations matching an LQL query
    QueryLocationHistory(analytics::QueryLocationHistoryArgs),
    /// Show objects seen in a circle during a time window
    GetSpaceActivity(analytics::SpaceActivityArgs),
    /// Show objects seen in a circle during a time window, with an LQL query
    QuerySpaceActivity(analytics::QuerySpaceActivityArgs),
    /// Count objects per grid cell over a bounding box
    GetHistogram(analytics::HistogramArgs),
    /// Count objects per grid cell over a bounding box, with an LQL query
    QueryHistogram(analytics::QueryHistogramArgs),
}

pub fn run(cli: Cli) -> Result<()> {
    let out = Output::new(cli.global.raw);
    let client = connect(&cli.global)?;

    match cli.command {
        Command::CreateFeed(a) => feeds::create(&client, &out, a),
        Command::DeleteFeed(a) => feeds::delete(&client, &out, a),
        Command::ListFeeds => feeds::list(&client, &out),

        Command::CreateObject(a) => objects::create(&client, &out, a),
        Command::DeleteObject(a) => objects::delete(&client, &out, a),
        Command::DeleteAllObjects(a) => objects::delete_all(&client, &out, a),
        Command::ListObjects(a) => objects::list(&client, &out, a),
        Command::QueryObjects(a) => objects::query(&client, &out, a),
        Command::UpdateAttributes(a) => objects::update_attributes(&client, &out, a),
        Command::GetAttributes(a) => objects::get_attributes(&client, &out, a),
        Command::UpdateLocation(a) => objects::update_location(&client, &out, a),
        Command::GetLocation(a) => objects::get_location(&client, &out, a),

        Command::SearchNearby(a) => search::nearby(&client, &out, a),
        Command::QuerySearchNearby(a) => search::query_nearby(&client, &out, a),
        Command::SearchRegion(a) => search::region(&client, &out, a),
        Command::QuerySearchRegion(a) => search::query_region(&client, &out, a),

        Command::CreateZone(a) => zones::create(&client, &out, a),
        Command::ActivateZone(a) => zones::activate(&client, &out, a),
        Command::GetZone(a) => zones::get(&client, &out, a),
        Command::DeactivateZone(a) => zones::deactivate(&client, &out, a),
        Command::DeleteZone(a) => zones::delete(&client, &out, a),
        Command::DeleteAllZones(a) => zones::delete_all(&client, &out, a),
        Command::ListZones(a) => zones::list(&client, &out, a),

        Command::CreateFence(a) => fences::create(&client, &out, a),
        Command::ActivateFence(a) => fences::activate(&client, &out, a),
        Command::GetFence(a) => fences::get(&client, &out, a),
        Command::DeactivateFence(a) => fences::deactivate(&client, &out, a),
        Command::DeleteFence(a) => fences::delete(&client, &out, a),
        Command::DeleteAllFences => fences::delete_all(&client, &out),
        Command::ListFences => fences::list(&client, &out),

        Command::GetLocationHistory(a) => analytics::location_history(&client, &out, a),
        Command::QueryLocationHistory(a) => analytics::query_location_history(&client, &out, a),
        Command::GetSpaceActivity(a) => analytics::space_activity(&client, &out, a),
        Command::QuerySpaceActivity(a) => analytics::query_space_activity(&client, &out, a),
        Command::GetHistogram(a) => analytics::histogram(&client, &out, a),
        Command::QueryHistogram(a) => analytics::query_histogram(&client, &out, a),
    }
}

/// Prints what clap produced instead of a command line. True only when that
/// was `--help` or `--version` and it reached the terminal.
pub fn report_parse_error(err: &clap::Error) -> bool {
    let printed = err.print();
    printed.is_ok() && !err.use_stderr()
}

fn connect(global: &GlobalArgs) -> Result<Client> {
    let config = ClientConfig::load(Overrides {
        custid: global.custid.clone(),
        key: global.key.clone(),
        secret_key: global.secret_key.clone(),
        host: global.host.clone(),
        port: global.port,
        use_ssl: global.use_ssl,
    })
    .context("loading credentials")?;

    let host = config.host.clone();
    let port = config.port();
    Client::new(config).with_context(|| format!("unable to set up a client for {host}:{port}"))
}
