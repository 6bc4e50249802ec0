use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use locomatix::request::ListZones;
use locomatix::{Callback, Client, ErrorMode, ObjectKey, ObjectRegion, Trigger, ZoneKey};

use super::objects::ObjectArgs;
use super::output::Output;

/// The object a zone is attached to.
#[derive(Debug, Args)]
pub struct ZoneOwner {
    /// Object the zone is attached to
    #[arg(short = 'o', long = "objectid")]
    pub objectid: String,

    /// Feed of that object
    #[arg(short = 'f', long)]
    pub feed: String,
}

impl ZoneOwner {
    fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.objectid, &self.feed)
    }
}

#[derive(Debug, Args)]
pub struct CreateZoneArgs {
    pub zoneid: String,

    #[command(flatten)]
    pub owner: ZoneOwner,

    /// Zone radius in meters
    #[arg(short = 'r', long)]
    pub radius: f64,

    /// Ingress, Egress or IngressAndEgress
    #[arg(short = 't', long)]
    pub trigger: Trigger,

    /// Callback URL for alerts
    #[arg(short = 'u', long)]
    pub url: String,

    /// Feeds whose objects trip the zone (defaults to the object's feed)
    #[arg(short = 'm', long = "from", action = ArgAction::Append)]
    pub from_feeds: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ZoneArgs {
    pub zoneid: String,

    #[command(flatten)]
    pub owner: ZoneOwner,
}

#[derive(Debug, Args)]
pub struct ZonesArgs {
    #[arg(required = true)]
    pub zoneids: Vec<String>,

    #[command(flatten)]
    pub owner: ZoneOwner,
}

pub fn create(client: &Client, out: &Output, args: CreateZoneArgs) -> Result<()> {
    let zone = args.owner.key().zone(&args.zoneid);
    let response = client
        .create_zone(
            &zone,
            ObjectRegion::circle(args.radius),
            args.trigger,
            &Callback::url(&args.url),
            &args.from_feeds,
        )
        .with_context(|| {
            format!(
                "creating zone ({} around {} in {})",
                args.zoneid, args.owner.objectid, args.owner.feed
            )
        })?;
    out.status(&response, format!("Successfully created zone: {}", args.zoneid));
    Ok(())
}

pub fn activate(client: &Client, out: &Output, args: ZonesArgs) -> Result<()> {
    let owner = args.owner.key();
    for id in &args.zoneids {
        let response = client
            .activate_zone(&owner.zone(id))
            .with_context(|| format!("activating zone ({id} around {owner})"))?;
        out.status(&response, format!("Successfully activated zone: {id}"));
    }
    Ok(())
}

pub fn deactivate(client: &Client, out: &Output, args: ZonesArgs) -> Result<()> {
    let owner = args.owner.key();
    for id in &args.zoneids {
        let response = client
            .deactivate_zone(&owner.zone(id))
            .with_context(|| format!("deactivating zone ({id} around {owner})"))?;
        out.status(&response, format!("Successfully deactivated zone: {id}"));
    }
    Ok(())
}

pub fn get(client: &Client, out: &Output, args: ZoneArgs) -> Result<()> {
    let zone: ZoneKey = args.owner.key().zone(&args.zoneid);
    let response = client
        .get_zone(&zone)
        .with_context(|| format!("getting zone ({zone})"))?;
    out.value(&response)
}

pub fn delete(client: &Client, out: &Output, args: ZoneArgs) -> Result<()> {
    let zone = args.owner.key().zone(&args.zoneid);
    let response = client
        .delete_zone(&zone)
        .with_context(|| format!("deleting zone ({zone})"))?;
    out.status(&response, format!("Successfully deleted zone: {}", args.zoneid));
    Ok(())
}

pub fn delete_all(client: &Client, out: &Output, args: ObjectArgs) -> Result<()> {
    let owner = args.key();
    let ids = client
        .paginate(ListZones::new(owner.clone()), ErrorMode::Propagate)
        .items()
        .map(|zone| zone.map(|z| z.zone_id))
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("listing zones around ({owner})"))?;

    let deleted = out
        .delete_each("zones", &ids, |id| {
            client
                .delete_zone(&owner.zone(id))
                .with_context(|| format!("deleting zone ({id} around {owner})"))
        })
        .context("failed to delete all zones")?;
    if !out.is_raw() {
        println!("Successfully deleted {deleted} zones around: {}", owner.object_id);
    }
    Ok(())
}

pub fn list(client: &Client, out: &Output, args: ObjectArgs) -> Result<()> {
    let owner = args.key();
    out.pages(client.paginate(ListZones::new(owner.clone()), ErrorMode::Propagate))
        .with_context(|| format!("listing zones around ({owner})"))
}
