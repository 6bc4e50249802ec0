use anyhow::{Context, Result};
use clap::{ArgAction, Args};
use locomatix::request::ListFences;
use locomatix::{Callback, Client, ErrorMode, FenceKey, Trigger};

use super::args::CircleArgs;
use super::output::Output;

#[derive(Debug, Args)]
pub struct CreateFenceArgs {
    pub fenceid: String,

    #[command(flatten)]
    pub circle: CircleArgs,

    /// Ingress, Egress or IngressAndEgress
    #[arg(short = 't', long)]
    pub trigger: Trigger,

    /// Callback URL for alerts
    #[arg(short = 'u', long)]
    pub url: String,

    /// Feeds whose objects trip the fence; repeat for more than one
    #[arg(short = 'm', long = "from", action = ArgAction::Append, required = true)]
    pub from_feeds: Vec<String>,
}

#[derive(Debug, Args)]
pub struct FenceArg {
    pub fenceid: String,
}

#[derive(Debug, Args)]
pub struct FencesArgs {
    #[arg(required = true)]
    pub fenceids: Vec<String>,
}

pub fn create(client: &Client, out: &Output, args: CreateFenceArgs) -> Result<()> {
    let response = client
        .create_fence(
            &FenceKey::new(&args.fenceid),
            &args.circle.region(),
            args.trigger,
            &Callback::url(&args.url),
            &args.from_feeds,
        )
        .with_context(|| format!("creating fence {}", args.fenceid))?;
    out.status(&response, format!("Successfully created fence: {}", args.fenceid));
    Ok(())
}

pub fn activate(client: &Client, out: &Output, args: FencesArgs) -> Result<()> {
    for id in &args.fenceids {
        let response = client
            .activate_fence(&FenceKey::new(id))
            .with_context(|| format!("activating fence {id}"))?;
        out.status(&response, format!("Successfully activated fence: {id}"));
    }
    Ok(())
}

pub fn deactivate(client: &Client, out: &Output, args: FencesArgs) -> Result<()> {
    for id in &args.fenceids {
        let response = client
            .deactivate_fence(&FenceKey::new(id))
            .with_context(|| format!("deactivating fence {id}"))?;
        out.status(&response, format!("Successfully deactivated fence: {id}"));
    }
    Ok(())
}

pub fn get(client: &Client, out: &Output, args: FenceArg) -> Result<()> {
    let response = client
        .get_fence(&FenceKey::new(&args.fenceid))
        .with_context(|| format!("getting fence {}", args.fenceid))?;
    out.value(&response)
}

pub fn delete(client: &Client, out: &Output, args: FenceArg) -> Result<()> {
    let response = client
        .delete_fence(&FenceKey::new(&args.fenceid))
        .with_context(|| format!("deleting fence {}", args.fenceid))?;
    out.status(&response, format!("Successfully deleted fence: {}", args.fenceid));
    Ok(())
}

pub fn delete_all(client: &Client, out: &Output) -> Result<()> {
    let ids = client
        .paginate(ListFences::new(), ErrorMode::Propagate)
        .items()
        .map(|fence| fence.map(|f| f.fence_id))
        .collect::<Result<Vec<_>, _>>()
        .context("listing fences")?;

    let deleted = out
        .delete_each("fences", &ids, |id| {
            client
                .delete_fence(&FenceKey::new(id))
                .with_context(|| format!("deleting fence {id}"))
        })
        .context("failed to delete all fences")?;
    if !out.is_raw() {
        println!("Successfully deleted {deleted} fences");
    }
    Ok(())
}

pub fn list(client: &Client, out: &Output) -> Result<()> {
    out.pages(client.paginate(ListFences::new(), ErrorMode::Propagate))
        .context("listing fences")
}
