//! Speed trap alerts for a small taxi fleet.
//!
//! Each car runs on its own thread with its own client. It registers itself
//! in the `cars` feed, puts an `Ingress` zone around itself that watches the
//! `speedtraps` feed, replays a movement file and cleans up afterwards. The
//! service POSTs to `--url` whenever a trap enters a car's zone.
//!
//! ```text
//! cargo run --example speed_alerts -- --url http://example.com/alerts \
//!     --movement movement.data --speedtraps speedtraps.data
//! ```
//!
//! Movement lines are `longitude,latitude`. Speed trap lines are
//! `id,latitude,longitude,limit,type,city,state,comments`.

use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::Parser;
use locomatix::{Callback, Client, LocationFix, NameValues, ObjectKey, ObjectRegion, Trigger};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const FEED_CARS: &str = "cars";
const FEED_SPEEDTRAPS: &str = "speedtraps";

#[derive(Debug, Parser)]
struct Args {
    /// Where the service should POST alerts
    #[arg(short = 'u', long)]
    url: String,

    /// Movement file replayed by every car
    #[arg(long, default_value = "movement.data")]
    movement: PathBuf,

    /// Load speed traps from this file before the cars start
    #[arg(long)]
    speedtraps: Option<PathBuf>,

    /// Zone radius around each car, in meters
    #[arg(long, default_value_t = 500.0)]
    radius: f64,

    /// Pause between location updates
    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

struct Car {
    key: ObjectKey,
    name: &'static str,
    license: &'static str,
}

impl Car {
    fn zone_id(&self) -> String {
        format!("{}-zone", self.key.object_id)
    }

    fn set_up(&self, client: &Client, radius: f64, url: &str) -> Result<()> {
        let attributes = NameValues::new()
            .with("Name", self.name)
            .with("License", self.license);
        client
            .create_object(&self.key, &attributes, None)
            .with_context(|| format!("unable to create car {}", self.key))?;
        client
            .create_zone(
                &self.key.zone(self.zone_id()),
                ObjectRegion::circle(radius),
                Trigger::Ingress,
                &Callback::url(url),
                &[FEED_SPEEDTRAPS],
            )
            .with_context(|| format!("unable to create zone around {}", self.key))?;
        Ok(())
    }

    fn drive(&self, client: &Client, path: &[(f64, f64)], pause: Duration) {
        for &(latitude, longitude) in path {
            println!("{} moving to {latitude:.6} {longitude:.6}", self.name);
            let fix = LocationFix::new(latitude, longitude, Utc::now().timestamp());
            if let Err(err) = client.update_location(&self.key, fix, &NameValues::new()) {
                warn!(car = %self.key, error = %err, "unable to update location");
            }
            thread::sleep(pause);
        }
    }

    fn tear_down(&self, client: &Client) {
        if let Err(err) = client.delete_zone(&self.key.zone(self.zone_id())) {
            warn!(car = %self.key, error = %err, "unable to delete zone");
        }
        if let Err(err) = client.delete_object(&self.key) {
            warn!(car = %self.key, error = %err, "unable to delete car");
        }
    }

    fn run(&self, radius: f64, url: &str, path: &[(f64, f64)], pause: Duration) -> Result<()> {
        let client = Client::from_env()?;
        self.set_up(&client, radius, url)?;
        self.drive(&client, path, pause);
        self.tear_down(&client);
        Ok(())
    }
}

/// `(latitude, longitude)` pairs from `longitude,latitude` lines.
fn read_movement(path: &Path) -> Result<Vec<(f64, f64)>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("error opening data file {}", path.display()))?;
    let mut points = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Some((long, lat)) = line.split_once(',') else {
            bail!("{}:{}: expected longitude,latitude", path.display(), n + 1);
        };
        let parse = |s: &str| {
            s.trim()
                .parse::<f64>()
                .with_context(|| format!("{}:{}: bad coordinate `{s}`", path.display(), n + 1))
        };
        points.push((parse(lat)?, parse(long)?));
    }
    Ok(points)
}

fn load_speedtraps(client: &Client, path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("error opening data file {}", path.display()))?;
    let now = Utc::now().timestamp();
    for line in text.lines() {
        let fields: Vec<_> = line.trim_end().split(',').collect();
        let [id, lat, long, limit, kind, city, state, comments, ..] = fields.as_slice() else {
            continue;
        };
        let (Ok(lat), Ok(long)) = (lat.parse::<f64>(), long.parse::<f64>()) else {
            warn!(trap = *id, "skipping speed trap with bad coordinates");
            continue;
        };
        let attributes = NameValues::new()
            .with("SpeedLimit", *limit)
            .with("Type", *kind)
            .with("City", *city)
            .with("State", *state)
            .with("Comments", *comments);
        let key = ObjectKey::new(*id, FEED_SPEEDTRAPS);
        match client.create_object(&key, &attributes, Some(LocationFix::new(lat, long, now))) {
            Ok(_) => info!(trap = %key, "speed trap loaded"),
            Err(err) => warn!(trap = %key, error = %err, "unable to create speed trap"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let path = read_movement(&args.movement)?;

    if let Some(traps) = &args.speedtraps {
        load_speedtraps(&Client::from_env()?, traps)?;
    }

    let cars = [
        Car {
            key: ObjectKey::new("car-a", FEED_CARS),
            name: "Cab A",
            license: "2992992",
        },
        Car {
            key: ObjectKey::new("car-b", FEED_CARS),
            name: "Cab B",
            license: "8388288",
        },
    ];
    let pause = Duration::from_millis(args.interval_ms);

    let failures = thread::scope(|scope| {
        let handles: Vec<_> = cars
            .iter()
            .map(|car| {
                let path = &path;
                let url = args.url.as_str();
                let radius = args.radius;
                scope.spawn(move || car.run(radius, url, path, pause))
            })
            .collect();

        handles
            .into_iter()
            .zip(&cars)
            .filter_map(|(handle, car)| match handle.join() {
                Ok(Ok(())) => None,
                Ok(Err(err)) => {
                    eprintln!("error occurred for car {}: {err:#}", car.key);
                    Some(())
                }
                Err(_) => {
                    eprintln!("car {} panicked", car.key);
                    Some(())
                }
            })
            .count()
    });

    if failures > 0 {
        bail!("{failures} car(s) failed");
    }
    Ok(())
}
