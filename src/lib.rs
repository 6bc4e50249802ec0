//! A blocking Rust client for the Locomatix location tracking API.
//!
//! Locomatix stores *objects* grouped into *feeds*, tracks their locations
//! over time, and raises alerts when objects cross *zones* (regions that
//! follow an object) or *fences* (regions fixed on the map). This crate
//! marshals typed calls into the service's REST requests and decodes its
//! JSON replies; all indexing and alerting happens server side.
//!
//! ## Quick start
//! - Configure credentials via environment variables (`LX_CUSTID`, `LX_KEY`,
//!   `LX_SECRET_KEY`) or a `.lxrc` file (current directory or home directory).
//! - Create a [`Client`] and call one method per operation.
//!
//! ```no_run
//! use locomatix::{Client, LocationFix, NameValues, ObjectKey, ObjectRegion};
//!
//! fn main() -> locomatix::Result<()> {
//!     let client = Client::from_env()?;
//!     let car = ObjectKey::new("car-a", "cars");
//!
//!     client.create_object(&car, &NameValues::new().with("name", "Cab A"), None)?;
//!     client.update_location(&car, LocationFix::new(37.77, -122.41, 1_278_000_000), &NameValues::new())?;
//!
//!     for page in client.search_nearby_iter(&car, ObjectRegion::circle(500.0), &["speedtraps"]) {
//!         for hit in page?.data.rows {
//!             println!("{} is nearby", hit.object_id);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! Every call is also available as a typed request (see [`request`]) that can
//! be passed to [`Client::execute`] or [`Client::paginate`].

#![forbid(unsafe_code)]

pub mod callback;
mod client;
mod config;
mod error;
pub mod keys;
pub mod lql;
pub mod objects;
mod pagination;
pub mod params;
pub mod region;
pub mod request;
pub mod response;
pub mod transport;
mod util;

pub use callback::Callback;
pub use client::{Client, ClientConfig, DEFAULT_HOST, DEFAULT_VERSION};
pub use config::Overrides;
pub use error::{DecodeError, Error, Result, ServerErrorKind};
pub use keys::{FeedKey, FenceKey, ObjectKey, ZoneKey};
pub use objects::{
    ActivationState, Expiry, LxAggregate, LxFeed, LxFence, LxGridAggregates, LxLocation, LxObject,
    LxObjectLocation, LxZone, NameValues, Trigger,
};
pub use pagination::{ErrorMode, Items, Pages};
pub use params::{Params, ToParams};
pub use region::{ObjectRegion, Point, Rectangle, Region};
pub use request::{Endpoint, HttpMethod, LocationFix, PagedEndpoint};
pub use response::{Page, Response};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};
