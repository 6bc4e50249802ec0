//! Typed requests, one per service operation.
//!
//! Every request knows its HTTP method, its path, the parameters it sends
//! and how to decode the `Result` payload of a successful reply. The
//! [`Client`](crate::Client) methods are thin wrappers that build one of
//! these and hand it to [`Client::execute`](crate::Client::execute).

use std::fmt;

use serde_json::Value;

use crate::callback::Callback;
use crate::error::DecodeError;
use crate::keys::{FeedKey, FenceKey, ObjectKey, ZoneKey};
use crate::lql::{self, Select, Source};
use crate::objects::{
    Expiry, LxFeed, LxFence, LxGridAggregates, LxLocation, LxObject, LxObjectLocation, LxZone,
    NameValues, Trigger,
};
use crate::params::{Params, ToParams};
use crate::region::{ObjectRegion, Point, Rectangle, Region};
use crate::response::{self, Page};
use crate::transport::HttpRequest;

/// Rows per page unless a request asks for something else.
pub const DEFAULT_FETCH_SIZE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// POST and PUT carry their parameters in a form body.
    pub fn sends_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One service operation.
pub trait Endpoint {
    type Output;

    /// Short operation name used in logs and errors.
    const NAME: &'static str;
    const METHOD: HttpMethod;

    fn path(&self) -> String;

    fn params(&self) -> Params {
        Params::new()
    }

    /// Decodes the `Result` member of a `Success` envelope.
    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError>;
}

/// An operation that returns pages chained by a start key.
pub trait PagedEndpoint: Endpoint + Clone {
    fn set_start_key(&mut self, start_key: Option<String>);
}

/// Builds the wire request for an endpoint.
pub fn encode<E: Endpoint>(endpoint: &E) -> HttpRequest {
    let params = endpoint.params();
    let mut uri = endpoint.path();
    let body = if E::METHOD.sends_body() {
        Some(params.to_query_string())
    } else {
        if !params.is_empty() {
            uri.push('?');
            uri.push_str(&params.to_query_string());
        }
        None
    };
    HttpRequest {
        method: E::METHOD,
        uri,
        body,
    }
}

/// Cursor state shared by every paged request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paging {
    pub start_key: Option<String>,
    pub fetch_size: u32,
}

impl Default for Paging {
    fn default() -> Self {
        Self {
            start_key: None,
            fetch_size: DEFAULT_FETCH_SIZE,
        }
    }
}

impl ToParams for Paging {
    fn write_params(&self, params: &mut Params) {
        if let Some(key) = self.start_key.as_deref().filter(|k| !k.is_empty()) {
            params.set("startkey", key);
        }
        params.set("fetchsize", self.fetch_size);
    }
}

/// A position report: where and when, plus how long the service keeps it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationFix {
    pub point: Point,
    pub time: i64,
    pub ttl: Option<u64>,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64, time: i64) -> Self {
        Self {
            point: Point::new(latitude, longitude),
            time,
            ttl: None,
        }
    }

    pub fn with_ttl(mut self, ttl: u64) -> Self {
        self.ttl = Some(ttl);
        self
    }
}

impl ToParams for LocationFix {
    fn write_params(&self, params: &mut Params) {
        params
            .set("latitude", self.point.latitude)
            .set("longitude", self.point.longitude)
            .set("time", self.time);
        if let Some(ttl) = self.ttl {
            params.set("ttl", ttl);
        }
    }
}

fn no_result(_: Option<&Value>) -> Result<(), DecodeError> {
    Ok(())
}

macro_rules! status_request {
    ($(#[$doc:meta])* $name:ident, $key:ident: $key_ty:ty, $method:ident, $op:literal, $suffix:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name {
            pub $key: $key_ty,
        }

        impl $name {
            pub fn new($key: $key_ty) -> Self {
                Self { $key }
            }
        }

        impl Endpoint for $name {
            type Output = ();
            const NAME: &'static str = $op;
            const METHOD: HttpMethod = HttpMethod::$method;

            fn path(&self) -> String {
                format!("{}/{}", self.$key.path(), $suffix)
            }

            fn decode(&self, result: Option<&Value>) -> Result<(), DecodeError> {
                no_result(result)
            }
        }
    };
}

macro_rules! paged {
    ($name:ident) => {
        impl PagedEndpoint for $name {
            fn set_start_key(&mut self, start_key: Option<String>) {
                self.paging.start_key = start_key;
            }
        }
    };
}

// ---- feeds ----

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFeed {
    pub feed: FeedKey,
    pub object_expiry: Expiry,
    pub location_expiry: Expiry,
    pub name_values: NameValues,
}

impl CreateFeed {
    pub fn new(feed: FeedKey, object_expiry: Expiry, location_expiry: Expiry) -> Self {
        Self {
            feed,
            object_expiry,
            location_expiry,
            name_values: NameValues::new(),
        }
    }

    pub fn with_name_values(mut self, name_values: NameValues) -> Self {
        self.name_values = name_values;
        self
    }
}

impl Endpoint for CreateFeed {
    type Output = ();
    const NAME: &'static str = "create_feed";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/create", self.feed.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.name_values)
            .set("objectexpiry", self.object_expiry.to_wire())
            .set("locationexpiry", self.location_expiry.to_wire());
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<(), DecodeError> {
        no_result(result)
    }
}

status_request!(DeleteFeed, feed: FeedKey, Delete, "delete_feed", "delete");

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFeeds {
    pub paging: Paging,
}

impl ListFeeds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Endpoint for ListFeeds {
    type Output = Page<LxFeed>;
    const NAME: &'static str = "list_feeds";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/feed/list".to_string()
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::page(result, "Feeds", LxFeed::decode)
    }
}
paged!(ListFeeds);

// ---- objects ----

#[derive(Debug, Clone, PartialEq)]
pub struct CreateObject {
    pub object: ObjectKey,
    pub name_values: NameValues,
    pub location: Option<LocationFix>,
}

impl CreateObject {
    pub fn new(object: ObjectKey) -> Self {
        Self {
            object,
            name_values: NameValues::new(),
            location: None,
        }
    }

    pub fn with_name_values(mut self, name_values: NameValues) -> Self {
        self.name_values = name_values;
        self
    }

    pub fn with_location(mut self, location: LocationFix) -> Self {
        self.location = Some(location);
        self
    }
}

impl Endpoint for CreateObject {
    type Output = ();
    const NAME: &'static str = "create_object";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/create", self.object.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.name_values);
        if let Some(location) = &self.location {
            p.extend_from(location);
        }
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<(), DecodeError> {
        no_result(result)
    }
}

status_request!(DeleteObject, object: ObjectKey, Delete, "delete_object", "delete");

/// Lists objects matching a predicate; [`ListObjects::feed`] lists a whole feed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListObjects {
    pub predicate: String,
    pub paging: Paging,
}

impl ListObjects {
    pub fn feed(feed: &FeedKey) -> Self {
        Self::query(lql::select(Select::Objects, &Source::feed(feed.feed.clone())))
    }

    pub fn query(predicate: impl Into<String>) -> Self {
        Self {
            predicate: predicate.into(),
            paging: Paging::default(),
        }
    }
}

impl Endpoint for ListObjects {
    type Output = Page<LxObject>;
    const NAME: &'static str = "list_objects";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/object/list".to_string()
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.set("predicate", &self.predicate).extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::page(result, "Objects", LxObject::decode)
    }
}
paged!(ListObjects);

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateAttributes {
    pub object: ObjectKey,
    pub name_values: NameValues,
}

impl UpdateAttributes {
    pub fn new(object: ObjectKey, name_values: NameValues) -> Self {
        Self {
            object,
            name_values,
        }
    }
}

impl Endpoint for UpdateAttributes {
    type Output = ();
    const NAME: &'static str = "update_attributes";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/attributes/update", self.object.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.name_values);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<(), DecodeError> {
        no_result(result)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetAttributes {
    pub object: ObjectKey,
}

impl GetAttributes {
    pub fn new(object: ObjectKey) -> Self {
        Self { object }
    }
}

impl Endpoint for GetAttributes {
    type Output = LxObject;
    const NAME: &'static str = "get_attributes";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/attributes/get", self.object.path())
    }

    fn decode(&self, result: Option<&Value>) -> Result<LxObject, DecodeError> {
        LxObject::decode(response::member(result, "Object")?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateLocation {
    pub object: ObjectKey,
    pub fix: LocationFix,
    pub name_values: NameValues,
}

impl UpdateLocation {
    pub fn new(object: ObjectKey, fix: LocationFix) -> Self {
        Self {
            object,
            fix,
            name_values: NameValues::new(),
        }
    }

    pub fn with_name_values(mut self, name_values: NameValues) -> Self {
        self.name_values = name_values;
        self
    }
}

impl Endpoint for UpdateLocation {
    type Output = ();
    const NAME: &'static str = "update_location";
    const METHOD: HttpMethod = HttpMethod::Put;

    fn path(&self) -> String {
        format!("{}/location/update", self.object.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.name_values).extend_from(&self.fix);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<(), DecodeError> {
        no_result(result)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetLocation {
    pub object: ObjectKey,
    pub allow_expired: bool,
}

impl GetLocation {
    pub fn new(object: ObjectKey) -> Self {
        Self {
            object,
            allow_expired: false,
        }
    }

    pub fn allow_expired(mut self, allow: bool) -> Self {
        self.allow_expired = allow;
        self
    }
}

impl Endpoint for GetLocation {
    type Output = LxLocation;
    const NAME: &'static str = "get_location";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/location/get", self.object.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.set("allowexpired", self.allow_expired);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<LxLocation, DecodeError> {
        let mut location = LxLocation::decode(response::member(result, "Location")?)?;
        location.object_id.get_or_insert_with(|| self.object.object_id.clone());
        location.feed.get_or_insert_with(|| self.object.feed.clone());
        Ok(location)
    }
}

// ---- search ----

fn feeds<S: AsRef<str>>(from_feeds: &[S]) -> Source {
    Source::feeds(from_feeds.iter().map(|feed| feed.as_ref()))
}

fn feeds_or<S: AsRef<str>>(from_feeds: &[S], own_feed: &str) -> Source {
    if from_feeds.is_empty() {
        Source::feed(own_feed)
    } else {
        feeds(from_feeds)
    }
}

/// Objects within a radius of another object.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchNearby {
    pub object: ObjectKey,
    pub region: ObjectRegion,
    pub predicate: String,
    pub paging: Paging,
}

impl SearchNearby {
    /// Searches `from_feeds` around `object`; no feeds means the object's own feed.
    pub fn new<S: AsRef<str>>(object: ObjectKey, region: ObjectRegion, from_feeds: &[S]) -> Self {
        let source = feeds_or(from_feeds, &object.feed);
        let predicate = lql::select(Select::ObjectLocations, &source);
        Self::query(object, region, predicate)
    }

    pub fn query(object: ObjectKey, region: ObjectRegion, predicate: impl Into<String>) -> Self {
        Self {
            object,
            region,
            predicate: predicate.into(),
            paging: Paging::default(),
        }
    }
}

impl Endpoint for SearchNearby {
    type Output = Page<LxObjectLocation>;
    const NAME: &'static str = "search_nearby";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/search/nearby", self.object.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.region)
            .set("predicate", &self.predicate)
            .extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::page(result, "Objects", LxObjectLocation::decode)
    }
}
paged!(SearchNearby);

/// Objects inside a fixed region.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRegion {
    pub region: Region,
    pub predicate: String,
    pub paging: Paging,
}

impl SearchRegion {
    pub fn new<S: AsRef<str>>(region: Region, from_feeds: &[S]) -> Self {
        let predicate = lql::select(Select::ObjectLocations, &feeds(from_feeds));
        Self::query(region, predicate)
    }

    pub fn query(region: Region, predicate: impl Into<String>) -> Self {
        Self {
            region,
            predicate: predicate.into(),
            paging: Paging::default(),
        }
    }
}

impl Endpoint for SearchRegion {
    type Output = Page<LxObjectLocation>;
    const NAME: &'static str = "search_region";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/search/region".to_string()
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.region)
            .set("predicate", &self.predicate)
            .extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::page(result, "Objects", LxObjectLocation::decode)
    }
}
paged!(SearchRegion);

// ---- zones ----

#[derive(Debug, Clone, PartialEq)]
pub struct CreateZone {
    pub zone: ZoneKey,
    pub region: ObjectRegion,
    pub trigger: Trigger,
    pub callback: Callback,
    pub predicate: String,
}

impl CreateZone {
    /// A zone watching the feed of the object it follows.
    pub fn new(zone: ZoneKey, region: ObjectRegion, trigger: Trigger, callback: Callback) -> Self {
        let predicate = Source::feed(zone.feed.clone()).to_string();
        Self {
            zone,
            region,
            trigger,
            callback,
            predicate,
        }
    }

    /// Alerts on objects of `from_feeds`; no feeds keeps the object's own feed.
    pub fn watching<S: AsRef<str>>(mut self, from_feeds: &[S]) -> Self {
        self.predicate = feeds_or(from_feeds, &self.zone.feed).to_string();
        self
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = predicate.into();
        self
    }
}

impl Endpoint for CreateZone {
    type Output = ();
    const NAME: &'static str = "create_zone";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/create", self.zone.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.region)
            .set("trigger", self.trigger)
            .extend_from(&self.callback)
            .set("predicate", &self.predicate);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<(), DecodeError> {
        no_result(result)
    }
}

status_request!(ActivateZone, zone: ZoneKey, Put, "activate_zone", "activate");
status_request!(DeactivateZone, zone: ZoneKey, Put, "deactivate_zone", "deactivate");
status_request!(DeleteZone, zone: ZoneKey, Delete, "delete_zone", "delete");

#[derive(Debug, Clone, PartialEq)]
pub struct GetZone {
    pub zone: ZoneKey,
}

impl GetZone {
    pub fn new(zone: ZoneKey) -> Self {
        Self { zone }
    }
}

impl Endpoint for GetZone {
    type Output = LxZone;
    const NAME: &'static str = "get_zone";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/get", self.zone.path())
    }

    fn decode(&self, result: Option<&Value>) -> Result<LxZone, DecodeError> {
        LxZone::decode(response::member(result, "Zone")?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListZones {
    pub object: ObjectKey,
    pub paging: Paging,
}

impl ListZones {
    pub fn new(object: ObjectKey) -> Self {
        Self {
            object,
            paging: Paging::default(),
        }
    }
}

impl Endpoint for ListZones {
    type Output = Page<LxZone>;
    const NAME: &'static str = "list_zones";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/zone/list", self.object.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::page(result, "Zones", LxZone::decode)
    }
}
paged!(ListZones);

// ---- fences ----

#[derive(Debug, Clone, PartialEq)]
pub struct CreateFence {
    pub fence: FenceKey,
    pub region: Region,
    pub trigger: Trigger,
    pub callback: Callback,
    pub predicate: String,
}

impl CreateFence {
    pub fn new<S: AsRef<str>>(
        fence: FenceKey,
        region: Region,
        trigger: Trigger,
        callback: Callback,
        from_feeds: &[S],
    ) -> Self {
        Self {
            fence,
            region,
            trigger,
            callback,
            predicate: feeds(from_feeds).to_string(),
        }
    }

    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicate = predicate.into();
        self
    }
}

impl Endpoint for CreateFence {
    type Output = ();
    const NAME: &'static str = "create_fence";
    const METHOD: HttpMethod = HttpMethod::Post;

    fn path(&self) -> String {
        format!("{}/create", self.fence.path())
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.region)
            .set("trigger", self.trigger)
            .extend_from(&self.callback)
            .set("predicate", &self.predicate);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<(), DecodeError> {
        no_result(result)
    }
}

status_request!(ActivateFence, fence: FenceKey, Put, "activate_fence", "activate");
status_request!(DeactivateFence, fence: FenceKey, Put, "deactivate_fence", "deactivate");
status_request!(DeleteFence, fence: FenceKey, Delete, "delete_fence", "delete");

#[derive(Debug, Clone, PartialEq)]
pub struct GetFence {
    pub fence: FenceKey,
}

impl GetFence {
    pub fn new(fence: FenceKey) -> Self {
        Self { fence }
    }
}

impl Endpoint for GetFence {
    type Output = LxFence;
    const NAME: &'static str = "get_fence";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        format!("{}/get", self.fence.path())
    }

    fn decode(&self, result: Option<&Value>) -> Result<LxFence, DecodeError> {
        LxFence::decode(response::member(result, "Fence")?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFences {
    pub paging: Paging,
}

impl ListFences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Endpoint for ListFences {
    type Output = Page<LxFence>;
    const NAME: &'static str = "list_fences";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/fence/list".to_string()
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::page(result, "Fences", LxFence::decode)
    }
}
paged!(ListFences);

// ---- analytics ----

/// Past locations matching a predicate within `[start_time, end_time]`.
#[derive(Debug, Clone, PartialEq)]
pub struct GetLocationHistory {
    pub predicate: String,
    pub start_time: i64,
    pub end_time: i64,
    pub paging: Paging,
}

impl GetLocationHistory {
    pub fn new(object: &ObjectKey, start_time: i64, end_time: i64) -> Self {
        let source = Source::object(object.feed.clone(), object.object_id.clone());
        Self::query(lql::select(Select::Locations, &source), start_time, end_time)
    }

    pub fn query(predicate: impl Into<String>, start_time: i64, end_time: i64) -> Self {
        Self {
            predicate: predicate.into(),
            start_time,
            end_time,
            paging: Paging::default(),
        }
    }
}

impl Endpoint for GetLocationHistory {
    type Output = Page<LxLocation>;
    const NAME: &'static str = "get_location_history";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/analytics/location/history".to_string()
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.set("predicate", &self.predicate)
            .set("starttime", self.start_time)
            .set("endtime", self.end_time)
            .extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::location_history(result)
    }
}
paged!(GetLocationHistory);

/// Objects that were inside a region during a time window.
#[derive(Debug, Clone, PartialEq)]
pub struct GetSpaceActivity {
    pub predicate: String,
    pub region: Region,
    pub start_time: i64,
    pub end_time: i64,
    pub paging: Paging,
}

impl GetSpaceActivity {
    pub fn new(feed: &FeedKey, region: Region, start_time: i64, end_time: i64) -> Self {
        let predicate = lql::select(Select::ObjectLocations, &Source::feed(feed.feed.clone()));
        Self::query(predicate, region, start_time, end_time)
    }

    pub fn query(
        predicate: impl Into<String>,
        region: Region,
        start_time: i64,
        end_time: i64,
    ) -> Self {
        Self {
            predicate: predicate.into(),
            region,
            start_time,
            end_time,
            paging: Paging::default(),
        }
    }
}

impl Endpoint for GetSpaceActivity {
    type Output = Page<LxObjectLocation>;
    const NAME: &'static str = "get_space_activity";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/analytics/space/activity".to_string()
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.set("predicate", &self.predicate)
            .extend_from(&self.region)
            .set("starttime", self.start_time)
            .set("endtime", self.end_time)
            .extend_from(&self.paging);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<Self::Output, DecodeError> {
        response::page(result, "Objects", LxObjectLocation::decode)
    }
}
paged!(GetSpaceActivity);

/// Counts of objects per grid cell over a rectangle.
#[derive(Debug, Clone, PartialEq)]
pub struct GetHistogram {
    pub predicate: String,
    pub region: Rectangle,
    pub horizontal_slices: u32,
    pub vertical_slices: u32,
    pub start_time: i64,
    pub end_time: i64,
}

impl GetHistogram {
    pub fn new(
        feed: &FeedKey,
        region: Rectangle,
        slices: (u32, u32),
        start_time: i64,
        end_time: i64,
    ) -> Self {
        let predicate = lql::select(Select::ObjectLocations, &Source::feed(feed.feed.clone()));
        Self::query(predicate, region, slices, start_time, end_time)
    }

    pub fn query(
        predicate: impl Into<String>,
        region: Rectangle,
        (horizontal_slices, vertical_slices): (u32, u32),
        start_time: i64,
        end_time: i64,
    ) -> Self {
        Self {
            predicate: predicate.into(),
            region,
            horizontal_slices,
            vertical_slices,
            start_time,
            end_time,
        }
    }
}

impl Endpoint for GetHistogram {
    type Output = LxGridAggregates;
    const NAME: &'static str = "get_histogram";
    const METHOD: HttpMethod = HttpMethod::Get;

    fn path(&self) -> String {
        "/analytics/histogram".to_string()
    }

    fn params(&self) -> Params {
        let mut p = Params::new();
        p.set("predicate", &self.predicate)
            .extend_from(&self.region)
            .set("hslices", self.horizontal_slices)
            .set("vslices", self.vertical_slices)
            .set("starttime", self.start_time)
            .set("endtime", self.end_time);
        p
    }

    fn decode(&self, result: Option<&Value>) -> Result<LxGridAggregates, DecodeError> {
        LxGridAggregates::decode(response::required(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn get_sends_query_string_and_no_body() {
        let mut req = SearchRegion::new(Region::circle(37.5, -122.5, 500.0), &["speedtraps"]);
        req.paging.fetch_size = 5;
        let http = encode(&req);
        assert_eq!(http.method, HttpMethod::Get);
        assert_eq!(http.body, None);
        assert_eq!(
            http.uri,
            "/search/region?region=Circle&latitude=37.5&longitude=-122.5&radius=500\
             &predicate=SELECT+*%2C+LOCATION.*+FROM+speedtraps&fetchsize=5"
        );
    }

    #[test]
    fn first_page_omits_start_key() {
        let mut req = ListFeeds::new();
        assert_eq!(encode(&req).uri, "/feed/list?fetchsize=20");
        req.set_start_key(Some("k2".into()));
        assert_eq!(encode(&req).uri, "/feed/list?startkey=k2&fetchsize=20");
        req.set_start_key(Some(String::new()));
        assert_eq!(encode(&req).uri, "/feed/list?fetchsize=20");
    }

    #[test]
    fn post_sends_form_body() {
        let req = CreateObject::new(ObjectKey::new("car-a", "cars"))
            .with_name_values(NameValues::new().with("license", "2992992"))
            .with_location(LocationFix::new(37.0, -122.0, 1_278_000_000).with_ttl(60));
        let http = encode(&req);
        assert_eq!(http.method, HttpMethod::Post);
        assert_eq!(http.uri, "/feed/cars/object/car-a/create");
        assert_eq!(
            http.body.as_deref(),
            Some("license=2992992&latitude=37&longitude=-122&time=1278000000&ttl=60")
        );
    }

    #[test]
    fn zone_defaults_to_its_own_feed() {
        let key = ObjectKey::new("car-a", "cars").zone("trap-watch");
        let req = CreateZone::new(
            key,
            ObjectRegion::circle(500.0),
            Trigger::Ingress,
            Callback::url("http://alerts"),
        );
        assert_eq!(req.predicate, "FROM cars");

        let req = req.watching::<&str>(&[]);
        assert_eq!(req.predicate, "FROM cars");

        let req = req.watching(&["speedtraps", "police"]);
        let params = req.params();
        assert_eq!(params.get("predicate"), Some("FROM speedtraps, police"));
        assert_eq!(params.get("trigger"), Some("Ingress"));
        assert_eq!(params.get("region"), Some("Circle"));
        assert_eq!(params.get("callbacktype"), Some("url"));
        assert_eq!(
            encode(&req).uri,
            "/feed/cars/object/car-a/zone/trap-watch/create"
        );
    }

    #[test]
    fn status_only_routes() {
        let zone = ZoneKey::new("z", "o", "f");
        assert_eq!(encode(&ActivateZone::new(zone.clone())).uri, "/feed/f/object/o/zone/z/activate");
        assert_eq!(DeactivateZone::METHOD, HttpMethod::Put);
        assert_eq!(encode(&DeleteZone::new(zone)).method, HttpMethod::Delete);
        assert_eq!(
            encode(&DeleteFeed::new(FeedKey::new("cars"))).uri,
            "/feed/cars/delete"
        );
        assert_eq!(
            encode(&ActivateFence::new(FenceKey::new("trap"))).uri,
            "/fence/trap/activate"
        );
    }

    #[test]
    fn default_predicates() {
        let object = ObjectKey::new("car-a", "cars");
        assert_eq!(
            GetLocationHistory::new(&object, 0, 10).predicate,
            "SELECT LOCATION.* FROM cars WITH oid \"car-a\""
        );
        assert_eq!(
            ListObjects::feed(&FeedKey::new("cars")).predicate,
            "SELECT * FROM cars"
        );
        assert_eq!(
            SearchNearby::new(object.clone(), ObjectRegion::circle(10.0), &["speedtraps"]).predicate,
            "SELECT *, LOCATION.* FROM speedtraps"
        );
        assert_eq!(
            SearchNearby::new::<String>(object, ObjectRegion::circle(10.0), &[]).predicate,
            "SELECT *, LOCATION.* FROM cars"
        );
    }

    #[test]
    fn fence_watches_every_feed_given() {
        let feeds = vec!["cars".to_string(), "trucks".to_string()];
        let req = CreateFence::new(
            FenceKey::new("downtown"),
            Region::circle(37.79, -122.4, 800.0),
            Trigger::Egress,
            Callback::url("http://alerts"),
            &feeds,
        );
        let params = req.params();
        assert_eq!(params.get("predicate"), Some("FROM cars, trucks"));
        assert_eq!(params.get("trigger"), Some("Egress"));
    }

    #[test]
    fn histogram_params() {
        let req = GetHistogram::new(
            &FeedKey::new("cars"),
            Rectangle::new(37.0, -123.0, 38.0, -122.0),
            (4, 2),
            100,
            200,
        );
        let p = req.params();
        assert_eq!(p.get("region"), Some("Rectangle"));
        assert_eq!(p.get("minlongitude"), Some("-123"));
        assert_eq!(p.get("hslices"), Some("4"));
        assert_eq!(p.get("vslices"), Some("2"));
        assert!(!p.contains("fetchsize"));
    }
}
