use std::fmt;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::callback::Callback;
use crate::config::{Overrides, load_config};
use crate::error::{Error, Result, ServerErrorKind};
use crate::keys::{FeedKey, FenceKey, ObjectKey, ZoneKey};
use crate::objects::{
    Expiry, LxFeed, LxFence, LxGridAggregates, LxLocation, LxObject, LxObjectLocation, LxZone,
    NameValues, Trigger,
};
use crate::pagination::{ErrorMode, Pages};
use crate::region::{ObjectRegion, Rectangle, Region};
use crate::request::{
    self, ActivateFence, ActivateZone, CreateFeed, CreateFence, CreateObject, CreateZone,
    DeactivateFence, DeactivateZone, DeleteFeed, DeleteFence, DeleteObject, DeleteZone, Endpoint,
    GetAttributes, GetFence, GetHistogram, GetLocation, GetLocationHistory, GetSpaceActivity,
    GetZone, ListFeeds, ListFences, ListObjects, ListZones, LocationFix, PagedEndpoint,
    SearchNearby, SearchRegion, UpdateAttributes, UpdateLocation,
};
use crate::response::{Envelope, Page, Response, SUCCESS};
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, TransportError};

pub const DEFAULT_HOST: &str = "api.locomatix.com";
pub const DEFAULT_VERSION: &str = "0.9";

#[derive(Clone)]
pub struct ClientConfig {
    /// Customer id (`lx-custid`).
    pub custid: String,
    /// Customer key (`lx-custkey`).
    pub key: String,
    /// Customer secret key (`lx-secretkey`).
    pub secret_key: String,
    pub host: String,
    /// Defaults to 443 with SSL and 80 without.
    pub port: Option<u16>,
    pub use_ssl: bool,
    /// API version sent as `lx-apiversion`.
    pub version: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Attempts per request before giving up on transport errors.
    pub retry: usize,
    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl ClientConfig {
    pub fn new(
        custid: impl Into<String>,
        key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            custid: custid.into(),
            key: key.into(),
            secret_key: secret_key.into(),
            host: DEFAULT_HOST.to_string(),
            port: None,
            use_ssl: true,
            version: DEFAULT_VERSION.to_string(),
            timeout: Duration::from_secs(10),
            retry: 3,
            retry_delay: Duration::ZERO,
        }
    }

    /// Resolves settings from `overrides`, then `LX_*` environment
    /// variables, then the first `.lxrc` found.
    pub fn load(overrides: Overrides) -> Result<Self> {
        load_config(overrides)
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: usize) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or(if self.use_ssl { 443 } else { 80 })
    }

    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("custid", &self.custid)
            .field("key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("host", &self.host)
            .field("port", &self.port())
            .field("use_ssl", &self.use_ssl)
            .field("version", &self.version)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

/// A blocking Locomatix client.
///
/// Calls run one at a time; give each thread its own client.
pub struct Client {
    config: ClientConfig,
    transport: Box<dyn Transport>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a client from `LX_*` environment variables and/or `.lxrc`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::load(Overrides::default())?)
    }

    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Uses a caller-supplied transport instead of `reqwest`.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Self {
        Self {
            config,
            transport: Box::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Sends one request and decodes its reply.
    ///
    /// Transport failures are retried up to `retry` attempts in total,
    /// reconnecting in between. Any reply from the server, error statuses
    /// included, is final.
    pub fn execute<E: Endpoint>(&self, endpoint: &E) -> Result<Response<E::Output>> {
        let request = request::encode(endpoint);
        debug!(
            operation = E::NAME,
            method = %request.method,
            uri = %request.uri,
            body_len = request.body.as_ref().map_or(0, String::len),
            "sending request"
        );

        let http = self.send_with_retry(E::NAME, &request)?;

        let envelope = match Envelope::parse(&http.body) {
            Ok(envelope) => envelope,
            Err(source) if (200..300).contains(&http.status) => {
                return Err(Error::Decode {
                    operation: E::NAME,
                    source,
                });
            }
            Err(_) => {
                return Err(Error::Http {
                    status: http.status,
                    reason: http.reason,
                    body: http.body,
                });
            }
        };

        debug!(
            operation = E::NAME,
            status = %envelope.status,
            execution_time = ?envelope.execution_time,
            "response received"
        );

        if envelope.status != SUCCESS {
            return Err(match ServerErrorKind::from_status(&envelope.status) {
                Some(kind) => Error::Server(kind),
                None => Error::UnknownStatus(envelope.status),
            });
        }

        let data = endpoint
            .decode(envelope.result.as_ref())
            .map_err(|source| Error::Decode {
                operation: E::NAME,
                source,
            })?;

        Ok(Response {
            status: http.status,
            message: envelope.status,
            execution_time: envelope.execution_time,
            body: http.body,
            data,
        })
    }

    fn send_with_retry(&self, operation: &'static str, request: &HttpRequest) -> Result<HttpResponse> {
        let attempts = self.config.retry.max(1);
        let mut tries = 0usize;
        loop {
            tries += 1;
            let err = match self.transport.send(request) {
                Ok(resp) => return Ok(resp),
                Err(err) => err,
            };

            if tries >= attempts {
                return Err(self.exhausted(operation, err));
            }

            warn!(operation, attempt = tries, of = attempts, error = ?err, "request failed, retrying");
            if !self.config.retry_delay.is_zero() {
                thread::sleep(self.config.retry_delay);
            }
            if let Err(err) = self.transport.reconnect() {
                warn!(operation, error = ?err, "reconnect failed");
            }
        }
    }

    fn exhausted(&self, operation: &'static str, source: TransportError) -> Error {
        let host = self.config.host.clone();
        let port = self.config.port();
        match source {
            TransportError::Connect(_) => Error::ConnectionFailed { host, port, source },
            TransportError::Io(_) => Error::RequestFailed {
                operation,
                host,
                port,
                source,
            },
        }
    }

    /// Walks every page of `request`, starting from the first.
    pub fn paginate<E: PagedEndpoint>(&self, request: E, mode: ErrorMode) -> Pages<'_, E> {
        Pages::new(self, request, mode)
    }

    // ---- feeds ----

    pub fn create_feed(
        &self,
        feed: &FeedKey,
        object_expiry: Expiry,
        location_expiry: Expiry,
        name_values: &NameValues,
    ) -> Result<Response<()>> {
        self.execute(
            &CreateFeed::new(feed.clone(), object_expiry, location_expiry)
                .with_name_values(name_values.clone()),
        )
    }

    pub fn delete_feed(&self, feed: &FeedKey) -> Result<Response<()>> {
        self.execute(&DeleteFeed::new(feed.clone()))
    }

    /// First page of feeds.
    pub fn list_feeds(&self) -> Result<Response<Page<LxFeed>>> {
        self.execute(&ListFeeds::new())
    }

    pub fn list_feeds_iter(&self) -> Pages<'_, ListFeeds> {
        self.paginate(ListFeeds::new(), ErrorMode::Stop)
    }

    // ---- objects ----

    pub fn create_object(
        &self,
        object: &ObjectKey,
        name_values: &NameValues,
        location: Option<LocationFix>,
    ) -> Result<Response<()>> {
        let mut req = CreateObject::new(object.clone()).with_name_values(name_values.clone());
        req.location = location;
        self.execute(&req)
    }

    pub fn delete_object(&self, object: &ObjectKey) -> Result<Response<()>> {
        self.execute(&DeleteObject::new(object.clone()))
    }

    pub fn list_objects(&self, feed: &FeedKey) -> Result<Response<Page<LxObject>>> {
        self.execute(&ListObjects::feed(feed))
    }

    pub fn list_objects_iter(&self, feed: &FeedKey) -> Pages<'_, ListObjects> {
        self.paginate(ListObjects::feed(feed), ErrorMode::Stop)
    }

    pub fn query_objects(&self, predicate: &str) -> Result<Response<Page<LxObject>>> {
        self.execute(&ListObjects::query(predicate))
    }

    pub fn query_objects_iter(&self, predicate: &str) -> Pages<'_, ListObjects> {
        self.paginate(ListObjects::query(predicate), ErrorMode::Stop)
    }

    pub fn update_attributes(
        &self,
        object: &ObjectKey,
        name_values: &NameValues,
    ) -> Result<Response<()>> {
        self.execute(&UpdateAttributes::new(object.clone(), name_values.clone()))
    }

    pub fn get_attributes(&self, object: &ObjectKey) -> Result<Response<LxObject>> {
        self.execute(&GetAttributes::new(object.clone()))
    }

    pub fn update_location(
        &self,
        object: &ObjectKey,
        fix: LocationFix,
        name_values: &NameValues,
    ) -> Result<Response<()>> {
        self.execute(
            &UpdateLocation::new(object.clone(), fix).with_name_values(name_values.clone()),
        )
    }

    pub fn get_location(
        &self,
        object: &ObjectKey,
        allow_expired: bool,
    ) -> Result<Response<LxLocation>> {
        self.execute(&GetLocation::new(object.clone()).allow_expired(allow_expired))
    }

    // ---- search ----

    /// Searches `from_feeds` around `object`; an empty list searches the object's feed.
    pub fn search_nearby<S: AsRef<str>>(
        &self,
        object: &ObjectKey,
        region: ObjectRegion,
        from_feeds: &[S],
    ) -> Result<Response<Page<LxObjectLocation>>> {
        self.execute(&SearchNearby::new(object.clone(), region, from_feeds))
    }

    pub fn search_nearby_iter<S: AsRef<str>>(
        &self,
        object: &ObjectKey,
        region: ObjectRegion,
        from_feeds: &[S],
    ) -> Pages<'_, SearchNearby> {
        self.paginate(
            SearchNearby::new(object.clone(), region, from_feeds),
            ErrorMode::Stop,
        )
    }

    pub fn query_search_nearby(
        &self,
        object: &ObjectKey,
        region: ObjectRegion,
        predicate: &str,
    ) -> Result<Response<Page<LxObjectLocation>>> {
        self.execute(&SearchNearby::query(object.clone(), region, predicate))
    }

    pub fn query_search_nearby_iter(
        &self,
        object: &ObjectKey,
        region: ObjectRegion,
        predicate: &str,
    ) -> Pages<'_, SearchNearby> {
        self.paginate(
            SearchNearby::query(object.clone(), region, predicate),
            ErrorMode::Stop,
        )
    }

    pub fn search_region<S: AsRef<str>>(
        &self,
        region: &Region,
        from_feeds: &[S],
    ) -> Result<Response<Page<LxObjectLocation>>> {
        self.execute(&SearchRegion::new(region.clone(), from_feeds))
    }

    pub fn search_region_iter<S: AsRef<str>>(
        &self,
        region: &Region,
        from_feeds: &[S],
    ) -> Pages<'_, SearchRegion> {
        self.paginate(SearchRegion::new(region.clone(), from_feeds), ErrorMode::Stop)
    }

    pub fn query_search_region(
        &self,
        region: &Region,
        predicate: &str,
    ) -> Result<Response<Page<LxObjectLocation>>> {
        self.execute(&SearchRegion::query(region.clone(), predicate))
    }

    pub fn query_search_region_iter(
        &self,
        region: &Region,
        predicate: &str,
    ) -> Pages<'_, SearchRegion> {
        self.paginate(SearchRegion::query(region.clone(), predicate), ErrorMode::Stop)
    }

    // ---- zones ----

    /// Attaches a zone to `zone`'s object, alerting on objects of `from_feeds`.
    /// An empty list watches the object's own feed.
    pub fn create_zone<S: AsRef<str>>(
        &self,
        zone: &ZoneKey,
        region: ObjectRegion,
        trigger: Trigger,
        callback: &Callback,
        from_feeds: &[S],
    ) -> Result<Response<()>> {
        self.execute(
            &CreateZone::new(zone.clone(), region, trigger, callback.clone()).watching(from_feeds),
        )
    }

    pub fn activate_zone(&self, zone: &ZoneKey) -> Result<Response<()>> {
        self.execute(&ActivateZone::new(zone.clone()))
    }

    pub fn get_zone(&self, zone: &ZoneKey) -> Result<Response<LxZone>> {
        self.execute(&GetZone::new(zone.clone()))
    }

    pub fn deactivate_zone(&self, zone: &ZoneKey) -> Result<Response<()>> {
        self.execute(&DeactivateZone::new(zone.clone()))
    }

    pub fn delete_zone(&self, zone: &ZoneKey) -> Result<Response<()>> {
        self.execute(&DeleteZone::new(zone.clone()))
    }

    pub fn list_zones(&self, object: &ObjectKey) -> Result<Response<Page<LxZone>>> {
        self.execute(&ListZones::new(object.clone()))
    }

    pub fn list_zones_iter(&self, object: &ObjectKey) -> Pages<'_, ListZones> {
        self.paginate(ListZones::new(object.clone()), ErrorMode::Stop)
    }

    // ---- fences ----

    pub fn create_fence<S: AsRef<str>>(
        &self,
        fence: &FenceKey,
        region: &Region,
        trigger: Trigger,
        callback: &Callback,
        from_feeds: &[S],
    ) -> Result<Response<()>> {
        self.execute(&CreateFence::new(
            fence.clone(),
            region.clone(),
            trigger,
            callback.clone(),
            from_feeds,
        ))
    }

    pub fn activate_fence(&self, fence: &FenceKey) -> Result<Response<()>> {
        self.execute(&ActivateFence::new(fence.clone()))
    }

    pub fn get_fence(&self, fence: &FenceKey) -> Result<Response<LxFence>> {
        self.execute(&GetFence::new(fence.clone()))
    }

    pub fn deactivate_fence(&self, fence: &FenceKey) -> Result<Response<()>> {
        self.execute(&DeactivateFence::new(fence.clone()))
    }

    pub fn delete_fence(&self, fence: &FenceKey) -> Result<Response<()>> {
        self.execute(&DeleteFence::new(fence.clone()))
    }

    pub fn list_fences(&self) -> Result<Response<Page<LxFence>>> {
        self.execute(&ListFences::new())
    }

    pub fn list_fences_iter(&self) -> Pages<'_, ListFences> {
        self.paginate(ListFences::new(), ErrorMode::Stop)
    }

    // ---- analytics ----

    pub fn get_location_history(
        &self,
        object: &ObjectKey,
        start_time: i64,
        end_time: i64,
    ) -> Result<Response<Page<LxLocation>>> {
        self.execute(&GetLocationHistory::new(object, start_time, end_time))
    }

    pub fn get_location_history_iter(
        &self,
        object: &ObjectKey,
        start_time: i64,
        end_time: i64,
    ) -> Pages<'_, GetLocationHistory> {
        self.paginate(
            GetLocationHistory::new(object, start_time, end_time),
            ErrorMode::Stop,
        )
    }

    pub fn query_location_history(
        &self,
        predicate: &str,
        start_time: i64,
        end_time: i64,
    ) -> Result<Response<Page<LxLocation>>> {
        self.execute(&GetLocationHistory::query(predicate, start_time, end_time))
    }

    pub fn query_location_history_iter(
        &self,
        predicate: &str,
        start_time: i64,
        end_time: i64,
    ) -> Pages<'_, GetLocationHistory> {
        self.paginate(
            GetLocationHistory::query(predicate, start_time, end_time),
            ErrorMode::Stop,
        )
    }

    pub fn get_space_activity(
        &self,
        feed: &FeedKey,
        region: &Region,
        start_time: i64,
        end_time: i64,
    ) -> Result<Response<Page<LxObjectLocation>>> {
        self.execute(&GetSpaceActivity::new(
            feed,
            region.clone(),
            start_time,
            end_time,
        ))
    }

    pub fn get_space_activity_iter(
        &self,
        feed: &FeedKey,
        region: &Region,
        start_time: i64,
        end_time: i64,
    ) -> Pages<'_, GetSpaceActivity> {
        self.paginate(
            GetSpaceActivity::new(feed, region.clone(), start_time, end_time),
            ErrorMode::Stop,
        )
    }

    pub fn query_space_activity(
        &self,
        predicate: &str,
        region: &Region,
        start_time: i64,
        end_time: i64,
    ) -> Result<Response<Page<LxObjectLocation>>> {
        self.execute(&GetSpaceActivity::query(
            predicate,
            region.clone(),
            start_time,
            end_time,
        ))
    }

    pub fn query_space_activity_iter(
        &self,
        predicate: &str,
        region: &Region,
        start_time: i64,
        end_time: i64,
    ) -> Pages<'_, GetSpaceActivity> {
        self.paginate(
            GetSpaceActivity::query(predicate, region.clone(), start_time, end_time),
            ErrorMode::Stop,
        )
    }

    /// `slices` is `(horizontal, vertical)`.
    pub fn get_histogram(
        &self,
        feed: &FeedKey,
        region: Rectangle,
        slices: (u32, u32),
        start_time: i64,
        end_time: i64,
    ) -> Result<Response<LxGridAggregates>> {
        self.execute(&GetHistogram::new(
            feed, region, slices, start_time, end_time,
        ))
    }

    pub fn query_histogram(
        &self,
        predicate: &str,
        region: Rectangle,
        slices: (u32, u32),
        start_time: i64,
        end_time: i64,
    ) -> Result<Response<LxGridAggregates>> {
        self.execute(&GetHistogram::query(
            predicate, region, slices, start_time, end_time,
        ))
    }
}
