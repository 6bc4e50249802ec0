//! Value types sent to and returned by the service.

use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::callback::Callback;
use crate::error::DecodeError;
use crate::lql;
use crate::params::{Params, ToParams};
use crate::region::{ObjectRegion, Region};
use crate::util::{require, require_str, scalar_to_string, value_as_f64, value_as_i64};

/// Free-form attributes attached to objects, locations, zones and fences.
///
/// Names keep the order they were first inserted in, and a name may carry
/// several values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValues {
    entries: Vec<(String, Vec<String>)>,
}

impl NameValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value; an existing name gains one more value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((name, vec![value])),
        }
        self
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    /// First value for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).first().map(String::as_str)
    }

    pub fn get_all(&self, name: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Reads the `[{"name": value}, ...]` wire shape.
    pub(crate) fn decode(value: Option<&Value>) -> Result<Self, DecodeError> {
        let mut out = NameValues::new();
        let items = match value {
            None | Some(Value::Null) => return Ok(out),
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(DecodeError::invalid(format!(
                    "name/value pairs must be an array, got {other}"
                )));
            }
        };
        for item in items {
            let pairs = item.as_object().ok_or_else(|| {
                DecodeError::invalid(format!("name/value entry is not an object: {item}"))
            })?;
            for (name, v) in pairs {
                out.insert(name.clone(), scalar_to_string(v));
            }
        }
        Ok(out)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut nv = NameValues::new();
        for (k, v) in iter {
            nv.insert(k, v);
        }
        nv
    }
}

impl ToParams for NameValues {
    fn write_params(&self, params: &mut Params) {
        for (name, values) in &self.entries {
            for v in values {
                params.append(name.as_str(), v);
            }
        }
    }
}

impl Serialize for NameValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, values) in &self.entries {
            match values.as_slice() {
                [single] => map.serialize_entry(name, single)?,
                many => map.serialize_entry(name, many)?,
            }
        }
        map.end()
    }
}

/// How long the service keeps objects or locations of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    Forever,
    Seconds(u64),
}

impl Expiry {
    /// Server representation: negative means forever.
    pub fn from_wire(value: i64) -> Self {
        if value < 0 {
            Expiry::Forever
        } else {
            Expiry::Seconds(value as u64)
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            Expiry::Forever => -1,
            Expiry::Seconds(s) => s as i64,
        }
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expiry::Forever => f.write_str("forever"),
            Expiry::Seconds(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for Expiry {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("forever") {
            return Ok(Expiry::Forever);
        }
        s.parse::<i64>()
            .map(Expiry::from_wire)
            .map_err(|_| format!("expected a number of seconds or `forever`, got `{s}`"))
    }
}

impl Serialize for Expiry {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expiry::Forever => serializer.serialize_str("forever"),
            Expiry::Seconds(s) => serializer.serialize_u64(*s),
        }
    }
}

/// When a zone or fence fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Trigger {
    Ingress,
    Egress,
    IngressAndEgress,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Ingress => "Ingress",
            Trigger::Egress => "Egress",
            Trigger::IngressAndEgress => "IngressAndEgress",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Trigger::Ingress, Trigger::Egress, Trigger::IngressAndEgress]
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown trigger `{s}` (Ingress, Egress, IngressAndEgress)"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ActivationState {
    Active,
    Inactive,
}

impl FromStr for ActivationState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            v if v.eq_ignore_ascii_case("active") => Ok(ActivationState::Active),
            v if v.eq_ignore_ascii_case("inactive") => Ok(ActivationState::Inactive),
            other => Err(format!("unknown activation state `{other}`")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LxFeed {
    pub feed: String,
    pub object_expiry: Expiry,
    pub location_expiry: Expiry,
}

impl LxFeed {
    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        Ok(Self {
            feed: require_str(value, "Feed")?.to_string(),
            object_expiry: Expiry::from_wire(require_i64(value, "ObjectExpiry")?),
            location_expiry: Expiry::from_wire(require_i64(value, "LocationExpiry")?),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LxObject {
    pub object_id: String,
    pub feed: String,
    pub name_values: NameValues,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<LxLocation>,
}

impl LxObject {
    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        let object_id = require_str(value, "ObjectID")?.to_string();
        let feed = require_str(value, "Feed")?.to_string();
        let location = if value.get("Latitude").is_some() || value.get("Longitude").is_some() {
            let mut loc = LxLocation::decode(value)?;
            loc.object_id = Some(object_id.clone());
            loc.feed = Some(feed.clone());
            Some(loc)
        } else {
            None
        };
        Ok(Self {
            name_values: NameValues::decode(value.get("ObjectNameValues"))?,
            object_id,
            feed,
            location,
        })
    }
}

/// One reported position of an object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LxLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub object_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feed: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: Option<i64>,
    pub name_values: NameValues,
}

impl LxLocation {
    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        Ok(Self {
            object_id: opt_str(value, "ObjectID")?,
            feed: opt_str(value, "Feed")?,
            latitude: opt_f64(value, "Latitude")?,
            longitude: opt_f64(value, "Longitude")?,
            time: opt_i64(value, "Time")?,
            name_values: NameValues::decode(value.get("LocationNameValues"))?,
        })
    }
}

/// A search or activity hit: an object together with its location.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LxObjectLocation {
    pub object_id: String,
    pub feed: String,
    pub name_values: NameValues,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub time: Option<i64>,
    pub location_name_values: NameValues,
}

impl LxObjectLocation {
    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        Ok(Self {
            object_id: require_str(value, "ObjectID")?.to_string(),
            feed: require_str(value, "Feed")?.to_string(),
            name_values: NameValues::decode(value.get("ObjectNameValues"))?,
            latitude: opt_f64(value, "Latitude")?,
            longitude: opt_f64(value, "Longitude")?,
            time: opt_i64(value, "Time")?,
            location_name_values: NameValues::decode(value.get("LocationNameValues"))?,
        })
    }
}

/// A region that follows an object and alerts on other objects crossing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LxZone {
    pub zone_id: String,
    pub object_id: String,
    pub feed: String,
    pub region: ObjectRegion,
    pub trigger: Trigger,
    pub callback: Callback,
    pub predicate: String,
    pub from_feeds: Vec<String>,
    pub name_values: NameValues,
    pub state: ActivationState,
}

impl LxZone {
    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        let follow = require(value, "FollowObject")?;
        let predicate = require_str(value, "Predicate")?.to_string();
        Ok(Self {
            zone_id: require_str(value, "ZoneID")?.to_string(),
            object_id: require_str(follow, "ObjectID")?.to_string(),
            feed: require_str(follow, "Feed")?.to_string(),
            region: ObjectRegion::decode(require(value, "Region")?)?,
            trigger: parse_field(value, "Trigger")?,
            callback: Callback::decode(require(value, "Callback")?)?,
            from_feeds: lql::from_feeds_of(&predicate)
                .into_iter()
                .map(str::to_string)
                .collect(),
            predicate,
            name_values: NameValues::decode(value.get("NameValues"))?,
            state: parse_field(value, "State")?,
        })
    }
}

/// A fixed region that alerts on objects crossing it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LxFence {
    pub fence_id: String,
    pub region: Region,
    pub trigger: Trigger,
    pub callback: Callback,
    pub predicate: String,
    pub from_feeds: Vec<String>,
    pub name_values: NameValues,
    pub state: ActivationState,
}

impl LxFence {
    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        let predicate = require_str(value, "Predicate")?.to_string();
        Ok(Self {
            fence_id: require_str(value, "FenceID")?.to_string(),
            region: Region::decode(require(value, "Region")?)?,
            trigger: parse_field(value, "Trigger")?,
            callback: Callback::decode(require(value, "Callback")?)?,
            from_feeds: lql::from_feeds_of(&predicate)
                .into_iter()
                .map(str::to_string)
                .collect(),
            predicate,
            name_values: NameValues::decode(value.get("NameValues"))?,
            state: parse_field(value, "State")?,
        })
    }
}

/// Aggregate answer to a `COUNT`/`SUM`/`MIN`/`MAX` query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LxAggregate {
    pub count: Option<u64>,
    pub sum: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl LxAggregate {
    /// `None` when the result carries no aggregate field at all.
    pub(crate) fn decode(result: &Value) -> Result<Option<Self>, DecodeError> {
        let count = opt_i64(result, "Count")?
            .map(|c| {
                u64::try_from(c).map_err(|_| DecodeError::invalid(format!("negative count {c}")))
            })
            .transpose()?;
        let agg = Self {
            count,
            sum: opt_f64(result, "Sum")?,
            max: opt_f64(result, "Maximum")?,
            min: opt_f64(result, "Minimum")?,
        };
        if agg == Self::default() {
            Ok(None)
        } else {
            Ok(Some(agg))
        }
    }
}

/// Object counts over a grid laid across a rectangle.
///
/// `counts` has one row per vertical slice; each row is
/// `horizontal_slices` wide.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LxGridAggregates {
    pub horizontal_slices: usize,
    pub vertical_slices: usize,
    pub counts: Vec<Vec<u64>>,
}

impl LxGridAggregates {
    pub(crate) fn decode(result: &Value) -> Result<Self, DecodeError> {
        let horizontal_slices = slices(result, "HorizontalSlices")?;
        let vertical_slices = slices(result, "VerticalSlices")?;
        let grid = require(result, "ObjectGrid")?
            .as_array()
            .ok_or_else(|| DecodeError::invalid("`ObjectGrid` is not an array"))?
            .iter()
            .map(|cell| {
                value_as_i64(cell)
                    .and_then(|c| u64::try_from(c).ok())
                    .ok_or_else(|| DecodeError::invalid(format!("bad grid cell {cell}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if horizontal_slices == 0 {
            return Err(DecodeError::invalid("histogram has zero horizontal slices"));
        }
        if grid.len() % horizontal_slices != 0 {
            return Err(DecodeError::invalid(format!(
                "grid of {} cells does not divide into rows of {}",
                grid.len(),
                horizontal_slices
            )));
        }

        Ok(Self {
            horizontal_slices,
            vertical_slices,
            counts: grid
                .chunks(horizontal_slices)
                .map(<[u64]>::to_vec)
                .collect(),
        })
    }
}

fn slices(value: &Value, name: &str) -> Result<usize, DecodeError> {
    let n = require_i64(value, name)?;
    usize::try_from(n).map_err(|_| DecodeError::invalid(format!("`{name}` is negative: {n}")))
}

fn require_i64(value: &Value, name: &str) -> Result<i64, DecodeError> {
    opt_i64(value, name)?.ok_or_else(|| DecodeError::invalid(format!("missing field `{name}`")))
}

fn opt_i64(value: &Value, name: &str) -> Result<Option<i64>, DecodeError> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => value_as_i64(v)
            .map(Some)
            .ok_or_else(|| DecodeError::invalid(format!("field `{name}` is not an integer: {v}"))),
    }
}

fn opt_f64(value: &Value, name: &str) -> Result<Option<f64>, DecodeError> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(v) => value_as_f64(v)
            .map(Some)
            .ok_or_else(|| DecodeError::invalid(format!("field `{name}` is not a number: {v}"))),
    }
}

fn opt_str(value: &Value, name: &str) -> Result<Option<String>, DecodeError> {
    match value.get(name) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(v) => Err(DecodeError::invalid(format!(
            "field `{name}` is not a string: {v}"
        ))),
    }
}

fn parse_field<T: FromStr<Err = String>>(value: &Value, name: &str) -> Result<T, DecodeError> {
    require_str(value, name)?
        .parse()
        .map_err(DecodeError::Invalid)
}
