//! Geographic regions used by searches, fences, zones and analytics.

use serde::Serialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::params::{Params, ToParams};
use crate::util::{require, require_f64, require_str};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        Ok(Self {
            latitude: require_f64(value, "Latitude")?,
            longitude: require_f64(value, "Longitude")?,
        })
    }
}

/// A latitude/longitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rectangle {
    pub min_latitude: f64,
    pub min_longitude: f64,
    pub max_latitude: f64,
    pub max_longitude: f64,
}

impl Rectangle {
    pub fn new(
        min_latitude: f64,
        min_longitude: f64,
        max_latitude: f64,
        max_longitude: f64,
    ) -> Self {
        Self {
            min_latitude,
            min_longitude,
            max_latitude,
            max_longitude,
        }
    }

    fn decode(value: &Value) -> Result<Self, DecodeError> {
        Ok(Self {
            min_latitude: require_f64(value, "MinLatitude")?,
            min_longitude: require_f64(value, "MinLongitude")?,
            max_latitude: require_f64(value, "MaxLatitude")?,
            max_longitude: require_f64(value, "MaxLongitude")?,
        })
    }
}

impl ToParams for Rectangle {
    fn write_params(&self, params: &mut Params) {
        params
            .set("region", "Rectangle")
            .set("minlatitude", self.min_latitude)
            .set("minlongitude", self.min_longitude)
            .set("maxlatitude", self.max_latitude)
            .set("maxlongitude", self.max_longitude);
    }
}

/// A region fixed on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Region {
    Point(Point),
    Circle { center: Point, radius: f64 },
    Polygon { points: Vec<Point> },
    Rectangle(Rectangle),
}

impl Region {
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Region::Point(Point::new(latitude, longitude))
    }

    pub fn circle(latitude: f64, longitude: f64, radius: f64) -> Self {
        Region::Circle {
            center: Point::new(latitude, longitude),
            radius,
        }
    }

    pub fn polygon(points: impl IntoIterator<Item = Point>) -> Self {
        Region::Polygon {
            points: points.into_iter().collect(),
        }
    }

    pub fn rectangle(rect: Rectangle) -> Self {
        Region::Rectangle(rect)
    }

    /// Decodes the `{RegionType, RegionParams}` shape of fence responses.
    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        let kind = require_str(value, "RegionType")?;
        let params = require(value, "RegionParams")?;
        match kind {
            "Point" => Ok(Region::Point(Point::decode(params)?)),
            "Circle" => Ok(Region::Circle {
                center: Point::decode(params)?,
                radius: require_f64(params, "Radius")?,
            }),
            "Polygon" => {
                let points = require(params, "Points")?
                    .as_array()
                    .ok_or_else(|| DecodeError::invalid("polygon `Points` is not an array"))?
                    .iter()
                    .map(Point::decode)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Region::Polygon { points })
            }
            "Rectangle" => Ok(Region::Rectangle(Rectangle::decode(params)?)),
            other => Err(DecodeError::invalid(format!(
                "unknown region type `{other}`"
            ))),
        }
    }
}

impl ToParams for Region {
    fn write_params(&self, params: &mut Params) {
        match self {
            Region::Point(p) => {
                params
                    .set("region", "Point")
                    .set("latitude", p.latitude)
                    .set("longitude", p.longitude);
            }
            Region::Circle { center, radius } => {
                params
                    .set("region", "Circle")
                    .set("latitude", center.latitude)
                    .set("longitude", center.longitude)
                    .set("radius", radius);
            }
            Region::Polygon { points } => {
                params.set("region", "Polygon");
                for p in points {
                    params
                        .append("latitude", p.latitude)
                        .append("longitude", p.longitude);
                }
            }
            Region::Rectangle(rect) => rect.write_params(params),
        }
    }
}

/// A region that moves with the object a zone is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectRegion {
    Circle { radius: f64 },
}

impl ObjectRegion {
    pub fn circle(radius: f64) -> Self {
        ObjectRegion::Circle { radius }
    }

    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        let kind = require_str(value, "RegionType")?;
        let params = require(value, "RegionParams")?;
        match kind {
            "Circle" => Ok(ObjectRegion::Circle {
                radius: require_f64(params, "Radius")?,
            }),
            other => Err(DecodeError::invalid(format!(
                "unknown object region type `{other}`"
            ))),
        }
    }
}

impl ToParams for ObjectRegion {
    fn write_params(&self, params: &mut Params) {
        match self {
            ObjectRegion::Circle { radius } => {
                params.set("region", "Circle").set("radius", radius);
            }
        }
    }
}
