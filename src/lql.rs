//! Builders for the LQL predicates sent with queries, zones and fences.
//!
//! ```
//! use locomatix::lql::{self, Select, Source};
//!
//! let q = lql::select(Select::ObjectLocations, &Source::object("cars", "car-a"));
//! assert_eq!(q, r#"SELECT *, LOCATION.* FROM cars WITH oid "car-a""#);
//! assert_eq!(lql::from_feeds_of(&q), ["cars"]);
//!
//! let q = lql::select(Select::Objects, &Source::feeds(["cars", "trucks"]));
//! assert_eq!(q, "SELECT * FROM cars, trucks");
//! ```

use std::fmt;

/// The `FROM` clause: whole feeds, one object, or a set of objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Feed(String),
    Feeds(Vec<String>),
    Object { feed: String, object_id: String },
    Objects { feed: String, object_ids: Vec<String> },
}

impl Source {
    pub fn feed(feed: impl Into<String>) -> Self {
        Source::Feed(feed.into())
    }

    /// Several feeds at once; a single feed collapses to [`Source::Feed`].
    pub fn feeds<I, S>(feeds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut feeds: Vec<String> = feeds.into_iter().map(Into::into).collect();
        if feeds.len() == 1 {
            return Source::Feed(feeds.remove(0));
        }
        Source::Feeds(feeds)
    }

    pub fn object(feed: impl Into<String>, object_id: impl Into<String>) -> Self {
        Source::Object {
            feed: feed.into(),
            object_id: object_id.into(),
        }
    }

    pub fn objects<I, S>(feed: impl Into<String>, object_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Source::Objects {
            feed: feed.into(),
            object_ids: object_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Feed(feed) => write!(f, "FROM {feed}"),
            Source::Feeds(feeds) => write!(f, "FROM {}", feeds.join(", ")),
            Source::Object { feed, object_id } => write!(f, "FROM {feed} WITH oid \"{object_id}\""),
            Source::Objects { feed, object_ids } => match object_ids.as_slice() {
                [] => write!(f, "FROM {feed}"),
                [one] => write!(f, "FROM {feed} WITH oid \"{one}\""),
                many => write!(f, "FROM {feed} WITH oid IN (\"{}\")", many.join("\",\"")),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Select {
    /// `SELECT *`
    Objects,
    /// `SELECT LOCATION.*`
    Locations,
    /// `SELECT COUNT(LOCATION.*)`
    LocationCount,
    /// `SELECT *, LOCATION.*`
    ObjectLocations,
}

impl Select {
    fn projection(self) -> &'static str {
        match self {
            Select::Objects => "*",
            Select::Locations => "LOCATION.*",
            Select::LocationCount => "COUNT(LOCATION.*)",
            Select::ObjectLocations => "*, LOCATION.*",
        }
    }
}

pub fn select(what: Select, from: &Source) -> String {
    format!("SELECT {} {}", what.projection(), from)
}

/// The feeds a predicate reads from: the comma separated list after `FROM`.
pub fn from_feeds_of(predicate: &str) -> Vec<&str> {
    let mut tokens = predicate.split_whitespace();
    if tokens.find(|t| t.eq_ignore_ascii_case("FROM")).is_none() {
        return Vec::new();
    }
    let mut feeds = Vec::new();
    let mut continued = true;
    for token in tokens {
        if !continued && !token.starts_with(',') {
            break;
        }
        continued = token.ends_with(',');
        feeds.extend(token.split(',').filter(|feed| !feed.is_empty()));
    }
    feeds
}
