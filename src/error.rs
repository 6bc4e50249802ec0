use std::fmt;

use thiserror::Error;

use crate::transport::TransportError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything a [`Client`](crate::Client) call can fail with.
#[derive(Debug, Error)]
pub enum Error {
    /// The server could not be reached after every retry.
    #[error("failed to establish connection with {host}:{port}")]
    ConnectionFailed {
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    /// A connection existed but the request/response cycle never completed.
    #[error("locomatix {operation} could not be completed on {host}:{port}")]
    RequestFailed {
        operation: &'static str,
        host: String,
        port: u16,
        #[source]
        source: TransportError,
    },

    /// The server answered with a non-`Success` status.
    #[error("{0}")]
    Server(ServerErrorKind),

    /// The server answered with a status this client does not know.
    #[error("unrecognized status `{0}` returned by server")]
    UnknownStatus(String),

    /// The body was not a Locomatix envelope and the HTTP status was not 2xx.
    #[error("HTTP {status} {reason}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("failed to decode {operation} response")]
    Decode {
        operation: &'static str,
        #[source]
        source: DecodeError,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// The server-side error kind, if this is an application error.
    pub fn server_kind(&self) -> Option<ServerErrorKind> {
        match self {
            Error::Server(kind) => Some(*kind),
            _ => None,
        }
    }

    /// True for failures that happened below the HTTP layer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::ConnectionFailed { .. } | Error::RequestFailed { .. }
        )
    }
}

/// A payload that was valid JSON but not in the shape the endpoint returns.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid JSON")]
    Json(#[from] serde_json::Error),

    #[error("response has no Result payload")]
    MissingResult,

    #[error("{0}")]
    Invalid(String),
}

impl DecodeError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        DecodeError::Invalid(msg.into())
    }
}

/// Application errors reported by the Locomatix server in the `Status` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerErrorKind {
    BadRequest,
    InvalidRequest,
    UnknownRequest,
    TooBigRequest,
    UnauthorizedRequest,
    AuthenticationFailed,

    MissingVersion,
    MissingObjectId,
    MissingFeed,
    MissingZoneId,
    MissingFenceId,
    MissingCallbackType,
    MissingCallbackUrl,
    MissingLongitude,
    MissingLatitude,
    MissingTime,
    MissingStartTime,
    MissingEndTime,
    MissingRegion,
    MissingRadius,
    MissingQuery,
    MissingFetchParams,
    MissingNameValuePairs,
    MissingCustomerId,
    MissingCustomerKey,
    MissingSecretKey,
    MissingTrigger,

    InvalidVersion,
    InvalidTime,
    InvalidLongitude,
    InvalidLatitude,
    InvalidTtl,
    ParameterValueExceeded,
    InvalidParameterValue,
    InvalidObjectId,
    InvalidFeed,
    InvalidZoneId,
    InvalidFenceId,
    TooBigRegion,
    InvalidRegion,
    InvalidRadius,
    InvalidPolygon,
    InvalidCallbackType,
    InvalidCallbackUrl,
    InvalidQuery,
    InvalidTrigger,
    TooBigFetch,
    InvalidMimeType,
    InvalidStartKey,

    ObjectAlreadyExists,
    ObjectDoesNotExist,
    ZoneAlreadyExists,
    ZoneDoesNotExist,
    FenceAlreadyExists,
    FenceDoesNotExist,
    ObjectDoesNotHaveLocation,
    FenceAlreadyInactive,
    FenceAlreadyActive,
    ZoneAlreadyInactive,
    ZoneAlreadyActive,

    FeedAlreadyExists,
    FeedDoesNotExist,
    FeedNotEmpty,
    InvalidGridBoundingBox,

    InternalSystemError,
}

impl ServerErrorKind {
    /// Maps a `Status` string to its error kind.
    ///
    /// Returns `None` for strings outside the server's documented table;
    /// callers must treat that as a hard failure rather than a success.
    pub fn from_status(status: &str) -> Option<Self> {
        use ServerErrorKind::*;

        let kind = match status {
            "BadRequest" => BadRequest,
            "InvalidRequest" => InvalidRequest,
            "UnknownRequest" => UnknownRequest,
            "TooBigRequest" => TooBigRequest,
            "UnAuthorizedRequest" => UnauthorizedRequest,
            "AuthenticationFailed" => AuthenticationFailed,

            "MissingVersion" => MissingVersion,
            "MissingObjectID" => MissingObjectId,
            "MissingFeed" => MissingFeed,
            "MissingZoneID" => MissingZoneId,
            "MissingFenceID" => MissingFenceId,
            "MissingCallbackType" => MissingCallbackType,
            "MissingCallbackURL" => MissingCallbackUrl,
            "MissingLongitude" => MissingLongitude,
            "MissingLatitude" => MissingLatitude,
            "MissingTime" => MissingTime,
            "MissingStartTime" => MissingStartTime,
            "MissingEndTime" => MissingEndTime,
            "MissingRegion" => MissingRegion,
            "MissingRadius" => MissingRadius,
            "MissingPredicate" => MissingQuery,
            "MissingBatchFetchParams" => MissingFetchParams,
            "MissingNameValuePairs" => MissingNameValuePairs,
            "MissingCustomerID" => MissingCustomerId,
            "MissingCustomerKey" => MissingCustomerKey,
            "MissingSecretKey" => MissingSecretKey,
            "MissingTrigger" => MissingTrigger,

            "InvalidVersion" => InvalidVersion,
            "InvalidTime" => InvalidTime,
            "InvalidLongitude" => InvalidLongitude,
            "InvalidLatitude" => InvalidLatitude,
            "InvalidTTL" => InvalidTtl,
            "ParameterValueExceeded" => ParameterValueExceeded,
            "InvalidParameterValue" => InvalidParameterValue,
            "InvalidObjectID" => InvalidObjectId,
            "InvalidFeed" => InvalidFeed,
            "InvalidZoneID" => InvalidZoneId,
            "InvalidFenceID" => InvalidFenceId,
            "TooBigRegion" => TooBigRegion,
            "InvalidRegion" => InvalidRegion,
            "InvalidRadius" => InvalidRadius,
            "InvalidPolygon" => InvalidPolygon,
            "InvalidCallbackType" => InvalidCallbackType,
            "InvalidCallbackURL" => InvalidCallbackUrl,
            "InvalidPredicate" | "InvalidQuery" => InvalidQuery,
            "InvalidTrigger" => InvalidTrigger,
            "TooBigFetch" => TooBigFetch,
            "InvalidMimeType" => InvalidMimeType,
            "InvalidStartKey" => InvalidStartKey,

            "ObjectAlreadyExists" => ObjectAlreadyExists,
            "ObjectDoesNotExist" => ObjectDoesNotExist,
            "ZoneAlreadyExists" => ZoneAlreadyExists,
            "ZoneDoesNotExist" => ZoneDoesNotExist,
            "FenceAlreadyExists" => FenceAlreadyExists,
            "FenceDoesNotExist" => FenceDoesNotExist,
            "ObjectDoesNotHaveLocation" => ObjectDoesNotHaveLocation,
            "FenceAlreadyInActive" => FenceAlreadyInactive,
            "FenceAlreadyActive" => FenceAlreadyActive,
            "ZoneAlreadyInActive" => ZoneAlreadyInactive,
            "ZoneAlreadyActive" => ZoneAlreadyActive,

            "FeedAlreadyExists" => FeedAlreadyExists,
            "FeedDoesNotExist" => FeedDoesNotExist,
            "FeedNotEmpty" => FeedNotEmpty,
            "InvalidGridBoundingBox" => InvalidGridBoundingBox,

            "InternalSystemError" => InternalSystemError,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical name of the error kind.
    pub fn as_str(&self) -> &'static str {
        use ServerErrorKind::*;

        match self {
            BadRequest => "BadRequest",
            InvalidRequest => "InvalidRequest",
            UnknownRequest => "UnknownRequest",
            TooBigRequest => "TooBigRequest",
            UnauthorizedRequest => "UnauthorizedRequest",
            AuthenticationFailed => "AuthenticationFailed",

            MissingVersion => "MissingVersion",
            MissingObjectId => "MissingObjectID",
            MissingFeed => "MissingFeed",
            MissingZoneId => "MissingZoneID",
            MissingFenceId => "MissingFenceID",
            MissingCallbackType => "MissingCallbackType",
            MissingCallbackUrl => "MissingCallbackURL",
            MissingLongitude => "MissingLongitude",
            MissingLatitude => "MissingLatitude",
            MissingTime => "MissingTime",
            MissingStartTime => "MissingStartTime",
            MissingEndTime => "MissingEndTime",
            MissingRegion => "MissingRegion",
            MissingRadius => "MissingRadius",
            MissingQuery => "MissingQuery",
            MissingFetchParams => "MissingFetchParams",
            MissingNameValuePairs => "MissingNameValuePairs",
            MissingCustomerId => "MissingCustomerID",
            MissingCustomerKey => "MissingCustomerKey",
            MissingSecretKey => "MissingSecretKey",
            MissingTrigger => "MissingTrigger",

            InvalidVersion => "InvalidVersion",
            InvalidTime => "InvalidTime",
            InvalidLongitude => "InvalidLongitude",
            InvalidLatitude => "InvalidLatitude",
            InvalidTtl => "InvalidTTL",
            ParameterValueExceeded => "ParameterValueExceeded",
            InvalidParameterValue => "InvalidParameterValue",
            InvalidObjectId => "InvalidObjectID",
            InvalidFeed => "InvalidFeed",
            InvalidZoneId => "InvalidZoneID",
            InvalidFenceId => "InvalidFenceID",
            TooBigRegion => "TooBigRegion",
            InvalidRegion => "InvalidRegion",
            InvalidRadius => "InvalidRadius",
            InvalidPolygon => "InvalidPolygon",
            InvalidCallbackType => "InvalidCallbackType",
            InvalidCallbackUrl => "InvalidCallbackURL",
            InvalidQuery => "InvalidQuery",
            InvalidTrigger => "InvalidTrigger",
            TooBigFetch => "TooBigFetch",
            InvalidMimeType => "InvalidMimeType",
            InvalidStartKey => "InvalidStartKey",

            ObjectAlreadyExists => "ObjectAlreadyExists",
            ObjectDoesNotExist => "ObjectDoesNotExist",
            ZoneAlreadyExists => "ZoneAlreadyExists",
            ZoneDoesNotExist => "ZoneDoesNotExist",
            FenceAlreadyExists => "FenceAlreadyExists",
            FenceDoesNotExist => "FenceDoesNotExist",
            ObjectDoesNotHaveLocation => "ObjectDoesNotHaveLocation",
            FenceAlreadyInactive => "FenceAlreadyInactive",
            FenceAlreadyActive => "FenceAlreadyActive",
            ZoneAlreadyInactive => "ZoneAlreadyInactive",
            ZoneAlreadyActive => "ZoneAlreadyActive",

            FeedAlreadyExists => "FeedAlreadyExists",
            FeedDoesNotExist => "FeedDoesNotExist",
            FeedNotEmpty => "FeedNotEmpty",
            InvalidGridBoundingBox => "InvalidGridBoundingBox",

            InternalSystemError => "InternalSystemError",
        }
    }
}

impl fmt::Display for ServerErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_collapse_onto_one_kind() {
        assert_eq!(
            ServerErrorKind::from_status("InvalidPredicate"),
            Some(ServerErrorKind::InvalidQuery)
        );
        assert_eq!(
            ServerErrorKind::from_status("InvalidQuery"),
            Some(ServerErrorKind::InvalidQuery)
        );
        assert_eq!(
            ServerErrorKind::from_status("UnAuthorizedRequest"),
            Some(ServerErrorKind::UnauthorizedRequest)
        );
    }

    #[test]
    fn unknown_status_is_not_mapped() {
        assert_eq!(ServerErrorKind::from_status("Success"), None);
        assert_eq!(ServerErrorKind::from_status("objectalreadyexists"), None);
        assert_eq!(ServerErrorKind::from_status(""), None);
    }

    #[test]
    fn server_error_displays_kind_name_only() {
        let err = Error::Server(ServerErrorKind::FeedDoesNotExist);
        assert_eq!(err.to_string(), "FeedDoesNotExist");
        assert_eq!(err.server_kind(), Some(ServerErrorKind::FeedDoesNotExist));
        assert!(!err.is_transport());
    }

    #[test]
    fn chained_display_names_each_cause_once() {
        let cause: crate::transport::BoxError = "connection refused".into();
        let err = Error::ConnectionFailed {
            host: "lx.test".into(),
            port: 443,
            source: TransportError::Connect(cause),
        };
        assert_eq!(err.to_string(), "failed to establish connection with lx.test:443");
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "failed to establish connection with lx.test:443: could not connect: connection refused"
        );

        let err = Error::Decode {
            operation: "list_feeds",
            source: DecodeError::MissingResult,
        };
        assert_eq!(
            format!("{:#}", anyhow::Error::from(err)),
            "failed to decode list_feeds response: response has no Result payload"
        );
    }
}
