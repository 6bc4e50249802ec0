//! How the service notifies you when a zone or fence fires.

use serde::Serialize;
use serde_json::Value;

use crate::error::DecodeError;
use crate::params::{Params, ToParams};
use crate::util::{require, require_str};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Callback {
    /// POST the alert to a URL.
    Url { url: String },
    /// Deliver the alert as an Apple push notification.
    #[serde(rename = "applepushnotification")]
    ApplePush {
        message: String,
        sound: String,
        token: String,
    },
}

impl Callback {
    pub fn url(url: impl Into<String>) -> Self {
        Callback::Url { url: url.into() }
    }

    pub fn apple_push(
        message: impl Into<String>,
        sound: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Callback::ApplePush {
            message: message.into(),
            sound: sound.into(),
            token: token.into(),
        }
    }

    pub(crate) fn decode(value: &Value) -> Result<Self, DecodeError> {
        let kind = require_str(value, "CallbackType")?;
        if kind.eq_ignore_ascii_case("url") {
            return Ok(Callback::url(require_str(value, "CallbackURL")?));
        }
        if kind.eq_ignore_ascii_case("applepushnotification") {
            let info = require(value, "ApplePushNotificationInfo")?;
            return Ok(Callback::apple_push(
                require_str(info, "Message")?,
                require_str(info, "Sound")?,
                require_str(info, "Token")?,
            ));
        }
        Err(DecodeError::invalid(format!("unknown callback type `{kind}`")))
    }
}

impl ToParams for Callback {
    fn write_params(&self, params: &mut Params) {
        match self {
            Callback::Url { url } => {
                params.set("callbacktype", "url").set("callbackurl", url);
            }
            Callback::ApplePush {
                message,
                sound,
                token,
            } => {
                params
                    .set("callbacktype", "applepushnotification")
                    .set("applepushmessage", message)
                    .set("applepushsound", sound)
                    .set("applepushtoken", token);
            }
        }
    }
}
