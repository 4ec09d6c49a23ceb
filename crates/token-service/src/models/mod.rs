//! Request and response models for the token endpoints.
//!
//! Request bodies are decoded by hand from a JSON object so that a type
//! mismatch can be reported with the offending field, the kind of value that
//! was supplied, and the type that was expected. Decoding follows the rules
//! existing clients rely on:
//!
//! - Missing fields and explicit `null` take the zero value.
//! - Unknown fields are ignored.
//! - Only the first JSON value is read; trailing data is ignored.
//! - Field names match exactly first, then case-insensitively.

use crate::errors::TokenServiceError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Body of `POST /fetch_rtc_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtcTokenRequest {
    /// Numeric user id (`uid`). Zero means "any user".
    pub uid: u32,

    /// Channel to join (`ChannelName`).
    pub channel_name: String,

    /// Raw role code (`role`), mapped through [`RtcRole::try_from`].
    pub role: u32,
}

impl RtcTokenRequest {
    pub fn from_json(body: &[u8]) -> Result<Self, TokenServiceError> {
        let fields = JsonFields::parse(body, "RtcTokenRequest")?;

        Ok(Self {
            uid: fields.get("uid", "u32")?.unwrap_or_default(),
            channel_name: fields.get("ChannelName", "string")?.unwrap_or_default(),
            role: fields.get("role", "u32")?.unwrap_or_default(),
        })
    }
}

/// Body of `POST /fetch_rtm_token`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RtmTokenRequest {
    /// String user account (`uid`).
    pub user_id: String,
}

impl RtmTokenRequest {
    pub fn from_json(body: &[u8]) -> Result<Self, TokenServiceError> {
        let fields = JsonFields::parse(body, "RtmTokenRequest")?;

        Ok(Self {
            user_id: fields.get("uid", "string")?.unwrap_or_default(),
        })
    }
}

/// Permission level granted by an RTC token.
///
/// `Attendee` and `Admin` are deprecated codes that carry the same
/// privileges as `Publisher`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RtcRole {
    Attendee,
    Publisher,
    Subscriber,
    Admin,
}

impl RtcRole {
    /// Wire code of the role.
    pub fn code(self) -> u32 {
        match self {
            RtcRole::Attendee => 0,
            RtcRole::Publisher => 1,
            RtcRole::Subscriber => 2,
            RtcRole::Admin => 101,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RtcRole::Attendee => "attendee",
            RtcRole::Publisher => "publisher",
            RtcRole::Subscriber => "subscriber",
            RtcRole::Admin => "admin",
        }
    }

    /// Whether the role may publish audio, video and data streams.
    pub fn can_publish(self) -> bool {
        !matches!(self, RtcRole::Subscriber)
    }
}

impl TryFrom<u32> for RtcRole {
    type Error = TokenServiceError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(RtcRole::Attendee),
            1 => Ok(RtcRole::Publisher),
            2 => Ok(RtcRole::Subscriber),
            101 => Ok(RtcRole::Admin),
            other => Err(TokenServiceError::UnknownRole(other)),
        }
    }
}

/// Permission level granted by an RTM token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RtmRole {
    RtmUser,
}

impl RtmRole {
    pub fn code(self) -> u32 {
        match self {
            RtmRole::RtmUser => 1,
        }
    }
}

/// JSON envelope returned by both endpoints, on success and on error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed token on success, error message otherwise.
    pub token: String,

    /// HTTP status code as a string.
    pub code: String,
}

/// Top-level JSON object of a request body, tagged with the request type it
/// is decoded into.
struct JsonFields {
    container: &'static str,
    map: Map<String, Value>,
}

impl JsonFields {
    /// Decode the first JSON value in `body`. Anything after it is ignored.
    fn parse(body: &[u8], container: &'static str) -> Result<Self, TokenServiceError> {
        let first = serde_json::Deserializer::from_slice(body)
            .into_iter::<Value>()
            .next();

        match first {
            Some(Ok(Value::Object(map))) => Ok(Self { container, map }),
            Some(Ok(other)) => Err(TokenServiceError::WrongFieldType {
                value: describe(&other),
                field: "body",
                container,
                expected: "object",
            }),
            Some(Err(_)) | None => Err(TokenServiceError::MalformedBody),
        }
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.map.get(name).or_else(|| {
            self.map
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
    }

    fn get<T: DeserializeOwned>(
        &self,
        name: &'static str,
        expected: &'static str,
    ) -> Result<Option<T>, TokenServiceError> {
        match self.lookup(name) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value).map(Some).map_err(|_| {
                TokenServiceError::WrongFieldType {
                    value: describe(value),
                    field: name,
                    container: self.container,
                    expected,
                }
            }),
        }
    }
}

/// Short description of a JSON value for error messages.
///
/// Strings are never echoed back, only their kind.
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "bool".to_string(),
        Value::Number(n) => format!("number {}", n),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_rtc_request_decodes_all_fields() {
        let request =
            RtcTokenRequest::from_json(br#"{"uid":1234,"ChannelName":"test-channel","role":1}"#)
                .unwrap();

        assert_eq!(
            request,
            RtcTokenRequest {
                uid: 1234,
                channel_name: "test-channel".to_string(),
                role: 1,
            }
        );
    }

    #[test]
    fn test_rtc_request_missing_fields_take_zero_values() {
        let request = RtcTokenRequest::from_json(br#"{"ChannelName":"lobby"}"#).unwrap();
        assert_eq!(request.uid, 0);
        assert_eq!(request.role, 0);

        let request = RtcTokenRequest::from_json(br#"{"uid":null,"ChannelName":"lobby"}"#).unwrap();
        assert_eq!(request.uid, 0);
    }

    #[test]
    fn test_rtc_request_case_insensitive_field_names() {
        let request =
            RtcTokenRequest::from_json(br#"{"UID":7,"channelname":"lobby","Role":2}"#).unwrap();
        assert_eq!(request.uid, 7);
        assert_eq!(request.channel_name, "lobby");
        assert_eq!(request.role, 2);
    }

    #[test]
    fn test_rtc_request_ignores_unknown_fields() {
        let request =
            RtcTokenRequest::from_json(br#"{"uid":1,"ChannelName":"c","role":1,"extra":[1,2]}"#)
                .unwrap();
        assert_eq!(request.uid, 1);
    }

    #[test]
    fn test_rtc_request_string_uid_names_field() {
        let err = RtcTokenRequest::from_json(br#"{"uid":"not-a-number","ChannelName":"c","role":1}"#)
            .unwrap_err();

        match err {
            TokenServiceError::WrongFieldType {
                value,
                field,
                container,
                expected,
            } => {
                assert_eq!(value, "string");
                assert_eq!(field, "uid");
                assert_eq!(container, "RtcTokenRequest");
                assert_eq!(expected, "u32");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_rtc_request_out_of_range_uid() {
        for body in [
            br#"{"uid":-1,"ChannelName":"c"}"#.as_slice(),
            br#"{"uid":4294967296,"ChannelName":"c"}"#.as_slice(),
            br#"{"uid":1.5,"ChannelName":"c"}"#.as_slice(),
        ] {
            let err = RtcTokenRequest::from_json(body).unwrap_err();
            assert!(
                matches!(err, TokenServiceError::WrongFieldType { field: "uid", ref value, .. } if value.starts_with("number")),
                "unexpected error for {}: {err:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_rtc_request_numeric_channel_name() {
        let err = RtcTokenRequest::from_json(br#"{"uid":1,"ChannelName":42}"#).unwrap_err();
        assert!(matches!(
            err,
            TokenServiceError::WrongFieldType {
                field: "ChannelName",
                expected: "string",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_json_is_malformed() {
        for body in [b"".as_slice(), b"{".as_slice(), b"uid=1".as_slice()] {
            assert!(matches!(
                RtcTokenRequest::from_json(body),
                Err(TokenServiceError::MalformedBody)
            ));
            assert!(matches!(
                RtmTokenRequest::from_json(body),
                Err(TokenServiceError::MalformedBody)
            ));
        }
    }

    #[test]
    fn test_non_object_body_is_type_error() {
        let err = RtmTokenRequest::from_json(b"[\"user42\"]").unwrap_err();
        assert!(matches!(
            err,
            TokenServiceError::WrongFieldType {
                field: "body",
                expected: "object",
                ..
            }
        ));
    }

    #[test]
    fn test_trailing_data_after_first_value_is_ignored() {
        let request =
            RtmTokenRequest::from_json(br#"{"uid":"user42"} {"uid":"someone-else"}"#).unwrap();
        assert_eq!(request.user_id, "user42");

        let request =
            RtcTokenRequest::from_json(b"{\"uid\":7,\"ChannelName\":\"lobby\",\"role\":2}\ngarbage")
                .unwrap();
        assert_eq!(request.uid, 7);
        assert_eq!(request.role, 2);
    }

    #[test]
    fn test_rtm_request_decodes_uid() {
        let request = RtmTokenRequest::from_json(br#"{"uid":"user42"}"#).unwrap();
        assert_eq!(request.user_id, "user42");
    }

    #[test]
    fn test_rtm_request_numeric_uid_names_field() {
        let err = RtmTokenRequest::from_json(br#"{"uid":42}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Bad request. Wrong type provided for field uid of RtmTokenRequest: got number 42, expected string"
        );
    }

    #[test]
    fn test_role_mapping() {
        assert_eq!(RtcRole::try_from(0).unwrap(), RtcRole::Attendee);
        assert_eq!(RtcRole::try_from(1).unwrap(), RtcRole::Publisher);
        assert_eq!(RtcRole::try_from(2).unwrap(), RtcRole::Subscriber);
        assert_eq!(RtcRole::try_from(101).unwrap(), RtcRole::Admin);

        for code in [3, 100, 102, u32::MAX] {
            assert!(matches!(
                RtcRole::try_from(code),
                Err(TokenServiceError::UnknownRole(c)) if c == code
            ));
        }
    }

    #[test]
    fn test_role_codes_round_trip() {
        for role in [
            RtcRole::Attendee,
            RtcRole::Publisher,
            RtcRole::Subscriber,
            RtcRole::Admin,
        ] {
            assert_eq!(RtcRole::try_from(role.code()).unwrap(), role);
        }
    }

    #[test]
    fn test_deprecated_roles_publish_like_publisher() {
        assert!(RtcRole::Attendee.can_publish());
        assert!(RtcRole::Publisher.can_publish());
        assert!(RtcRole::Admin.can_publish());
        assert!(!RtcRole::Subscriber.can_publish());
    }
}
