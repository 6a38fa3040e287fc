//! Request/response payloads. All fields are camelCase on the wire.

use serde::{Deserialize, Serialize};

use crate::room::service::{ActionKind, DrawRequest};
use crate::room::RoomOptions;

use super::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub name: Option<String>,
    pub pid: Option<String>,
    #[serde(default)]
    pub ai_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateResponse {
    pub code: String,
    pub pid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRequest {
    pub code: String,
    pub pid: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveRequest {
    pub code: String,
    pub pid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsRequest {
    pub code: String,
    pub pid: String,
    pub slamdowns_allowed: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsResponse {
    pub ok: bool,
    pub options: RoomOptions,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartRequest {
    pub code: String,
    pub pid: String,
    pub slamdowns_allowed: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn new() -> Self {
        OkResponse { ok: true }
    }
}

impl Default for OkResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// The draw field is either the string `"deck"` or a pile option index.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum DrawParam {
    Index(i64),
    Named(String),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRequest {
    pub code: String,
    pub pid: String,
    #[serde(default)]
    pub discard: Option<Vec<i64>>,
    #[serde(default)]
    pub draw: Option<DrawParam>,
    #[serde(default)]
    pub declare_yaniv: bool,
    #[serde(default)]
    pub declare_slamdown: bool,
}

impl ActionRequest {
    /// Split the loosely-typed wire shape into one concrete action.
    pub fn into_kind(self) -> Result<ActionKind, ApiError> {
        if self.declare_slamdown {
            return Ok(ActionKind::DeclareSlamdown);
        }
        if self.declare_yaniv {
            return Ok(ActionKind::DeclareYaniv);
        }

        let discard = self
            .discard
            .ok_or_else(|| ApiError::bad_request("Must discard at least one card"))?;
        let draw = match self.draw {
            Some(DrawParam::Index(i)) if i >= 0 => DrawRequest::Pile(i as usize),
            Some(DrawParam::Named(ref s)) if s == "deck" => DrawRequest::Deck,
            _ => {
                return Err(ApiError::bad_request(
                    "Invalid 'draw' action. Must be 'deck' or a valid index of a card in discard pile.",
                ))
            }
        };
        Ok(ActionKind::Play { discard, draw })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayAgainRequest {
    pub code: String,
    pub pid: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayAgainResponse {
    pub next_room: String,
}

#[derive(Debug, Deserialize)]
pub struct RoomQuery {
    #[serde(default)]
    pub pid: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(body: &str) -> ActionRequest {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn draw_accepts_deck_and_indexes() {
        let kind = action(r#"{"code":"abcde","pid":"p","discard":[5],"draw":"deck"}"#)
            .into_kind()
            .unwrap();
        assert!(matches!(
            kind,
            ActionKind::Play { draw: DrawRequest::Deck, .. }
        ));

        let kind = action(r#"{"code":"abcde","pid":"p","discard":[5],"draw":1}"#)
            .into_kind()
            .unwrap();
        assert!(matches!(
            kind,
            ActionKind::Play { draw: DrawRequest::Pile(1), .. }
        ));
    }

    #[test]
    fn draw_rejects_garbage() {
        let err = action(r#"{"code":"abcde","pid":"p","discard":[5],"draw":"not-a-number"}"#)
            .into_kind()
            .unwrap_err();
        assert!(matches!(err, crate::server::ApiError::BadRequest(_)));

        let err = action(r#"{"code":"abcde","pid":"p","discard":[5],"draw":-2}"#)
            .into_kind()
            .unwrap_err();
        assert!(matches!(err, crate::server::ApiError::BadRequest(_)));
    }

    #[test]
    fn flags_take_priority_over_play_fields() {
        let kind = action(r#"{"code":"abcde","pid":"p","declareYaniv":true}"#)
            .into_kind()
            .unwrap();
        assert!(matches!(kind, ActionKind::DeclareYaniv));

        let kind = action(r#"{"code":"abcde","pid":"p","declareSlamdown":true}"#)
            .into_kind()
            .unwrap();
        assert!(matches!(kind, ActionKind::DeclareSlamdown));
    }

    #[test]
    fn play_requires_a_discard_list() {
        let err = action(r#"{"code":"abcde","pid":"p","draw":"deck"}"#)
            .into_kind()
            .unwrap_err();
        assert!(matches!(err, crate::server::ApiError::BadRequest(_)));
    }
}
