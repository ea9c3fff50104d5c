use crate::error::{Error, SkillResult};
use serde::Deserialize;
use std::collections::HashMap;

/// Request envelope as posted by the voice platform
#[derive(Debug, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub version: Option<String>,
    pub session: Option<Session>,
    #[serde(default)]
    pub context: Option<RequestContext>,
    pub request: RawRequest,
}

/// Device and application state, sent with every request including session-less ones
#[derive(Debug, Deserialize)]
pub struct RequestContext {
    #[serde(rename = "System")]
    pub system: Option<SystemContext>,
}

#[derive(Debug, Deserialize)]
pub struct SystemContext {
    pub application: Option<Application>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default)]
    pub new: bool,
    pub session_id: Option<String>,
    pub application: Option<Application>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub request_id: Option<String>,
    pub locale: Option<String>,
    pub intent: Option<RawIntent>,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawIntent {
    pub name: String,
    #[serde(default)]
    pub slots: HashMap<String, RawSlot>,
}

#[derive(Debug, Deserialize)]
pub struct RawSlot {
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Slot values of an intent, slots without a value are left out
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slots(HashMap<String, String>);

impl Slots {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Value of a slot the handler cannot do without
    pub fn require(&self, name: &str) -> SkillResult<&str> {
        self.get(name)
            .ok_or_else(|| Error::MissingSlot(name.to_string()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Slots {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Slots(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Intent {
    pub name: String,
    pub slots: Slots,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    Launch,
    Intent(Intent),
    SessionEnded { reason: Option<String> },
    /// Any request type no handler knows
    Unsupported(String),
}

/// One parsed request, immutable while it is handled
#[derive(Debug, Clone, PartialEq)]
pub struct SkillRequest {
    pub request_id: Option<String>,
    pub kind: RequestKind,
    pub session_active: bool,
    pub application_id: Option<String>,
}

impl SkillRequest {
    pub fn new(kind: RequestKind) -> Self {
        Self {
            request_id: None,
            kind,
            session_active: true,
            application_id: None,
        }
    }

    pub fn launch() -> Self {
        Self::new(RequestKind::Launch)
    }

    pub fn intent(name: &str, slots: &[(&str, &str)]) -> Self {
        Self::new(RequestKind::Intent(Intent {
            name: name.to_string(),
            slots: slots.iter().copied().collect(),
        }))
    }

    pub fn session_ended() -> Self {
        Self {
            session_active: false,
            ..Self::new(RequestKind::SessionEnded { reason: None })
        }
    }
}

impl TryFrom<RequestEnvelope> for SkillRequest {
    type Error = Error;

    fn try_from(envelope: RequestEnvelope) -> SkillResult<Self> {
        let raw = envelope.request;
        let kind = match raw.kind.as_str() {
            "LaunchRequest" => RequestKind::Launch,
            "IntentRequest" => {
                let intent = raw.intent.ok_or_else(|| {
                    Error::Serialization("IntentRequest without an intent".to_string())
                })?;
                let slots = intent
                    .slots
                    .into_iter()
                    .filter_map(|(name, slot)| slot.value.map(|value| (name, value)))
                    .collect();
                RequestKind::Intent(Intent {
                    name: intent.name,
                    slots,
                })
            }
            "SessionEndedRequest" => RequestKind::SessionEnded { reason: raw.reason },
            other => RequestKind::Unsupported(other.to_string()),
        };

        let application_id = envelope
            .session
            .as_ref()
            .and_then(|s| s.application.as_ref())
            .or_else(|| {
                envelope
                    .context
                    .as_ref()
                    .and_then(|c| c.system.as_ref())
                    .and_then(|system| system.application.as_ref())
            })
            .map(|app| app.application_id.clone());

        Ok(SkillRequest {
            request_id: raw.request_id,
            kind,
            session_active: envelope.session.is_some(),
            application_id,
        })
    }
}
