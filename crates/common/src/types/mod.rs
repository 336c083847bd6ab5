use serde::{Deserialize, Serialize};

/// Unified JSON body returned by every HTTP endpoint.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Envelope<T> {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self { code: 200, message: "success".into(), data: Some(data) }
    }
}

impl Envelope<()> {
    pub fn fail(code: u16, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), data: None }
    }
}
