// src/codec/responses.rs - Response payloads; unknown fields are ignored
use serde::{Deserialize, Serialize};

use super::ServiceResponse;

/// Bare `{code, message}` reply of the app-id and phone endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
}

pub type AppIdResponse = StatusResponse;
pub type PhoneResponse = StatusResponse;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub request_guid: Option<String>,
    #[serde(default)]
    pub scanner_serial: Option<String>,
    #[serde(default)]
    pub person_data: Option<PersonData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonData {
    #[serde(default)]
    pub pinpp: Option<String>,
    #[serde(default)]
    pub surname_latin: Option<String>,
    #[serde(default)]
    pub name_latin: Option<String>,
    #[serde(default)]
    pub patronym_latin: Option<String>,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub document: Option<String>,
}

impl ServiceResponse for StatusResponse {
    fn code(&self) -> Option<i32> {
        self.code
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl ServiceResponse for RegistrationResponse {
    fn code(&self) -> Option<i32> {
        self.code
    }

    fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}
