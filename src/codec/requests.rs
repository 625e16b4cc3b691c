// src/codec/requests.rs - Request payloads sent to the verification service
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppIdRequest {
    pub app_id: String,
    pub request_id: String,
}

/// Body of both registration and verification. Registration fills every
/// sub-object; verification leaves the passport out and blanks the photos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportInfoRequest {
    pub app_id: String,
    pub request_guid: String,
    pub sign_string: String,
    pub client_pub_key: String,
    pub mobile_data: MobileData,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_passport: Option<PersonPassport>,
    pub person_photo: PersonPhoto,
    pub service_info: ServiceInfoEnvelope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MobileData {
    pub device_model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imei: Option<String>,
    pub device_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonPassport {
    pub passport: PassportData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PassportData {
    pub serial_number: String,
    pub personal_number: String,
    pub doc_type: String,
    pub birth_date: String,
    pub date_of_expiry: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    #[serde(rename = "AnswereId")]
    pub id: i32,
    #[serde(rename = "AnswereMessage")]
    pub message: String,
}

impl Answer {
    pub fn ok() -> Self {
        Self {
            id: 1,
            message: "OK".to_string(),
        }
    }
}

/// Face photo, base64. The server expects the same image twice.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonPhoto {
    #[serde(rename = "Answere", default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub person_photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_from_camera: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ServiceInfoEnvelope {
    #[serde(rename = "Answere", default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<Answer>,
    #[serde(rename = "ServiceInfo", default, skip_serializing_if = "Option::is_none")]
    pub service_info: Option<ServiceInfo>,
}

impl ServiceInfoEnvelope {
    pub fn for_scanner(scanner_serial: impl Into<String>) -> Self {
        Self {
            answer: None,
            service_info: Some(ServiceInfo {
                scanner_serial: scanner_serial.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceInfo {
    pub scanner_serial: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneRequest {
    pub app_id: String,
    pub request_id: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneCheckRequest {
    pub app_id: String,
    pub request_id: String,
    pub phone: String,
    pub code: String,
}
