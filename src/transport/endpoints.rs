use serde::{Deserialize, Serialize};

pub const LANGUAGE: &str = "ru";
pub const BASE_URL_PRODUCTION: &str = "https://api.digid.uz:8080/";
pub const BASE_URL_TEST: &str = "https://testapi.digid.uz:8082/";

pub const AUTH_CHECK_APP_ID: &str = "Basic dGVzdHJlYWQ6dGVzdHBhc3M=";
pub const AUTH_PHONE: &str = "Basic ZGlnaWQ6ZGlnaWQyMDE5";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Test,
    Production,
}

impl Environment {
    pub fn base_url(self) -> &'static str {
        match self {
            Environment::Test => BASE_URL_TEST,
            Environment::Production => BASE_URL_PRODUCTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    CheckAppId,
    SendPhone,
    CheckPhone,
    Registration,
    Verification,
}

impl Endpoint {
    pub fn path(self) -> String {
        match self {
            Endpoint::CheckAppId => format!("mobile/data/{LANGUAGE}/checkAppId"),
            Endpoint::SendPhone => format!("digid-service/phone/{LANGUAGE}/send"),
            Endpoint::CheckPhone => format!("digid-service/phone/{LANGUAGE}/check"),
            Endpoint::Registration => format!("pinpp/{LANGUAGE}/registration"),
            Endpoint::Verification => format!("pinpp/{LANGUAGE}/verification"),
        }
    }

    pub fn url(self, environment: Environment) -> String {
        format!("{}{}", environment.base_url(), self.path())
    }

    /// Basic auth header value, for the endpoints that require one.
    pub fn authorization(self) -> Option<&'static str> {
        match self {
            Endpoint::CheckAppId => Some(AUTH_CHECK_APP_ID),
            Endpoint::SendPhone | Endpoint::CheckPhone => Some(AUTH_PHONE),
            Endpoint::Registration | Endpoint::Verification => None,
        }
    }

    /// Headers sent with every call to this endpoint.
    pub fn headers(self) -> Vec<(&'static str, String)> {
        let mut headers = vec![
            ("Accept", "application/json".to_string()),
            ("Content-type", "application/json".to_string()),
        ];
        if let Some(auth) = self.authorization() {
            headers.push(("Authorization", auth.to_string()));
        }
        headers
    }
}
