// src/session/mod.rs - Configuration and per-flow user state
pub mod listeners;

pub use listeners::{Listeners, VerdiListener, VerdiRegisterListener, VerdiResult};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::transport::Environment;

/// Supplied once at startup, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    pub app_id: String,
    #[serde(default)]
    pub environment: Environment,
}

impl Configuration {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            environment: Environment::default(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }
}

/// Filled in step by step by the scan, NFC and selfie collaborators.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSession {
    pub device_id: String,
    pub serial_number: String,
    pub personal_number: String,
    pub doc_type: String,
    pub birth_date: String,
    pub date_of_expiry: String,
    pub scanner_serial: String,
    #[serde(skip)]
    pub face_image: Option<Vec<u8>>,
}

impl UserSession {
    pub fn apply_document(&mut self, fields: &DocumentFields) {
        self.serial_number = fields.serial_number.clone();
        self.personal_number = fields.personal_number.clone();
        self.doc_type = fields.doc_type.clone();
        self.birth_date = fields.birth_date.clone();
        self.date_of_expiry = fields.date_of_expiry.clone();
    }

    /// Chip data only overrides what it actually carries.
    pub fn apply_chip(&mut self, chip: &ChipData) {
        let refine = |slot: &mut String, value: &Option<String>| {
            if let Some(v) = value.as_ref().filter(|v| !v.is_empty()) {
                *slot = v.clone();
            }
        };
        refine(&mut self.serial_number, &chip.serial_number);
        refine(&mut self.personal_number, &chip.personal_number);
        refine(&mut self.doc_type, &chip.doc_type);
        refine(&mut self.birth_date, &chip.birth_date);
        refine(&mut self.date_of_expiry, &chip.date_of_expiry);
        if let Some(face) = chip.face_image.as_ref().filter(|f| !f.is_empty()) {
            self.face_image = Some(face.clone());
        }
    }

    pub fn is_registered(&self) -> bool {
        !self.scanner_serial.is_empty()
    }
}

/// What the document scanner reads off the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFields {
    pub serial_number: String,
    pub personal_number: String,
    pub doc_type: String,
    pub birth_date: String,
    pub date_of_expiry: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChipData {
    pub serial_number: Option<String>,
    pub personal_number: Option<String>,
    pub doc_type: Option<String>,
    pub birth_date: Option<String>,
    pub date_of_expiry: Option<String>,
    pub face_image: Option<Vec<u8>>,
}

/// Explicit session handle shared by the client and the facade.
#[derive(Debug)]
pub struct Session {
    config: Configuration,
    device_model: String,
    user: RwLock<UserSession>,
    listeners: Listeners,
}

impl Session {
    pub fn new(config: Configuration, device_model: impl Into<String>, user: UserSession) -> Self {
        Self {
            config,
            device_model: device_model.into(),
            user: RwLock::new(user),
            listeners: Listeners::default(),
        }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn environment(&self) -> Environment {
        self.config.environment
    }

    pub fn device_model(&self) -> &str {
        &self.device_model
    }

    pub fn listeners(&self) -> &Listeners {
        &self.listeners
    }

    /// Snapshot of the current user state.
    pub async fn user(&self) -> UserSession {
        self.user.read().await.clone()
    }

    pub async fn update_user<F>(&self, f: F)
    where
        F: FnOnce(&mut UserSession),
    {
        let mut user = self.user.write().await;
        f(&mut user);
    }
}
