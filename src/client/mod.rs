// src/client/mod.rs - Network-backed verification operations
pub mod gate;
pub mod ids;
pub mod signature;

pub use gate::AppIdGate;
pub use ids::{IdGenerator, UuidGenerator};

use std::sync::Arc;

use base64ct::{Base64, Encoding};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::codec::{
    self, Answer, AppIdRequest, AppIdResponse, MobileData, PassportData, PassportInfoRequest,
    PersonPassport, PersonPhoto, PhoneCheckRequest, PhoneRequest, PhoneResponse,
    RegistrationResponse, ServiceInfoEnvelope, ServiceResponse,
};
use crate::error::{ConfigurationError, VerdiError};
use crate::session::Session;
use crate::transport::{Endpoint, HttpRequest, Transport};
use crate::Result;

/// Talks to the verification service on behalf of one session.
///
/// Registration, verification and the phone calls are gated on a successful
/// app id check, done lazily on first use.
pub struct VerificationClient {
    session: Arc<Session>,
    transport: Arc<dyn Transport>,
    ids: Arc<dyn IdGenerator>,
    gate: AppIdGate,
}

impl VerificationClient {
    pub fn new(session: Arc<Session>, transport: Arc<dyn Transport>) -> Self {
        Self {
            session,
            transport,
            ids: Arc::new(UuidGenerator),
            gate: AppIdGate::default(),
        }
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    pub fn is_app_id_available(&self) -> bool {
        self.gate.is_open()
    }

    /// Check the configured app id against the service. Opens the gate on success.
    pub async fn check_app_id(&self) -> Result<()> {
        self.request_app_id().await?;
        self.gate.open();
        Ok(())
    }

    async fn request_app_id(&self) -> Result<()> {
        let app_id = &self.session.config().app_id;
        if app_id.is_empty() {
            return Err(ConfigurationError::AppIdEmpty.into());
        }

        let request = AppIdRequest {
            app_id: app_id.clone(),
            request_id: self.ids.next_id(),
        };
        let _: AppIdResponse = self.post(Endpoint::CheckAppId, &request).await?;
        info!("App id accepted");
        Ok(())
    }

    /// Fails before any network traffic when the device id is missing.
    async fn require_device_id(&self) -> Result<()> {
        if self.session.user().await.device_id.is_empty() {
            return Err(VerdiError::NotInitialized);
        }
        Ok(())
    }

    async fn ensure_app_id(&self) -> Result<()> {
        self.gate.open_with(|| self.request_app_id()).await
    }

    pub async fn register_person(&self) -> Result<RegistrationResponse> {
        self.require_device_id().await?;
        if !self.gate.is_open() {
            self.ensure_app_id().await?;
        }

        let user = self.session.user().await;
        let public_key = self.ids.next_id();
        let guid = self.ids.next_id();

        let sign_string = signature::registration_signature(
            &guid,
            &user.serial_number,
            &user.birth_date,
            &user.date_of_expiry,
            &public_key,
        );

        let photo = user.face_image.as_deref().map(Base64::encode_string);
        if photo.is_none() {
            warn!("Registering without a face image");
        }

        let request = PassportInfoRequest {
            app_id: self.session.config().app_id.clone(),
            request_guid: guid,
            sign_string,
            client_pub_key: public_key,
            mobile_data: MobileData {
                device_model: self.session.device_model().to_string(),
                imei: Some(String::new()),
                device_id: user.device_id.clone(),
                ip_address: Some(String::new()),
            },
            person_passport: Some(PersonPassport {
                passport: PassportData {
                    serial_number: user.serial_number,
                    personal_number: user.personal_number,
                    doc_type: user.doc_type,
                    birth_date: user.birth_date,
                    date_of_expiry: user.date_of_expiry,
                },
            }),
            person_photo: PersonPhoto {
                answer: Some(Answer::ok()),
                person_photo: photo.clone(),
                photo_from_camera: photo,
            },
            service_info: ServiceInfoEnvelope::for_scanner(user.device_id),
        };

        self.post(Endpoint::Registration, &request).await
    }

    pub async fn verify_person(&self) -> Result<RegistrationResponse> {
        self.require_device_id().await?;
        if !self.gate.is_open() {
            self.ensure_app_id().await?;
            // Known issue: continues as a registration, not a verification.
            warn!("App id checked during verify_person, continuing with register_person");
            return self.register_person().await;
        }

        let user = self.session.user().await;
        let guid = self.ids.next_id();

        let sign_string =
            signature::verification_signature(&guid, &user.scanner_serial, &user.device_id);
        warn!(
            placeholder = signature::VERIFICATION_KEY_PLACEHOLDER,
            "Verification signature does not cover the request, sending the deployed constant"
        );

        let request = PassportInfoRequest {
            app_id: self.session.config().app_id.clone(),
            request_guid: guid,
            sign_string,
            client_pub_key: self.ids.next_id(),
            mobile_data: MobileData {
                device_model: self.session.device_model().to_string(),
                imei: None,
                device_id: user.device_id,
                ip_address: None,
            },
            person_passport: None,
            person_photo: PersonPhoto {
                answer: None,
                person_photo: None,
                photo_from_camera: Some(String::new()),
            },
            service_info: ServiceInfoEnvelope::for_scanner(user.scanner_serial),
        };

        self.post(Endpoint::Verification, &request).await
    }

    /// Ask the service to text a confirmation code to `phone`.
    pub async fn send_phone(&self, phone: &str) -> Result<PhoneResponse> {
        if !self.gate.is_open() {
            self.ensure_app_id().await?;
        }

        let request = PhoneRequest {
            app_id: self.session.config().app_id.clone(),
            request_id: self.ids.next_id(),
            phone: phone.to_string(),
        };
        self.post(Endpoint::SendPhone, &request).await
    }

    pub async fn check_phone(&self, phone: &str, code: &str) -> Result<PhoneResponse> {
        if !self.gate.is_open() {
            self.ensure_app_id().await?;
        }

        let request = PhoneCheckRequest {
            app_id: self.session.config().app_id.clone(),
            request_id: self.ids.next_id(),
            phone: phone.to_string(),
            code: code.to_string(),
        };
        self.post(Endpoint::CheckPhone, &request).await
    }

    pub fn cancel_all(&self) {
        info!("Cancelling all requests");
        self.transport.cancel_all();
    }

    pub fn set_log_bodies(&self, enabled: bool) {
        self.transport.set_log_bodies(enabled);
    }

    async fn post<T, R>(&self, endpoint: Endpoint, payload: &T) -> Result<R>
    where
        T: Serialize,
        R: DeserializeOwned + ServiceResponse,
    {
        let request = HttpRequest {
            url: endpoint.url(self.session.environment()),
            headers: endpoint.headers(),
            body: codec::encode(payload)?,
        };

        debug!(?endpoint, url = %request.url, "Sending request");
        let response = self.transport.post_json(request).await.map_err(|e| {
            warn!(?endpoint, error = %e, "Transport failure");
            VerdiError::from(e)
        })?;

        let status = response.status;
        let result = codec::interpret::<R>(response);
        match &result {
            Ok(_) => info!(?endpoint, status, "Request succeeded"),
            Err(e) => warn!(?endpoint, status, code = ?e.response_code(), error = %e, "Request failed"),
        }
        result
    }
}
