// src/facade/mod.rs - Public entry point wiring capture steps to the client
pub mod collaborators;
pub mod validation;

pub use collaborators::{DocumentScanner, NfcReadRequest, NfcReader, ScanMode, SelfieCapture};

use std::future::Future;
use std::sync::{Arc, OnceLock};

use tokio::runtime::Handle;
use tracing::{info, warn};

use crate::client::{IdGenerator, VerificationClient};
use crate::codec::RegistrationResponse;
use crate::dispatch::{Dispatcher, Job};
use crate::error::{ValidationError, VerdiError};
use crate::session::{
    ChipData, Configuration, DocumentFields, Session, UserSession, VerdiListener,
    VerdiRegisterListener, VerdiResult,
};
use crate::transport::Transport;
use crate::Result;

/// What the host knows about the device at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostContext {
    pub device_id: String,
    pub device_model: String,
    pub nfc_available: bool,
}

/// Host-provided services the facade drives.
pub struct Platform {
    pub transport: Arc<dyn Transport>,
    pub dispatcher: Arc<dyn Dispatcher>,
    pub scanner: Arc<dyn DocumentScanner>,
    pub nfc: Option<Arc<dyn NfcReader>>,
    pub selfie: Arc<dyn SelfieCapture>,
    pub ids: Option<Arc<dyn IdGenerator>>,
    /// Runtime that runs network work. Facade calls may come from any thread.
    pub runtime: Handle,
}

struct Inner {
    session: Arc<Session>,
    client: Arc<VerificationClient>,
    dispatcher: Arc<dyn Dispatcher>,
    scanner: Arc<dyn DocumentScanner>,
    nfc: Option<Arc<dyn NfcReader>>,
    selfie: Arc<dyn SelfieCapture>,
    runtime: Handle,
}

/// SDK handle owned by the host application.
///
/// Every operation before `init` reports `NotInitialized`.
#[derive(Default)]
pub struct Verdi {
    inner: OnceLock<Inner>,
}

impl Verdi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the SDK up. Only the first call takes effect.
    pub fn init(&self, context: HostContext, config: Configuration, platform: Platform) {
        let user = UserSession {
            device_id: context.device_id,
            ..Default::default()
        };
        let session = Arc::new(Session::new(config, context.device_model, user));

        let mut client = VerificationClient::new(session.clone(), platform.transport);
        if let Some(ids) = platform.ids {
            client = client.with_id_generator(ids);
        }

        let nfc = if context.nfc_available { platform.nfc } else { None };
        let inner = Inner {
            session,
            client: Arc::new(client),
            dispatcher: platform.dispatcher,
            scanner: platform.scanner,
            nfc,
            selfie: platform.selfie,
            runtime: platform.runtime,
        };

        if self.inner.set(inner).is_err() {
            warn!("Verdi already initialized, ignoring init");
        } else {
            info!("Verdi initialized");
        }
    }

    fn inner(&self) -> Result<&Inner> {
        self.inner.get().ok_or(VerdiError::NotInitialized)
    }

    pub fn session(&self) -> Result<Arc<Session>> {
        Ok(self.inner()?.session.clone())
    }

    pub fn is_nfc_available(&self) -> bool {
        self.inner().map(|i| i.nfc.is_some()).unwrap_or(false)
    }

    pub async fn is_user_registered(&self) -> bool {
        match self.inner() {
            Ok(inner) => inner.session.user().await.is_registered(),
            Err(_) => false,
        }
    }

    pub fn set_logs(&self, enabled: bool) {
        if let Ok(inner) = self.inner() {
            inner.client.set_log_bodies(enabled);
        }
    }

    /// Start the document scan. The scan result goes to `listener`.
    pub async fn open_document_scan(&self, listener: Arc<dyn VerdiListener>, is_id_card_mode: bool) {
        let inner = match self.inner() {
            Ok(inner) => inner,
            Err(e) => return listener.on_error(e),
        };

        inner.session.listeners().set_state(Some(listener)).await;
        let mode = if is_id_card_mode { ScanMode::IdCard } else { ScanMode::Passport };
        inner.scanner.start_scan(mode);
    }

    /// Start selfie capture. With a non-empty `scanner_serial` the user counts
    /// as registered and the selfie is sent for verification.
    pub async fn open_selfie(&self, listener: Option<Arc<dyn VerdiListener>>, scanner_serial: &str) {
        let inner = match self.inner() {
            Ok(inner) => inner,
            Err(e) => {
                if let Some(listener) = listener {
                    listener.on_error(e);
                }
                return;
            }
        };

        let scanner_serial = scanner_serial.to_string();
        inner.session.update_user(|u| u.scanner_serial = scanner_serial).await;
        inner.session.listeners().set_verify(listener).await;
        inner.selfie.start_capture();
    }

    /// Validate the printed document data, then go through NFC (when the
    /// device has it) and the selfie. The registration result goes to `listener`.
    pub async fn proceed_with_document_and_selfie(
        &self,
        serial_number: &str,
        birth_date: &str,
        date_of_expiry: &str,
        listener: Arc<dyn VerdiRegisterListener>,
    ) {
        let inner = match self.inner() {
            Ok(inner) => inner,
            Err(e) => return listener.on_register_error(e),
        };

        inner.session.listeners().set_register(Some(listener.clone())).await;

        if serial_number.is_empty() || birth_date.is_empty() || date_of_expiry.is_empty() {
            return listener.on_register_error(ValidationError::Empty.into());
        }

        inner
            .session
            .update_user(|u| {
                u.serial_number = serial_number.to_string();
                u.birth_date = birth_date.to_string();
                u.date_of_expiry = date_of_expiry.to_string();
            })
            .await;

        if let Err(e) = validation::validate_passport_info(serial_number, birth_date, date_of_expiry) {
            return listener.on_register_error(e.into());
        }

        match &inner.nfc {
            Some(nfc) => {
                let request = match (
                    validation::to_chip_date(birth_date),
                    validation::to_chip_date(date_of_expiry),
                ) {
                    (Ok(birth), Ok(expiry)) => NfcReadRequest {
                        serial_number: serial_number.to_string(),
                        birth_date: birth,
                        date_of_expiry: expiry,
                    },
                    (Err(e), _) | (_, Err(e)) => return listener.on_register_error(e.into()),
                };
                nfc.start_read(request);
            }
            None => self.open_selfie(None, "").await,
        }
    }

    /// Scanner finished: store the fields and tell the state listener.
    pub async fn on_document_scanned(&self, fields: DocumentFields) -> Result<()> {
        let inner = self.inner()?;

        inner.session.update_user(|u| u.apply_document(&fields)).await;
        match inner.session.listeners().state().await {
            Some(listener) => inner.dispatcher.dispatch(Box::new(move || {
                listener.on_success(VerdiResult::DocumentScanned(fields));
            })),
            None => warn!("Document scanned with no state listener set"),
        }
        Ok(())
    }

    /// Chip read finished: refine the document fields and move on to the selfie.
    pub async fn on_nfc_read(&self, chip: ChipData) -> Result<()> {
        let inner = self.inner()?;

        inner.session.update_user(|u| u.apply_chip(&chip)).await;
        self.open_selfie(None, "").await;
        Ok(())
    }

    /// Selfie taken: registered users are verified, everyone else registered.
    /// Results go to the listeners set by `open_selfie` and
    /// `proceed_with_document_and_selfie`.
    pub async fn on_selfie_captured(&self, face_image: Vec<u8>) -> Result<()> {
        let inner = self.inner()?;

        inner.session.update_user(|u| u.face_image = Some(face_image)).await;

        if inner.session.user().await.is_registered() {
            spawn_verification(inner, None);
        } else {
            spawn_registration(inner, None);
        }
        Ok(())
    }

    /// Run registration in the background; the result goes to `listener`.
    pub fn register_person(&self, listener: Arc<dyn VerdiRegisterListener>) {
        match self.inner() {
            Ok(inner) => spawn_registration(inner, Some(listener)),
            Err(e) => listener.on_register_error(e),
        }
    }

    /// Run verification in the background; the result goes to `listener`.
    pub fn verify_person(&self, listener: Arc<dyn VerdiListener>) {
        match self.inner() {
            Ok(inner) => spawn_verification(inner, Some(listener)),
            Err(e) => listener.on_error(e),
        }
    }

    pub fn cancel_all_requests(&self) {
        if let Ok(inner) = self.inner() {
            inner.client.cancel_all();
        }
    }
}

/// Registration on the runtime. Without an explicit listener the result
/// goes to the register slot.
fn spawn_registration(inner: &Inner, listener: Option<Arc<dyn VerdiRegisterListener>>) {
    let client = inner.client.clone();
    let session = inner.session.clone();
    spawn_and_deliver(
        &inner.runtime,
        inner.dispatcher.clone(),
        async move { client.register_person().await },
        move |result| async move {
            let listener = match listener {
                Some(listener) => Some(listener),
                None => session.listeners().register().await,
            };
            let job: Job = Box::new(move || match listener {
                Some(listener) => match result {
                    Ok(response) => listener.on_register_success(response),
                    Err(e) => listener.on_register_error(e),
                },
                None => warn!(ok = result.is_ok(), "Registration finished with no listener set"),
            });
            job
        },
    );
}

fn spawn_verification(inner: &Inner, listener: Option<Arc<dyn VerdiListener>>) {
    let client = inner.client.clone();
    let session = inner.session.clone();
    spawn_and_deliver(
        &inner.runtime,
        inner.dispatcher.clone(),
        async move { client.verify_person().await },
        move |result: Result<RegistrationResponse>| async move {
            let listener = match listener {
                Some(listener) => Some(listener),
                None => session.listeners().verify().await,
            };
            let job: Job = Box::new(move || match listener {
                Some(listener) => match result {
                    Ok(response) => listener.on_success(VerdiResult::Verified(response)),
                    Err(e) => listener.on_error(e),
                },
                None => warn!(ok = result.is_ok(), "Verification finished with no listener set"),
            });
            job
        },
    );
}

/// Run `work` on `runtime`, then hand the callback built by `deliver` to the dispatcher.
/// Safe to call from threads outside the runtime.
fn spawn_and_deliver<T, W, D, DFut>(runtime: &Handle, dispatcher: Arc<dyn Dispatcher>, work: W, deliver: D)
where
    T: Send + 'static,
    W: Future<Output = Result<T>> + Send + 'static,
    D: FnOnce(Result<T>) -> DFut + Send + 'static,
    DFut: Future<Output = Job> + Send,
{
    runtime.spawn(async move {
        let result = work.await;
        let job = deliver(result).await;
        dispatcher.dispatch(job);
    });
}
