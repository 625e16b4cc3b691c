use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::DocumentFields;
use crate::codec::RegistrationResponse;
use crate::error::VerdiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerdiResult {
    DocumentScanned(DocumentFields),
    Verified(RegistrationResponse),
}

/// Scan state and verification outcomes.
pub trait VerdiListener: Send + Sync {
    fn on_success(&self, result: VerdiResult);
    fn on_error(&self, error: VerdiError);
}

pub trait VerdiRegisterListener: Send + Sync {
    fn on_register_success(&self, response: RegistrationResponse);
    fn on_register_error(&self, error: VerdiError);
}

/// One slot per callback kind. Setting a slot replaces whatever was there.
#[derive(Default)]
pub struct Listeners {
    state: RwLock<Option<Arc<dyn VerdiListener>>>,
    register: RwLock<Option<Arc<dyn VerdiRegisterListener>>>,
    verify: RwLock<Option<Arc<dyn VerdiListener>>>,
}

impl Listeners {
    pub async fn set_state(&self, listener: Option<Arc<dyn VerdiListener>>) {
        *self.state.write().await = listener;
    }

    pub async fn set_register(&self, listener: Option<Arc<dyn VerdiRegisterListener>>) {
        *self.register.write().await = listener;
    }

    pub async fn set_verify(&self, listener: Option<Arc<dyn VerdiListener>>) {
        *self.verify.write().await = listener;
    }

    pub async fn state(&self) -> Option<Arc<dyn VerdiListener>> {
        self.state.read().await.clone()
    }

    pub async fn register(&self) -> Option<Arc<dyn VerdiRegisterListener>> {
        self.register.read().await.clone()
    }

    pub async fn verify(&self) -> Option<Arc<dyn VerdiListener>> {
        self.verify.read().await.clone()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners").finish_non_exhaustive()
    }
}
