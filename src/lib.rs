pub mod classifier;
pub mod client;
pub mod codec;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod facade;
pub mod logger;
pub mod session;
pub mod transport;

pub use client::VerificationClient;
pub use config::Settings;
pub use error::VerdiError;
pub use facade::{HostContext, Platform, Verdi};
pub use session::{Configuration, Session, UserSession};

pub type Result<T> = std::result::Result<T, VerdiError>;
