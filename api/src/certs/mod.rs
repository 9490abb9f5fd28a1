//! Certificate lifecycle management for apps.

pub mod error;
pub mod service;
pub mod validator;

pub use error::CertError;
pub use service::CertificateService;
pub use validator::{ValidatedCertificate, ValidationError, validate};
