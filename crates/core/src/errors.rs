use thiserror::Error;

use crate::{
    forecast::{ForecastError, ModelError},
    messaging::MessagingError,
};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Commodity '{given}' not supported. Allowed: [{}]", .allowed.join(", "))]
    UnsupportedCommodity { given: String, allowed: Vec<String> },
    #[error("{0}")]
    InvalidInput(String),
}

impl DomainError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("price model failure: {0}")]
    Model(String),
    #[error("message rendering failure: {0}")]
    Rendering(String),
    #[error("collaborator failure: {0}")]
    Collaborator(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

impl From<ForecastError> for ApplicationError {
    fn from(value: ForecastError) -> Self {
        match value {
            ForecastError::Domain(error) => Self::Domain(error),
            ForecastError::Model(ModelError::Rejected(message)) => {
                Self::Domain(DomainError::InvalidInput(message))
            }
            ForecastError::Model(error) => Self::Model(error.to_string()),
        }
    }
}

impl From<MessagingError> for ApplicationError {
    fn from(value: MessagingError) -> Self {
        match value {
            MessagingError::Domain(error) => Self::Domain(error),
            MessagingError::Template(error) => Self::Rendering(error.to_string()),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("validation error: {message}")]
    Validation { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::Validation { .. } => "The request body does not match the expected shape.",
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::Validation { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::Validation { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::Validation { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(error) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Model(message) | ApplicationError::Collaborator(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Rendering(message) | ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}
