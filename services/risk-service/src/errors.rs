use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    NoUsableInput(String),

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ServiceError {
    fn code(&self) -> &'static str {
        match self {
            ServiceError::ValidationError(_) => "VALIDATION_ERROR",
            ServiceError::NoUsableInput(_) => "NO_USABLE_INPUT",
            ServiceError::RateLimited => "RATE_LIMITED",
            ServiceError::ConfigurationError(_) => "CONFIGURATION_ERROR",
            ServiceError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

impl ResponseError for ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ServiceError::NoUsableInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ServiceError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::ConfigurationError(_) | ServiceError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.code(),
            "message": self.to_string()
        }))
    }
}

impl From<risk_engine::Error> for ServiceError {
    fn from(err: risk_engine::Error) -> Self {
        match err {
            risk_engine::Error::NoUsableInput => ServiceError::NoUsableInput(err.to_string()),
            risk_engine::Error::InvalidConfig(msg) => ServiceError::ConfigurationError(msg),
        }
    }
}

impl From<prometheus::Error> for ServiceError {
    fn from(err: prometheus::Error) -> Self {
        ServiceError::InternalError(err.to_string())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_mapping() {
        let err = ServiceError::from(risk_engine::Error::InvalidConfig(
            "invalid UTC offset 90000".to_string(),
        ));
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code(), "CONFIGURATION_ERROR");

        assert_eq!(
            ServiceError::RateLimited.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );

        let err = ServiceError::from(risk_engine::Error::NoUsableInput);
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "at least one feature value is required");
    }
}
