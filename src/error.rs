use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;

/// Errors raised while decoding picker input.
///
/// Out-of-bounds years have no variant: they are clamped to the configured
/// bounds wherever they appear.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum PickerError {
    #[error("`{input}` is not a valid date")]
    InvalidDateInput { input: String },

    #[error("Start date {from} must not be after end date {to}")]
    InvalidRange { from: NaiveDate, to: NaiveDate },

    #[error("Unknown picker field `{name}`")]
    UnknownField { name: String },

    #[error("Unknown picker event `{name}`")]
    UnknownEvent { name: String },

    #[error("Picker state could not be decoded: {reason}")]
    MalformedSnapshot { reason: String },

    #[error("Event `{event}` requires the `{param}` value")]
    MissingParameter {
        event: &'static str,
        param: &'static str,
    },
}

impl PickerError {
    fn status(&self) -> StatusCode {
        match self {
            PickerError::UnknownField { .. } | PickerError::UnknownEvent { .. } => {
                StatusCode::NOT_FOUND
            }
            PickerError::InvalidDateInput { .. }
            | PickerError::InvalidRange { .. }
            | PickerError::MalformedSnapshot { .. }
            | PickerError::MissingParameter { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for PickerError {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self, "rejected picker request");
        (self.status(), self.to_string()).into_response()
    }
}
