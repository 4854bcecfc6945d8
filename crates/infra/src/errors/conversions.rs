//! Conversions from external infrastructure errors into domain errors.

use calbot_domain::CalbotError;
use reqwest::Error as HttpError;
use serde_json::Error as JsonError;
use std::io::Error as IoError;
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub CalbotError);

impl From<InfraError> for CalbotError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<CalbotError> for InfraError {
    fn from(value: CalbotError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoCalbotError {
    fn into_calbot(self) -> CalbotError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → CalbotError */
/* -------------------------------------------------------------------------- */

impl IntoCalbotError for HttpError {
    fn into_calbot(self) -> CalbotError {
        if self.is_timeout() {
            return CalbotError::Network("HTTP request timed out".into());
        }

        if self.is_connect() {
            return CalbotError::Network("HTTP connection failure".into());
        }

        if self.is_decode() {
            return CalbotError::DataFormat(format!("unreadable HTTP response body: {self}"));
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            let message =
                format!("HTTP {} {}", code, status.canonical_reason().unwrap_or("unknown status"));

            return match code {
                401 | 403 => CalbotError::Auth(message),
                404 | 410 => CalbotError::NotFound(message),
                400..=499 => CalbotError::InvalidInput(message),
                _ => CalbotError::Network(message),
            };
        }

        CalbotError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_calbot())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → CalbotError */
/* -------------------------------------------------------------------------- */

impl IntoCalbotError for JsonError {
    fn into_calbot(self) -> CalbotError {
        use serde_json::error::Category;

        match self.classify() {
            Category::Io => CalbotError::Io(self.to_string()),
            Category::Syntax | Category::Eof => {
                CalbotError::DataFormat(format!("invalid JSON at line {}: {self}", self.line()))
            }
            Category::Data => CalbotError::DataFormat(format!("unexpected JSON shape: {self}")),
        }
    }
}

impl From<JsonError> for InfraError {
    fn from(value: JsonError) -> Self {
        InfraError(value.into_calbot())
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → CalbotError */
/* -------------------------------------------------------------------------- */

impl IntoCalbotError for IoError {
    fn into_calbot(self) -> CalbotError {
        match self.kind() {
            std::io::ErrorKind::NotFound => CalbotError::NotFound(self.to_string()),
            _ => CalbotError::Io(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_calbot())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → CalbotError */
/* -------------------------------------------------------------------------- */

impl IntoCalbotError for TomlError {
    fn into_calbot(self) -> CalbotError {
        CalbotError::Config(format!("Invalid TOML format: {}", self.message()))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_calbot())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
