//! Error types and handling for the walkpath service

use thiserror::Error;

/// Main error type for the walkpath service
#[derive(Error, Debug)]
pub enum WalkError {
    /// Remote data service failures (network, status, decoding)
    #[error("Data fetch error: {message}")]
    DataFetch { message: String },

    /// Address lookup failures
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// Speech synthesis failures
    #[error("Speech error: {message}")]
    Speech { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Cache operation errors
    #[error("Cache error: {message}")]
    Cache { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl WalkError {
    /// Create a new data fetch error
    pub fn data_fetch<S: Into<String>>(message: S) -> Self {
        Self::DataFetch {
            message: message.into(),
        }
    }

    /// Create a new geocoding error
    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    /// Create a new speech error
    pub fn speech<S: Into<String>>(message: S) -> Self {
        Self::Speech {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new cache error
    pub fn cache<S: Into<String>>(message: S) -> Self {
        Self::Cache {
            message: message.into(),
        }
    }

    /// Get a user-facing message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            WalkError::DataFetch { .. } => {
                "산책로 데이터를 불러오지 못했습니다. 잠시 후 다시 시도해 주세요.".to_string()
            }
            WalkError::Geocoding { .. } => {
                "주소를 찾을 수 없습니다. 다른 주소로 검색해 주세요.".to_string()
            }
            WalkError::Speech { .. } => "음성 재생 중 오류가 발생했습니다.".to_string(),
            WalkError::Validation { message } => format!("입력값이 올바르지 않습니다: {message}"),
            WalkError::Config { .. } => {
                "설정 오류입니다. 설정 파일과 API 키를 확인해 주세요.".to_string()
            }
            WalkError::Cache { .. } => "캐시 처리에 실패했습니다.".to_string(),
            WalkError::Io { .. } => "파일 처리에 실패했습니다.".to_string(),
        }
    }
}

impl From<reqwest_middleware::Error> for WalkError {
    fn from(err: reqwest_middleware::Error) -> Self {
        WalkError::data_fetch(err.to_string())
    }
}

impl From<anyhow::Error> for WalkError {
    fn from(err: anyhow::Error) -> Self {
        WalkError::cache(err.to_string())
    }
}
