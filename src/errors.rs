use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkhopError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Serialization(String),
    PasswordHash(String),
}

impl LinkhopError {
    /// Stable error code, used in logs and API error payloads
    pub fn code(&self) -> &'static str {
        match self {
            LinkhopError::DatabaseConfig(_) => "E001",
            LinkhopError::DatabaseConnection(_) => "E002",
            LinkhopError::DatabaseOperation(_) => "E003",
            LinkhopError::Validation(_) => "E004",
            LinkhopError::NotFound(_) => "E005",
            LinkhopError::Conflict(_) => "E006",
            LinkhopError::Serialization(_) => "E007",
            LinkhopError::PasswordHash(_) => "E008",
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            LinkhopError::DatabaseConfig(_) => "Database Configuration Error",
            LinkhopError::DatabaseConnection(_) => "Database Connection Error",
            LinkhopError::DatabaseOperation(_) => "Database Operation Error",
            LinkhopError::Validation(_) => "Validation Error",
            LinkhopError::NotFound(_) => "Resource Not Found",
            LinkhopError::Conflict(_) => "Resource Conflict",
            LinkhopError::Serialization(_) => "Serialization Error",
            LinkhopError::PasswordHash(_) => "Password Hash Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LinkhopError::DatabaseConfig(msg) => msg,
            LinkhopError::DatabaseConnection(msg) => msg,
            LinkhopError::DatabaseOperation(msg) => msg,
            LinkhopError::Validation(msg) => msg,
            LinkhopError::NotFound(msg) => msg,
            LinkhopError::Conflict(msg) => msg,
            LinkhopError::Serialization(msg) => msg,
            LinkhopError::PasswordHash(msg) => msg,
        }
    }
}

impl fmt::Display for LinkhopError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type(), self.message())
    }
}

impl std::error::Error for LinkhopError {}

// Convenience constructors
impl LinkhopError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkhopError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkhopError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkhopError::DatabaseOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkhopError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkhopError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        LinkhopError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkhopError::Serialization(msg.into())
    }

    pub fn password_hash<T: Into<String>>(msg: T) -> Self {
        LinkhopError::PasswordHash(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkhopError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkhopError::DatabaseOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkhopError {
    fn from(err: serde_json::Error) -> Self {
        LinkhopError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkhopError>;
