use std::fmt;

#[derive(Debug, Clone)]
pub enum SitepulseError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Validation(String),
    NotFound(String),
    Conflict(String),
    Serialization(String),
    StorageUnavailable(String),
    AnalyticsQueryFailed(String),
    Unauthorized(String),
    Config(String),
}

impl SitepulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SitepulseError::DatabaseConfig(_) => "E001",
            SitepulseError::DatabaseConnection(_) => "E002",
            SitepulseError::DatabaseOperation(_) => "E003",
            SitepulseError::FileOperation(_) => "E004",
            SitepulseError::Validation(_) => "E005",
            SitepulseError::NotFound(_) => "E006",
            SitepulseError::Serialization(_) => "E007",
            SitepulseError::StorageUnavailable(_) => "E008",
            SitepulseError::AnalyticsQueryFailed(_) => "E009",
            SitepulseError::Unauthorized(_) => "E010",
            SitepulseError::Config(_) => "E011",
            SitepulseError::Conflict(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SitepulseError::DatabaseConfig(_) => "Database Configuration Error",
            SitepulseError::DatabaseConnection(_) => "Database Connection Error",
            SitepulseError::DatabaseOperation(_) => "Database Operation Error",
            SitepulseError::FileOperation(_) => "File Operation Error",
            SitepulseError::Validation(_) => "Validation Error",
            SitepulseError::NotFound(_) => "Resource Not Found",
            SitepulseError::Serialization(_) => "Serialization Error",
            SitepulseError::StorageUnavailable(_) => "Storage Unavailable",
            SitepulseError::AnalyticsQueryFailed(_) => "Analytics Query Failed",
            SitepulseError::Unauthorized(_) => "Unauthorized",
            SitepulseError::Config(_) => "Configuration Error",
            SitepulseError::Conflict(_) => "Conflict",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SitepulseError::DatabaseConfig(msg)
            | SitepulseError::DatabaseConnection(msg)
            | SitepulseError::DatabaseOperation(msg)
            | SitepulseError::FileOperation(msg)
            | SitepulseError::Validation(msg)
            | SitepulseError::NotFound(msg)
            | SitepulseError::Conflict(msg)
            | SitepulseError::Serialization(msg)
            | SitepulseError::StorageUnavailable(msg)
            | SitepulseError::AnalyticsQueryFailed(msg)
            | SitepulseError::Unauthorized(msg)
            | SitepulseError::Config(msg) => msg,
        }
    }

    /// 对应的 HTTP 状态码
    #[cfg(feature = "server")]
    pub fn http_status(&self) -> actix_web::http::StatusCode {
        use actix_web::http::StatusCode;
        match self {
            SitepulseError::Validation(_) => StatusCode::BAD_REQUEST,
            SitepulseError::NotFound(_) => StatusCode::NOT_FOUND,
            SitepulseError::Conflict(_) => StatusCode::CONFLICT,
            SitepulseError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 格式化为彩色输出（用于 CLI 模式）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SitepulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SitepulseError {}

// 便捷的构造函数
impl SitepulseError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SitepulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SitepulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        SitepulseError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SitepulseError::FileOperation(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SitepulseError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SitepulseError::NotFound(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        SitepulseError::Conflict(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SitepulseError::Serialization(msg.into())
    }

    pub fn storage_unavailable<T: Into<String>>(msg: T) -> Self {
        SitepulseError::StorageUnavailable(msg.into())
    }

    pub fn analytics_query_failed<T: Into<String>>(msg: T) -> Self {
        SitepulseError::AnalyticsQueryFailed(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        SitepulseError::Unauthorized(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        SitepulseError::Config(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SitepulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        SitepulseError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SitepulseError {
    fn from(err: std::io::Error) -> Self {
        SitepulseError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SitepulseError {
    fn from(err: serde_json::Error) -> Self {
        SitepulseError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SitepulseError>;
