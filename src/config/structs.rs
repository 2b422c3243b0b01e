use serde::{Deserialize, Serialize};

/// 静态配置（从 TOML 加载，启动时使用）
///
/// 包含：
/// - server: 服务器地址、端口、CPU 数量
/// - database: 数据库连接配置
/// - logging: 日志配置
/// - tracking: 事件批量写入与防抖
/// - analytics: 管理端报表
/// - api: 管理端令牌与 CORS
/// - chat: LLM 网关代理
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub tracking: TrackingConfig,
    #[serde(default)]
    pub analytics: AnalyticsConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
}

impl StaticConfig {
    /// 从 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：SP，分隔符：__
    /// 示例：SP__SERVER__PORT=9999
    pub fn load(path: Option<&str>) -> Self {
        use config::{Config, Environment, File};

        let path = path.unwrap_or("config.toml");

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 SP，分隔符 __
            .add_source(
                Environment::with_prefix("SP")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlite://, mysql://, postgres:// 或 "memory"
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

/// 事件采集配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingConfig {
    /// 关闭后 Tracker 退化为空实现
    #[serde(default = "default_tracking_enabled")]
    pub enabled: bool,
    /// 事件队列防抖时长（毫秒）
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// 管理端报表配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// 报表拉取的最近事件条数上限
    #[serde(default = "default_event_sample_limit")]
    pub event_sample_limit: u64,
    /// 排行榜长度
    #[serde(default = "default_top_n")]
    pub top_n: usize,
}

/// HTTP API 配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ApiConfig {
    /// 管理端 Bearer 令牌，为空时关闭管理端接口
    #[serde(default)]
    pub admin_token: String,
    /// 允许跨域写入的站点来源，为空时允许任意来源
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// LLM 网关配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// OpenAI 兼容的 chat/completions 地址，为空时直接返回兜底回复
    #[serde(default)]
    pub gateway_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_chat_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    #[serde(default = "default_fallback_reply")]
    pub fallback_reply: String,
    #[serde(default = "default_chat_timeout")]
    pub timeout_secs: u64,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8080
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_database_url() -> String {
    "sqlite://sitepulse.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

fn default_tracking_enabled() -> bool {
    true
}

fn default_debounce_ms() -> u64 {
    2000
}

fn default_event_sample_limit() -> u64 {
    50
}

fn default_top_n() -> usize {
    10
}

fn default_chat_model() -> String {
    "google/gemini-2.5-flash".to_string()
}

fn default_system_prompt() -> String {
    "You are the website assistant for a software consultancy. Answer briefly and \
     point visitors to the contact form or a free consultation when they ask about \
     pricing, timelines or hiring."
        .to_string()
}

fn default_fallback_reply() -> String {
    "Sorry, I can't answer right now. Please use the contact form and we'll get back to you shortly."
        .to_string()
}

fn default_chat_timeout() -> u64 {
    20
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: default_tracking_enabled(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            event_sample_limit: default_event_sample_limit(),
            top_n: default_top_n(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            api_key: String::new(),
            model: default_chat_model(),
            system_prompt: default_system_prompt(),
            fallback_reply: default_fallback_reply(),
            timeout_secs: default_chat_timeout(),
        }
    }
}
