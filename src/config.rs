//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，端口与敏感项可用环境变量覆盖

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

/// 数据目录配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// 数据根目录
    #[serde(default = "default_data_root")]
    pub root: String,
    /// 静态资源目录
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
}

/// 大模型配置（OpenAI 兼容接口）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// 接口地址（环境变量 OPENAI_URL 优先）
    #[serde(default)]
    pub base_url: String,
    /// API Key（环境变量 OPENAI_API_KEY 优先）
    #[serde(default)]
    pub api_key: String,
    /// 模型名称
    #[serde(default = "default_llm_model")]
    pub model: String,
}

/// 登录凭据配置（环境变量 MAIN_USERNAME / MAIN_PASSWORD 优先）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// 定时任务配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 行情轮询间隔（秒）
    #[serde(default = "default_quote_interval")]
    pub quote_interval_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub log: LogConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 3000 }
fn default_data_root() -> String { "data".to_string() }
fn default_public_dir() -> String { "public".to_string() }
fn default_llm_model() -> String { "deepseek-reasoner".to_string() }
fn default_quote_interval() -> u64 { 60 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: default_data_root(),
            public_dir: default_public_dir(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            model: default_llm_model(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            quote_interval_secs: default_quote_interval(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            data: DataConfig::default(),
            llm: LlmConfig::default(),
            auth: AuthConfig::default(),
            schedule: ScheduleConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置：优先从文件，失败则使用默认值，最后套用环境变量覆盖
    pub fn load() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config.apply_env();
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default().apply_env()
    }

    /// 环境变量覆盖（端口与敏感项）
    fn apply_env(mut self) -> Self {
        if let Some(port) = env::var("SGRID_TARGET_PORT").ok().and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Ok(v) = env::var("OPENAI_URL") {
            self.llm.base_url = v;
        }
        if let Ok(v) = env::var("OPENAI_API_KEY") {
            self.llm.api_key = v;
        }
        if let Ok(v) = env::var("MAIN_USERNAME") {
            self.auth.username = v;
        }
        if let Ok(v) = env::var("MAIN_PASSWORD") {
            self.auth.password = v;
        }
        self
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
