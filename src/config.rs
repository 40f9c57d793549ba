use crate::error::{AppError, AppResult, ConfigError};
use serde::Deserialize;
use std::path::Path;

/// 程序配置
///
/// 加载顺序：默认值 → TOML 配置文件（可选）→ `.env` / 环境变量
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite 数据库文件路径
    pub db_path: String,
    /// 列表每页显示的订单数量
    pub items_per_page: usize,
    /// 同时识别的标签图片数量
    pub max_concurrent_scans: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    // --- 合作方订单 API 配置 ---
    pub partner_api_url: String,
    pub partner_token_url: String,
    pub partner_api_key: String,
    pub partner_shared_secret: String,
    pub partner_country_code: String,
    pub partner_token_timeout_secs: u64,
    pub partner_order_timeout_secs: u64,
    // --- OCR 服务配置 ---
    pub ocr_endpoint: String,
    pub ocr_api_key: String,
    pub ocr_poll_interval_ms: u64,
    pub ocr_max_polls: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: "orders.db".to_string(),
            items_per_page: 10,
            max_concurrent_scans: 4,
            verbose_logging: false,
            partner_api_url: String::new(),
            partner_token_url: String::new(),
            partner_api_key: String::new(),
            partner_shared_secret: String::new(),
            partner_country_code: "KR".to_string(),
            partner_token_timeout_secs: 10,
            partner_order_timeout_secs: 15,
            ocr_endpoint: String::new(),
            ocr_api_key: String::new(),
            ocr_poll_interval_ms: 2000,
            ocr_max_polls: 60,
        }
    }
}

impl Config {
    /// 加载完整配置
    ///
    /// # 参数
    /// - `file`: 可选的 TOML 配置文件路径
    pub fn load(file: Option<&Path>) -> AppResult<Self> {
        let _ = dotenvy::dotenv();

        match file {
            Some(path) => Ok(Self::from_env_with(Self::from_toml_file(path)?)),
            None => Ok(Self::from_env()),
        }
    }

    /// 仅从环境变量加载（未设置的项使用默认值）
    pub fn from_env() -> Self {
        Self::from_env_with(Self::default())
    }

    /// 从 TOML 文件加载，未出现的字段使用默认值
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::file_read_failed(path.display().to_string(), e))?;
        Self::from_toml_str(&content, &path.display().to_string())
    }

    fn from_toml_str(content: &str, origin: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|source| {
            ConfigError::TomlParseFailed {
                path: origin.to_string(),
                source,
            }
            .into()
        })
    }

    fn from_env_with(base: Self) -> Self {
        Self {
            db_path: std::env::var("DB_PATH").unwrap_or(base.db_path),
            items_per_page: std::env::var("ITEMS_PER_PAGE").ok().and_then(|v| v.parse().ok()).unwrap_or(base.items_per_page),
            max_concurrent_scans: std::env::var("MAX_CONCURRENT_SCANS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.max_concurrent_scans),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(base.verbose_logging),
            partner_api_url: std::env::var("PARTNER_API_URL").unwrap_or(base.partner_api_url),
            partner_token_url: std::env::var("PARTNER_TOKEN_URL").unwrap_or(base.partner_token_url),
            partner_api_key: std::env::var("PARTNER_API_KEY").unwrap_or(base.partner_api_key),
            partner_shared_secret: std::env::var("PARTNER_SHARED_SECRET").unwrap_or(base.partner_shared_secret),
            partner_country_code: std::env::var("PARTNER_COUNTRY_CODE").unwrap_or(base.partner_country_code),
            partner_token_timeout_secs: std::env::var("PARTNER_TOKEN_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.partner_token_timeout_secs),
            partner_order_timeout_secs: std::env::var("PARTNER_ORDER_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.partner_order_timeout_secs),
            ocr_endpoint: std::env::var("OCR_ENDPOINT").unwrap_or(base.ocr_endpoint),
            ocr_api_key: std::env::var("OCR_API_KEY").unwrap_or(base.ocr_api_key),
            ocr_poll_interval_ms: std::env::var("OCR_POLL_INTERVAL_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.ocr_poll_interval_ms),
            ocr_max_polls: std::env::var("OCR_MAX_POLLS").ok().and_then(|v| v.parse().ok()).unwrap_or(base.ocr_max_polls),
        }
    }

    /// 返回缺失的必填凭据名称
    pub fn missing_required(&self) -> Vec<&'static str> {
        [
            ("PARTNER_API_KEY", &self.partner_api_key),
            ("PARTNER_SHARED_SECRET", &self.partner_shared_secret),
            ("PARTNER_TOKEN_URL", &self.partner_token_url),
            ("PARTNER_API_URL", &self.partner_api_url),
            ("OCR_API_KEY", &self.ocr_api_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_overrides_only_listed_fields() {
        let config = Config::from_toml_str(
            r#"
            db_path = "intake.db"
            items_per_page = 25
            partner_country_code = "JP"
            "#,
            "inline",
        )
        .unwrap();

        assert_eq!(config.db_path, "intake.db");
        assert_eq!(config.items_per_page, 25);
        assert_eq!(config.partner_country_code, "JP");
        assert_eq!(config.ocr_max_polls, 60);
        assert_eq!(config.partner_order_timeout_secs, 15);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("items_per_page = \"many\"", "broken.toml").unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        std::env::set_var("OCR_MAX_POLLS", "7");
        std::env::set_var("PARTNER_ORDER_TIMEOUT_SECS", "not-a-number");

        let config = Config::from_env();
        assert_eq!(config.ocr_max_polls, 7);
        // 无法解析时保留默认值
        assert_eq!(config.partner_order_timeout_secs, 15);

        std::env::remove_var("OCR_MAX_POLLS");
        std::env::remove_var("PARTNER_ORDER_TIMEOUT_SECS");
    }

    #[test]
    fn test_missing_required_lists_blank_credentials() {
        let config = Config {
            partner_api_key: "key".to_string(),
            partner_token_url: "https://auth.example/token".to_string(),
            ..Config::default()
        };
        let missing = config.missing_required();
        assert_eq!(
            missing,
            vec!["PARTNER_SHARED_SECRET", "PARTNER_API_URL", "OCR_API_KEY"]
        );
    }
}
