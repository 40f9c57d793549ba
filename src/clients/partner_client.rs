//! 合作方订单 API 客户端
//!
//! 封装令牌获取（client_credentials）和按订单号查询两个接口

use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult};
use crate::models::PartnerOrderResponse;
use serde::Deserialize;
use serde_json::{json, Value};
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

/// 订单查询能力
pub trait OrderLookup: Send + Sync {
    /// 获取访问令牌
    fn access_token(&self) -> impl Future<Output = AppResult<String>> + Send;

    /// 按订单号查询合作方订单数据
    fn fetch_order(
        &self,
        order_number: &str,
        token: &str,
    ) -> impl Future<Output = AppResult<PartnerOrderResponse>> + Send;
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

/// 合作方 API 客户端
pub struct PartnerClient {
    http: reqwest::Client,
    token_url: String,
    api_url: String,
    client_id: String,
    client_secret: String,
    country_code: String,
    token_timeout: Duration,
    order_timeout: Duration,
}

impl PartnerClient {
    /// 创建新的合作方客户端
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            token_url: config.partner_token_url.clone(),
            api_url: config.partner_api_url.clone(),
            client_id: config.partner_api_key.clone(),
            client_secret: config.partner_shared_secret.clone(),
            country_code: config.partner_country_code.clone(),
            token_timeout: Duration::from_secs(config.partner_token_timeout_secs),
            order_timeout: Duration::from_secs(config.partner_order_timeout_secs),
        }
    }

    /// 订单查询请求体
    fn search_payload(&self, order_number: &str) -> Value {
        json!({
            "SearchParameter": [
                {"key": "order_numbers", "values": [order_number]},
                {"key": "country_code", "values": [self.country_code]}
            ]
        })
    }
}

impl OrderLookup for PartnerClient {
    async fn access_token(&self) -> AppResult<String> {
        info!("🔑 正在获取访问令牌: {}", self.token_url);

        let token_failed = |source| {
            AppError::Api(ApiError::TokenRequestFailed {
                endpoint: self.token_url.clone(),
                source,
            })
        };

        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
        ];

        let response: TokenResponse = self
            .http
            .post(&self.token_url)
            .form(&form)
            .timeout(self.token_timeout)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(token_failed)?
            .json()
            .await
            .map_err(token_failed)?;

        match response.access_token.filter(|t| !t.is_empty()) {
            Some(token) => {
                info!("✅ 访问令牌获取成功");
                Ok(token)
            }
            None => Err(ApiError::MissingAccessToken {
                endpoint: self.token_url.clone(),
            }
            .into()),
        }
    }

    async fn fetch_order(&self, order_number: &str, token: &str) -> AppResult<PartnerOrderResponse> {
        info!("📡 正在查询订单: {}", order_number);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(token)
            .json(&self.search_payload(order_number))
            .timeout(self.order_timeout)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&self.api_url, e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(&self.api_url, e))?;

        if !status.is_success() {
            error!("❌ 订单查询失败 ({}): {}", status, body);
            return Err(ApiError::BadResponse {
                endpoint: self.api_url.clone(),
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let data: PartnerOrderResponse = serde_json::from_str(&body)?;
        info!("✅ 订单数据接收成功: {}", order_number);
        Ok(data)
    }
}
