use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 合作方 API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// OCR 服务错误
    #[error("OCR错误: {0}")]
    Ocr(#[from] OcrError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 数据库错误
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),
    /// 业务逻辑错误
    #[error("业务错误: {0}")]
    Business(#[from] BusinessError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
    /// 正则表达式编译失败
    #[error("正则表达式错误: {0}")]
    Regex(#[from] regex::Error),
    /// 其他错误
    #[error("错误: {0}")]
    Other(String),
}

/// 合作方 API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 获取访问令牌失败
    #[error("获取访问令牌失败 ({endpoint}): {source}")]
    TokenRequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// 令牌响应中没有 access_token
    #[error("令牌响应中没有 access_token ({endpoint})")]
    MissingAccessToken { endpoint: String },
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误状态
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadResponse {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败: {source}")]
    JsonParseFailed {
        #[source]
        source: serde_json::Error,
    },
}

/// OCR 服务错误
#[derive(Debug, Error)]
pub enum OcrError {
    /// 未配置 OCR 端点或密钥
    #[error("未配置 OCR 端点或密钥")]
    NotConfigured,
    /// 图片文件为空
    #[error("图片文件为空")]
    EmptyImage,
    /// 图片中没有识别到文字
    #[error("图片中没有识别到文字")]
    NoTextDetected,
    /// 请求 OCR 服务失败
    #[error("OCR请求失败: {source}")]
    RequestFailed {
        #[source]
        source: reqwest::Error,
    },
    /// OCR 服务返回错误状态
    #[error("OCR服务返回错误 (status={status}): {body}")]
    BadResponse { status: u16, body: String },
    /// 响应中缺少 Operation-Location
    #[error("响应中缺少 Operation-Location")]
    MissingOperationLocation,
    /// 分析失败
    #[error("OCR分析失败: {message}")]
    AnalysisFailed { message: String },
    /// 轮询超时
    #[error("OCR轮询超时 (已尝试 {attempts} 次)")]
    Timeout { attempts: usize },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 读取文件失败
    #[error("读取文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 创建目录失败
    #[error("创建目录失败 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 业务逻辑错误
#[derive(Debug, Error)]
pub enum BusinessError {
    /// 既没有图片也没有手动输入的订单号
    #[error("没有可处理的数据，请提供标签图片或手动输入订单号")]
    NoInput,
    /// 不支持的搜索字段
    #[error("不支持的搜索字段: {field}")]
    UnknownSearchField { field: String },
    /// 订单号为空
    #[error("订单号不能为空")]
    EmptyOrderNumber,
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML 配置文件解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 从常见错误类型转换 ==========

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Api(ApiError::JsonParseFailed { source: err })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件读取错误
    pub fn file_read_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            return AppError::File(FileError::NotFound { path });
        }
        AppError::File(FileError::ReadFailed { path, source })
    }

    /// 互斥锁中毒等无法归类的内部错误
    pub fn other(message: impl Into<String>) -> Self {
        AppError::Other(message.into())
    }

    /// 是否属于合作方接口的传输/状态错误
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            AppError::Api(ApiError::RequestFailed { .. } | ApiError::BadResponse { .. })
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
