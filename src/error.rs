use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// PDF 读取错误
    #[error("PDF错误: {0}")]
    Extraction(#[from] ExtractionError),
    /// 题目生成错误（只有致命错误会上升到这里）
    #[error("生成错误: {0}")]
    Generation(#[from] GenerationError),
    /// 输出文档错误
    #[error("输出错误: {0}")]
    Output(#[from] OutputError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// PDF 文本提取错误
///
/// 出现任何一种都说明本次运行的前提不成立，直接终止
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// 打开文件失败
    #[error("无法打开PDF文件 ({path}): {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 文件损坏或不是 PDF
    #[error("无法解析PDF文件 ({path}): {message}")]
    ParseFailed { path: String, message: String },
    /// 加密文档
    #[error("PDF文件已加密，无法读取: {path}")]
    Encrypted { path: String },
    /// 页码超出文档页数
    #[error("页码 {requested} 超出范围 (文档共 {page_count} 页)")]
    PageOutOfRange { requested: u32, page_count: u32 },
    /// 单页内容无法解码
    #[error("第 {page} 页文本提取失败: {message}")]
    PageTextFailed { page: u32, message: String },
}

/// 题目生成错误
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 临时错误（网络、超时、限流）：跳过当前块，继续运行
    #[error("临时错误 ({endpoint}): {message}")]
    Transient { endpoint: String, message: String },
    /// 致命错误（认证失败、额度耗尽）：立即终止运行
    #[error("致命错误 ({endpoint}): {message}")]
    Fatal { endpoint: String, message: String },
}

impl GenerationError {
    /// 是否为可以跳过的临时错误
    pub fn is_transient(&self) -> bool {
        matches!(self, GenerationError::Transient { .. })
    }
}

/// 输出文档错误
#[derive(Debug, Error)]
pub enum OutputError {
    /// 创建目录失败
    #[error("无法创建输出目录 ({path}): {source}")]
    CreateDirFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 页码范围不合法
    #[error("页码范围不合法: {0}")]
    InvalidPageRange(String),
    /// 数值参数不合法
    #[error("参数 {name} 不合法: {message}")]
    InvalidValue { name: String, message: String },
    /// 缺少必需参数
    #[error("缺少必需参数: {0}")]
    Missing(String),
    /// 题型无法识别
    #[error("无法识别的题型: {0}")]
    UnknownQuestionType(String),
    /// 配置文件读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    FileReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 配置文件解析失败
    #[error("解析配置文件失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

// ========== 便捷构造函数 ==========

impl GenerationError {
    /// 创建临时错误
    pub fn transient(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        GenerationError::Transient {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// 创建致命错误
    pub fn fatal(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        GenerationError::Fatal {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }
}

impl OutputError {
    /// 创建文件写入错误
    pub fn write_failed(
        path: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        OutputError::WriteFailed {
            path: path.into(),
            source: Box::new(source),
        }
    }
}

impl ConfigError {
    /// 创建参数不合法错误
    pub fn invalid(name: impl Into<String>, message: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            name: name.into(),
            message: message.into(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
