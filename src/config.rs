//! 程序配置
//!
//! 优先级（后者覆盖前者）：默认值 → TOML 配置文件 → 环境变量 → 命令行参数

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::cli::Cli;
use crate::error::ConfigError;
use crate::models::{PageRange, QuestionFocus, QuestionType};

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- 输入输出 ---
    /// 源 PDF 路径
    pub pdf_path: Option<PathBuf>,
    /// 起始页（从 1 开始）
    pub start_page: Option<u32>,
    /// 结束页，缺省时与起始页相同
    pub end_page: Option<u32>,
    /// 输出的 Word 文档路径
    pub output_path: PathBuf,
    pub question_type: QuestionType,
    /// 出题角度
    pub focus: QuestionFocus,
    // --- 分块 ---
    /// 每个文本块的最大字符数
    pub chunk_size: usize,
    /// 写进提示词的块内容最大字符数
    pub prompt_chunk_chars: usize,
    // --- LLM 配置 ---
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: u32,
    /// 临时错误的重试次数，0 表示不重试
    pub transient_retries: u32,
    /// 开始处理前先验证 API 凭证
    pub verify_credentials: bool,
    // --- 校验规则 ---
    pub min_question_len: usize,
    pub max_question_len: usize,
    /// 选择题最少选项数
    pub min_options: usize,
    // --- 输出 ---
    /// 按来源页码分组
    pub group_by_pages: bool,
    /// 输出答案
    pub include_answers: bool,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pdf_path: None,
            start_page: None,
            end_page: None,
            output_path: PathBuf::from("medical_questions.docx"),
            question_type: QuestionType::MultipleChoice,
            focus: QuestionFocus::default(),
            chunk_size: 2000,
            prompt_chunk_chars: 1500,
            llm_api_key: String::new(),
            llm_api_base_url: "https://router.huggingface.co/v1".to_string(),
            llm_model_name: "mistralai/Mistral-7B-Instruct-v0.3".to_string(),
            timeout_secs: 30,
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 300,
            transient_retries: 0,
            verify_credentials: true,
            min_question_len: 20,
            max_question_len: 600,
            min_options: 4,
            group_by_pages: false,
            include_answers: false,
            verbose_logging: false,
        }
    }
}

impl Config {
    /// 默认值加环境变量
    pub fn from_env() -> Self {
        Self::default().apply_env()
    }

    /// 从 TOML 文件加载，文件中未出现的字段使用默认值
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
                path: path.display().to_string(),
                source,
            })?;

        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })
    }

    /// 用环境变量覆盖
    pub fn apply_env(self) -> Self {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        let default = self;
        Self {
            llm_api_key: env("MEDQUIZ_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: env("MEDQUIZ_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: env("MEDQUIZ_MODEL").unwrap_or(default.llm_model_name),
            chunk_size: env("MEDQUIZ_CHUNK_SIZE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.chunk_size),
            timeout_secs: env("MEDQUIZ_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.timeout_secs),
            transient_retries: env("MEDQUIZ_RETRIES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.transient_retries),
            verbose_logging: env("VERBOSE_LOGGING")
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_logging),
            ..default
        }
    }

    /// 用命令行参数覆盖
    pub fn apply_cli(mut self, cli: &Cli) -> Self {
        if let Some(pdf) = &cli.pdf {
            self.pdf_path = Some(pdf.clone());
        }
        if let Some(range) = cli.pages {
            self.start_page = Some(range.start());
            self.end_page = Some(range.end());
        }
        if let Some(start) = cli.start_page {
            self.start_page = Some(start);
        }
        if let Some(end) = cli.end_page {
            self.end_page = Some(end);
        }
        if let Some(question_type) = cli.question_type {
            self.question_type = question_type;
        }
        if let Some(focus) = cli.focus {
            self.focus = focus;
        }
        if let Some(api_key) = &cli.api_key {
            self.llm_api_key = api_key.clone();
        }
        if let Some(output) = &cli.output {
            self.output_path = output.clone();
        }
        if let Some(base_url) = &cli.api_base_url {
            self.llm_api_base_url = base_url.clone();
        }
        if let Some(model) = &cli.model {
            self.llm_model_name = model.clone();
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(timeout) = cli.timeout_secs {
            self.timeout_secs = timeout;
        }
        if let Some(retries) = cli.retries {
            self.transient_retries = retries;
        }
        self.group_by_pages |= cli.group_by_pages;
        self.include_answers |= cli.include_answers;
        self.verbose_logging |= cli.verbose;
        if cli.skip_credential_check {
            self.verify_credentials = false;
        }
        self
    }

    /// 按 默认值 → 配置文件 → 环境变量 → 命令行 的顺序构建配置
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let base = match &cli.config {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        Ok(base.apply_env().apply_cli(cli))
    }

    /// 本次运行的页码范围
    pub fn page_range(&self) -> Result<PageRange, ConfigError> {
        let start = self
            .start_page
            .ok_or_else(|| ConfigError::Missing("start_page".to_string()))?;
        PageRange::new(start, self.end_page.unwrap_or(start))
    }

    /// 输出路径，缺少扩展名时补上 .docx
    pub fn resolved_output_path(&self) -> PathBuf {
        let is_docx = self
            .output_path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
        if is_docx {
            self.output_path.clone()
        } else {
            let mut name = self.output_path.clone().into_os_string();
            name.push(".docx");
            PathBuf::from(name)
        }
    }

    /// 检查运行所需的参数是否齐全、合法
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pdf_path.is_none() {
            return Err(ConfigError::Missing("pdf_path".to_string()));
        }
        self.page_range()?;
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::Missing("api_key".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(ConfigError::invalid("chunk_size", "必须大于 0"));
        }
        if self.prompt_chunk_chars == 0 {
            return Err(ConfigError::invalid("prompt_chunk_chars", "必须大于 0"));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::invalid("timeout_secs", "必须大于 0"));
        }
        if self.min_question_len > self.max_question_len {
            return Err(ConfigError::invalid(
                "min_question_len",
                format!(
                    "最小长度 {} 大于最大长度 {}",
                    self.min_question_len, self.max_question_len
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::io::Write;

    fn valid_config() -> Config {
        Config {
            pdf_path: Some(PathBuf::from("book.pdf")),
            start_page: Some(1),
            end_page: Some(3),
            llm_api_key: "hf_test".to_string(),
            ..Config::default()
        }
    }

    #[test]
    fn test_validate_ok() {
        assert!(valid_config().validate().is_ok());
    }

    #[test]
    fn test_validate_missing_api_key() {
        let config = Config {
            llm_api_key: "  ".to_string(),
            ..valid_config()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_validate_reversed_pages() {
        let config = Config {
            start_page: Some(5),
            end_page: Some(2),
            ..valid_config()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPageRange(_))
        ));
    }

    #[test]
    fn test_end_page_defaults_to_start() {
        let config = Config {
            end_page: None,
            start_page: Some(4),
            ..valid_config()
        };
        assert_eq!(config.page_range().unwrap(), PageRange::single(4).unwrap());
    }

    #[test]
    fn test_resolved_output_path_appends_extension() {
        let config = Config {
            output_path: PathBuf::from("out/questions"),
            ..Config::default()
        };
        assert_eq!(config.resolved_output_path(), PathBuf::from("out/questions.docx"));

        let config = Config {
            output_path: PathBuf::from("q.DOCX"),
            ..Config::default()
        };
        assert_eq!(config.resolved_output_path(), PathBuf::from("q.DOCX"));
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::try_parse_from([
            "medquiz-gen",
            "--pdf",
            "atlas.pdf",
            "--pages",
            "2-6",
            "--question-type",
            "short-answer",
            "--api-key",
            "hf_cli",
            "--chunk-size",
            "800",
            "--group-by-pages",
        ])
        .unwrap();

        let config = Config::default().apply_cli(&cli);
        assert_eq!(config.pdf_path, Some(PathBuf::from("atlas.pdf")));
        assert_eq!(config.page_range().unwrap(), PageRange::new(2, 6).unwrap());
        assert_eq!(config.question_type, QuestionType::ShortAnswer);
        assert_eq!(config.llm_api_key, "hf_cli");
        assert_eq!(config.chunk_size, 800);
        assert!(config.group_by_pages);
        assert!(!config.include_answers);
    }

    #[test]
    fn test_toml_file_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
question_type = "true-false"
focus = "special-feature"
chunk_size = 1200
min_options = 3
"#
        )
        .unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.question_type, QuestionType::TrueFalse);
        assert_eq!(config.focus, QuestionFocus::SpecialFeature);
        assert_eq!(config.chunk_size, 1200);
        assert_eq!(config.min_options, 3);
        // 未出现的字段保持默认值
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_toml_file_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunk_size = \"lots\"").unwrap();
        assert!(matches!(
            Config::from_toml_file(file.path()),
            Err(ConfigError::TomlParseFailed { .. })
        ));
    }
}
