//! 命令行参数

use std::path::PathBuf;

use clap::Parser;

use crate::models::{PageRange, QuestionFocus, QuestionType};

/// 从 PDF 页面生成医学考试题并写入 Word 文档
#[derive(Debug, Parser)]
#[command(name = "medquiz-gen", version, about)]
pub struct Cli {
    /// 源 PDF 文件
    #[arg(long, short = 'i')]
    pub pdf: Option<PathBuf>,

    /// 起始页（从 1 开始）
    #[arg(long, short = 's')]
    pub start_page: Option<u32>,

    /// 结束页（含）
    #[arg(long, short = 'e')]
    pub end_page: Option<u32>,

    /// 页码范围，例如 3-7
    #[arg(long, conflicts_with_all = ["start_page", "end_page"])]
    pub pages: Option<PageRange>,

    /// 题型: multiple-choice / short-answer / true-false
    #[arg(long, short = 't')]
    pub question_type: Option<QuestionType>,

    /// 出题角度: case-diagnosis / disease-characteristics / special-feature
    #[arg(long)]
    pub focus: Option<QuestionFocus>,

    /// 推理接口的 API Key
    #[arg(long, env = "MEDQUIZ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// 输出的 Word 文档
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// TOML 配置文件
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// OpenAI 兼容接口地址
    #[arg(long)]
    pub api_base_url: Option<String>,

    /// 模型名称
    #[arg(long)]
    pub model: Option<String>,

    /// 文本块最大字符数
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// 请求超时（秒）
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// 临时错误的重试次数
    #[arg(long)]
    pub retries: Option<u32>,

    /// 按来源页码分组输出
    #[arg(long)]
    pub group_by_pages: bool,

    /// 同时输出答案
    #[arg(long)]
    pub include_answers: bool,

    /// 跳过启动时的凭证检查
    #[arg(long)]
    pub skip_credential_check: bool,

    /// 显示详细日志
    #[arg(long, short = 'v')]
    pub verbose: bool,
}
