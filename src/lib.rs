//! # MedQuiz Gen
//!
//! 从 PDF 指定页码中提取文本，调用大模型生成医学考试题，校验后写入 Word 文档
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（PDF 文档），只暴露能力
//! - `PdfReader` - 唯一的 Document owner，提供按页取文本的能力
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `Chunker` - 文本分块能力
//! - `LlmService` - LLM 出题能力（`QuestionGenerator`）
//! - `parse_questions` - 模型输出解析能力
//! - `QuestionValidator` - 题目校验能力
//! - `DocxWriter` - 写 Word 文档能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文本块"的处理流程
//! - `ChunkCtx` - 上下文封装（块编号 + 来源页码）
//! - `ChunkFlow` - 流程编排（生成 → 重试 / 跳过 / 终止）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/run_processor` - 一次完整运行：提取 → 分块 → 出题 → 校验 → 写入
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use cli::Cli;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::PdfReader;
pub use models::{GeneratedQuestion, PageRange, QuestionType, TextChunk};
pub use orchestrator::{AbortSignal, App, RunSummary};
pub use services::QuestionGenerator;
pub use workflow::{ChunkCtx, ChunkFlow, ChunkOutcome};
