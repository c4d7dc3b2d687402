//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! run_processor (一次运行：提取 → 分块 → 出题 → 校验 → 写入)
//!     ↓
//! workflow::ChunkFlow (处理单个 TextChunk)
//!     ↓
//! services (能力层：chunker / llm / validator / docx)
//!     ↓
//! infrastructure (基础设施：PdfReader)
//! ```
//!
//! 编排层只做调度和统计，不做具体业务判断

pub mod run_processor;

pub use run_processor::{AbortSignal, App, RunSummary};
