//! 文本块处理上下文
//!
//! 封装"我正在处理第几个文本块"这一信息

use std::fmt::Display;

use crate::models::{PageRange, TextChunk};

/// 文本块处理上下文
#[derive(Debug, Clone)]
pub struct ChunkCtx {
    /// 文本块编号
    pub chunk_id: usize,

    /// 处理顺序（从1开始，仅用于日志显示）
    pub position: usize,

    /// 本次运行的文本块总数
    pub total: usize,

    /// 来源页码
    pub pages: PageRange,
}

impl ChunkCtx {
    /// 创建新的文本块上下文
    pub fn new(chunk: &TextChunk, position: usize, total: usize) -> Self {
        Self {
            chunk_id: chunk.id,
            position,
            total,
            pages: chunk.pages,
        }
    }
}

impl Display for ChunkCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[块 {}/{} 第{}页]",
            self.position, self.total, self.pages
        )
    }
}
