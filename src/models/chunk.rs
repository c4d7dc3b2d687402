use serde::{Deserialize, Serialize};

use super::PageRange;

/// 单页提取结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageText {
    /// 页码（从 1 开始）
    pub page_number: u32,
    /// 原始文本
    pub text: String,
}

impl PageText {
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// 提交给模型的文本块
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextChunk {
    /// 块编号（本次运行内从 0 递增）
    pub id: usize,
    /// 块内容，长度不超过配置的上限
    pub text: String,
    /// 来源页码
    pub pages: PageRange,
}

impl TextChunk {
    /// 字符数（按 Unicode 标量计数）
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
