//! 文本分块 - 业务能力层
//!
//! 把逐页文本切成不超过上限的文本块，边界尽量落在空白处

use std::str::SplitWhitespace;

use crate::error::ConfigError;
use crate::models::{PageRange, PageText, TextChunk};

/// 文本分块器
///
/// 规则：
/// - 每块字符数不超过 `max_chars`
/// - 按空白切分，连续空白折叠为一个空格
/// - 单个单词超过上限时按字符硬切
/// - 块不跨页，空白页不产生块
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    max_chars: usize,
}

impl Chunker {
    /// 创建分块器，`max_chars` 至少为 1
    pub fn new(max_chars: usize) -> Result<Self, ConfigError> {
        if max_chars == 0 {
            return Err(ConfigError::invalid("chunk_size", "文本块上限必须大于 0"));
        }
        Ok(Self { max_chars })
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// 惰性地产生文本块
    pub fn chunks<'a>(&self, pages: &'a [PageText]) -> Chunks<'a> {
        Chunks {
            pages: pages.iter(),
            current: None,
            carry: None,
            max_chars: self.max_chars,
            next_id: 0,
        }
    }

    /// 一次性收集所有文本块
    pub fn chunk_all(&self, pages: &[PageText]) -> Vec<TextChunk> {
        self.chunks(pages).collect()
    }
}

/// 文本块迭代器，由 [`Chunker::chunks`] 创建
pub struct Chunks<'a> {
    pages: std::slice::Iter<'a, PageText>,
    current: Option<(u32, SplitWhitespace<'a>)>,
    /// 上一块放不下的单词，或超长单词剩下的部分
    carry: Option<&'a str>,
    max_chars: usize,
    next_id: usize,
}

impl<'a> Iterator for Chunks<'a> {
    type Item = TextChunk;

    fn next(&mut self) -> Option<TextChunk> {
        loop {
            if self.current.is_none() {
                let page = self.pages.next()?;
                self.current = Some((page.page_number, page.text.split_whitespace()));
                self.carry = None;
            }

            let (page_number, words) = match self.current.as_mut() {
                Some((page_number, words)) => (*page_number, words),
                None => continue,
            };

            let mut buf = String::new();
            let mut buf_len = 0usize;

            while let Some(word) = self.carry.take().or_else(|| words.next()) {
                let word_len = word.chars().count();
                let sep = usize::from(buf_len > 0);

                if buf_len + sep + word_len <= self.max_chars {
                    if sep == 1 {
                        buf.push(' ');
                    }
                    buf.push_str(word);
                    buf_len += sep + word_len;
                    continue;
                }

                if buf_len == 0 {
                    // 单词本身超过上限，硬切
                    let split_at = word
                        .char_indices()
                        .nth(self.max_chars)
                        .map_or(word.len(), |(i, _)| i);
                    buf.push_str(&word[..split_at]);
                    buf_len = self.max_chars;
                    let rest = &word[split_at..];
                    if !rest.is_empty() {
                        self.carry = Some(rest);
                    }
                } else {
                    self.carry = Some(word);
                }
                break;
            }

            if buf_len == 0 {
                // 本页已切完
                self.current = None;
                continue;
            }

            let id = self.next_id;
            self.next_id += 1;

            return Some(TextChunk {
                id,
                text: buf,
                pages: PageRange::at_page(page_number),
            });
        }
    }
}
