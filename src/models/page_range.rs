//! 页码范围

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// 闭区间页码范围（从 1 开始）
///
/// 只能通过 [`PageRange::new`] 构造，保证 `1 <= start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRange {
    start: u32,
    end: u32,
}

impl PageRange {
    /// 创建页码范围
    pub fn new(start: u32, end: u32) -> Result<Self, ConfigError> {
        if start == 0 {
            return Err(ConfigError::InvalidPageRange(format!(
                "起始页必须从 1 开始 (收到 {})",
                start
            )));
        }
        if end < start {
            return Err(ConfigError::InvalidPageRange(format!(
                "结束页 {} 小于起始页 {}",
                end, start
            )));
        }
        Ok(Self { start, end })
    }

    /// 单页范围
    pub fn single(page: u32) -> Result<Self, ConfigError> {
        Self::new(page, page)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// 单页范围，页码 0 视为第 1 页
    pub(crate) fn at_page(page: u32) -> Self {
        let page = page.max(1);
        Self {
            start: page,
            end: page,
        }
    }

    /// 范围内的页数
    pub fn len(&self) -> usize {
        (self.end - self.start + 1) as usize
    }

    /// 范围永远不为空
    pub fn is_empty(&self) -> bool {
        false
    }

    /// 按升序遍历页码
    pub fn pages(&self) -> impl Iterator<Item = u32> {
        self.start..=self.end
    }
}

impl fmt::Display for PageRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}-{}", self.start, self.end)
        }
    }
}

impl FromStr for PageRange {
    type Err = ConfigError;

    /// 支持 `"3-7"` 和 `"5"` 两种写法
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| ConfigError::InvalidPageRange(format!("无法解析页码: '{}'", s)))
        };

        match s.split_once('-') {
            Some((start, end)) => Self::new(parse(start)?, parse(end)?),
            None => Self::single(parse(s)?),
        }
    }
}
