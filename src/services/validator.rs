//! 题目校验 - 业务能力层
//!
//! 只负责"这道题能不能要"的判断，唯一的状态是本次运行内的去重集合

use std::collections::HashSet;

use tracing::debug;

use crate::config::Config;
use crate::models::{GeneratedQuestion, Rejection, ValidationResult};

/// 校验规则
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationRules {
    /// 题干最小字符数（含）
    pub min_len: usize,
    /// 题干最大字符数（含）
    pub max_len: usize,
    /// 选择题最少选项数
    pub min_options: usize,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            min_len: 20,
            max_len: 600,
            min_options: 4,
        }
    }
}

impl From<&Config> for ValidationRules {
    fn from(config: &Config) -> Self {
        Self {
            min_len: config.min_question_len,
            max_len: config.max_question_len,
            min_options: config.min_options,
        }
    }
}

/// 题目校验器
///
/// 每次运行创建一个，运行结束即丢弃
pub struct QuestionValidator {
    rules: ValidationRules,
    accepted: HashSet<String>,
}

impl QuestionValidator {
    pub fn new(rules: ValidationRules) -> Self {
        Self {
            rules,
            accepted: HashSet::new(),
        }
    }

    /// 校验单道题目
    ///
    /// 依次检查长度、结尾字符、选项、重复；通过的题干记入去重集合
    pub fn validate(&mut self, question: GeneratedQuestion) -> ValidationResult {
        match self.check(&question) {
            Some(reason) => {
                debug!(
                    "[块 {}] 题目未通过: {} | {}",
                    question.source_chunk_id,
                    reason,
                    crate::utils::truncate_text(&question.text, 60)
                );
                ValidationResult::reject(question, reason)
            }
            None => {
                self.accepted.insert(question.text.clone());
                ValidationResult::accept(question)
            }
        }
    }

    /// 按顺序校验一批题目
    pub fn validate_all(
        &mut self,
        questions: impl IntoIterator<Item = GeneratedQuestion>,
    ) -> Vec<ValidationResult> {
        questions.into_iter().map(|q| self.validate(q)).collect()
    }

    /// 已接受的题目数量
    pub fn accepted_count(&self) -> usize {
        self.accepted.len()
    }

    fn check(&self, question: &GeneratedQuestion) -> Option<Rejection> {
        let text = question.text.trim();
        let len = text.chars().count();

        if len < self.rules.min_len {
            return Some(Rejection::TooShort {
                len,
                min: self.rules.min_len,
            });
        }
        if len > self.rules.max_len {
            return Some(Rejection::TooLong {
                len,
                max: self.rules.max_len,
            });
        }

        let terminals = question.question_type.terminal_chars();
        if !text.ends_with(terminals) {
            return Some(Rejection::BadTerminal);
        }

        if question.question_type.has_options() {
            if question.options.len() < self.rules.min_options {
                return Some(Rejection::TooFewOptions {
                    found: question.options.len(),
                    min: self.rules.min_options,
                });
            }
            if let Some(answer) = &question.answer {
                if !answer_in_options(answer, question.options.len()) {
                    return Some(Rejection::AnswerNotInOptions(answer.clone()));
                }
            }
        }

        if self.accepted.contains(&question.text) {
            return Some(Rejection::Duplicate);
        }

        None
    }
}

/// 答案是否为 a.. 范围内的选项字母
fn answer_in_options(answer: &str, option_count: usize) -> bool {
    let mut chars = answer.trim().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => {
            let index = (c.to_ascii_lowercase() as u8 - b'a') as usize;
            index < option_count
        }
        _ => false,
    }
}
