//! 模型输出解析
//!
//! 把模型返回的自由文本拆成候选题目。纯函数，不依赖网络，方便单测。

use std::sync::LazyLock;

use regex::Regex;

use crate::models::QuestionType;

static QUESTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:question|q)\s*\d*\s*[:.)：]\s*(.*)$").expect("题干正则无效")
});

static NUMBERED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{1,3}[.)]\s+(.+)$").expect("编号正则无效"));

static OPTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?([a-hA-H])[).:]\s*(.+)$").expect("选项正则无效")
});

static ANSWER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:correct\s+answer|answer)\s*[:：]\s*(.+)$").expect("答案正则无效")
});

/// 只认单独的字母标签（`b` `(c)` `D.`）或 `A) 选项内容`，`E. coli` 这类答案原样保留
static ANSWER_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?([a-hA-H])(?:\)?[.:]?$|\)\s+\S)").expect("答案标签正则无效")
});

/// 解析出的候选题目
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParsedQuestion {
    /// 题干
    pub text: String,
    /// 选项内容（不含 a) b) 标签）
    pub options: Vec<String>,
    /// 答案原文（去掉首尾空白）
    pub answer: Option<String>,
}

/// 解析过程中的候选题目
#[derive(Default)]
struct Candidate {
    question: ParsedQuestion,
    /// 是否由 "Question:" 或编号明确开头
    explicit: bool,
}

impl Candidate {
    fn is_open(&self) -> bool {
        self.question.options.is_empty() && self.question.answer.is_none()
    }

    fn append_text(&mut self, line: &str) {
        if !self.question.text.is_empty() {
            self.question.text.push(' ');
        }
        self.question.text.push_str(line);
    }
}

/// 按行拆分模型输出，返回按出现顺序排列的候选题目
///
/// 识别规则：
/// - `Question:` / `Q1.` / `1.` 开头的行开始一道新题
/// - `a)` `B.` `(c)` 开头的行是选项
/// - `Correct Answer:` / `Answer:` 开头的行是答案
/// - 已有选项或答案时，以 `?` 结尾的行开始一道新题
/// - 代码块标记和 `[FORMAT]` 这类提示词段落标题被忽略
pub fn parse_questions(raw: &str) -> Vec<ParsedQuestion> {
    let mut results = Vec::new();
    let mut current: Option<Candidate> = None;

    for raw_line in raw.lines() {
        let cleaned = raw_line.replace("**", "");
        let line = cleaned.trim();

        if line.is_empty() || line.starts_with("```") || is_section_header(line) {
            continue;
        }

        if let Some(caps) = ANSWER_RE.captures(line) {
            if let Some(candidate) = current.as_mut() {
                candidate.question.answer = Some(caps[1].trim().to_string());
            }
            continue;
        }

        if let Some(caps) = QUESTION_RE.captures(line) {
            start_new(&mut results, &mut current, &caps[1], true);
            continue;
        }

        if let Some(caps) = OPTION_RE.captures(line) {
            if let Some(candidate) = current.as_mut() {
                if candidate.question.answer.is_none() {
                    candidate.question.options.push(caps[2].trim().to_string());
                    continue;
                }
            }
        }

        if let Some(caps) = NUMBERED_RE.captures(line) {
            start_new(&mut results, &mut current, &caps[1], true);
            continue;
        }

        match current.as_mut() {
            Some(candidate) if candidate.is_open() => candidate.append_text(line),
            Some(_) if ends_with_question_mark(line) => {
                start_new(&mut results, &mut current, line, false);
            }
            Some(_) => {}
            None => start_new(&mut results, &mut current, line, false),
        }
    }

    if let Some(candidate) = current.take() {
        finish(&mut results, candidate);
    }

    results
}

fn start_new(
    results: &mut Vec<ParsedQuestion>,
    current: &mut Option<Candidate>,
    text: &str,
    explicit: bool,
) {
    if let Some(previous) = current.take() {
        // 明确的题干出现前，没有结构的文字只是开场白
        let is_preamble = explicit && !previous.explicit && previous.is_open();
        if !is_preamble {
            finish(results, previous);
        }
    }

    *current = Some(Candidate {
        question: ParsedQuestion {
            text: text.trim().to_string(),
            ..Default::default()
        },
        explicit,
    });
}

fn finish(results: &mut Vec<ParsedQuestion>, candidate: Candidate) {
    if !candidate.question.text.trim().is_empty() {
        results.push(candidate.question);
    }
}

fn is_section_header(line: &str) -> bool {
    line.starts_with('[') && line.ends_with(']') && !line.contains(' ')
}

fn ends_with_question_mark(line: &str) -> bool {
    line.ends_with('?') || line.ends_with('？')
}

/// 选择题的答案统一为小写选项字母，其他题型保留原文
pub fn normalize_answer(raw: &str, question_type: QuestionType) -> String {
    let answer = raw.trim();
    if !question_type.has_options() {
        return answer.to_string();
    }
    match ANSWER_LABEL_RE.captures(answer) {
        Some(caps) => caps[1].to_ascii_lowercase(),
        None => answer.to_string(),
    }
}
