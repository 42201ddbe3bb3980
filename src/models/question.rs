use serde::{Deserialize, Serialize};
use std::fmt;

/// 选项字母
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Letter {
    A,
    B,
    C,
    D,
}

impl Letter {
    pub const ALL: [Letter; 4] = [Letter::A, Letter::B, Letter::C, Letter::D];

    /// 从单个字母解析，只接受完全等于 A/B/C/D 的值
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "A" => Some(Letter::A),
            "B" => Some(Letter::B),
            "C" => Some(Letter::C),
            "D" => Some(Letter::D),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Letter::A => 'A',
            Letter::B => 'B',
            Letter::C => 'C',
            Letter::D => 'D',
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// 一道选择题（QCM）
///
/// JSON 输出的字段顺序与分隔文件的列顺序一致：
/// `question, a, b, c, d, correct, image, explanation`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
    /// 大写后的正确答案字段，可能为空或非法
    pub correct: String,
    /// 图片引用，占位值一律归一化为 None
    pub image: Option<String>,
    /// 解析，未生成前为空
    pub explanation: String,
}

impl QuestionRecord {
    /// 解析后的正确答案字母
    pub fn correct_letter(&self) -> Option<Letter> {
        Letter::parse(&self.correct)
    }

    /// 取对应字母的选项文本
    pub fn option(&self, letter: Letter) -> &str {
        match letter {
            Letter::A => &self.a,
            Letter::B => &self.b,
            Letter::C => &self.c,
            Letter::D => &self.d,
        }
    }

    /// 按列顺序输出 8 个字段
    pub fn to_fields(&self) -> [&str; 8] {
        [
            &self.question,
            &self.a,
            &self.b,
            &self.c,
            &self.d,
            &self.correct,
            self.image.as_deref().unwrap_or(""),
            &self.explanation,
        ]
    }

    /// 序列化为一行分隔文本（不含换行符）
    ///
    /// 字段内部出现的分隔符和换行会被替换为空格，保证整行可以被重新切分。
    pub fn to_row(&self, delimiter: char) -> String {
        self.to_fields()
            .iter()
            .map(|field| sanitize_field(field, delimiter))
            .collect::<Vec<_>>()
            .join(&delimiter.to_string())
    }
}

fn sanitize_field(field: &str, delimiter: char) -> String {
    field
        .chars()
        .map(|c| if c == delimiter || c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

/// 从考试文本中提取出的题目（尚未标注答案）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedQuestion {
    /// 带编号的题干，例如 "1.1 ..."
    pub stem: String,
    pub options: [String; 4],
}

impl ExtractedQuestion {
    /// 输出 6 列：题干、A、B、C、D、空的答案列
    pub fn to_row(&self, delimiter: char) -> String {
        let mut fields: Vec<String> = Vec::with_capacity(6);
        fields.push(sanitize_field(&self.stem, delimiter));
        fields.extend(self.options.iter().map(|o| sanitize_field(o, delimiter)));
        fields.push(String::new());
        fields.join(&delimiter.to_string())
    }
}
