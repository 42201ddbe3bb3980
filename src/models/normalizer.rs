//! 记录归一化
//!
//! 把一行分隔文本转换为 [`QuestionRecord`]，任何输入都不会失败。

use phf::phf_set;

use super::question::QuestionRecord;

/// 一条记录的逻辑字段数：题干、A、B、C、D、答案、图片、解析
pub const RECORD_FIELDS: usize = 8;

/// 表示"没有图片"的占位值（小写比较）
static IMAGE_SENTINELS: phf::Set<&'static str> = phf_set! {
    "",
    "none",
    "null",
    "nan",
    "undefined",
};

/// 图片字段归一化：占位值返回 None，其余值去掉首尾空白后原样保留
pub fn clean_image(field: &str) -> Option<String> {
    let trimmed = field.trim();
    if IMAGE_SENTINELS.contains(trimmed.to_lowercase().as_str()) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// 按分隔符切分一行
pub fn split_row(line: &str, delimiter: char) -> Vec<String> {
    line.split(delimiter).map(str::to_string).collect()
}

/// 把字段序列归一化为一条记录
///
/// 不足 8 个字段时在右侧补空串，多余字段忽略。
pub fn normalize_fields<S: AsRef<str>>(fields: &[S]) -> QuestionRecord {
    let field = |i: usize| fields.get(i).map(|f| f.as_ref().trim()).unwrap_or("");

    QuestionRecord {
        question: field(0).to_string(),
        a: field(1).to_string(),
        b: field(2).to_string(),
        c: field(3).to_string(),
        d: field(4).to_string(),
        correct: field(5).to_uppercase(),
        image: clean_image(field(6)),
        explanation: field(7).to_string(),
    }
}

/// 第一行题干包含 "question"（不区分大小写）时视为表头
pub fn is_header<S: AsRef<str>>(fields: &[S]) -> bool {
    fields
        .first()
        .map(|f| f.as_ref().to_lowercase().contains("question"))
        .unwrap_or(false)
}

/// 把整份文本归一化为记录列表
///
/// 空白行跳过；若第一行是表头则丢弃。
pub fn normalize_text(content: &str, delimiter: char) -> Vec<QuestionRecord> {
    let rows: Vec<Vec<String>> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| split_row(line, delimiter))
        .collect();

    let skip = match rows.first() {
        Some(first) if is_header(first) => 1,
        _ => 0,
    };

    rows.iter().skip(skip).map(|row| normalize_fields(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_row() {
        let fields = split_row("Quelle est la couleur du ciel ?$Bleu$Vert$Rouge$Jaune$A$$", '$');
        let record = normalize_fields(&fields);

        assert_eq!(record.question, "Quelle est la couleur du ciel ?");
        assert_eq!(record.a, "Bleu");
        assert_eq!(record.b, "Vert");
        assert_eq!(record.c, "Rouge");
        assert_eq!(record.d, "Jaune");
        assert_eq!(record.correct, "A");
        assert_eq!(record.image, None);
        assert_eq!(record.explanation, "");
    }

    #[test]
    fn test_short_rows_are_padded() {
        for count in 6..=8 {
            let fields: Vec<String> = (0..count).map(|i| format!(" f{} ", i)).collect();
            let record = normalize_fields(&fields);
            assert_eq!(record.to_fields().len(), RECORD_FIELDS);
            assert_eq!(record.question, "f0");
            assert_eq!(record.correct, "F5");
        }

        let record = normalize_fields(&["seule question"]);
        assert_eq!(record.question, "seule question");
        assert_eq!(record.a, "");
        assert_eq!(record.correct, "");
        assert_eq!(record.image, None);
    }

    #[test]
    fn test_correct_is_uppercased() {
        let record = normalize_fields(&["q", "a", "b", "c", "d", " b "]);
        assert_eq!(record.correct, "B");
    }

    #[test]
    fn test_image_sentinels() {
        for sentinel in ["", "  ", "none", "None", "NULL", "NaN", "Undefined", " undefined "] {
            assert_eq!(clean_image(sentinel), None, "sentinel: {:?}", sentinel);
        }
        assert_eq!(clean_image("  images/avion.png "), Some("images/avion.png".to_string()));
        assert_eq!(clean_image("nonexistent"), Some("nonexistent".to_string()));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let first = normalize_fields(&split_row(
            " 1.2 Question ? $ un$deux $trois$quatre$c$ NULL $ déjà expliqué ",
            '$',
        ));
        let second = normalize_fields(&split_row(&first.to_row('$'), '$'));
        assert_eq!(first, second);

        let with_image = QuestionRecord {
            image: Some("https://example.org/a.png".to_string()),
            ..first
        };
        let again = normalize_fields(&split_row(&with_image.to_row('$'), '$'));
        assert_eq!(with_image, again);
    }

    #[test]
    fn test_header_is_dropped_only_on_first_row() {
        let content = "Question$A$B$C$D$Correct\n\
                       Q1 ?$a$b$c$d$A\n\
                       \n\
                       Une question piège ?$a$b$c$d$B\n";
        let records = normalize_text(content, '$');
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].question, "Q1 ?");
        assert_eq!(records[1].question, "Une question piège ?");
    }

    #[test]
    fn test_no_header() {
        let records = normalize_text("Q1 ?$a$b$c$d$A", '$');
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].correct_letter(), Some(crate::models::Letter::A));
    }
}
