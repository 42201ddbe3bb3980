//! Prompt 构建 - 业务能力层
//!
//! 只负责根据题目和正确答案生成 prompt，不调用 LLM

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;
use crate::models::question::QuestionRecord;

/// Prompt 版本
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PromptVariant {
    /// 中性、简洁
    #[default]
    V1,
    /// 带角色设定（航空教员），更偏教学
    V2,
}

impl PromptVariant {
    pub const ALL: [PromptVariant; 2] = [PromptVariant::V1, PromptVariant::V2];

    pub fn token(self) -> &'static str {
        match self {
            PromptVariant::V1 => "V1",
            PromptVariant::V2 => "V2",
        }
    }

    /// 用题干和正确答案文本渲染 prompt
    pub fn render(self, question: &str, answer: &str) -> String {
        match self {
            PromptVariant::V1 => format!(
                "Explique de manière scientifique et précise, en 2 à 3 phrases adaptées au niveau d'un élève de 3e, \
                 pourquoi la réponse suivante est correcte : \
                 Question : {question} \
                 Réponse correcte : {answer} \
                 Ta réponse ne doit contenir que l'explication, sans retour à la ligne ni remarque supplémentaire."
            ),
            PromptVariant::V2 => format!(
                "Tu es un professeur en aéronautique chargé d'aider un élève de 3e qui prépare le Brevet d’Initiation Aéronautique (BIA). \
                 Explique en 2 à 3 phrases pourquoi la réponse suivante est scientifiquement correcte, en utilisant les termes techniques vus dans le cadre du BIA \
                 et adaptés à un jeune public, et en vulgarisant si nécessaire. \
                 L’explication doit être concise, rigoureuse, sans retour à la ligne, sans reformuler la question ni mentionner les mauvaises réponses. \
                 Voici la question et sa bonne réponse :\n\
                 Question : {question}\n\
                 Bonne réponse : {answer}\n\
                 Réponds uniquement par l’explication finale à afficher dans un QCM en ligne."
            ),
        }
    }
}

impl fmt::Display for PromptVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for PromptVariant {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "V1" => Ok(PromptVariant::V1),
            "V2" => Ok(PromptVariant::V2),
            other => Err(AppError::invalid_value("prompt_variant", other, "V1, V2")),
        }
    }
}

/// 构建一道题的 prompt
///
/// 正确答案不是 A/B/C/D、题干为空或答案文本为空时返回 None，
/// 此时不应调用 LLM。
pub fn build_prompt(record: &QuestionRecord, variant: PromptVariant) -> Option<String> {
    let letter = record.correct_letter()?;
    let question = record.question.trim();
    let answer = record.option(letter).trim();

    if question.is_empty() || answer.is_empty() {
        return None;
    }

    Some(variant.render(question, answer))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(correct: &str) -> QuestionRecord {
        QuestionRecord {
            question: "Quelle est la couleur du ciel ?".to_string(),
            a: "Bleu".to_string(),
            b: "Vert".to_string(),
            c: "".to_string(),
            d: "Jaune".to_string(),
            correct: correct.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_v1_embeds_question_and_answer() {
        let prompt = build_prompt(&record("A"), PromptVariant::V1).unwrap();
        assert!(prompt.contains("Question : Quelle est la couleur du ciel ?"));
        assert!(prompt.contains("Réponse correcte : Bleu"));
        assert!(!prompt.contains('\n'));
    }

    #[test]
    fn test_v2_is_role_framed() {
        let prompt = build_prompt(&record("B"), PromptVariant::V2).unwrap();
        assert!(prompt.starts_with("Tu es un professeur en aéronautique"));
        assert!(prompt.contains("sans reformuler la question ni mentionner les mauvaises réponses"));
        assert!(prompt.contains("Bonne réponse : Vert"));
    }

    #[test]
    fn test_invalid_letter_gives_no_prompt() {
        for correct in ["", "E", "AB", "a"] {
            assert!(build_prompt(&record(correct), PromptVariant::V1).is_none());
        }
    }

    #[test]
    fn test_empty_answer_or_question_gives_no_prompt() {
        // C 选项为空
        assert!(build_prompt(&record("C"), PromptVariant::V1).is_none());

        let mut blank = record("A");
        blank.question = "   ".to_string();
        assert!(build_prompt(&blank, PromptVariant::V2).is_none());
    }

    #[test]
    fn test_variant_token_round_trip() {
        assert_eq!("v2".parse::<PromptVariant>().unwrap(), PromptVariant::V2);
        assert_eq!(" V1 ".parse::<PromptVariant>().unwrap(), PromptVariant::V1);
        assert!("V3".parse::<PromptVariant>().is_err());
        assert_eq!(PromptVariant::V2.to_string(), "V2");
    }
}
