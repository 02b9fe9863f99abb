//! Localized section headings and cleanup for study notes.

use regex::Regex;
use std::sync::OnceLock;

/// The four section headings of a notes document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteHeadings {
    pub key_topics: &'static str,
    pub main_takeaways: &'static str,
    pub detailed_insights: &'static str,
    pub actionable_steps: &'static str,
}

const ENGLISH: NoteHeadings = NoteHeadings {
    key_topics: "Key Topics",
    main_takeaways: "Main Takeaways",
    detailed_insights: "Detailed Insights",
    actionable_steps: "Actionable Steps",
};

impl NoteHeadings {
    /// Headings for a language given by English name (case-insensitive).
    ///
    /// Unknown languages get the English headings.
    pub fn for_language(language: &str) -> Self {
        match language.trim().to_lowercase().as_str() {
            "russian" => NoteHeadings {
                key_topics: "Ключевые темы",
                main_takeaways: "Основные выводы",
                detailed_insights: "Подробный анализ",
                actionable_steps: "Действия",
            },
            "chinese" => NoteHeadings {
                key_topics: "关键主题",
                main_takeaways: "主要要点",
                detailed_insights: "详细见解",
                actionable_steps: "可行步骤",
            },
            "japanese" => NoteHeadings {
                key_topics: "主なトピック",
                main_takeaways: "重要なポイント",
                detailed_insights: "詳細な洞察",
                actionable_steps: "実行可能なステップ",
            },
            "korean" => NoteHeadings {
                key_topics: "주요 주제",
                main_takeaways: "주요 요점",
                detailed_insights: "상세 분석",
                actionable_steps: "실행 가능한 단계",
            },
            "hindi" => NoteHeadings {
                key_topics: "मुख्य विषय",
                main_takeaways: "मुख्य बातें",
                detailed_insights: "विस्तृत जानकारी",
                actionable_steps: "कार्रवाई योग्य कदम",
            },
            "arabic" => NoteHeadings {
                key_topics: "المواضيع الرئيسية",
                main_takeaways: "النقاط الأساسية",
                detailed_insights: "رؤى مفصلة",
                actionable_steps: "خطوات قابلة للتنفيذ",
            },
            "tamil" => NoteHeadings {
                key_topics: "முக்கிய தலைப்புகள்",
                main_takeaways: "முக்கிய புள்ளிகள்",
                detailed_insights: "விரிவான நுண்ணறிவுகள்",
                actionable_steps: "செயல்படுத்தக்கூடிய படிகள்",
            },
            "french" => NoteHeadings {
                key_topics: "Sujets Clés",
                main_takeaways: "Points Principaux",
                detailed_insights: "Analyses Détaillées",
                actionable_steps: "Actions à Entreprendre",
            },
            "spanish" => NoteHeadings {
                key_topics: "Temas Clave",
                main_takeaways: "Conclusiones Principales",
                detailed_insights: "Análisis Detallado",
                actionable_steps: "Pasos a Seguir",
            },
            "german" => NoteHeadings {
                key_topics: "Hauptthemen",
                main_takeaways: "Wichtigste Erkenntnisse",
                detailed_insights: "Detaillierte Einblicke",
                actionable_steps: "Handlungsschritte",
            },
            "portuguese" => NoteHeadings {
                key_topics: "Tópicos Principais",
                main_takeaways: "Conclusões Principais",
                detailed_insights: "Insights Detalhados",
                actionable_steps: "Passos Acionáveis",
            },
            "italian" => NoteHeadings {
                key_topics: "Argomenti Chiave",
                main_takeaways: "Conclusioni Principali",
                detailed_insights: "Approfondimenti Dettagliati",
                actionable_steps: "Passi da Seguire",
            },
            "dutch" => NoteHeadings {
                key_topics: "Belangrijkste Onderwerpen",
                main_takeaways: "Belangrijkste Conclusies",
                detailed_insights: "Gedetailleerde Inzichten",
                actionable_steps: "Actiestappen",
            },
            _ => ENGLISH,
        }
    }
}

/// Languages offered for notes and translation.
pub const SUPPORTED_LANGUAGES: &[&str] = &[
    "English",
    "French",
    "Spanish",
    "German",
    "Italian",
    "Portuguese",
    "Dutch",
    "Russian",
    "Chinese",
    "Japanese",
    "Korean",
    "Arabic",
    "Hindi",
    "Tamil",
];

/// Collapse runs of blank lines to a single blank line and trim.
pub fn tidy_notes(notes: &str) -> String {
    static BLANK_RUNS: OnceLock<Regex> = OnceLock::new();
    let re = BLANK_RUNS.get_or_init(|| Regex::new(r"\n\s*\n").expect("Invalid regex"));
    re.replace_all(notes, "\n\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_languages() {
        assert_eq!(NoteHeadings::for_language("French").key_topics, "Sujets Clés");
        assert_eq!(NoteHeadings::for_language("german").actionable_steps, "Handlungsschritte");
        assert_eq!(NoteHeadings::for_language(" Japanese ").main_takeaways, "重要なポイント");
    }

    #[test]
    fn test_unknown_language_falls_back_to_english() {
        assert_eq!(NoteHeadings::for_language("Klingon"), ENGLISH);
        assert_eq!(NoteHeadings::for_language(""), ENGLISH);
    }

    #[test]
    fn test_every_supported_language_has_headings() {
        for language in SUPPORTED_LANGUAGES {
            let headings = NoteHeadings::for_language(language);
            if *language != "English" {
                assert_ne!(headings, ENGLISH, "{}", language);
            }
        }
    }

    #[test]
    fn test_tidy_notes_collapses_blank_runs() {
        let raw = "\n## Topics\n\n\n\n- one\n  \n \n- two\n\n";
        assert_eq!(tidy_notes(raw), "## Topics\n\n- one\n\n- two");
    }
}
