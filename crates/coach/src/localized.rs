//! User-facing strings returned by the pipeline.

use coach_core::Language;

/// Message shown when the free quota is used up.
pub fn quota_reached(language: Language, limit: i64) -> String {
    match language {
        Language::He => format!(
            "הגעת למגבלת {} ההודעות בחינם. שדרג לפרימיום למסרים ללא הגבלה.",
            limit
        ),
        Language::En => format!(
            "You have reached your free tier limit of {} messages. Upgrade to Premium for unlimited messages.",
            limit
        ),
    }
}

/// Message shown when the provider thread had to be discarded.
pub fn thread_expired(language: Language) -> &'static str {
    match language {
        Language::He => "פג תוקף השיחה שלך. אנא נסה שוב.",
        Language::En => "Your conversation session expired. Please try again.",
    }
}

/// Tag prepended to every submitted message so the assistant answers in the
/// requested language.
pub fn language_tag(language: Language) -> &'static str {
    match language {
        Language::He => "[שפה: עברית]",
        Language::En => "[Language: English]",
    }
}
