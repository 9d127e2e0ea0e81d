//! SMART goal suggestions for a life area.

use std::sync::Arc;

use coach_core::wire::{GoalSuggestion, GoalSuggestionRequest, GoalSuggestionResponse, LifeAreaSummary};
use coach_core::{CompletionProvider, CompletionRequest, Language};
use database::{goal, life_area, Database, DatabaseError};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ChatError, Result};

/// Suggestions returned when the request does not say.
pub const DEFAULT_SUGGESTION_COUNT: u32 = 3;

/// Upper bound on suggestions per request.
pub const MAX_SUGGESTION_COUNT: u32 = 10;

/// Score assumed when the user never rated the area.
pub const DEFAULT_BASELINE_SCORE: i64 = 5;

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1000;

#[derive(Debug, Deserialize)]
struct SuggestionEnvelope {
    #[serde(default)]
    suggestions: Vec<GoalSuggestion>,
}

/// Everything the prompt is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PromptInput<'a> {
    area_name: &'a str,
    area_description: &'a str,
    baseline_score: i64,
    existing_goals: String,
    count: u32,
}

fn system_prompt(language: Language) -> &'static str {
    match language {
        Language::He => "אתה יועץ רווחה מקצועי המומחה ביצירת יעדים SMART. תמיד תחזיר JSON תקני.",
        Language::En => "You are a professional wellness advisor specializing in SMART goal creation. Always return valid JSON.",
    }
}

fn user_prompt(language: Language, input: &PromptInput<'_>) -> String {
    match language {
        Language::He => format!(
            r#"אתה יועץ רווחה מקצועי. המשתמש רוצה לשפר את תחום החיים "{name}".
תיאור התחום: {description}
ציון בסיס נוכחי: {score}/10
יעדים קיימים: {existing}

צור {count} הצעות יעדים SMART (ספציפיים, מדידים, ברי-השגה, רלוונטיים, ממוקדי-זמן) לתחום זה.

כל יעד צריך להיות:
- ספציפי ומדיד
- מאתגר אך בר-השגה
- משתלב עם תחום החיים
- שונה מהיעדים הקיימים

החזר JSON בפורמט הבא (בלבד, ללא טקסט נוסף):
{{
  "suggestions": [
    {{
      "title": "כותרת היעד",
      "description": "תיאור מפורט",
      "timeframe": "מסגרת זמן (למשל: 30 ימים)"
    }}
  ]
}}"#,
            name = input.area_name,
            description = input.area_description,
            score = input.baseline_score,
            existing = input.existing_goals,
            count = input.count,
        ),
        Language::En => format!(
            r#"You are a professional wellness advisor. The user wants to improve their "{name}" life area.
Area description: {description}
Current baseline score: {score}/10
Existing goals: {existing}

Create {count} SMART goal suggestions (Specific, Measurable, Achievable, Relevant, Time-bound) for this area.

Each goal should be:
- Specific and measurable
- Challenging but achievable
- Aligned with the life area
- Different from existing goals

Return JSON in this format (only, no additional text):
{{
  "suggestions": [
    {{
      "title": "Goal title",
      "description": "Detailed description",
      "timeframe": "Time frame (e.g., 30 days)"
    }}
  ]
}}"#,
            name = input.area_name,
            description = input.area_description,
            score = input.baseline_score,
            existing = input.existing_goals,
            count = input.count,
        ),
    }
}

/// Pull the JSON object out of a model answer.
///
/// Prefers the body of a fenced code block; otherwise spans from the first
/// `{` to the last `}`. Returns the trimmed input when no braces are found.
pub fn extract_json(text: &str) -> &str {
    let scope = fenced_body(text).unwrap_or(text);
    match (scope.find('{'), scope.rfind('}')) {
        (Some(start), Some(end)) if start < end => &scope[start..=end],
        _ => text.trim(),
    }
}

fn fenced_body(text: &str) -> Option<&str> {
    let open = text.find("```")?;
    let after = &text[open + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let close = after.find("```")?;
    Some(&after[..close])
}

/// Parse a model answer into suggestions.
pub fn parse_suggestions(text: &str) -> Result<Vec<GoalSuggestion>> {
    serde_json::from_str::<SuggestionEnvelope>(extract_json(text))
        .map(|envelope| envelope.suggestions)
        .map_err(|e| {
            warn!(error = %e, "Model returned unparseable suggestions");
            ChatError::UnparseableReply(text.to_string())
        })
}

/// Generates goal suggestions from the user's standing in a life area.
///
/// Does not touch the chat quota.
#[derive(Clone)]
pub struct GoalSuggester {
    db: Database,
    completions: Arc<dyn CompletionProvider>,
}

impl GoalSuggester {
    pub fn new(db: Database, completions: Arc<dyn CompletionProvider>) -> Self {
        Self { db, completions }
    }

    pub async fn suggest(
        &self,
        user_id: &str,
        request: &GoalSuggestionRequest,
    ) -> Result<GoalSuggestionResponse> {
        if request.life_area_id.trim().is_empty() {
            return Err(ChatError::InvalidRequest(
                "Missing required fields: lifeAreaId, language".to_string(),
            ));
        }

        let area = match life_area::get_life_area(self.db.pool(), &request.life_area_id).await {
            Ok(area) => area,
            Err(DatabaseError::NotFound { .. }) => {
                return Err(ChatError::NotFound("Life area not found".to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let baseline_score = life_area::get_score(self.db.pool(), user_id, &area.id)
            .await?
            .and_then(|score| {
                score
                    .baseline_score
                    .filter(|s| *s > 0)
                    .or(score.current_score.filter(|s| *s > 0))
            })
            .unwrap_or(DEFAULT_BASELINE_SCORE);

        let titles = goal::active_goal_titles(self.db.pool(), user_id, &area.id).await?;
        let existing_goals = if titles.is_empty() {
            "None".to_string()
        } else {
            titles.join(", ")
        };

        let count = request
            .count
            .unwrap_or(DEFAULT_SUGGESTION_COUNT)
            .clamp(1, MAX_SUGGESTION_COUNT);

        let language = request.language;
        let area_name = area.name(language);
        let input = PromptInput {
            area_name,
            area_description: area.description(language).unwrap_or_default(),
            baseline_score,
            existing_goals,
            count,
        };

        let completion = CompletionRequest::new(system_prompt(language), user_prompt(language, &input))
            .temperature(TEMPERATURE)
            .max_tokens(MAX_TOKENS);
        let answer = self.completions.complete(completion).await?;
        let suggestions = parse_suggestions(&answer)?;

        info!(
            user_id,
            life_area_id = %area.id,
            requested = count,
            returned = suggestions.len(),
            "Generated goal suggestions"
        );

        Ok(GoalSuggestionResponse {
            suggestions,
            life_area: LifeAreaSummary {
                id: area.id.clone(),
                name: area_name.to_string(),
                baseline_score,
            },
        })
    }
}

impl std::fmt::Debug for GoalSuggester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoalSuggester").finish_non_exhaustive()
    }
}
