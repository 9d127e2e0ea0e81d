//! Closed vocabularies shared by server and client.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Sentinel reported as `remainingFreeMessages` when the plan is unlimited.
pub const UNLIMITED_MESSAGES: i64 = -1;

/// Subscription tier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Plan {
    Free,
    Premium,
}

impl Plan {
    pub fn is_premium(self) -> bool {
        self == Plan::Premium
    }

    /// Wire name of the plan.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl TryFrom<String> for Plan {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Reply language requested by the client.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Language {
    He,
    En,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl TryFrom<String> for Language {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// What the user is chatting about.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContextType {
    General,
    GoalSetting,
    MoodAnalysis,
    ProgressReview,
}

impl ContextType {
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

impl TryFrom<String> for ContextType {
    type Error = strum::ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
