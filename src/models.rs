//! Core data models for the FinGen engine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Persona {
    College,
    School,
    Working,
}

/// The user's primary motivation, chosen during onboarding.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum UserGoal {
    Save,
    Track,
    Learn,
    Invest,
    Rewards,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Theme {
    FoodLover,
    #[default]
    SelfCare,
    Fitness,
    Dark,
    Neon,
    Light,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TxnKind {
    Debit,
    Credit,
}

/// Reward tier, a pure function of cumulative reward points.
///
/// Ordering follows tier rank so level-up detection is a plain comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Level {
    #[default]
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl Level {
    /// Threshold bucket for a running reward total.
    pub fn for_points(points: i64) -> Self {
        if points > 2000 {
            Level::Diamond
        } else if points > 1200 {
            Level::Platinum
        } else if points > 700 {
            Level::Gold
        } else if points > 300 {
            Level::Silver
        } else {
            Level::Bronze
        }
    }

    /// Contribution of the tier to the trust score.
    pub fn trust_bonus(self) -> i64 {
        match self {
            Level::Bronze => 0,
            Level::Silver => 6,
            Level::Gold => 12,
            Level::Platinum => 18,
            Level::Diamond => 25,
        }
    }
}

//
// ================= Profile =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub name: Option<String>,
    pub income: i64,
    pub rent: i64,
    pub food: i64,
    pub transport: i64,
    pub other: i64,
    pub persona: Persona,
    pub goal: UserGoal,
    #[serde(default)]
    pub preferred_savings: Option<i64>,
    #[serde(default)]
    pub monthly_goal: Option<i64>,
    #[serde(default)]
    pub goal_progress: Option<i64>,
}

/// Monthly allocation across the four top-level buckets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BudgetPlan {
    pub essentials: i64,
    pub wants: i64,
    pub savings: i64,
    pub investments: i64,
    #[serde(default)]
    pub overspend_alert: bool,
}

//
// ================= Accounts & Transactions =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BankAccount {
    pub id: Uuid,
    pub name: String,
    /// May go negative; the engine never floors it.
    pub balance: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transaction {
    pub id: Uuid,
    pub kind: TxnKind,
    pub amount: i64,
    pub description: String,
    pub category: String,
    pub date: DateTime<Utc>,
}

/// Input for [`crate::store::AppState::add_transaction`]: the id is
/// generated, category and date fall back to derived/current values.
#[derive(Debug, Clone)]
pub struct TransactionDraft {
    pub kind: TxnKind,
    pub amount: i64,
    pub description: String,
    pub category: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

//
// ================= Learning =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoItem {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub topic: String,
}

#[derive(Debug, Clone)]
pub struct VideoDraft {
    pub title: String,
    pub url: String,
    pub topic: String,
}

//
// ================= Challenges =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub target: i64,
    /// 0-100; callers are responsible for clamping.
    pub progress: i64,
    pub week: u32,
}

#[derive(Debug, Clone)]
pub struct ChallengeDraft {
    pub title: String,
    pub target: i64,
    pub week: u32,
}

//
// ================= Notifications =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

//
// ================= SIP =================
//

/// A declared recurring-investment plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SipPlan {
    pub id: Uuid,
    pub amount: i64,
    /// Day of month, 1-28.
    pub day: u8,
    pub asset: String,
    #[serde(default)]
    pub account_id: Option<Uuid>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SipPlanDraft {
    pub amount: i64,
    pub day: u8,
    pub asset: String,
    pub account_id: Option<Uuid>,
    pub active: bool,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Bronze => "Bronze",
            Level::Silver => "Silver",
            Level::Gold => "Gold",
            Level::Platinum => "Platinum",
            Level::Diamond => "Diamond",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Theme::FoodLover => "FoodLover",
            Theme::SelfCare => "SelfCare",
            Theme::Fitness => "Fitness",
            Theme::Dark => "Dark",
            Theme::Neon => "Neon",
            Theme::Light => "Light",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(Level::for_points(0), Level::Bronze);
        assert_eq!(Level::for_points(300), Level::Bronze);
        assert_eq!(Level::for_points(301), Level::Silver);
        assert_eq!(Level::for_points(700), Level::Silver);
        assert_eq!(Level::for_points(701), Level::Gold);
        assert_eq!(Level::for_points(1200), Level::Gold);
        assert_eq!(Level::for_points(1201), Level::Platinum);
        assert_eq!(Level::for_points(2000), Level::Platinum);
        assert_eq!(Level::for_points(2001), Level::Diamond);
    }

    #[test]
    fn test_level_handles_negative_totals() {
        // Redemption can push the running total below zero.
        assert_eq!(Level::for_points(-50), Level::Bronze);
    }

    #[test]
    fn test_level_rank_ordering() {
        assert!(Level::Silver > Level::Bronze);
        assert!(Level::Diamond > Level::Platinum);
    }

    #[test]
    fn test_trust_bonus_per_tier() {
        assert_eq!(Level::Bronze.trust_bonus(), 0);
        assert_eq!(Level::Silver.trust_bonus(), 6);
        assert_eq!(Level::Gold.trust_bonus(), 12);
        assert_eq!(Level::Platinum.trust_bonus(), 18);
        assert_eq!(Level::Diamond.trust_bonus(), 25);
    }
}
