//! Rule-based advice engines
//!
//! Pure functions over profile, plan, and transaction data: the budget
//! recommendation used by the budget wizard, SIP sizing and future-value
//! arithmetic, bill splitting, the coach's canned replies, and the playful
//! spending insights. No state, no side effects; the caller feeds results
//! back into the engine if the user accepts them.

use crate::models::{BudgetPlan, Profile, Transaction, TxnKind};

/// How many recent transactions the budget wizard looks at.
const RECENT_WINDOW: usize = 30;

fn clamp_round(value: f64) -> i64 {
    value.round().max(0.0) as i64
}

//
// ================= Spend totals =================
//

/// Debit totals per wizard category over the recent window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpendTotals {
    pub food: i64,
    pub rent: i64,
    pub transport: i64,
    pub self_care: i64,
    pub gym: i64,
    pub shopping: i64,
    pub misc: i64,
}

impl SpendTotals {
    /// Fold the newest transactions (debits only) into per-category
    /// totals; categories outside the wizard's vocabulary land in misc.
    pub fn from_recent<'a>(transactions: impl Iterator<Item = &'a Transaction>) -> Self {
        let mut totals = Self::default();
        for tx in transactions.take(RECENT_WINDOW) {
            if tx.kind != TxnKind::Debit {
                continue;
            }
            match tx.category.as_str() {
                "Food" => totals.food += tx.amount,
                "Rent" => totals.rent += tx.amount,
                "Transport" => totals.transport += tx.amount,
                "Self-care" => totals.self_care += tx.amount,
                "Gym" => totals.gym += tx.amount,
                "Shopping" => totals.shopping += tx.amount,
                _ => totals.misc += tx.amount,
            }
        }
        totals
    }
}

//
// ================= Budget recommendation =================
//

/// Per-category monthly allocation proposed by the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BudgetRecommendation {
    pub rent: i64,
    pub food: i64,
    pub transport: i64,
    pub self_care: i64,
    pub gym: i64,
    pub shopping: i64,
    pub misc: i64,
    pub savings: i64,
    pub invest: i64,
}

impl BudgetRecommendation {
    /// Fold the recommendation into the four-bucket plan the engine
    /// stores. The wizard path never raises the overspend alert.
    pub fn into_plan(self) -> BudgetPlan {
        BudgetPlan {
            essentials: self.rent
                + self.food
                + self.transport
                + self.misc
                + self.self_care
                + self.gym,
            wants: self.shopping,
            savings: self.savings,
            investments: self.invest,
            overspend_alert: false,
        }
    }
}

/// Recommend a monthly allocation from the profile's fixed costs and
/// recent spending.
///
/// Baselines are income percentages unless the profile supplies a figure;
/// a category that was overspent recently is bumped 10% with a 5% trim
/// elsewhere, and the whole allocation is scaled down to the income
/// ceiling when it overshoots.
pub fn recommend_budget(profile: Option<&Profile>, recent: &SpendTotals) -> BudgetRecommendation {
    let income = profile.map_or(0, |p| p.income) as f64;
    let fixed = |value: Option<i64>, share: f64| match value {
        Some(v) if v > 0 => v as f64,
        _ => income * share,
    };

    let rent = clamp_round(fixed(profile.map(|p| p.rent), 0.3));
    let mut food = clamp_round(fixed(profile.map(|p| p.food), 0.15));
    let mut transport = clamp_round(fixed(profile.map(|p| p.transport), 0.1));
    let self_care = clamp_round(income * 0.05);
    let gym = clamp_round(income * 0.05);
    let mut shopping = clamp_round(income * 0.1);
    let mut misc = clamp_round(income * 0.05);
    let savings = clamp_round(income * 0.15);
    let invest = clamp_round(income * 0.05);

    // Adaptive nudges: recent overspend bumps the category and trims a
    // discretionary one.
    if recent.food > food {
        food = clamp_round(food as f64 * 1.1);
        shopping = clamp_round(shopping as f64 * 0.95);
    }
    if recent.transport > transport {
        transport = clamp_round(transport as f64 * 1.1);
        misc = clamp_round(misc as f64 * 0.95);
    }

    let mut rec = BudgetRecommendation {
        rent,
        food,
        transport,
        self_care,
        gym,
        shopping,
        misc,
        savings,
        invest,
    };

    let total = rec.rent
        + rec.food
        + rec.transport
        + rec.self_care
        + rec.gym
        + rec.shopping
        + rec.misc
        + rec.savings
        + rec.invest;
    if total as f64 > income && income > 0.0 {
        let scale = income / total as f64;
        rec.rent = clamp_round(rec.rent as f64 * scale);
        rec.food = clamp_round(rec.food as f64 * scale);
        rec.transport = clamp_round(rec.transport as f64 * scale);
        rec.self_care = clamp_round(rec.self_care as f64 * scale);
        rec.gym = clamp_round(rec.gym as f64 * scale);
        rec.shopping = clamp_round(rec.shopping as f64 * scale);
        rec.misc = clamp_round(rec.misc as f64 * scale);
        rec.savings = clamp_round(rec.savings as f64 * scale);
        rec.invest = clamp_round(rec.invest as f64 * scale);
    }

    rec
}

/// Build a four-bucket plan directly from planner inputs. This is the
/// producer of the overspend alert: essentials above half of income.
pub fn build_budget_plan(
    income: i64,
    rent: i64,
    food: i64,
    transport: i64,
    misc: i64,
    savings: i64,
) -> BudgetPlan {
    let base = income.max(0);
    let investments = clamp_round(base as f64 * 0.1);
    let essentials = (rent + food + transport + misc).max(0);
    let wants = (base - (essentials + savings + investments)).max(0);
    let overspend_alert = essentials > clamp_round(base as f64 * 0.5);

    BudgetPlan {
        essentials,
        wants,
        savings,
        investments,
        overspend_alert,
    }
}

//
// ================= SIP sizing & arithmetic =================
//

/// Future value of a monthly SIP contribution (annuity due), rounded to
/// whole rupees.
pub fn sip_future_value(monthly: i64, months: u32, annual_rate_pct: f64) -> i64 {
    let r = annual_rate_pct / 100.0 / 12.0;
    if r == 0.0 {
        return monthly * i64::from(months);
    }
    let growth = (1.0 + r).powi(months as i32);
    clamp_round(monthly as f64 * ((growth - 1.0) / r) * (1.0 + r))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SipRecommendation {
    pub recommended: i64,
    pub aggressive: i64,
    pub conservative: i64,
}

/// Size a monthly SIP from planned savings, scaled up as the user's
/// financial literacy (videos watched) grows.
pub fn recommend_sip(savings: i64, videos_watched: usize) -> SipRecommendation {
    let literacy = (1.0 + videos_watched as f64 / 20.0).min(1.4);
    let recommended = clamp_round(savings as f64 * 0.25 * literacy).max(100);

    SipRecommendation {
        recommended,
        aggressive: clamp_round(recommended as f64 * 1.2).max(10),
        conservative: clamp_round(recommended as f64 * 0.8).max(10),
    }
}

//
// ================= Investment recommendation =================
//

#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentRecommendation {
    pub remaining: i64,
    pub saved: i64,
    pub recommended: i64,
    pub tip: String,
}

/// Recommend a safe monthly investment from what's left after essentials.
pub fn recommend_investment(
    profile: Option<&Profile>,
    plan: Option<&BudgetPlan>,
) -> InvestmentRecommendation {
    let income = profile.map_or(0, |p| p.income);
    let essentials = profile.map_or(0, |p| p.rent + p.food + p.transport + p.other);
    let remaining = (income - essentials).max(0);
    let saved = plan
        .map(|p| p.savings)
        .unwrap_or_else(|| clamp_round(remaining as f64 * 0.5));
    let recommended = clamp_round(saved as f64 * 0.3);

    let tip = if remaining < saved {
        "Expenses high! Reduce investments temporarily.".to_string()
    } else {
        format!(
            "You are saving {} -> Invest {} safely.",
            saved, recommended
        )
    };

    InvestmentRecommendation {
        remaining,
        saved,
        recommended,
        tip,
    }
}

//
// ================= Bill splitting =================
//

/// Per-head share of a shared bill, rounded up so the bill is always
/// covered. Zero participants owe nothing.
pub fn split_bill(total: i64, participants: usize) -> i64 {
    if participants == 0 {
        return 0;
    }
    let n = participants as i64;
    (total + n - 1) / n
}

//
// ================= Coach =================
//

/// Canned coach replies, keyed by the first matching topic keyword.
pub fn coach_reply(question: &str) -> &'static str {
    let q = question.to_lowercase();

    if q.contains("credit card") {
        "Credit cards are useful if paid in full monthly. Keep utilization under 30%."
    } else if q.contains("reduce spending") {
        "Track expenses daily, set a weekly cap, cook at home, avoid impulse buys."
    } else if q.contains("goal") || q.contains("phone") {
        "For a 4-month goal, divide price by 4 and save that amount monthly. Add a 10% buffer."
    } else if q.contains("savings") {
        "Aim to save 20-30% of income. Automate transfers on payday."
    } else if q.contains("invest") {
        "Start small SIPs (100-500). Prefer index funds for beginners. Keep an emergency fund separate."
    } else {
        "Ask me about budgeting, savings, investing, or goals."
    }
}

//
// ================= Spending insights =================
//

/// One playful nudge derived from recent spending. `seed` selects the
/// template deterministically; callers rotate it however they like.
pub fn spending_insight(profile: Option<&Profile>, totals: &SpendTotals, seed: usize) -> String {
    let income = profile.map_or(0, |p| p.income).max(1);
    let rent = profile.map_or(0, |p| p.rent);

    match seed % 4 {
        0 => format!(
            "You spent {} on food vs {} on gym. Fitness or food?",
            totals.food, totals.gym
        ),
        1 => format!(
            "Transport is a money leak... share rides and save {} next week.",
            clamp_round(totals.transport as f64 * 0.25).min(800)
        ),
        2 => format!(
            "Rent ate {}% of your budget. Let's optimize somewhere else.",
            clamp_round(rent as f64 / income as f64 * 100.0)
        ),
        _ => "Self-care spree detected. Good vibes, but track the vibes!".to_string(),
    }
}

//
// ================= Tests =================
//
