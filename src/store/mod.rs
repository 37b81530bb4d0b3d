//! Central state engine
//!
//! `AppState` is the single source of truth for all domain data. Every
//! mutation runs in two phases: a pure transition that updates in-memory
//! state and collects the resulting events, then a commit that dispatches
//! the events (notifications, celebrations) and schedules a full-snapshot
//! write. Keeping side effects out of the transitions means a mutation can
//! never observe a half-applied update of its own making.
//!
//! Mutations are total: unknown ids are silent no-ops and out-of-range
//! numbers are clamped, never rejected.

use crate::classifier::categorize;
use crate::models::{
    BankAccount, BudgetPlan, Challenge, ChallengeDraft, Level, Notification, Profile, SipPlan,
    SipPlanDraft, Theme, Transaction, TransactionDraft, TxnKind, VideoDraft, VideoItem,
};
use crate::persist::{Snapshot, SnapshotStore};
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

/// Reward points granted for completing onboarding.
const ONBOARDING_BONUS: i64 = 50;
/// Reward points for a small food debit (below [`SMALL_FOOD_LIMIT`]).
const SMALL_FOOD_BONUS: i64 = 2;
const SMALL_FOOD_LIMIT: i64 = 200;
/// Reward points per five distinct watched videos.
const WATCH_BADGE_BONUS: i64 = 25;
const WATCH_BADGE_EVERY: usize = 5;
/// Reward points for completing a challenge.
const CHALLENGE_BONUS: i64 = 40;
/// Reward points per seven-day streak milestone.
const STREAK_BONUS: i64 = 20;
const STREAK_MILESTONE: u32 = 7;
/// Reward points per executed SIP installment.
const SIP_BONUS: i64 = 5;

//
// ================= Events =================
//

/// A cosmetic one-shot effect with no state consequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Celebration {
    LevelUp(Level),
    StreakMilestone(u32),
}

/// Sink for celebration effects (confetti, in a UI that renders one).
pub trait CelebrationSink: Send + Sync {
    fn celebrate(&self, event: &Celebration);
}

/// Default sink: celebrations are only visible in the logs.
pub struct TracingCelebrations;

impl CelebrationSink for TracingCelebrations {
    fn celebrate(&self, event: &Celebration) {
        match event {
            Celebration::LevelUp(level) => info!(%level, "level up"),
            Celebration::StreakMilestone(days) => info!(days, "streak milestone"),
        }
    }
}

/// Event produced by a state transition, dispatched at commit time.
enum StoreEvent {
    Notify(String),
    Celebrate(Celebration),
}

//
// ================= Engine =================
//

/// The application state engine.
///
/// Explicitly constructed and passed by reference to consumers; multiple
/// independent instances (one per test, say) can coexist.
pub struct AppState {
    state: Snapshot,
    backend: Box<dyn SnapshotStore>,
    celebrations: Box<dyn CelebrationSink>,
}

impl AppState {
    /// Hydrate from the backend, or start empty when nothing usable is
    /// stored. Celebrations go to the tracing sink.
    pub fn new(backend: Box<dyn SnapshotStore>) -> Self {
        Self::with_celebrations(backend, Box::new(TracingCelebrations))
    }

    pub fn with_celebrations(
        backend: Box<dyn SnapshotStore>,
        celebrations: Box<dyn CelebrationSink>,
    ) -> Self {
        let state = match backend.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => Snapshot::default(),
            Err(e) => {
                warn!(error = %e, "stored state unreadable, starting empty");
                Snapshot::default()
            }
        };

        Self {
            state,
            backend,
            celebrations,
        }
    }

    //
    // ================= Getters =================
    //

    pub fn profile(&self) -> Option<&Profile> {
        self.state.profile.as_ref()
    }

    pub fn budget_plan(&self) -> Option<&BudgetPlan> {
        self.state.budget_plan.as_ref()
    }

    pub fn theme(&self) -> Theme {
        self.state.theme
    }

    pub fn bank_accounts(&self) -> &[BankAccount] {
        &self.state.bank_accounts
    }

    /// Transactions, newest first.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.state.transactions.iter()
    }

    pub fn videos(&self) -> &[VideoItem] {
        &self.state.videos
    }

    pub fn is_watched(&self, video_id: Uuid) -> bool {
        self.state.watched.get(&video_id).copied().unwrap_or(false)
    }

    /// Count of distinct videos marked watched.
    pub fn watched_count(&self) -> usize {
        self.state.watched.values().filter(|w| **w).count()
    }

    pub fn rewards(&self) -> i64 {
        self.state.rewards
    }

    pub fn level(&self) -> Level {
        self.state.level
    }

    pub fn challenges(&self) -> &[Challenge] {
        &self.state.challenges
    }

    /// Notifications, newest first.
    pub fn notifications(&self) -> impl Iterator<Item = &Notification> {
        self.state.notifications.iter()
    }

    pub fn privacy_mode(&self) -> bool {
        self.state.privacy_mode
    }

    pub fn streak_days(&self) -> u32 {
        self.state.streak_days
    }

    /// SIP plans, newest first.
    pub fn sip_plans(&self) -> impl Iterator<Item = &SipPlan> {
        self.state.sip_plans.iter()
    }

    /// Owned copy of the full persisted state.
    pub fn snapshot(&self) -> Snapshot {
        self.state.clone()
    }

    //
    // ================= Derived figures =================
    //

    /// Sum of all linked account balances, recomputed on every read.
    pub fn total_balance(&self) -> i64 {
        self.state.bank_accounts.iter().map(|a| a.balance).sum()
    }

    /// Display-only 0-100 composite of streak, level, and overspend status.
    pub fn trust_score(&self) -> i64 {
        let base = 50;
        let streak_bonus = i64::from(self.state.streak_days).min(20);
        let level_bonus = self.state.level.trust_bonus();
        let overspend_penalty = if self
            .state
            .budget_plan
            .as_ref()
            .map_or(false, |p| p.overspend_alert)
        {
            15
        } else {
            0
        };

        (base + streak_bonus + level_bonus - overspend_penalty).clamp(0, 100)
    }

    //
    // ================= Mutations =================
    //

    /// Replace the profile. Grants the onboarding bonus unconditionally;
    /// numeric fields are stored as given (negative income included).
    pub fn set_profile(&mut self, profile: Profile) {
        let mut events = Vec::new();
        self.state.profile = Some(profile);
        self.grant_rewards(ONBOARDING_BONUS, &mut events);
        events.push(StoreEvent::Notify(
            "Welcome to FinGen! You earned 50 coins for onboarding.".to_string(),
        ));
        self.commit(events);
    }

    pub fn set_budget_plan(&mut self, plan: BudgetPlan) {
        self.state.budget_plan = Some(plan);
        self.commit(vec![StoreEvent::Notify(
            "Budget plan saved. Keep an eye on overspending alerts.".to_string(),
        )]);
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.state.theme = theme;
        self.commit(vec![StoreEvent::Notify(format!(
            "Theme updated to {}",
            theme
        ))]);
    }

    /// Link a bank account. The opening balance is floored at zero; later
    /// deltas are not.
    pub fn link_bank(&mut self, name: impl Into<String>, initial_balance: i64) -> Uuid {
        let name = name.into();
        let account = BankAccount {
            id: Uuid::new_v4(),
            name: name.clone(),
            balance: initial_balance.max(0),
        };
        let id = account.id;
        self.state.bank_accounts.push(account);
        self.commit(vec![StoreEvent::Notify(format!("Bank linked: {}", name))]);
        id
    }

    /// Apply a signed delta to an account balance. Unknown ids are a
    /// silent no-op; balances may go negative.
    pub fn update_balance(&mut self, account_id: Uuid, delta: i64) {
        self.apply_balance_delta(account_id, delta);
        self.commit(Vec::new());
    }

    /// Record a transaction, newest first. Category falls back to the
    /// keyword classifier, date to now. A small food debit earns a tiny
    /// reward nudge.
    pub fn add_transaction(&mut self, draft: TransactionDraft) -> Uuid {
        let mut events = Vec::new();
        let id = self.insert_transaction(draft, &mut events);
        self.commit(events);
        id
    }

    pub fn add_video(&mut self, draft: VideoDraft) -> Uuid {
        let item = VideoItem {
            id: Uuid::new_v4(),
            title: draft.title,
            url: draft.url,
            topic: draft.topic,
        };
        let id = item.id;
        let title = item.title.clone();
        self.state.videos.push(item);
        self.commit(vec![StoreEvent::Notify(format!(
            "Video uploaded: {}",
            title
        ))]);
        id
    }

    /// Mark a video watched. Re-marking an already-watched id never
    /// regrants; each new positive multiple of five distinct watched
    /// videos earns a badge.
    pub fn mark_watched(&mut self, video_id: Uuid) {
        let mut events = Vec::new();
        let newly_watched = !self.is_watched(video_id);
        self.state.watched.insert(video_id, true);

        if newly_watched {
            let count = self.watched_count();
            if count > 0 && count % WATCH_BADGE_EVERY == 0 {
                self.grant_rewards(WATCH_BADGE_BONUS, &mut events);
                events.push(StoreEvent::Notify(
                    "Badge earned! You watched 5 videos and earned 25 coins.".to_string(),
                ));
            }
        }

        self.commit(events);
    }

    /// Add (or deduct, for redemptions) reward points. The level is
    /// recomputed from the new total; a celebration fires only when the
    /// tier rank increased. The total is not floored at zero.
    pub fn add_rewards(&mut self, delta: i64) {
        let mut events = Vec::new();
        self.grant_rewards(delta, &mut events);
        self.commit(events);
    }

    /// Join a challenge at zero progress. Duplicate titles are allowed.
    pub fn join_challenge(&mut self, draft: ChallengeDraft) -> Uuid {
        let challenge = Challenge {
            id: Uuid::new_v4(),
            title: draft.title,
            target: draft.target,
            progress: 0,
            week: draft.week,
        };
        let id = challenge.id;
        let title = challenge.title.clone();
        self.state.challenges.push(challenge);
        self.commit(vec![StoreEvent::Notify(format!(
            "Joined challenge: {}",
            title
        ))]);
        id
    }

    /// Set a challenge's progress (caller clamps to 0-100). Unknown ids
    /// are a silent no-op. Reaching 100 grants the completion bonus; a
    /// repeated call that keeps progress at 100 grants again.
    pub fn update_challenge(&mut self, challenge_id: Uuid, progress: i64) {
        let Some(challenge) = self
            .state
            .challenges
            .iter_mut()
            .find(|c| c.id == challenge_id)
        else {
            return;
        };
        challenge.progress = progress;

        let mut events = Vec::new();
        if progress >= 100 {
            self.grant_rewards(CHALLENGE_BONUS, &mut events);
            events.push(StoreEvent::Notify(
                "Challenge completed! +40 coins".to_string(),
            ));
        }
        self.commit(events);
    }

    /// Prepend a notification. The feed grows without bound.
    pub fn notify(&mut self, message: impl Into<String>) {
        self.commit(vec![StoreEvent::Notify(message.into())]);
    }

    /// Flip balance masking. Presentation-only; underlying values are
    /// untouched.
    pub fn toggle_privacy(&mut self) {
        self.state.privacy_mode = !self.state.privacy_mode;
        self.commit(Vec::new());
    }

    /// Bump the engagement streak. Every seventh day celebrates and pays
    /// the streak bonus.
    pub fn increment_streak(&mut self) {
        let mut events = Vec::new();
        self.state.streak_days += 1;

        if self.state.streak_days % STREAK_MILESTONE == 0 {
            events.push(StoreEvent::Celebrate(Celebration::StreakMilestone(
                self.state.streak_days,
            )));
            events.push(StoreEvent::Notify("7-day streak! Keep it going!".to_string()));
            self.grant_rewards(STREAK_BONUS, &mut events);
        }

        self.commit(events);
    }

    pub fn reset_streak(&mut self) {
        self.state.streak_days = 0;
        self.commit(Vec::new());
    }

    pub fn add_sip_plan(&mut self, draft: SipPlanDraft) -> Uuid {
        let plan = SipPlan {
            id: Uuid::new_v4(),
            amount: draft.amount,
            day: draft.day,
            asset: draft.asset,
            account_id: draft.account_id,
            active: draft.active,
            created_at: Utc::now(),
        };
        let id = plan.id;
        let message = format!("SIP enabled: {}/mo in {}", plan.amount, plan.asset);
        self.state.sip_plans.push_front(plan);
        self.commit(vec![StoreEvent::Notify(message)]);
        id
    }

    /// Pause or resume a plan. Unknown ids are a silent no-op.
    pub fn toggle_sip_plan(&mut self, plan_id: Uuid, active: bool) {
        let Some(plan) = self.state.sip_plans.iter_mut().find(|p| p.id == plan_id) else {
            return;
        };
        plan.active = active;

        let message = if active { "SIP activated" } else { "SIP paused" };
        self.commit(vec![StoreEvent::Notify(message.to_string())]);
    }

    /// Execute one SIP installment immediately. The target account is the
    /// plan's, or the first linked account; with no account linked the
    /// engine only asks the user to link one and changes nothing.
    pub fn run_sip_now(&mut self, plan_id: Uuid) {
        let Some(plan) = self
            .state
            .sip_plans
            .iter()
            .find(|p| p.id == plan_id)
            .cloned()
        else {
            return;
        };

        let account_id = plan
            .account_id
            .or_else(|| self.state.bank_accounts.first().map(|a| a.id));
        let Some(account_id) = account_id else {
            self.commit(vec![StoreEvent::Notify(
                "Link a bank to run SIP".to_string(),
            )]);
            return;
        };

        let mut events = Vec::new();
        self.apply_balance_delta(account_id, -plan.amount.max(0));
        self.insert_transaction(
            TransactionDraft {
                kind: TxnKind::Debit,
                amount: plan.amount,
                description: format!("SIP: {}", plan.asset),
                category: Some("Investments".to_string()),
                date: None,
            },
            &mut events,
        );
        self.grant_rewards(SIP_BONUS, &mut events);
        events.push(StoreEvent::Notify(format!(
            "SIP executed: {} -> {}",
            plan.amount, plan.asset
        )));
        self.commit(events);
    }

    /// End the session: clears profile, budget plan, and challenges, and
    /// replaces the notification feed with a single logged-out entry.
    /// Bank accounts, transactions, videos, rewards, and SIP plans stay.
    pub fn logout(&mut self) {
        self.state.profile = None;
        self.state.budget_plan = None;
        self.state.challenges.clear();
        self.state.notifications.clear();
        self.commit(vec![StoreEvent::Notify(
            "Logged out successfully.".to_string(),
        )]);
    }

    //
    // ================= Transitions & commit =================
    //

    fn apply_balance_delta(&mut self, account_id: Uuid, delta: i64) {
        if let Some(account) = self
            .state
            .bank_accounts
            .iter_mut()
            .find(|a| a.id == account_id)
        {
            account.balance += delta;
        }
    }

    fn insert_transaction(
        &mut self,
        draft: TransactionDraft,
        events: &mut Vec<StoreEvent>,
    ) -> Uuid {
        let category = draft
            .category
            .unwrap_or_else(|| categorize(&draft.description).to_string());
        let tx = Transaction {
            id: Uuid::new_v4(),
            kind: draft.kind,
            amount: draft.amount,
            description: draft.description,
            category,
            date: draft.date.unwrap_or_else(Utc::now),
        };

        let small_food_debit =
            tx.kind == TxnKind::Debit && tx.category == "Food" && tx.amount < SMALL_FOOD_LIMIT;
        let id = tx.id;
        self.state.transactions.push_front(tx);

        if small_food_debit {
            self.grant_rewards(SMALL_FOOD_BONUS, events);
        }

        id
    }

    fn grant_rewards(&mut self, delta: i64, events: &mut Vec<StoreEvent>) {
        let previous_level = self.state.level;
        self.state.rewards += delta;
        self.state.level = Level::for_points(self.state.rewards);

        // Level-down via redemption stays silent.
        if self.state.level > previous_level {
            events.push(StoreEvent::Celebrate(Celebration::LevelUp(
                self.state.level,
            )));
            events.push(StoreEvent::Notify(format!(
                "Level up! You reached {}",
                self.state.level
            )));
        }
    }

    fn commit(&mut self, events: Vec<StoreEvent>) {
        for event in events {
            match event {
                StoreEvent::Notify(message) => {
                    self.state.notifications.push_front(Notification {
                        id: Uuid::new_v4(),
                        message,
                        created_at: Utc::now(),
                    });
                }
                StoreEvent::Celebrate(celebration) => {
                    self.celebrations.celebrate(&celebration);
                }
            }
        }

        // Fire-and-forget: a failed write never surfaces to the mutation.
        if let Err(e) = self.backend.save(&self.state) {
            warn!(error = %e, "snapshot write failed");
        }
    }
}

//
// ================= Tests =================
//
