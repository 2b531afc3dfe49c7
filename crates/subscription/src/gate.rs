//! Plan and daily quota checks run before any model call.

use {
    chatlabs_accounts::{KeyFallbacks, load_server_profile},
    chatlabs_store::{MessageStore, Profile, ProfileStore, SessionStore},
    chrono::{DateTime, NaiveTime, Utc},
    tracing::debug,
};

use crate::{
    Error, Result,
    error::LimitError,
    models::ModelCatalog,
};

pub const PRO_MODEL_REQUIRED: &str = "Pro plan required to use this model";
pub const DAILY_LIMIT_REACHED: &str =
    "You have reached daily message limit. Upgrade to Pro plan to continue come back tomorrow.";

/// Start of the UTC day containing `now`; the quota window opens here.
#[must_use]
pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

#[derive(Debug, Clone)]
pub struct PlanGate {
    catalog: ModelCatalog,
    free_daily_messages: u32,
}

impl PlanGate {
    pub fn new(catalog: ModelCatalog, free_daily_messages: u32) -> Self {
        Self {
            catalog,
            free_daily_messages,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &ModelCatalog {
        &self.catalog
    }

    #[must_use]
    pub fn free_daily_messages(&self) -> u32 {
        self.free_daily_messages
    }

    /// Free plans may only use free catalog models. Paid plans pass.
    pub fn check_model(&self, profile: &Profile, model_id: &str) -> Result<()> {
        if !profile.plan.is_free() {
            return Ok(());
        }
        match self.catalog.is_paid(model_id) {
            Some(false) => Ok(()),
            Some(true) => Err(LimitError::new(PRO_MODEL_REQUIRED).into()),
            None => Err(Error::unknown_model(model_id)),
        }
    }

    /// Free plans fail once the count strictly exceeds the daily allowance.
    pub fn check_count(&self, profile: &Profile, count: Option<u64>) -> Result<()> {
        if !profile.plan.is_free() {
            return Ok(());
        }
        let count = count.ok_or(Error::CountUnavailable)?;
        if count > u64::from(self.free_daily_messages) {
            return Err(LimitError::new(DAILY_LIMIT_REACHED).into());
        }
        Ok(())
    }

    /// Run both checks. The message store is never queried for paid plans
    /// or when the model check already failed.
    pub async fn authorize(
        &self,
        profile: &Profile,
        model_id: &str,
        window_start: DateTime<Utc>,
        messages: &dyn MessageStore,
    ) -> Result<()> {
        if !profile.plan.is_free() {
            return Ok(());
        }
        self.check_model(profile, model_id)?;
        let count = messages
            .count_messages_since(&profile.user_id, window_start)
            .await?;
        debug!(user_id = %profile.user_id, ?count, limit = self.free_daily_messages, "quota check");
        self.check_count(profile, count)
    }
}

/// Collaborators needed to gate a request from its session token.
pub struct GateContext<'a> {
    pub sessions: &'a dyn SessionStore,
    pub profiles: &'a dyn ProfileStore,
    pub messages: &'a dyn MessageStore,
    pub fallbacks: &'a KeyFallbacks,
}

/// Load the caller's profile, then run the plan gate. Returns the resolved
/// profile so the caller can go on to use its credentials.
pub async fn validate_model_and_message_count(
    gate: &PlanGate,
    ctx: GateContext<'_>,
    session_token: Option<&str>,
    model_id: &str,
    window_start: DateTime<Utc>,
) -> Result<Profile> {
    let profile =
        load_server_profile(ctx.sessions, ctx.profiles, ctx.fallbacks, session_token).await?;
    gate.authorize(&profile, model_id, window_start, ctx.messages)
        .await?;
    Ok(profile)
}
