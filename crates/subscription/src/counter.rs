use {chatlabs_store::Profile, serde::Serialize};

/// Remaining free messages for today, as shown above the chat input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageCounter {
    pub remaining: u64,
    pub limit: u32,
    pub label: String,
}

/// `None` for paid plans, which have no counter. An unavailable count shows
/// as nothing used.
#[must_use]
pub fn message_counter(profile: &Profile, count: Option<u64>, limit: u32) -> Option<MessageCounter> {
    if !profile.plan.is_free() {
        return None;
    }
    let remaining = u64::from(limit).saturating_sub(count.unwrap_or(0));
    Some(MessageCounter {
        remaining,
        limit,
        label: format!("{remaining}/{limit} messages left"),
    })
}
