use {
    chatlabs_store::{Profile, ProfileStore, SessionStore},
    tracing::debug,
};

use crate::{
    Error, Result,
    keys::{KeyFallbacks, resolve_profile_keys},
};

/// Resolve a session token to its profile with fallback keys applied.
pub async fn load_server_profile(
    sessions: &dyn SessionStore,
    profiles: &dyn ProfileStore,
    fallbacks: &KeyFallbacks,
    session_token: Option<&str>,
) -> Result<Profile> {
    let Some(token) = session_token.filter(|t| !t.is_empty()) else {
        return Err(Error::UserNotFound);
    };
    let user_id = sessions
        .user_for_session(token)
        .await?
        .ok_or(Error::UserNotFound)?;
    let profile = profiles
        .get_profile_by_user_id(&user_id)
        .await?
        .ok_or(Error::ProfileNotFound)?;
    debug!(user_id = %user_id, plan = profile.plan.as_str(), "loaded server profile");
    Ok(resolve_profile_keys(profile, fallbacks))
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        chatlabs_store::{MemoryStore, Plan, ProviderKeys, Session},
    };

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store
            .save_session(&Session {
                token: "tok".into(),
                user_id: "u1".into(),
                expires_at: None,
            })
            .await
            .unwrap();
        store
            .save_session(&Session {
                token: "orphan".into(),
                user_id: "u2".into(),
                expires_at: None,
            })
            .await
            .unwrap();
        store
            .save_profile(&Profile {
                id: "p1".into(),
                user_id: "u1".into(),
                username: "ada".into(),
                display_name: "Ada".into(),
                plan: Plan::Free,
                keys: ProviderKeys::default(),
            })
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn loads_profile_with_fallback_keys() {
        let store = seeded().await;
        let fb = KeyFallbacks::from_lookup(|name| {
            (name == "OPENAI_API_KEY").then(|| "sk-env".to_string())
        });
        let profile = load_server_profile(&store, &store, &fb, Some("tok"))
            .await
            .unwrap();
        assert_eq!(profile.user_id, "u1");
        assert_eq!(profile.keys.openai_api_key.as_deref(), Some("sk-env"));
    }

    #[tokio::test]
    async fn unknown_session_is_user_not_found() {
        let store = seeded().await;
        let fb = KeyFallbacks::default();
        for token in [None, Some(""), Some("nope")] {
            let err = load_server_profile(&store, &store, &fb, token)
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "User not found");
        }
    }

    #[tokio::test]
    async fn session_without_profile_is_profile_not_found() {
        let store = seeded().await;
        let err = load_server_profile(&store, &store, &KeyFallbacks::default(), Some("orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProfileNotFound));
        assert_eq!(err.to_string(), "Profile not found");
    }
}
