use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crewdesk_core::{Notification, Role, Task, TokenPair, User};

const DEFAULT_ACCESS_TTL_SECS: i64 = 900;

#[derive(Clone)]
pub struct SeedUser {
    pub email: String,
    pub password: String,
    pub user: User,
}

/// Per-endpoint call counters, readable by tests.
#[derive(Default)]
pub struct Counters {
    pub login_calls: AtomicUsize,
    pub refresh_calls: AtomicUsize,
    pub me_calls: AtomicUsize,
    pub ws_connections: AtomicUsize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub email: String,
    pub exp: i64,
    pub iat: i64,
}

pub struct MockState {
    secret: String,
    users: Vec<SeedUser>,
    refresh_tokens: Mutex<HashMap<String, i64>>,
    pub counters: Counters,
    pub tasks: RwLock<Vec<Task>>,
    pub notifications: RwLock<Vec<Notification>>,
    next_id: AtomicI64,
    /// Test knob: when set, refresh hands out an already-expired access
    /// token, so replayed requests keep failing.
    pub stale_refresh: AtomicBool,
}

impl MockState {
    pub fn new() -> Arc<Self> {
        let now = OffsetDateTime::now_utc();
        let users = vec![
            seed(1, "owner@example.com", "hunter2", "Olivia Owner", Role::Owner, now),
            seed(2, "staff@example.com", "letmein", "Sam Staff", Role::Staff, now),
        ];
        Arc::new(Self {
            secret: "mock-signing-secret".into(),
            users,
            refresh_tokens: Mutex::new(HashMap::new()),
            counters: Counters::default(),
            tasks: RwLock::new(Vec::new()),
            notifications: RwLock::new(Vec::new()),
            next_id: AtomicI64::new(100),
            stale_refresh: AtomicBool::new(false),
        })
    }

    pub fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    pub fn user_by_credentials(&self, email: &str, password: &str) -> Option<User> {
        self.users
            .iter()
            .find(|seed| seed.email == email && seed.password == password)
            .map(|seed| seed.user.clone())
    }

    pub fn user_by_id(&self, id: i64) -> Option<User> {
        self.users
            .iter()
            .find(|seed| seed.user.id == id)
            .map(|seed| seed.user.clone())
    }

    pub fn user_by_email(&self, email: &str) -> Option<User> {
        self.users
            .iter()
            .find(|seed| seed.email == email)
            .map(|seed| seed.user.clone())
    }

    pub fn mint_access(&self, user: &User, ttl: Duration) -> String {
        let now = OffsetDateTime::now_utc();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            exp: (now + ttl).unix_timestamp(),
            iat: now.unix_timestamp(),
        };
        let mut header = Header::default();
        header.alg = Algorithm::HS256;
        jsonwebtoken::encode(&header, &claims, &EncodingKey::from_secret(self.secret.as_bytes()))
            .expect("HS256 signing cannot fail with a valid secret")
    }

    pub fn verify_access(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 5; // seconds
        jsonwebtoken::decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .ok()
        .map(|data| data.claims)
    }

    /// Mints a fresh pair and registers its refresh token.
    pub async fn issue_pair(&self, user: &User) -> TokenPair {
        let access_ttl = if self.stale_refresh.load(Ordering::SeqCst) {
            Duration::seconds(-300)
        } else {
            Duration::seconds(DEFAULT_ACCESS_TTL_SECS)
        };
        let access = self.mint_access(user, access_ttl);
        let refresh = Uuid::new_v4().to_string();
        self.refresh_tokens
            .lock()
            .await
            .insert(refresh.clone(), user.id);
        TokenPair::bearer(access, refresh)
    }

    /// A pair whose access token expired long ago but whose refresh token is
    /// valid, for exercising the 401 recovery path.
    pub async fn issue_stale_pair(&self, user: &User) -> TokenPair {
        let access = self.mint_access(user, Duration::seconds(-300));
        let refresh = Uuid::new_v4().to_string();
        self.refresh_tokens
            .lock()
            .await
            .insert(refresh.clone(), user.id);
        TokenPair::bearer(access, refresh)
    }

    /// Refresh tokens are single-use: rotation consumes the old one.
    pub async fn take_refresh(&self, token: &str) -> Option<i64> {
        self.refresh_tokens.lock().await.remove(token)
    }
}

fn seed(
    id: i64,
    email: &str,
    password: &str,
    full_name: &str,
    role: Role,
    created_at: OffsetDateTime,
) -> SeedUser {
    SeedUser {
        email: email.into(),
        password: password.into(),
        user: User {
            id,
            email: email.into(),
            full_name: full_name.into(),
            role,
            phone: None,
            position: None,
            avatar_url: None,
            is_active: true,
            created_at,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn minted_access_tokens_verify() {
        let state = MockState::new();
        let user = state.user_by_email("owner@example.com").unwrap();
        let pair = state.issue_pair(&user).await;
        let claims = state.verify_access(&pair.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
    }

    #[tokio::test]
    async fn stale_access_tokens_fail_verification() {
        let state = MockState::new();
        let user = state.user_by_email("owner@example.com").unwrap();
        let pair = state.issue_stale_pair(&user).await;
        assert!(state.verify_access(&pair.access_token).is_none());
        // but the refresh token stays usable exactly once
        assert_eq!(state.take_refresh(&pair.refresh_token).await, Some(user.id));
        assert_eq!(state.take_refresh(&pair.refresh_token).await, None);
    }
}
