//! One-shot flash notices carried across a POST → redirect → GET round trip.
//!
//! Notices are queued per browser session and per kind. Reading a queue drains it, so a
//! notice is shown on exactly one page view.
//!
//! Key schema in Redis (list per queue, TTL refreshed on every push):
//! - `cooking_blog:flash:{session}:{kind}`
//!
//! When Redis is not reachable at startup the queues live in process memory instead, with
//! the same TTL applied on push and drain.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use blog_common::redis::RedisCache;

pub const SESSION_COOKIE: &str = "blog_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlashKind {
    /// Failures from the last submission.
    InfoErrors,
    /// Confirmation that the last submission was stored.
    InfoSubmit,
}

impl FlashKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FlashKind::InfoErrors => "infoErrors",
            FlashKind::InfoSubmit => "infoSubmit",
        }
    }
}

struct LocalQueue {
    messages: Vec<String>,
    /// Last push; the queue expires `ttl` after it, like a Redis key after `EXPIRE`.
    touched: Instant,
}

enum Backend {
    Redis(RedisCache),
    Local(Mutex<HashMap<String, LocalQueue>>),
}

pub struct FlashStore {
    backend: Backend,
    ttl: Duration,
}

impl FlashStore {
    /// Use Redis when it answers a PING, otherwise fall back to process memory.
    pub async fn connect(redis: RedisCache, ttl_secs: u64) -> Self {
        if redis.is_available().await {
            info!(ttl_secs, "flash notices stored in redis");
            Self {
                backend: Backend::Redis(redis),
                ttl: Duration::from_secs(ttl_secs),
            }
        } else {
            info!(ttl_secs, "redis unavailable, flash notices kept in memory");
            Self::in_memory(Duration::from_secs(ttl_secs))
        }
    }

    pub fn in_memory(ttl: Duration) -> Self {
        Self {
            backend: Backend::Local(Mutex::new(HashMap::new())),
            ttl,
        }
    }

    /// Queue `message` for the next view of this session.
    pub async fn push(&self, session: &str, kind: FlashKind, message: &str) {
        let key = flash_key(session, kind);
        match &self.backend {
            Backend::Redis(redis) => {
                if !redis.push_with_ttl(&key, message, self.ttl.as_secs()).await {
                    warn!(key, "flash notice dropped");
                }
            }
            Backend::Local(queues) => {
                let mut queues = queues.lock().await;
                let now = Instant::now();
                self.evict_expired(&mut queues, now);

                let queue = queues.entry(key).or_insert_with(|| LocalQueue {
                    messages: Vec::new(),
                    touched: now,
                });
                queue.messages.push(message.to_string());
                queue.touched = now;
            }
        }
    }

    /// Take every queued message of `kind`, oldest first. The queue is empty afterwards.
    pub async fn drain(&self, session: &str, kind: FlashKind) -> Vec<String> {
        let key = flash_key(session, kind);
        match &self.backend {
            Backend::Redis(redis) => redis.drain(&key).await.unwrap_or_default(),
            Backend::Local(queues) => {
                let mut queues = queues.lock().await;
                let now = Instant::now();
                let drained = match queues.remove(&key) {
                    Some(queue) if !self.is_expired(&queue, now) => queue.messages,
                    _ => Vec::new(),
                };
                self.evict_expired(&mut queues, now);
                drained
            }
        }
    }

    fn is_expired(&self, queue: &LocalQueue, now: Instant) -> bool {
        now.duration_since(queue.touched) >= self.ttl
    }

    fn evict_expired(&self, queues: &mut HashMap<String, LocalQueue>, now: Instant) {
        let before = queues.len();
        queues.retain(|_, queue| !self.is_expired(queue, now));
        let evicted = before - queues.len();
        if evicted > 0 {
            debug!(evicted, "expired flash queues evicted");
        }
    }
}

fn flash_key(session: &str, kind: FlashKind) -> String {
    format!("cooking_blog:flash:{session}:{}", kind.as_str())
}

/// Return the session id carried by `jar`, minting a new session cookie when there is none.
pub fn ensure_session(jar: CookieJar) -> (CookieJar, String) {
    if let Some(existing) = jar.get(SESSION_COOKIE) {
        let id = existing.value().to_string();
        if is_session_id(&id) {
            return (jar, id);
        }
    }

    let id = new_session_id();
    let cookie = Cookie::build((SESSION_COOKIE, id.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build();
    (jar.add(cookie), id)
}

fn is_session_id(value: &str) -> bool {
    value.len() == 32 && value.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Random v4 UUID as 32 lowercase hex digits.
fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()
}
