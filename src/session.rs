//! In-process session registry

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Cart;

/// Server-side session state addressed by an opaque bearer token. Starts
/// anonymous; login binds a user without discarding the cart.
#[derive(Clone, Debug)]
pub struct Session {
    pub token: Uuid,
    pub user_id: Option<Uuid>,
    pub cart: Cart,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            token: Uuid::new_v4(),
            user_id: None,
            cart: Cart::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Token -> session map shared across handlers.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<HashMap<Uuid, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> Session {
        let session = Session::new();
        self.inner.write().await.insert(session.token, session.clone());
        session
    }

    pub async fn get(&self, token: Uuid) -> Option<Session> {
        self.inner.read().await.get(&token).cloned()
    }

    /// Persist a mutated session. Within one session the last write wins.
    pub async fn save(&self, mut session: Session) {
        session.updated_at = Utc::now();
        self.inner.write().await.insert(session.token, session);
    }

    pub async fn remove(&self, token: Uuid) {
        self.inner.write().await.remove(&token);
    }

    /// Bind a user to the session, keeping the cart accumulated while
    /// anonymous.
    pub async fn attach_user(&self, token: Uuid, user_id: Uuid) -> Option<Session> {
        let mut sessions = self.inner.write().await;
        let session = sessions.get_mut(&token)?;
        session.user_id = Some(user_id);
        session.updated_at = Utc::now();
        Some(session.clone())
    }
}
