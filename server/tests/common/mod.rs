#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use tower::ServiceExt;

use eventboard_server::auth::{PasswordHasher, TokenIssuer};
use eventboard_server::config::Config;
use eventboard_server::models::event::normalize_text;
use eventboard_server::models::{Event, EventStatus, NewEvent, User};
use eventboard_server::repositories::{
    EventFilter, EventRepository, RepositoryError, SignupFilter, UserEventRepository,
    UserRepository,
};
use eventboard_server::routes::create_routes;
use eventboard_server::state::AppState;

pub const TEST_SECRET: &str = "test-secret";

#[derive(Default)]
struct Inner {
    events: BTreeMap<i64, Event>,
    users: BTreeMap<i64, User>,
    signups: BTreeSet<(i64, i64)>,
    next_event_id: i64,
    next_user_id: i64,
}

/// In-memory stand-in for the three Postgres repositories.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Inserts without validation, so past events can be seeded.
    pub fn insert_event(&self, mut event: NewEvent) -> Event {
        event.normalize();
        let mut inner = self.inner.lock().unwrap();
        inner.next_event_id += 1;
        let event = event.into_event(inner.next_event_id);
        inner.events.insert(event.id, event.clone());
        event
    }

    pub fn insert_user(&self, username: &str, is_admin: bool) -> User {
        let mut inner = self.inner.lock().unwrap();
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            password_hash: String::new(),
            is_admin,
        };
        inner.users.insert(user.id, user.clone());
        user
    }

    /// Records a signup without the eligibility check.
    pub fn insert_signup(&self, user_id: i64, event_id: i64) {
        self.inner.lock().unwrap().signups.insert((user_id, event_id));
    }

    pub fn event(&self, id: i64) -> Option<Event> {
        self.inner.lock().unwrap().events.get(&id).cloned()
    }

    pub fn user(&self, username: &str) -> Option<User> {
        self.inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.username == username)
            .cloned()
    }

    pub fn signup_count(&self) -> usize {
        self.inner.lock().unwrap().signups.len()
    }
}

/// In-process equivalent of the SQL predicates built by `EventFilter`.
fn event_matches(filter: &EventFilter, event: &Event) -> bool {
    filter.status.map_or(true, |s| event.status == s)
        && filter
            .title
            .as_deref()
            .map_or(true, |t| event.title.contains(&normalize_text(t)))
        && filter.date_start.map_or(true, |s| event.date_and_time >= s)
        && filter.date_end.map_or(true, |e| event.date_and_time <= e)
}

fn signup_matches(filter: SignupFilter, date_and_time: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    match filter {
        SignupFilter::All => true,
        SignupFilter::Upcoming => date_and_time > now,
        SignupFilter::Past => date_and_time <= now,
    }
}

fn page<T: Clone>(items: Vec<T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .into_iter()
        .skip(offset as usize)
        .take(limit as usize)
        .collect()
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create(&self, event: NewEvent) -> Result<Event, RepositoryError> {
        Ok(self.insert_event(event))
    }

    async fn get(&self, id: i64) -> Result<Event, RepositoryError> {
        self.event(id).ok_or(RepositoryError::NotFound)
    }

    async fn update(&self, mut event: Event) -> Result<Event, RepositoryError> {
        event.normalize();
        let mut inner = self.inner.lock().unwrap();
        match inner.events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(event)
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: i64) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.events.remove(&id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        inner.signups.retain(|(_, event_id)| *event_id != id);
        Ok(())
    }

    async fn get_all(
        &self,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        let matching = inner
            .events
            .values()
            .filter(|e| event_matches(filter, e))
            .cloned()
            .collect();
        Ok(page(matching, limit, offset))
    }

    async fn get_total_count(&self, filter: &EventFilter) -> Result<i64, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.events.values().filter(|e| event_matches(filter, e)).count() as i64)
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|u| u.username == username) {
            return Err(RepositoryError::Conflict("Username already taken".to_string()));
        }
        inner.next_user_id += 1;
        let user = User {
            id: inner.next_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            is_admin,
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_username(&self, username: &str) -> Result<User, RepositoryError> {
        self.user(username).ok_or(RepositoryError::NotFound)
    }

    async fn set_admin(&self, id: i64, is_admin: bool) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let user = inner.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.is_admin = is_admin;
        Ok(())
    }

    async fn count_admins(&self) -> Result<i64, RepositoryError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().filter(|u| u.is_admin).count() as i64)
    }
}

impl MemoryStore {
    fn signed_up_events(&self, user_id: i64, filter: SignupFilter) -> Vec<Event> {
        let inner = self.inner.lock().unwrap();
        let now = Utc::now();
        let mut events: Vec<Event> = inner
            .signups
            .iter()
            .filter(|(uid, _)| *uid == user_id)
            .filter_map(|(_, event_id)| inner.events.get(event_id))
            .filter(|e| signup_matches(filter, e.date_and_time, now))
            .cloned()
            .collect();
        events.sort_by_key(|e| (e.date_and_time, e.id));
        events
    }
}

#[async_trait]
impl UserEventRepository for MemoryStore {
    async fn create_signup(&self, user_id: i64, event_id: i64) -> Result<(), RepositoryError> {
        let mut inner = self.inner.lock().unwrap();
        let eligible = inner.events.get(&event_id).map_or(false, |e| {
            e.status == EventStatus::Published && e.date_and_time > Utc::now()
        });
        if !eligible {
            return Err(RepositoryError::SignupRejected);
        }
        if !inner.signups.insert((user_id, event_id)) {
            return Err(RepositoryError::Conflict(
                "Already signed up for this event".to_string(),
            ));
        }
        Ok(())
    }

    async fn get_all(
        &self,
        user_id: i64,
        filter: SignupFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Event>, RepositoryError> {
        Ok(page(self.signed_up_events(user_id, filter), limit, offset))
    }

    async fn get_total_count(
        &self,
        user_id: i64,
        filter: SignupFilter,
    ) -> Result<i64, RepositoryError> {
        Ok(self.signed_up_events(user_id, filter).len() as i64)
    }
}

pub struct TestApp {
    pub store: Arc<MemoryStore>,
    pub state: AppState,
    pub router: Router,
}

impl TestApp {
    pub fn new() -> Self {
        let store = MemoryStore::new();
        let state = AppState::new(
            store.clone(),
            store.clone(),
            store.clone(),
            TokenIssuer::new(TEST_SECRET),
            PasswordHasher::with_cost(4),
        );
        let router = create_routes(state.clone(), &Config::test_config());
        Self {
            store,
            state,
            router,
        }
    }

    pub fn token(&self, user: &User) -> String {
        self.state.tokens.issue(user).unwrap()
    }

    pub fn admin_token(&self) -> String {
        let admin = self
            .store
            .user("admin")
            .unwrap_or_else(|| self.store.insert_user("admin", true));
        self.token(&admin)
    }

    pub fn user_token(&self, username: &str) -> (User, String) {
        let user = self
            .store
            .user(username)
            .unwrap_or_else(|| self.store.insert_user(username, false));
        let token = self.token(&user);
        (user, token)
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }
}

pub fn new_event(title: &str, status: EventStatus, date_and_time: DateTime<Utc>) -> NewEvent {
    NewEvent {
        title: title.to_string(),
        long_description: "A long enough description of the event".to_string(),
        short_description: "Short summary".to_string(),
        date_and_time,
        organizer: "Test Org".to_string(),
        location: "Main Hall".to_string(),
        status,
    }
}

pub fn in_days(days: i64) -> DateTime<Utc> {
    Utc::now() + Duration::days(days)
}

pub fn event_titles(body: &Value) -> Vec<String> {
    body["events"]
        .as_array()
        .map(|events| {
            events
                .iter()
                .filter_map(|e| e["title"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
