//! Forum module scenarios
//!
//! End-to-end flows through `Forum::dispatch`: registration and login,
//! login-gated actions, the reply sequence with its conditional notice,
//! and partial writes when a later step fails.

use std::sync::Arc;

use serde_json::{json, Value};

use agora::auth::Session;
use agora::forum::{Forum, RequestContext, Response};
use agora::mutation::MutationExecutor;
use agora::realtime::{EventBus, EventReceiver};
use agora::schema::Validator;
use agora::storage::{
    Document, DocumentStore, Filter, FindOptions, MemoryStore, StoreError, StoreResult,
};

struct Harness {
    forum: Forum,
    bus: Arc<EventBus>,
}

impl Harness {
    fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let bus = Arc::new(EventBus::default());
        let executor = MutationExecutor::new(store, Arc::new(Validator::new()), Arc::clone(&bus));
        Self {
            forum: Forum::new(executor, 20),
            bus,
        }
    }

    fn call(&self, session: &Session, module: &str, action: &str, body: Value) -> Response {
        let ctx = RequestContext::new(session, "203.0.113.9");
        self.forum.dispatch(&ctx, module, action, &body)
    }

    fn ok(&self, session: &Session, module: &str, action: &str, body: Value) -> Value {
        match self.call(session, module, action, body) {
            Response::Success(data) => data.unwrap_or(Value::Null),
            Response::Failure(message) => panic!("{}/{} failed: {}", module, action, message),
        }
    }

    fn fail(&self, session: &Session, module: &str, action: &str, body: Value) -> String {
        match self.call(session, module, action, body) {
            Response::Success(data) => panic!("{}/{} succeeded: {:?}", module, action, data),
            Response::Failure(message) => message,
        }
    }

    /// Register and log in on a fresh session
    fn member(&self, name: &str) -> Session {
        let session = Session::new();
        self.ok(
            &session,
            "user",
            "reg",
            json!({"name": name, "email": format!("{}@example.com", name), "password": "secret123"}),
        );
        self.ok(&session, "user", "login", json!({"name": name, "password": "secret123"}));
        session
    }

    fn node(&self, session: &Session) -> String {
        let data = self.ok(session, "node", "add", json!({"name": "tech", "title": "Technology"}));
        data["id"].as_str().unwrap().to_string()
    }

    fn topic(&self, session: &Session, node: &str) -> String {
        let data = self.ok(
            session,
            "topic",
            "add",
            json!({"node": node, "title": "Hello", "content": "First post"}),
        );
        data["id"].as_str().unwrap().to_string()
    }
}

fn drain(rx: &mut EventReceiver) -> Vec<(String, String)> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        seen.push((event.module().to_string(), event.action().to_string()));
    }
    seen
}

// =============================================================================
// USERS
// =============================================================================

#[test]
fn test_register_then_login() {
    let h = Harness::new();
    let session = Session::new();

    h.ok(
        &session,
        "user",
        "reg",
        json!({"name": "alice", "email": "alice@example.com", "password": "secret123"}),
    );
    let data = h.ok(&session, "user", "login", json!({"name": "alice", "password": "secret123"}));

    assert_eq!(data["name"], "alice");
    assert_eq!(data["email"], "alice@example.com");
    assert!(data.get("password").is_none());
    assert_eq!(session.require_login().unwrap().name, "alice");
}

#[test]
fn test_registration_rejects_short_name() {
    let h = Harness::new();
    let message = h.fail(
        &Session::new(),
        "user",
        "reg",
        json!({"name": "bob", "email": "bob@example.com", "password": "secret123"}),
    );
    assert_eq!(message, "Name must be at least 4 characters in length");
}

#[test]
fn test_duplicate_registration_conflicts() {
    let h = Harness::new();
    h.member("alice");

    let body = json!({"name": "alice", "email": "other@example.com", "password": "secret123"});
    assert_eq!(h.fail(&Session::new(), "user", "reg", body), "user name already exists");
    assert_eq!(
        h.fail(&Session::new(), "user", "check", json!({"name": "alice"})),
        "user name already exists"
    );
    h.ok(&Session::new(), "user", "check", json!({"name": "carol"}));
}

#[test]
fn test_login_failures() {
    let h = Harness::new();
    h.member("alice");
    let session = Session::new();

    assert_eq!(
        h.fail(&session, "user", "login", json!({"name": "alice"})),
        "Password is a required field"
    );
    assert_eq!(
        h.fail(&session, "user", "login", json!({"name": "nobody", "password": "secret123"})),
        "user name does not exist"
    );
    assert_eq!(
        h.fail(&session, "user", "login", json!({"name": "alice", "password": "wrongpass1"})),
        "user name and password do not match"
    );
    assert!(session.principal().is_none());
}

// =============================================================================
// NODES
// =============================================================================

#[test]
fn test_node_lifecycle() {
    let h = Harness::new();
    let admin = Session::new();
    let id = h.node(&admin);

    assert_eq!(
        h.fail(&admin, "node", "add", json!({"name": "tech", "title": "Again"})),
        "node name already exists"
    );

    h.ok(&admin, "node", "save", json!({"id": id, "title": "Tech"}));
    let info = h.ok(&admin, "node", "info", json!({"name": "tech"}));
    assert_eq!(info["title"], "Tech");
    assert_eq!(info["id"], id.as_str());

    assert_eq!(
        h.fail(&admin, "node", "save", json!({"title": "No id"})),
        "Identifier must not be empty"
    );

    h.ok(&admin, "node", "remove", json!({"id": id}));
    h.ok(&admin, "node", "remove", json!({"id": id}));
    assert_eq!(h.fail(&admin, "node", "info", json!({"id": id})), "Node not found");
}

#[test]
fn test_node_with_topics_cannot_be_removed() {
    let h = Harness::new();
    let alice = h.member("alice");
    let node = h.node(&alice);
    h.topic(&alice, &node);

    assert_eq!(
        h.fail(&alice, "node", "remove", json!({"id": node})),
        "node still has topics"
    );
}

// =============================================================================
// TOPICS AND REPLIES
// =============================================================================

#[test]
fn test_topic_requires_login() {
    let h = Harness::new();
    let anonymous = Session::new();
    let node = h.node(&anonymous);

    let message = h.fail(
        &anonymous,
        "topic",
        "add",
        json!({"node": node, "title": "Hello", "content": "x"}),
    );
    assert_eq!(message, "please log in first");
}

/// Scenario D: replying to someone else's topic notifies them; replying to
/// your own does not. Reply and marker update happen either way.
#[test]
fn test_reply_notifies_topic_author_only_when_someone_else_replies() {
    let h = Harness::new();
    let alice = h.member("alice");
    let bob = h.member("bobby");
    let node = h.node(&alice);
    let topic = h.topic(&alice, &node);

    let (_sub, mut rx) = h.bus.subscribe("observer");

    // Author replies to their own topic
    h.ok(&alice, "replay", "add", json!({"topic": topic, "content": "bump"}));
    let events = drain(&mut rx);
    assert!(events.contains(&("replay".into(), "list".into())));
    assert!(events.contains(&("topic".into(), "list".into())));
    assert!(!events.contains(&("notice".into(), "list".into())));

    let notices = h.ok(&alice, "notice", "list", json!({}));
    assert_eq!(notices["total"], 0);

    // Someone else replies
    h.ok(&bob, "replay", "add", json!({"topic": topic, "content": "welcome"}));
    let events = drain(&mut rx);
    assert!(events.contains(&("notice".into(), "list".into())));

    let notices = h.ok(&alice, "notice", "list", json!({}));
    assert_eq!(notices["total"], 1);
    assert_eq!(notices["unread"], 1);
    assert_eq!(notices["items"][0]["user"], "bobby");
    assert_eq!(notices["items"][0]["topic_title"], "Hello");

    let info = h.ok(&alice, "topic", "info", json!({"id": topic}));
    assert_eq!(info["replay_count"], 2);
    assert_eq!(info["last_replay_user"], "bobby");

    let replies = h.ok(&alice, "replay", "list", json!({"topic": topic}));
    assert_eq!(replies["total"], 2);
    assert_eq!(replies["items"][0]["content"], "bump");
}

#[test]
fn test_reply_to_unknown_topic() {
    let h = Harness::new();
    let bob = h.member("bobby");
    assert_eq!(
        h.fail(&bob, "replay", "add", json!({"topic": "missing", "content": "hi"})),
        "Topic not found"
    );
}

#[test]
fn test_blank_topic_id_is_an_empty_identity() {
    let h = Harness::new();
    let bob = h.member("bobby");
    assert_eq!(
        h.fail(&bob, "topic", "info", json!({"id": ""})),
        "Identifier must not be empty"
    );
    assert_eq!(
        h.fail(&bob, "replay", "add", json!({"topic": " ", "content": "hi"})),
        "Identifier must not be empty"
    );
}

#[test]
fn test_huge_page_number_yields_empty_page() {
    let h = Harness::new();
    let alice = h.member("alice");
    let node = h.node(&alice);
    h.topic(&alice, &node);

    let page = h.ok(&alice, "topic", "list", json!({"node": node, "page": usize::MAX}));
    assert_eq!(page["items"], json!([]));
    assert_eq!(page["total"], 1);

    let replies = h.ok(&alice, "replay", "list", json!({"topic": "t1", "page": usize::MAX}));
    assert_eq!(replies["items"], json!([]));
}

#[test]
fn test_notice_read_and_remove_are_owner_only() {
    let h = Harness::new();
    let alice = h.member("alice");
    let bob = h.member("bobby");
    let node = h.node(&alice);
    let topic = h.topic(&alice, &node);
    h.ok(&bob, "replay", "add", json!({"topic": topic, "content": "welcome"}));

    let notices = h.ok(&alice, "notice", "list", json!({}));
    let id = notices["items"][0]["id"].as_str().unwrap().to_string();

    assert_eq!(h.fail(&bob, "notice", "read", json!({"id": id})), "Notice not found");
    h.ok(&alice, "notice", "read", json!({"id": id}));
    assert_eq!(h.ok(&alice, "notice", "list", json!({}))["unread"], 0);

    assert_eq!(h.fail(&bob, "notice", "remove", json!({"id": id})), "Notice not found");
    h.ok(&alice, "notice", "remove", json!({"id": id}));
    assert_eq!(h.ok(&alice, "notice", "list", json!({}))["total"], 0);
}

// =============================================================================
// PARTIAL SEQUENCES
// =============================================================================

/// MemoryStore whose notice inserts always fail
#[derive(Default)]
struct NoNotices {
    inner: MemoryStore,
}

impl DocumentStore for NoNotices {
    fn insert(&self, collection: &str, document: Document) -> StoreResult<String> {
        if collection == "notice" {
            return Err(StoreError::Unavailable("notice shard offline".into()));
        }
        self.inner.insert(collection, document)
    }
    fn update_by_id(&self, collection: &str, id: &str, patch: Document) -> StoreResult<bool> {
        self.inner.update_by_id(collection, id, patch)
    }
    fn remove_by_id(&self, collection: &str, id: &str) -> StoreResult<bool> {
        self.inner.remove_by_id(collection, id)
    }
    fn find_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        self.inner.find_by_id(collection, id)
    }
    fn find(&self, collection: &str, filter: &Filter, options: FindOptions) -> StoreResult<Vec<Value>> {
        self.inner.find(collection, filter, options)
    }
    fn count(&self, collection: &str, filter: &Filter) -> StoreResult<usize> {
        self.inner.count(collection, filter)
    }
}

/// A failing notice insert surfaces as a failure, but the reply and the
/// topic marker written before it stay.
#[test]
fn test_failed_notice_keeps_earlier_writes() {
    let h = Harness::with_store(Arc::new(NoNotices::default()));
    let alice = h.member("alice");
    let bob = h.member("bobby");
    let node = h.node(&alice);
    let topic = h.topic(&alice, &node);

    let message = h.fail(&bob, "replay", "add", json!({"topic": topic, "content": "welcome"}));
    assert_eq!(message, "Internal server error");

    let replies = h.ok(&bob, "replay", "list", json!({"topic": topic}));
    assert_eq!(replies["total"], 1);
    let info = h.ok(&bob, "topic", "info", json!({"id": topic}));
    assert_eq!(info["replay_count"], 1);
}
