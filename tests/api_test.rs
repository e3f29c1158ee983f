//! End-to-end tests against the real router on an ephemeral port.
//!
//! Covers:
//! - Registration, login and bearer-token authentication
//! - Ownership and role checks on posts and admin endpoints
//! - Ban enforcement on mutating requests
//! - Likes, follows and the notifications they produce
//! - Uploads, serving and the body size limit

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;

use blogger::auth::token::TokenKeys;
use blogger::config::Config;
use blogger::services::users;
use blogger::state::AppState;
use blogger::{app, db};

const UPLOAD_LIMIT: usize = 1024;

struct TestServer {
    base: String,
    client: Client,
    tmp: TempDir,
}

struct Account {
    id: i64,
    token: String,
}

async fn spawn_server() -> TestServer {
    let tmp = TempDir::new().unwrap();
    let mut config = Config::default();
    config.resolve_paths(tmp.path());
    config.auth.jwt_secret = Some("integration-secret".into());
    config.storage.max_upload_bytes = UPLOAD_LIMIT;

    let pool = db::create_pool(&config.db_path()).unwrap();
    db::run_migrations(&pool).unwrap();
    users::ensure_admin(&pool.get().unwrap(), &config.admin).unwrap();

    let state = AppState::new(pool, config);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });

    TestServer {
        base: format!("http://{}", addr),
        client: Client::new(),
        tmp,
    }
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn register(&self, name: &str) -> Account {
        let res = self
            .client
            .post(self.url("/auth/register"))
            .json(&json!({
                "username": name,
                "email": format!("{name}@example.com"),
                "password": "secret1",
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        Account {
            id: body["id"].as_i64().unwrap(),
            token: body["accessToken"].as_str().unwrap().to_string(),
        }
    }

    async fn admin(&self) -> Account {
        let res = self
            .client
            .post(self.url("/auth/login"))
            .json(&json!({ "username": "admin", "password": "Admin@123" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["role"], "ADMIN");
        Account {
            id: body["id"].as_i64().unwrap(),
            token: body["accessToken"].as_str().unwrap().to_string(),
        }
    }

    async fn upload(&self, who: &Account, name: &str, mime: &str) -> Value {
        let form = Form::new().part(
            "file",
            Part::bytes(b"image-bytes".to_vec())
                .file_name(name.to_string())
                .mime_str(mime)
                .unwrap(),
        );
        let res = self
            .client
            .post(self.url("/auth/posts/upload"))
            .bearer_auth(&who.token)
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }

    async fn create_post(&self, who: &Account, title: &str) -> Value {
        let res = self
            .client
            .post(self.url("/auth/posts"))
            .bearer_auth(&who.token)
            .json(&json!({ "title": title, "content": "Body text", "tags": ["rust"] }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        res.json().await.unwrap()
    }
}

#[tokio::test]
async fn register_login_and_fetch_profile() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "email": "alice@example.com", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "USER");
    assert!(body["refreshToken"].is_null());

    let me: Value = server
        .client
        .get(server.url("/auth/users/me"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["id"], alice.id);
    assert_eq!(me["email"], "alice@example.com");
    assert!(me.get("passwordHash").is_none());
}

#[tokio::test]
async fn duplicate_registration_is_conflict() {
    let server = spawn_server().await;
    server.register("alice").await;

    let res = server
        .client
        .post(server.url("/auth/register"))
        .json(&json!({
            "username": "alice2",
            "email": "alice@example.com",
            "password": "secret1",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let server = spawn_server().await;
    server.register("alice").await;

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "username": "alice", "password": "wrong-pass" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");
}

#[tokio::test]
async fn missing_or_forged_token_is_unauthorized() {
    let server = spawn_server().await;
    server.register("alice").await;

    let res = server
        .client
        .get(server.url("/auth/users/me"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = server
        .client
        .get(server.url("/auth/users/me"))
        .bearer_auth("garbage.token.value")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = TokenKeys::new(b"some-other-secret", 1).issue("alice").unwrap();
    let res = server
        .client
        .get(server.url("/auth/users/me"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let server = spawn_server().await;
    let res = server
        .client
        .post(server.url("/auth/register"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn validation_errors_list_fields() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;

    let res = server
        .client
        .post(server.url("/auth/posts"))
        .bearer_auth(&alice.token)
        .json(&json!({ "title": "", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Validation failed");
    assert_eq!(body["errors"]["title"], "Title is required");
}

#[tokio::test]
async fn non_owner_cannot_edit_or_delete_post() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let mallory = server.register("mallory").await;
    let post = server.create_post(&alice, "Alice's post").await;
    let post_url = server.url(&format!("/auth/posts/{}", post["id"]));

    let res = server
        .client
        .put(&post_url)
        .bearer_auth(&mallory.token)
        .json(&json!({ "title": "Hijacked", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .delete(&post_url)
        .bearer_auth(&mallory.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .put(&post_url)
        .bearer_auth(&alice.token)
        .json(&json!({ "title": "Edited", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["title"], "Edited");
    assert_eq!(body["tags"], json!(["rust"]));

    let res = server
        .client
        .delete(&post_url)
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["success"], true);

    let res = server.client.get(&post_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn banned_user_cannot_write_but_can_read() {
    let server = spawn_server().await;
    let admin = server.admin().await;
    let bob = server.register("bob").await;

    let res = server
        .client
        .put(server.url(&format!("/auth/admin/users/{}/ban", bob.id)))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .post(server.url("/auth/posts"))
        .bearer_auth(&bob.token)
        .json(&json!({ "title": "Still here", "content": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .get(server.url("/auth/users/me"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = res.json().await.unwrap();
    assert_eq!(me["isBanned"], true);

    let page: Value = server
        .client
        .get(server.url("/auth/posts"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(page["total"], 0);

    let res = server
        .client
        .post(server.url("/auth/login"))
        .json(&json!({ "username": "bob", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn likes_follows_and_notifications() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;

    // bob follows alice, then alice posts
    let res = server
        .client
        .post(server.url(&format!("/auth/users/{}/follow", alice.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .post(server.url(&format!("/auth/users/{}/follow", alice.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let post = server.create_post(&alice, "Hello world").await;
    let like_url = server.url(&format!("/auth/posts/{}/like", post["id"]));

    for _ in 0..2 {
        let liked: Value = server
            .client
            .post(&like_url)
            .bearer_auth(&bob.token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(liked["likeCount"], 1);
    }

    let feed: Value = server
        .client
        .get(server.url("/auth/posts/following"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(feed.as_array().unwrap().len(), 1);

    let bob_inbox: Value = server
        .client
        .get(server.url("/auth/notifications"))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bob_inbox[0]["type"], "NEW_POST");
    assert_eq!(bob_inbox[0]["message"], "alice published a new post: Hello world");

    let count: Value = server
        .client
        .get(server.url("/auth/notifications/unread/count"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    // NEW_FOLLOWER + one POST_LIKE
    assert_eq!(count["count"], 2);

    let alice_inbox: Value = server
        .client
        .get(server.url("/auth/notifications"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let first_id = alice_inbox[0]["id"].as_i64().unwrap();

    // bob cannot touch alice's notification
    let res = server
        .client
        .put(server.url(&format!("/auth/notifications/{first_id}/read")))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .put(server.url("/auth/notifications/read-all"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let count: Value = server
        .client
        .get(server.url("/auth/notifications/unread/count"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn comments_and_comment_likes() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post = server.create_post(&alice, "Discuss").await;

    let res = server
        .client
        .post(server.url(&format!("/auth/posts/{}/comments", post["id"])))
        .bearer_auth(&bob.token)
        .json(&json!({ "content": "First!" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let added: Value = res.json().await.unwrap();
    assert_eq!(added["commentContent"], "First!");
    assert_eq!(added["author"], "bob");
    let comment_id = added["comment"]["id"].as_i64().unwrap();

    let liked: Value = server
        .client
        .post(server.url(&format!(
            "/auth/posts/{}/comments/{comment_id}/like",
            post["id"]
        )))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(liked["likeCount"], 1);

    let has_liked: bool = server
        .client
        .get(server.url(&format!(
            "/auth/posts/{}/comments/{comment_id}/liked",
            post["id"]
        )))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(has_liked);

    let comments: Value = server
        .client
        .get(server.url(&format!("/auth/posts/{}/comments", post["id"])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(comments[0]["content"], "First!");
    assert_eq!(comments[0]["likeCount"], 1);
}

#[tokio::test]
async fn admin_endpoints_require_admin_role() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let admin = server.admin().await;

    let res = server
        .client
        .get(server.url("/auth/admin/stats"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    server.create_post(&alice, "Counted").await;
    let stats: Value = server
        .client
        .get(server.url("/auth/admin/stats"))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["totalUsers"], 2);
    assert_eq!(stats["totalPosts"], 1);
    assert_eq!(stats["adminUsers"], 1);
}

#[tokio::test]
async fn hidden_posts_and_reports() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let admin = server.admin().await;
    let post = server.create_post(&alice, "Questionable").await;

    let res = server
        .client
        .post(server.url("/auth/reports"))
        .bearer_auth(&bob.token)
        .json(&json!({ "postId": post["id"], "message": "spam" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let report: Value = res.json().await.unwrap();
    assert_eq!(report["postTitle"], "Questionable");
    assert_eq!(report["reporterUsername"], "bob");

    let count: Value = server
        .client
        .get(server.url("/auth/reports/admin/count-unresolved"))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 1);

    let res = server
        .client
        .put(server.url(&format!("/auth/admin/posts/{}/hide", post["id"])))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let post_url = server.url(&format!("/auth/posts/{}", post["id"]));
    let res = server.client.get(&post_url).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = server
        .client
        .get(&post_url)
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let all: Value = server
        .client
        .get(server.url("/auth/admin/posts"))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all["total"], 1);
    assert_eq!(all["posts"][0]["isHidden"], true);
}

#[tokio::test]
async fn upload_serve_and_delete_media() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;

    let form = Form::new().part(
        "file",
        Part::bytes(b"GIF89a-small".to_vec())
            .file_name("tiny.gif")
            .mime_str("image/gif")
            .unwrap(),
    );
    let res = server
        .client
        .post(server.url("/auth/posts/upload"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let upload: Value = res.json().await.unwrap();
    assert_eq!(upload["mediaType"], "gif");
    let url = upload["url"].as_str().unwrap().to_string();
    let filename = upload["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with(".gif"));

    let res = server.client.get(server.url(&url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()["content-type"], "image/gif");
    assert_eq!(res.bytes().await.unwrap().as_ref(), b"GIF89a-small");

    let res = server
        .client
        .post(server.url("/auth/posts"))
        .bearer_auth(&alice.token)
        .json(&json!({
            "title": "With media",
            "content": "x",
            "mediaType": "gif",
            "mediaUrl": url,
        }))
        .send()
        .await
        .unwrap();
    let post: Value = res.json().await.unwrap();

    let stored = server.tmp.path().join("uploads").join(&filename);
    assert!(stored.exists());

    let res = server
        .client
        .delete(server.url(&format!("/auth/posts/{}", post["id"])))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!stored.exists());

    let res = server.client.get(server.url(&url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;

    let form = Form::new().part(
        "file",
        Part::bytes(vec![b'x'; UPLOAD_LIMIT * 4])
            .file_name("big.bin")
            .mime_str("application/octet-stream")
            .unwrap(),
    );
    let res = server
        .client
        .post(server.url("/auth/posts/upload"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn profile_picture_must_be_an_image() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;

    let form = Form::new().part(
        "file",
        Part::bytes(b"plain text".to_vec())
            .file_name("notes.txt")
            .mime_str("text/plain")
            .unwrap(),
    );
    let res = server
        .client
        .post(server.url("/auth/users/upload-profile-picture"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let form = Form::new().part(
        "file",
        Part::bytes(b"png-bytes".to_vec())
            .file_name("me.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let res = server
        .client
        .post(server.url("/auth/users/upload-profile-picture"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = res.json().await.unwrap();

    let me: Value = server
        .client
        .get(server.url("/auth/users/me"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["profilePictureUrl"], body["url"]);
}

#[tokio::test]
async fn deleting_account_removes_its_content() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let post = server.create_post(&alice, "Soon gone").await;
    let bob_post = server.create_post(&bob, "Stays").await;

    server
        .client
        .post(server.url(&format!("/auth/posts/{}/like", bob_post["id"])))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();

    let res = server
        .client
        .delete(server.url(&format!("/auth/users/{}", alice.id)))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = server
        .client
        .delete(server.url(&format!("/auth/users/{}", alice.id)))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = server
        .client
        .get(server.url(&format!("/auth/posts/{}", post["id"])))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let survivor: Value = server
        .client
        .get(server.url(&format!("/auth/posts/{}", bob_post["id"])))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(survivor["likeCount"], 0);

    // the old token now names a user that no longer exists
    let res = server
        .client
        .get(server.url("/auth/users/me"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reusing_another_users_media_url_leaves_their_file() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let mallory = server.register("mallory").await;

    let upload = server.upload(&alice, "cat.png", "image/png").await;
    let url = upload["url"].as_str().unwrap().to_string();
    let stored = server
        .tmp
        .path()
        .join("uploads")
        .join(upload["filename"].as_str().unwrap());
    let media_post = json!({
        "title": "Cat",
        "content": "x",
        "mediaType": "image",
        "mediaUrl": url,
    });

    let res = server
        .client
        .post(server.url("/auth/posts"))
        .bearer_auth(&alice.token)
        .json(&media_post)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let copy: Value = server
        .client
        .post(server.url("/auth/posts"))
        .bearer_auth(&mallory.token)
        .json(&media_post)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let res = server
        .client
        .delete(server.url(&format!("/auth/posts/{}", copy["id"])))
        .bearer_auth(&mallory.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(stored.exists());

    let res = server
        .client
        .put(server.url(&format!("/auth/users/{}", mallory.id)))
        .bearer_auth(&mallory.token)
        .json(&json!({ "profilePictureUrl": url }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let res = server
        .client
        .delete(server.url(&format!("/auth/users/{}", mallory.id)))
        .bearer_auth(&mallory.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(stored.exists());

    let res = server.client.get(server.url(&url)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn account_deletion_removes_profile_picture_file() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;

    let form = Form::new().part(
        "file",
        Part::bytes(b"png-bytes".to_vec())
            .file_name("me.png")
            .mime_str("image/png")
            .unwrap(),
    );
    let picture: Value = server
        .client
        .post(server.url("/auth/users/upload-profile-picture"))
        .bearer_auth(&alice.token)
        .multipart(form)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let stored = server
        .tmp
        .path()
        .join("uploads")
        .join(picture["filename"].as_str().unwrap());
    assert!(stored.exists());

    let res = server
        .client
        .delete(server.url(&format!("/auth/users/{}", alice.id)))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(!stored.exists());
}

#[tokio::test]
async fn hidden_post_cannot_be_liked() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    let bob = server.register("bob").await;
    let admin = server.admin().await;
    let post = server.create_post(&alice, "Hidden soon").await;

    server
        .client
        .put(server.url(&format!("/auth/admin/posts/{}/hide", post["id"])))
        .bearer_auth(&admin.token)
        .send()
        .await
        .unwrap();

    let res = server
        .client
        .post(server.url(&format!("/auth/posts/{}/like", post["id"])))
        .bearer_auth(&bob.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let count: Value = server
        .client
        .get(server.url("/auth/notifications/unread/count"))
        .bearer_auth(&alice.token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["count"], 0);
}

#[tokio::test]
async fn huge_page_number_returns_empty_page() {
    let server = spawn_server().await;
    let alice = server.register("alice").await;
    server.create_post(&alice, "Only").await;

    let res = server
        .client
        .get(server.url(&format!("/auth/posts?page={}&size=10", i64::MAX)))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let page: Value = res.json().await.unwrap();
    assert_eq!(page["total"], 1);
    assert_eq!(page["posts"].as_array().unwrap().len(), 0);
}
