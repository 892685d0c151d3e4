use bson::doc;
use serde_json::Value;

use crate::fixtures::test_app::TestApp;

#[tokio::test]
async fn issue_writes_both_copies_atomically() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("dual@example.com", "dual", "Dual", "Secret123!")
        .await;
    let list_id = app.create_list(&owner.access_token, "Groceries").await;

    let token = app
        .issue_invite(&owner.access_token, &list_id, "guest@example.com", "editor")
        .await;

    let scoped = app
        .db
        .collection::<bson::Document>("invites")
        .find_one(doc! { "token": &token })
        .await
        .unwrap()
        .expect("list-scoped copy missing");
    let inbox = app
        .db
        .collection::<bson::Document>("invites_inbox")
        .find_one(doc! { "token": &token })
        .await
        .unwrap()
        .expect("inbox copy missing");

    // Both copies share id, token and status.
    assert_eq!(scoped.get_object_id("_id"), inbox.get_object_id("_id"));
    assert_eq!(scoped.get_str("status").unwrap(), "pending");
    assert_eq!(inbox.get_str("status").unwrap(), "pending");
    assert_eq!(token.len(), 32);
}

#[tokio::test]
async fn accept_grants_membership_with_invited_role() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("inviter@example.com", "inviter", "Inviter", "Secret123!")
        .await;
    let guest = app
        .register_user("guest@example.com", "guest", "Guest", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &list_id, &guest.email, "editor")
        .await;

    let json = app.accept_invite(&guest.access_token, &token).await;
    assert_eq!(json["list_id"].as_str().unwrap(), list_id);
    assert_eq!(json["role"], "editor");

    // The guest can now read and write the list.
    let resp = app
        .auth_get(&format!("/api/list/{}", list_id), &guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    app.create_item(&guest.access_token, &list_id, "Cheese").await;
}

#[tokio::test]
async fn accept_is_idempotent_for_same_user() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("retry@example.com", "retry", "Retry", "Secret123!")
        .await;
    let guest = app
        .register_user("retrier@example.com", "retrier", "Retrier", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &list_id, &guest.email, "editor")
        .await;

    let first = app.accept_invite(&guest.access_token, &token).await;
    let second = app.accept_invite(&guest.access_token, &token).await;
    assert_eq!(first["list_id"], second["list_id"]);
    assert_eq!(first["role"], second["role"]);

    // Still exactly one member record for the guest.
    let count = app
        .db
        .collection::<bson::Document>("members")
        .count_documents(doc! {
            "user_id": bson::oid::ObjectId::parse_str(&guest.id).unwrap(),
        })
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn consumed_token_is_dead_for_other_users() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("towner@example.com", "towner", "T Owner", "Secret123!")
        .await;
    let first = app
        .register_user("first@example.com", "first", "First", "Secret123!")
        .await;
    let second = app
        .register_user("second@example.com", "second", "Second", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &list_id, &first.email, "editor")
        .await;
    app.accept_invite(&first.access_token, &token).await;

    let resp = app
        .auth_post("/api/invite/accept", &second.access_token)
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn unknown_token_is_not_found() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("lost@example.com", "lost", "Lost", "Secret123!")
        .await;

    let resp = app
        .auth_post("/api/invite/accept", &user.access_token)
        .json(&serde_json::json!({ "token": "00000000000000000000000000000000" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);
}

#[tokio::test]
async fn revoked_invite_cannot_be_accepted() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("revoker@example.com", "revoker", "Revoker", "Secret123!")
        .await;
    let guest = app
        .register_user("revoked@example.com", "revoked", "Revoked", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &list_id, &guest.email, "editor")
        .await;

    let resp = app
        .auth_get(&format!("/api/list/{}/invite", list_id), &owner.access_token)
        .send()
        .await
        .unwrap();
    let invites: Vec<Value> = resp.json().await.unwrap();
    let invite_id = invites[0]["id"].as_str().unwrap();

    let resp = app
        .auth_delete(
            &format!("/api/list/{}/invite/{}", list_id, invite_id),
            &owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Both copies carry the terminal status.
    for collection in ["invites", "invites_inbox"] {
        let docu = app
            .db
            .collection::<bson::Document>(collection)
            .find_one(doc! { "token": &token })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(docu.get_str("status").unwrap(), "revoked");
    }

    let resp = app
        .auth_post("/api/invite/accept", &guest.access_token)
        .json(&serde_json::json!({ "token": token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // Revoking again fails the pending precondition.
    let resp = app
        .auth_delete(
            &format!("/api/list/{}/invite/{}", list_id, invite_id),
            &owner.access_token,
        )
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 412);
}

#[tokio::test]
async fn overdue_invite_expires_on_access() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("expired@example.com", "expired", "Expired", "Secret123!")
        .await;
    let guest = app
        .register_user("late@example.com", "late", "Late", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &list_id, &guest.email, "editor")
        .await;

    // Backdate the deadline on both copies.
    let past = bson::DateTime::from_millis(bson::DateTime::now().timestamp_millis() - 1000);
    for collection in ["invites", "invites_inbox"] {
        app.db
            .collection::<bson::Document>(collection)
            .update_one(
                doc! { "token": &token },
                doc! { "$set": { "expires_at": past } },
            )
            .await
            .unwrap();
    }

    let resp = app
        .auth_post("/api/invite/accept", &guest.access_token)
        .json(&serde_json::json!({ "token": &token }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 412);

    // The lazy transition is persisted in both copies.
    for collection in ["invites", "invites_inbox"] {
        let docu = app
            .db
            .collection::<bson::Document>(collection)
            .find_one(doc! { "token": &token })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(docu.get_str("status").unwrap(), "expired");
    }
}

#[tokio::test]
async fn invalid_email_is_rejected() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("mailcheck@example.com", "mailcheck", "Mail", "Secret123!")
        .await;
    let list_id = app.create_list(&owner.access_token, "Groceries").await;

    let resp = app
        .auth_post(&format!("/api/list/{}/invite", list_id), &owner.access_token)
        .json(&serde_json::json!({ "email": "not-an-email", "role": "editor" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn owner_role_invite_is_rejected() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("noowners@example.com", "noowners", "No Owners", "Secret123!")
        .await;
    let list_id = app.create_list(&owner.access_token, "Groceries").await;

    let resp = app
        .auth_post(&format!("/api/list/{}/invite", list_id), &owner.access_token)
        .json(&serde_json::json!({ "email": "someone@example.com", "role": "owner" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn viewer_cannot_issue_invites() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("strict@example.com", "strict", "Strict", "Secret123!")
        .await;
    let viewer = app
        .register_user("watcher@example.com", "watcher", "Watcher", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &list_id, &viewer.email, "viewer")
        .await;
    app.accept_invite(&viewer.access_token, &token).await;

    let resp = app
        .auth_post(&format!("/api/list/{}/invite", list_id), &viewer.access_token)
        .json(&serde_json::json!({ "email": "friend@example.com", "role": "editor" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn inbox_shows_pending_invites_only() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("sender@example.com", "sender", "Sender", "Secret123!")
        .await;
    let guest = app
        .register_user("receiver@example.com", "receiver", "Receiver", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;
    // Case-insensitive addressing: issued to the uppercased address.
    let token = app
        .issue_invite(
            &owner.access_token,
            &list_id,
            "RECEIVER@example.com",
            "editor",
        )
        .await;

    let resp = app
        .auth_get("/api/invite/inbox", &guest.access_token)
        .send()
        .await
        .unwrap();
    let inbox: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0]["list_title"], "Groceries");
    assert_eq!(inbox[0]["status"], "pending");

    app.accept_invite(&guest.access_token, &token).await;

    let resp = app
        .auth_get("/api/invite/inbox", &guest.access_token)
        .send()
        .await
        .unwrap();
    let inbox: Vec<Value> = resp.json().await.unwrap();
    assert!(inbox.is_empty());
}

#[tokio::test]
async fn accept_works_with_deep_link() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("linker@example.com", "linker", "Linker", "Secret123!")
        .await;
    let guest = app
        .register_user("linked@example.com", "linked", "Linked", "Secret123!")
        .await;

    let list_id = app.create_list(&owner.access_token, "Groceries").await;

    // The issue response carries the shareable link.
    let resp = app
        .auth_post(&format!("/api/list/{}/invite", list_id), &owner.access_token)
        .json(&serde_json::json!({ "email": guest.email, "role": "editor" }))
        .send()
        .await
        .unwrap();
    let invite: Value = resp.json().await.unwrap();
    let link = invite["link"].as_str().unwrap().to_string();
    assert!(link.contains("/invite/"));

    let resp = app
        .auth_post("/api/invite/accept", &guest.access_token)
        .json(&serde_json::json!({ "link": link }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // Query-parameter form resolves to the same token and stays
    // idempotent for the same user.
    let token = invite["token"].as_str().unwrap();
    let resp = app
        .auth_post("/api/invite/accept", &guest.access_token)
        .json(&serde_json::json!({
            "link": format!("https://shoply.test/join?token={}", token),
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);
}

#[tokio::test]
async fn accept_without_token_or_link_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("empty@example.com", "empty", "Empty", "Secret123!")
        .await;

    let resp = app
        .auth_post("/api/invite/accept", &user.access_token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn repeated_invites_create_independent_tokens() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("again@example.com", "again", "Again", "Secret123!")
        .await;
    let list_id = app.create_list(&owner.access_token, "Groceries").await;

    let first = app
        .issue_invite(&owner.access_token, &list_id, "twice@example.com", "editor")
        .await;
    let second = app
        .issue_invite(&owner.access_token, &list_id, "twice@example.com", "editor")
        .await;
    assert_ne!(first, second);

    let count = app
        .db
        .collection::<bson::Document>("invites")
        .count_documents(doc! { "email_lower": "twice@example.com" })
        .await
        .unwrap();
    assert_eq!(count, 2);
}
