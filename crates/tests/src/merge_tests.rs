use serde_json::Value;

use crate::fixtures::test_app::TestApp;
use crate::fixtures::seed::SeededUser;

/// Sets up the classic collision: the guest already owns a list with the
/// same title as the one they were just invited to. Returns
/// (owner, guest, shared list id, guest's own list id).
async fn seed_collision(app: &TestApp, slug: &str) -> (SeededUser, SeededUser, String, String) {
    let owner = app
        .register_user(
            &format!("owner@{}.test", slug),
            &format!("{}_owner", slug),
            "Alice",
            "Owner123!",
        )
        .await;
    let guest = app
        .register_user(
            &format!("guest@{}.test", slug),
            &format!("{}_guest", slug),
            "Bella",
            "Guest123!",
        )
        .await;

    let own_list = app.create_list(&guest.access_token, "groceries").await;
    let shared_list = app.create_list(&owner.access_token, "Groceries").await;

    let token = app
        .issue_invite(&owner.access_token, &shared_list, &guest.email, "editor")
        .await;
    app.accept_invite(&guest.access_token, &token).await;

    (owner, guest, shared_list, own_list)
}

#[tokio::test]
async fn accept_reports_title_collision() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("cowner@example.com", "cowner", "Alice", "Secret123!")
        .await;
    let guest = app
        .register_user("cguest@example.com", "cguest", "Bella", "Secret123!")
        .await;

    let own_list = app.create_list(&guest.access_token, "  GROCERIES ").await;
    let shared_list = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &shared_list, &guest.email, "editor")
        .await;

    // Title matching ignores case and surrounding whitespace.
    let json = app.accept_invite(&guest.access_token, &token).await;
    assert_eq!(json["collision"]["id"].as_str().unwrap(), own_list);

    // The collision endpoint reports the same, and nothing was merged
    // automatically.
    let resp = app
        .auth_get(
            &format!("/api/list/{}/collision", shared_list),
            &guest.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["collision"]["id"].as_str().unwrap(), own_list);

    let resp = app.auth_get("/api/list", &guest.access_token).send().await.unwrap();
    let lists: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(lists.len(), 2);
}

#[tokio::test]
async fn no_collision_without_matching_title() {
    let app = TestApp::spawn().await;
    let seeded = app.seed_shared_list("nocoll", "Hardware").await;

    let resp = app
        .auth_get(
            &format!("/api/list/{}/collision", seeded.list_id),
            &seeded.member.access_token,
        )
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert!(json["collision"].is_null());
}

#[tokio::test]
async fn merge_moves_items_and_skips_duplicates() {
    let app = TestApp::spawn().await;
    let (_owner, guest, shared_list, own_list) = seed_collision(&app, "merge").await;

    // Own list: Milk (barcode), Bread. Shared list: Milk (same barcode),
    // Eggs.
    app.auth_post(&format!("/api/list/{}/item", own_list), &guest.access_token)
        .json(&serde_json::json!({ "name": "Milk", "barcode": "4001234" }))
        .send()
        .await
        .unwrap();
    app.create_item(&guest.access_token, &own_list, "Bread").await;

    app.auth_post(&format!("/api/list/{}/item", shared_list), &guest.access_token)
        .json(&serde_json::json!({ "name": "Milch", "barcode": "4001234" }))
        .send()
        .await
        .unwrap();
    app.create_item(&guest.access_token, &shared_list, "Eggs").await;

    let resp = app
        .auth_post(&format!("/api/list/{}/merge", own_list), &guest.access_token)
        .json(&serde_json::json!({ "target_list_id": shared_list }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    // Milk collides by barcode despite the different name; Bread moves.
    assert_eq!(json["moved"], 1);
    assert_eq!(json["skipped"], 1);

    // The source list is gone.
    let resp = app
        .auth_get(&format!("/api/list/{}", own_list), &guest.access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    let resp = app
        .auth_get(&format!("/api/list/{}/item", shared_list), &guest.access_token)
        .send()
        .await
        .unwrap();
    let items: Vec<Value> = resp.json().await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i["name"].as_str().unwrap()).collect();
    assert_eq!(items.len(), 3);
    assert!(names.contains(&"Bread"));
    assert!(names.contains(&"Milch"));
    assert!(names.contains(&"Eggs"));
}

#[tokio::test]
async fn merge_dedups_by_normalized_name_without_barcode() {
    let app = TestApp::spawn().await;
    let (_owner, guest, shared_list, own_list) = seed_collision(&app, "nameddup").await;

    app.create_item(&guest.access_token, &own_list, "  MILK ").await;
    app.create_item(&guest.access_token, &shared_list, "milk").await;

    let resp = app
        .auth_post(&format!("/api/list/{}/merge", own_list), &guest.access_token)
        .json(&serde_json::json!({ "target_list_id": shared_list }))
        .send()
        .await
        .unwrap();
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["moved"], 0);
    assert_eq!(json["skipped"], 1);
}

#[tokio::test]
async fn merge_requires_edit_rights_on_both_lists() {
    let app = TestApp::spawn().await;
    let owner = app
        .register_user("mowner@example.com", "mowner", "M Owner", "Secret123!")
        .await;
    let viewer = app
        .register_user("mviewer@example.com", "mviewer", "M Viewer", "Secret123!")
        .await;

    let shared_list = app.create_list(&owner.access_token, "Groceries").await;
    let token = app
        .issue_invite(&owner.access_token, &shared_list, &viewer.email, "viewer")
        .await;
    app.accept_invite(&viewer.access_token, &token).await;

    let own_list = app.create_list(&viewer.access_token, "groceries").await;

    // Viewer on the target: merging into it is denied.
    let resp = app
        .auth_post(&format!("/api/list/{}/merge", own_list), &viewer.access_token)
        .json(&serde_json::json!({ "target_list_id": shared_list }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 403);
}

#[tokio::test]
async fn merge_into_itself_is_rejected() {
    let app = TestApp::spawn().await;
    let user = app
        .register_user("selfish@example.com", "selfish", "Selfish", "Secret123!")
        .await;
    let list_id = app.create_list(&user.access_token, "Groceries").await;

    let resp = app
        .auth_post(&format!("/api/list/{}/merge", list_id), &user.access_token)
        .json(&serde_json::json!({ "target_list_id": list_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 400);
}

#[tokio::test]
async fn rename_suffix_uses_explicit_suffix() {
    let app = TestApp::spawn().await;
    let (_owner, guest, shared_list, _own_list) = seed_collision(&app, "explicit").await;

    let resp = app
        .auth_post(
            &format!("/api/list/{}/rename-suffix", shared_list),
            &guest.access_token,
        )
        .json(&serde_json::json!({ "suffix": "work" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["title"], "Groceries (work)");
}

#[tokio::test]
async fn rename_suffix_defaults_to_inviter_name() {
    let app = TestApp::spawn().await;
    let (_owner, guest, shared_list, _own_list) = seed_collision(&app, "implicit").await;

    let resp = app
        .auth_post(
            &format!("/api/list/{}/rename-suffix", shared_list),
            &guest.access_token,
        )
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // The inviter registered with display name "Alice".
    let json: Value = resp.json().await.unwrap();
    assert_eq!(json["title"], "Groceries (Alice)");
}
