use serde_json::Value;

use super::test_app::TestApp;

pub struct SeededUser {
    pub id: String,
    pub email: String,
    pub username: String,
    pub access_token: String,
    pub refresh_token: String,
}

/// A list shared between an owner and a second member who joined via
/// invite.
pub struct SeededSharedList {
    pub list_id: String,
    pub owner: SeededUser,
    pub member: SeededUser,
}

impl TestApp {
    /// Register a user and return their auth info.
    pub async fn register_user(
        &self,
        email: &str,
        username: &str,
        display_name: &str,
        password: &str,
    ) -> SeededUser {
        let resp = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&serde_json::json!({
                "email": email,
                "username": username,
                "display_name": display_name,
                "password": password,
            }))
            .send()
            .await
            .expect("Register request failed");

        assert_eq!(
            resp.status().as_u16(),
            201,
            "Register failed for {}",
            email
        );

        let json: Value = resp.json().await.expect("Failed to parse register response");

        SeededUser {
            id: json["user"]["id"].as_str().unwrap().to_string(),
            email: email.to_string(),
            username: username.to_string(),
            access_token: json["access_token"].as_str().unwrap().to_string(),
            refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn login_user(&self, email: &str, password: &str) -> SeededUser {
        let resp = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("Login request failed");

        assert!(
            resp.status().is_success(),
            "Login failed: {}",
            resp.text().await.unwrap_or_default()
        );

        let json: Value = resp.json().await.expect("Failed to parse login response");

        SeededUser {
            id: json["user"]["id"].as_str().unwrap().to_string(),
            email: email.to_string(),
            username: json["user"]["username"].as_str().unwrap().to_string(),
            access_token: json["access_token"].as_str().unwrap().to_string(),
            refresh_token: json["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    /// Create an authenticated request with the given token.
    pub fn auth_get(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_post(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_put(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    pub fn auth_delete(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
    }

    /// Create a list as the given user and return its id.
    pub async fn create_list(&self, token: &str, title: &str) -> String {
        let resp = self
            .auth_post("/api/list", token)
            .json(&serde_json::json!({ "title": title }))
            .send()
            .await
            .expect("Create list request failed");
        assert!(resp.status().is_success(), "Create list failed");

        let json: Value = resp.json().await.unwrap();
        json["id"].as_str().unwrap().to_string()
    }

    /// Add an item to a list and return its id.
    pub async fn create_item(&self, token: &str, list_id: &str, name: &str) -> String {
        let resp = self
            .auth_post(&format!("/api/list/{}/item", list_id), token)
            .json(&serde_json::json!({ "name": name }))
            .send()
            .await
            .expect("Create item request failed");
        assert!(resp.status().is_success(), "Create item failed");

        let json: Value = resp.json().await.unwrap();
        json["id"].as_str().unwrap().to_string()
    }

    /// Issue an invite for `email` and return the raw token.
    pub async fn issue_invite(
        &self,
        token: &str,
        list_id: &str,
        email: &str,
        role: &str,
    ) -> String {
        let resp = self
            .auth_post(&format!("/api/list/{}/invite", list_id), token)
            .json(&serde_json::json!({ "email": email, "role": role }))
            .send()
            .await
            .expect("Issue invite request failed");
        assert!(
            resp.status().is_success(),
            "Issue invite failed: {}",
            resp.text().await.unwrap_or_default()
        );

        let json: Value = resp.json().await.unwrap();
        json["token"].as_str().unwrap().to_string()
    }

    /// Accept an invite by token, returning the full accept response.
    pub async fn accept_invite(&self, token: &str, invite_token: &str) -> Value {
        let resp = self
            .auth_post("/api/invite/accept", token)
            .json(&serde_json::json!({ "token": invite_token }))
            .send()
            .await
            .expect("Accept invite request failed");
        assert!(
            resp.status().is_success(),
            "Accept invite failed: {}",
            resp.text().await.unwrap_or_default()
        );
        resp.json().await.unwrap()
    }

    /// Seed a list owned by one user with a second user joined as editor.
    pub async fn seed_shared_list(&self, slug: &str, title: &str) -> SeededSharedList {
        let owner = self
            .register_user(
                &format!("owner@{}.test", slug),
                &format!("{}_owner", slug),
                &format!("{} Owner", slug),
                "Owner123!",
            )
            .await;
        let member = self
            .register_user(
                &format!("member@{}.test", slug),
                &format!("{}_member", slug),
                &format!("{} Member", slug),
                "Member123!",
            )
            .await;

        let list_id = self.create_list(&owner.access_token, title).await;
        let invite_token = self
            .issue_invite(&owner.access_token, &list_id, &member.email, "editor")
            .await;
        self.accept_invite(&member.access_token, &invite_token).await;

        SeededSharedList {
            list_id,
            owner,
            member,
        }
    }
}
