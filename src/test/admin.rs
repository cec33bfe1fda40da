#[cfg(test)]
mod tests {
    use crate::api::UserData;
    use crate::test::test_utils::{
        bearer, create_standard_test_db, login_test_user, setup_test_client,
    };
    use rocket::http::{ContentType, Status};
    use serde_json::{Value, json};

    #[rocket::async_test]
    async fn test_list_users_requires_admin() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let response = client.get("/api/admin/users").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);

        let player_token = login_test_user(&client, "player_user", "password123").await;
        let response = client
            .get("/api/admin/users")
            .header(bearer(&player_token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let editor_token = login_test_user(&client, "editor_user", "password123").await;
        let response = client
            .get("/api/admin/users")
            .header(bearer(&editor_token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);

        let admin_token = login_test_user(&client, "admin_user", "password123").await;
        let response = client
            .get("/api/admin/users")
            .header(bearer(&admin_token))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);

        let body = response.into_string().await.unwrap();
        let users: Vec<UserData> = serde_json::from_str(&body).unwrap();
        assert_eq!(users.len(), 4);
    }

    #[rocket::async_test]
    async fn test_admin_updates_user() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let player_id = test_db.user_id("player_user").unwrap();
        let admin_token = login_test_user(&client, "admin_user", "password123").await;

        let response = client
            .put(format!("/api/admin/users/{}", player_id))
            .header(ContentType::JSON)
            .header(bearer(&admin_token))
            .body(
                json!({
                    "display_name": "Promoted Player",
                    "is_editor": true
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let response = client
            .get("/api/admin/users")
            .header(bearer(&admin_token))
            .dispatch()
            .await;
        let body = response.into_string().await.unwrap();
        let users: Vec<UserData> = serde_json::from_str(&body).unwrap();
        let promoted = users
            .iter()
            .find(|u| u.username == "player_user")
            .expect("player_user missing from user list");

        assert_eq!(promoted.display_name, "Promoted Player");
        assert_eq!(promoted.role, "editor");
    }

    #[rocket::async_test]
    async fn test_admin_resets_password() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let player_id = test_db.user_id("player_user").unwrap();
        let admin_token = login_test_user(&client, "admin_user", "password123").await;

        let response = client
            .put(format!("/api/admin/users/{}", player_id))
            .header(ContentType::JSON)
            .header(bearer(&admin_token))
            .body(json!({ "password": "reset-password" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        let token = login_test_user(&client, "player_user", "reset-password").await;
        assert!(!token.is_empty());
    }

    #[rocket::async_test]
    async fn test_update_unknown_user() {
        let test_db = create_standard_test_db().await;
        let (client, _) = setup_test_client(test_db).await;

        let admin_token = login_test_user(&client, "admin_user", "password123").await;

        let response = client
            .put("/api/admin/users/9999")
            .header(ContentType::JSON)
            .header(bearer(&admin_token))
            .body(json!({ "display_name": "Ghost" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::NotFound);
    }

    #[rocket::async_test]
    async fn test_admin_deletes_user_but_not_self() {
        let test_db = create_standard_test_db().await;
        let (client, test_db) = setup_test_client(test_db).await;

        let player_id = test_db.user_id("player_user").unwrap();
        let admin_id = test_db.user_id("admin_user").unwrap();
        let admin_token = login_test_user(&client, "admin_user", "password123").await;

        let response = client
            .delete(format!("/api/admin/users/{}", admin_id))
            .header(bearer(&admin_token))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);

        let body = response.into_string().await.unwrap();
        let error: Value = serde_json::from_str(&body).unwrap();
        assert!(error["errors"]["user"].is_array());

        let response = client
            .delete(format!("/api/admin/users/{}", player_id))
            .header(bearer(&admin_token))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);

        // The deleted player can no longer log in.
        let response = client
            .post("/api/auth/login")
            .header(ContentType::JSON)
            .body(
                json!({
                    "username": "player_user",
                    "password": "password123"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Unauthorized);
    }
}
