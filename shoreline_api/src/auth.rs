//! Authentication calls against the `/users` endpoints.

use serde::Serialize;

use crate::error::ApiError;
use crate::models::User;
use crate::ApiClient;

#[derive(Debug, Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct NewAccount<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

impl ApiClient {
    /// Exchange credentials for the account they belong to. A credential
    /// rejection surfaces as an `ApiError::Request`, which callers map to a
    /// plain "login failed" for the user.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let user = self
            .http
            .post(self.url("/users/login"))
            .json(&Credentials { email, password })
            .send()
            .await?
            .error_for_status()?
            .json::<User>()
            .await?;

        Ok(user)
    }

    /// Create an account and return the identity the backend assigned it.
    pub async fn signup(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, ApiError> {
        let user = self
            .http
            .post(self.url("/users/create"))
            .json(&NewAccount {
                username,
                email,
                password,
            })
            .send()
            .await?
            .error_for_status()?
            .json::<User>()
            .await?;

        Ok(user)
    }

    /// List every registered account (admin console).
    pub async fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let users = self
            .http
            .get(self.url("/users"))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<User>>()
            .await?;

        Ok(users)
    }

    /// Remove an account. The backend cascades the deletion of owned files.
    pub async fn delete_user(&self, user_id: i64) -> Result<(), ApiError> {
        self.http
            .delete(self.url(&format!("/users/{}", user_id)))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::oneshot;
    use warp::Filter;

    use crate::ApiClient;

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login() {
        let login = warp::post()
            .and(warp::path!("users" / "login"))
            .and(warp::body::json())
            .map(|body: serde_json::Value| {
                assert_eq!(body["email"], "kelpie@example.com");
                assert_eq!(body["password"], "hunter22");
                warp::reply::json(&serde_json::json!({
                    "id": 7,
                    "username": "kelpie",
                    "email": "kelpie@example.com"
                }))
            });

        let (tx, rx) = oneshot::channel();
        let (addr, server) =
            warp::serve(login).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::task::spawn(server);

        let client = ApiClient::new(&format!("http://{}", addr));
        let user = client.login("kelpie@example.com", "hunter22").await.unwrap();

        assert_eq!(user.id, 7);
        assert_eq!(user.username, "kelpie");

        let _ = tx.send(());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_login_rejected() {
        let login = warp::post()
            .and(warp::path!("users" / "login"))
            .and(warp::body::json())
            .map(|_body: serde_json::Value| {
                warp::reply::with_status("bad credentials", warp::http::StatusCode::UNAUTHORIZED)
            });

        let (tx, rx) = oneshot::channel();
        let (addr, server) =
            warp::serve(login).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::task::spawn(server);

        let client = ApiClient::new(&format!("http://{}", addr));
        let res = client.login("kelpie@example.com", "wrong").await;
        assert!(res.is_err());

        let _ = tx.send(());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_signup() {
        let create = warp::post()
            .and(warp::path!("users" / "create"))
            .and(warp::body::json())
            .map(|body: serde_json::Value| {
                warp::reply::json(&serde_json::json!({
                    "id": 12,
                    "username": body["username"],
                    "email": body["email"]
                }))
            });

        let (tx, rx) = oneshot::channel();
        let (addr, server) =
            warp::serve(create).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::task::spawn(server);

        let client = ApiClient::new(&format!("http://{}", addr));
        let user = client
            .signup("selkie", "selkie@example.com", "password1")
            .await
            .unwrap();

        assert_eq!(user.id, 12);
        assert_eq!(user.username, "selkie");
        assert_eq!(user.email, "selkie@example.com");

        let _ = tx.send(());
    }
}
