//! Contact messages: submission from the contact form, listing and
//! moderation calls for the admin console.

use reqwest::header::USER_AGENT;
use reqwest::multipart::Form;

use crate::error::ApiError;
use crate::models::ContactMessage;
use crate::{ApiClient, APP_USER_AGENT};

impl ApiClient {
    /// Submit a contact message. New messages always start unviewed.
    pub async fn send_message(
        &self,
        username: &str,
        name: &str,
        contact: &str,
        message: &str,
    ) -> Result<ContactMessage, ApiError> {
        let form = Form::new()
            .text("username", username.to_owned())
            .text("name", name.to_owned())
            .text("contact", contact.to_owned())
            .text("message", message.to_owned())
            .text("viewed", "false");

        let sent = self
            .http
            .post(self.url("/messages/send"))
            .header(USER_AGENT, APP_USER_AGENT)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?
            .json::<ContactMessage>()
            .await?;

        Ok(sent)
    }

    /// Every submitted contact message (admin console).
    pub async fn list_messages(&self) -> Result<Vec<ContactMessage>, ApiError> {
        let messages = self
            .http
            .get(self.url("/messages"))
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<ContactMessage>>()
            .await?;

        Ok(messages)
    }

    /// Flag a message as viewed.
    pub async fn mark_message_viewed(&self, message_id: i64) -> Result<(), ApiError> {
        self.http
            .put(self.url(&format!("/messages/{}/view", message_id)))
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    /// Remove a message.
    pub async fn delete_message(&self, message_id: i64) -> Result<(), ApiError> {
        self.http
            .delete(self.url(&format!("/messages/{}", message_id)))
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
    async fn test_send_message() {
        let send = warp::post()
            .and(warp::path!("messages" / "send"))
            .and(warp::body::bytes())
            .map(|body: warp::hyper::body::Bytes| {
                // multipart text parts arrive with the form
                let body = String::from_utf8_lossy(&body);
                assert!(body.contains("Guest"));
                assert!(body.contains("The upload seems to fail"));
                warp::reply::json(&serde_json::json!({
                    "id": 9,
                    "username": "Guest",
                    "name": "John",
                    "contact": "john@example.com",
                    "message": "The upload seems to fail after 50% completion.",
                    "viewed": false
                }))
            });

        let (tx, rx) = oneshot::channel();
        let (addr, server) =
            warp::serve(send).bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::task::spawn(server);

        let client = ApiClient::new(&format!("http://{}", addr));
        let sent = client
            .send_message(
                "Guest",
                "John",
                "john@example.com",
                "The upload seems to fail after 50% completion.",
            )
            .await
            .unwrap();

        assert_eq!(sent.id, 9);
        assert!(!sent.viewed);

        let _ = tx.send(());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_mark_and_delete_message() {
        let view = warp::put()
            .and(warp::path!("messages" / i64 / "view"))
            .map(|_id: i64| warp::reply::json(&true));
        let delete = warp::delete()
            .and(warp::path!("messages" / i64))
            .map(|_id: i64| warp::reply::json(&true));

        let (tx, rx) = oneshot::channel();
        let (addr, server) = warp::serve(view.or(delete))
            .bind_with_graceful_shutdown(([127, 0, 0, 1], 0), async {
                rx.await.ok();
            });
        tokio::task::spawn(server);

        let client = ApiClient::new(&format!("http://{}", addr));
        client.mark_message_viewed(4).await.unwrap();
        client.delete_message(4).await.unwrap();

        let _ = tx.send(());
    }
}
