use serde_json::json;

use crate::domain::repository::NotificationPort;
use crate::domain::types::Mail;

/// Fire-and-forget mail dispatch to the notifier service.
///
/// Delivery runs on a detached task: the calling request never blocks on it
/// and never fails because of it. Failures are logged and dropped — the
/// notifier owns retries.
#[derive(Clone)]
pub struct HttpNotifier {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl NotificationPort for HttpNotifier {
    fn dispatch(&self, mail: Mail) {
        let client = self.client.clone();
        let url = format!("{}/notification/mail", self.base_url);
        tokio::spawn(async move {
            let body = json!({
                "to": mail.to,
                "subject": mail.subject,
                "body": mail.body,
            });
            match client.post(&url).json(&body).send().await {
                Ok(resp) if !resp.status().is_success() => {
                    tracing::warn!(status = %resp.status(), to = %mail.to, "notifier rejected mail");
                }
                Err(e) => {
                    tracing::warn!(error = %e, to = %mail.to, "mail dispatch failed");
                }
                Ok(_) => {}
            }
        });
    }
}
