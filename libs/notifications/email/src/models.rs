use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Email message to be sent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub id: Uuid,
    /// Recipient address
    pub to: String,
    /// Recipient display name, used in the `To` mailbox when present
    pub to_name: Option<String>,
    pub subject: String,
    pub body_text: Option<String>,
    pub body_html: Option<String>,
    pub reply_to: Option<String>,
}

impl Email {
    pub fn new(to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            to: to.into(),
            to_name: None,
            subject: subject.into(),
            body_text: None,
            body_html: None,
            reply_to: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.to_name = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.body_text = Some(text.into());
        self
    }

    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.body_html = Some(html.into());
        self
    }

    pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
        self.reply_to = Some(reply_to.into());
        self
    }

    pub fn has_body(&self) -> bool {
        self.body_text.is_some() || self.body_html.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let email = Email::new("ann@bistro.test", "Hi")
            .with_name("Ann")
            .with_text("Hello");

        assert_eq!(email.to, "ann@bistro.test");
        assert_eq!(email.to_name.as_deref(), Some("Ann"));
        assert!(email.has_body());
        assert!(!Email::new("ann@bistro.test", "Hi").has_body());
    }
}
