// src/formatting.rs

use crate::core::{LocationKey, SubscriberDigest};

/// Width of the rule under each location header.
const RULE_WIDTH: usize = 32;

/// Renders one location's block in a digest: header, rule, then the lines.
pub fn location_section(key: &LocationKey, text: &str) -> String {
    format!(
        "\nAvailability at {} {}\n{}\n{}\n",
        key.kind(),
        key.value(),
        "=".repeat(RULE_WIDTH),
        text
    )
}

/// A trait for rendering a digest into a channel-specific message.
pub trait TextFormatter: Send + Sync {
    fn format_digest(&self, digest: &SubscriberDigest) -> String;
}

/// A formatter for Slack that mentions the subscriber and links the booking site.
pub struct SlackTextFormatter {
    booking_url: String,
}

impl SlackTextFormatter {
    pub fn new(booking_url: impl Into<String>) -> Self {
        Self {
            booking_url: booking_url.into(),
        }
    }
}

impl TextFormatter for SlackTextFormatter {
    fn format_digest(&self, digest: &SubscriberDigest) -> String {
        format!(
            "Hi <@{}> :wave:,\n{}\nLogin to <{}|cowin> to book the slots :pray:",
            digest.subscriber.slack, digest.content, self.booking_url
        )
    }
}

/// A plain-text email body, signed by the sender.
pub struct EmailTextFormatter {
    booking_url: String,
    sender_name: String,
}

impl EmailTextFormatter {
    pub fn new(booking_url: impl Into<String>, sender_name: impl Into<String>) -> Self {
        Self {
            booking_url: booking_url.into(),
            sender_name: sender_name.into(),
        }
    }
}

impl TextFormatter for EmailTextFormatter {
    fn format_digest(&self, digest: &SubscriberDigest) -> String {
        format!(
            "Hi {},\n{}\nLogin to {} to book the slots\n\nThanks and Regards,\n{}\n",
            digest.subscriber.name, digest.content, self.booking_url, self.sender_name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Subscriber;

    fn create_test_digest() -> SubscriberDigest {
        SubscriberDigest {
            subscriber: Subscriber {
                name: "Asha".to_string(),
                email: "asha@example.com".to_string(),
                slack: "U024BE7LH".to_string(),
                pincode: vec!["110001".to_string()],
                district: vec![],
            },
            content: location_section(&LocationKey::Pincode("110001".to_string()), "line one"),
        }
    }

    #[test]
    fn test_location_section() {
        let section = location_section(&LocationKey::District("294".to_string()), "a\nb");
        assert_eq!(
            section,
            "\nAvailability at district 294\n================================\na\nb\n"
        );
    }

    #[test]
    fn test_slack_message_mentions_subscriber() {
        let formatter = SlackTextFormatter::new("https://www.cowin.gov.in/home");
        let message = formatter.format_digest(&create_test_digest());

        let expected = concat!(
            "Hi <@U024BE7LH> :wave:,\n",
            "\nAvailability at pincode 110001\n",
            "================================\n",
            "line one\n",
            "\nLogin to <https://www.cowin.gov.in/home|cowin> to book the slots :pray:",
        );
        assert_eq!(message, expected);
    }

    #[test]
    fn test_email_body_is_signed() {
        let formatter = EmailTextFormatter::new("https://www.cowin.gov.in/home", "Slot Desk");
        let body = formatter.format_digest(&create_test_digest());

        assert!(body.starts_with("Hi Asha,\n\nAvailability at pincode 110001\n"));
        assert!(body.contains("line one\n"));
        assert!(body.ends_with(
            "Login to https://www.cowin.gov.in/home to book the slots\n\nThanks and Regards,\nSlot Desk\n"
        ));
    }
}
