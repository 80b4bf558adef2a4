//! Contact submission relay.
//!
//! Validate, persist through the content source, then notify. The stored
//! record is the source of truth: once it exists the submission counts as
//! successful even if neither email goes out.

use chrono::Utc;
use maud::html;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::sync::OnceLock;
use tracing::{error, info, warn};

use crate::cms::ContentSource;
use crate::config::Config;
use crate::content::{ContactSubmission, GlobalSettings, NewContactSubmission, SubmissionStatus};
use crate::error::{ContactError, ContactField, NotificationError, ValidationError};
use crate::i18n::Locale;
use crate::mailer::{Mailer, OutboundEmail};
use crate::sections::present;

pub const MIN_MESSAGE_CHARS: usize = 10;
pub const DEFAULT_SUBJECT: &str = "General Inquiry";

/// Fields posted by the public contact form.
///
/// Every field is decoded leniently: `null` or a missing key is absent and
/// non-text values never reject the whole body, so a bad field surfaces as a
/// validation error on that field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    #[serde(deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub email: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub subject: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub message: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub phone: Option<String>,
    #[serde(deserialize_with = "lenient_text")]
    pub company: Option<String>,
    /// Locale of the page that posted the form, used to send browsers back
    #[serde(deserialize_with = "lenient_text")]
    pub locale: Option<String>,
}

/// Strings pass through, numbers and booleans are stringified, anything else
/// counts as absent.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}

/// A JSON contact body, either bare or wrapped in a `data` object.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ContactBody {
    Wrapped { data: ContactForm },
    Bare(ContactForm),
}

impl ContactBody {
    pub fn into_form(self) -> ContactForm {
        match self {
            ContactBody::Wrapped { data } => data,
            ContactBody::Bare(form) => form,
        }
    }
}

/// Result of a browser form post, carried back to the contact page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Sent,
    Invalid,
    Failed,
}

impl SubmissionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionOutcome::Sent => "sent",
            SubmissionOutcome::Invalid => "invalid",
            SubmissionOutcome::Failed => "failed",
        }
    }

    /// Dictionary key of the message shown above the form.
    pub fn message_key(&self) -> &'static str {
        match self {
            SubmissionOutcome::Sent => "contact.status.sent",
            SubmissionOutcome::Invalid => "contact.status.invalid",
            SubmissionOutcome::Failed => "contact.status.failed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sent" => Some(SubmissionOutcome::Sent),
            "invalid" => Some(SubmissionOutcome::Invalid),
            "failed" => Some(SubmissionOutcome::Failed),
            _ => None,
        }
    }

    pub fn of(result: &Result<Confirmation, ContactError>) -> Self {
        match result {
            Ok(_) => SubmissionOutcome::Sent,
            Err(ContactError::Validation(_)) => SubmissionOutcome::Invalid,
            Err(ContactError::Persist(_)) => SubmissionOutcome::Failed,
        }
    }
}

/// Request details stored with the submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Environment-level mail addressing, the fallback after global settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailDefaults {
    pub recipient: Option<String>,
    pub sender_email: String,
    pub sender_name: String,
}

impl MailDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            recipient: config.contact_recipient_email.clone(),
            sender_email: config.mail_sender_email.clone(),
            sender_name: config.mail_sender_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    pub submission: ContactSubmission,
    /// Whether the operator notification was delivered
    pub notification_sent: bool,
}

fn email_regex() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
            .unwrap_or_else(|e| panic!("email regex is invalid: {}", e))
    })
}

/// Check the form, stopping at the first invalid field (name, email, message).
pub fn validate(form: &ContactForm) -> Result<NewContactSubmission, ValidationError> {
    let name = present(&form.name).unwrap_or_default();
    if name.is_empty() {
        return Err(ValidationError::new(ContactField::Name, "Name is required"));
    }

    let email = present(&form.email).unwrap_or_default();
    if !email_regex().is_match(email) {
        return Err(ValidationError::new(ContactField::Email, "Invalid email"));
    }

    let message = present(&form.message).unwrap_or_default();
    if message.chars().count() < MIN_MESSAGE_CHARS {
        return Err(ValidationError::new(
            ContactField::Message,
            format!("Message must be at least {} characters", MIN_MESSAGE_CHARS),
        ));
    }

    Ok(NewContactSubmission {
        name: name.to_string(),
        email: email.to_string(),
        subject: present(&form.subject).unwrap_or(DEFAULT_SUBJECT).to_string(),
        message: message.to_string(),
        phone: present(&form.phone).map(str::to_string),
        company: present(&form.company).map(str::to_string),
        ip_address: None,
        user_agent: None,
        status: SubmissionStatus::New,
        email_sent: false,
    })
}

/// Resolved addressing for one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Addressing {
    recipient: Option<String>,
    sender_email: String,
    sender_name: String,
}

fn setting(settings: Option<&GlobalSettings>, field: fn(&GlobalSettings) -> &Option<String>) -> Option<String> {
    settings.and_then(|s| present(field(s))).map(str::to_string)
}

/// GlobalSettings first, then the environment-level defaults.
fn addressing(settings: Option<&GlobalSettings>, defaults: &MailDefaults) -> Addressing {
    Addressing {
        recipient: setting(settings, |s| &s.contact_recipient_email)
            .or_else(|| defaults.recipient.clone()),
        sender_email: setting(settings, |s| &s.smtp_from_email)
            .unwrap_or_else(|| defaults.sender_email.clone()),
        sender_name: setting(settings, |s| &s.smtp_from_name)
            .unwrap_or_else(|| defaults.sender_name.clone()),
    }
}

pub struct ContactRelay<'a> {
    content: &'a dyn ContentSource,
    mailer: &'a dyn Mailer,
    defaults: &'a MailDefaults,
    /// Locale whose global settings carry the contact routing fields
    settings_locale: &'a Locale,
}

impl<'a> ContactRelay<'a> {
    pub fn new(
        content: &'a dyn ContentSource,
        mailer: &'a dyn Mailer,
        defaults: &'a MailDefaults,
        settings_locale: &'a Locale,
    ) -> Self {
        Self {
            content,
            mailer,
            defaults,
            settings_locale,
        }
    }

    pub async fn submit(&self, form: ContactForm, meta: RequestMeta) -> Result<Confirmation, ContactError> {
        let mut new = validate(&form)?;
        new.ip_address = meta.ip_address;
        new.user_agent = meta.user_agent;

        let mut submission = self
            .content
            .create_contact_submission(&new)
            .await
            .map_err(|e| {
                error!("Failed to store contact submission: {:#}", e);
                ContactError::Persist(e.to_string())
            })?;
        info!("Contact submission {} received from {}", submission.id, submission.email);

        let settings = self.content.fetch_global_settings(self.settings_locale).await;
        let addressing = addressing(settings.as_ref(), self.defaults);

        let notification_sent = match self.notify(&submission, &addressing).await {
            Ok(()) => {
                submission.email_sent = true;
                if let Err(e) = self.content.mark_email_sent(submission.id).await {
                    warn!("Failed to flag submission {} as emailed: {:#}", submission.id, e);
                }
                true
            }
            Err(e) => {
                error!("Failed to send email notification for submission {}: {}", submission.id, e);
                false
            }
        };

        if let Err(e) = self.acknowledge(&submission, &addressing).await {
            error!("Failed to send acknowledgment for submission {}: {}", submission.id, e);
        }

        Ok(Confirmation {
            submission,
            notification_sent,
        })
    }

    async fn notify(&self, submission: &ContactSubmission, addressing: &Addressing) -> Result<(), NotificationError> {
        let recipient = addressing
            .recipient
            .as_ref()
            .ok_or(NotificationError::NoRecipient)?;
        let email = notification_email(submission, recipient, addressing);
        self.mailer
            .send(&email)
            .await
            .map_err(|e| NotificationError::Send {
                kind: "notification",
                reason: format!("{:#}", e),
            })
    }

    async fn acknowledge(&self, submission: &ContactSubmission, addressing: &Addressing) -> Result<(), NotificationError> {
        let email = acknowledgment_email(submission, addressing);
        self.mailer
            .send(&email)
            .await
            .map_err(|e| NotificationError::Send {
                kind: "acknowledgment",
                reason: format!("{:#}", e),
            })
    }
}

// ==================== Email Bodies ====================

const CELL: &str = "padding: 8px; border: 1px solid #ddd;";
const LABEL_CELL: &str = "padding: 8px; border: 1px solid #ddd; font-weight: bold;";
const MESSAGE_BOX: &str = "white-space: pre-wrap; background: #f5f5f5; padding: 15px; border-radius: 4px;";

fn submitted_at(submission: &ContactSubmission) -> String {
    submission
        .created_at
        .unwrap_or_else(Utc::now)
        .to_rfc3339()
}

fn notification_email(submission: &ContactSubmission, recipient: &str, addressing: &Addressing) -> OutboundEmail {
    let ip = submission.ip_address.as_deref().unwrap_or("Unknown");
    let submitted_at = submitted_at(submission);

    let mut text = String::from("You have received a new contact form submission:\n\n");
    text.push_str(&format!("Name: {}\nEmail: {}\n", submission.name, submission.email));
    if let Some(phone) = &submission.phone {
        text.push_str(&format!("Phone: {}\n", phone));
    }
    if let Some(company) = &submission.company {
        text.push_str(&format!("Company: {}\n", company));
    }
    text.push_str(&format!(
        "Subject: {}\n\nMessage:\n{}\n\n---\nSubmission ID: {}\nSubmitted at: {}\nIP Address: {}\n",
        submission.subject, submission.message, submission.id, submitted_at, ip
    ));

    let html = html! {
        h2 { "New Contact Form Submission" }
        p { "You have received a new contact form submission:" }
        table style="border-collapse: collapse; width: 100%; max-width: 600px;" {
            tr { td style=(LABEL_CELL) { "Name" } td style=(CELL) { (submission.name) } }
            tr {
                td style=(LABEL_CELL) { "Email" }
                td style=(CELL) { a href={ "mailto:" (submission.email) } { (submission.email) } }
            }
            @if let Some(phone) = &submission.phone {
                tr { td style=(LABEL_CELL) { "Phone" } td style=(CELL) { (phone) } }
            }
            @if let Some(company) = &submission.company {
                tr { td style=(LABEL_CELL) { "Company" } td style=(CELL) { (company) } }
            }
            tr { td style=(LABEL_CELL) { "Subject" } td style=(CELL) { (submission.subject) } }
        }
        h3 { "Message:" }
        p style=(MESSAGE_BOX) { (submission.message) }
        hr style="margin: 20px 0;";
        p style="font-size: 12px; color: #666;" {
            strong { "Submission ID:" } " " (submission.id) br;
            strong { "Submitted at:" } " " (submitted_at) br;
            strong { "IP Address:" } " " (ip)
        }
    };

    OutboundEmail {
        to: recipient.to_string(),
        from_email: addressing.sender_email.clone(),
        from_name: addressing.sender_name.clone(),
        reply_to: Some(submission.email.clone()),
        subject: format!("New Contact Form Submission: {}", submission.subject),
        text,
        html: html.into_string(),
    }
}

fn acknowledgment_email(submission: &ContactSubmission, addressing: &Addressing) -> OutboundEmail {
    let text = format!(
        "Hi {},\n\nThank you for contacting us! We have received your message and will get back to you as soon as possible.\n\nHere's a copy of your message:\n\nSubject: {}\nMessage: {}\n\nBest regards,\n{}\n",
        submission.name, submission.subject, submission.message, addressing.sender_name
    );

    let html = html! {
        h2 { "Thank you for contacting us!" }
        p { "Hi " (submission.name) "," }
        p { "We have received your message and will get back to you as soon as possible." }
        h3 { "Your message:" }
        p style=(MESSAGE_BOX) { (submission.message) }
        p { "Best regards," br; (addressing.sender_name) }
    };

    OutboundEmail {
        to: submission.email.clone(),
        from_email: addressing.sender_email.clone(),
        from_name: addressing.sender_name.clone(),
        reply_to: None,
        subject: format!("We received your message: {}", submission.subject),
        text,
        html: html.into_string(),
    }
}
