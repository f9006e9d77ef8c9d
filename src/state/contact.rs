/// Contact form state
///
/// There is no delivery channel for messages; a valid submission is
/// logged and the form is cleared.
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Email,
    Message,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContactError {
    #[error("Please fill in your {0}.")]
    MissingField(&'static str),

    #[error("Please enter a valid email address.")]
    InvalidEmail,
}

/// A validated message, ready to hand off
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
    status: Option<Result<(), ContactError>>,
}

impl ContactForm {
    pub fn update(&mut self, field: ContactField, value: String) {
        match field {
            ContactField::Name => self.name = value,
            ContactField::Email => self.email = value,
            ContactField::Message => self.message = value,
        }
        self.status = None;
    }

    /// Result of the last submit, cleared by the next edit
    pub fn status(&self) -> Option<&Result<(), ContactError>> {
        self.status.as_ref()
    }

    pub fn validate(&self) -> Result<Submission, ContactError> {
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if name.is_empty() {
            return Err(ContactError::MissingField("name"));
        }
        if email.is_empty() {
            return Err(ContactError::MissingField("email"));
        }
        if !is_plausible_email(email) {
            return Err(ContactError::InvalidEmail);
        }
        if message.is_empty() {
            return Err(ContactError::MissingField("message"));
        }

        Ok(Submission {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        })
    }

    pub fn submit(&mut self) -> Result<Submission, ContactError> {
        match self.validate() {
            Ok(submission) => {
                info!(
                    name = %submission.name,
                    email = %submission.email,
                    length = submission.message.len(),
                    "contact form submitted"
                );
                *self = ContactForm {
                    status: Some(Ok(())),
                    ..ContactForm::default()
                };
                Ok(submission)
            }
            Err(err) => {
                self.status = Some(Err(err.clone()));
                Err(err)
            }
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@') && !email.contains(char::is_whitespace)
        }
        None => false,
    }
}
