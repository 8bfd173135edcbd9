pub mod mailer;
pub mod smtp;
pub mod templates;
