mod mailer;

pub use mailer::{MailConfig, Mailer};
