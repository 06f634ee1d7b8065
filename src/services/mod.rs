pub mod otp_mail;

pub use otp_mail::{mailer, MailError, OtpMailer};
