pub mod login;
pub mod reply;
pub mod user;

pub use login::{OtpChallenge, VerifiedUser};
pub use reply::{InsertReply, OutputMessage, StatusReply};
pub use user::{User, UserRole};
