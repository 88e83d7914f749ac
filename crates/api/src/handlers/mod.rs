pub mod analytics;
pub mod auth;
pub mod complaint;
pub mod feature_toggle;
pub mod notification;
pub mod upload;
