pub mod auth_service;
pub mod mailer;
pub mod notification;
