pub mod config;
pub mod coordinator;
pub mod error;
pub mod i18n;
pub mod openai;
pub mod provider;
pub mod retry;
pub mod review;
