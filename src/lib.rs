//! Onboardia: automated onboarding for new joiners.

pub mod channels;
pub mod clock;
pub mod config;
pub mod error;
pub mod llm;
pub mod onboarding;
pub mod store;
