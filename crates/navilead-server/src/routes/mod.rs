pub mod activities;
pub mod emails;
pub mod pricing;
pub mod templates;
