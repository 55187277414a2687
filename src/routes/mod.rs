pub(crate) mod admin;
pub(crate) mod applications;
pub(crate) mod auth;
pub(crate) mod companies;
pub(crate) mod connections;
pub(crate) mod health;
pub(crate) mod jobs;
pub(crate) mod notifications;
