pub mod application_queries;
pub mod catalog_queries;
pub mod connection_queries;
pub mod job_run_queries;
pub mod notification_queries;
pub mod otp_queries;
pub mod user_queries;
