//! Background Jobs Module
//!
//! Jobs scheduled and executed by the job scheduler service. Each job takes a
//! `JobContext` and reports a `JobResult` that the scheduler records in the
//! `job_runs` table.
//!
//! # Available Jobs
//!
//! - `application_expiry_job` - Purges rejected applications past the retention window

pub mod application_expiry_job;
