mod company;
mod connection;
mod job;
mod user;
pub mod application;
pub mod notification;

pub use application::{
    Application, ApplicationStatus, AppliedJobsResponse, BulkStatusSummary, BulkUpdateStatusRequest,
    CreateApplicationRequest, Education, ExperienceDetail, NewApplication, QuestionAnswer,
    StatusChange, UpdateStatusRequest,
};
pub use company::{Company, CreateCompany, UpdateCompany};
pub use connection::{
    ConnectionsResponse, PendingRequestsResponse, RespondToConnectionRequest, SendConnectionRequest,
    UnconnectRequest, UserSummary,
};
pub use job::{
    CreateJob, Job, JobRun, SavedJobToggleResponse, SavedJobsResponse, ToggleSavedJobRequest, UpdateJob,
};
pub use notification::{ConnectionEvent, NewNotification, Notification, NotificationType, UnreadCountResponse};
pub use user::{
    EmailRequest, LoginRequest, LoginResponse, Otp, OtpPurpose, RegisterRequest,
    ResetPasswordRequest, Role, User, VerifyOtpRequest,
};
