//! Notification dispatch
//!
//! Email side effects live behind the event bus: services emit
//! `WorkflowEvent`s, the dispatcher task turns them into notifications
//! rows and gateway calls. Nothing in here can fail a workflow operation.

pub mod dispatcher;
pub mod mailer;

pub use dispatcher::run_dispatcher;
pub use mailer::Mailer;
