//! Service layer for the task lifecycle engine.

mod lifecycle;

pub use lifecycle::{
    CreateTaskRequest, RateTaskRequest, TaskLifecycleError, TaskLifecycleResult,
    TaskLifecycleService, UpdateStatusRequest,
};
