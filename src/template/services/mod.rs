//! Service layer for template management.

mod catalog;

pub use catalog::{
    CreateTemplateRequest, TemplateFlowError, TemplateFlowResult, TemplateService,
    UpdateTemplateRequest,
};
