//! Purpose: Define the stable public API boundary for socium-common.
//! Exports: Error taxonomy, validation/merge traits, service clients.
//! Role: The surface sibling microservices link against.
//! Invariants: This module is the only public path to the HTTP plumbing.

mod client;
mod profile_manager;
mod registry;
mod social_context;
mod task_manager;

pub use crate::core::error::{Error, ErrorKind, to_status_code};
pub use crate::core::merge::{Identified, Merge, Update};
pub use crate::core::validate::{ReferenceResolver, Validate, ValidationContext};
pub use client::{ApiResult, ServiceClient, ServiceConfig};
pub use profile_manager::ProfileManagerClient;
pub use registry::ServiceRegistry;
pub use social_context::{InteractionReport, SocialContextBuilderClient};
pub use task_manager::TaskManagerClient;
