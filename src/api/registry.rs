//! Purpose: Bind a `ServiceConfig` to one typed client per sibling service.
//! Exports: `ServiceRegistry`.
//! Role: The crate's `ReferenceResolver`: model validation reaches the
//! sibling services through it.
//! Invariants: All clients share a single connection pool and timeout.

use crate::core::error::{Error, ErrorKind};
use crate::core::validate::{ReferenceResolver, ValidationContext};
use async_trait::async_trait;
use reqwest::Client;

use super::client::{ApiResult, ServiceClient, ServiceConfig};
use super::profile_manager::ProfileManagerClient;
use super::social_context::SocialContextBuilderClient;
use super::task_manager::TaskManagerClient;

pub struct ServiceRegistry {
    profile_manager: ProfileManagerClient,
    task_manager: TaskManagerClient,
    social_context_builder: SocialContextBuilderClient,
}

impl ServiceRegistry {
    pub fn new(config: &ServiceConfig) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| {
                Error::new(ErrorKind::Internal)
                    .with_message("failed to build the shared http client")
                    .with_source(err)
            })?;
        let profile_manager = ProfileManagerClient::new(ServiceClient::with_http(
            http.clone(),
            &config.profile_manager_url,
            config.token.clone(),
        )?);
        let task_manager = TaskManagerClient::new(ServiceClient::with_http(
            http.clone(),
            &config.task_manager_url,
            config.token.clone(),
        )?);
        let social_context_builder = SocialContextBuilderClient::new(ServiceClient::with_http(
            http,
            &config.social_context_builder_url,
            config.token.clone(),
        )?);
        Ok(Self {
            profile_manager,
            task_manager,
            social_context_builder,
        })
    }

    pub fn from_env() -> ApiResult<Self> {
        Self::new(&ServiceConfig::from_env()?)
    }

    pub fn profile_manager(&self) -> &ProfileManagerClient {
        &self.profile_manager
    }

    pub fn task_manager(&self) -> &TaskManagerClient {
        &self.task_manager
    }

    pub fn social_context_builder(&self) -> &SocialContextBuilderClient {
        &self.social_context_builder
    }

    /// Context whose referential checks consult the live services.
    pub fn validation_context(&self) -> ValidationContext<'_> {
        ValidationContext::with_resolver(self)
    }
}

#[async_trait]
impl ReferenceResolver for ServiceRegistry {
    async fn profile_exists(&self, id: &str) -> Result<bool, Error> {
        self.profile_manager.profile_exists(id).await
    }

    async fn community_exists(&self, id: &str) -> Result<bool, Error> {
        self.profile_manager.community_exists(id).await
    }

    async fn task_exists(&self, id: &str) -> Result<bool, Error> {
        self.task_manager.task_exists(id).await
    }

    async fn task_type_exists(&self, id: &str) -> Result<bool, Error> {
        self.task_manager.task_type_exists(id).await
    }
}
