//! Purpose: Typed client for the profile manager service.
//! Exports: `ProfileManagerClient`.
//! Role: CRUD + merge for user profiles and community profiles.
//! Invariants: Exists-probes translate `NotFound` into `false`, never an error.

use crate::core::error::ErrorKind;
use crate::models::{CommunityProfile, UserProfile};

use super::client::{ApiResult, ServiceClient};

#[derive(Clone)]
pub struct ProfileManagerClient {
    client: ServiceClient,
}

impl ProfileManagerClient {
    pub fn new(client: ServiceClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ServiceClient {
        &self.client
    }

    pub async fn create_profile(&self, profile: &UserProfile) -> ApiResult<UserProfile> {
        self.client.post_json(&["profiles"], profile).await
    }

    pub async fn profile(&self, profile_id: &str) -> ApiResult<UserProfile> {
        self.client.get_json(&["profiles", profile_id]).await
    }

    /// Full replacement; the service revalidates and bumps `_lastUpdateTs`.
    pub async fn update_profile(
        &self,
        profile_id: &str,
        profile: &UserProfile,
    ) -> ApiResult<UserProfile> {
        self.client.put_json(&["profiles", profile_id], profile).await
    }

    /// Partial update; absent fields keep their stored values.
    pub async fn merge_profile(
        &self,
        profile_id: &str,
        partial: &UserProfile,
    ) -> ApiResult<UserProfile> {
        self.client.patch_json(&["profiles", profile_id], partial).await
    }

    pub async fn delete_profile(&self, profile_id: &str) -> ApiResult<()> {
        self.client.delete(&["profiles", profile_id]).await
    }

    pub async fn profile_exists(&self, profile_id: &str) -> ApiResult<bool> {
        match self.profile(profile_id).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub async fn create_community(&self, community: &CommunityProfile) -> ApiResult<CommunityProfile> {
        self.client.post_json(&["communities"], community).await
    }

    pub async fn community(&self, community_id: &str) -> ApiResult<CommunityProfile> {
        self.client.get_json(&["communities", community_id]).await
    }

    pub async fn update_community(
        &self,
        community_id: &str,
        community: &CommunityProfile,
    ) -> ApiResult<CommunityProfile> {
        self.client
            .put_json(&["communities", community_id], community)
            .await
    }

    pub async fn merge_community(
        &self,
        community_id: &str,
        partial: &CommunityProfile,
    ) -> ApiResult<CommunityProfile> {
        self.client
            .patch_json(&["communities", community_id], partial)
            .await
    }

    pub async fn delete_community(&self, community_id: &str) -> ApiResult<()> {
        self.client.delete(&["communities", community_id]).await
    }

    pub async fn community_exists(&self, community_id: &str) -> ApiResult<bool> {
        match self.community(community_id).await {
            Ok(_) => Ok(true),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err),
        }
    }
}
