//! The Cloud Databases v5 service: builder plus executor.
//!
//! Each method validates and builds through `CloudDatabasesClient`, then
//! passes the request to the executor and returns whatever it produced.
//! A missing required parameter comes back as `Err` from the returned
//! future and the executor is never called.

use tracing::debug;

use crate::client::CloudDatabasesClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::executor::Executor;
use crate::http::HttpResponse;
use crate::operation::{self, OperationSpec};
use crate::params::CallParameters;

#[derive(Debug, Clone)]
pub struct CloudDatabasesV5<E> {
    client: CloudDatabasesClient,
    executor: E,
}

impl<E: Executor> CloudDatabasesV5<E> {
    pub fn new(client: CloudDatabasesClient, executor: E) -> Self {
        Self { client, executor }
    }

    pub fn from_config(config: &ClientConfig, executor: E) -> Self {
        Self::new(CloudDatabasesClient::from_config(config), executor)
    }

    pub fn client(&self) -> &CloudDatabasesClient {
        &self.client
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Build and dispatch any operation from the table.
    pub async fn call(&self, spec: &OperationSpec, params: CallParameters) -> Result<HttpResponse, ApiError> {
        let request = match self.client.build(spec, &params) {
            Ok(request) => request,
            Err(e) => {
                debug!(operation = spec.name, error = %e, "request rejected before dispatch");
                return Err(e);
            }
        };
        debug!(
            operation = spec.name,
            method = %request.method,
            endpoint = %request.endpoint,
            "dispatching request"
        );
        self.executor.submit(request).await
    }

    /// Dispatch by API operation name, e.g. `"getTask"`.
    pub async fn call_named(&self, name: &str, params: CallParameters) -> Result<HttpResponse, ApiError> {
        let spec = operation::find(name).ok_or_else(|| ApiError::UnknownOperation(name.to_string()))?;
        self.call(spec, params).await
    }

    // deployments

    /// List all deployable database types and versions.
    pub async fn list_deployables(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::LIST_DEPLOYABLES, params).await
    }

    /// List regions deployments (and read-only replicas) can be placed in.
    pub async fn list_regions(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::LIST_REGIONS, params).await
    }

    /// Requires `id`.
    pub async fn get_deployment_info(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_DEPLOYMENT_INFO, params).await
    }

    // database users

    /// Requires `id`, `userType`; optional `user` body.
    pub async fn create_database_user(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::CREATE_DATABASE_USER, params).await
    }

    /// Requires `id`, `userType`, `username`; optional `user` body.
    pub async fn change_user_password(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::CHANGE_USER_PASSWORD, params).await
    }

    /// Requires `id`, `userType`, `username`.
    pub async fn delete_database_user(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::DELETE_DATABASE_USER, params).await
    }

    /// Requires `id`, `configuration`.
    pub async fn update_database_configuration(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::UPDATE_DATABASE_CONFIGURATION, params).await
    }

    // remotes

    pub async fn list_remotes(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::LIST_REMOTES, params).await
    }

    pub async fn resync_replica(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::RESYNC_REPLICA, params).await
    }

    /// Requires `id` (the replica) and `promotion`.
    pub async fn set_promotion(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::SET_PROMOTION, params).await
    }

    // tasks

    pub async fn list_deployment_tasks(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::LIST_DEPLOYMENT_TASKS, params).await
    }

    /// Requires the task `id`.
    pub async fn get_task(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_TASK, params).await
    }

    // backups

    /// Requires `backupId`.
    pub async fn get_backup_info(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_BACKUP_INFO, params).await
    }

    pub async fn list_deployment_backups(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::LIST_DEPLOYMENT_BACKUPS, params).await
    }

    pub async fn start_ondemand_backup(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::START_ONDEMAND_BACKUP, params).await
    }

    pub async fn get_pit_rdata(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_PIT_RDATA, params).await
    }

    // connections

    /// Requires `id`, `userType`, `userId`, `endpointType`; optional
    /// `certificateRoot` query.
    pub async fn get_connection(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_CONNECTION, params).await
    }

    /// Same as `get_connection`, with optional `password` and
    /// `certificateRoot` in the body.
    pub async fn complete_connection(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::COMPLETE_CONNECTION, params).await
    }

    // scaling

    pub async fn list_deployment_scaling_groups(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::LIST_DEPLOYMENT_SCALING_GROUPS, params).await
    }

    /// Requires the database `type`.
    pub async fn get_default_scaling_groups(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_DEFAULT_SCALING_GROUPS, params).await
    }

    /// Requires `id`, `groupId` and `setDeploymentScalingGroupRequest`,
    /// which becomes the whole body.
    pub async fn set_deployment_scaling_group(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::SET_DEPLOYMENT_SCALING_GROUP, params).await
    }

    // autoscaling

    pub async fn get_autoscaling_conditions(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_AUTOSCALING_CONDITIONS, params).await
    }

    pub async fn set_autoscaling_conditions(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::SET_AUTOSCALING_CONDITIONS, params).await
    }

    // management

    pub async fn kill_connections(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::KILL_CONNECTIONS, params).await
    }

    // allowlist

    pub async fn get_allowlist(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::GET_ALLOWLIST, params).await
    }

    /// Replaces the allowlist. Pass the `ETag` from `get_allowlist` as
    /// `ifMatch` to guard against concurrent edits.
    pub async fn set_allowlist(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::SET_ALLOWLIST, params).await
    }

    pub async fn add_allowlist_entry(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::ADD_ALLOWLIST_ENTRY, params).await
    }

    /// Requires `id` and `ipaddress` (address or CIDR range).
    pub async fn delete_allowlist_entry(&self, params: CallParameters) -> Result<HttpResponse, ApiError> {
        self.call(&operation::DELETE_ALLOWLIST_ENTRY, params).await
    }
}
