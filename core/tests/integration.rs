//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts its own mock server on a random port and drives the
//! service through a ureq-backed `Executor`. Blocking ureq calls run on
//! tokio's blocking pool, which is how a host would plug a synchronous HTTP
//! stack into the async service. Validates that request building (CRN
//! encoding, header parameters, body shapes) and response parsing agree with
//! an actual server.

use std::future::Future;

use cloud_databases_core::types::{
    Allocation, Allowlist, AllowlistEntry, AutoscalingGroup, Backups, BackupResponse, Connection, DatabaseUser,
    DeploymentResponse, Groups, ListDeployablesResponse, ListRegionsResponse, ListRemotesResponse,
    PasswordSetting, PointInTimeRecoveryData, ScalingGroupRequest, Task, TaskResponse, Tasks,
};
use cloud_databases_core::{
    ApiError, CallParameters, CloudDatabasesClient, CloudDatabasesV5, Executor, HttpMethod, HttpRequest,
    HttpResponse,
};
use mock_server::{SAMPLE_BACKUP_ID, SAMPLE_DEPLOYMENT_ID, SAMPLE_REPLICA_ID};
use serde::de::DeserializeOwned;
use serde_json::json;

/// Runs requests with ureq.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, leaving status
/// interpretation to the caller.
#[derive(Clone)]
struct UreqExecutor {
    agent: ureq::Agent,
}

impl UreqExecutor {
    fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Executor for UreqExecutor {
    fn submit(&self, request: HttpRequest) -> impl Future<Output = Result<HttpResponse, ApiError>> + Send {
        let agent = self.agent.clone();
        async move {
            tokio::task::spawn_blocking(move || execute(&agent, request))
                .await
                .map_err(|e| ApiError::Transport(e.to_string()))?
        }
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn execute(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, ApiError> {
    let url = req.url();
    let headers = &req.headers;

    let result = match (req.method, req.body.as_deref()) {
        (HttpMethod::Get, _) => with_headers(agent.get(&url), headers).call(),
        (HttpMethod::Delete, _) => with_headers(agent.delete(&url), headers).call(),
        (HttpMethod::Post, Some(body)) => with_headers(agent.post(&url), headers).send(body.as_bytes()),
        (HttpMethod::Post, None) => with_headers(agent.post(&url), headers).send_empty(),
        (HttpMethod::Put, Some(body)) => with_headers(agent.put(&url), headers).send(body.as_bytes()),
        (HttpMethod::Put, None) => with_headers(agent.put(&url), headers).send_empty(),
        (HttpMethod::Patch, Some(body)) => with_headers(agent.patch(&url), headers).send(body.as_bytes()),
        (HttpMethod::Patch, None) => with_headers(agent.patch(&url), headers).send_empty(),
    };
    let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse { status, headers, body })
}

async fn start() -> CloudDatabasesV5<UreqExecutor> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    CloudDatabasesV5::new(CloudDatabasesClient::new(&format!("http://{addr}")), UreqExecutor::new())
}

fn parse<T: DeserializeOwned>(response: &HttpResponse) -> T {
    response.json().unwrap()
}

fn deployment() -> CallParameters {
    CallParameters::new().with("id", SAMPLE_DEPLOYMENT_ID)
}

/// Poll `getTask` until the task started by `accepted` finishes.
async fn wait_for_task(service: &CloudDatabasesV5<UreqExecutor>, accepted: HttpResponse) -> Task {
    assert_eq!(accepted.status, 202, "expected a task, got {}", accepted.body);
    let envelope: TaskResponse = parse(&accepted);
    let id = envelope.task.and_then(|t| t.id).unwrap();

    for _ in 0..30 {
        let response = service
            .get_task(CallParameters::new().with("id", id.as_str()))
            .await
            .unwrap();
        let task = parse::<TaskResponse>(&response).task.unwrap();
        if task.is_finished() {
            return task;
        }
    }
    panic!("task {id} did not finish");
}

#[tokio::test(flavor = "multi_thread")]
async fn deployment_discovery() {
    let service = start().await;

    let resp = service.list_deployables(CallParameters::new()).await.unwrap();
    let deployables: ListDeployablesResponse = parse(&resp);
    assert!(deployables
        .deployables
        .iter()
        .any(|d| d.database_type.as_deref() == Some("postgresql")));

    let resp = service.list_regions(CallParameters::new()).await.unwrap();
    let regions: ListRegionsResponse = parse(&resp);
    assert!(regions.regions.contains(&"us-south".to_string()));

    // The CRN contains `:` and `/`; it only resolves if it was encoded as
    // one path segment.
    let resp = service.get_deployment_info(deployment()).await.unwrap();
    let info: DeploymentResponse = parse(&resp);
    let info = info.deployment.unwrap();
    assert_eq!(info.id.as_deref(), Some(SAMPLE_DEPLOYMENT_ID));
    assert_eq!(info.database_type.as_deref(), Some("postgresql"));

    let resp = service
        .get_default_scaling_groups(CallParameters::new().with("type", "postgresql"))
        .await
        .unwrap();
    let groups: Groups = parse(&resp);
    assert_eq!(groups.groups[0].id.as_deref(), Some("member"));
}

#[tokio::test(flavor = "multi_thread")]
async fn allowlist_lifecycle() {
    let service = start().await;

    // Step 1: read the (empty) allowlist and its ETag.
    let resp = service.get_allowlist(deployment()).await.unwrap();
    let etag = resp.header("ETag").unwrap().to_string();
    let allowlist: Allowlist = parse(&resp);
    assert!(allowlist.ip_addresses.is_empty());

    // Step 2: replace it, guarded by the ETag.
    let entries = vec![AllowlistEntry::new("172.16.0.0/16", "Dev IP space 1")];
    let params = deployment()
        .with_json("ipAddresses", &entries)
        .unwrap()
        .with("ifMatch", etag.as_str());
    let task = wait_for_task(&service, service.set_allowlist(params).await.unwrap()).await;
    assert_eq!(task.status.as_deref(), Some("completed"));

    // Step 3: the same ETag is now stale.
    let params = deployment()
        .with("ipAddresses", json!([]))
        .with("ifMatch", etag.as_str());
    let resp = service.set_allowlist(params).await.unwrap();
    assert_eq!(resp.status, 412);
    let err = resp.json::<TaskResponse>().unwrap_err();
    assert!(matches!(err, ApiError::HttpError { status: 412, .. }));

    // Step 4: add a second entry.
    let params = deployment()
        .with_json("ipAddress", &AllowlistEntry::new("10.0.0.0/8", "vpc"))
        .unwrap();
    wait_for_task(&service, service.add_allowlist_entry(params).await.unwrap()).await;

    let resp = service.get_allowlist(deployment()).await.unwrap();
    let allowlist: Allowlist = parse(&resp);
    assert_eq!(allowlist.ip_addresses.len(), 2);

    // Step 5: delete by CIDR, which travels as `10.0.0.0%2F8`.
    let params = deployment().with("ipaddress", "10.0.0.0/8");
    wait_for_task(&service, service.delete_allowlist_entry(params.clone()).await.unwrap()).await;

    let resp = service.delete_allowlist_entry(params).await.unwrap();
    let err = resp.json::<TaskResponse>().unwrap_err();
    assert!(matches!(err, ApiError::NotFound));
}

#[tokio::test(flavor = "multi_thread")]
async fn user_and_connection_lifecycle() {
    let service = start().await;
    let user = DatabaseUser {
        username: Some("reporter".to_string()),
        password: Some("correct-horse-battery".to_string()),
        ..Default::default()
    };

    let params = deployment()
        .with("userType", "database")
        .with_json("user", &user)
        .unwrap();
    wait_for_task(&service, service.create_database_user(params).await.unwrap()).await;

    let params = deployment()
        .with("userType", "database")
        .with("userId", "reporter")
        .with("endpointType", "public")
        .with("certificateRoot", "/etc/certs");
    let resp = service.get_connection(params).await.unwrap();
    let connection: Connection = parse(&resp);
    let postgres = connection.method("postgres").unwrap();
    let cert = postgres.certificate.as_ref().and_then(|c| c.name.as_deref()).unwrap();
    assert!(cert.starts_with("/etc/certs/"));
    assert!(connection.method("cli").is_some());

    let params = deployment()
        .with("userType", "database")
        .with("username", "reporter")
        .with_json("user", &PasswordSetting { password: Some("n3w-p4ssw0rd".to_string()) })
        .unwrap();
    wait_for_task(&service, service.change_user_password(params).await.unwrap()).await;

    let params = deployment()
        .with("userType", "database")
        .with("userId", "reporter")
        .with("endpointType", "public")
        .with("password", "n3w-p4ssw0rd");
    let resp = service.complete_connection(params).await.unwrap();
    let connection: Connection = parse(&resp);
    let composed = &connection.method("postgres").unwrap().composed[0];
    assert!(composed.contains("reporter:n3w-p4ssw0rd@"), "{composed}");

    let params = deployment().with("userType", "database").with("username", "reporter");
    wait_for_task(&service, service.delete_database_user(params.clone()).await.unwrap()).await;
    let resp = service.delete_database_user(params).await.unwrap();
    assert_eq!(resp.status, 404);
}

#[tokio::test(flavor = "multi_thread")]
async fn backups_and_tasks() {
    let service = start().await;

    let resp = service
        .get_backup_info(CallParameters::new().with("backupId", SAMPLE_BACKUP_ID))
        .await
        .unwrap();
    let backup: BackupResponse = parse(&resp);
    assert_eq!(backup.backup.unwrap().backup_type.as_deref(), Some("scheduled"));

    let task = wait_for_task(&service, service.start_ondemand_backup(deployment()).await.unwrap()).await;
    assert_eq!(task.progress_percent, Some(100));

    let resp = service.list_deployment_backups(deployment()).await.unwrap();
    let backups: Backups = parse(&resp);
    assert_eq!(backups.backups.len(), 2);
    assert!(backups
        .backups
        .iter()
        .any(|b| b.backup_type.as_deref() == Some("on_demand")));

    let resp = service.get_pit_rdata(deployment()).await.unwrap();
    let pitr: PointInTimeRecoveryData = parse(&resp);
    assert!(pitr.earliest_point_in_time_recovery_time.is_some());

    let resp = service.list_deployment_tasks(deployment()).await.unwrap();
    let tasks: Tasks = parse(&resp);
    assert_eq!(tasks.tasks.len(), 1);
    assert!(tasks.tasks[0].is_finished());
}

#[tokio::test(flavor = "multi_thread")]
async fn scaling_autoscaling_and_configuration() {
    let service = start().await;

    let request = ScalingGroupRequest {
        memory: Some(Allocation {
            allocation_mb: Some(12288),
            ..Default::default()
        }),
        ..Default::default()
    };
    let params = deployment()
        .with("groupId", "member")
        .with_json("setDeploymentScalingGroupRequest", &request)
        .unwrap();
    wait_for_task(&service, service.set_deployment_scaling_group(params).await.unwrap()).await;

    let resp = service.list_deployment_scaling_groups(deployment()).await.unwrap();
    let groups: Groups = parse(&resp);
    let memory = groups.groups[0].memory.as_ref().unwrap();
    assert_eq!(memory.allocation_mb, Some(12288));

    let resp = service
        .get_autoscaling_conditions(deployment().with("groupId", "member"))
        .await
        .unwrap();
    let current: AutoscalingGroup = parse(&resp);
    assert!(current.autoscaling.disk.is_some());

    let params = deployment().with("groupId", "member").with(
        "autoscaling",
        json!({ "memory": { "scalers": { "io_utilization": { "enabled": true, "over_period": "5m", "above_percent": 90 } } } }),
    );
    wait_for_task(&service, service.set_autoscaling_conditions(params).await.unwrap()).await;

    let resp = service
        .get_autoscaling_conditions(deployment().with("groupId", "member"))
        .await
        .unwrap();
    let updated: AutoscalingGroup = parse(&resp);
    let io = updated
        .autoscaling
        .memory
        .and_then(|m| m.scalers)
        .and_then(|s| s.io_utilization)
        .unwrap();
    assert_eq!(io.enabled, Some(true));

    let params = deployment().with("configuration", json!({ "max_connections": 200 }));
    wait_for_task(&service, service.update_database_configuration(params).await.unwrap()).await;

    wait_for_task(&service, service.kill_connections(deployment()).await.unwrap()).await;
}

#[tokio::test(flavor = "multi_thread")]
async fn replica_resync_and_promotion() {
    let service = start().await;

    let resp = service.list_remotes(deployment()).await.unwrap();
    let remotes: ListRemotesResponse = parse(&resp);
    assert_eq!(remotes.remotes.unwrap().replicas, vec![SAMPLE_REPLICA_ID.to_string()]);

    let replica = CallParameters::new().with("id", SAMPLE_REPLICA_ID);
    wait_for_task(&service, service.resync_replica(replica.clone()).await.unwrap()).await;

    let params = replica.clone().with("promotion", json!({ "skip_initial_backup": true }));
    wait_for_task(&service, service.set_promotion(params).await.unwrap()).await;

    let resp = service.list_remotes(replica).await.unwrap();
    let remotes: ListRemotesResponse = parse(&resp);
    assert_eq!(remotes.remotes.unwrap().leader.as_deref(), Some(SAMPLE_REPLICA_ID));
}

#[tokio::test(flavor = "multi_thread")]
async fn errors_surface_through_the_result() {
    let service = start().await;

    // Missing parameters never reach the server.
    let err = service.get_deployment_info(CallParameters::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "Missing required parameters: id");

    let resp = service
        .get_deployment_info(CallParameters::new().with("id", "crn:v1:unknown"))
        .await
        .unwrap();
    assert_eq!(resp.status, 404);
    let err = resp.json::<DeploymentResponse>().unwrap_err();
    assert!(matches!(err, ApiError::NotFound));

    let err = service.call_named("dropDatabase", deployment()).await.unwrap_err();
    assert!(matches!(err, ApiError::UnknownOperation(name) if name == "dropDatabase"));

    let resp = service.call_named("listRegions", CallParameters::new()).await.unwrap();
    assert!(resp.is_success());
}
