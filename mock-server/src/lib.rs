//! In-memory mock of the Cloud Databases v5 API.
//!
//! Seeded with one PostgreSQL deployment and one read-only replica. Every
//! mutating route applies its change immediately and records a task; each
//! `GET /tasks/{id}` then moves that task one step along
//! `queued -> running -> completed` so clients can exercise polling.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{delete, get, patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::info;
use uuid::Uuid;

pub const SAMPLE_DEPLOYMENT_ID: &str = "crn:v1:bluemix:public:databases-for-postgresql:us-south:a/40ddc34a953a8c02f10987b59085b60e:5042afe1-72c2-4231-89cc-c949e5d56251::";
pub const SAMPLE_REPLICA_ID: &str = "crn:v1:bluemix:public:databases-for-postgresql:eu-de:a/40ddc34a953a8c02f10987b59085b60e:0b8b8bd0-1f1a-4f4e-8e1d-3c6a3f0a9d11::";
pub const SAMPLE_BACKUP_ID: &str = "crn:v1:bluemix:public:databases-for-postgresql:us-south:a/40ddc34a953a8c02f10987b59085b60e:5042afe1-72c2-4231-89cc-c949e5d56251:backup:0d3c7e5f-4c5a-4f19-a0cf-5f8f1c7e7a55";

const CERT_NAME: &str = "5042afe1-72c2-4231-89cc-c949e5d56251";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub description: String,
    pub status: String,
    pub deployment_id: String,
    pub progress_percent: u8,
}

impl Task {
    fn advance(&mut self) {
        match self.status.as_str() {
            "queued" => {
                self.status = "running".to_string();
                self.progress_percent = 50;
            }
            "running" => {
                self.status = "completed".to_string();
                self.progress_percent = 100;
            }
            _ => {}
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AllowlistEntry {
    pub address: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Backup {
    pub id: String,
    pub deployment_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
    pub is_downloadable: bool,
    pub is_restorable: bool,
}

#[derive(Clone, Debug)]
pub struct User {
    pub user_type: String,
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct DeploymentRecord {
    pub id: String,
    pub name: String,
    pub kind: String,
    pub version: String,
    pub users: Vec<User>,
    pub configuration: Map<String, Value>,
    pub allowlist: Vec<AllowlistEntry>,
    pub allowlist_version: u64,
    pub groups: Vec<Value>,
    pub autoscaling: Map<String, Value>,
    pub leader: String,
    pub replicas: Vec<String>,
}

impl DeploymentRecord {
    pub fn postgres(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            kind: "postgresql".to_string(),
            version: "16".to_string(),
            users: vec![User {
                user_type: "database".to_string(),
                username: "admin".to_string(),
                password: "initial-admin-password".to_string(),
            }],
            configuration: Map::new(),
            allowlist: Vec::new(),
            allowlist_version: 1,
            groups: vec![member_group()],
            autoscaling: Map::from_iter([("member".to_string(), default_autoscaling())]),
            leader: id.to_string(),
            replicas: Vec::new(),
        }
    }

    fn etag(&self) -> String {
        format!("\"{}\"", self.allowlist_version)
    }

    fn to_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "type": self.kind,
            "version": self.version,
            "platform_options": { "disk_encryption_key_crn": "" },
            "admin_usernames": { "database": "admin" },
            "enable_public_endpoints": true,
            "enable_private_endpoints": false,
        })
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub deployments: HashMap<String, DeploymentRecord>,
    pub tasks: HashMap<String, Task>,
    pub backups: HashMap<String, Backup>,
}

impl Store {
    /// One leader deployment with a scheduled backup, and one replica of it.
    pub fn seeded() -> Self {
        let mut leader = DeploymentRecord::postgres(SAMPLE_DEPLOYMENT_ID, "example-postgres");
        leader.replicas.push(SAMPLE_REPLICA_ID.to_string());
        let mut replica = DeploymentRecord::postgres(SAMPLE_REPLICA_ID, "example-postgres-replica");
        replica.leader = SAMPLE_DEPLOYMENT_ID.to_string();

        let backup = Backup {
            id: SAMPLE_BACKUP_ID.to_string(),
            deployment_id: SAMPLE_DEPLOYMENT_ID.to_string(),
            kind: "scheduled".to_string(),
            status: "completed".to_string(),
            is_downloadable: false,
            is_restorable: true,
        };

        Self {
            deployments: HashMap::from([(leader.id.clone(), leader), (replica.id.clone(), replica)]),
            tasks: HashMap::new(),
            backups: HashMap::from([(backup.id.clone(), backup)]),
        }
    }

    fn deployment(&self, id: &str) -> Result<&DeploymentRecord, StatusCode> {
        self.deployments.get(id).ok_or(StatusCode::NOT_FOUND)
    }

    fn deployment_mut(&mut self, id: &str) -> Result<&mut DeploymentRecord, StatusCode> {
        self.deployments.get_mut(id).ok_or(StatusCode::NOT_FOUND)
    }

    fn start_task(&mut self, deployment_id: &str, description: &str) -> Task {
        let task = Task {
            id: format!("crn:v1:bluemix:public:databases-for-postgresql:us-south:a/40ddc34a953a8c02f10987b59085b60e::task:{}", Uuid::new_v4()),
            description: description.to_string(),
            status: "queued".to_string(),
            deployment_id: deployment_id.to_string(),
            progress_percent: 0,
        };
        info!(task = %task.id, deployment = deployment_id, description, "task queued");
        self.tasks.insert(task.id.clone(), task.clone());
        task
    }
}

pub type Db = Arc<RwLock<Store>>;

type Accepted = (StatusCode, Json<Value>);

fn accepted(task: Task) -> Accepted {
    (StatusCode::ACCEPTED, Json(json!({ "task": task })))
}

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    Router::new()
        .route("/deployables", get(list_deployables))
        .route("/deployables/{type}/groups", get(default_groups))
        .route("/regions", get(list_regions))
        .route("/deployments/{id}", get(get_deployment))
        .route("/deployments/{id}/users/{user_type}", post(create_user))
        .route(
            "/deployments/{id}/users/{user_type}/{username}",
            patch(change_password).delete(delete_user),
        )
        .route(
            "/deployments/{id}/users/{user_type}/{username}/connections/{endpoint_type}",
            get(get_connection).post(complete_connection),
        )
        .route("/deployments/{id}/configuration", patch(update_configuration))
        .route("/deployments/{id}/remotes", get(list_remotes))
        .route("/deployments/{id}/remotes/resync", post(resync_replica))
        .route("/deployments/{id}/remotes/promotion", post(set_promotion))
        .route("/deployments/{id}/tasks", get(list_tasks))
        .route("/tasks/{id}", get(get_task))
        .route("/backups/{backup_id}", get(get_backup))
        .route("/deployments/{id}/backups", get(list_backups).post(start_backup))
        .route("/deployments/{id}/point_in_time_recovery_data", get(pitr_data))
        .route("/deployments/{id}/groups", get(list_groups))
        .route("/deployments/{id}/groups/{group_id}", patch(set_group))
        .route(
            "/deployments/{id}/groups/{group_id}/autoscaling",
            get(get_autoscaling).patch(set_autoscaling),
        )
        .route("/deployments/{id}/management/database_connections", delete(kill_connections))
        .route(
            "/deployments/{id}/whitelists/ip_addresses",
            get(get_allowlist).put(set_allowlist).post(add_allowlist_entry),
        )
        .route("/deployments/{id}/whitelists/ip_addresses/{ipaddress}", delete(delete_allowlist_entry))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

// ---------------------------------------------------------------------------
// Deployments
// ---------------------------------------------------------------------------

async fn list_deployables() -> Json<Value> {
    Json(json!({
        "deployables": [
            {
                "type": "postgresql",
                "versions": [
                    { "version": "15", "status": "stable", "is_preferred": false,
                      "transitions": [{ "application": "postgresql", "method": "restore", "from_version": "15", "to_version": "16" }] },
                    { "version": "16", "status": "stable", "is_preferred": true, "transitions": [] }
                ]
            },
            {
                "type": "redis",
                "versions": [{ "version": "7.2", "status": "stable", "is_preferred": true, "transitions": [] }]
            }
        ]
    }))
}

async fn list_regions() -> Json<Value> {
    Json(json!({ "regions": ["au-syd", "eu-de", "eu-gb", "jp-tok", "us-east", "us-south"] }))
}

async fn get_deployment(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let deployment = store.deployment(&id)?;
    Ok(Json(json!({ "deployment": deployment.to_json() })))
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct UserBody {
    pub user: Option<UserFields>,
}

#[derive(Deserialize)]
pub struct UserFields {
    pub username: Option<String>,
    pub password: Option<String>,
}

async fn create_user(
    State(db): State<Db>,
    Path((id, user_type)): Path<(String, String)>,
    Json(body): Json<UserBody>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    let fields = body.user.ok_or(StatusCode::BAD_REQUEST)?;
    let (Some(username), Some(password)) = (fields.username, fields.password) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    if deployment
        .users
        .iter()
        .any(|u| u.user_type == user_type && u.username == username)
    {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    deployment.users.push(User {
        user_type,
        username,
        password,
    });
    Ok(accepted(store.start_task(&id, "Creating user.")))
}

async fn change_password(
    State(db): State<Db>,
    Path((id, user_type, username)): Path<(String, String, String)>,
    Json(body): Json<UserBody>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    let password = body
        .user
        .and_then(|u| u.password)
        .ok_or(StatusCode::BAD_REQUEST)?;
    let user = deployment
        .users
        .iter_mut()
        .find(|u| u.user_type == user_type && u.username == username)
        .ok_or(StatusCode::NOT_FOUND)?;
    user.password = password;
    Ok(accepted(store.start_task(&id, "Setting user password.")))
}

async fn delete_user(
    State(db): State<Db>,
    Path((id, user_type, username)): Path<(String, String, String)>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    let before = deployment.users.len();
    deployment
        .users
        .retain(|u| !(u.user_type == user_type && u.username == username));
    if deployment.users.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(accepted(store.start_task(&id, "Deleting user.")))
}

// ---------------------------------------------------------------------------
// Connections
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ConnectionQuery {
    pub certificate_root: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct CompleteConnectionBody {
    pub password: Option<String>,
    pub certificate_root: Option<String>,
}

async fn get_connection(
    State(db): State<Db>,
    Path((id, user_type, username, endpoint_type)): Path<(String, String, String, String)>,
    Query(query): Query<ConnectionQuery>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let deployment = store.deployment(&id)?;
    connection_for(deployment, &user_type, &username, &endpoint_type, None, query.certificate_root.as_deref())
        .map(Json)
}

async fn complete_connection(
    State(db): State<Db>,
    Path((id, user_type, username, endpoint_type)): Path<(String, String, String, String)>,
    Json(body): Json<CompleteConnectionBody>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let deployment = store.deployment(&id)?;
    connection_for(
        deployment,
        &user_type,
        &username,
        &endpoint_type,
        body.password.as_deref(),
        body.certificate_root.as_deref(),
    )
    .map(Json)
}

fn connection_for(
    deployment: &DeploymentRecord,
    user_type: &str,
    username: &str,
    endpoint_type: &str,
    password: Option<&str>,
    certificate_root: Option<&str>,
) -> Result<Value, StatusCode> {
    let port: u16 = match endpoint_type {
        "public" => 31000,
        "private" => 31001,
        _ => return Err(StatusCode::UNPROCESSABLE_ENTITY),
    };
    if !deployment
        .users
        .iter()
        .any(|u| u.user_type == user_type && u.username == username)
    {
        return Err(StatusCode::NOT_FOUND);
    }

    let host = format!("{CERT_NAME}.{endpoint_type}.databases.appdomain.cloud");
    let password = password.unwrap_or("$PASSWORD");
    let certificate = match certificate_root {
        Some(root) => format!("{}/{CERT_NAME}", root.trim_end_matches('/')),
        None => CERT_NAME.to_string(),
    };

    Ok(json!({
        "connection": {
            "postgres": {
                "type": "uri",
                "composed": [format!("postgres://{username}:{password}@{host}:{port}/ibmclouddb?sslmode=verify-full")],
                "scheme": "postgres",
                "hosts": [{ "hostname": host, "port": port }],
                "path": "/ibmclouddb",
                "query_options": { "sslmode": "verify-full" },
                "authentication": { "method": "direct", "username": username, "password": password },
                "certificate": { "name": certificate },
                "database": "ibmclouddb"
            },
            "cli": {
                "type": "cli",
                "composed": [format!("PGPASSWORD={password} PGSSLROOTCERT={certificate} psql 'host={host} port={port} dbname=ibmclouddb user={username} sslmode=verify-full'")],
                "environment": { "PGPASSWORD": password, "PGSSLROOTCERT": certificate },
                "bin": "psql",
                "arguments": [[format!("host={host} port={port} dbname=ibmclouddb user={username} sslmode=verify-full")]],
                "certificate": { "name": certificate }
            }
        }
    }))
}

// ---------------------------------------------------------------------------
// Configuration and remotes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct ConfigurationBody {
    pub configuration: Map<String, Value>,
}

async fn update_configuration(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(body): Json<ConfigurationBody>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    deployment.configuration.extend(body.configuration);
    Ok(accepted(store.start_task(&id, "Applying configuration changes.")))
}

async fn list_remotes(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let deployment = store.deployment(&id)?;
    Ok(Json(json!({
        "remotes": { "leader": deployment.leader, "replicas": deployment.replicas }
    })))
}

async fn resync_replica(State(db): State<Db>, Path(id): Path<String>) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment(&id)?;
    if deployment.leader == deployment.id {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(accepted(store.start_task(&id, "Resyncing read-only replica.")))
}

#[derive(Deserialize)]
pub struct PromotionBody {
    #[serde(rename = "Promotion")]
    pub promotion: Map<String, Value>,
}

async fn set_promotion(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(_body): Json<PromotionBody>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let leader_id = {
        let replica = store.deployment_mut(&id)?;
        if replica.leader == replica.id {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
        std::mem::replace(&mut replica.leader, id.clone())
    };
    if let Some(leader) = store.deployments.get_mut(&leader_id) {
        leader.replicas.retain(|r| *r != id);
    }
    Ok(accepted(store.start_task(&id, "Promoting read-only replica.")))
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

async fn list_tasks(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store.deployment(&id)?;
    let tasks: Vec<&Task> = store.tasks.values().filter(|t| t.deployment_id == id).collect();
    Ok(Json(json!({ "tasks": tasks })))
}

async fn get_task(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let mut store = db.write().await;
    let task = store.tasks.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    let snapshot = task.clone();
    task.advance();
    Ok(Json(json!({ "task": snapshot })))
}

// ---------------------------------------------------------------------------
// Backups
// ---------------------------------------------------------------------------

async fn get_backup(State(db): State<Db>, Path(backup_id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let backup = store.backups.get(&backup_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "backup": backup })))
}

async fn list_backups(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store.deployment(&id)?;
    let backups: Vec<&Backup> = store.backups.values().filter(|b| b.deployment_id == id).collect();
    Ok(Json(json!({ "backups": backups })))
}

async fn start_backup(State(db): State<Db>, Path(id): Path<String>) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    store.deployment(&id)?;
    let backup = Backup {
        id: format!("{}:backup:{}", id.trim_end_matches(':'), Uuid::new_v4()),
        deployment_id: id.clone(),
        kind: "on_demand".to_string(),
        status: "completed".to_string(),
        is_downloadable: false,
        is_restorable: true,
    };
    store.backups.insert(backup.id.clone(), backup);
    Ok(accepted(store.start_task(&id, "Creating an on-demand backup.")))
}

async fn pitr_data(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    store.deployment(&id)?;
    Ok(Json(json!({ "earliest_point_in_time_recovery_time": "2026-01-01T00:00:00Z" })))
}

// ---------------------------------------------------------------------------
// Scaling and autoscaling
// ---------------------------------------------------------------------------

fn member_group() -> Value {
    json!({
        "id": "member",
        "count": 2,
        "members": { "units": "count", "allocation_count": 2, "minimum_count": 2, "maximum_count": 20,
                     "step_size_count": 1, "is_adjustable": true, "is_optional": false, "can_scale_down": false },
        "memory": { "units": "mb", "allocation_mb": 8192, "minimum_mb": 2048, "maximum_mb": 229376,
                    "step_size_mb": 256, "is_adjustable": true, "is_optional": false, "can_scale_down": true },
        "cpu": { "units": "count", "allocation_count": 6, "minimum_count": 6, "maximum_count": 56,
                 "step_size_count": 2, "is_adjustable": true, "is_optional": false, "can_scale_down": true },
        "disk": { "units": "mb", "allocation_mb": 10240, "minimum_mb": 10240, "maximum_mb": 4194304,
                  "step_size_mb": 2048, "is_adjustable": true, "is_optional": false, "can_scale_down": false }
    })
}

fn default_autoscaling() -> Value {
    json!({
        "disk": {
            "scalers": {
                "capacity": { "enabled": false, "free_space_less_than_percent": 10 },
                "io_utilization": { "enabled": false, "over_period": "30m", "above_percent": 45 }
            },
            "rate": { "increase_percent": 10, "period_seconds": 900, "limit_mb_per_member": 3670016, "units": "mb" }
        },
        "memory": {
            "scalers": { "io_utilization": { "enabled": false, "over_period": "30m", "above_percent": 45 } },
            "rate": { "increase_percent": 10, "period_seconds": 900, "limit_mb_per_member": 114688, "units": "mb" }
        },
        "cpu": {
            "scalers": {},
            "rate": { "increase_percent": 10, "period_seconds": 900, "limit_count_per_member": 10, "units": "count" }
        }
    })
}

async fn default_groups(Path(kind): Path<String>) -> Result<Json<Value>, StatusCode> {
    match kind.as_str() {
        "postgresql" | "redis" | "mongodb" | "etcd" | "rabbitmq" | "elasticsearch" => {
            Ok(Json(json!({ "groups": [member_group()] })))
        }
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn list_groups(State(db): State<Db>, Path(id): Path<String>) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let deployment = store.deployment(&id)?;
    Ok(Json(json!({ "groups": deployment.groups })))
}

async fn set_group(
    State(db): State<Db>,
    Path((id, group_id)): Path<(String, String)>,
    Json(body): Json<Map<String, Value>>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    let group = deployment
        .groups
        .iter_mut()
        .find(|g| g["id"] == group_id.as_str())
        .ok_or(StatusCode::NOT_FOUND)?;

    for (resource, request) in &body {
        let (field, minimum, step) = match resource.as_str() {
            "members" | "cpu" => ("allocation_count", "minimum_count", "step_size_count"),
            "memory" | "disk" => ("allocation_mb", "minimum_mb", "step_size_mb"),
            _ => return Err(StatusCode::BAD_REQUEST),
        };
        let Some(value) = request.get(field).and_then(Value::as_i64) else {
            return Err(StatusCode::BAD_REQUEST);
        };
        let current = &mut group[resource.as_str()];
        let min = current[minimum].as_i64().unwrap_or(0);
        let step_size = current[step].as_i64().unwrap_or(1).max(1);
        if value < min || value % step_size != 0 {
            return Err(StatusCode::UNPROCESSABLE_ENTITY);
        }
        current[field] = json!(value);
        if resource == "members" {
            group["count"] = json!(value);
        }
    }
    Ok(accepted(store.start_task(&id, "Scaling deployment.")))
}

async fn get_autoscaling(
    State(db): State<Db>,
    Path((id, group_id)): Path<(String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let store = db.read().await;
    let deployment = store.deployment(&id)?;
    let conditions = deployment.autoscaling.get(&group_id).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(json!({ "autoscaling": conditions })))
}

#[derive(Deserialize)]
pub struct AutoscalingBody {
    pub autoscaling: Map<String, Value>,
}

async fn set_autoscaling(
    State(db): State<Db>,
    Path((id, group_id)): Path<(String, String)>,
    Json(body): Json<AutoscalingBody>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    let conditions = deployment
        .autoscaling
        .get_mut(&group_id)
        .and_then(Value::as_object_mut)
        .ok_or(StatusCode::NOT_FOUND)?;
    conditions.extend(body.autoscaling);
    Ok(accepted(store.start_task(&id, "Setting autoscaling conditions.")))
}

async fn kill_connections(State(db): State<Db>, Path(id): Path<String>) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    store.deployment(&id)?;
    Ok(accepted(store.start_task(&id, "Terminating database connections.")))
}

// ---------------------------------------------------------------------------
// Allowlist
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct SetAllowlistBody {
    #[serde(default)]
    pub ip_addresses: Vec<AllowlistEntry>,
}

#[derive(Deserialize)]
pub struct AddAllowlistBody {
    pub ip_address: Option<AllowlistEntry>,
}

async fn get_allowlist(State(db): State<Db>, Path(id): Path<String>) -> Result<impl IntoResponse, StatusCode> {
    let store = db.read().await;
    let deployment = store.deployment(&id)?;
    Ok((
        [(header::ETAG, deployment.etag())],
        Json(json!({ "ip_addresses": deployment.allowlist })),
    ))
}

async fn set_allowlist(
    State(db): State<Db>,
    Path(id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<SetAllowlistBody>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    if let Some(expected) = headers.get(header::IF_MATCH) {
        if expected.as_bytes() != deployment.etag().as_bytes() {
            return Err(StatusCode::PRECONDITION_FAILED);
        }
    }
    deployment.allowlist = body.ip_addresses;
    deployment.allowlist_version += 1;
    Ok(accepted(store.start_task(&id, "Updating allowlist.")))
}

async fn add_allowlist_entry(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(body): Json<AddAllowlistBody>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    let entry = body.ip_address.ok_or(StatusCode::BAD_REQUEST)?;
    if deployment.allowlist.iter().any(|e| e.address == entry.address) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    deployment.allowlist.push(entry);
    deployment.allowlist_version += 1;
    Ok(accepted(store.start_task(&id, "Adding allowlist entry.")))
}

async fn delete_allowlist_entry(
    State(db): State<Db>,
    Path((id, address)): Path<(String, String)>,
) -> Result<Accepted, StatusCode> {
    let mut store = db.write().await;
    let deployment = store.deployment_mut(&id)?;
    let before = deployment.allowlist.len();
    deployment.allowlist.retain(|e| e.address != address);
    if deployment.allowlist.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    deployment.allowlist_version += 1;
    Ok(accepted(store.start_task(&id, "Deleting allowlist entry.")))
}
