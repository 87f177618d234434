//! The Cloud Databases v5 operation table.
//!
//! # Design
//! Every remote call is one `OperationSpec` constant. The builder in
//! `client.rs` is the only code that interprets them, so adding an endpoint
//! means adding a row here and a one-line method on the service. Paths,
//! methods and wire field names must match the backend byte-for-byte.

use crate::http::HttpMethod;

pub const JSON: &str = "application/json";

/// Shape of the request body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    /// No body and no `Content-Type`.
    None,
    /// A JSON object with one key per present parameter: `(wire key, parameter)`.
    Fields(&'static [(&'static str, &'static str)]),
    /// The named parameter's value is sent as the entire body.
    Whole(&'static str),
}

/// Static description of one remote call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: &'static str,
    pub method: HttpMethod,
    /// URL template relative to the service URL, with `{placeholder}`s.
    pub url: &'static str,
    pub required: &'static [&'static str],
    /// `(placeholder, parameter)`; every placeholder's parameter is required.
    pub path: &'static [(&'static str, &'static str)],
    /// `(query key, parameter)`.
    pub query: &'static [(&'static str, &'static str)],
    pub body: Body,
    /// `(header name, parameter)` headers set only when the parameter is present.
    pub headers: &'static [(&'static str, &'static str)],
    pub accept: &'static str,
}

impl OperationSpec {
    /// `Content-Type` sent with this operation; only body-carrying
    /// operations declare one.
    pub fn content_type(&self) -> Option<&'static str> {
        match self.body {
            Body::None => None,
            Body::Fields(_) | Body::Whole(_) => Some(JSON),
        }
    }
}

const GET: OperationSpec = OperationSpec {
    name: "",
    method: HttpMethod::Get,
    url: "",
    required: &[],
    path: &[],
    query: &[],
    body: Body::None,
    headers: &[],
    accept: JSON,
};

const ID: &[(&str, &str)] = &[("id", "id")];
const ID_GROUP: &[(&str, &str)] = &[("id", "id"), ("group_id", "groupId")];
const ID_USER: &[(&str, &str)] = &[("id", "id"), ("user_type", "userType"), ("username", "username")];
const ID_CONNECTION: &[(&str, &str)] = &[
    ("id", "id"),
    ("user_type", "userType"),
    ("user_id", "userId"),
    ("endpoint_type", "endpointType"),
];

// deployments

pub const LIST_DEPLOYABLES: OperationSpec = OperationSpec {
    name: "listDeployables",
    url: "/deployables",
    ..GET
};

pub const LIST_REGIONS: OperationSpec = OperationSpec {
    name: "listRegions",
    url: "/regions",
    ..GET
};

pub const GET_DEPLOYMENT_INFO: OperationSpec = OperationSpec {
    name: "getDeploymentInfo",
    url: "/deployments/{id}",
    required: &["id"],
    path: ID,
    ..GET
};

// database users

pub const CREATE_DATABASE_USER: OperationSpec = OperationSpec {
    name: "createDatabaseUser",
    method: HttpMethod::Post,
    url: "/deployments/{id}/users/{user_type}",
    required: &["id", "userType"],
    path: &[("id", "id"), ("user_type", "userType")],
    body: Body::Fields(&[("user", "user")]),
    ..GET
};

pub const CHANGE_USER_PASSWORD: OperationSpec = OperationSpec {
    name: "changeUserPassword",
    method: HttpMethod::Patch,
    url: "/deployments/{id}/users/{user_type}/{username}",
    required: &["id", "userType", "username"],
    path: ID_USER,
    body: Body::Fields(&[("user", "user")]),
    ..GET
};

pub const DELETE_DATABASE_USER: OperationSpec = OperationSpec {
    name: "deleteDatabaseUser",
    method: HttpMethod::Delete,
    url: "/deployments/{id}/users/{user_type}/{username}",
    required: &["id", "userType", "username"],
    path: ID_USER,
    ..GET
};

// configuration

pub const UPDATE_DATABASE_CONFIGURATION: OperationSpec = OperationSpec {
    name: "updateDatabaseConfiguration",
    method: HttpMethod::Patch,
    url: "/deployments/{id}/configuration",
    required: &["id", "configuration"],
    path: ID,
    body: Body::Fields(&[("configuration", "configuration")]),
    ..GET
};

// remotes

pub const LIST_REMOTES: OperationSpec = OperationSpec {
    name: "listRemotes",
    url: "/deployments/{id}/remotes",
    required: &["id"],
    path: ID,
    ..GET
};

pub const RESYNC_REPLICA: OperationSpec = OperationSpec {
    name: "resyncReplica",
    method: HttpMethod::Post,
    url: "/deployments/{id}/remotes/resync",
    required: &["id"],
    path: ID,
    ..GET
};

pub const SET_PROMOTION: OperationSpec = OperationSpec {
    name: "setPromotion",
    method: HttpMethod::Post,
    url: "/deployments/{id}/remotes/promotion",
    required: &["id", "promotion"],
    path: ID,
    // The backend expects the capitalised key.
    body: Body::Fields(&[("Promotion", "promotion")]),
    ..GET
};

// tasks

pub const LIST_DEPLOYMENT_TASKS: OperationSpec = OperationSpec {
    name: "listDeploymentTasks",
    url: "/deployments/{id}/tasks",
    required: &["id"],
    path: ID,
    ..GET
};

pub const GET_TASK: OperationSpec = OperationSpec {
    name: "getTask",
    url: "/tasks/{id}",
    required: &["id"],
    path: ID,
    ..GET
};

// backups

pub const GET_BACKUP_INFO: OperationSpec = OperationSpec {
    name: "getBackupInfo",
    url: "/backups/{backup_id}",
    required: &["backupId"],
    path: &[("backup_id", "backupId")],
    ..GET
};

pub const LIST_DEPLOYMENT_BACKUPS: OperationSpec = OperationSpec {
    name: "listDeploymentBackups",
    url: "/deployments/{id}/backups",
    required: &["id"],
    path: ID,
    ..GET
};

pub const START_ONDEMAND_BACKUP: OperationSpec = OperationSpec {
    name: "startOndemandBackup",
    method: HttpMethod::Post,
    url: "/deployments/{id}/backups",
    required: &["id"],
    path: ID,
    ..GET
};

pub const GET_PIT_RDATA: OperationSpec = OperationSpec {
    name: "getPitRdata",
    url: "/deployments/{id}/point_in_time_recovery_data",
    required: &["id"],
    path: ID,
    ..GET
};

// connections

pub const GET_CONNECTION: OperationSpec = OperationSpec {
    name: "getConnection",
    url: "/deployments/{id}/users/{user_type}/{user_id}/connections/{endpoint_type}",
    required: &["id", "userType", "userId", "endpointType"],
    path: ID_CONNECTION,
    query: &[("certificate_root", "certificateRoot")],
    ..GET
};

pub const COMPLETE_CONNECTION: OperationSpec = OperationSpec {
    name: "completeConnection",
    method: HttpMethod::Post,
    url: "/deployments/{id}/users/{user_type}/{user_id}/connections/{endpoint_type}",
    required: &["id", "userType", "userId", "endpointType"],
    path: ID_CONNECTION,
    body: Body::Fields(&[("password", "password"), ("certificate_root", "certificateRoot")]),
    ..GET
};

// scaling

pub const LIST_DEPLOYMENT_SCALING_GROUPS: OperationSpec = OperationSpec {
    name: "listDeploymentScalingGroups",
    url: "/deployments/{id}/groups",
    required: &["id"],
    path: ID,
    ..GET
};

pub const GET_DEFAULT_SCALING_GROUPS: OperationSpec = OperationSpec {
    name: "getDefaultScalingGroups",
    url: "/deployables/{type}/groups",
    required: &["type"],
    path: &[("type", "type")],
    ..GET
};

pub const SET_DEPLOYMENT_SCALING_GROUP: OperationSpec = OperationSpec {
    name: "setDeploymentScalingGroup",
    method: HttpMethod::Patch,
    url: "/deployments/{id}/groups/{group_id}",
    required: &["id", "groupId", "setDeploymentScalingGroupRequest"],
    path: ID_GROUP,
    body: Body::Whole("setDeploymentScalingGroupRequest"),
    ..GET
};

// autoscaling

pub const GET_AUTOSCALING_CONDITIONS: OperationSpec = OperationSpec {
    name: "getAutoscalingConditions",
    url: "/deployments/{id}/groups/{group_id}/autoscaling",
    required: &["id", "groupId"],
    path: ID_GROUP,
    ..GET
};

pub const SET_AUTOSCALING_CONDITIONS: OperationSpec = OperationSpec {
    name: "setAutoscalingConditions",
    method: HttpMethod::Patch,
    url: "/deployments/{id}/groups/{group_id}/autoscaling",
    required: &["id", "groupId", "autoscaling"],
    path: ID_GROUP,
    body: Body::Fields(&[("autoscaling", "autoscaling")]),
    ..GET
};

// management

pub const KILL_CONNECTIONS: OperationSpec = OperationSpec {
    name: "killConnections",
    method: HttpMethod::Delete,
    url: "/deployments/{id}/management/database_connections",
    required: &["id"],
    path: ID,
    ..GET
};

// allowlist

pub const GET_ALLOWLIST: OperationSpec = OperationSpec {
    name: "getAllowlist",
    url: "/deployments/{id}/whitelists/ip_addresses",
    required: &["id"],
    path: ID,
    ..GET
};

pub const SET_ALLOWLIST: OperationSpec = OperationSpec {
    name: "setAllowlist",
    method: HttpMethod::Put,
    url: "/deployments/{id}/whitelists/ip_addresses",
    required: &["id"],
    path: ID,
    body: Body::Fields(&[("ip_addresses", "ipAddresses")]),
    headers: &[("If-Match", "ifMatch")],
    ..GET
};

pub const ADD_ALLOWLIST_ENTRY: OperationSpec = OperationSpec {
    name: "addAllowlistEntry",
    method: HttpMethod::Post,
    url: "/deployments/{id}/whitelists/ip_addresses",
    required: &["id"],
    path: ID,
    body: Body::Fields(&[("ip_address", "ipAddress")]),
    ..GET
};

pub const DELETE_ALLOWLIST_ENTRY: OperationSpec = OperationSpec {
    name: "deleteAllowlistEntry",
    method: HttpMethod::Delete,
    url: "/deployments/{id}/whitelists/ip_addresses/{ipaddress}",
    required: &["id", "ipaddress"],
    path: &[("id", "id"), ("ipaddress", "ipaddress")],
    ..GET
};

/// Every operation, in the order the API reference groups them.
pub const OPERATIONS: &[OperationSpec] = &[
    LIST_DEPLOYABLES,
    LIST_REGIONS,
    GET_DEPLOYMENT_INFO,
    CREATE_DATABASE_USER,
    CHANGE_USER_PASSWORD,
    DELETE_DATABASE_USER,
    UPDATE_DATABASE_CONFIGURATION,
    LIST_REMOTES,
    RESYNC_REPLICA,
    SET_PROMOTION,
    LIST_DEPLOYMENT_TASKS,
    GET_TASK,
    GET_BACKUP_INFO,
    LIST_DEPLOYMENT_BACKUPS,
    START_ONDEMAND_BACKUP,
    GET_PIT_RDATA,
    GET_CONNECTION,
    COMPLETE_CONNECTION,
    LIST_DEPLOYMENT_SCALING_GROUPS,
    GET_DEFAULT_SCALING_GROUPS,
    SET_DEPLOYMENT_SCALING_GROUP,
    GET_AUTOSCALING_CONDITIONS,
    SET_AUTOSCALING_CONDITIONS,
    KILL_CONNECTIONS,
    GET_ALLOWLIST,
    SET_ALLOWLIST,
    ADD_ALLOWLIST_ENTRY,
    DELETE_ALLOWLIST_ENTRY,
];

/// Look up an operation by its API name, e.g. `"getTask"`.
pub fn find(name: &str) -> Option<&'static OperationSpec> {
    OPERATIONS.iter().find(|op| op.name == name)
}
