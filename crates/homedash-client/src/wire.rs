use anyhow::Context;
use homedash_core::{FieldMap, ServiceResponse};
use serde::{Deserialize, Serialize};

pub const CONNECT_PATH: &str = "/connect-service";
pub const DISCONNECT_PATH: &str = "/disconnect-service";
pub const LOGS_PATH: &str = "/logs";

#[derive(Debug, Serialize)]
pub struct ConnectBody<'a> {
    pub name: &'a str,
    pub fields: &'a FieldMap,
}

#[derive(Debug, Serialize)]
pub struct DisconnectBody<'a> {
    pub name: &'a str,
}

#[derive(Debug, Deserialize)]
struct LogsReply {
    log_data: String,
}

pub fn parse_service_response(body: &str) -> anyhow::Result<ServiceResponse> {
    serde_json::from_str(body).context("parse service response")
}

pub fn parse_logs_response(body: &str) -> anyhow::Result<String> {
    let reply: LogsReply = serde_json::from_str(body).context("parse logs response")?;
    Ok(reply.log_data)
}

pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
