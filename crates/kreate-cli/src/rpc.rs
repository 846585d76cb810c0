//! JSON-lines request/response loop over the [`KreateApi`].

use std::io::{BufRead, Write};

use kreate::{DialogOptions, KreateApi};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{CliError, CliResult};

#[derive(Debug, Deserialize)]
pub struct RpcRequest {
    #[serde(default)]
    pub id: Value,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcResponse {
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
}

#[derive(Debug, Serialize)]
pub struct RpcError {
    pub message: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct GetCommandsParams {
    parent: Option<String>,
}

#[derive(Deserialize)]
struct GetCommandDetailsParams {
    path: Vec<String>,
}

#[derive(Deserialize)]
struct ExecuteCommandParams {
    args: Vec<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct OpenDialogParams {
    options: DialogOptions,
}

#[derive(Deserialize)]
struct CreateParams {
    content: String,
}

#[derive(Deserialize)]
struct SpecParams {
    content: String,
    #[serde(default)]
    path: Vec<String>,
}

#[derive(Deserialize)]
struct PathAtPositionParams {
    content: String,
    position: usize,
}

fn parse_params<T: DeserializeOwned>(method: &str, params: Value) -> CliResult<T> {
    let params = if params.is_null() {
        Value::Object(serde_json::Map::new())
    } else {
        params
    };
    serde_json::from_value(params).map_err(|source| CliError::InvalidParams {
        method: method.to_string(),
        source,
    })
}

/// Run `method` against `api`.
pub fn handle_method(api: &dyn KreateApi, method: &str, params: Value) -> CliResult<Value> {
    let value = match method {
        "getCommands" => {
            let params: GetCommandsParams = parse_params(method, params)?;
            serde_json::to_value(api.get_commands(params.parent.as_deref())?)?
        }
        "getCommandDetails" => {
            let params: GetCommandDetailsParams = parse_params(method, params)?;
            serde_json::to_value(api.get_command_details(&params.path)?)?
        }
        "executeCommand" => {
            let params: ExecuteCommandParams = parse_params(method, params)?;
            Value::String(api.execute_command(&params.args)?)
        }
        "openDialog" => {
            let params: OpenDialogParams = parse_params(method, params)?;
            serde_json::to_value(api.open_dialog(&params.options)?)?
        }
        "create" => {
            let params: CreateParams = parse_params(method, params)?;
            api.create(&params.content)?;
            Value::Null
        }
        "getSpecFromYamlManifest" => {
            let params: SpecParams = parse_params(method, params)?;
            serde_json::to_value(api.get_spec_from_yaml_manifest(&params.content, &params.path)?)?
        }
        "getPathAtPosition" => {
            let params: PathAtPositionParams = parse_params(method, params)?;
            serde_json::to_value(api.get_path_at_position(&params.content, params.position)?)?
        }
        "getState" => serde_json::to_value(api.get_state())?,
        other => return Err(CliError::UnknownMethod(other.to_string())),
    };
    Ok(value)
}

fn error_response(id: Value, message: String) -> RpcResponse {
    RpcResponse {
        id,
        result: None,
        error: Some(RpcError { message }),
    }
}

pub fn handle_request(api: &dyn KreateApi, request: RpcRequest) -> RpcResponse {
    tracing::debug!(method = %request.method, id = %request.id, "rpc request");
    match handle_method(api, &request.method, request.params) {
        Ok(result) => RpcResponse {
            id: request.id,
            result: Some(result),
            error: None,
        },
        Err(err) => {
            tracing::debug!(method = %request.method, %err, "rpc request failed");
            error_response(request.id, err.to_string())
        }
    }
}

/// Answer one request per input line until `input` is exhausted.
pub fn serve<R: BufRead, W: Write>(api: &dyn KreateApi, input: R, mut output: W) -> CliResult<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<RpcRequest>(&line) {
            Ok(request) => handle_request(api, request),
            Err(err) => error_response(Value::Null, format!("invalid request: {err}")),
        };

        writeln!(output, "{}", serde_json::to_string(&response)?)?;
        output.flush()?;
    }
    Ok(())
}
