mod common;

use color_eyre::eyre;
use common::{DryRunHost, TestdataTransport};
use kreate::KreateApiImpl;
use kreate_cli::rpc;
use serde_json::{Value, json};
use test_util::prelude::*;

fn exchange(api: &KreateApiImpl<DryRunHost, TestdataTransport>, requests: &[Value]) -> Vec<Value> {
    let input: String = requests
        .iter()
        .map(|request| format!("{request}\n"))
        .collect();
    let mut output = Vec::new();
    rpc::serve(api, input.as_bytes(), &mut output).expect("serve");
    String::from_utf8(output)
        .expect("utf8")
        .lines()
        .map(|line| serde_json::from_str(line).expect("response json"))
        .collect()
}

fn bound_api(dir: &std::path::Path) -> eyre::Result<KreateApiImpl<DryRunHost, TestdataTransport>> {
    let kubeconfig = write_kubeconfig(dir, "https://127.0.0.1:6443")?;
    Ok(KreateApiImpl::new(
        DryRunHost {
            kubeconfig: Some(kubeconfig),
        },
        TestdataTransport,
    ))
}

#[test]
fn answers_one_line_per_request() -> eyre::Result<()> {
    Builder::default().build();
    let dir = test_util::tempdir();
    let api = bound_api(dir.path())?;
    let content = "apiVersion: v1\nkind: Pod\nmetadata:\n  name: pod-name\n";
    let offset = content.find("name:").expect("name key");

    let responses = exchange(
        &api,
        &[
            json!({"id": 1, "method": "getCommands"}),
            json!({"id": 2, "method": "getCommands", "params": {"parent": "service"}}),
            json!({"id": "path", "method": "getPathAtPosition", "params": {"content": content, "position": offset}}),
            json!({"id": 4, "method": "getState"}),
            json!({"id": 5, "method": "openDialog", "params": {"options": {"title": "Select"}}}),
            json!({"id": 6, "method": "executeCommand", "params": {"args": ["kubectl", "version"]}}),
        ],
    );

    sim_assert_eq!(
        responses,
        vec![
            json!({"id": 1, "result": ["configmap", "deployment", "ingress", "pod", "secret", "service"]}),
            json!({"id": 2, "result": ["clusterip", "externalname", "loadbalancer", "nodeport"]}),
            json!({"id": "path", "result": ["metadata", "name"]}),
            json!({"id": 4, "result": {"content": content, "position": offset}}),
            json!({"id": 5, "result": null}),
            json!({"id": 6, "result": "kubectl version"}),
        ]
    );
    Ok(())
}

#[test]
fn resolves_specs_for_manifests() -> eyre::Result<()> {
    Builder::default().build();
    let dir = test_util::tempdir();
    let api = bound_api(dir.path())?;

    let responses = exchange(
        &api,
        &[json!({
            "id": 1,
            "method": "getSpecFromYamlManifest",
            "params": {
                "content": "apiVersion: apps/v1\nkind: Deployment\n",
                "path": ["metadata", "name"],
            },
        })],
    );
    let result = &responses[0]["result"];
    sim_assert_eq!(result["name"], "name");
    sim_assert_eq!(result["type"], "string");
    sim_assert_eq!(result["isArray"], false);
    Ok(())
}

#[test]
fn failures_become_error_responses() -> eyre::Result<()> {
    Builder::default().build();
    let api = KreateApiImpl::new(DryRunHost::default(), TestdataTransport);

    let mut output = Vec::new();
    let input = [
        json!({"id": 1, "method": "getSpecFromYamlManifest", "params": {"content": "apiVersion: v1\nkind: Pod\n"}}).to_string(),
        json!({"id": 2, "method": "create", "params": {"content": "foo: bar\n"}}).to_string(),
        json!({"id": 3, "method": "getCommands", "params": {"parent": "unicorn"}}).to_string(),
        json!({"id": 4, "method": "launch"}).to_string(),
        json!({"id": 5, "method": "getPathAtPosition", "params": {"content": "a: 1"}}).to_string(),
        "{not json".to_string(),
        String::new(),
    ]
    .join("\n");
    rpc::serve(&api, input.as_bytes(), &mut output)?;

    let responses: Vec<Value> = String::from_utf8(output)?
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    sim_assert_eq!(responses.len(), 6);
    sim_assert_eq!(
        responses[0],
        json!({"id": 1, "error": {"message": "No current context"}})
    );
    sim_assert_eq!(
        responses[1]["error"]["message"],
        "No valid Kubernetes resources found in content"
    );
    sim_assert_eq!(
        responses[2]["error"]["message"],
        "parent command unicorn not found"
    );
    sim_assert_eq!(responses[3]["error"]["message"], "unknown method launch");
    let invalid = responses[4]["error"]["message"].as_str().unwrap_or_default();
    assert!(invalid.starts_with("invalid params for getPathAtPosition"), "{invalid}");
    sim_assert_eq!(responses[5]["id"], Value::Null);
    let message = responses[5]["error"]["message"].as_str().unwrap_or_default();
    assert!(message.starts_with("invalid request"), "{message}");
    Ok(())
}
