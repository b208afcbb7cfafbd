//! JSON-RPC End-to-End Tests
//!
//! Runs the RPC server over a filesystem repository backed by `fake-blaster`
//! and drives a full instance lifecycle through an HTTP client.

use std::sync::Arc;
use std::time::Duration;

use blasterctl_api_rpc::{RpcServer, RpcServerConfig};
use blasterctl_core::port::InstanceRepository;
use blasterctl_infra_system::{FsInstanceRepository, RepositoryConfig, SystemHostProbe};
use blasterctl_metrics::InstanceCollector;
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::core::ClientError;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use prometheus::Registry;
use serde_json::{json, Value};
use tempfile::TempDir;
use tracing::Span;

const FAKE_BLASTER: &str = env!("CARGO_BIN_EXE_fake-blaster");

fn params(value: Value) -> ObjectParams {
    let mut params = ObjectParams::new();
    if let Value::Object(map) = value {
        for (key, value) in map {
            params.insert(&key, value).unwrap();
        }
    }
    params
}

async fn call(client: &HttpClient, method: &str, value: Value) -> Result<Value, ClientError> {
    client.request(method, params(value)).await
}

fn error_code(err: ClientError) -> i32 {
    match err {
        ClientError::Call(obj) => obj.code(),
        other => panic!("unexpected client error: {other}"),
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_instance_lifecycle_over_rpc() {
    let root = TempDir::new().unwrap();
    let repository: Arc<dyn InstanceRepository> = Arc::new(FsInstanceRepository::new(
        RepositoryConfig {
            config_folder: root.path().to_path_buf(),
            executable: FAKE_BLASTER.into(),
            ..Default::default()
        },
        Span::none(),
    ));
    let registry = Registry::new();
    InstanceCollector::with_hostname(
        Arc::clone(&repository),
        tokio::runtime::Handle::current(),
        Span::none(),
        "lab1",
    )
    .unwrap()
    .register(&registry)
    .unwrap();

    let server = RpcServer::new(
        RpcServerConfig {
            addr: "127.0.0.1:0".to_string(),
        },
        repository,
        Arc::new(SystemHostProbe::new(Span::none())),
        registry,
        Span::none(),
    );
    let (addr, handle) = server.start().await.unwrap();
    let client = HttpClientBuilder::default()
        .build(format!("http://{addr}"))
        .unwrap();

    // Create
    let created = call(
        &client,
        "instance.create.v1",
        json!({"instance_name": "bng1", "config": {"interfaces": {}}}),
    )
    .await
    .unwrap();
    assert_eq!(created, json!({"instance_name": "bng1", "created": true}));

    let err = call(
        &client,
        "instance.create.v1",
        json!({"instance_name": "bng2", "config": ""}),
    )
    .await
    .unwrap_err();
    assert_eq!(error_code(err), 4000);

    // Start
    let started = call(
        &client,
        "instance.start.v1",
        json!({"instance_name": "bng1", "running_config": {"session_count": 5}}),
    )
    .await
    .unwrap();
    assert_eq!(started["status"], "started");

    let status = call(&client, "instance.status.v1", json!({"instance_name": "bng1"}))
        .await
        .unwrap();
    assert_eq!(status["status"], "started");
    assert_eq!(status["running_config"]["session_count"], 5);

    // Command, retried until the control socket is bound
    let mut echoed = None;
    for _ in 0..100 {
        match call(
            &client,
            "instance.command.v1",
            json!({"instance_name": "bng1", "command": "session-info", "arguments": {"session-id": 1}}),
        )
        .await
        {
            Ok(value) => {
                echoed = Some(value);
                break;
            }
            Err(_) => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
    let echoed = echoed.expect("instance never answered");
    assert_eq!(echoed["command"], "session-info");
    assert_eq!(echoed["arguments"]["session-id"], 1);

    // Scrape and version
    let scrape: Value = client
        .request("metrics.scrape.v1", rpc_params![])
        .await
        .unwrap();
    let text = scrape["text"].as_str().unwrap();
    assert!(text.contains(r#"instances_running{hostname="lab1"} 1"#), "{text}");

    let version: Value = client
        .request("controller.version.v1", rpc_params![])
        .await
        .unwrap();
    assert_eq!(version["blaster_version"], "0.0.0-fake");

    let interfaces: Value = client
        .request("controller.interfaces.v1", rpc_params![])
        .await
        .unwrap();
    let loopback = interfaces["interfaces"]
        .as_array()
        .unwrap()
        .iter()
        .find(|iface| iface["name"] == "lo")
        .expect("loopback interface");
    assert!(loopback["flags"].as_array().unwrap().contains(&json!("loopback")));

    // Stop and delete
    let err = call(&client, "instance.delete.v1", json!({"instance_name": "bng1"}))
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4009);

    let stopped = call(&client, "instance.stop.v1", json!({"instance_name": "bng1"}))
        .await
        .unwrap();
    assert_eq!(stopped["accepted"], true);

    let mut status = Value::Null;
    for _ in 0..100 {
        status = call(&client, "instance.status.v1", json!({"instance_name": "bng1"}))
            .await
            .unwrap();
        if status["status"] == "stopped" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(status["status"], "stopped");

    call(&client, "instance.delete.v1", json!({"instance_name": "bng1"}))
        .await
        .unwrap();
    let listed: Value = client
        .request("instance.list.v1", rpc_params![])
        .await
        .unwrap();
    assert_eq!(listed, json!({"instances": []}));

    let err = call(&client, "instance.command.v1", json!({"instance_name": "bng1", "command": "x"}))
        .await
        .unwrap_err();
    assert_eq!(error_code(err), 4004);

    handle.stop().unwrap();
}
