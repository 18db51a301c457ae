use mockito::{Matcher, Server};
use serde_json::json;
use tokio_test::{assert_err, assert_ok};
use vault_health_narrator::{
    run_from_env, sanitize, partition, ChunkPosition, Config, HealthPipeline,
    MockEnvironment, Narration, RawMetrics, ReporterError,
};

fn config_for(vault: &Server, llm: &Server) -> Config {
    Config {
        vault_addr: vault.url(),
        vault_token: "s.integration".to_string(),
        llm_url: format!("{}/v1/completions", llm.url()),
        llm_token: "llm-integration".to_string(),
        llm_model: "qwen2.5-32b-instruct".to_string(),
        llm_max_tokens: 20000,
        llm_trace_name: "team_bot".to_string(),
        chunk_threshold_bytes: 5000,
    }
}

/// `count` lines, each padded to `width` bytes, named `<prefix>_<i>`.
fn metric_lines(prefix: &str, count: usize, width: usize) -> Vec<String> {
    (0..count)
        .map(|i| format!("{:<width$}", format!("{}_{} 1", prefix, i), width = width))
        .collect()
}

async fn serve_metrics(server: &mut Server, body: &str) -> mockito::Mock {
    server
        .mock("GET", "/v1/sys/metrics")
        .match_query(Matcher::UrlEncoded("format".into(), "prometheus".into()))
        .match_header("x-vault-token", "s.integration")
        .with_status(200)
        .with_body(body)
        .create_async()
        .await
}

#[tokio::test]
async fn test_small_payload_single_unlabelled_block() {
    let mut vault = Server::new_async().await;
    let mut llm = Server::new_async().await;

    let body = metric_lines("vault_core", 80, 49).join("\n");
    assert!(body.len() <= 5000);
    let metrics = serve_metrics(&mut vault, &body).await;
    let narrate = llm
        .mock("POST", "/v1/completions")
        .match_header("authorization", "Bearer llm-integration")
        .with_status(200)
        .with_body(json!({"choices": [{"text": "Vault is unsealed and healthy."}]}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let cfg = config_for(&vault, &llm);
    let report = assert_ok!(HealthPipeline::new(&client, &cfg).run().await);

    assert_eq!(report.sections.len(), 1);
    assert_eq!(report.sections[0].position, ChunkPosition::Whole);
    assert_eq!(report.render(), b"LLM Analysis Result:\nVault is unsealed and healthy.\n".to_vec());
    assert!(!report.summary().was_split());
    metrics.assert_async().await;
    narrate.assert_async().await;
}

#[tokio::test]
async fn test_large_payload_two_labelled_blocks_in_order() {
    let mut vault = Server::new_async().await;
    let mut llm = Server::new_async().await;

    let mut lines = metric_lines("vault_first", 50, 60);
    lines.extend(metric_lines("vault_second", 50, 60));
    let body = lines.join("\n");
    assert!(body.len() > 5000);
    serve_metrics(&mut vault, &body).await;

    let first = llm
        .mock("POST", "/v1/completions")
        .match_body(Matcher::Regex("vault_first_49 ".to_string()))
        .with_body(json!({"choices": [{"text": "first summary"}]}).to_string())
        .expect(1)
        .create_async()
        .await;
    let second = llm
        .mock("POST", "/v1/completions")
        .match_body(Matcher::Regex("vault_second_0 ".to_string()))
        .with_body(json!({"result": "second summary"}).to_string())
        .expect(1)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let cfg = config_for(&vault, &llm);
    let report = assert_ok!(HealthPipeline::new(&client, &cfg).run().await);

    assert_eq!(report.sections.len(), 2);
    assert_eq!(report.sections[0].position, ChunkPosition::FirstHalf);
    assert_eq!(report.sections[0].narration, Narration::StructuredChoice("first summary".to_string()));
    assert_eq!(report.sections[1].position, ChunkPosition::SecondHalf);
    assert_eq!(report.sections[1].narration, Narration::StructuredResult("second summary".to_string()));
    assert_eq!(
        String::from_utf8(report.render()).unwrap(),
        "LLM Analysis Result (First Half):\nfirst summary\n\nLLM Analysis Result (Second Half):\nsecond summary\n"
    );
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_first_chunk_failure_skips_second() {
    let mut vault = Server::new_async().await;
    let mut llm = Server::new_async().await;

    let mut lines = metric_lines("vault_first", 50, 60);
    lines.extend(metric_lines("vault_second", 50, 60));
    serve_metrics(&mut vault, &lines.join("\n")).await;

    let first = llm
        .mock("POST", "/v1/completions")
        .match_body(Matcher::Regex("vault_first_0 ".to_string()))
        .with_status(500)
        .with_body("model overloaded")
        .expect(1)
        .create_async()
        .await;
    let second = llm
        .mock("POST", "/v1/completions")
        .match_body(Matcher::Regex("vault_second_0 ".to_string()))
        .expect(0)
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let cfg = config_for(&vault, &llm);
    let err = assert_err!(HealthPipeline::new(&client, &cfg).run().await);

    assert!(err.to_string().contains("first half"));
    match err.downcast_ref::<ReporterError>() {
        Some(ReporterError::Response { status, body }) => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "model overloaded");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_unparsable_llm_response_is_returned_verbatim() {
    let mut vault = Server::new_async().await;
    let mut llm = Server::new_async().await;

    serve_metrics(&mut vault, "vault_core_unsealed 1\nvault_core_active 1\n").await;
    llm.mock("POST", "/v1/completions")
        .with_body("Everything nominal. <no json here>")
        .create_async()
        .await;

    let client = reqwest::Client::new();
    let cfg = config_for(&vault, &llm);
    let report = assert_ok!(HealthPipeline::new(&client, &cfg).run().await);

    assert_eq!(
        report.sections[0].narration,
        Narration::Raw(b"Everything nominal. <no json here>".to_vec())
    );
    assert_eq!(report.summary().raw_fallback_count, 1);
}

#[tokio::test]
async fn test_missing_llm_token_fails_before_any_request() {
    let mut vault = Server::new_async().await;
    let mut llm = Server::new_async().await;
    let fetched = vault.mock("GET", Matcher::Any).expect(0).create_async().await;
    let narrated = llm.mock("POST", Matcher::Any).expect(0).create_async().await;

    let env = MockEnvironment::new()
        .with_var("VAULT_ADDR", vault.url())
        .with_var("VAULT_TOKEN", "s.integration")
        .with_var("LLM_URL", format!("{}/v1/completions", llm.url()));

    let client = reqwest::Client::new();
    let err = assert_err!(run_from_env(&env, &client).await);

    assert!(matches!(
        err.downcast_ref::<ReporterError>(),
        Some(ReporterError::Config("LLM_TOKEN"))
    ));
    assert!(format!("{:#}", err).contains("LLM_TOKEN environment variable not set"));
    fetched.assert_async().await;
    narrated.assert_async().await;
}

#[tokio::test]
async fn test_run_from_env_end_to_end() {
    let mut vault = Server::new_async().await;
    let mut llm = Server::new_async().await;
    serve_metrics(&mut vault, "vault_core_unsealed 1\nvault_core_leadership_lost NaN").await;
    let narrate = llm
        .mock("POST", "/v1/completions")
        .match_header("authorization", "Bearer llm-integration")
        .match_body(Matcher::PartialJson(json!({"model": "llama-3-70b", "max_tokens": 512})))
        .with_body(json!({"result": "Unsealed, no anomalies."}).to_string())
        .expect(1)
        .create_async()
        .await;

    let env = MockEnvironment::new()
        .with_var("VAULT_ADDR", vault.url())
        .with_var("VAULT_TOKEN", "s.integration")
        .with_var("LLM_URL", format!("{}/v1/completions", llm.url()))
        .with_var("LLM_TOKEN", "llm-integration")
        .with_var("LLM_MODEL", "llama-3-70b")
        .with_var("LLM_MAX_TOKENS", "512");

    let client = reqwest::Client::new();
    let report = assert_ok!(run_from_env(&env, &client).await);

    assert_eq!(report.dropped_lines, 1);
    assert_eq!(report.render(), b"LLM Analysis Result:\nUnsealed, no anomalies.\n".to_vec());
    narrate.assert_async().await;
}

#[test]
fn test_sanitize_then_partition_keeps_every_defined_line() {
    let mut lines = Vec::new();
    for i in 0..300 {
        if i % 10 == 3 {
            lines.push(format!("vault_route_p99{{mount=\"m{}\"}} NaN", i));
        } else {
            lines.push(format!("vault_route_count{{mount=\"m{}\"}} {}", i, i));
        }
    }
    let raw = RawMetrics(lines.join("\n").into_bytes());

    let sanitized = sanitize(&raw);
    assert_eq!(sanitized.dropped_lines, 30);

    let chunks = partition(&sanitized, 5000);
    assert_eq!(chunks.len(), 2);
    assert_eq!(chunks[0].line_count(), 135);
    assert_eq!(chunks[1].line_count(), 135);

    let rejoined = String::from_utf8([chunks[0].bytes.as_slice(), chunks[1].bytes.as_slice()].join(&b'\n')).unwrap();
    assert_eq!(rejoined.as_bytes(), sanitized.as_bytes());
    assert!(!rejoined.contains("NaN"));
}
