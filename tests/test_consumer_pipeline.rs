//! End-to-end tests for the consumer pipeline
//!
//! Drives the real file transport against temp files and verifies the full
//! normalize → update → evaluate → redraw flow: ordering, window bounds,
//! alert firing, malformed-line handling, and clean shutdown.

use buzzflow::config::{AggregationMode, WireFormat};
use buzzflow::consumer_core::{
    run_ingestion, Aggregator, AlertEvaluator, ConsumerPipeline, FileTailTransport, JsonlSink,
    RecordNormalizer, Snapshot, Transport,
};
use buzzflow::producer_core::{RecordGenerator, StreamWriter};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::Notify;

fn rolling_pipeline(capacity: usize, multiplier: f64, min_samples: usize) -> ConsumerPipeline {
    ConsumerPipeline::new(
        RecordNormalizer::new(AggregationMode::RollingWindow, WireFormat::Json),
        Aggregator::rolling(capacity).unwrap(),
        AlertEvaluator::new(multiplier, min_samples),
    )
}

fn category_pipeline(k: usize) -> ConsumerPipeline {
    ConsumerPipeline::new(
        RecordNormalizer::new(AggregationMode::TopKCategory, WireFormat::Json),
        Aggregator::top_k(k).unwrap(),
        AlertEvaluator::new(2.0, 5),
    )
}

async fn write_lines(path: &Path, lines: &[&str]) {
    let mut file = tokio::fs::File::create(path).await.unwrap();
    for line in lines {
        file.write_all(line.as_bytes()).await.unwrap();
        file.write_all(b"\n").await.unwrap();
    }
    file.flush().await.unwrap();
}

async fn read_n_lines(transport: &mut FileTailTransport, n: usize) -> Vec<String> {
    let mut lines = Vec::with_capacity(n);
    for _ in 0..n {
        let line = tokio::time::timeout(Duration::from_secs(2), transport.next_line())
            .await
            .expect("timed out waiting for line")
            .unwrap()
            .unwrap();
        lines.push(line);
    }
    lines
}

#[tokio::test]
async fn test_category_stream_counts_through_transport() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("buzz_live.jsonl");

    write_lines(
        &path,
        &[
            r#"{"category":"Eve","message":"hi"}"#,
            r#"{"category":"Eve","message":"again"}"#,
            r#"{"category":"Alice","message":"hello"}"#,
        ],
    )
    .await;

    let mut transport = FileTailTransport::from_start(path, Duration::from_millis(10));
    transport.open().await.unwrap();

    let mut pipeline = category_pipeline(2);
    let mut last = None;
    for line in read_n_lines(&mut transport, 3).await {
        last = pipeline.process_line(&line);
    }

    let (snapshot, alert) = last.unwrap();
    assert!(!alert.triggered);
    match snapshot {
        Snapshot::TopK {
            entries,
            total_records,
        } => {
            assert_eq!(total_records, 3);
            assert_eq!(entries[0].label, "Eve");
            assert_eq!(entries[0].count, 2);
            assert_eq!(entries[1].label, "Alice");
        }
        Snapshot::Rolling { .. } => panic!("expected top-k snapshot"),
    }
}

#[tokio::test]
async fn test_rolling_alert_fires_through_transport() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("readings.jsonl");

    write_lines(
        &path,
        &[
            r#"{"timestamp":"t1","value":10.0}"#,
            r#"{"timestamp":"t2","value":10.0}"#,
            r#"{"timestamp":"t3","value":10.0}"#,
            r#"{"timestamp":"t4","value":10.0}"#,
            r#"{"timestamp":"t5","value":1000.0}"#,
        ],
    )
    .await;

    let mut transport = FileTailTransport::from_start(path, Duration::from_millis(10));
    transport.open().await.unwrap();

    let mut pipeline = rolling_pipeline(8, 2.0, 4);
    let mut results = Vec::new();
    for line in read_n_lines(&mut transport, 5).await {
        results.push(pipeline.process_line(&line).unwrap());
    }

    // Steady readings never alert.
    for (_, alert) in &results[..4] {
        assert!(!alert.triggered);
    }

    let (snapshot, alert) = &results[4];
    assert!(alert.triggered);
    assert_eq!(alert.reason.as_deref(), Some("deviation"));
    assert_eq!(alert.value, Some(1000.0));
    match snapshot {
        Snapshot::Rolling { values, .. } => {
            assert_eq!(values, &vec![10.0, 10.0, 10.0, 10.0, 1000.0]);
        }
        Snapshot::TopK { .. } => panic!("expected rolling snapshot"),
    }
}

#[tokio::test]
async fn test_malformed_lines_skipped_without_state_change() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("readings.jsonl");

    write_lines(
        &path,
        &[
            r#"{"timestamp":"t1","value":10.0}"#,
            "not json at all",
            r#"{"timestamp":"t2"}"#,
            r#"{"timestamp":"t3","value":20.0}"#,
        ],
    )
    .await;

    let mut transport = FileTailTransport::from_start(path, Duration::from_millis(10));
    transport.open().await.unwrap();

    let mut pipeline = rolling_pipeline(8, 2.0, 4);
    let mut snapshots = Vec::new();
    for line in read_n_lines(&mut transport, 4).await {
        if let Some((snapshot, _)) = pipeline.process_line(&line) {
            snapshots.push(snapshot);
        }
    }

    // Two lines were dropped before reaching the aggregator.
    assert_eq!(snapshots.len(), 2);
    match snapshots.last().unwrap() {
        Snapshot::Rolling { values, .. } => assert_eq!(values, &vec![10.0, 20.0]),
        Snapshot::TopK { .. } => panic!("expected rolling snapshot"),
    }
}

#[tokio::test]
async fn test_window_stays_bounded_over_generated_stream() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("generated.jsonl");

    // Produce with the real generator and writer.
    let mut generator =
        RecordGenerator::with_seed(AggregationMode::RollingWindow, WireFormat::Json, 42);
    let mut writer = StreamWriter::new(&path, 10, 2).unwrap();
    for _ in 0..50 {
        writer.write_line(&generator.next_line().unwrap()).unwrap();
    }

    let mut transport = FileTailTransport::from_start(path, Duration::from_millis(10));
    transport.open().await.unwrap();

    let capacity = 5;
    let mut pipeline = rolling_pipeline(capacity, 3.0, 3);
    for line in read_n_lines(&mut transport, 50).await {
        let (snapshot, _) = pipeline.process_line(&line).unwrap();
        match snapshot {
            Snapshot::Rolling { values, .. } => assert!(values.len() <= capacity),
            Snapshot::TopK { .. } => panic!("expected rolling snapshot"),
        }
    }
}

#[tokio::test]
async fn test_live_appends_reach_the_consumer() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("buzz_live.jsonl");

    write_lines(&path, &[r#"{"category":"Old","message":"skip me"}"#]).await;

    // Tail from the end: the pre-existing line must not be consumed.
    let mut transport = FileTailTransport::new(path.clone(), Duration::from_millis(10));
    transport.open().await.unwrap();

    let writer_path = path.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let mut file = tokio::fs::OpenOptions::new()
            .append(true)
            .open(&writer_path)
            .await
            .unwrap();
        file.write_all(b"{\"category\":\"Fresh\",\"message\":\"new\"}\n")
            .await
            .unwrap();
        file.flush().await.unwrap();
    });

    let mut pipeline = category_pipeline(3);
    let line = tokio::time::timeout(Duration::from_secs(2), transport.next_line())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let (snapshot, _) = pipeline.process_line(&line).unwrap();

    match snapshot {
        Snapshot::TopK {
            entries,
            total_records,
        } => {
            assert_eq!(total_records, 1);
            assert_eq!(entries[0].label, "Fresh");
        }
        Snapshot::Rolling { .. } => panic!("expected top-k snapshot"),
    }
}

#[tokio::test]
async fn test_run_ingestion_with_jsonl_sink_and_shutdown() {
    let temp_dir = tempfile::tempdir().unwrap();
    let data_path = temp_dir.path().join("readings.jsonl");
    let snapshot_path = temp_dir.path().join("snapshots.jsonl");

    write_lines(
        &data_path,
        &[
            r#"{"timestamp":"t1","value":10.0}"#,
            r#"{"timestamp":"t2","value":11.0}"#,
            r#"{"timestamp":"t3","value":9.0}"#,
        ],
    )
    .await;

    let mut transport = FileTailTransport::from_start(data_path, Duration::from_millis(10));
    transport.open().await.unwrap();

    let pipeline = rolling_pipeline(8, 2.0, 4);
    let shutdown = Arc::new(Notify::new());

    let sink_path = snapshot_path.clone();
    let ingest_shutdown = shutdown.clone();
    let ingest = tokio::spawn(async move {
        let mut sink = JsonlSink::new(&sink_path).unwrap();
        run_ingestion(transport, pipeline, &mut sink, ingest_shutdown).await;
    });

    // Let the loop drain the file, then stop it.
    tokio::time::sleep(Duration::from_millis(300)).await;
    shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(2), ingest)
        .await
        .expect("ingestion did not stop on shutdown")
        .unwrap();

    let contents = std::fs::read_to_string(&snapshot_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 3);

    for line in lines {
        let parsed: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(parsed["snapshot"]["kind"], "rolling");
        assert_eq!(parsed["alert"]["triggered"], false);
    }
}
