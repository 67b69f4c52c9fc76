//! End-to-end scenarios: events in, records out, history durable.

use binrow::common::{
    DefaultTopicSelector, FileSchemaHistory, MemorySchemaHistory, MemorySink, SchemaHistory,
};
use binrow::mysql::{
    BinlogEvent, CdcConfig, ColumnBitmap, ColumnValue, DeleteRowsEvent, EventProcessor,
    QueryEvent, RotateEvent, TableMapEvent, WriteRowsEvent,
};
use serde_json::json;
use std::sync::Arc;

fn query(sql: &str) -> BinlogEvent {
    BinlogEvent::Query(QueryEvent {
        database: "d".to_string(),
        sql: sql.to_string(),
    })
}

fn table_map(number: u64, table: &str) -> BinlogEvent {
    BinlogEvent::TableMap(TableMapEvent {
        table_number: number,
        database: "d".to_string(),
        table: table.to_string(),
        column_metadata: Vec::new(),
    })
}

fn write_rows(number: u64, columns: usize, rows: Vec<Vec<ColumnValue>>) -> BinlogEvent {
    BinlogEvent::WriteRows(WriteRowsEvent {
        table_number: number,
        included_columns: ColumnBitmap::all(columns),
        rows,
    })
}

fn delete_rows(number: u64, columns: usize, rows: Vec<Vec<ColumnValue>>) -> BinlogEvent {
    BinlogEvent::DeleteRows(DeleteRowsEvent {
        table_number: number,
        included_columns: ColumnBitmap::all(columns),
        rows,
    })
}

fn new_processor(history: Arc<dyn SchemaHistory>) -> EventProcessor<MemorySink> {
    EventProcessor::new(
        CdcConfig::new("srv"),
        history,
        Arc::new(DefaultTopicSelector::new()),
        MemorySink::new(),
    )
    .unwrap()
}

async fn seed_t1(p: &mut EventProcessor<MemorySink>) {
    p.handle_event(query(
        "CREATE TABLE t1 (id INT PRIMARY KEY, name VARCHAR(32))",
    ))
    .await
    .unwrap();
    p.set_offset(&json!({"file": "f", "pos": 4, "row": 0})).unwrap();
    p.handle_event(table_map(10, "t1")).await.unwrap();
}

#[tokio::test]
async fn simple_insert_emits_ordered_keyed_records() {
    let mut p = new_processor(Arc::new(MemorySchemaHistory::new()));
    seed_t1(&mut p).await;
    p.set_binlog_position(200);
    p.handle_event(write_rows(
        10,
        2,
        vec![
            vec![ColumnValue::Int(1), ColumnValue::String("a".to_string())],
            vec![ColumnValue::Int(2), ColumnValue::String("b".to_string())],
        ],
    ))
    .await
    .unwrap();

    let records = p.into_sink().take_records();
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].partition, json!({"server": "srv"}));
    assert_eq!(records[0].offset, json!({"file": "f", "pos": 200, "row": 0}));
    assert_eq!(records[1].offset, json!({"file": "f", "pos": 200, "row": 1}));
    assert_eq!(records[0].topic, "srv.d.t1");

    assert_eq!(records[0].key, Some(json!({"id": 1})));
    assert_eq!(records[0].value, Some(json!({"id": 1, "name": "a"})));
    assert_eq!(records[1].key, Some(json!({"id": 2})));
    assert_eq!(records[1].value, Some(json!({"id": 2, "name": "b"})));

    // Row indexes strictly increase within one event position.
    let rows: Vec<u64> = records
        .iter()
        .map(|r| r.offset["row"].as_u64().unwrap())
        .collect();
    assert_eq!(rows, vec![0, 1]);
}

#[tokio::test]
async fn delete_emits_tombstone() {
    let mut p = new_processor(Arc::new(MemorySchemaHistory::new()));
    seed_t1(&mut p).await;
    p.handle_event(write_rows(
        10,
        2,
        vec![vec![ColumnValue::Int(1), ColumnValue::String("a".to_string())]],
    ))
    .await
    .unwrap();
    p.handle_event(delete_rows(
        10,
        2,
        vec![vec![ColumnValue::Int(1), ColumnValue::String("a".to_string())]],
    ))
    .await
    .unwrap();

    let records = p.into_sink().take_records();
    assert_eq!(records.len(), 2);
    let tombstone = &records[1];
    assert_eq!(tombstone.key, Some(json!({"id": 1})));
    assert!(tombstone.value.is_none());
    assert!(tombstone.value_schema.is_none());
    assert!(tombstone.key_schema.is_some());
    assert!(tombstone.is_tombstone());
}

#[tokio::test]
async fn rotate_evicts_converters_and_rows_are_dropped() {
    let mut p = new_processor(Arc::new(MemorySchemaHistory::new()));
    seed_t1(&mut p).await;
    p.handle_event(BinlogEvent::Rotate(RotateEvent {
        next_binlog_filename: "g".to_string(),
        position: Some(4),
    }))
    .await
    .unwrap();

    // Same table number, but no TABLE_MAP has been seen in file g.
    p.handle_event(write_rows(10, 2, vec![vec![ColumnValue::Int(9)]]))
        .await
        .unwrap();

    assert_eq!(p.source().binlog_filename(), Some("g"));
    assert_eq!(p.source().binlog_position(), 4);
    assert_eq!(p.stats().records_emitted, 0);
    assert_eq!(p.stats().rows_skipped, 1);
    assert!(p.into_sink().records().is_empty());
}

#[tokio::test]
async fn schema_change_mid_stream_is_applied_and_recorded() {
    let history = Arc::new(MemorySchemaHistory::new());
    let mut p = new_processor(history.clone());
    seed_t1(&mut p).await;

    p.handle_event(query("ALTER TABLE t1 ADD COLUMN age INT"))
        .await
        .unwrap();
    // A schema change makes the server hand out a fresh table number.
    p.handle_event(table_map(11, "t1")).await.unwrap();
    p.handle_event(write_rows(
        11,
        3,
        vec![vec![
            ColumnValue::Int(3),
            ColumnValue::String("c".to_string()),
            ColumnValue::Int(30),
        ]],
    ))
    .await
    .unwrap();

    let records = p.into_sink().take_records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].value,
        Some(json!({"id": 3, "name": "c", "age": 30}))
    );

    let ddl: Vec<String> = history
        .records()
        .await
        .into_iter()
        .map(|r| r.ddl)
        .collect();
    assert!(ddl.iter().any(|s| s.contains("ALTER TABLE t1")));
}

#[tokio::test]
async fn unknown_table_rows_are_dropped_quietly() {
    let mut p = new_processor(Arc::new(MemorySchemaHistory::new()));

    // No CREATE was ever seen for tx.
    p.handle_event(table_map(20, "tx")).await.unwrap();
    p.handle_event(write_rows(20, 1, vec![vec![ColumnValue::Int(1)]]))
        .await
        .unwrap();
    p.handle_event(write_rows(20, 1, vec![vec![ColumnValue::Int(2)]]))
        .await
        .unwrap();

    assert_eq!(p.stats().records_emitted, 0);
    assert_eq!(p.stats().rows_skipped, 2);
    assert!(p.into_sink().records().is_empty());
}

#[tokio::test]
async fn restart_replay_reconstructs_catalog_and_emits_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.jsonl");

    let (first_run, first_catalog) = {
        let history = Arc::new(FileSchemaHistory::new(&path));
        let mut p = new_processor(history);
        seed_t1(&mut p).await;
        p.set_binlog_position(200);
        p.handle_event(write_rows(
            10,
            2,
            vec![vec![ColumnValue::Int(1), ColumnValue::String("a".to_string())]],
        ))
        .await
        .unwrap();
        let catalog = p.catalog_snapshot();
        (p.into_sink().take_records(), catalog)
    };

    // Restart: replay history, feed the same TABLE_MAP and rows.
    let history = Arc::new(FileSchemaHistory::new(&path));
    let mut p = new_processor(history);
    p.load_history().await.unwrap();

    // Replay reconstructs the catalog exactly as it stood at the last
    // durable record.
    let catalog = p.catalog_snapshot();
    assert_eq!(catalog, first_catalog);
    assert!(catalog
        .get(&binrow::TableId::with_schema("d", "t1"))
        .is_some());

    p.set_offset(&json!({"file": "f", "pos": 4, "row": 0})).unwrap();
    p.handle_event(table_map(10, "t1")).await.unwrap();
    p.set_binlog_position(200);
    p.handle_event(write_rows(
        10,
        2,
        vec![vec![ColumnValue::Int(1), ColumnValue::String("a".to_string())]],
    ))
    .await
    .unwrap();

    let second_run = p.into_sink().take_records();
    assert_eq!(first_run, second_run);
}

#[tokio::test]
async fn offset_round_trip_through_processor() {
    let mut p = new_processor(Arc::new(MemorySchemaHistory::new()));
    let offset = json!({"file": "mysql-bin.000009", "pos": 777, "row": 2});
    p.set_offset(&offset).unwrap();
    assert_eq!(p.source().offset(), offset);
}

#[tokio::test]
async fn corrupt_offset_is_fatal_at_startup() {
    let mut p = new_processor(Arc::new(MemorySchemaHistory::new()));
    let err = p.set_offset(&json!({"pos": 777})).unwrap_err();
    assert!(matches!(err, binrow::CdcError::Offset(_)));
}
