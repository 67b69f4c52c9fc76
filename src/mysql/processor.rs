//! Event dispatch and row translation
//!
//! The processor is the single writer over the catalog, the converter
//! cache, the DDL parser and the source position. A driver task feeds it
//! decoded events in log order; for each event it updates internal state
//! and emits zero or more records to the sink. Records leave in exactly
//! the order their events arrived, row by row within an event.

use crate::common::filter::TableFilter;
use crate::common::history::SchemaHistory;
use crate::common::record::{Sink, SourceRecord};
use crate::common::topic::TopicSelector;
use crate::common::Result;
use crate::mysql::config::CdcConfig;
use crate::mysql::ddl::MySqlDdlParser;
use crate::mysql::event::{
    BinlogEvent, DeleteRowsEvent, QueryEvent, RotateEvent, TableMapEvent, UpdateRowsEvent,
    WriteRowsEvent,
};
use crate::mysql::source_info::SourceInfo;
use crate::relational::catalog::Tables;
use crate::relational::schema::{FieldType, Schema, TableSchema, TableSchemaBuilder};
use crate::relational::table::TableId;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Binding of a numeric table id to everything needed to translate its
/// rows. Converters all share the same algorithm, parameterized by this
/// data; they live only until the next log rotation.
#[derive(Debug, Clone)]
struct Converter {
    table_id: TableId,
    topic: String,
    partition_hint: Option<i32>,
    table_schema: TableSchema,
}

/// Counters over a processor's lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub events_received: u64,
    pub records_emitted: u64,
    pub rows_skipped: u64,
    pub ddl_statements: u64,
    pub ddl_parse_failures: u64,
}

/// Translates decoded binlog events into keyed change records.
pub struct EventProcessor<S: Sink> {
    config: CdcConfig,
    tables: Tables,
    ddl_parser: MySqlDdlParser,
    schema_builder: TableSchemaBuilder,
    table_schemas: HashMap<TableId, TableSchema>,
    converters_by_table_number: HashMap<u64, Converter>,
    table_numbers_by_name: HashMap<String, u64>,
    unknown_table_numbers: HashSet<u64>,
    unknown_table_ids: HashSet<TableId>,
    source: SourceInfo,
    history: Arc<dyn SchemaHistory>,
    topic_selector: Arc<dyn TopicSelector>,
    filter: TableFilter,
    sink: S,
    stats: ProcessorStats,
}

impl<S: Sink> EventProcessor<S> {
    pub fn new(
        config: CdcConfig,
        history: Arc<dyn SchemaHistory>,
        topic_selector: Arc<dyn TopicSelector>,
        sink: S,
    ) -> Result<Self> {
        config.validate()?;
        let filter = TableFilter::new(&config.table_include, &config.table_exclude)
            .map_err(|e| crate::common::CdcError::config(format!("bad table pattern: {}", e)))?;
        let source = SourceInfo::new(config.server_name.clone());
        let ddl_parser = MySqlDdlParser::new(config.include_views);
        Ok(Self {
            config,
            tables: Tables::new(),
            ddl_parser,
            schema_builder: TableSchemaBuilder::new(),
            table_schemas: HashMap::new(),
            converters_by_table_number: HashMap::new(),
            table_numbers_by_name: HashMap::new(),
            unknown_table_numbers: HashSet::new(),
            unknown_table_ids: HashSet::new(),
            source,
            history,
            topic_selector,
            filter,
            sink,
            stats: ProcessorStats::default(),
        })
    }

    /// Rebuild the catalog by replaying the schema history, then derive a
    /// schema for every recovered table. Call once before the first event.
    pub async fn load_history(&mut self) -> Result<()> {
        let history = Arc::clone(&self.history);
        let parser = &mut self.ddl_parser;
        let tables = &mut self.tables;
        history
            .replay(&mut |record| {
                parser.set_current_schema(record.database_name.clone());
                if let Err(e) = parser.parse(&record.ddl, tables) {
                    // The statement failed when first seen too; the replayed
                    // catalog still matches the live one.
                    debug!(error = %e, ddl = %record.ddl, "replayed statement did not parse");
                }
            })
            .await?;
        self.tables.drain_changes();

        self.table_schemas.clear();
        for id in self.tables.ids() {
            if let Some(table) = self.tables.get(&id) {
                self.table_schemas
                    .insert(id.clone(), self.schema_builder.create(table));
            }
        }
        debug!(tables = self.tables.len(), "catalog recovered from history");
        Ok(())
    }

    /// Restore a previously persisted offset. Fatal if it cannot be
    /// decoded.
    pub fn set_offset(&mut self, offset: &Value) -> Result<()> {
        self.source.set_offset(offset)
    }

    /// Record the byte position of the event about to be dispatched, as
    /// reported by the binlog reader.
    pub fn set_binlog_position(&mut self, position: u64) {
        self.source.set_binlog_position(position);
    }

    pub fn source(&self) -> &SourceInfo {
        &self.source
    }

    pub fn stats(&self) -> ProcessorStats {
        self.stats.clone()
    }

    /// Read-only snapshot of the current catalog.
    pub fn catalog_snapshot(&self) -> Tables {
        self.tables.snapshot()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Dispatch one event. The event is fully processed before this
    /// returns; a partially-emitted event is never abandoned.
    pub async fn handle_event(&mut self, event: BinlogEvent) -> Result<()> {
        self.stats.events_received += 1;
        trace!(?event, "dispatching event");
        match event {
            BinlogEvent::Rotate(rotate) => {
                self.handle_rotate(rotate);
                Ok(())
            }
            BinlogEvent::Query(query) => self.handle_query(query).await,
            BinlogEvent::TableMap(map) => {
                self.handle_table_map(map);
                Ok(())
            }
            BinlogEvent::WriteRows(write) => self.handle_insert(write).await,
            BinlogEvent::UpdateRows(update) => self.handle_update(update).await,
            BinlogEvent::DeleteRows(delete) => self.handle_delete(delete).await,
        }
    }

    /// The server rotated to a new binlog file. Numeric table ids are only
    /// unique within one file, so every converter binding is discarded;
    /// the catalog and schema cache survive.
    fn handle_rotate(&mut self, rotate: RotateEvent) {
        debug!(file = %rotate.next_binlog_filename, "rotating logs");
        self.source
            .set_binlog_filename(rotate.next_binlog_filename);
        self.source.set_binlog_position(rotate.position.unwrap_or(4));
        self.source.set_row_in_event(0);
        self.converters_by_table_number.clear();
        self.table_numbers_by_name.clear();
        self.unknown_table_numbers.clear();
    }

    async fn handle_query(&mut self, query: QueryEvent) -> Result<()> {
        if self.ddl_parser.is_ignorable(&query.sql) {
            return Ok(());
        }
        debug!(database = %query.database, sql = %query.sql, "received schema command");
        self.stats.ddl_statements += 1;

        self.ddl_parser.set_current_schema(query.database.clone());
        if self.ddl_parser.parse(&query.sql, &mut self.tables).is_err() {
            // Already logged by the parser; the catalog is untouched for
            // the failing statement.
            self.stats.ddl_parse_failures += 1;
        }

        // History stays faithful to the upstream log whether or not the
        // statement parsed, and must be durable before anything is
        // emitted downstream.
        self.history
            .record(
                &self.source.partition(),
                &self.source.offset(),
                &query.database,
                &self.tables,
                &query.sql,
            )
            .await?;

        if self.config.include_schema_changes {
            let entry = crate::common::history::HistoryRecord {
                partition: self.source.partition(),
                offset: self.source.offset(),
                database_name: query.database.clone(),
                ddl: query.sql.clone(),
            };
            let record = SourceRecord {
                partition: self.source.partition(),
                offset: self.source.offset(),
                topic: self
                    .topic_selector
                    .schema_change_topic(self.source.server_name()),
                partition_hint: Some(0),
                key_schema: Some(Schema::new(FieldType::String, false)),
                key: Some(Value::String(query.database.clone())),
                value_schema: Some(Schema::new(FieldType::String, false)),
                value: Some(Value::String(serde_json::to_string(&entry)?)),
                before: None,
            };
            self.sink.emit(record).await?;
            self.stats.records_emitted += 1;
        }

        // Rebuild derived schemas for whatever the statement touched.
        for id in self.tables.drain_changes() {
            match self.tables.get(&id) {
                Some(table) => {
                    let schema = self.schema_builder.create(table);
                    self.table_schemas.insert(id, schema);
                }
                None => {
                    self.table_schemas.remove(&id);
                }
            }
        }
        Ok(())
    }

    /// Bind a numeric table id to a table. Every transaction carries one
    /// of these per affected table; the number changes after schema
    /// changes and across file rotations.
    fn handle_table_map(&mut self, map: TableMapEvent) {
        if self.converters_by_table_number.contains_key(&map.table_number) {
            trace!(table_number = map.table_number, "table number already bound");
            return;
        }
        let table_id = TableId::with_schema(map.database.clone(), map.table.clone());
        let Some(table_schema) = self.table_schemas.get(&table_id) else {
            // A row change in a table created before the log was enabled,
            // or before the point we started reading it.
            self.unknown_table_numbers.insert(map.table_number);
            if self.unknown_table_ids.insert(table_id.clone()) {
                warn!(
                    table = %table_id,
                    "transaction affects rows in a table with no known schema; all changes to this table will be ignored"
                );
            }
            return;
        };

        let topic = self.topic_selector.topic_for(
            self.source.server_name(),
            &map.database,
            &map.table,
        );
        debug!(table = %table_id, table_number = map.table_number, "registering converter");
        self.converters_by_table_number.insert(
            map.table_number,
            Converter {
                table_id,
                topic,
                partition_hint: None,
                table_schema: table_schema.clone(),
            },
        );

        // The server can re-assign numbers within one file after a schema
        // change; the stale binding must not shadow the new one.
        if let Some(previous) = self
            .table_numbers_by_name
            .insert(map.table.clone(), map.table_number)
        {
            if previous != map.table_number {
                self.converters_by_table_number.remove(&previous);
            }
        }
    }

    /// Look up the converter for a row event, or account for the dropped
    /// rows.
    fn converter_for(&mut self, table_number: u64, row_count: usize) -> Option<Converter> {
        let Some(converter) = self.converters_by_table_number.get(&table_number) else {
            if self.unknown_table_numbers.contains(&table_number) {
                // Already warned when the TABLE_MAP arrived.
                debug!(table_number, "dropping rows for table with no schema");
            } else {
                warn!(table_number, "no converter registered for table number; dropping rows");
            }
            self.stats.rows_skipped += row_count as u64;
            return None;
        };
        if !self.filter.is_included(&converter.table_id) {
            debug!(table = %converter.table_id, "table excluded by filter");
            self.stats.rows_skipped += row_count as u64;
            return None;
        }
        Some(converter.clone())
    }

    async fn handle_insert(&mut self, write: WriteRowsEvent) -> Result<()> {
        let Some(converter) = self.converter_for(write.table_number, write.rows.len()) else {
            return Ok(());
        };
        trace!(table = %converter.table_id, rows = write.rows.len(), "processing insert");
        for (row_index, row) in write.rows.iter().enumerate() {
            let offset = self.source.offset_for_row(row_index as u32);
            let key = converter.table_schema.key_from_row(row);
            let value = converter
                .table_schema
                .value_from_row(row, &write.included_columns);
            let record = SourceRecord {
                partition: self.source.partition(),
                offset,
                topic: converter.topic.clone(),
                partition_hint: converter.partition_hint,
                key_schema: converter.table_schema.key_schema().cloned(),
                key,
                value_schema: Some(converter.table_schema.value_schema().clone()),
                value: Some(value),
                before: None,
            };
            self.sink.emit(record).await?;
            self.stats.records_emitted += 1;
        }
        Ok(())
    }

    async fn handle_update(&mut self, update: UpdateRowsEvent) -> Result<()> {
        let Some(converter) = self.converter_for(update.table_number, update.rows.len()) else {
            return Ok(());
        };
        trace!(table = %converter.table_id, rows = update.rows.len(), "processing update");
        for (row_index, (before, after)) in update.rows.iter().enumerate() {
            let offset = self.source.offset_for_row(row_index as u32);
            // The key comes from the after-image; the emitted value is the
            // after-image as well.
            let key = converter.table_schema.key_from_row(after);
            let value = converter
                .table_schema
                .value_from_row(after, &update.included_columns);
            let before_image = self.config.include_update_before.then(|| {
                converter
                    .table_schema
                    .value_from_row(before, &update.included_columns_before)
            });
            let record = SourceRecord {
                partition: self.source.partition(),
                offset,
                topic: converter.topic.clone(),
                partition_hint: converter.partition_hint,
                key_schema: converter.table_schema.key_schema().cloned(),
                key,
                value_schema: Some(converter.table_schema.value_schema().clone()),
                value: Some(value),
                before: before_image,
            };
            self.sink.emit(record).await?;
            self.stats.records_emitted += 1;
        }
        Ok(())
    }

    async fn handle_delete(&mut self, delete: DeleteRowsEvent) -> Result<()> {
        let Some(converter) = self.converter_for(delete.table_number, delete.rows.len()) else {
            return Ok(());
        };
        trace!(table = %converter.table_id, rows = delete.rows.len(), "processing delete");
        for (row_index, row) in delete.rows.iter().enumerate() {
            let offset = self.source.offset_for_row(row_index as u32);
            let key = converter.table_schema.key_from_row(row);
            if key.is_none() {
                // Without a key there is nothing a tombstone can identify.
                self.stats.rows_skipped += 1;
                continue;
            }
            let record = SourceRecord {
                partition: self.source.partition(),
                offset,
                topic: converter.topic.clone(),
                partition_hint: converter.partition_hint,
                key_schema: converter.table_schema.key_schema().cloned(),
                key,
                value_schema: None,
                value: None,
                before: None,
            };
            self.sink.emit(record).await?;
            self.stats.records_emitted += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::history::MemorySchemaHistory;
    use crate::common::record::MemorySink;
    use crate::common::topic::DefaultTopicSelector;
    use crate::mysql::event::{ColumnBitmap, ColumnValue};
    use serde_json::json;

    fn processor() -> EventProcessor<MemorySink> {
        EventProcessor::new(
            CdcConfig::new("srv"),
            Arc::new(MemorySchemaHistory::new()),
            Arc::new(DefaultTopicSelector::new()),
            MemorySink::new(),
        )
        .unwrap()
    }

    fn create_t1(sql: &str) -> BinlogEvent {
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

    #[tokio::test]
    async fn test_insert_emits_keyed_records() {
        let mut p = processor();
        p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY, name VARCHAR(32))"))
            .await
            .unwrap();
        p.handle_event(table_map(10, "t1")).await.unwrap();
        p.set_binlog_position(200);
        p.source.set_binlog_filename("f");
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

        let sink = p.into_sink();
        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].topic, "srv.d.t1");
        assert_eq!(records[0].key, Some(json!({"id": 1})));
        assert_eq!(records[0].value, Some(json!({"id": 1, "name": "a"})));
        assert_eq!(records[0].offset["row"], 0);
        assert_eq!(records[1].offset["row"], 1);
        assert_eq!(records[1].key, Some(json!({"id": 2})));
    }

    #[tokio::test]
    async fn test_rotate_clears_converters() {
        let mut p = processor();
        p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY)"))
            .await
            .unwrap();
        p.handle_event(table_map(10, "t1")).await.unwrap();
        p.handle_event(BinlogEvent::Rotate(RotateEvent {
            next_binlog_filename: "g".to_string(),
            position: None,
        }))
        .await
        .unwrap();

        assert_eq!(p.source().binlog_filename(), Some("g"));
        assert_eq!(p.source().binlog_position(), 4);

        // No TABLE_MAP re-registration in the new file: rows are dropped.
        p.handle_event(write_rows(10, 1, vec![vec![ColumnValue::Int(1)]]))
            .await
            .unwrap();
        assert_eq!(p.stats().rows_skipped, 1);
        assert_eq!(p.stats().records_emitted, 0);
    }

    #[tokio::test]
    async fn test_unknown_table_rows_dropped() {
        let mut p = processor();
        p.handle_event(table_map(20, "tx")).await.unwrap();
        p.handle_event(write_rows(20, 1, vec![vec![ColumnValue::Int(1)]]))
            .await
            .unwrap();
        p.handle_event(write_rows(20, 1, vec![vec![ColumnValue::Int(2)]]))
            .await
            .unwrap();

        assert_eq!(p.stats().records_emitted, 0);
        assert_eq!(p.stats().rows_skipped, 2);
        assert!(p.unknown_table_ids.contains(&TableId::with_schema("d", "tx")));
    }

    #[tokio::test]
    async fn test_table_number_reassignment_evicts_stale_binding() {
        let mut p = processor();
        p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY)"))
            .await
            .unwrap();
        p.handle_event(table_map(10, "t1")).await.unwrap();
        p.handle_event(create_t1("ALTER TABLE t1 ADD COLUMN age INT"))
            .await
            .unwrap();
        p.handle_event(table_map(11, "t1")).await.unwrap();

        assert!(!p.converters_by_table_number.contains_key(&10));
        assert!(p.converters_by_table_number.contains_key(&11));
    }

    #[tokio::test]
    async fn test_filtered_table_counts_rows() {
        let config = CdcConfig::new("srv").exclude_table("d.t1");
        let mut p = EventProcessor::new(
            config,
            Arc::new(MemorySchemaHistory::new()),
            Arc::new(DefaultTopicSelector::new()),
            MemorySink::new(),
        )
        .unwrap();
        p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY)"))
            .await
            .unwrap();
        p.handle_event(table_map(10, "t1")).await.unwrap();
        p.handle_event(write_rows(10, 1, vec![vec![ColumnValue::Int(1)]]))
            .await
            .unwrap();

        assert_eq!(p.stats().rows_skipped, 1);
        assert_eq!(p.stats().records_emitted, 0);
    }

    #[tokio::test]
    async fn test_topic_prefix_flows_into_topics() {
        let config = CdcConfig::new("srv")
            .with_schema_changes(true)
            .with_topic_prefix("cdc");
        let selector = Arc::new(DefaultTopicSelector::with_optional_prefix(
            config.topic_prefix.clone(),
        ));
        let mut p = EventProcessor::new(
            config,
            Arc::new(MemorySchemaHistory::new()),
            selector,
            MemorySink::new(),
        )
        .unwrap();
        p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY)"))
            .await
            .unwrap();
        p.handle_event(table_map(10, "t1")).await.unwrap();
        p.handle_event(write_rows(10, 1, vec![vec![ColumnValue::Int(1)]]))
            .await
            .unwrap();

        let sink = p.into_sink();
        let records = sink.records();
        assert_eq!(records.len(), 2);
        // Schema-change record, then the row record.
        assert_eq!(records[0].topic, "cdc.srv");
        assert_eq!(records[1].topic, "cdc.srv.d.t1");
    }

    #[tokio::test]
    async fn test_query_records_history_even_on_parse_failure() {
        let history = Arc::new(MemorySchemaHistory::new());
        let mut p = EventProcessor::new(
            CdcConfig::new("srv"),
            history.clone(),
            Arc::new(DefaultTopicSelector::new()),
            MemorySink::new(),
        )
        .unwrap();

        p.handle_event(create_t1("ALTER TABLE ghost ADD COLUMN a INT"))
            .await
            .unwrap();
        assert_eq!(history.len().await, 1);
        assert_eq!(p.stats().ddl_parse_failures, 1);
    }

    #[tokio::test]
    async fn test_schema_change_record_emitted_when_enabled() {
        let mut p = EventProcessor::new(
            CdcConfig::new("srv").with_schema_changes(true),
            Arc::new(MemorySchemaHistory::new()),
            Arc::new(DefaultTopicSelector::new()),
            MemorySink::new(),
        )
        .unwrap();
        p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY)"))
            .await
            .unwrap();

        let sink = p.into_sink();
        assert_eq!(sink.records().len(), 1);
        let record = &sink.records()[0];
        assert_eq!(record.topic, "srv");
        assert_eq!(record.key, Some(json!("d")));
        let payload: serde_json::Value =
            serde_json::from_str(record.value.as_ref().unwrap().as_str().unwrap()).unwrap();
        assert_eq!(payload["databaseName"], "d");
        assert!(payload["ddl"].as_str().unwrap().contains("CREATE TABLE"));
    }

    #[tokio::test]
    async fn test_update_before_image_flag() {
        let mut p = EventProcessor::new(
            CdcConfig::new("srv").with_update_before(true),
            Arc::new(MemorySchemaHistory::new()),
            Arc::new(DefaultTopicSelector::new()),
            MemorySink::new(),
        )
        .unwrap();
        p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY, n INT)"))
            .await
            .unwrap();
        p.handle_event(table_map(10, "t1")).await.unwrap();
        p.handle_event(BinlogEvent::UpdateRows(UpdateRowsEvent {
            table_number: 10,
            included_columns: ColumnBitmap::all(2),
            included_columns_before: ColumnBitmap::all(2),
            rows: vec![(
                vec![ColumnValue::Int(1), ColumnValue::Int(5)],
                vec![ColumnValue::Int(1), ColumnValue::Int(6)],
            )],
        }))
        .await
        .unwrap();

        let sink = p.into_sink();
        let record = &sink.records()[0];
        assert_eq!(record.value, Some(json!({"id": 1, "n": 6})));
        assert_eq!(record.before, Some(json!({"id": 1, "n": 5})));
    }

    #[tokio::test]
    async fn test_delete_without_pk_is_skipped() {
        let mut p = processor();
        p.handle_event(create_t1("CREATE TABLE t1 (n INT)")).await.unwrap();
        p.handle_event(table_map(10, "t1")).await.unwrap();
        p.handle_event(BinlogEvent::DeleteRows(DeleteRowsEvent {
            table_number: 10,
            included_columns: ColumnBitmap::all(1),
            rows: vec![vec![ColumnValue::Int(1)]],
        }))
        .await
        .unwrap();

        assert_eq!(p.stats().records_emitted, 0);
        assert_eq!(p.stats().rows_skipped, 1);
    }

    #[tokio::test]
    async fn test_sink_failure_is_fatal() {
        let mut sink = MemorySink::new();
        sink.fail_next();
        let mut p2 = EventProcessor::new(
            CdcConfig::new("srv"),
            Arc::new(MemorySchemaHistory::new()),
            Arc::new(DefaultTopicSelector::new()),
            sink,
        )
        .unwrap();
        p2.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY)"))
            .await
            .unwrap();
        p2.handle_event(table_map(10, "t1")).await.unwrap();
        let err = p2
            .handle_event(write_rows(10, 1, vec![vec![ColumnValue::Int(1)]]))
            .await
            .unwrap_err();
        assert!(matches!(err, crate::common::CdcError::Sink(_)));
    }

    #[tokio::test]
    async fn test_load_history_rebuilds_catalog() {
        let history = Arc::new(MemorySchemaHistory::new());
        {
            let mut p = EventProcessor::new(
                CdcConfig::new("srv"),
                history.clone(),
                Arc::new(DefaultTopicSelector::new()),
                MemorySink::new(),
            )
            .unwrap();
            p.handle_event(create_t1("CREATE TABLE t1 (id INT PRIMARY KEY, name VARCHAR(32))"))
                .await
                .unwrap();
            p.handle_event(create_t1("ALTER TABLE t1 ADD COLUMN age INT"))
                .await
                .unwrap();
        }

        // Restart against the same history.
        let mut p = EventProcessor::new(
            CdcConfig::new("srv"),
            history,
            Arc::new(DefaultTopicSelector::new()),
            MemorySink::new(),
        )
        .unwrap();
        p.load_history().await.unwrap();

        let catalog = p.catalog_snapshot();
        let table = catalog.get(&TableId::with_schema("d", "t1")).unwrap();
        assert_eq!(table.columns().len(), 3);
        assert!(table.column_with_name("age").is_some());

        // The recovered schema translates rows immediately.
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
        assert_eq!(p.stats().records_emitted, 1);
    }
}
