//! MySQL-specific pieces: the typed binlog event contract, the DDL
//! dialect parser, source position tracking, and the event processor.

pub mod config;
pub mod ddl;
pub mod event;
pub mod processor;
pub mod source_info;

pub use config::CdcConfig;
pub use ddl::MySqlDdlParser;
pub use event::{
    BinlogEvent, ColumnBitmap, ColumnValue, DeleteRowsEvent, QueryEvent, RotateEvent, Row,
    TableMapEvent, UpdateRowsEvent, WriteRowsEvent,
};
pub use processor::{EventProcessor, ProcessorStats};
pub use source_info::SourceInfo;
