//! MySQL DDL parsing
//!
//! Parses the dialect of DDL that shows up in a server's binary log and
//! applies it to a [`Tables`] catalog. The binlog carries plenty of
//! operational noise the stream cannot usefully reject, so resilience
//! beats strictness here: a statement that fails to parse is reported and
//! skipped, and the catalog is left untouched for that statement only.

use crate::common::{CdcError, Result};
use crate::relational::catalog::Tables;
use crate::relational::column::{Column, ColumnSpec, JdbcType};
use crate::relational::table::{Table, TableId};
use tracing::{debug, error};

/// Statement prefixes recognized as non-DDL noise before parsing is
/// attempted.
const IGNORABLE_PREFIXES: &[&str] = &[
    "BEGIN", "COMMIT", "ROLLBACK", "SAVEPOINT", "FLUSH", "SET", "USE", "GRANT", "REVOKE",
    "ANALYZE", "OPTIMIZE", "LOCK", "UNLOCK",
];

/// Parser for the MySQL DDL dialect, applying side effects to a catalog.
#[derive(Debug)]
pub struct MySqlDdlParser {
    include_views: bool,
    current_schema: Option<String>,
}

impl MySqlDdlParser {
    /// `include_views` controls whether `CREATE VIEW` registers a catalog
    /// entry; when off (the default for CDC use) views are accepted and
    /// ignored.
    pub fn new(include_views: bool) -> Self {
        Self {
            include_views,
            current_schema: None,
        }
    }

    /// Set the schema used to resolve unqualified table names.
    pub fn set_current_schema(&mut self, schema: impl Into<String>) {
        let schema = schema.into();
        self.current_schema = if schema.is_empty() { None } else { Some(schema) };
    }

    pub fn current_schema(&self) -> Option<&str> {
        self.current_schema.as_deref()
    }

    /// Whether a raw statement is recognized noise that needs no parsing.
    pub fn is_ignorable(&self, sql: &str) -> bool {
        let trimmed = sql.trim();
        if trimmed.is_empty() {
            return true;
        }
        let first = trimmed
            .split(|c: char| c.is_whitespace() || c == ';')
            .next()
            .unwrap_or("");
        IGNORABLE_PREFIXES
            .iter()
            .any(|p| first.eq_ignore_ascii_case(p))
    }

    /// Parse one or more `;`-separated statements, mutating the catalog.
    ///
    /// Statements are applied independently: a failing statement leaves
    /// the catalog untouched and later statements still run. When any
    /// statement failed, the combined failure is returned after the rest
    /// have been applied. Note that a statement recorded in history while
    /// unparseable will fail identically on every replay; a parser fix
    /// changes what a replay reconstructs.
    pub fn parse(&mut self, ddl: &str, tables: &mut Tables) -> Result<()> {
        let mut failures: Vec<String> = Vec::new();
        for statement in split_statements(ddl) {
            if self.is_ignorable(&statement) {
                debug!(statement = %statement.trim(), "skipping ignorable statement");
                continue;
            }
            if let Err(e) = self.parse_statement(&statement, tables) {
                error!(statement = %statement.trim(), error = %e, "failed to parse DDL statement");
                failures.push(e.to_string());
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(CdcError::parse(failures.join("; ")))
        }
    }

    fn parse_statement(&mut self, sql: &str, tables: &mut Tables) -> Result<()> {
        let tokens = tokenize(sql)?;
        if tokens.is_empty() {
            return Ok(());
        }
        let mut cursor = Cursor::new(&tokens);

        if cursor.accept_keyword("CREATE") {
            cursor.accept_keyword("OR");
            cursor.accept_keyword("REPLACE");
            cursor.accept_keyword("TEMPORARY");
            if cursor.accept_keyword("TABLE") {
                return self.parse_create_table(&mut cursor, tables);
            }
            if cursor.accept_keyword("VIEW") {
                return self.parse_create_view(&mut cursor, tables);
            }
            // Indexes, databases, triggers, routines, definer-qualified
            // views: nothing the table catalog needs.
            return Ok(());
        }
        if cursor.accept_keyword("ALTER") {
            if cursor.accept_keyword("TABLE") {
                return self.parse_alter_table(&mut cursor, tables);
            }
            // ALTER VIEW / DATABASE / USER and friends carry no table
            // schema information.
            return Ok(());
        }
        if cursor.accept_keyword("DROP") {
            cursor.accept_keyword("TEMPORARY");
            if cursor.accept_keyword("TABLE") {
                return self.parse_drop_table(&mut cursor, tables);
            }
            // DROP VIEW / INDEX / DATABASE and friends.
            return Ok(());
        }
        if cursor.accept_keyword("RENAME") {
            cursor.accept_keyword("TABLE");
            return self.parse_rename_table(&mut cursor, tables);
        }
        if cursor.accept_keyword("TRUNCATE") {
            // No schema effect.
            return Ok(());
        }

        Err(CdcError::parse(format!(
            "unsupported statement starting with '{}'",
            tokens[0].text
        )))
    }

    fn parse_create_table(&mut self, cursor: &mut Cursor<'_>, tables: &mut Tables) -> Result<()> {
        if cursor.accept_keyword("IF") {
            cursor.expect_keyword("NOT")?;
            cursor.expect_keyword("EXISTS")?;
        }
        let id = self.parse_table_id(cursor)?;

        // CREATE TABLE a LIKE b copies the referenced definition.
        if cursor.accept_keyword("LIKE") {
            let source_id = self.parse_table_id(cursor)?;
            if let Some(source) = tables.get(&source_id).cloned() {
                let copy = Table::new(
                    id,
                    source.columns().to_vec(),
                    source.pk_column_names().to_vec(),
                    source.default_charset().map(str::to_string),
                )?;
                tables.overwrite(copy);
            }
            return Ok(());
        }

        cursor.expect_punct("(")?;
        let mut columns: Vec<Column> = Vec::new();
        let mut pk_names: Vec<String> = Vec::new();

        loop {
            if cursor.at_keyword("PRIMARY") {
                cursor.advance();
                cursor.expect_keyword("KEY")?;
                pk_names = parse_paren_name_list(cursor)?;
            } else if cursor.at_keyword("UNIQUE")
                || cursor.at_keyword("KEY")
                || cursor.at_keyword("INDEX")
                || cursor.at_keyword("FULLTEXT")
                || cursor.at_keyword("SPATIAL")
                || cursor.at_keyword("CONSTRAINT")
                || cursor.at_keyword("FOREIGN")
                || cursor.at_keyword("CHECK")
            {
                // CONSTRAINT [name] PRIMARY KEY (...) still carries the key.
                if cursor.accept_keyword("CONSTRAINT") {
                    if !cursor.at_keyword("PRIMARY")
                        && !cursor.at_keyword("FOREIGN")
                        && !cursor.at_keyword("UNIQUE")
                        && !cursor.at_keyword("CHECK")
                    {
                        cursor.advance(); // constraint name
                    }
                    if cursor.accept_keyword("PRIMARY") {
                        cursor.expect_keyword("KEY")?;
                        pk_names = parse_paren_name_list(cursor)?;
                        if !cursor.skip_to_next_definition()? {
                            break;
                        }
                        continue;
                    }
                }
                if !cursor.skip_to_next_definition()? {
                    break;
                }
                continue;
            } else {
                let position = columns.len() as u32 + 1;
                let (column, inline_pk) = parse_column_definition(cursor, position)?;
                if inline_pk {
                    pk_names = vec![column.name().to_string()];
                }
                columns.push(column);
            }

            if cursor.accept_punct(",") {
                continue;
            }
            cursor.expect_punct(")")?;
            break;
        }

        // Table options: pick out the default charset, ignore the rest.
        let mut default_charset = None;
        while let Some(token) = cursor.peek() {
            if token.keyword_eq("CHARSET") {
                cursor.advance();
                cursor.accept_punct("=");
                default_charset = cursor.next().map(|t| t.text.clone());
            } else if token.keyword_eq("CHARACTER") {
                cursor.advance();
                cursor.accept_keyword("SET");
                cursor.accept_punct("=");
                default_charset = cursor.next().map(|t| t.text.clone());
            } else {
                cursor.advance();
            }
        }

        let table = Table::new(id, columns, pk_names, default_charset)?;
        tables.overwrite(table);
        Ok(())
    }

    fn parse_create_view(&mut self, cursor: &mut Cursor<'_>, tables: &mut Tables) -> Result<()> {
        if !self.include_views {
            debug!("ignoring CREATE VIEW");
            return Ok(());
        }
        let id = self.parse_table_id(cursor)?;
        // The view's columns come from its SELECT, which this dialect does
        // not evaluate; register the name so row filters can see it.
        let table = Table::new(id, Vec::new(), Vec::new(), None)?;
        tables.overwrite(table);
        Ok(())
    }

    fn parse_alter_table(&mut self, cursor: &mut Cursor<'_>, tables: &mut Tables) -> Result<()> {
        cursor.accept_keyword("IF");
        cursor.accept_keyword("EXISTS");
        let id = self.parse_table_id(cursor)?;
        let existing = tables
            .get(&id)
            .cloned()
            .ok_or_else(|| CdcError::parse(format!("ALTER TABLE for unknown table {}", id)))?;

        // Stage every action against copies, then commit once.
        let mut columns: Vec<Column> = existing.columns().to_vec();
        let mut pk_names: Vec<String> = existing.pk_column_names().to_vec();
        let mut new_id: Option<TableId> = None;

        loop {
            if cursor.accept_keyword("ADD") {
                if cursor.accept_keyword("PRIMARY") {
                    cursor.expect_keyword("KEY")?;
                    pk_names = parse_paren_name_list(cursor)?;
                } else if cursor.at_keyword("CONSTRAINT") {
                    cursor.advance();
                    if !cursor.at_keyword("PRIMARY")
                        && !cursor.at_keyword("FOREIGN")
                        && !cursor.at_keyword("UNIQUE")
                        && !cursor.at_keyword("CHECK")
                    {
                        cursor.advance();
                    }
                    if cursor.accept_keyword("PRIMARY") {
                        cursor.expect_keyword("KEY")?;
                        pk_names = parse_paren_name_list(cursor)?;
                    } else {
                        cursor.skip_action()?;
                    }
                } else if cursor.at_keyword("UNIQUE")
                    || cursor.at_keyword("INDEX")
                    || cursor.at_keyword("KEY")
                    || cursor.at_keyword("FULLTEXT")
                    || cursor.at_keyword("SPATIAL")
                    || cursor.at_keyword("FOREIGN")
                    || cursor.at_keyword("CHECK")
                {
                    cursor.skip_action()?;
                } else {
                    cursor.accept_keyword("COLUMN");
                    let position = columns.len() as u32 + 1;
                    let (column, inline_pk) = parse_column_definition(cursor, position)?;
                    // FIRST / AFTER placement is accepted; emitted order
                    // follows it.
                    let mut insert_at = columns.len();
                    if cursor.accept_keyword("FIRST") {
                        insert_at = 0;
                    } else if cursor.accept_keyword("AFTER") {
                        let anchor = cursor.expect_name()?;
                        insert_at = columns
                            .iter()
                            .position(|c| c.name() == anchor)
                            .map(|i| i + 1)
                            .unwrap_or(columns.len());
                    }
                    if inline_pk {
                        pk_names = vec![column.name().to_string()];
                    }
                    columns.insert(insert_at, column);
                }
            } else if cursor.accept_keyword("DROP") {
                if cursor.accept_keyword("PRIMARY") {
                    cursor.expect_keyword("KEY")?;
                    pk_names.clear();
                } else if cursor.at_keyword("INDEX")
                    || cursor.at_keyword("KEY")
                    || cursor.at_keyword("FOREIGN")
                    || cursor.at_keyword("CONSTRAINT")
                    || cursor.at_keyword("CHECK")
                {
                    cursor.skip_action()?;
                } else {
                    cursor.accept_keyword("COLUMN");
                    let name = cursor.expect_name()?;
                    columns.retain(|c| c.name() != name);
                    pk_names.retain(|pk| *pk != name);
                }
            } else if cursor.accept_keyword("MODIFY") {
                cursor.accept_keyword("COLUMN");
                let position = 0; // re-derived after staging
                let (column, inline_pk) = parse_column_definition(cursor, position)?;
                cursor.accept_keyword("FIRST");
                if cursor.accept_keyword("AFTER") {
                    cursor.expect_name()?;
                }
                let name = column.name().to_string();
                if let Some(slot) = columns.iter_mut().find(|c| c.name() == name) {
                    *slot = column;
                } else {
                    return Err(CdcError::parse(format!(
                        "MODIFY COLUMN for unknown column '{}'",
                        name
                    )));
                }
                if inline_pk {
                    pk_names = vec![name];
                }
            } else if cursor.accept_keyword("CHANGE") {
                cursor.accept_keyword("COLUMN");
                let old_name = cursor.expect_name()?;
                let (column, inline_pk) = parse_column_definition(cursor, 0)?;
                cursor.accept_keyword("FIRST");
                if cursor.accept_keyword("AFTER") {
                    cursor.expect_name()?;
                }
                let new_name = column.name().to_string();
                if let Some(slot) = columns.iter_mut().find(|c| c.name() == old_name) {
                    *slot = column;
                } else {
                    return Err(CdcError::parse(format!(
                        "CHANGE COLUMN for unknown column '{}'",
                        old_name
                    )));
                }
                for pk in pk_names.iter_mut() {
                    if *pk == old_name {
                        *pk = new_name.clone();
                    }
                }
                if inline_pk {
                    pk_names = vec![new_name];
                }
            } else if cursor.accept_keyword("RENAME") {
                if cursor.accept_keyword("TO") || cursor.accept_keyword("AS") {
                    new_id = Some(self.parse_table_id(cursor)?);
                } else if cursor.accept_keyword("COLUMN") {
                    let old_name = cursor.expect_name()?;
                    cursor.expect_keyword("TO")?;
                    let renamed = cursor.expect_name()?;
                    if let Some(slot) = columns.iter_mut().find(|c| c.name() == old_name) {
                        let mut spec = slot.to_spec();
                        spec.name = renamed.clone();
                        *slot = spec.create();
                    }
                    for pk in pk_names.iter_mut() {
                        if *pk == old_name {
                            *pk = renamed.clone();
                        }
                    }
                } else {
                    // RENAME INDEX and such.
                    cursor.skip_action()?;
                }
            } else if cursor.peek().is_some() {
                // ENGINE=..., AUTO_INCREMENT=..., CONVERT TO, algorithm and
                // lock hints: no column effect.
                cursor.skip_action()?;
            }

            if !cursor.accept_punct(",") {
                break;
            }
        }

        // Positions stay dense and 1-based after any reshuffle.
        let columns: Vec<Column> = columns
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let mut spec = c.to_spec();
                spec.position = i as u32 + 1;
                spec.create()
            })
            .collect();

        let final_id = new_id.clone().unwrap_or_else(|| id.clone());
        let table = Table::new(
            final_id,
            columns,
            pk_names,
            existing.default_charset().map(str::to_string),
        )?;
        if new_id.is_some() {
            tables.remove(&id);
        }
        tables.overwrite(table);
        Ok(())
    }

    fn parse_drop_table(&mut self, cursor: &mut Cursor<'_>, tables: &mut Tables) -> Result<()> {
        if cursor.accept_keyword("IF") {
            cursor.expect_keyword("EXISTS")?;
        }
        loop {
            let id = self.parse_table_id(cursor)?;
            tables.remove(&id);
            if !cursor.accept_punct(",") {
                break;
            }
        }
        Ok(())
    }

    fn parse_rename_table(&mut self, cursor: &mut Cursor<'_>, tables: &mut Tables) -> Result<()> {
        loop {
            let old = self.parse_table_id(cursor)?;
            cursor.expect_keyword("TO")?;
            let new = self.parse_table_id(cursor)?;
            tables.rename(&old, new)?;
            if !cursor.accept_punct(",") {
                break;
            }
        }
        Ok(())
    }

    /// Parse `name`, `schema.name`, or quoted variants, resolving
    /// unqualified names against the current-schema hint.
    fn parse_table_id(&self, cursor: &mut Cursor<'_>) -> Result<TableId> {
        let first = cursor.expect_name()?;
        if cursor.accept_punct(".") {
            let table = cursor.expect_name()?;
            Ok(TableId::with_schema(first, table))
        } else {
            match &self.current_schema {
                Some(schema) => Ok(TableId::with_schema(schema.clone(), first)),
                None => Ok(TableId::unqualified(first)),
            }
        }
    }
}

/// Parse one column definition. Returns the column and whether an inline
/// `PRIMARY KEY` marker was present.
fn parse_column_definition(cursor: &mut Cursor<'_>, position: u32) -> Result<(Column, bool)> {
    let name = cursor.expect_name()?;
    let mut type_name = cursor.expect_name()?.to_ascii_uppercase();
    // Two-word type names.
    if type_name == "DOUBLE" && cursor.accept_keyword("PRECISION") {
        type_name = "DOUBLE".to_string();
    }

    let mut length = -1i32;
    let mut scale = -1i32;
    if cursor.accept_punct("(") {
        if type_name == "ENUM" || type_name == "SET" {
            // Value lists carry no length information.
            cursor.skip_to_closing_paren()?;
        } else {
            if let Some(token) = cursor.next() {
                length = token.text.parse().unwrap_or(-1);
            }
            if cursor.accept_punct(",") {
                if let Some(token) = cursor.next() {
                    scale = token.text.parse().unwrap_or(-1);
                }
            }
            cursor.expect_punct(")")?;
        }
    }

    let jdbc_type = if type_name == "TINYINT" && length == 1 {
        // TINYINT(1) is MySQL's boolean.
        JdbcType::Boolean
    } else {
        JdbcType::from_type_name(&type_name)
    };

    let mut optional = true;
    let mut auto_incremented = false;
    let mut generated = false;
    let mut inline_pk = false;

    while let Some(token) = cursor.peek() {
        if token.is_punct(",") || token.is_punct(")") {
            break;
        }
        // Placement belongs to the surrounding ALTER action.
        if token.keyword_eq("FIRST") || token.keyword_eq("AFTER") {
            break;
        }
        if token.keyword_eq("NOT") {
            cursor.advance();
            cursor.expect_keyword("NULL")?;
            optional = false;
        } else if token.keyword_eq("NULL") {
            cursor.advance();
            optional = true;
        } else if token.keyword_eq("AUTO_INCREMENT") {
            cursor.advance();
            auto_incremented = true;
        } else if token.keyword_eq("PRIMARY") {
            cursor.advance();
            cursor.expect_keyword("KEY")?;
            inline_pk = true;
            optional = false;
        } else if token.keyword_eq("UNIQUE") {
            cursor.advance();
            cursor.accept_keyword("KEY");
        } else if token.keyword_eq("DEFAULT") {
            cursor.advance();
            // Default expressions may be calls like CURRENT_TIMESTAMP(6).
            cursor.next();
            if cursor.accept_punct("(") {
                cursor.skip_to_closing_paren()?;
            }
        } else if token.keyword_eq("COMMENT") {
            cursor.advance();
            cursor.next();
        } else if token.keyword_eq("GENERATED") {
            cursor.advance();
            cursor.accept_keyword("ALWAYS");
            cursor.expect_keyword("AS")?;
            cursor.expect_punct("(")?;
            cursor.skip_to_closing_paren()?;
            cursor.accept_keyword("VIRTUAL");
            cursor.accept_keyword("STORED");
            generated = true;
        } else if token.keyword_eq("AS") {
            cursor.advance();
            cursor.expect_punct("(")?;
            cursor.skip_to_closing_paren()?;
            cursor.accept_keyword("VIRTUAL");
            cursor.accept_keyword("STORED");
            generated = true;
        } else if token.keyword_eq("CHARACTER") {
            cursor.advance();
            cursor.accept_keyword("SET");
            cursor.next();
        } else if token.keyword_eq("COLLATE") {
            cursor.advance();
            cursor.next();
        } else if token.keyword_eq("ON") {
            // ON UPDATE CURRENT_TIMESTAMP
            cursor.advance();
            cursor.next();
            cursor.next();
            if cursor.accept_punct("(") {
                cursor.skip_to_closing_paren()?;
            }
        } else {
            // UNSIGNED, ZEROFILL, column format hints.
            cursor.advance();
        }
    }

    let column = ColumnSpec {
        name,
        position,
        jdbc_type,
        type_name,
        length,
        scale,
        optional,
        auto_incremented,
        generated,
    }
    .create();
    Ok((column, inline_pk))
}

/// Parse `( name [, name ...] )`.
fn parse_paren_name_list(cursor: &mut Cursor<'_>) -> Result<Vec<String>> {
    cursor.expect_punct("(")?;
    let mut names = Vec::new();
    loop {
        names.push(cursor.expect_name()?);
        // Key-part lengths like `name(10)` and orderings are dropped.
        if cursor.accept_punct("(") {
            cursor.skip_to_closing_paren()?;
        }
        cursor.accept_keyword("ASC");
        cursor.accept_keyword("DESC");
        if cursor.accept_punct(",") {
            continue;
        }
        cursor.expect_punct(")")?;
        break;
    }
    Ok(names)
}

// ---------------------------------------------------------------------------
// Tokenizer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    text: String,
    quoted: bool,
    punct: bool,
}

impl Token {
    fn keyword_eq(&self, keyword: &str) -> bool {
        !self.quoted && !self.punct && self.text.eq_ignore_ascii_case(keyword)
    }

    fn is_punct(&self, p: &str) -> bool {
        self.punct && self.text == p
    }
}

/// Split raw SQL into statements on `;`, honoring quotes and comments.
fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut chars = sql.chars().peekable();
    let mut in_quote: Option<char> = None;

    while let Some(c) = chars.next() {
        match in_quote {
            Some(q) => {
                current.push(c);
                if c == q {
                    in_quote = None;
                }
            }
            None => match c {
                '\'' | '"' | '`' => {
                    in_quote = Some(c);
                    current.push(c);
                }
                '-' if chars.peek() == Some(&'-') => {
                    for c2 in chars.by_ref() {
                        if c2 == '\n' {
                            break;
                        }
                    }
                    current.push(' ');
                }
                '#' => {
                    for c2 in chars.by_ref() {
                        if c2 == '\n' {
                            break;
                        }
                    }
                    current.push(' ');
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    let mut prev = ' ';
                    for c2 in chars.by_ref() {
                        if prev == '*' && c2 == '/' {
                            break;
                        }
                        prev = c2;
                    }
                    current.push(' ');
                }
                ';' => {
                    if !current.trim().is_empty() {
                        statements.push(current.trim().to_string());
                    }
                    current = String::new();
                }
                _ => current.push(c),
            },
        }
    }
    if !current.trim().is_empty() {
        statements.push(current.trim().to_string());
    }
    statements
}

fn tokenize(sql: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = sql.chars().peekable();

    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '`' || c == '"' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            for c2 in chars.by_ref() {
                if c2 == c {
                    closed = true;
                    break;
                }
                text.push(c2);
            }
            if !closed {
                return Err(CdcError::parse("unterminated quoted identifier"));
            }
            tokens.push(Token {
                text,
                quoted: true,
                punct: false,
            });
        } else if c == '\'' {
            chars.next();
            let mut text = String::new();
            let mut closed = false;
            while let Some(c2) = chars.next() {
                if c2 == '\'' {
                    // Doubled quote is an escaped quote.
                    if chars.peek() == Some(&'\'') {
                        chars.next();
                        text.push('\'');
                        continue;
                    }
                    closed = true;
                    break;
                }
                if c2 == '\\' {
                    if let Some(escaped) = chars.next() {
                        text.push(escaped);
                    }
                    continue;
                }
                text.push(c2);
            }
            if !closed {
                return Err(CdcError::parse("unterminated string literal"));
            }
            tokens.push(Token {
                text,
                quoted: true,
                punct: false,
            });
        } else if c.is_alphanumeric() || c == '_' || c == '$' {
            let mut text = String::new();
            while let Some(&c2) = chars.peek() {
                if c2.is_alphanumeric() || c2 == '_' || c2 == '$' {
                    text.push(c2);
                    chars.next();
                } else {
                    break;
                }
            }
            tokens.push(Token {
                text,
                quoted: false,
                punct: false,
            });
        } else {
            chars.next();
            tokens.push(Token {
                text: c.to_string(),
                quoted: false,
                punct: true,
            });
        }
    }
    Ok(tokens)
}

// ---------------------------------------------------------------------------
// Token cursor
// ---------------------------------------------------------------------------

struct Cursor<'a> {
    tokens: &'a [Token],
    index: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, index: 0 }
    }

    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.index)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.index);
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn advance(&mut self) {
        self.index += 1;
    }

    fn at_keyword(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.keyword_eq(keyword))
    }

    fn accept_keyword(&mut self, keyword: &str) -> bool {
        if self.at_keyword(keyword) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> Result<()> {
        if self.accept_keyword(keyword) {
            Ok(())
        } else {
            Err(CdcError::parse(format!(
                "expected '{}', found {}",
                keyword,
                self.describe_current()
            )))
        }
    }

    fn accept_punct(&mut self, p: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_punct(p)) {
            self.index += 1;
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<()> {
        if self.accept_punct(p) {
            Ok(())
        } else {
            Err(CdcError::parse(format!(
                "expected '{}', found {}",
                p,
                self.describe_current()
            )))
        }
    }

    /// Consume an identifier (bare or quoted) and return its text.
    fn expect_name(&mut self) -> Result<String> {
        match self.next() {
            Some(token) if !token.punct => Ok(token.text.clone()),
            _ => Err(CdcError::parse(format!(
                "expected identifier, found {}",
                self.describe_current()
            ))),
        }
    }

    /// Skip tokens until the next top-level `,` (consumed; returns true)
    /// or the closing `)` of the enclosing list (consumed; returns false).
    fn skip_to_next_definition(&mut self) -> Result<bool> {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                if depth == 0 {
                    self.advance();
                    return Ok(false);
                }
                depth -= 1;
            } else if token.is_punct(",") && depth == 0 {
                self.advance();
                return Ok(true);
            }
            self.advance();
        }
        Err(CdcError::parse("unterminated definition list"))
    }

    /// Skip the remainder of one ALTER action, stopping before a
    /// top-level `,` or the end of input.
    fn skip_action(&mut self) -> Result<()> {
        let mut depth = 0usize;
        while let Some(token) = self.peek() {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                if depth == 0 {
                    return Ok(());
                }
                depth -= 1;
            } else if token.is_punct(",") && depth == 0 {
                return Ok(());
            }
            self.advance();
        }
        Ok(())
    }

    /// Consume tokens through the matching `)` for an already-consumed
    /// `(`.
    fn skip_to_closing_paren(&mut self) -> Result<()> {
        let mut depth = 1usize;
        while let Some(token) = self.next() {
            if token.is_punct("(") {
                depth += 1;
            } else if token.is_punct(")") {
                depth -= 1;
                if depth == 0 {
                    return Ok(());
                }
            }
        }
        Err(CdcError::parse("unbalanced parentheses"))
    }

    fn describe_current(&self) -> String {
        match self.peek() {
            Some(token) => format!("'{}'", token.text),
            None => "end of statement".to_string(),
        }
    }
}
