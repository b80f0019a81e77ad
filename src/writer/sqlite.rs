use anyhow::{Context, Result};
use rusqlite::{params, Connection, Transaction};
use std::path::Path;

use super::schema_gen::{generate_create_table, generate_indexes, generate_insert};
use crate::ui::{Phase, Ui};
use crate::xref::{kind_label, EntityType, ReferenceRecord, XrefManager};

const BATCH_SIZE: usize = 1000;

pub struct ReferenceWriter {
    conn: Connection,
}

impl ReferenceWriter {
    pub fn new(db_path: &Path) -> Result<Self> {
        // Remove existing database if present
        if db_path.exists() {
            std::fs::remove_file(db_path).context("Failed to remove existing database")?;
        }

        let conn = Connection::open(db_path).context("Failed to create database")?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Ok(Self { conn })
    }

    /// Create the reference table and its indexes
    pub fn create_table(&self) -> Result<()> {
        self.conn
            .execute(&generate_create_table(), [])
            .context("Failed to create refs table")?;

        for index_sql in generate_indexes() {
            self.conn
                .execute(&index_sql, [])
                .context("Failed to create index for refs")?;
        }

        Ok(())
    }

    /// Insert every reference to entities of `kind`
    pub fn import_type<M>(
        &mut self,
        manager: &XrefManager<M>,
        kind: EntityType,
        ui: &mut impl Ui,
    ) -> Result<u64> {
        let tx = self.conn.transaction()?;
        let insert_sql = generate_insert();
        let mut count: u64 = 0;
        let mut batch: Vec<&ReferenceRecord> = Vec::with_capacity(BATCH_SIZE);

        for id in manager.referenced_ids(kind) {
            for record in manager.references(kind, id) {
                batch.push(record);
                if batch.len() >= BATCH_SIZE {
                    insert_batch(&tx, &insert_sql, manager, &batch)?;
                    count += batch.len() as u64;
                    batch.clear();
                }
            }
        }

        if !batch.is_empty() {
            insert_batch(&tx, &insert_sql, manager, &batch)?;
            count += batch.len() as u64;
        }

        tx.commit()?;
        ui.log(format!("{}: {} references", kind.plural(), count));

        Ok(count)
    }

    pub fn finalize(self) -> Result<()> {
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

/// Insert a batch of records into the refs table
fn insert_batch<M>(
    tx: &Transaction,
    sql: &str,
    manager: &XrefManager<M>,
    batch: &[&ReferenceRecord],
) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for record in batch {
        let target = record.target;
        let source = &record.source;
        let event = source.event.as_ref();

        stmt.execute(params![
            target.kind.key(),
            target.id,
            manager.display_name(target.kind, target.id),
            source.source_type.key(),
            source.source_id,
            manager.display_name(source.source_type, source.source_id),
            event.and_then(|e| e.event_id),
            event.and_then(|e| e.event_name.as_deref()),
            event.map(|e| e.page),
            event.map(|e| e.line),
            record.kind.to_string(),
            kind_label(record.kind),
            record.sequence,
        ])?;
    }

    Ok(())
}

/// Write the references to the selected entity types into a new SQLite database
pub fn export_references<M>(
    manager: &XrefManager<M>,
    output_db: &Path,
    types: &[EntityType],
    ui: &mut impl Ui,
) -> Result<u64> {
    ui.set_phase(Phase::Exporting);

    let mut writer = ReferenceWriter::new(output_db)?;
    writer.create_table()?;

    let mut total_records: u64 = 0;
    for (step, kind) in types.iter().enumerate() {
        ui.set_progress(step as u64, types.len() as u64, kind.plural());
        total_records += writer
            .import_type(manager, *kind, ui)
            .with_context(|| format!("Failed to export {} references", kind))?;
    }
    ui.clear_progress();

    writer.finalize()?;

    Ok(total_records)
}
