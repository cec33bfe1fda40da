//! Declarative schema sync: the live database is diffed against a pristine
//! in-memory database built from `CURRENT_SCHEMA`, and the differences are
//! applied inside one transaction.

use crate::error::AppError;
use regex::Regex;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Row, Sqlite, SqlitePool};
use std::collections::{HashMap, HashSet};
use tracing::{info, instrument};

pub struct SchemaSync {
    pool: Pool<Sqlite>,
    target_schema: String,
    allow_deletions: bool,
    changes_applied: u32,
}

impl SchemaSync {
    pub fn new(pool: Pool<Sqlite>, target_schema: &str, allow_deletions: bool) -> Self {
        Self {
            pool,
            target_schema: target_schema.to_string(),
            allow_deletions,
            changes_applied: 0,
        }
    }

    #[instrument(skip(self))]
    pub async fn run(&mut self) -> Result<u32, AppError> {
        info!("Starting declarative schema sync");

        // Single connection: an in-memory database per pooled connection
        // would leave the schema visible on only one of them.
        let pristine = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        if !self.target_schema.trim().is_empty() {
            sqlx::raw_sql(&self.target_schema)
                .execute(&pristine)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to build target schema: {}", e)))?;
        }

        let mut tx = self.pool.begin().await?;
        sqlx::query("PRAGMA defer_foreign_keys = TRUE")
            .execute(&mut *tx)
            .await?;

        let result = self.apply(&mut tx, &pristine).await;

        match result {
            Ok(()) => {
                tx.commit().await?;
                if self.changes_applied > 0 {
                    info!("Running VACUUM after schema changes");
                    sqlx::query("VACUUM").execute(&self.pool).await?;
                }
                info!("Schema sync complete. Changes applied: {}", self.changes_applied);
                Ok(self.changes_applied)
            }
            Err(e) => {
                tx.rollback().await?;
                Err(e)
            }
        }
    }

    async fn apply(
        &mut self,
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        pristine: &SqlitePool,
    ) -> Result<(), AppError> {
        let current_tables = get_tables(&mut **tx).await?;
        let target_tables = get_tables(pristine).await?;

        let current_names: HashSet<&String> = current_tables.keys().collect();
        let target_names: HashSet<&String> = target_tables.keys().collect();

        // New tables
        for name in target_names.difference(&current_names) {
            self.execute(
                &format!("Create table {}", name),
                &target_tables[*name],
                &mut **tx,
            )
            .await?;
        }

        // Dropped tables
        let removed: Vec<&&String> = current_names.difference(&target_names).collect();
        if !removed.is_empty() {
            if !self.allow_deletions {
                return Err(AppError::Internal(format!(
                    "Schema sync would delete tables {:?}, but deletions are not allowed",
                    removed
                )));
            }
            for name in removed {
                self.execute(
                    &format!("Drop table {}", name),
                    &format!("DROP TABLE {}", name),
                    &mut **tx,
                )
                .await?;
            }
        }

        // Changed tables are rebuilt: create under a temp name, copy the
        // shared columns, drop the old table, rename.
        for name in current_names.intersection(&target_names) {
            let current_sql = normalize_sql(&current_tables[*name]);
            let target_sql = normalize_sql(&target_tables[*name]);
            if current_sql != target_sql {
                self.rebuild_table(tx, name, &target_tables[*name], pristine)
                    .await?;
            }
        }

        self.sync_indices(tx, pristine).await
    }

    async fn rebuild_table(
        &mut self,
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        table_name: &str,
        target_sql: &str,
        pristine: &SqlitePool,
    ) -> Result<(), AppError> {
        info!("Rebuilding table: {}", table_name);

        let current_columns = get_columns(&mut **tx, table_name).await?;
        let target_columns = get_columns(pristine, table_name).await?;

        let current_set: HashSet<&String> = current_columns.iter().collect();
        let target_set: HashSet<&String> = target_columns.iter().collect();

        let removed: Vec<&&String> = current_set.difference(&target_set).collect();
        if !removed.is_empty() && !self.allow_deletions {
            return Err(AppError::Internal(format!(
                "Schema sync would delete columns {:?} from table {}, but deletions are not allowed",
                removed, table_name
            )));
        }

        let temp_name = format!("{}_schema_sync_new", table_name);
        let temp_sql = target_sql.replace(
            &format!("CREATE TABLE {}", table_name),
            &format!("CREATE TABLE {}", temp_name),
        );
        self.execute(
            &format!("Create replacement table for {}", table_name),
            &temp_sql,
            &mut **tx,
        )
        .await?;

        let common: Vec<&str> = current_set
            .intersection(&target_set)
            .map(|s| s.as_str())
            .collect();
        if !common.is_empty() {
            let columns = common.join(", ");
            let copy_sql = format!(
                "INSERT INTO {} ({}) SELECT {} FROM {}",
                temp_name, columns, columns, table_name
            );
            self.execute(&format!("Copy rows into new {}", table_name), &copy_sql, &mut **tx)
                .await?;
        }

        self.execute(
            &format!("Drop old table {}", table_name),
            &format!("DROP TABLE {}", table_name),
            &mut **tx,
        )
        .await?;
        self.execute(
            &format!("Rename replacement to {}", table_name),
            &format!("ALTER TABLE {} RENAME TO {}", temp_name, table_name),
            &mut **tx,
        )
        .await?;

        Ok(())
    }

    async fn sync_indices(
        &mut self,
        tx: &mut sqlx::Transaction<'_, Sqlite>,
        pristine: &SqlitePool,
    ) -> Result<(), AppError> {
        let current = get_indices(&mut **tx).await?;
        let target = get_indices(pristine).await?;

        for (name, _) in &current {
            if !target.contains_key(name) {
                if !self.allow_deletions {
                    return Err(AppError::Internal(format!(
                        "Schema sync would delete index {}, but deletions are not allowed",
                        name
                    )));
                }
                self.execute(
                    &format!("Drop index {}", name),
                    &format!("DROP INDEX {}", name),
                    &mut **tx,
                )
                .await?;
            }
        }

        for (name, target_sql) in &target {
            match current.get(name) {
                Some(current_sql) if normalize_sql(current_sql) == normalize_sql(target_sql) => {}
                Some(_) => {
                    self.execute(
                        &format!("Drop changed index {}", name),
                        &format!("DROP INDEX {}", name),
                        &mut **tx,
                    )
                    .await?;
                    self.execute(&format!("Recreate index {}", name), target_sql, &mut **tx)
                        .await?;
                }
                None => {
                    self.execute(&format!("Create index {}", name), target_sql, &mut **tx)
                        .await?;
                }
            }
        }

        Ok(())
    }

    async fn execute(
        &mut self,
        description: &str,
        sql: &str,
        executor: impl sqlx::Executor<'_, Database = Sqlite>,
    ) -> Result<(), AppError> {
        info!("Schema change: {} with SQL:\n{}", description, sql);
        sqlx::query(sql).execute(executor).await?;
        self.changes_applied += 1;
        Ok(())
    }
}

async fn get_tables(
    executor: impl sqlx::Executor<'_, Database = Sqlite>,
) -> Result<HashMap<String, String>, AppError> {
    let rows = sqlx::query(
        "SELECT name, sql FROM sqlite_master WHERE type = 'table' AND name != 'sqlite_sequence'",
    )
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.get::<String, _>(0), row.get::<String, _>(1)))
        .collect())
}

async fn get_indices(
    executor: impl sqlx::Executor<'_, Database = Sqlite>,
) -> Result<HashMap<String, String>, AppError> {
    let rows =
        sqlx::query("SELECT name, sql FROM sqlite_master WHERE type = 'index' AND sql IS NOT NULL")
            .fetch_all(executor)
            .await?;

    Ok(rows
        .into_iter()
        .map(|row| (row.get::<String, _>(0), row.get::<String, _>(1)))
        .collect())
}

async fn get_columns(
    executor: impl sqlx::Executor<'_, Database = Sqlite>,
    table_name: &str,
) -> Result<Vec<String>, AppError> {
    let rows = sqlx::query(&format!("PRAGMA table_info({})", table_name))
        .fetch_all(executor)
        .await?;

    Ok(rows.into_iter().map(|row| row.get::<String, _>(1)).collect())
}

pub fn normalize_sql(sql: &str) -> String {
    // Remove comments
    let re = Regex::new(r"--[^\n]*\n").unwrap();
    let sql = re.replace_all(sql, "");

    // Normalize whitespace
    let re = Regex::new(r"\s+").unwrap();
    let sql = re.replace_all(&sql, " ");

    // Remove spaces around punctuation
    let re = Regex::new(r" *([(),]) *").unwrap();
    let sql = re.replace_all(&sql, "$1");

    // Remove unnecessary quotes from identifiers
    let re = Regex::new(r#""(\w+)""#).unwrap();
    let sql = re.replace_all(&sql, "$1");

    sql.trim().to_string()
}

#[instrument(skip(pool))]
pub async fn sync_schema(
    pool: Pool<Sqlite>,
    target_schema: &str,
    allow_deletions: bool,
) -> Result<u32, AppError> {
    SchemaSync::new(pool, target_schema, allow_deletions).run().await
}
