//! `migrate` command: apply, roll back, inspect or rebuild the schema.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Schema changes stay under the operator's control here
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Cannot reach the shop database: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(failed("apply"))?;
            tracing::info!("Shop schema is up to date");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(failed("roll back"))?;
            tracing::info!("Rolled back the most recent schema change");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(failed("inspect"))?;
            print!("{}", render_status(&status));
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping every shop table, including orders and tokens");
            db.fresh_migrations().await.map_err(failed("rebuild"))?;
            tracing::info!("Shop schema rebuilt from scratch");
        }
    }

    Ok(())
}

fn failed(action: &'static str) -> impl Fn(DbErr) -> AppError {
    move |e| {
        tracing::error!(action, error = %e, "Migration step failed");
        AppError::internal(format!("Could not {} migrations: {}", action, e))
    }
}

/// One line per migration plus a pending count.
fn render_status(status: &[(String, bool)]) -> String {
    let pending = status.iter().filter(|(_, applied)| !applied).count();
    let mut out = String::new();
    for (name, applied) in status {
        let mark = if *applied { "applied" } else { "pending" };
        out.push_str(&format!("{:<60} {}\n", name, mark));
    }
    out.push_str(&format!("{} of {} pending\n", pending, status.len()));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_status_counts_pending() {
        let status = vec![
            ("m20240101_000001_create_users_table".to_string(), true),
            ("m20240101_000002_create_catalog_tables".to_string(), false),
        ];
        let rendered = render_status(&status);

        assert!(rendered.contains("create_users_table"));
        assert!(rendered.lines().nth(1).is_some_and(|l| l.ends_with("pending")));
        assert!(rendered.ends_with("1 of 2 pending\n"));
    }
}
