//! Integration tests for the subcommand drivers against an in-memory store.

use rusqlite::params;
use serde_json::{Value, json};
use template_audit::cli::FilterArgs;
use template_audit::cli::check::CheckArgs;
use template_audit::cli::dump::DumpArgs;
use template_audit::cli::fix::FixArgs;
use template_audit::cli::replace::ReplaceArgs;
use template_audit::cli::scan::ScanArgs;
use template_audit::cli::sequence::SequenceArgs;
use template_audit::cli::show::ShowArgs;
use template_audit::commands::{
    run_check, run_dump_sql, run_fix, run_repair_sequence, run_replace, run_scan, run_show,
};
use template_audit::config::Config;
use template_audit::db::{Database, SequenceRepair, TemplateStore};
use template_audit::error::AuditError;
use template_audit::format::ReportFormat;
use template_audit::sql_dump::SqlDialect;
use template_audit::types::InputField;

fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn insert_template(db: &Database, id: i64, name: &str, prompt: &str, inputs: &Value) {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO templates (id, name, category, prompt_template, inputs)
             VALUES (?1, ?2, 'social', ?3, ?4)",
            params![id, name, prompt, inputs.to_string()],
        )?;
        Ok(())
    })
    .expect("Failed to insert template");
}

/// One correct template, one fixable, one fixable with an existing field.
fn seeded_db() -> Database {
    let db = setup_db();
    insert_template(
        &db,
        1,
        "Captions",
        "Write {{total_posts}} captions about {{topic}}",
        &json!([
            {"name": "topic", "type": "text"},
            {"name": "total_posts", "type": "number"}
        ]),
    );
    insert_template(
        &db,
        2,
        "TikTok Ideas",
        "Give me 7 TikTok video ideas about {{topic}}",
        &json!([{"name": "topic", "type": "text"}]),
    );
    insert_template(
        &db,
        3,
        "Hashtags",
        "Add 10 hashtags about {{topic}}",
        &json!([
            {"name": "topic", "type": "text"},
            {"name": "hashtag_count", "type": "number", "label": "Hashtags"}
        ]),
    );
    db
}

mod check_tests {
    use super::*;

    #[tokio::test]
    async fn tally_counts_correct_templates() {
        let db = seeded_db();
        let args = CheckArgs {
            format: ReportFormat::Summary,
            ..Default::default()
        };
        let summary = run_check(&db, &Config::default(), &args).await.unwrap();

        // Template 2 has no number field, so it passes the tally.
        assert_eq!(summary.total, 3);
        assert_eq!(summary.correct, 2);
        assert_eq!(summary.with_hardcoded, 2);
        assert!(!summary.all_correct());
    }

    #[tokio::test]
    async fn filter_limits_the_run() {
        let db = seeded_db();
        let args = CheckArgs {
            filter: FilterArgs {
                name: Some("Captions".into()),
                ..Default::default()
            },
            format: ReportFormat::Json,
            ..Default::default()
        };
        let summary = run_check(&db, &Config::default(), &args).await.unwrap();
        assert_eq!(summary.total, 1);
        assert!(summary.all_correct());
    }
}

mod scan_tests {
    use super::*;

    #[tokio::test]
    async fn counts_flagged_templates() {
        let db = seeded_db();
        let summary = run_scan(&db, &Config::default(), &ScanArgs::default())
            .await
            .unwrap();
        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.flagged, 2);
        assert_eq!(summary.findings, 2);
    }
}

mod show_tests {
    use super::*;

    #[tokio::test]
    async fn missing_template_is_not_an_error() {
        let db = seeded_db();
        let args = ShowArgs {
            id: Some(404),
            name: None,
        };
        assert_eq!(run_show(&db, &Config::default(), &args).await.unwrap(), 0);

        let args = ShowArgs {
            id: None,
            name: Some("Hashtags".into()),
        };
        assert_eq!(run_show(&db, &Config::default(), &args).await.unwrap(), 1);
    }
}

mod fix_tests {
    use super::*;

    #[tokio::test]
    async fn dry_run_writes_nothing() {
        let db = seeded_db();
        let args = FixArgs {
            dry_run: true,
            ..Default::default()
        };
        let summary = run_fix(&db, &Config::default(), &args).await.unwrap();
        assert_eq!(summary.planned, 2);
        assert_eq!(summary.applied, 0);

        let untouched = db.get_template(2).await.unwrap().unwrap();
        assert_eq!(
            untouched.prompt_template,
            "Give me 7 TikTok video ideas about {{topic}}"
        );
    }

    #[tokio::test]
    async fn fix_rewrites_text_and_appends_fields() {
        let db = seeded_db();
        let summary = run_fix(&db, &Config::default(), &FixArgs::default())
            .await
            .unwrap();
        assert_eq!(summary.scanned, 3);
        assert_eq!(summary.applied, 2);
        assert_eq!(summary.failed, 0);

        let tiktok = db.get_template(2).await.unwrap().unwrap();
        assert_eq!(
            tiktok.prompt_template,
            "Give me {{total_posts}} TikTok video ideas about {{topic}}"
        );
        let fields = InputField::parse_list(&tiktok.inputs);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[1].name, "total_posts");
        assert_eq!(fields[1].default_value, Some(json!(7)));
        assert!(fields[1].required);

        let hashtags = db.get_template(3).await.unwrap().unwrap();
        assert_eq!(
            hashtags.prompt_template,
            "Add {{hashtag_count}} hashtags about {{topic}}"
        );
        assert_eq!(hashtags.inputs.as_array().unwrap().len(), 2);

        // A second pass finds nothing left to fix.
        let again = run_fix(&db, &Config::default(), &FixArgs::default())
            .await
            .unwrap();
        assert_eq!(again.planned, 0);
    }

    #[tokio::test]
    async fn failed_row_is_counted_and_the_rest_are_fixed() {
        let db = seeded_db();
        insert_template(&db, 4, "Pins", "Write 5 Pinterest descriptions", &json!([]));
        db.with_conn(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_template_two BEFORE UPDATE ON templates
                 WHEN OLD.id = 2
                 BEGIN SELECT RAISE(ABORT, 'template 2 is locked'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        let summary = run_fix(&db, &Config::default(), &FixArgs::default())
            .await
            .unwrap();
        assert_eq!(summary.scanned, 4);
        assert_eq!(summary.planned, 3);
        assert_eq!(summary.applied, 2);
        assert_eq!(summary.failed, 1);

        let locked = db.get_template(2).await.unwrap().unwrap();
        assert_eq!(
            locked.prompt_template,
            "Give me 7 TikTok video ideas about {{topic}}"
        );
        let hashtags = db.get_template(3).await.unwrap().unwrap();
        assert_eq!(
            hashtags.prompt_template,
            "Add {{hashtag_count}} hashtags about {{topic}}"
        );
        let pins = db.get_template(4).await.unwrap().unwrap();
        assert_eq!(pins.prompt_template, "Write {{total_posts}} Pinterest descriptions");
    }
}

mod replace_tests {
    use super::*;

    fn replacement_file(dir: &tempfile::TempDir, name: &str) -> std::path::PathBuf {
        let path = dir.path().join("replacement.yaml");
        std::fs::write(
            &path,
            format!(
                "name: {}\nprompt_template: \"Write {{{{total_posts}}}} captions for {{{{brand}}}}\"\ninputs:\n  - name: brand\n    type: text\n  - name: total_posts\n    type: number\n    default: 3\n",
                name
            ),
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn replaces_every_template_with_the_name() {
        let db = seeded_db();
        let dir = tempfile::TempDir::new().unwrap();
        let args = ReplaceArgs {
            file: replacement_file(&dir, "Captions"),
            id: None,
            dry_run: false,
        };

        let summary = run_replace(&db, &Config::default(), &args).await.unwrap();
        assert_eq!(summary.matched, 1);
        assert_eq!(summary.updated, 1);

        let stored = db.get_template(1).await.unwrap().unwrap();
        assert_eq!(stored.prompt_template, "Write {{total_posts}} captions for {{brand}}");
        assert_eq!(stored.inputs[1]["default"], json!(3));
    }

    #[tokio::test]
    async fn dry_run_leaves_row_unchanged() {
        let db = seeded_db();
        let dir = tempfile::TempDir::new().unwrap();
        let args = ReplaceArgs {
            file: replacement_file(&dir, "Captions"),
            id: None,
            dry_run: true,
        };

        let summary = run_replace(&db, &Config::default(), &args).await.unwrap();
        assert_eq!(summary.updated, 0);
        let stored = db.get_template(1).await.unwrap().unwrap();
        assert_eq!(stored.prompt_template, "Write {{total_posts}} captions about {{topic}}");
    }

    #[tokio::test]
    async fn unknown_name_is_not_found() {
        let db = seeded_db();
        let dir = tempfile::TempDir::new().unwrap();
        let args = ReplaceArgs {
            file: replacement_file(&dir, "Nope"),
            id: None,
            dry_run: false,
        };

        let err = run_replace(&db, &Config::default(), &args).await.unwrap_err();
        let audit = err.downcast_ref::<AuditError>().unwrap();
        assert!(audit.is_not_found());
    }
}

mod sequence_tests {
    use super::*;

    #[tokio::test]
    async fn repair_advances_and_dry_run_does_not() {
        let db = setup_db();
        db.with_conn(|conn| {
            conn.execute("INSERT INTO saved_prompts (id) VALUES (42)", [])?;
            conn.execute(
                "UPDATE sqlite_sequence SET seq = 40 WHERE name = 'saved_prompts'",
                [],
            )?;
            Ok(())
        })
        .unwrap();

        let dry = SequenceArgs {
            table: None,
            dry_run: true,
        };
        let outcome = run_repair_sequence(&db, &Config::default(), &dry)
            .await
            .unwrap();
        assert_eq!(outcome.repair, SequenceRepair::Advance { next: 43 });
        assert!(outcome.after.is_none());
        assert_eq!(db.sequence_state("saved_prompts").await.unwrap().last_value, 40);

        let outcome = run_repair_sequence(&db, &Config::default(), &SequenceArgs::default())
            .await
            .unwrap();
        let after = outcome.after.unwrap();
        assert_eq!(after.last_value, 42);
        assert_eq!(after.max_id, Some(42));
    }
}

mod dump_tests {
    use super::*;

    #[tokio::test]
    async fn dumps_pending_fixes_only() {
        let db = seeded_db();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fixes.sql");
        let args = DumpArgs {
            output: Some(path.clone()),
            dialect: Some(SqlDialect::Postgres),
            ..Default::default()
        };

        let summary = run_dump_sql(&db, &Config::default(), &args).await.unwrap();
        assert_eq!(summary.statements, 2);

        let sql = std::fs::read_to_string(&path).unwrap();
        assert!(sql.contains("WHERE id = 2;"));
        assert!(sql.contains("WHERE id = 3;"));
        assert!(!sql.contains("WHERE id = 1;"));
        assert!(sql.contains("'Give me {{total_posts}} TikTok video ideas about {{topic}}'"));
        assert!(sql.contains("::jsonb"));

        // Dumping never writes to the store.
        let untouched = db.get_template(2).await.unwrap().unwrap();
        assert!(untouched.prompt_template.contains("7 TikTok"));
    }

    #[tokio::test]
    async fn all_dumps_every_template() {
        let db = seeded_db();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("all.sql");
        let args = DumpArgs {
            output: Some(path.clone()),
            all: true,
            dialect: Some(SqlDialect::Sqlite),
            ..Default::default()
        };

        let summary = run_dump_sql(&db, &Config::default(), &args).await.unwrap();
        assert_eq!(summary.statements, 3);
        let sql = std::fs::read_to_string(&path).unwrap();
        assert!(sql.contains("CURRENT_TIMESTAMP"));
        assert!(sql.trim_end().ends_with("COMMIT;"));
    }
}
