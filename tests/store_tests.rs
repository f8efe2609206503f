//! Integration tests for the SQLite template store.

use rusqlite::params;
use serde_json::{Value, json};
use template_audit::db::{
    Database, SequenceRepair, TemplateStore, plan_sequence_repair,
};
use template_audit::types::TemplateFilter;

/// Helper to create a fresh in-memory database for testing.
fn setup_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn insert_template(db: &Database, id: i64, name: &str, category: &str, prompt: &str, inputs: &Value) {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO templates (id, name, category, prompt_template, inputs)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![id, name, category, prompt, inputs.to_string()],
        )?;
        Ok(())
    })
    .expect("Failed to insert template");
}

fn insert_saved_prompt(db: &Database, id: Option<i64>) -> i64 {
    db.with_conn(|conn| {
        conn.execute(
            "INSERT INTO saved_prompts (id, content) VALUES (?1, 'x')",
            params![id],
        )?;
        Ok(conn.last_insert_rowid())
    })
    .expect("Failed to insert saved prompt")
}

fn force_sequence(db: &Database, table: &str, seq: i64) {
    db.with_conn(|conn| {
        conn.execute(
            "UPDATE sqlite_sequence SET seq = ?2 WHERE name = ?1",
            params![table, seq],
        )?;
        Ok(())
    })
    .expect("Failed to set sequence");
}

mod template_tests {
    use super::*;

    #[tokio::test]
    async fn list_filters_and_orders_by_id() {
        let db = setup_db();
        insert_template(&db, 3, "Hashtags", "social", "a", &json!([]));
        insert_template(&db, 1, "Pinterest Descriptions", "social", "b", &json!([]));
        insert_template(&db, 2, "Cover Letter", "career", "c", &json!([]));

        let all = db.list_templates(&TemplateFilter::default()).await.unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![1, 2, 3]);

        let social = db
            .list_templates(&TemplateFilter {
                category: Some("social".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(social.len(), 2);

        let named = db
            .list_templates(&TemplateFilter::by_name("Cover Letter"))
            .await
            .unwrap();
        assert_eq!(named.len(), 1);
        assert_eq!(named[0].id, 2);
    }

    #[tokio::test]
    async fn update_then_read_round_trips() {
        let db = setup_db();
        insert_template(&db, 7, "Hashtags", "social", "Add 10 hashtags", &json!([]));

        let prompt = "Add {{hashtag_count}} hashtags about {{topic}}'s \"niche\"\nThanks";
        let inputs = json!([
            {"name": "topic", "type": "text", "label": "Topic"},
            {"name": "hashtag_count", "type": "number", "default": 10, "required": true}
        ]);

        assert!(db.update_template(7, prompt, &inputs).await.unwrap());

        let stored = db.get_template(7).await.unwrap().unwrap();
        assert_eq!(stored.prompt_template, prompt);
        assert_eq!(stored.inputs, inputs);
        assert!(stored.updated_at.is_some());
    }

    #[tokio::test]
    async fn stored_inputs_keep_their_key_order() {
        let db = setup_db();
        insert_template(&db, 8, "Captions", "social", "Write 5 captions", &json!([]));

        let inputs = json!([
            {"name": "total_posts", "type": "number", "label": "Posts", "default": 5}
        ]);
        assert!(db.update_template(8, "Write {{total_posts}} captions", &inputs).await.unwrap());

        let raw: String = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT inputs FROM templates WHERE id = 8", [], |row| {
                    row.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(
            raw,
            r#"[{"name":"total_posts","type":"number","label":"Posts","default":5}]"#
        );
    }

    #[tokio::test]
    async fn unreadable_updated_at_reads_as_unset() {
        let db = setup_db();
        assert_eq!(db.backend(), "sqlite");
        insert_template(&db, 9, "Hashtags", "social", "Add 10 hashtags", &json!([]));
        db.with_conn(|conn| {
            conn.execute("UPDATE templates SET updated_at = 'not a date' WHERE id = 9", [])?;
            Ok(())
        })
        .unwrap();

        let stored = db.get_template(9).await.unwrap().unwrap();
        assert_eq!(stored.prompt_template, "Add 10 hashtags");
        assert!(stored.updated_at.is_none());
    }

    #[tokio::test]
    async fn update_of_missing_row_reports_false() {
        let db = setup_db();
        assert!(!db.update_template(99, "x", &json!([])).await.unwrap());
        assert!(db.get_template(99).await.unwrap().is_none());
    }
}

mod sequence_tests {
    use super::*;

    #[tokio::test]
    async fn lagging_sequence_is_advanced_past_max_id() {
        let db = setup_db();
        insert_saved_prompt(&db, Some(42));
        force_sequence(&db, "saved_prompts", 40);

        let state = db.sequence_state("saved_prompts").await.unwrap();
        assert_eq!(state.max_id, Some(42));
        assert_eq!(state.last_value, 40);

        let repair = plan_sequence_repair(&state);
        assert_eq!(repair, SequenceRepair::Advance { next: 43 });

        db.set_sequence_next("saved_prompts", 43).await.unwrap();
        assert_eq!(insert_saved_prompt(&db, None), 43);
    }

    #[tokio::test]
    async fn sequence_ahead_of_max_id_is_left_alone() {
        let db = setup_db();
        insert_saved_prompt(&db, Some(10));
        force_sequence(&db, "saved_prompts", 40);

        let state = db.sequence_state("saved_prompts").await.unwrap();
        assert_eq!(plan_sequence_repair(&state), SequenceRepair::InSync);
        assert_eq!(insert_saved_prompt(&db, None), 41);
    }

    #[tokio::test]
    async fn empty_table_is_in_sync() {
        let db = setup_db();
        let state = db.sequence_state("saved_prompts").await.unwrap();
        assert_eq!(state.max_id, None);
        assert_eq!(state.last_value, 0);
        assert_eq!(plan_sequence_repair(&state), SequenceRepair::InSync);
    }

    #[tokio::test]
    async fn invalid_table_name_is_rejected() {
        let db = setup_db();
        assert!(db.sequence_state("saved_prompts; DROP TABLE templates").await.is_err());
        assert!(db.set_sequence_next("bad name", 1).await.is_err());
    }
}
