//! PostgreSQL integration tests for the refresh engine
//!
//! Ignored by default. Run with a disposable database:
//!
//! ```text
//! SQLNODE_TEST_DATABASE_URL=postgres://postgres@localhost/sqlnode_test \
//!     cargo test -p sn-refresh --test postgres_tests -- --ignored
//! ```
//!
//! Each test works inside its own schema and drops it when done.

use sn_core::{ManagedNode, NodeSpec, Pipeline, PipelineName, SourceRef, StateConfig};
use sn_db::{DatabaseCore, PostgresBackend, StateTables};
use sn_refresh::{NodeAction, Refresher};
use tokio_postgres::{Client, NoTls};

const URL_VAR: &str = "SQLNODE_TEST_DATABASE_URL";

struct Harness {
    schema: String,
    client: Client,
    backend: PostgresBackend,
}

impl Harness {
    async fn new(label: &str) -> Option<Self> {
        let url = match std::env::var(URL_VAR) {
            Ok(url) => url,
            Err(_) => {
                eprintln!("{} not set, skipping", URL_VAR);
                return None;
            }
        };
        let schema = format!("sn_it_{}_{}", label, std::process::id());

        let (client, connection) = tokio_postgres::connect(&url, NoTls).await.unwrap();
        tokio::spawn(async move {
            let _ = connection.await;
        });

        let tables = StateTables::from(&StateConfig {
            schema: schema.clone(),
            ..StateConfig::default()
        });
        client
            .batch_execute(&format!(
                "drop schema if exists {schema} cascade; create schema {schema}; {ddl}\n\
                 insert into {pipelines} (name) values ('cough');",
                schema = schema,
                ddl = tables.ddl(),
                pipelines = tables.pipelines,
            ))
            .await
            .unwrap();

        let backend = PostgresBackend::connect(&url, tables).await.unwrap();
        Some(Self {
            schema,
            client,
            backend,
        })
    }

    fn name(&self, object: &str) -> String {
        format!("{}.{}", self.schema, object)
    }

    fn pipeline(&self, nodes: Vec<ManagedNode>) -> Pipeline {
        Pipeline::new(PipelineName::new("cough"), nodes).unwrap()
    }

    async fn refresh(&self, pipeline: &Pipeline) -> sn_refresh::RefreshSummary {
        Refresher::new(&self.backend).refresh(pipeline).await.unwrap()
    }

    async fn count(&self, sql: &str) -> i64 {
        self.client.query_one(sql, &[]).await.unwrap().get(0)
    }

    async fn teardown(self) {
        self.client
            .batch_execute(&format!("drop schema if exists {} cascade;", self.schema))
            .await
            .unwrap();
    }
}

#[tokio::test]
#[ignore]
async fn test_source_table_differential_sync() {
    let Some(h) = Harness::new("sync").await else {
        return;
    };
    let docs = h.name("docs");
    let flat = h.name("flat");

    h.backend
        .execute(&format!(
            "create table {docs} (id int primary key, body text not null, \"updatedAt\" timestamp not null);\n\
             insert into {docs} values\n\
               (1, 'one', '2024-01-01'),\n\
               (2, 'two', '2024-01-01'),\n\
               (3, 'three', '2024-01-01');",
            docs = docs
        ))
        .await
        .unwrap();

    let pipeline = h.pipeline(vec![ManagedNode::SourceTable {
        spec: NodeSpec::new(
            flat.clone(),
            &[],
            format!(
                "select id as docid, body, \"updatedAt\" as captured from {}",
                docs
            ),
        ),
        source: SourceRef::new(docs.clone(), "docid", "captured"),
    }]);

    h.refresh(&pipeline).await;
    assert_eq!(h.count(&format!("select count(*) from {}", flat)).await, 3);
    let untouched_id: i32 = h
        .client
        .query_one(&format!("select id from {} where docid = 3", flat), &[])
        .await
        .unwrap()
        .get(0);

    h.backend
        .execute(&format!(
            "delete from {docs} where id = 1;\n\
             update {docs} set body = 'two v2', \"updatedAt\" = '2024-02-01' where id = 2;\n\
             insert into {docs} values (4, 'four', '2024-02-01');",
            docs = docs
        ))
        .await
        .unwrap();

    let summary = h.refresh(&pipeline).await;
    assert_eq!(summary.nodes[0].action, NodeAction::Refresh);

    let rows = h
        .client
        .query(&format!("select docid, body from {} order by docid", flat), &[])
        .await
        .unwrap();
    let rows: Vec<(i32, String)> = rows.iter().map(|r| (r.get(0), r.get(1))).collect();
    assert_eq!(
        rows,
        vec![
            (2, "two v2".to_string()),
            (3, "three".to_string()),
            (4, "four".to_string()),
        ]
    );

    // The untouched row was neither deleted nor reinserted
    let still_id: i32 = h
        .client
        .query_one(&format!("select id from {} where docid = 3", flat), &[])
        .await
        .unwrap()
        .get(0);
    assert_eq!(still_id, untouched_id);

    h.teardown().await;
}

#[tokio::test]
#[ignore]
async fn test_kind_migration_and_removal() {
    let Some(h) = Harness::new("kinds").await else {
        return;
    };
    let a = h.name("a");
    let b = h.name("b");
    let schema = h.schema.clone();

    let as_view = h.pipeline(vec![
        ManagedNode::View(NodeSpec::new(a.clone(), &[], "select 1 as x")),
        ManagedNode::MaterializedView(NodeSpec::new(
            b.clone(),
            &[a.as_str()],
            format!("select * from {}", a),
        )),
    ]);
    h.refresh(&as_view).await;
    let views = format!(
        "select count(*) from pg_views where schemaname = '{}' and viewname = 'a'",
        schema
    );
    assert_eq!(h.count(&views).await, 1);

    // Same name, promoted to a materialized view; the dependent matview is rebuilt too
    let as_matview = h.pipeline(vec![
        ManagedNode::MaterializedView(NodeSpec::new(a.clone(), &[], "select 1 as x")),
        ManagedNode::MaterializedView(NodeSpec::new(
            b.clone(),
            &[a.as_str()],
            format!("select * from {}", a),
        )),
    ]);
    let summary = h.refresh(&as_matview).await;
    assert_eq!(summary.count(NodeAction::Recreate), 2);
    assert_eq!(h.count(&views).await, 0);
    let matviews = format!(
        "select count(*) from pg_matviews where schemaname = '{}'",
        schema
    );
    assert_eq!(h.count(&matviews).await, 2);

    // Unchanged run only refreshes
    let summary = h.refresh(&as_matview).await;
    assert_eq!(summary.count(NodeAction::Refresh), 2);

    // Dropping b from the declaration removes it exactly once
    let only_a = h.pipeline(vec![ManagedNode::MaterializedView(NodeSpec::new(
        a.clone(),
        &[],
        "select 1 as x",
    ))]);
    let summary = h.refresh(&only_a).await;
    assert_eq!(summary.removed, vec![b.clone()]);
    assert_eq!(h.count(&matviews).await, 1);
    let state_rows = h
        .count(&format!("select count(*) from {}.data_nodes", schema))
        .await;
    assert_eq!(state_rows, 1);

    let summary = h.refresh(&only_a).await;
    assert!(summary.removed.is_empty());

    h.teardown().await;
}

#[tokio::test]
#[ignore]
async fn test_table_node_gets_surrogate_columns() {
    let Some(h) = Harness::new("table").await else {
        return;
    };
    let t = h.name("t");

    let pipeline = h.pipeline(vec![ManagedNode::Table {
        spec: NodeSpec::new(t.clone(), &[], "select 1 as x"),
        delete_stale_rows: format!("delete from {} where x > 1;", t),
        insert_new_rows: format!("insert into {} (x) select 2;", t),
    }]);
    h.refresh(&pipeline).await;

    let columns = h
        .count(&format!(
            "select count(*) from information_schema.columns where table_schema = '{}' and table_name = 't' and column_name in ('id', 'createdAt')",
            h.schema
        ))
        .await;
    assert_eq!(columns, 2);

    h.refresh(&pipeline).await;
    assert_eq!(h.count(&format!("select count(*) from {}", t)).await, 2);

    h.teardown().await;
}

#[tokio::test]
#[ignore]
async fn test_dropped_transaction_does_not_capture_later_statements() {
    let Some(h) = Harness::new("abandon").await else {
        return;
    };
    let lost = h.name("lost");
    let kept = h.name("kept");

    {
        let mut tx = h.backend.begin().await.unwrap();
        tx.execute(&format!("create table {} (id int)", lost))
            .await
            .unwrap();
    }
    h.backend
        .execute(&format!("create table {} (id int)", kept))
        .await
        .unwrap();

    let tables = |name: &str| {
        format!(
            "select count(*) from pg_tables where schemaname = '{}' and tablename = '{}'",
            h.schema, name
        )
    };
    assert_eq!(h.count(&tables("lost")).await, 0);
    assert_eq!(h.count(&tables("kept")).await, 1);

    h.teardown().await;
}
