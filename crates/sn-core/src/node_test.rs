use super::*;

fn view(name: &str, deps: &[&str], spec: &str) -> ManagedNode {
    ManagedNode::View(NodeSpec::new(name, deps, spec))
}

#[test]
fn type_node_statements() {
    let node = ManagedNode::Type(NodeSpec::new(
        "derived.answer",
        &[],
        "(value text, index int)",
    ));

    assert_eq!(
        node.create(),
        vec!["create type derived.answer as (value text, index int);".to_string()]
    );
    assert_eq!(node.refresh(), None);
    assert_eq!(node.delete(), "drop type if exists derived.answer cascade;");
    assert_eq!(node.kind(), NodeKind::Type);
}

#[test]
fn view_node_statements() {
    let node = view("derived.a", &[], "select 1 as x");

    assert_eq!(
        node.create(),
        vec!["create view derived.a as select 1 as x;".to_string()]
    );
    assert_eq!(node.refresh(), None);
    assert_eq!(node.delete(), drop_table_like("derived.a"));
}

#[test]
fn materialized_view_node_statements() {
    let node = ManagedNode::MaterializedView(NodeSpec::new(
        "derived.b",
        &["derived.a"],
        "select * from derived.a",
    ));

    assert_eq!(
        node.create(),
        vec!["create materialized view derived.b as select * from derived.a;".to_string()]
    );
    assert_eq!(
        node.refresh(),
        Some(vec!["refresh materialized view derived.b;".to_string()])
    );
    assert_eq!(node.delete(), drop_table_like("derived.b"));
    assert_eq!(node.deps(), &[NodeName::new("derived.a")]);
}

#[test]
fn table_node_adds_surrogate_key_and_timestamp() {
    let node = ManagedNode::Table {
        spec: NodeSpec::new("derived.t", &[], "select * from raw.t"),
        delete_stale_rows: "delete from derived.t where false;".to_string(),
        insert_new_rows: "insert into derived.t select * from raw.t where false;".to_string(),
    };

    let create = node.create();
    assert_eq!(create.len(), 3);
    assert_eq!(create[0], "create table derived.t as select * from raw.t;");
    assert_eq!(
        create[1],
        "alter table derived.t add column id serial primary key;"
    );
    assert_eq!(
        create[2],
        "alter table derived.t add column \"createdAt\" timestamp default now();"
    );
}

#[test]
fn table_node_refresh_is_delete_then_insert() {
    let node = ManagedNode::Table {
        spec: NodeSpec::new("derived.t", &[], "select * from raw.t"),
        delete_stale_rows: "DELETE STALE".to_string(),
        insert_new_rows: "INSERT NEW".to_string(),
    };

    assert_eq!(
        node.refresh(),
        Some(vec!["DELETE STALE".to_string(), "INSERT NEW".to_string()])
    );
    assert_eq!(node.delete(), drop_table_like("derived.t"));
}

#[test]
fn source_table_creates_like_table() {
    let spec = NodeSpec::new("derived.s", &[], "select docid, updated from raw.docs");
    let source = ManagedNode::SourceTable {
        spec: spec.clone(),
        source: SourceRef::new("raw.docs", "docid", "updated"),
    };
    let table = ManagedNode::Table {
        spec,
        delete_stale_rows: String::new(),
        insert_new_rows: String::new(),
    };

    assert_eq!(source.create(), table.create());
    assert_eq!(source.kind(), NodeKind::SourceTable);
}

#[test]
fn source_table_refresh_is_derived_from_source() {
    let source = SourceRef::new("raw.docs", "docid", "updated");
    let node = ManagedNode::SourceTable {
        spec: NodeSpec::new("derived.s", &[], "select docid, updated from raw.docs"),
        source: source.clone(),
    };

    let refresh = node.refresh().unwrap();
    assert_eq!(refresh.len(), 2);
    assert_eq!(refresh[0], source.delete_stale_rows("derived.s"));
    assert_eq!(
        refresh[1],
        source.insert_new_rows("derived.s", "select docid, updated from raw.docs")
    );
}

#[test]
fn relation_kinds_share_one_delete_script() {
    // A view and a materialized view under the same name must clean up identically
    let as_view = view("derived.x", &[], "select 1");
    let as_matview = ManagedNode::MaterializedView(NodeSpec::new("derived.x", &[], "select 1"));
    assert_eq!(as_view.delete(), as_matview.delete());
}

#[test]
fn kind_display_names() {
    assert_eq!(NodeKind::Type.to_string(), "type");
    assert_eq!(NodeKind::MaterializedView.to_string(), "materialized_view");
    assert_eq!(NodeKind::SourceTable.to_string(), "source_table");
}

#[test]
fn kind_deserializes_snake_case() {
    let kind: NodeKind = serde_yaml::from_str("materialized_view").unwrap();
    assert_eq!(kind, NodeKind::MaterializedView);
    let kind: NodeKind = serde_yaml::from_str("source_table").unwrap();
    assert_eq!(kind, NodeKind::SourceTable);
}
