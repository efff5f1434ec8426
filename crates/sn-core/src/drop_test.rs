use super::*;

#[test]
fn test_probes_every_relation_kind() {
    let sql = drop_table_like("derived.surveys");

    assert!(sql.contains("select * from pg_tables"));
    assert!(sql.contains("tablename = 'surveys'"));
    assert!(sql.contains("select * from pg_views"));
    assert!(sql.contains("viewname = 'surveys'"));
    assert!(sql.contains("select * from pg_matviews"));
    assert!(sql.contains("matviewname = 'surveys'"));
    assert_eq!(sql.matches("schemaname = 'derived'").count(), 3);
}

#[test]
fn test_drops_with_cascade() {
    let sql = drop_table_like("derived.surveys");

    assert!(sql.contains("drop table if exists derived.surveys cascade;"));
    assert!(sql.contains("drop view if exists derived.surveys cascade;"));
    assert!(sql.contains("drop materialized view if exists derived.surveys cascade;"));
}

#[test]
fn test_is_single_do_block() {
    let sql = drop_table_like("derived.surveys");

    assert!(sql.starts_with("do $$ begin"));
    assert!(sql.ends_with("end $$;"));
    assert_eq!(sql.matches("end if;").count(), 3);
}

#[test]
fn test_unqualified_name_uses_public_schema() {
    let sql = drop_table_like("surveys");

    assert!(sql.contains("schemaname = 'public'"));
    assert!(sql.contains("drop view if exists public.surveys cascade;"));
}

#[test]
fn test_escapes_catalog_literals() {
    let sql = drop_table_like("o'hare.t");
    assert!(sql.contains("schemaname = 'o''hare'"));
}

#[test]
fn test_drop_order_is_table_view_matview() {
    let sql = drop_table_like("s.n");
    let table = sql.find("drop table").unwrap();
    let view = sql.find("drop view").unwrap();
    let matview = sql.find("drop materialized view").unwrap();
    assert!(table < view && view < matview);
}
