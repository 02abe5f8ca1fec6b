//! End-to-end tests for the prepare pipeline: skip-sharding fast path,
//! sharded routing and rewriting, read/write splitting, and parameter
//! grouping.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;

use strata_core::config::ClusterConfig;
use strata_core::SqlValue;
use strata_prepare::{PrepareEngine, PrepareError};
use strata_route::{LoadBalanceStrategy, RoundRobinStrategy, RoutingState};

const SHARDED_SINGLE_SOURCE: &str = r#"
data_sources:
  ds_0: { url: "mysql://db0/orders" }

sharding:
  t_order:
    data_nodes: ["ds_0.t_order_0", "ds_0.t_order_1"]
    sharding_column: order_id
"#;

const SHARDED_TWO_SOURCES: &str = r#"
data_sources:
  ds_0: { url: "mysql://db0/orders" }
  ds_1: { url: "mysql://db1/orders" }

sharding:
  t_order:
    data_nodes: ["ds_0.t_order_0", "ds_1.t_order_1"]
    sharding_column: order_id
"#;

const SHARDED_WITH_REPLICAS: &str = r#"
data_sources:
  ds_master: { url: "mysql://db-master/orders" }
  ds_replica_0: { url: "mysql://db-replica-0/orders" }
  ds_replica_1: { url: "mysql://db-replica-1/orders" }

sharding:
  t_order:
    data_nodes: ["ds_0.t_order_0", "ds_0.t_order_1"]
    sharding_column: order_id

master_replica:
  ds_0:
    master: ds_master
    replicas: [ds_replica_0, ds_replica_1]
    load_balance: round_robin
"#;

fn engine(yaml: &str) -> PrepareEngine {
    let config = ClusterConfig::from_yaml(yaml).unwrap();
    PrepareEngine::from_config(&config).unwrap()
}

#[test]
fn unsharded_statement_takes_fast_path() {
    let engine = engine(SHARDED_SINGLE_SOURCE);
    let mut state = RoutingState::new();

    let sql = "SELECT * FROM t_user WHERE id = ?";
    let context = engine.prepare(sql, &[SqlValue::Int(7)], &mut state).unwrap();

    assert!(context.skip_sharding);
    assert!(state.is_skip_sharding());
    let units = context.execution_units();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].data_source, "ds_0");
    // The fast path keeps the original text and parameters.
    assert_eq!(units[0].sql_unit.sql, sql);
    assert_eq!(units[0].sql_unit.parameters, vec![SqlValue::Int(7)]);
}

#[test]
fn fast_path_with_replicas_routes_reads_to_one_replica() {
    let engine = engine(SHARDED_WITH_REPLICAS);
    let mut state = RoutingState::new();

    let context = engine
        .prepare("SELECT * FROM t_user", &[], &mut state)
        .unwrap();
    assert!(context.skip_sharding);
    let units = context.execution_units();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].data_source, "ds_replica_0");
}

#[test]
fn fast_path_write_goes_to_master_and_sticks() {
    let engine = engine(SHARDED_WITH_REPLICAS);
    let mut state = RoutingState::new();

    let write = engine
        .prepare("UPDATE t_user SET name = 'x' WHERE id = 1", &[], &mut state)
        .unwrap();
    assert_eq!(write.execution_units()[0].data_source, "ds_master");

    // The scope already touched the master, later reads stick to it.
    let read = engine
        .prepare("SELECT * FROM t_user", &[], &mut state)
        .unwrap();
    assert_eq!(read.execution_units()[0].data_source, "ds_master");

    state.clear();
    let fresh = engine
        .prepare("SELECT * FROM t_user", &[], &mut state)
        .unwrap();
    assert_eq!(fresh.execution_units()[0].data_source, "ds_replica_0");
}

#[test]
fn ambiguous_fast_path_route_is_rejected() {
    let engine = engine(SHARDED_TWO_SOURCES);
    let mut state = RoutingState::new();

    // Skips sharding, but neither zero-units-with-single-pool nor a single
    // unit holds: two pool members, no route units.
    let err = engine
        .prepare("SELECT * FROM t_user", &[], &mut state)
        .unwrap_err();
    match err {
        PrepareError::AmbiguousSkipRoute { sql, .. } => {
            assert_eq!(sql, "SELECT * FROM t_user");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn sharded_select_rewrites_table_name() {
    let engine = engine(SHARDED_TWO_SOURCES);
    let mut state = RoutingState::new();

    let context = engine
        .prepare("SELECT * FROM t_order WHERE order_id = 3", &[], &mut state)
        .unwrap();

    assert!(!context.skip_sharding);
    let units = context.execution_units();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].data_source, "ds_1");
    assert_eq!(
        units[0].sql_unit.sql,
        "SELECT * FROM t_order_1 WHERE order_id = 3"
    );
}

#[test]
fn sharded_select_without_predicate_fans_out() {
    let engine = engine(SHARDED_TWO_SOURCES);
    let mut state = RoutingState::new();

    let context = engine
        .prepare("SELECT * FROM t_order", &[], &mut state)
        .unwrap();
    let units = context.execution_units();
    assert_eq!(units.len(), 2);
    assert_eq!(units[0].sql_unit.sql, "SELECT * FROM t_order_0");
    assert_eq!(units[1].sql_unit.sql, "SELECT * FROM t_order_1");
}

#[test]
fn multi_row_insert_slices_parameters_and_rows_per_unit() {
    let engine = engine(SHARDED_TWO_SOURCES);
    let mut state = RoutingState::new();

    // order_id 1 and 3 land on ds_1, order_id 2 on ds_0.
    let sql = "INSERT INTO t_order (order_id, status) VALUES (?, ?), (?, ?), (?, ?)";
    let parameters = vec![
        SqlValue::Int(1),
        SqlValue::Text("a".into()),
        SqlValue::Int(2),
        SqlValue::Text("b".into()),
        SqlValue::Int(3),
        SqlValue::Text("c".into()),
    ];
    let context = engine.prepare(sql, &parameters, &mut state).unwrap();

    let units = context.execution_units();
    assert_eq!(units.len(), 2);

    let ds_1 = units.iter().find(|u| u.data_source == "ds_1").unwrap();
    assert_eq!(
        ds_1.sql_unit.sql,
        "INSERT INTO t_order_1 (order_id, status) VALUES (?, ?), (?, ?)"
    );
    assert_eq!(
        ds_1.sql_unit.parameters,
        vec![
            SqlValue::Int(1),
            SqlValue::Text("a".into()),
            SqlValue::Int(3),
            SqlValue::Text("c".into()),
        ]
    );

    let ds_0 = units.iter().find(|u| u.data_source == "ds_0").unwrap();
    assert_eq!(
        ds_0.sql_unit.sql,
        "INSERT INTO t_order_0 (order_id, status) VALUES (?, ?)"
    );
    assert_eq!(
        ds_0.sql_unit.parameters,
        vec![SqlValue::Int(2), SqlValue::Text("b".into())]
    );
}

#[test]
fn generated_keys_are_surfaced_per_row() {
    let yaml = r#"
data_sources:
  ds_0: { url: "mysql://db0/orders" }
  ds_1: { url: "mysql://db1/orders" }

sharding:
  t_order:
    data_nodes: ["ds_0.t_order_0", "ds_1.t_order_1"]
    sharding_column: order_id
    key_column: order_id
"#;
    let engine = engine(yaml);
    let mut state = RoutingState::new();

    let context = engine
        .prepare(
            "INSERT INTO t_order (status) VALUES ('a'), ('b'), ('c')",
            &[],
            &mut state,
        )
        .unwrap();
    assert_eq!(context.statement.generated_key_values.len(), 3);
}

#[test]
fn sharded_write_through_replicas_targets_master_shard() {
    let engine = engine(SHARDED_WITH_REPLICAS);
    let mut state = RoutingState::new();

    let context = engine
        .prepare(
            "INSERT INTO t_order (order_id, status) VALUES (?, ?)",
            &[SqlValue::Int(4), SqlValue::Text("a".into())],
            &mut state,
        )
        .unwrap();

    let units = context.execution_units();
    assert_eq!(units.len(), 1);
    // Sharding picked ds_0.t_order_0; the master/replica decorator rewrote
    // the data-source identity, the table mapping survived.
    assert_eq!(units[0].data_source, "ds_master");
    assert_eq!(
        units[0].sql_unit.sql,
        "INSERT INTO t_order_0 (order_id, status) VALUES (?, ?)"
    );
    assert!(state.is_master_visited());
}

#[test]
fn round_robin_selects_each_replica_exactly_once() {
    let strategy = Arc::new(RoundRobinStrategy::default());
    let replicas: Vec<String> = (0..4).map(|i| format!("ds_replica_{i}")).collect();
    let picks = Mutex::new(Vec::new());

    std::thread::scope(|scope| {
        for _ in 0..replicas.len() {
            scope.spawn(|| {
                let pick = strategy.choose("ds_0", "ds_master", &replicas);
                picks.lock().unwrap().push(pick.to_string());
            });
        }
    });

    let mut picks = picks.into_inner().unwrap();
    picks.sort();
    let mut expected = replicas.clone();
    expected.sort();
    assert_eq!(picks, expected);
}

#[test]
fn property_refresh_is_per_key() {
    let mut engine = engine(SHARDED_SINGLE_SOURCE);
    assert!(engine.refresh_prop("sql_show", "true"));
    assert!(!engine.refresh_prop("sql_show", "maybe"));
    assert!(engine.props().bool_value(strata_core::PropKey::SqlShow));
}

#[test]
fn sql_show_logs_without_affecting_result() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let yaml = r#"
data_sources:
  ds_0: { url: "mysql://db0/orders" }

sharding:
  t_order:
    data_nodes: ["ds_0.t_order_0", "ds_0.t_order_1"]
    sharding_column: order_id

props:
  sql_show: "true"
"#;
    let engine = engine(yaml);
    let mut state = RoutingState::new();

    let context = engine
        .prepare(
            "SELECT * FROM t_order WHERE order_id = ?",
            &[SqlValue::Int(2)],
            &mut state,
        )
        .unwrap();
    assert_eq!(context.execution_units().len(), 1);
    assert_eq!(
        context.execution_units()[0].sql_unit.sql,
        "SELECT * FROM t_order_0 WHERE order_id = ?"
    );
}
