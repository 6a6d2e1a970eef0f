// Copyright 2026 the strataq authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Runs the nine literal end-to-end scenarios of `spec.md` §8 against
//! the public `QueryService`/`IngestService` facade rather than internal
//! executor plumbing.

use pretty_assertions::assert_eq;
use strataq::{EngineConfig, Event, Engine, EngineError, ExecuteRequest};
use strataq_common::Value;

fn init_tracing() {
    use std::sync::Once;
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    });
}

fn seeded_engine() -> Engine {
    init_tracing();
    let engine = Engine::new(EngineConfig::default());
    let events = vec![
        Event::new("click")
            .with_table("events")
            .with_ts(1000)
            .with_user_id("u1")
            .with_prop("region", "us")
            .with_prop("price", "10"),
        Event::new("purchase")
            .with_table("events")
            .with_ts(2000)
            .with_user_id("u2")
            .with_prop("region", "eu")
            .with_prop("price", "25"),
        Event::new("click")
            .with_table("events")
            .with_ts(3000)
            .with_user_id("u1")
            .with_prop("region", "us")
            .with_prop("price", "15"),
        Event::new("click")
            .with_table("events")
            .with_ts(4000)
            .with_user_id("u3")
            .with_prop("region", "apac")
            .with_prop("price", "5"),
    ];
    let accepted = engine.ingest.submit(events);
    assert_eq!(accepted, 4);
    engine.ingest.flush();
    engine
}

#[test]
fn scenario_1_equality_filter() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new("SELECT userId, event FROM events WHERE userId = 'u1'"))
        .unwrap();
    assert_eq!(result.columns, vec!["userId", "event"]);
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.scanned_rows, 4);
    assert_eq!(result.matched_rows, 2);
    for row in &result.rows {
        assert_eq!(row[0], Value::Str("u1".into()));
        assert_eq!(row[1], Value::Str("click".into()));
    }
}

#[test]
fn scenario_2_time_range_pushdown() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new("SELECT * FROM events WHERE ts BETWEEN 1500 AND 3500"))
        .unwrap();
    assert_eq!(result.columns, vec!["ts", "table", "userId", "event"]);
    let user_ids: Vec<Value> = result.rows.iter().map(|r| r[2].clone()).collect();
    assert_eq!(user_ids, vec![Value::Str("u2".into()), Value::Str("u1".into())]);
}

#[test]
fn scenario_3_in_and_eq() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new(
            "SELECT userId FROM events WHERE region IN ('us','eu') AND event = 'click'",
        ))
        .unwrap();
    assert_eq!(result.rows.len(), 2);
    for row in &result.rows {
        assert_eq!(row[0], Value::Str("u1".into()));
    }
}

#[test]
fn scenario_4_like_prefix() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new("SELECT userId FROM events WHERE event LIKE 'pur%'"))
        .unwrap();
    assert_eq!(result.rows, vec![vec![Value::Str("u2".into())]]);
}

#[test]
fn scenario_5_group_by_count_order_by_desc() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new(
            "SELECT region, COUNT(*) AS c FROM events GROUP BY region ORDER BY c DESC",
        ))
        .unwrap();
    assert_eq!(result.rows.len(), 3);
    assert_eq!(result.rows[0], vec![Value::Str("us".into()), Value::Int(2)]);
}

#[test]
fn scenario_6_sum_avg_group_by_user() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new(
            "SELECT userId, SUM(price) AS s, AVG(price) AS a FROM events GROUP BY userId ORDER BY userId ASC",
        ))
        .unwrap();
    assert_eq!(
        result.rows,
        vec![
            vec![Value::Str("u1".into()), Value::Float(25.0), Value::Float(12.5)],
            vec![Value::Str("u2".into()), Value::Float(25.0), Value::Float(25.0)],
            vec![Value::Str("u3".into()), Value::Float(5.0), Value::Float(5.0)],
        ]
    );
}

#[test]
fn scenario_7_order_by_limit() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new("SELECT * FROM events ORDER BY ts ASC LIMIT 2"))
        .unwrap();
    assert_eq!(result.rows.len(), 2);
    assert_eq!(result.rows[0][0], Value::Int(1000));
    assert_eq!(result.rows[1][0], Value::Int(2000));
}

#[test]
fn scenario_8_malformed_select_list_is_a_parse_failure() {
    let engine = seeded_engine();
    let err = engine.query.execute(&ExecuteRequest::new("SELECT FROM events")).unwrap_err();
    assert!(matches!(err, EngineError::Parse(_)));
}

#[test]
fn scenario_9_group_by_without_aggregate_is_a_plan_failure() {
    let engine = seeded_engine();
    let err = engine
        .query
        .execute(&ExecuteRequest::new("SELECT userId FROM events GROUP BY userId"))
        .unwrap_err();
    assert!(matches!(err, EngineError::Plan(_)));
}

#[test]
fn matched_rows_never_exceeds_scanned_rows() {
    let engine = seeded_engine();
    let result = engine
        .query
        .execute(&ExecuteRequest::new("SELECT * FROM events WHERE userId = 'u1'"))
        .unwrap();
    assert!(result.matched_rows <= result.scanned_rows);
    for row in &result.rows {
        assert_eq!(row.len(), result.columns.len());
    }
}

#[test]
fn final_store_size_grows_by_exactly_the_accepted_batch() {
    let engine = seeded_engine();
    let before = engine.query.get_total_event_count();
    let accepted = engine.ingest.submit(vec![Event::new("click").with_table("events").with_ts(5000)]);
    engine.ingest.flush();
    assert_eq!(accepted, 1);
    assert_eq!(engine.query.get_total_event_count(), before + 1);
}

#[test]
fn overloaded_submission_drops_the_whole_batch() {
    let engine = Engine::new(EngineConfig::default());
    let huge: Vec<Event> = (0..25_000).map(|i| Event::new("click").with_ts(i)).collect();
    let accepted = engine.ingest.submit(huge);
    assert_eq!(accepted, -1);
    assert_eq!(engine.query.get_total_event_count(), 0);
}

#[test]
fn validate_sql_distinguishes_parse_from_plan_failures() {
    let engine = Engine::new(EngineConfig::default());
    assert!(engine.query.validate_sql("SELECT FROM events").is_err());
    assert!(engine.query.validate_sql("SELECT userId FROM events GROUP BY userId").is_err());
    assert!(engine.query.validate_sql("SELECT userId FROM events").is_ok());
}

#[test]
fn get_table_names_reflects_ingested_tables() {
    let engine = seeded_engine();
    assert_eq!(engine.query.get_table_names(), vec!["events".to_string()]);
}
