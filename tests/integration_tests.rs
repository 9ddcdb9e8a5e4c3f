use chrono::NaiveDate;
use tabql::{Column, GROUP_COUNT, GROUP_KEY, MatchMode, ParseError, Row, Table, Value};

fn row(pairs: Vec<(&str, Value)>) -> Row {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn columns(names: &[&str]) -> Vec<Column> {
    names.iter().map(|n| Column::new(*n)).collect()
}

/// The four-row example table
fn cities() -> Table {
    let rows = [(5, "BJS", "CN"), (2, "BJS", "CN"), (3, "SHA", "CN"), (4, "NYC", "US")]
        .into_iter()
        .map(|(id, code, name)| {
            row(vec![
                ("id", Value::Integer(id)),
                ("code", Value::from(code)),
                ("name", Value::from(name)),
            ])
        })
        .collect();
    Table::with_rows("cities", columns(&["id", "code", "name"]), rows)
}

/// Six rows with a money column
fn accounts() -> Table {
    let data = [
        (5, "BJS", "CN", 1.23),
        (2, "BJS", "CN", 2.21),
        (3, "SHA", "CN", 1.26),
        (4, "NYC", "US", 3.99),
        (7, "MEL", "US", 3.99),
        (1, "TYO", "CN", 2.99),
    ];
    let rows = data
        .into_iter()
        .map(|(id, code, name, money)| {
            row(vec![
                ("id", Value::Integer(id)),
                ("code", Value::from(code)),
                ("name", Value::from(name)),
                ("money", Value::Float(money)),
            ])
        })
        .collect();
    Table::with_rows("accounts", columns(&["id", "code", "name", "money"]), rows)
}

fn ids(table: &Table) -> Vec<i64> {
    table
        .rows()
        .iter()
        .map(|r| match r.get("id") {
            Some(Value::Integer(n)) => *n,
            other => panic!("row without integer id: {other:?}"),
        })
        .collect()
}

fn strings(table: &Table, column: &str) -> Vec<String> {
    table.rows().iter().map(|r| r[column].as_string()).collect()
}

// ============================================================================
// Filtering
// ============================================================================

#[test]
fn test_where_with_nested_or() {
    let result = cities().matching("name='CN' and (code='BJS' or id=3)");
    assert_eq!(ids(&result), vec![5, 2, 3]);
    assert_eq!(result.count(), 3);
    assert_eq!(result.columns(), cities().columns());
}

#[test]
fn test_where_with_nested_or_excludes_left_only_rows() {
    // id 1 is CN but neither BJS nor id=3
    let result = accounts().matching("name='CN' and (code='BJS' or id=3)");
    assert_eq!(ids(&result), vec![5, 2, 3]);
}

#[test]
fn test_empty_expression_returns_table_unchanged() {
    let table = cities();
    assert_eq!(table.filter("", MatchMode::Exact), table);
    assert_eq!(table.try_filter("  ", MatchMode::Exact).unwrap(), table);
}

#[test]
fn test_malformed_expression_falls_back_to_input() {
    let table = cities();
    assert_eq!(table.filter("name=", MatchMode::Exact), table);
    assert!(table.try_filter("name=", MatchMode::Exact).is_err());
    assert!(table.try_filter("name=>1", MatchMode::Exact).is_err());
}

#[test]
fn test_unbalanced_close_paren_keeps_parsed_prefix() {
    let result = cities().matching("name='US') or id=5");
    assert_eq!(ids(&result), vec![4]);
}

#[test]
fn test_unknown_operator_matches_nothing() {
    let table = cities();
    assert!(table.matching("id=>3").is_empty());
    assert!(table.matching("id=>3 and name='CN'").is_empty());
    assert_eq!(ids(&table.matching("id=>3 or name='US'")), vec![4]);
    assert!(table.like("name=!'C%'").is_empty());
}

#[test]
fn test_unknown_operator_is_an_error_when_strict() {
    assert_eq!(
        cities().try_filter("id=>3 or name='US'", MatchMode::Exact),
        Err(ParseError::UnknownOperator("=>".to_string()))
    );
}

#[test]
fn test_deep_nesting_does_not_crash() {
    let table = cities();
    let deep = "(".repeat(200_000);
    assert!(matches!(
        table.try_filter(&deep, MatchMode::Exact),
        Err(ParseError::Malformed(_))
    ));
    assert_eq!(table.filter(&deep, MatchMode::Exact), table);

    let chain = vec!["id=5"; 50_000].join(" or ");
    assert_eq!(table.matching(&chain), table);
}

#[test]
fn test_long_chain_within_limit() {
    let chain = vec!["id=5"; 100].join(" or ");
    assert_eq!(ids(&cities().matching(&chain)), vec![5; 100]);
}

#[test]
fn test_filter_does_not_touch_source() {
    let table = accounts();
    let _ = table.matching("name='CN' or code='NYC'");
    let _ = table.group_by("name");
    assert_eq!(table, accounts());
}

#[test]
fn test_filter_is_idempotent() {
    let expr = "name='CN' and (code='BJS' or id=3)";
    let once = accounts().matching(expr);
    let twice = once.matching(expr);
    assert_eq!(ids(&once), ids(&twice));
}

#[test]
fn test_not_equal_spellings() {
    assert_eq!(ids(&accounts().matching("name!='CN'")), vec![4, 7]);
    assert_eq!(ids(&accounts().matching("name<>'CN'")), vec![4, 7]);
}

#[test]
fn test_ordering_operators_compare_numbers() {
    let table = accounts();
    assert_eq!(ids(&table.matching("money>2")), vec![2, 4, 7, 1]);
    assert_eq!(ids(&table.matching("id>=4")), vec![5, 4, 7]);
    assert_eq!(ids(&table.matching("id<3")), vec![2, 1]);
    assert_eq!(ids(&table.matching("id<=2")), vec![2, 1]);
}

#[test]
fn test_ordering_operator_on_text_matches_nothing() {
    assert!(accounts().matching("name>1").is_empty());
    assert!(accounts().matching("id>abc").is_empty());
}

#[test]
fn test_float_equality_uses_shortest_form() {
    assert_eq!(ids(&accounts().matching("money=3.99")), vec![4, 7]);
}

#[test]
fn test_or_keeps_duplicates() {
    let result = accounts().matching("name='CN' or code='BJS'");
    assert_eq!(ids(&result), vec![5, 2, 3, 1, 5, 2]);
}

#[test]
fn test_and_on_same_column_matches_nothing() {
    // Rows re-matched by the same column are excluded by `and`
    assert!(accounts().matching("id>1 and id<5").is_empty());
}

#[test]
fn test_and_across_columns() {
    assert_eq!(ids(&accounts().matching("name='US' and money=3.99")), vec![4, 7]);
    assert_eq!(ids(&accounts().matching("code='BJS' and money>2")), vec![2]);
}

#[test]
fn test_missing_column_never_matches() {
    let table = cities();
    assert!(table.matching("missing='x'").is_empty());
    assert!(table.matching("missing!='x'").is_empty());
}

#[test]
fn test_null_equals_empty_literal() {
    let table = Table::with_rows(
        "notes",
        columns(&["id", "note"]),
        vec![
            row(vec![("id", Value::Integer(1)), ("note", Value::Null)]),
            row(vec![("id", Value::Integer(2)), ("note", Value::from("x"))]),
            row(vec![("id", Value::Integer(3))]),
        ],
    );
    assert_eq!(ids(&table.matching("note=''")), vec![1]);
}

#[test]
fn test_quoted_literal_with_spaces() {
    let table = Table::with_rows(
        "t",
        columns(&["id", "city"]),
        vec![
            row(vec![("id", Value::Integer(1)), ("city", Value::from("New York"))]),
            row(vec![("id", Value::Integer(2)), ("city", Value::from("York"))]),
        ],
    );
    assert_eq!(ids(&table.matching("city='New York'")), vec![1]);
}

#[test]
fn test_timestamp_compares_by_formatted_date() {
    let day = NaiveDate::from_ymd_opt(2020, 12, 1).unwrap();
    let table = Table::with_rows(
        "events",
        columns(&["id", "at"]),
        vec![
            row(vec![("id", Value::Integer(1)), ("at", Value::Timestamp(day.and_hms_opt(0, 0, 0).unwrap()))]),
            row(vec![("id", Value::Integer(2)), ("at", Value::Timestamp(day.and_hms_opt(8, 30, 0).unwrap()))]),
        ],
    );
    assert_eq!(ids(&table.matching("at='2020-12-01'")), vec![1]);
    assert_eq!(ids(&table.matching("at='2020-12-01 08:30:00'")), vec![2]);
}

#[test]
fn test_filter_records_mode() {
    assert_eq!(accounts().matching("id=1").mode(), MatchMode::Exact);
    assert_eq!(accounts().like("name='C%'").mode(), MatchMode::Wildcard);
    assert_eq!(accounts().find("name='C'").mode(), MatchMode::Regex);
}

// ============================================================================
// Wildcard and regex modes
// ============================================================================

fn names() -> Table {
    let rows = ["CN", "CNX", "XCN", "ACNB"]
        .iter()
        .enumerate()
        .map(|(i, n)| row(vec![("id", Value::Integer(i as i64)), ("name", Value::from(*n))]))
        .collect();
    Table::with_rows("names", columns(&["id", "name"]), rows)
}

#[test]
fn test_wildcard_prefix_suffix_contains() {
    let table = names();
    assert_eq!(strings(&table.like("name='CN%'"), "name"), vec!["CN", "CNX"]);
    assert_eq!(strings(&table.like("name='%CN'"), "name"), vec!["CN", "XCN"]);
    assert_eq!(
        strings(&table.like("name='%CN%'"), "name"),
        vec!["CN", "CNX", "XCN", "ACNB"]
    );
}

#[test]
fn test_wildcard_without_percent_is_exact() {
    assert_eq!(strings(&names().like("name='CN'"), "name"), vec!["CN"]);
}

#[test]
fn test_exact_mode_treats_percent_literally() {
    assert!(names().matching("name='CN%'").is_empty());
}

#[test]
fn test_wildcard_not_equal() {
    assert_eq!(strings(&names().like("name!='CN%'"), "name"), vec!["XCN", "ACNB"]);
}

#[test]
fn test_wildcard_on_numbers() {
    let result = accounts().like("name='CN%' and money=1.2%").order_by("id desc");
    assert_eq!(ids(&result), vec![5, 3]);
}

#[test]
fn test_regex_mode() {
    let table = accounts();
    assert_eq!(
        ids(&table.find("code='[A-Z]{3}'").order_by("id desc")),
        vec![7, 5, 4, 3, 2, 1]
    );
    assert_eq!(ids(&table.find("code='^B'")), vec![5, 2]);
    assert_eq!(ids(&table.find("code='^T.O$'")), vec![1]);
}

#[test]
fn test_regex_percent_means_any_char() {
    assert_eq!(ids(&accounts().find("code='B%S'")), vec![5, 2]);
}

#[test]
fn test_invalid_regex_matches_nothing() {
    assert!(accounts().find("code='['").is_empty());
}

// ============================================================================
// Grouping
// ============================================================================

#[test]
fn test_group_by_single_column() {
    let grouped = cities().group_by("name");
    assert_eq!(grouped.count(), 2);
    assert_eq!(strings(&grouped, "name"), vec!["CN", "US"]);
    assert_eq!(grouped.rows()[0][GROUP_COUNT], Value::Integer(3));
    assert_eq!(grouped.rows()[1][GROUP_COUNT], Value::Integer(1));
    assert_eq!(grouped.columns(), &[Column::new("name")]);
}

#[test]
fn test_group_counts_sum_to_input() {
    let table = accounts();
    for columns in ["name", "code", "money", "name, code"] {
        let grouped = table.group_by(columns);
        let total: i64 = grouped
            .rows()
            .iter()
            .map(|r| match r[GROUP_COUNT] {
                Value::Integer(n) => n,
                _ => panic!("missing count"),
            })
            .sum();
        assert_eq!(total, table.count() as i64, "Failed for columns: {}", columns);
    }
}

#[test]
fn test_group_by_multiple_columns() {
    let grouped = accounts().group_by("name, code");
    assert_eq!(grouped.count(), 5);
    assert_eq!(grouped.rows()[0][GROUP_KEY], Value::from("$CN$$BJS$"));
    assert_eq!(grouped.rows()[0][GROUP_COUNT], Value::Integer(2));
    assert_eq!(strings(&grouped, "code"), vec!["BJS", "SHA", "NYC", "MEL", "TYO"]);
}

#[test]
fn test_group_by_unknown_column_returns_input() {
    let table = cities();
    assert_eq!(table.group_by("missing"), table);
    assert_eq!(table.group_by(""), table);
}

#[test]
fn test_group_by_single_row_is_noop() {
    let table = cities().matching("id=4");
    assert_eq!(table.group_by("name"), table);
}

#[test]
fn test_group_key_has_no_collisions() {
    let test_cases = vec![(("x", "yz"), ("xy", "z")), (("x$", ""), ("x", "$"))];

    for ((a1, b1), (a2, b2)) in test_cases {
        let table = Table::with_rows(
            "t",
            columns(&["a", "b"]),
            vec![
                row(vec![("a", Value::from(a1)), ("b", Value::from(b1))]),
                row(vec![("a", Value::from(a2)), ("b", Value::from(b2))]),
            ],
        );
        let grouped = table.group_by("a, b");
        assert_eq!(grouped.count(), 2, "Failed for values: {a1:?} {b1:?} / {a2:?} {b2:?}");
        for row in grouped.rows() {
            assert_eq!(row[GROUP_COUNT], Value::Integer(1));
        }
    }
}

#[test]
fn test_group_key_text_with_dollar_values() {
    let table = Table::with_rows(
        "t",
        columns(&["a", "b"]),
        vec![
            row(vec![("a", Value::from("x$")), ("b", Value::from(""))]),
            row(vec![("a", Value::from("x")), ("b", Value::from("$"))]),
        ],
    );
    let grouped = table.group_by("a, b");
    assert_eq!(grouped.rows()[0][GROUP_KEY], Value::from("$x$$$$"));
    assert_eq!(grouped.rows()[1][GROUP_KEY], Value::from("$x$$$$"));
}

#[test]
fn test_strip_annotations() {
    let grouped = cities().group_by("name").strip_annotations();
    for row in grouped.rows() {
        assert!(!row.contains_key(GROUP_KEY));
        assert!(!row.contains_key(GROUP_COUNT));
        assert!(row.contains_key("name"));
    }
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_order_by_desc() {
    assert_eq!(ids(&cities().order_by("id desc")), vec![5, 4, 3, 2]);
    assert_eq!(ids(&cities().order_by("id")), vec![2, 3, 4, 5]);
}

#[test]
fn test_order_by_multiple_keys() {
    let sorted = accounts().order_by("name, id desc");
    assert_eq!(ids(&sorted), vec![5, 3, 2, 1, 7, 4]);
}

#[test]
fn test_order_by_ties_keep_input_order() {
    let sorted = accounts().order_by("name");
    assert_eq!(ids(&sorted), vec![5, 2, 3, 1, 4, 7]);
}

#[test]
fn test_order_by_numeric_strings() {
    let rows = ["10", "9", "100"]
        .iter()
        .map(|v| row(vec![("v", Value::from(*v))]))
        .collect();
    let table = Table::with_rows("t", columns(&["v"]), rows);
    assert_eq!(strings(&table.order_by("v"), "v"), vec!["9", "10", "100"]);
}

#[test]
fn test_order_by_text() {
    let sorted = accounts().order_by("code desc");
    assert_eq!(strings(&sorted, "code"), vec!["TYO", "SHA", "NYC", "MEL", "BJS", "BJS"]);
}

#[test]
fn test_order_by_is_idempotent() {
    let once = accounts().order_by("money desc, code");
    let twice = once.clone().order_by("money desc, code");
    assert_eq!(once, twice);
}

#[test]
fn test_order_by_missing_column_keeps_order() {
    assert_eq!(ids(&accounts().order_by("missing")), vec![5, 2, 3, 4, 7, 1]);
}

#[test]
fn test_order_by_empty_list_is_noop() {
    assert_eq!(ids(&cities().order_by("")), vec![5, 2, 3, 4]);
}

// ============================================================================
// Chaining and concurrency
// ============================================================================

#[test]
fn test_filter_group_order_chain() {
    let result = accounts()
        .matching("name='CN'")
        .group_by("code")
        .order_by("code desc");
    assert_eq!(strings(&result, "code"), vec!["TYO", "SHA", "BJS"]);
    assert_eq!(result.rows()[2][GROUP_COUNT], Value::Integer(2));
}

#[test]
fn test_independent_chains_in_parallel() {
    let table = accounts();
    let (cn, us) = std::thread::scope(|s| {
        let cn = s.spawn(|| ids(&table.matching("name='CN'").order_by("id")));
        let us = s.spawn(|| ids(&table.matching("name='US'").order_by("id")));
        (cn.join().unwrap(), us.join().unwrap())
    });
    assert_eq!(cn, vec![1, 2, 3, 5]);
    assert_eq!(us, vec![4, 7]);
}
