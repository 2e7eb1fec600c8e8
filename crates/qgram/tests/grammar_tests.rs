//! End-to-end checks of the grammar engine through the public API.

use qgram::query::{apply, decode, derive_zoom, encode, parse, stringify, Command, GroupEdit};
use qgram::{FieldOption, Node, Operator, OptionSet, OptionType, Query, Rule, RuleGroup};

fn decode_encoded(rule: &Rule) -> Rule {
    let encoded = encode(rule);
    let (key, value) = encoded.split_once('=').unwrap();
    decode(key, value)
}

#[test]
fn test_codec_round_trip_examples() {
    let rules = [
        Rule::new("status", "approved"),
        Rule::new("customer:email", "a@b.com").with_operator(Operator::Not),
        Rule::new("items:item_options", "m,l")
            .with_name("size")
            .with_operator(Operator::In),
        Rule::new("attributes", "true")
            .with_name("gift wrap")
            .with_operator(Operator::IsDefined),
        Rule::new("total", "10..20"),
        Rule::new("date_created", "2024-01-01").with_operator(Operator::GreaterThanOrEqual),
    ];
    for rule in rules {
        assert_eq!(decode_encoded(&rule), rule);
    }
}

#[test]
fn test_empty_rule_encodes_to_nothing() {
    assert_eq!(encode(&Rule::empty()), "");
}

#[test]
fn test_operator_suffix_stripping() {
    assert_eq!(
        decode("foo:greaterthan", "bar"),
        Rule {
            path: "foo".into(),
            name: None,
            operator: Some(Operator::GreaterThan),
            value: "bar".into(),
        }
    );
}

#[test]
fn test_attribute_name_extraction() {
    assert_eq!(
        decode("foo[bar]", "baz"),
        Rule {
            path: "foo".into(),
            name: Some("bar".into()),
            operator: None,
            value: "baz".into(),
        }
    );
}

#[test]
fn test_zoom_examples() {
    let attribute = Query::new(vec![Rule::new("items:item_options", "m")
        .with_name("size")
        .into()]);
    assert_eq!(derive_zoom(&attribute), "items:item_options");

    let nested = Query::new(vec![
        Rule::new("customer:default_billing_address:country", "US").into(),
    ]);
    assert_eq!(derive_zoom(&nested), "customer:default_billing_address");
}

#[test]
fn test_or_group_parse() {
    let query = parse("status=approved|status%3Anot%3Ddeclined");
    assert_eq!(
        query,
        Query::new(vec![Node::Group(RuleGroup::new(vec![
            Rule::new("status", "approved"),
            Rule::new("status", "declined").with_operator(Operator::Not),
        ]))])
    );
}

#[test]
fn test_convert_to_or_then_delete_restores_rule() {
    let options = OptionSet::default();
    let original = parse("customer:email:not=a%40b.com&total=5");

    let grouped = apply(&original, &Command::ConvertToGroup { index: 0 }, &options);
    assert!(grouped.get(0).and_then(Node::as_group).is_some());

    let restored = apply(
        &grouped,
        &Command::UpdateGroup {
            index: 0,
            inner: 1,
            edit: GroupEdit::Delete,
        },
        &options,
    );
    assert_eq!(restored, original);
    assert_eq!(stringify(&restored), "customer%3Aemail%3Anot=a%40b.com&total=5");
}

#[test]
fn test_number_operator_cycle_wraparound() {
    let options = OptionSet::new(vec![FieldOption::new("total", OptionType::Number)]);
    let expected = [
        Some(Operator::In),
        Some(Operator::Not),
        Some(Operator::GreaterThan),
        Some(Operator::LessThan),
        Some(Operator::GreaterThanOrEqual),
        Some(Operator::LessThanOrEqual),
        None,
    ];

    let mut query = parse("total=5");
    for want in expected {
        query = apply(&query, &Command::CycleOperator { index: 0 }, &options);
        assert_eq!(query.get(0).and_then(Node::as_rule).unwrap().operator, want);
    }
}

#[test]
fn test_and_composition_round_trip() {
    let query = parse("a=1&b=2");
    assert_eq!(
        query,
        Query::new(vec![Rule::new("a", "1").into(), Rule::new("b", "2").into()])
    );
    assert_eq!(stringify(&query), "a=1&b=2");
}

#[test]
fn test_interactive_session() {
    let options = OptionSet::new(vec![
        FieldOption::new("status", OptionType::String),
        FieldOption::new("attributes", OptionType::Attribute),
    ]);

    let mut query = parse("");
    query = apply(&query, &Command::AppendEmpty, &options);
    query = apply(
        &query,
        &Command::Replace {
            index: 0,
            node: Rule::new("status", "approved").into(),
        },
        &options,
    );
    query = apply(&query, &Command::AppendEmpty, &options);
    query = apply(
        &query,
        &Command::Replace {
            index: 1,
            node: Rule::new("attributes", "").with_name("color").into(),
        },
        &options,
    );
    for _ in 0..7 {
        query = apply(&query, &Command::CycleOperator { index: 1 }, &options);
    }
    query = apply(&query, &Command::ConvertToGroup { index: 0 }, &options);
    query = apply(
        &query,
        &Command::UpdateGroup {
            index: 0,
            inner: 1,
            edit: GroupEdit::Replace(Rule::new("status", "pending")),
        },
        &options,
    );

    assert_eq!(
        stringify(&query),
        "status=approved|status%3Dpending&attributes%5Bcolor%5D%3Aisdefined="
    );
    assert_eq!(derive_zoom(&query), "attributes");
    assert_eq!(parse(&stringify(&query)), query);
}
