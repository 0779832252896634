//! Tests for mapping definitions.

use rstest::rstest;

use super::*;
use crate::formula::FormulaError;

const BUNDLED: &str = include_str!("../../../../config/mapping.json");

fn definition(income_statement: &str, balance_sheet: &str, cash_flow: &str) -> String {
    format!(
        r#"{{"income_statement": {income_statement}, "balance_sheet": {balance_sheet}, "cash_flow": {cash_flow}}}"#
    )
}

fn ledger(key: &str, type_code: &str) -> String {
    format!(
        r#"{{"key": "{key}", "label": "{key}", "source": {{"kind": "ledger", "selectors": [{{"type": "{type_code}"}}]}}}}"#
    )
}

fn formula(key: &str, calculation: &str) -> String {
    format!(
        r#"{{"key": "{key}", "label": "{key}", "source": {{"kind": "formula", "calculation": "{calculation}"}}}}"#
    )
}

fn income_statement() -> String {
    format!(
        "[{}, {}, {}]",
        ledger("net_sales", "4"),
        ledger("cogs", "5"),
        formula("net_income", "net_sales - cogs")
    )
}

#[test]
fn test_bundled_mapping_is_valid() {
    let definition = MappingDefinition::from_json_str(BUNDLED).unwrap();

    assert_eq!(definition.net_income_key, "net_income");
    assert!(!definition.income_statement.is_empty());
    assert!(!definition.balance_sheet.is_empty());
    assert!(!definition.cash_flow.is_empty());
    assert!(
        definition
            .find(StatementKind::IncomeStatement, "other_items_income")
            .is_some()
    );
}

#[test]
fn test_defaults_applied() {
    let definition = MappingDefinition::from_json_str("{}").unwrap();
    assert_eq!(definition.version, "1");
    assert_eq!(definition.net_income_key, DEFAULT_NET_INCOME_KEY);
    assert!(definition.statement(StatementKind::BalanceSheet).is_empty());
}

#[test]
fn test_malformed_json() {
    let err = MappingDefinition::from_json_str("{\"income_statement\": 3}").unwrap_err();
    assert!(matches!(err, MappingError::Parse(_)));
}

#[test]
fn test_load_missing_file() {
    let err = MappingDefinition::load("/nonexistent/mapping.json").unwrap_err();
    assert!(matches!(err, MappingError::Io { .. }));
}

#[test]
fn test_duplicate_key() {
    let json = definition(
        &format!("[{}, {}]", ledger("net_sales", "4"), ledger("net_sales", "5")),
        "[]",
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(
        err,
        MappingError::DuplicateKey {
            statement: StatementKind::IncomeStatement,
            ref key,
        } if key == "net_sales"
    ));
}

#[test]
fn test_same_key_allowed_across_statements() {
    let json = definition(
        &format!("[{}]", ledger("total", "4")),
        &format!("[{}]", ledger("total", "1")),
        "[]",
    );
    assert!(MappingDefinition::from_json_str(&json).is_ok());
}

#[test]
fn test_role_siblings_share_key() {
    let json = definition(
        r#"[{
            "key": "other", "label": "Other", "source": {"kind": "formula", "calculation": "items_income - items_expense"},
            "children": [
                {"key": "items", "label": "Other Income", "role": "income", "source": {"kind": "ledger", "selectors": [{"type": "7"}]}},
                {"key": "items", "label": "Other Expenses", "role": "expense", "source": {"kind": "ledger", "selectors": [{"type": "8"}]}}
            ]
        }]"#,
        "[]",
        "[]",
    );
    assert!(MappingDefinition::from_json_str(&json).is_ok());
}

#[test]
fn test_role_siblings_do_not_bind_shared_key() {
    let json = definition(
        r#"[{
            "key": "other", "label": "Other", "source": {"kind": "formula", "calculation": "items"},
            "children": [
                {"key": "items", "label": "Other Income", "role": "income", "source": {"kind": "ledger", "selectors": [{"type": "7"}]}},
                {"key": "items", "label": "Other Expenses", "role": "expense", "source": {"kind": "ledger", "selectors": [{"type": "8"}]}}
            ]
        }]"#,
        "[]",
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(
        err,
        MappingError::UndeclaredReference { ref reference, .. } if reference == "items"
    ));
}

#[test]
fn test_invalid_formula() {
    let json = definition(
        &format!("[{}, {}]", ledger("a", "4"), formula("b", "a ^ 2")),
        "[]",
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(
        err,
        MappingError::InvalidFormula {
            error: FormulaError::UnexpectedCharacter { ch: '^', .. },
            ..
        }
    ));
}

#[rstest]
#[case::later_sibling(vec![formula("b", "a * 2"), ledger("a", "4")], "a")]
#[case::self_reference(vec![ledger("a", "4"), formula("c", "a + c")], "c")]
#[case::mutual(vec![formula("x", "y + 1"), formula("y", "x + 1")], "y")]
fn test_forward_reference(#[case] nodes: Vec<String>, #[case] reference: &str) {
    let json = definition(&format!("[{}]", nodes.join(", ")), "[]", "[]");

    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(
        matches!(err, MappingError::ForwardReference { reference: ref r, .. } if r == reference),
        "unexpected error: {err}"
    );
}

#[test]
fn test_grandchild_not_visible_to_grandparent() {
    let json = definition(
        r#"[{
            "key": "top", "label": "Top", "source": {"kind": "formula", "calculation": "leaf"},
            "children": [{
                "key": "middle", "label": "Middle", "source": {"kind": "formula", "calculation": "leaf"},
                "children": [{"key": "leaf", "label": "Leaf", "source": {"kind": "ledger", "selectors": [{"type": "4"}]}}]
            }]
        }]"#,
        "[]",
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(
        err,
        MappingError::ForwardReference { ref key, ref reference, .. }
            if key == "top" && reference == "leaf"
    ));
}

#[test]
fn test_undeclared_reference() {
    let json = definition(
        &format!("[{}, {}]", ledger("a", "4"), formula("b", "a + ghost")),
        "[]",
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(
        err,
        MappingError::UndeclaredReference { ref reference, .. } if reference == "ghost"
    ));
}

#[test]
fn test_cash_flow_sees_net_income() {
    let json = definition(
        &income_statement(),
        "[]",
        &format!(
            "[{}, {}]",
            ledger("depreciation", "6"),
            formula("operating", "net_income + depreciation")
        ),
    );
    assert!(MappingDefinition::from_json_str(&json).is_ok());
}

#[test]
fn test_missing_net_income() {
    let json = definition(
        &format!("[{}]", ledger("net_sales", "4")),
        "[]",
        &format!("[{}]", ledger("depreciation", "6")),
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(err, MappingError::MissingNetIncome(ref key) if key == "net_income"));
}

#[test]
fn test_custom_net_income_key() {
    let json = format!(
        r#"{{"net_income_key": "profit", "income_statement": [{}], "cash_flow": [{}]}}"#,
        ledger("profit", "4"),
        formula("operating", "profit * 1")
    );
    let definition = MappingDefinition::from_json_str(&json).unwrap();
    assert_eq!(
        definition.imports(StatementKind::CashFlow),
        vec![(StatementKind::IncomeStatement, "profit".to_string())]
    );
}

#[test]
fn test_self_import() {
    let json = definition(
        &format!(
            r#"[{}, {{"key": "copy", "label": "Copy", "source": {{"kind": "import", "statement": "income_statement", "key": "net_sales"}}}}]"#,
            ledger("net_sales", "4")
        ),
        "[]",
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(err, MappingError::SelfImport { ref key, .. } if key == "copy"));
}

#[test]
fn test_unknown_import() {
    let json = definition(
        &income_statement(),
        r#"[{"key": "earnings", "label": "Earnings", "source": {"kind": "import", "statement": "income_statement", "key": "ebitda"}}]"#,
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(
        err,
        MappingError::UnknownImport {
            source_statement: StatementKind::IncomeStatement,
            ref source_key,
            ..
        } if source_key == "ebitda"
    ));
}

#[test]
fn test_import_seeds_scope() {
    let json = definition(
        &income_statement(),
        r#"[
            {"key": "earnings", "label": "Earnings", "source": {"kind": "import", "statement": "income_statement", "key": "net_income"}},
            {"key": "doubled", "label": "Doubled", "source": {"kind": "formula", "calculation": "net_income * 2 + earnings"}}
        ]"#,
        "[]",
    );
    let definition = MappingDefinition::from_json_str(&json).unwrap();
    assert_eq!(
        definition.imports(StatementKind::BalanceSheet),
        vec![(StatementKind::IncomeStatement, "net_income".to_string())]
    );
    assert!(definition.imports(StatementKind::IncomeStatement).is_empty());
}

#[test]
fn test_import_cycle() {
    let json = definition(
        &format!(
            r#"[{}, {{"key": "borrowed", "label": "Borrowed", "source": {{"kind": "import", "statement": "balance_sheet", "key": "cash"}}}}]"#,
            ledger("net_income", "4")
        ),
        &format!(
            r#"[{}, {{"key": "earnings", "label": "Earnings", "source": {{"kind": "import", "statement": "income_statement", "key": "net_income"}}}}]"#,
            ledger("cash", "1")
        ),
        "[]",
    );
    let err = MappingDefinition::from_json_str(&json).unwrap_err();
    assert!(matches!(err, MappingError::ImportCycle(_)));
}

#[test]
fn test_serialized_definition_reloads() {
    let definition = MappingDefinition::from_json_str(BUNDLED).unwrap();
    let json = serde_json::to_string(&definition).unwrap();
    assert_eq!(MappingDefinition::from_json_str(&json).unwrap(), definition);
}
