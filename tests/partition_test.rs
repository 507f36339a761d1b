//! PARTITION BY clause tests

use pretty_assertions::assert_eq;
use prism_ddl::parser::{AlterTableParser, PartitionByParser};
use prism_ddl::{
    DdlParser, DdlResult, Literal, PartitionBy, PartitionKind, PartitionValuesKind,
};

fn partition_of(sql: &str) -> DdlResult<PartitionBy> {
    let alter = AlterTableParser::new().parse(sql)?;
    Ok(alter.partition_by.expect("partition clause"))
}

#[test]
fn test_hash() -> DdlResult<()> {
    let sql = "ALTER TABLE `users`\nPARTITION BY HASH(id)\nPARTITIONS 8";
    let partition_by = partition_of(sql)?;

    assert_eq!(partition_by.kind, PartitionKind::Hash);
    assert_eq!(partition_by.expression.as_deref(), Some("id"));
    assert_eq!(partition_by.partitions_count, Some(8));
    assert!(partition_by.columns.is_empty());

    let alter = AlterTableParser::new().parse(sql)?;
    assert_eq!(
        alter.to_string(),
        "ALTER TABLE `users`\nPARTITION BY HASH (id) PARTITIONS 8"
    );
    Ok(())
}

#[test]
fn test_linear_key() -> DdlResult<()> {
    let partition_by = partition_of(
        "ALTER TABLE `users` PARTITION BY LINEAR KEY ALGORITHM=2 (id,email) PARTITIONS 4",
    )?;

    assert_eq!(partition_by.kind, PartitionKind::Key);
    assert!(partition_by.is_linear);
    assert_eq!(partition_by.key_algorithm, Some(2));
    assert_eq!(partition_by.columns, vec!["id", "email"]);
    assert_eq!(partition_by.partitions_count, Some(4));
    assert_eq!(
        partition_by.to_string(),
        "PARTITION BY LINEAR KEY ALGORITHM = 2 (`id`, `email`) PARTITIONS 4"
    );
    Ok(())
}

#[test]
fn test_range_definitions() -> DdlResult<()> {
    let partition_by = partition_of(
        "ALTER TABLE `users`
        PARTITION BY RANGE (year_col) (
            PARTITION p0 VALUES LESS THAN (1991),
            PARTITION p1 VALUES LESS THAN (1995)
        )",
    )?;

    assert_eq!(partition_by.kind, PartitionKind::Range);
    assert_eq!(partition_by.definitions.len(), 2);
    assert_eq!(partition_by.definitions[0].name, "p0");
    assert_eq!(
        partition_by.definitions[0].values_kind,
        Some(PartitionValuesKind::LessThan)
    );
    assert_eq!(partition_by.definitions[0].values, vec![Literal::Int(1991)]);
    assert_eq!(partition_by.definitions[1].values, vec![Literal::Int(1995)]);

    assert_eq!(
        partition_by.to_string(),
        "PARTITION BY RANGE (year_col) (
PARTITION `p0` VALUES LESS THAN (1991),
PARTITION `p1` VALUES LESS THAN (1995)
)"
    );
    Ok(())
}

#[test]
fn test_range_columns() -> DdlResult<()> {
    let partition_by = partition_of(
        "ALTER TABLE `users`
        PARTITION BY RANGE COLUMNS (year_col, month_col) (
            PARTITION p0 VALUES LESS THAN (1991, 1),
            PARTITION p1 VALUES LESS THAN (1995, 12)
        )",
    )?;

    assert!(partition_by.is_columns);
    assert_eq!(partition_by.expression, None);
    assert_eq!(
        partition_by.to_string(),
        "PARTITION BY RANGE COLUMNS (`year_col`, `month_col`) (
PARTITION `p0` VALUES LESS THAN (1991, 1),
PARTITION `p1` VALUES LESS THAN (1995, 12)
)"
    );
    Ok(())
}

#[test]
fn test_list() -> DdlResult<()> {
    let partition_by = partition_of(
        "ALTER TABLE `users`
        PARTITION BY LIST (status) (
            PARTITION p0 VALUES IN (1, 2, 3),
            PARTITION p1 VALUES IN (4, 5, 6)
        )",
    )?;

    assert_eq!(partition_by.kind, PartitionKind::List);
    assert_eq!(
        partition_by.definitions[0].values_kind,
        Some(PartitionValuesKind::In)
    );
    assert_eq!(
        partition_by.definitions[0].to_string(),
        "PARTITION `p0` VALUES IN (1, 2, 3)"
    );
    Ok(())
}

#[test]
fn test_list_columns_tuples() -> DdlResult<()> {
    let partition_by = PartitionByParser::new().parse(
        "PARTITION BY LIST COLUMNS (region, tier) (
            PARTITION pa VALUES IN ((1, 'gold'), (2, 'silver'))
        )",
    )?;

    assert_eq!(
        partition_by.definitions[0].values,
        vec![
            Literal::Raw("(1, 'gold')".into()),
            Literal::Raw("(2, 'silver')".into()),
        ]
    );
    Ok(())
}

#[test]
fn test_hash_columns_is_an_error() {
    let err = PartitionByParser::new()
        .parse("PARTITION BY HASH COLUMNS(x)")
        .unwrap_err();
    assert!(err.to_string().contains("COLUMNS is only allowed for RANGE or LIST"));
}
