//! End-to-end tests driving full physical plans through the runner, plus the
//! two invariants (128-bit sum overflow, binary null propagation) that don't
//! need a plan tree to exercise.

use prism::catalog::{Catalog, MemoryCatalog, MemoryTable, TableSchema, TableStats};
use prism::config::Config;
use prism::execution::context::ExecutionContext;
use prism::execution::hash_table::{JoinHashTable, JoinType};
use prism::execution::operators::Runner;
use prism::expression::aggregate::{AggregateFunction, SumFunction};
use prism::expression::executor::ExpressionExecutor;
use prism::expression::expression::{Expression, FunctionType};
use prism::planner::physical_plan::{
    AggregateSpec, FilterOperator, HashAggregateOperator, HashJoinOperator,
    PhysicalOperator, ProjectOperator, ScanOperator,
};
use prism::types::{DataChunk, LogicalType, Value, Vector};
use prism::PrismDBResult;

fn test_ctx() -> ExecutionContext {
    ExecutionContext::new(Config::for_query("", "", "test", ""))
}

fn run_plan(plan: &mut PhysicalOperator) -> PrismDBResult<Vec<DataChunk>> {
    let ctx = test_ctx();
    let mut runner = Runner::new(&ctx);
    let mut chunks = Vec::new();
    runner.run(plan, |chunk| {
        chunks.push(chunk.clone());
        Ok(())
    })?;
    Ok(chunks)
}

fn row_count(chunks: &[DataChunk]) -> usize {
    chunks.iter().map(|c| c.count()).sum()
}

fn supplier_table() -> MemoryTable {
    // s_suppkey, s_nationkey
    let nationkeys = [0, 1, 0, 2, 0, 1, 0];
    MemoryTable {
        schema: TableSchema {
            columns: vec!["s_suppkey".to_string(), "s_nationkey".to_string()],
            types: vec![LogicalType::Integer, LogicalType::Integer],
            primary_key: vec![0],
            stats: TableStats { row_count: nationkeys.len() },
        },
        columns: vec![
            (0..nationkeys.len() as i32).map(Value::integer).collect(),
            nationkeys.iter().map(|&n| Value::integer(n)).collect(),
        ],
    }
}

fn nation_table() -> MemoryTable {
    MemoryTable {
        schema: TableSchema {
            columns: vec!["n_nationkey".to_string(), "n_name".to_string()],
            types: vec![LogicalType::Integer, LogicalType::Varchar],
            primary_key: vec![0],
            stats: TableStats { row_count: 3 },
        },
        columns: vec![
            vec![Value::integer(0), Value::integer(1), Value::integer(2)],
            vec![
                Value::varchar("VIETNAM".to_string()),
                Value::varchar("CHINA".to_string()),
                Value::varchar("INDIA".to_string()),
            ],
        ],
    }
}

/// Scenario 1: scan + projection row count matches the catalog's row count.
#[test]
fn scan_and_projection_row_count_matches_catalog() -> PrismDBResult<()> {
    let mut catalog = MemoryCatalog::new();
    catalog.add_table("tpch", "supplier", supplier_table());
    let expected = catalog.table("tpch", "supplier")?.stats.row_count;

    let reader = catalog.open("tpch", "supplier", &[])?;
    let scan = ScanOperator::new(reader, vec![LogicalType::Integer, LogicalType::Integer], None);
    let project = ProjectOperator::new(
        PhysicalOperator::Scan(scan),
        vec![Expression::column(0, LogicalType::Integer)],
    );
    let mut plan = PhysicalOperator::Project(project);

    let chunks = run_plan(&mut plan)?;
    assert_eq!(row_count(&chunks), expected);
    Ok(())
}

/// Scenario 2: inner hash join, supplier joined to nation filtered to VIETNAM.
#[test]
fn inner_hash_join_matches_filtered_nation() -> PrismDBResult<()> {
    let mut catalog = MemoryCatalog::new();
    catalog.add_table("tpch", "supplier", supplier_table());
    catalog.add_table("tpch", "nation", nation_table());

    let nation_reader = catalog.open("tpch", "nation", &[])?;
    let nation_scan = ScanOperator::new(nation_reader, vec![LogicalType::Integer, LogicalType::Varchar], None);
    let nation_filter = FilterOperator::new(
        PhysicalOperator::Scan(nation_scan),
        Expression::binary(
            FunctionType::Equal,
            Expression::column(1, LogicalType::Varchar),
            Expression::constant(Value::varchar("VIETNAM".to_string())),
            LogicalType::Boolean,
        ),
    );

    let supplier_reader = catalog.open("tpch", "supplier", &[])?;
    let supplier_scan = ScanOperator::new(supplier_reader, vec![LogicalType::Integer, LogicalType::Integer], None);

    let join = HashJoinOperator::new(
        PhysicalOperator::Scan(supplier_scan),
        PhysicalOperator::Filter(nation_filter),
        vec![Expression::column(1, LogicalType::Integer)],
        vec![Expression::column(0, LogicalType::Integer)],
        vec![Expression::column(0, LogicalType::Integer)],
        JoinType::Inner,
    );
    let mut plan = PhysicalOperator::HashJoin(Box::new(join));

    let chunks = run_plan(&mut plan)?;
    // supplier rows with s_nationkey == 0 (VIETNAM's key): indices 0,2,4,6 => 4 rows
    assert_eq!(row_count(&chunks), 4);
    Ok(())
}

/// Scenario 4 (scaled down): hash aggregation producing one row per group with
/// an exact expected sum, then a HAVING-style residual filter on the group.
#[test]
fn hash_aggregate_then_having_filter_distinct_groups() -> PrismDBResult<()> {
    // ps_partkey, ps_suppkey, l_quantity
    let partkeys = [1, 1, 1, 2, 2, 3];
    let suppkeys = [10, 10, 20, 10, 30, 30];
    let quantities = [5, 6, 100, 1, 2, 50];

    let table = MemoryTable {
        schema: TableSchema {
            columns: vec!["ps_partkey".to_string(), "ps_suppkey".to_string(), "l_quantity".to_string()],
            types: vec![LogicalType::Integer, LogicalType::Integer, LogicalType::Integer],
            primary_key: vec![],
            stats: TableStats { row_count: partkeys.len() },
        },
        columns: vec![
            partkeys.iter().map(|&v| Value::integer(v)).collect(),
            suppkeys.iter().map(|&v| Value::integer(v)).collect(),
            quantities.iter().map(|&v| Value::integer(v)).collect(),
        ],
    };

    let mut catalog = MemoryCatalog::new();
    catalog.add_table("tpch", "partsupp_lineitem", table);
    let reader = catalog.open("tpch", "partsupp_lineitem", &[])?;
    let scan = ScanOperator::new(
        reader,
        vec![LogicalType::Integer, LogicalType::Integer, LogicalType::Integer],
        None,
    );

    let agg = HashAggregateOperator::new(
        PhysicalOperator::Scan(scan),
        vec![
            Expression::column(0, LogicalType::Integer),
            Expression::column(1, LogicalType::Integer),
        ],
        vec![AggregateSpec {
            function: Box::new(SumFunction::new(LogicalType::BigInt)),
            input: Some(Expression::column(2, LogicalType::Integer)),
            output_type: LogicalType::HugeInt,
        }],
        // HAVING sum(l_quantity) > 10
        Some(Expression::binary(
            FunctionType::GreaterThan,
            Expression::column(2, LogicalType::HugeInt),
            Expression::constant(Value::HugeInt { high: 0, low: 10 }),
            LogicalType::Boolean,
        )),
    );
    let mut plan = PhysicalOperator::HashAggregate(Box::new(agg));

    let chunks = run_plan(&mut plan)?;
    // groups: (1,10)->11, (1,20)->100, (2,10)->1, (2,30)->2, (3,30)->50
    // HAVING sum > 10 keeps (1,10), (1,20), (3,30) => 3 distinct groups
    assert_eq!(row_count(&chunks), 3);
    Ok(())
}

/// Scenario 5: sum accumulator exceeds i64::MAX and stays correct in i128.
#[test]
fn sum_accumulator_exceeds_i64_range() -> PrismDBResult<()> {
    let sum_fn = SumFunction::new(LogicalType::BigInt);
    let mut state = vec![0u8; sum_fn.state_size()];
    sum_fn.init(&mut state);

    // A constant-format batch of i64::MAX repeated 3 times overflows i64 but
    // fits comfortably in the 128-bit accumulator.
    let input = Vector::constant(LogicalType::BigInt, &Value::bigint(i64::MAX), 3)?;
    sum_fn.simple_update(&input, &mut state, 3)?;

    let expected = (i64::MAX as i128) * 3;
    match sum_fn.finalize(&state)? {
        Value::HugeInt { high, low } => {
            let actual = ((high as i128) << 64) | (low as u64 as i128);
            assert_eq!(actual, expected);
            assert!(expected > i64::MAX as i128);
        }
        other => panic!("expected HugeInt, got {:?}", other),
    }
    Ok(())
}

/// Scenario 6: binary executor null propagation on `int32_col > 5` where every
/// even row is null and odd rows alternate 1, 10.
#[test]
fn binary_executor_propagates_nulls() -> PrismDBResult<()> {
    let row_count = 8;
    let mut column = Vector::new(LogicalType::Integer, row_count);
    column.resize(row_count)?;
    for i in 0..row_count {
        if i % 2 == 0 {
            column.set_value(i, &Value::Null)?;
        } else {
            let v = if (i / 2) % 2 == 0 { 1 } else { 10 };
            column.set_value(i, &Value::integer(v))?;
        }
    }
    let chunk = DataChunk::from_vectors(vec![column])?;

    let predicate = Expression::binary(
        FunctionType::GreaterThan,
        Expression::column(0, LogicalType::Integer),
        Expression::constant(Value::integer(5)),
        LogicalType::Boolean,
    );
    let executor = ExpressionExecutor::new();
    let result = executor.execute(&predicate, &chunk)?;

    for i in 0..row_count {
        if i % 2 == 0 {
            assert!(!result.is_valid(i), "row {} should be null", i);
        } else {
            let expected = (i / 2) % 2 != 0; // 1 > 5 false, 10 > 5 true, alternating
            assert!(result.is_valid(i), "row {} should be valid", i);
            assert_eq!(result.get_value(i)?.try_as_boolean()?, expected);
        }
    }
    Ok(())
}

/// Join hash table sanity check, independent of the operator runtime: a probe
/// of a row not present in the build side returns no matches.
#[test]
fn join_hash_table_probe_misses_are_empty() -> PrismDBResult<()> {
    let mut table = JoinHashTable::new();
    table.insert(vec![Value::integer(1)], vec![Value::integer(100)]);

    let mut scan = table.probe(&[Value::integer(2)]);
    assert_eq!(scan.next()?, None);

    let mut scan = table.probe(&[Value::integer(1)]);
    assert_eq!(scan.next()?, Some(&[Value::integer(100)][..]));
    Ok(())
}
