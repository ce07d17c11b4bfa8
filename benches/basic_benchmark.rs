//! Microbenchmarks for the expression executor's binary dispatch paths.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prism::expression::executor::ExpressionExecutor;
use prism::expression::expression::{Expression, FunctionType};
use prism::types::{DataChunk, LogicalType, Value, Vector};

fn flat_int_chunk(n: usize) -> DataChunk {
    let values: Vec<Value> = (0..n as i32).map(Value::integer).collect();
    let vector = Vector::from_values(&values).unwrap();
    DataChunk::from_vectors(vec![vector]).unwrap()
}

fn bench_add_flat_flat(c: &mut Criterion) {
    let executor = ExpressionExecutor::new();
    let chunk = flat_int_chunk(2048);
    let expr = Expression::binary(
        FunctionType::Add,
        Expression::column(0, LogicalType::Integer),
        Expression::column(0, LogicalType::Integer),
        LogicalType::Integer,
    );

    c.bench_function("add_flat_flat_2048", |b| {
        b.iter(|| {
            let result = executor.execute(black_box(&expr), black_box(&chunk)).unwrap();
            black_box(result)
        })
    });
}

fn bench_filter_select(c: &mut Criterion) {
    let executor = ExpressionExecutor::new();
    let chunk = flat_int_chunk(2048);
    let predicate = Expression::binary(
        FunctionType::GreaterThan,
        Expression::column(0, LogicalType::Integer),
        Expression::constant(Value::integer(1024)),
        LogicalType::Boolean,
    );

    c.bench_function("select_flat_2048", |b| {
        b.iter(|| {
            let (_sel, count) = executor.execute_select(black_box(&predicate), black_box(&chunk)).unwrap();
            black_box(count)
        })
    });
}

criterion_group!(benches, bench_add_flat_flat, bench_filter_select);
criterion_main!(benches);
