//! The pull-based execution loop: `Runner` drives a `PhysicalOperator` tree
//! to completion, and `pull` implements each operator's state machine.
//!
//! Every operator speaks the same three-value protocol per §4.6:
//! `NeedMoreInput` (child exhausted this call without producing a row batch,
//! ask again), `HaveMoreOutput` (a chunk is ready, there may be more),
//! `Finished` (this operator will never produce another row).

use crate::catalog::ReadResult;
use crate::common::error::PrismDBResult;
use crate::execution::context::ExecutionContext;
use crate::expression::executor::ExpressionExecutor;
use crate::planner::physical_plan::{
    AggPhase, FilterOperator, HashAggregateOperator, HashJoinOperator, JoinPhase, LimitOperator,
    OrderOperator, OrderPhase, PhysicalOperator, ProjectOperator, ScanOperator,
};
use crate::types::{DataChunk, SelectionVector, Value, Vector};
use crate::execution::hash_table::JoinType;
use std::cmp::Ordering;
use tracing::debug;

/// Result of pulling a leaf source operator (Scan).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceResultType {
    HaveMoreOutput,
    Finished,
}

/// Result of pulling any operator in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorResultType {
    NeedMoreInput,
    HaveMoreOutput,
    Finished,
}

/// Drives one physical operator tree to completion, forwarding every
/// non-empty output chunk to `sink`. Honors `max_output_rows`; the operator
/// tree itself honors `max_scan_rows` at the scan leaf.
pub struct Runner<'a> {
    ctx: &'a ExecutionContext,
    rows_emitted: usize,
}

impl<'a> Runner<'a> {
    pub fn new(ctx: &'a ExecutionContext) -> Self {
        Self { ctx, rows_emitted: 0 }
    }

    /// Pull `root` until `Finished`, invoking `sink` for every non-empty
    /// output chunk. Stops early once `max_output_rows` rows have been
    /// produced.
    pub fn run(&mut self, root: &mut PhysicalOperator, mut sink: impl FnMut(&DataChunk) -> PrismDBResult<()>) -> PrismDBResult<()> {
        loop {
            if let Some(max) = self.ctx.max_output_rows() {
                if self.rows_emitted >= max {
                    debug!(rows_emitted = self.rows_emitted, "runner hit max_output_rows, stopping");
                    root.close()?;
                    return Ok(());
                }
            }

            let (result, chunk) = pull_chunk(root, self.ctx)?;
            match result {
                OperatorResultType::Finished => {
                    root.close()?;
                    return Ok(());
                }
                OperatorResultType::NeedMoreInput => continue,
                OperatorResultType::HaveMoreOutput => {
                    if chunk.count() == 0 {
                        continue;
                    }
                    self.rows_emitted += chunk.count();
                    sink(&chunk)?;
                }
            }
        }
    }
}

fn pull_chunk(op: &mut PhysicalOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    match op {
        PhysicalOperator::Scan(scan) => pull_scan(scan, ctx),
        PhysicalOperator::Filter(filter) => pull_filter(filter, ctx),
        PhysicalOperator::Project(project) => pull_project(project, ctx),
        PhysicalOperator::HashJoin(join) => pull_hash_join(join, ctx),
        PhysicalOperator::HashAggregate(agg) => pull_hash_aggregate(agg, ctx),
        PhysicalOperator::Order(order) => pull_order(order, ctx),
        PhysicalOperator::Limit(limit) => pull_limit(limit, ctx),
    }
}

fn empty_chunk(op: &PhysicalOperator) -> PrismDBResult<DataChunk> {
    DataChunk::with_capacity(op.output_types(), 0)
}

fn pull_scan(scan: &mut ScanOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    if scan.done {
        return Ok((OperatorResultType::Finished, DataChunk::with_capacity(scan.types.clone(), 0)));
    }

    let mut chunk = DataChunk::with_capacity(scan.types.clone(), crate::common::constants::STANDARD_VECTOR_SIZE);
    match scan.reader.next(&mut chunk)? {
        ReadResult::Done => {
            scan.done = true;
            debug!("scan exhausted underlying table reader");
            Ok((OperatorResultType::Finished, DataChunk::with_capacity(scan.types.clone(), 0)))
        }
        ReadResult::HaveOutput => {
            // max_scan_rows caps raw rows pulled from the table, before the
            // pushed-down residual filter is applied.
            let chunk = if let Some(max) = ctx.max_scan_rows() {
                if scan.rows_scanned >= max {
                    scan.done = true;
                    debug!(rows_scanned = scan.rows_scanned, "scan hit max_scan_rows before this batch");
                    return Ok((OperatorResultType::Finished, DataChunk::with_capacity(scan.types.clone(), 0)));
                }
                let remaining = max - scan.rows_scanned;
                if chunk.count() > remaining {
                    scan.done = true;
                    debug!(rows_scanned = scan.rows_scanned + remaining, "scan truncated batch at max_scan_rows");
                    chunk.slice_range(0, remaining)?
                } else {
                    chunk
                }
            } else {
                chunk
            };
            scan.rows_scanned += chunk.count();

            let chunk = if let Some(filter) = &scan.filter {
                let exec = ExpressionExecutor::new();
                let (sel, count) = exec.execute_select(filter, &chunk)?;
                if count == chunk.count() {
                    chunk
                } else {
                    chunk.slice(&sel)?
                }
            } else {
                chunk
            };

            debug!(rows = chunk.count(), "scan produced chunk");
            Ok((OperatorResultType::HaveMoreOutput, chunk))
        }
    }
}

fn pull_filter(filter: &mut FilterOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    loop {
        let (result, chunk) = pull_chunk(&mut filter.child, ctx)?;
        match result {
            OperatorResultType::Finished => return Ok((OperatorResultType::Finished, empty_chunk(&filter.child)?)),
            OperatorResultType::NeedMoreInput => continue,
            OperatorResultType::HaveMoreOutput => {
                if chunk.count() == 0 {
                    continue;
                }
                let exec = ExpressionExecutor::new();
                let (sel, count) = exec.execute_select(&filter.predicate, &chunk)?;
                if count == 0 {
                    // Entire chunk filtered away; ask the caller to pull again
                    // rather than forward an empty batch.
                    return Ok((OperatorResultType::NeedMoreInput, empty_chunk(&filter.child)?));
                }
                let out = if count == chunk.count() { chunk } else { chunk.slice(&sel)? };
                return Ok((OperatorResultType::HaveMoreOutput, out));
            }
        }
    }
}

fn pull_project(project: &mut ProjectOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    let (result, chunk) = pull_chunk(&mut project.child, ctx)?;
    match result {
        OperatorResultType::Finished => {
            let types = project.expressions.iter().map(|e| e.return_type()).collect();
            Ok((OperatorResultType::Finished, DataChunk::with_capacity(types, 0)))
        }
        OperatorResultType::NeedMoreInput => Ok((
            OperatorResultType::NeedMoreInput,
            DataChunk::with_capacity(project.expressions.iter().map(|e| e.return_type()).collect(), 0),
        )),
        OperatorResultType::HaveMoreOutput => {
            let exec = ExpressionExecutor::new();
            let mut out = DataChunk::with_capacity(project.expressions.iter().map(|e| e.return_type()).collect(), chunk.count());
            out.resize(chunk.count())?;
            exec.execute_list(&project.expressions, &chunk, &mut out)?;
            Ok((OperatorResultType::HaveMoreOutput, out))
        }
    }
}

fn evaluate_row_key(exprs: &[crate::expression::expression::Expression], chunk: &DataChunk) -> PrismDBResult<Vec<Vec<Value>>> {
    let exec = ExpressionExecutor::new();
    let mut columns = Vec::with_capacity(exprs.len());
    for expr in exprs {
        let vector = exec.execute(expr, chunk)?;
        let mut col = Vec::with_capacity(chunk.count());
        for i in 0..chunk.count() {
            col.push(vector.get_value(i)?);
        }
        columns.push(col);
    }
    // transpose: columns -> rows
    let row_count = chunk.count();
    let mut rows = vec![Vec::with_capacity(exprs.len()); row_count];
    for col in columns {
        for (row, value) in rows.iter_mut().zip(col.into_iter()) {
            row.push(value);
        }
    }
    Ok(rows)
}

fn pull_hash_join(join: &mut HashJoinOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    loop {
        match join.phase {
            JoinPhase::Building => {
                let (result, chunk) = pull_chunk(&mut join.build_child, ctx)?;
                match result {
                    OperatorResultType::NeedMoreInput => continue,
                    OperatorResultType::Finished => {
                        debug!(rows = join.table.len(), "hash join build side complete");
                        join.phase = JoinPhase::Probing;
                        continue;
                    }
                    OperatorResultType::HaveMoreOutput => {
                        if chunk.count() == 0 {
                            continue;
                        }
                        let keys = evaluate_row_key(&join.build_keys, &chunk)?;
                        let payloads = evaluate_row_key(&join.build_payload, &chunk)?;
                        for (key, payload) in keys.into_iter().zip(payloads.into_iter()) {
                            join.table.insert(key, payload);
                        }
                        continue;
                    }
                }
            }
            JoinPhase::Probing => {
                if let Some(row) = join.pending.pop_front() {
                    return materialize_pending_batch(join, row);
                }
                let (result, chunk) = pull_chunk(&mut join.probe_child, ctx)?;
                match result {
                    OperatorResultType::NeedMoreInput => continue,
                    OperatorResultType::Finished => {
                        join.phase = JoinPhase::Done;
                        continue;
                    }
                    OperatorResultType::HaveMoreOutput => {
                        if chunk.count() == 0 {
                            continue;
                        }
                        probe_chunk_into_pending(join, &chunk)?;
                        continue;
                    }
                }
            }
            JoinPhase::Done => {
                return Ok((OperatorResultType::Finished, DataChunk::with_capacity(join.output_types.clone(), 0)));
            }
        }
    }
}

fn probe_chunk_into_pending(join: &mut HashJoinOperator, chunk: &DataChunk) -> PrismDBResult<()> {
    let keys = evaluate_row_key(&join.probe_keys, chunk)?;
    let full_rows = full_row_values(chunk)?;

    for (probe_row, key) in full_rows.into_iter().zip(keys.into_iter()) {
        let mut scan = join.table.probe(&key);
        let mut any_match = false;
        while let Some(payload) = scan.next()? {
            any_match = true;
            match join.join_type {
                JoinType::Semi => {
                    let mut row = probe_row.clone();
                    row.extend(payload.iter().cloned());
                    join.pending.push_back(row);
                    break;
                }
                JoinType::Anti => break,
                JoinType::Inner | JoinType::Left => {
                    let mut row = probe_row.clone();
                    row.extend(payload.iter().cloned());
                    join.pending.push_back(row);
                }
            }
        }
        if !any_match {
            match join.join_type {
                JoinType::Left => {
                    let mut row = probe_row.clone();
                    let null_payload = vec![Value::Null; join.build_payload.len()];
                    row.extend(null_payload);
                    join.pending.push_back(row);
                }
                JoinType::Anti => {
                    join.pending.push_back(probe_row.clone());
                }
                JoinType::Inner | JoinType::Semi => {}
            }
        }
    }
    Ok(())
}

fn full_row_values(chunk: &DataChunk) -> PrismDBResult<Vec<Vec<Value>>> {
    let mut rows = Vec::with_capacity(chunk.count());
    for row_idx in 0..chunk.count() {
        let mut row = Vec::with_capacity(chunk.column_count());
        for col_idx in 0..chunk.column_count() {
            row.push(chunk.get_value(row_idx, col_idx)?);
        }
        rows.push(row);
    }
    Ok(rows)
}

/// Drain up to `STANDARD_VECTOR_SIZE` rows (including the one already popped
/// by the caller) from `join.pending` into an output chunk.
fn materialize_pending_batch(join: &mut HashJoinOperator, first: Vec<Value>) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    let cap = crate::common::constants::STANDARD_VECTOR_SIZE;
    let mut rows = vec![first];
    while rows.len() < cap {
        match join.pending.pop_front() {
            Some(row) => rows.push(row),
            None => break,
        }
    }
    let chunk = rows_to_chunk(&rows, &join.output_types)?;
    Ok((OperatorResultType::HaveMoreOutput, chunk))
}

fn rows_to_chunk(rows: &[Vec<Value>], types: &[crate::types::LogicalType]) -> PrismDBResult<DataChunk> {
    let count = rows.len();
    let mut vectors = Vec::with_capacity(types.len());
    for (col_idx, ty) in types.iter().enumerate() {
        let mut vector = Vector::new(ty.clone(), count);
        vector.resize(count)?;
        for (row_idx, row) in rows.iter().enumerate() {
            vector.set_value(row_idx, &row[col_idx])?;
        }
        vectors.push(vector);
    }
    DataChunk::from_vectors(vectors)
}

fn group_key_string(values: &[Value]) -> String {
    values
        .iter()
        .map(value_to_key_fragment)
        .collect::<Vec<_>>()
        .join("\u{1}")
}

/// Serialize one `Value` into a hash-key fragment. Deliberately avoids
/// `Display`'s quoting of strings so that `"a"` and `a` key the same bucket.
fn value_to_key_fragment(value: &Value) -> String {
    match value {
        Value::Null => "\u{0}NULL".to_string(),
        Value::Boolean(b) => b.to_string(),
        Value::TinyInt(i) => i.to_string(),
        Value::SmallInt(i) => i.to_string(),
        Value::Integer(i) => i.to_string(),
        Value::BigInt(i) => i.to_string(),
        Value::HugeInt { high, low } => format!("{}:{}", high, low),
        Value::Float(f) => f.to_string(),
        Value::Double(f) => f.to_string(),
        Value::Varchar(s) | Value::Char(s) => s.clone(),
        Value::Date(d) => d.to_string(),
        Value::Time(t) => t.to_string(),
        Value::Timestamp(t) => t.to_string(),
        other => format!("{:?}", other),
    }
}

fn pull_hash_aggregate(agg: &mut HashAggregateOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    loop {
        match agg.phase {
            AggPhase::Accumulating => {
                let (result, chunk) = pull_chunk(&mut agg.child, ctx)?;
                match result {
                    OperatorResultType::NeedMoreInput => continue,
                    OperatorResultType::Finished => {
                        debug!(groups = agg.groups.len(), "hash aggregate accumulation complete");
                        agg.phase = AggPhase::Scanning;
                        continue;
                    }
                    OperatorResultType::HaveMoreOutput => {
                        if chunk.count() == 0 {
                            continue;
                        }
                        accumulate_chunk(agg, &chunk)?;
                        continue;
                    }
                }
            }
            AggPhase::Scanning => {
                if agg.scan_pos >= agg.group_order.len() {
                    agg.phase = AggPhase::Done;
                    continue;
                }
                let cap = crate::common::constants::STANDARD_VECTOR_SIZE;
                let mut rows = Vec::new();
                while rows.len() < cap && agg.scan_pos < agg.group_order.len() {
                    let key = agg.group_order[agg.scan_pos].clone();
                    agg.scan_pos += 1;
                    let group = agg.groups.get(&key).expect("group_order entry must exist in groups");
                    let mut row = group.key_values.clone();
                    for (spec, state) in agg.aggregates.iter().zip(group.agg_states.iter()) {
                        row.push(spec.function.finalize(state)?);
                    }
                    rows.push(row);
                }
                let chunk = rows_to_chunk(&rows, &agg.output_types)?;
                let chunk = if let Some(having) = &agg.having {
                    let exec = ExpressionExecutor::new();
                    let (sel, count) = exec.execute_select(having, &chunk)?;
                    if count == chunk.count() {
                        chunk
                    } else {
                        chunk.slice(&sel)?
                    }
                } else {
                    chunk
                };
                if chunk.count() == 0 {
                    continue;
                }
                return Ok((OperatorResultType::HaveMoreOutput, chunk));
            }
            AggPhase::Done => {
                return Ok((OperatorResultType::Finished, DataChunk::with_capacity(agg.output_types.clone(), 0)));
            }
        }
    }
}

fn accumulate_chunk(agg: &mut HashAggregateOperator, chunk: &DataChunk) -> PrismDBResult<()> {
    let exec = ExpressionExecutor::new();
    let group_keys = evaluate_row_key(&agg.group_exprs, chunk)?;

    let agg_inputs: Vec<Option<Vector>> = agg
        .aggregates
        .iter()
        .map(|spec| spec.input.as_ref().map(|e| exec.execute(e, chunk)).transpose())
        .collect::<PrismDBResult<_>>()?;

    for row_idx in 0..chunk.count() {
        let key_values = group_keys[row_idx].clone();
        let key = group_key_string(&key_values);
        if !agg.groups.contains_key(&key) {
            let agg_states = agg
                .aggregates
                .iter()
                .map(|spec| {
                    let mut state = vec![0u8; spec.function.state_size()];
                    spec.function.init(&mut state);
                    state
                })
                .collect();
            agg.groups.insert(
                key.clone(),
                crate::planner::physical_plan::GroupState { key_values, agg_states },
            );
            agg.group_order.push(key.clone());
        }

        let group = agg.groups.get_mut(&key).expect("just inserted");
        for (spec, (state, input)) in agg
            .aggregates
            .iter()
            .zip(group.agg_states.iter_mut().zip(agg_inputs.iter()))
        {
            match input {
                Some(vector) => {
                    let single = vector.slice(&SelectionVector::from_indices(vec![row_idx]));
                    spec.function.simple_update(&single, state, 1)?;
                }
                None => {
                    // count(*): no input vector, update treats every row as present.
                    let dummy = Vector::constant(crate::types::LogicalType::Boolean, &Value::Boolean(true), 1)?;
                    spec.function.simple_update(&dummy, state, 1)?;
                }
            }
        }
    }
    Ok(())
}

fn pull_order(order: &mut OrderOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    loop {
        match order.phase {
            OrderPhase::Accumulating => {
                let (result, chunk) = pull_chunk(&mut order.child, ctx)?;
                match result {
                    OperatorResultType::NeedMoreInput => continue,
                    OperatorResultType::Finished => {
                        sort_rows(order)?;
                        order.phase = OrderPhase::Emitting;
                        continue;
                    }
                    OperatorResultType::HaveMoreOutput => {
                        if chunk.count() == 0 {
                            continue;
                        }
                        order.rows.extend(full_row_values(&chunk)?);
                        continue;
                    }
                }
            }
            OrderPhase::Emitting => {
                if order.emit_pos >= order.rows.len() {
                    order.phase = OrderPhase::Done;
                    continue;
                }
                let cap = crate::common::constants::STANDARD_VECTOR_SIZE;
                let end = (order.emit_pos + cap).min(order.rows.len());
                let types = order.child.output_types();
                let chunk = rows_to_chunk(&order.rows[order.emit_pos..end], &types)?;
                order.emit_pos = end;
                return Ok((OperatorResultType::HaveMoreOutput, chunk));
            }
            OrderPhase::Done => {
                return Ok((OperatorResultType::Finished, DataChunk::with_capacity(order.child.output_types(), 0)));
            }
        }
    }
}

fn sort_rows(order: &mut OrderOperator) -> PrismDBResult<()> {
    // Stable multi-key sort: later comparator keys only break ties left by
    // earlier ones, matching SQL's ORDER BY col1, col2, ... semantics.
    let types = order.child.output_types();
    let key_indices: Vec<(usize, bool)> = order
        .keys
        .iter()
        .map(|k| {
            let idx = match &k.expression {
                crate::expression::expression::Expression::Column { index, .. } => *index,
                _ => 0,
            };
            (idx, k.descending)
        })
        .collect();
    let _ = &types;

    order.rows.sort_by(|a, b| {
        for (idx, descending) in &key_indices {
            let ord = a[*idx].compare(&b[*idx]).unwrap_or(Ordering::Equal);
            let ord = if *descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    });
    Ok(())
}

fn pull_limit(limit: &mut LimitOperator, ctx: &ExecutionContext) -> PrismDBResult<(OperatorResultType, DataChunk)> {
    if limit.emitted >= limit.count {
        return Ok((OperatorResultType::Finished, DataChunk::with_capacity(limit.child.output_types(), 0)));
    }
    loop {
        let (result, chunk) = pull_chunk(&mut limit.child, ctx)?;
        match result {
            OperatorResultType::NeedMoreInput => continue,
            OperatorResultType::Finished => {
                return Ok((OperatorResultType::Finished, DataChunk::with_capacity(limit.child.output_types(), 0)))
            }
            OperatorResultType::HaveMoreOutput => {
                if chunk.count() == 0 {
                    continue;
                }
                let remaining = limit.count - limit.emitted;
                let out = if chunk.count() <= remaining {
                    chunk
                } else {
                    chunk.slice(&SelectionVector::from_indices((0..remaining).collect()))?
                };
                limit.emitted += out.count();
                return Ok((OperatorResultType::HaveMoreOutput, out));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{MemoryCatalog, MemoryTable, TableStats, TableSchema};
    use crate::config::Config;
    use crate::expression::aggregate::{CountStarFunction, SumFunction};
    use crate::expression::expression::{Expression, FunctionType};
    use crate::planner::physical_plan::{AggregateSpec, FilterOperator, HashAggregateOperator, ScanOperator};
    use crate::types::LogicalType;

    fn nation_table() -> MemoryTable {
        MemoryTable {
            schema: TableSchema {
                columns: vec!["n_nationkey".to_string(), "n_name".to_string()],
                types: vec![LogicalType::Integer, LogicalType::Varchar],
                primary_key: vec![0],
                stats: TableStats { row_count: 3 },
            },
            columns: vec![
                vec![Value::integer(1), Value::integer(2), Value::integer(3)],
                vec![
                    Value::varchar("VIETNAM".to_string()),
                    Value::varchar("CHINA".to_string()),
                    Value::varchar("VIETNAM".to_string()),
                ],
            ],
        }
    }

    fn run_to_rows(op: &mut PhysicalOperator, ctx: &ExecutionContext) -> PrismDBResult<Vec<DataChunk>> {
        let mut chunks = Vec::new();
        loop {
            let (result, chunk) = pull_chunk(op, ctx)?;
            match result {
                OperatorResultType::Finished => break,
                OperatorResultType::NeedMoreInput => continue,
                OperatorResultType::HaveMoreOutput => {
                    if chunk.count() > 0 {
                        chunks.push(chunk);
                    }
                }
            }
        }
        Ok(chunks)
    }

    fn test_ctx() -> ExecutionContext {
        ExecutionContext::new(Config::for_query("", "", "test", ""))
    }

    #[test]
    fn test_scan_then_filter_selects_matching_rows() -> PrismDBResult<()> {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("tpch", "nation", nation_table());
        let reader = catalog.open("tpch", "nation", &[])?;

        let scan = ScanOperator::new(
            reader,
            vec![LogicalType::Integer, LogicalType::Varchar],
            None,
        );
        let predicate = Expression::binary(
            FunctionType::Equal,
            Expression::column(1, LogicalType::Varchar),
            Expression::constant(Value::varchar("VIETNAM".to_string())),
            LogicalType::Boolean,
        );
        let mut plan = PhysicalOperator::Filter(FilterOperator::new(PhysicalOperator::Scan(scan), predicate));

        let ctx = test_ctx();
        let chunks = run_to_rows(&mut plan, &ctx)?;
        let total: usize = chunks.iter().map(|c| c.count()).sum();
        assert_eq!(total, 2);
        Ok(())
    }

    #[test]
    fn test_hash_aggregate_counts_groups() -> PrismDBResult<()> {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("tpch", "nation", nation_table());
        let reader = catalog.open("tpch", "nation", &[])?;
        let scan = ScanOperator::new(reader, vec![LogicalType::Integer, LogicalType::Varchar], None);

        let agg = HashAggregateOperator::new(
            PhysicalOperator::Scan(scan),
            vec![Expression::column(1, LogicalType::Varchar)],
            vec![AggregateSpec {
                function: Box::new(CountStarFunction),
                input: None,
                output_type: LogicalType::BigInt,
            }],
            None,
        );
        let mut plan = PhysicalOperator::HashAggregate(Box::new(agg));
        let ctx = test_ctx();
        let chunks = run_to_rows(&mut plan, &ctx)?;
        let total_rows: usize = chunks.iter().map(|c| c.count()).sum();
        assert_eq!(total_rows, 2); // VIETNAM, CHINA

        let mut found_vietnam_count = None;
        for chunk in &chunks {
            for i in 0..chunk.count() {
                if chunk.get_value(i, 0)? == Value::varchar("VIETNAM".to_string()) {
                    found_vietnam_count = Some(chunk.get_value(i, 1)?);
                }
            }
        }
        assert_eq!(found_vietnam_count, Some(Value::BigInt(2)));
        Ok(())
    }

    #[test]
    fn test_sum_aggregate_over_group() -> PrismDBResult<()> {
        let table = MemoryTable {
            schema: TableSchema {
                columns: vec!["g".to_string(), "v".to_string()],
                types: vec![LogicalType::Integer, LogicalType::Integer],
                primary_key: vec![],
                stats: TableStats::default(),
            },
            columns: vec![
                vec![Value::integer(1), Value::integer(1), Value::integer(2)],
                vec![Value::integer(10), Value::integer(20), Value::integer(5)],
            ],
        };
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("t", "g", table);
        let reader = catalog.open("t", "g", &[])?;
        let scan = ScanOperator::new(reader, vec![LogicalType::Integer, LogicalType::Integer], None);

        let agg = HashAggregateOperator::new(
            PhysicalOperator::Scan(scan),
            vec![Expression::column(0, LogicalType::Integer)],
            vec![AggregateSpec {
                function: Box::new(SumFunction::new(LogicalType::BigInt)),
                input: Some(Expression::column(1, LogicalType::Integer)),
                output_type: LogicalType::HugeInt,
            }],
            None,
        );
        let mut plan = PhysicalOperator::HashAggregate(Box::new(agg));
        let ctx = test_ctx();
        let chunks = run_to_rows(&mut plan, &ctx)?;
        let mut sums = std::collections::HashMap::new();
        for chunk in &chunks {
            for i in 0..chunk.count() {
                sums.insert(chunk.get_value(i, 0)?, chunk.get_value(i, 1)?);
            }
        }
        assert_eq!(sums.get(&Value::integer(1)), Some(&Value::HugeInt { high: 0, low: 30 }));
        assert_eq!(sums.get(&Value::integer(2)), Some(&Value::HugeInt { high: 0, low: 5 }));
        Ok(())
    }

    #[test]
    fn test_limit_truncates_output() -> PrismDBResult<()> {
        let mut catalog = MemoryCatalog::new();
        catalog.add_table("tpch", "nation", nation_table());
        let reader = catalog.open("tpch", "nation", &[])?;
        let scan = ScanOperator::new(reader, vec![LogicalType::Integer, LogicalType::Varchar], None);
        let mut plan = PhysicalOperator::Limit(LimitOperator::new(PhysicalOperator::Scan(scan), 2));
        let ctx = test_ctx();
        let chunks = run_to_rows(&mut plan, &ctx)?;
        let total: usize = chunks.iter().map(|c| c.count()).sum();
        assert_eq!(total, 2);
        Ok(())
    }
}
