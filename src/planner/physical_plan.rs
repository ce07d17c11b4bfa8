//! The physical operator tree: the only input the runner consumes. Nothing
//! upstream (parsing, binding, logical planning, cost-based optimization)
//! lives here - a tree is built by hand or by an external planner and handed
//! straight to the runner.

use crate::catalog::TableReader;
use crate::execution::hash_table::{JoinHashTable, JoinType};
use crate::expression::aggregate::AggregateFunction;
use crate::expression::expression::Expression;
use crate::types::LogicalType;
use std::collections::HashMap;

/// `Scan -> Filter -> Project -> Join -> HashAggregate -> Order -> Limit`,
/// in any composition a plan needs. Every variant owns its children and its
/// own execution state; plans are built once and run once.
pub enum PhysicalOperator {
    Scan(ScanOperator),
    Filter(FilterOperator),
    Project(ProjectOperator),
    HashJoin(Box<HashJoinOperator>),
    HashAggregate(Box<HashAggregateOperator>),
    Order(OrderOperator),
    Limit(LimitOperator),
}

impl PhysicalOperator {
    pub fn output_types(&self) -> Vec<LogicalType> {
        match self {
            PhysicalOperator::Scan(op) => op.types.clone(),
            PhysicalOperator::Filter(op) => op.child.output_types(),
            PhysicalOperator::Project(op) => op.expressions.iter().map(|e| e.return_type()).collect(),
            PhysicalOperator::HashJoin(op) => op.output_types.clone(),
            PhysicalOperator::HashAggregate(op) => op.output_types.clone(),
            PhysicalOperator::Order(op) => op.child.output_types(),
            PhysicalOperator::Limit(op) => op.child.output_types(),
        }
    }

    /// Releases every resource owned transitively by this plan tree - at a
    /// leaf, that means closing the underlying `TableReader`. Called once by
    /// the runner, whether the tree ran to completion or was cut short by a
    /// row cap.
    pub fn close(&mut self) -> crate::common::error::PrismDBResult<()> {
        match self {
            PhysicalOperator::Scan(op) => op.reader.close(),
            PhysicalOperator::Filter(op) => op.child.close(),
            PhysicalOperator::Project(op) => op.child.close(),
            PhysicalOperator::HashJoin(op) => {
                op.probe_child.close()?;
                op.build_child.close()
            }
            PhysicalOperator::HashAggregate(op) => op.child.close(),
            PhysicalOperator::Order(op) => op.child.close(),
            PhysicalOperator::Limit(op) => op.child.close(),
        }
    }
}

/// Pulls raw chunks from a `TableReader`, applying column projection (done by
/// the reader itself) and an optional pushed-down residual filter.
pub struct ScanOperator {
    pub reader: Box<dyn TableReader>,
    pub types: Vec<LogicalType>,
    pub filter: Option<Expression>,
    pub done: bool,
    pub rows_scanned: usize,
}

impl ScanOperator {
    pub fn new(reader: Box<dyn TableReader>, types: Vec<LogicalType>, filter: Option<Expression>) -> Self {
        Self {
            reader,
            types,
            filter,
            done: false,
            rows_scanned: 0,
        }
    }
}

pub struct FilterOperator {
    pub child: Box<PhysicalOperator>,
    pub predicate: Expression,
}

impl FilterOperator {
    pub fn new(child: PhysicalOperator, predicate: Expression) -> Self {
        Self {
            child: Box::new(child),
            predicate,
        }
    }
}

pub struct ProjectOperator {
    pub child: Box<PhysicalOperator>,
    pub expressions: Vec<Expression>,
}

impl ProjectOperator {
    pub fn new(child: PhysicalOperator, expressions: Vec<Expression>) -> Self {
        Self {
            child: Box::new(child),
            expressions,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinPhase {
    Building,
    Probing,
    Done,
}

/// Build side is pulled to exhaustion into `table` before probing begins;
/// matched (and, for outer/anti joins, unmatched) rows queue in `pending`
/// until drained into output chunks.
pub struct HashJoinOperator {
    pub probe_child: Box<PhysicalOperator>,
    pub build_child: Box<PhysicalOperator>,
    pub probe_keys: Vec<Expression>,
    pub build_keys: Vec<Expression>,
    pub build_payload: Vec<Expression>,
    pub join_type: JoinType,
    pub output_types: Vec<LogicalType>,
    pub table: JoinHashTable,
    pub phase: JoinPhase,
    pub pending: std::collections::VecDeque<Vec<crate::types::Value>>,
}

impl HashJoinOperator {
    pub fn new(
        probe_child: PhysicalOperator,
        build_child: PhysicalOperator,
        probe_keys: Vec<Expression>,
        build_keys: Vec<Expression>,
        build_payload: Vec<Expression>,
        join_type: JoinType,
    ) -> Self {
        let mut output_types = probe_child.output_types();
        output_types.extend(build_payload.iter().map(|e| e.return_type()));
        Self {
            probe_child: Box::new(probe_child),
            build_child: Box::new(build_child),
            probe_keys,
            build_keys,
            build_payload,
            join_type,
            output_types,
            table: JoinHashTable::new(),
            phase: JoinPhase::Building,
            pending: std::collections::VecDeque::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggPhase {
    Accumulating,
    Scanning,
    Done,
}

/// One aggregate function applied to an optional input expression (`None`
/// for `count(*)`).
pub struct AggregateSpec {
    pub function: Box<dyn AggregateFunction>,
    pub input: Option<Expression>,
    pub output_type: LogicalType,
}

/// Per-group accumulator state: the group's key values (for emission) plus
/// one byte-buffer per aggregate function.
pub struct GroupState {
    pub key_values: Vec<crate::types::Value>,
    pub agg_states: Vec<Vec<u8>>,
}

/// Accumulate-then-scan hash aggregation. Groups are keyed by a string
/// encoding of the group-by values (stable, collision-free for the types
/// this core supports) rather than a typed hash map key, since `Value`
/// doesn't implement `Eq`/`Hash` for its floating-point variants.
pub struct HashAggregateOperator {
    pub child: Box<PhysicalOperator>,
    pub group_exprs: Vec<Expression>,
    pub aggregates: Vec<AggregateSpec>,
    pub having: Option<Expression>,
    pub output_types: Vec<LogicalType>,
    pub phase: AggPhase,
    pub groups: HashMap<String, GroupState>,
    pub group_order: Vec<String>,
    pub scan_pos: usize,
}

impl HashAggregateOperator {
    pub fn new(
        child: PhysicalOperator,
        group_exprs: Vec<Expression>,
        aggregates: Vec<AggregateSpec>,
        having: Option<Expression>,
    ) -> Self {
        let mut output_types: Vec<LogicalType> = group_exprs.iter().map(|e| e.return_type()).collect();
        output_types.extend(aggregates.iter().map(|a| a.output_type.clone()));
        Self {
            child: Box::new(child),
            group_exprs,
            aggregates,
            having,
            output_types,
            phase: AggPhase::Accumulating,
            groups: HashMap::new(),
            group_order: Vec::new(),
            scan_pos: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    Accumulating,
    Emitting,
    Done,
}

/// A single ORDER BY key: which expression to sort on, and in which
/// direction.
pub struct SortKey {
    pub expression: Expression,
    pub descending: bool,
}

/// Accumulate-then-emit sort. All input rows are materialized, sorted once
/// on input exhaustion, then streamed back out in `STANDARD_VECTOR_SIZE`
/// batches.
pub struct OrderOperator {
    pub child: Box<PhysicalOperator>,
    pub keys: Vec<SortKey>,
    pub phase: OrderPhase,
    pub rows: Vec<Vec<crate::types::Value>>,
    pub emit_pos: usize,
}

impl OrderOperator {
    pub fn new(child: PhysicalOperator, keys: Vec<SortKey>) -> Self {
        Self {
            child: Box::new(child),
            keys,
            phase: OrderPhase::Accumulating,
            rows: Vec::new(),
            emit_pos: 0,
        }
    }
}

/// Pass-through row counter; transitions to `Finished` once `count` rows
/// have been emitted (a final chunk may be truncated to land exactly on it).
pub struct LimitOperator {
    pub child: Box<PhysicalOperator>,
    pub count: usize,
    pub emitted: usize,
}

impl LimitOperator {
    pub fn new(child: PhysicalOperator, count: usize) -> Self {
        Self {
            child: Box::new(child),
            count,
            emitted: 0,
        }
    }
}
