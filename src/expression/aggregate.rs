//! Byte-state aggregate function protocol: state_size/init/update/combine/finalize.
//!
//! Each aggregate owns a fixed-size state region per group. The hash aggregate
//! operator allocates one region per distinct group key and hands out raw byte
//! slices; the aggregate function interprets those bytes as its own typed state
//! via a zero-cost view, never leaking the layout to callers.

use crate::common::error::{PrismDBError, PrismDBResult};
use crate::types::vector::ChunkValidity;
use crate::types::{LogicalType, Value, Vector};

/// A five-tuple aggregate: state_size, init, update, combine, finalize, plus a
/// null-handling flag consulted by the driver loop in the hash-aggregate operator.
pub trait AggregateFunction: std::fmt::Debug {
    /// Number of bytes one group's state occupies.
    fn state_size(&self) -> usize;

    /// Zero a freshly allocated state region.
    fn init(&self, state: &mut [u8]);

    /// Scatter update: for each logical row, merge `input`'s value at that row into
    /// the state region pointed to by `state_ptrs[row]`.
    fn update(&self, input: &Vector, state_ptrs: &[*mut u8], count: usize) -> PrismDBResult<()>;

    /// Single-state update used when there is no GROUP BY.
    fn simple_update(&self, input: &Vector, state: &mut [u8], count: usize) -> PrismDBResult<()>;

    /// Merge a source state into a target state (partial-aggregate combination).
    fn combine(&self, source: &[u8], target: &mut [u8]) -> PrismDBResult<()>;

    /// Produce the final value for one state, or NULL if the state was never set.
    fn finalize(&self, state: &[u8]) -> PrismDBResult<Value>;

    /// Whether null input rows are skipped (true for sum/min/max) or counted
    /// (false for count(*), true for count(col) - handled by the two Count variants).
    fn ignore_null(&self) -> bool;

    fn return_type(&self) -> LogicalType;
}

/// # Safety-free note: `update`'s `*mut u8` pointers.
///
/// The hash-aggregate operator owns the state storage for the duration of a
/// pull call and is the only writer; `update` never aliases a pointer with
/// another live borrow, so raw pointers here are a deliberate escape from the
/// single-state-per-call shape that `&mut [u8]` would otherwise force, matching
/// the scatter-update contract described in the component design.
/// Reinterpret a state byte region as `&T` / `&mut T`. `T` must be a `#[repr(C)]`
/// plain-old-data type whose size matches `state_size()`.
#[inline]
fn state_ref<T>(state: &[u8]) -> &T {
    debug_assert!(state.len() >= std::mem::size_of::<T>());
    unsafe { &*(state.as_ptr() as *const T) }
}

#[inline]
fn state_mut<T>(state: &mut [u8]) -> &mut T {
    debug_assert!(state.len() >= std::mem::size_of::<T>());
    unsafe { &mut *(state.as_mut_ptr() as *mut T) }
}

fn for_each_row(
    input: &Vector,
    count: usize,
    ignore_null: bool,
    mut f: impl FnMut(usize, &Value),
) -> PrismDBResult<()> {
    let validity = input.get_validity_mask();
    // The vector's own validity mask is indexed by physical slot, not logical
    // row, for CONST/DICT formats; go through `unified()` so row i always maps
    // to the right validity bit regardless of physical format.
    let unified = input.unified();
    let _ = validity;
    let classify = |start: usize, end: usize| -> ChunkValidity {
        let mut any_valid = false;
        let mut any_null = false;
        for i in start..end {
            if unified.is_valid(i) {
                any_valid = true;
            } else {
                any_null = true;
            }
        }
        match (any_valid, any_null) {
            (true, false) => ChunkValidity::AllValid,
            (false, true) => ChunkValidity::NoneValid,
            _ => ChunkValidity::Partial,
        }
    };

    let mut start = 0;
    while start < count {
        let end = (start + 64).min(count);
        match classify(start, end) {
            ChunkValidity::NoneValid if ignore_null => {}
            ChunkValidity::AllValid => {
                for i in start..end {
                    let value = unified.get_value(i)?;
                    f(i, &value);
                }
            }
            _ => {
                for i in start..end {
                    if !ignore_null || unified.is_valid(i) {
                        let value = unified.get_value(i)?;
                        f(i, &value);
                    }
                }
            }
        }
        start = end;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// count(*) / count(col)
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct CountStateBytes {
    count: i64,
}

/// `count(*)`: counts every row, including nulls.
#[derive(Debug, Default)]
pub struct CountStarFunction;

/// `count(col)`: counts only non-null input rows.
#[derive(Debug, Default)]
pub struct CountFunction;

impl AggregateFunction for CountStarFunction {
    fn state_size(&self) -> usize {
        std::mem::size_of::<CountStateBytes>()
    }
    fn init(&self, state: &mut [u8]) {
        *state_mut::<CountStateBytes>(state) = CountStateBytes::default();
    }
    fn update(&self, _input: &Vector, state_ptrs: &[*mut u8], count: usize) -> PrismDBResult<()> {
        for i in 0..count {
            let state = unsafe { &mut *(state_ptrs[i] as *mut CountStateBytes) };
            state.count += 1;
        }
        Ok(())
    }
    fn simple_update(&self, _input: &Vector, state: &mut [u8], count: usize) -> PrismDBResult<()> {
        state_mut::<CountStateBytes>(state).count += count as i64;
        Ok(())
    }
    fn combine(&self, source: &[u8], target: &mut [u8]) -> PrismDBResult<()> {
        let src = *state_ref::<CountStateBytes>(source);
        state_mut::<CountStateBytes>(target).count += src.count;
        Ok(())
    }
    fn finalize(&self, state: &[u8]) -> PrismDBResult<Value> {
        Ok(Value::BigInt(state_ref::<CountStateBytes>(state).count))
    }
    fn ignore_null(&self) -> bool {
        false
    }
    fn return_type(&self) -> LogicalType {
        LogicalType::BigInt
    }
}

impl AggregateFunction for CountFunction {
    fn state_size(&self) -> usize {
        std::mem::size_of::<CountStateBytes>()
    }
    fn init(&self, state: &mut [u8]) {
        *state_mut::<CountStateBytes>(state) = CountStateBytes::default();
    }
    fn update(&self, input: &Vector, state_ptrs: &[*mut u8], count: usize) -> PrismDBResult<()> {
        for_each_row(input, count, true, |i, _v| {
            let state = unsafe { &mut *(state_ptrs[i] as *mut CountStateBytes) };
            state.count += 1;
        })
    }
    fn simple_update(&self, input: &Vector, state: &mut [u8], count: usize) -> PrismDBResult<()> {
        let mut added = 0i64;
        for_each_row(input, count, true, |_i, _v| added += 1)?;
        state_mut::<CountStateBytes>(state).count += added;
        Ok(())
    }
    fn combine(&self, source: &[u8], target: &mut [u8]) -> PrismDBResult<()> {
        let src = *state_ref::<CountStateBytes>(source);
        state_mut::<CountStateBytes>(target).count += src.count;
        Ok(())
    }
    fn finalize(&self, state: &[u8]) -> PrismDBResult<Value> {
        Ok(Value::BigInt(state_ref::<CountStateBytes>(state).count))
    }
    fn ignore_null(&self) -> bool {
        true
    }
    fn return_type(&self) -> LogicalType {
        LogicalType::BigInt
    }
}

// ---------------------------------------------------------------------------
// sum - 128-bit accumulator
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
struct SumState {
    sum: i128,
    count: u64,
    has_value: u8,
}

/// `sum(integer-typed column)`, accumulated in a 128-bit integer to avoid
/// overflow on long-running sums of int32/int64 inputs.
#[derive(Debug)]
pub struct SumFunction {
    input_type: LogicalType,
}

impl SumFunction {
    pub fn new(input_type: LogicalType) -> Self {
        Self { input_type }
    }

    fn value_as_i128(value: &Value) -> PrismDBResult<i128> {
        match value {
            Value::TinyInt(v) => Ok(*v as i128),
            Value::SmallInt(v) => Ok(*v as i128),
            Value::Integer(v) => Ok(*v as i128),
            Value::BigInt(v) => Ok(*v as i128),
            Value::HugeInt { high, low } => Ok(((*high as i128) << 64) | (*low as u64 as i128)),
            _ => Err(PrismDBError::InvalidType(format!(
                "sum() does not support input type {}",
                value.get_type()
            ))),
        }
    }

    /// `state.sum += value * count`, i.e. AddConstant folded over a whole CONST
    /// batch in one widening multiply rather than a per-row loop. The upstream
    /// 128-bit accumulator leaves this unimplemented for constant batches; the
    /// single-value add and the widening multiply agree because i128 has enough
    /// headroom that the multiply itself cannot overflow for any i64 operand
    /// times any chunk-sized count, so there is no separate overflow branch to
    /// replicate from the scalar add path.
    fn add_constant(state: &mut SumState, value: i128, count: usize) {
        state.sum += value * count as i128;
        state.count += count as u64;
        state.has_value = 1;
    }
}

impl AggregateFunction for SumFunction {
    fn state_size(&self) -> usize {
        std::mem::size_of::<SumState>()
    }
    fn init(&self, state: &mut [u8]) {
        *state_mut::<SumState>(state) = SumState::default();
    }

    fn update(&self, input: &Vector, state_ptrs: &[*mut u8], count: usize) -> PrismDBResult<()> {
        match input.format() {
            crate::types::vector::VectorFormat::Constant => {
                if input.is_null(0) {
                    return Ok(());
                }
                let value = Self::value_as_i128(&input.get_value(0)?)?;
                for ptr in state_ptrs.iter().take(count) {
                    let state = unsafe { &mut *(*ptr as *mut SumState) };
                    Self::add_constant(state, value, 1);
                }
                Ok(())
            }
            _ => for_each_row(input, count, true, |i, v| {
                let Ok(value) = Self::value_as_i128(v) else {
                    return;
                };
                let state = unsafe { &mut *(state_ptrs[i] as *mut SumState) };
                Self::add_constant(state, value, 1);
            }),
        }
    }

    fn simple_update(&self, input: &Vector, state: &mut [u8], count: usize) -> PrismDBResult<()> {
        if input.format() == crate::types::vector::VectorFormat::Constant {
            if input.is_null(0) || count == 0 {
                return Ok(());
            }
            let value = Self::value_as_i128(&input.get_value(0)?)?;
            Self::add_constant(state_mut::<SumState>(state), value, count);
            return Ok(());
        }

        let acc = state_mut::<SumState>(state);
        for_each_row(input, count, true, |_i, v| {
            if let Ok(value) = Self::value_as_i128(v) {
                Self::add_constant(acc, value, 1);
            }
        })
    }

    fn combine(&self, source: &[u8], target: &mut [u8]) -> PrismDBResult<()> {
        let src = *state_ref::<SumState>(source);
        if src.has_value == 0 {
            return Ok(());
        }
        let dst = state_mut::<SumState>(target);
        dst.sum += src.sum;
        dst.count += src.count;
        dst.has_value = 1;
        Ok(())
    }

    fn finalize(&self, state: &[u8]) -> PrismDBResult<Value> {
        let s = state_ref::<SumState>(state);
        if s.has_value == 0 {
            return Ok(Value::Null);
        }
        Ok(Value::HugeInt {
            high: (s.sum >> 64) as i64,
            low: s.sum as u64 as i64,
        })
    }

    fn ignore_null(&self) -> bool {
        true
    }

    fn return_type(&self) -> LogicalType {
        let _ = &self.input_type;
        LogicalType::HugeInt
    }
}

// ---------------------------------------------------------------------------
// min / max
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy)]
struct MinMaxState {
    value: f64,
    has_value: u8,
}

impl Default for MinMaxState {
    fn default() -> Self {
        Self {
            value: 0.0,
            has_value: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MinMaxKind {
    Min,
    Max,
}

/// `min`/`max` over numeric inputs, comparing in `f64` space. This loses
/// precision for values beyond 2^53 but keeps one state layout for every
/// numeric physical type rather than a per-type state enum.
#[derive(Debug)]
pub struct MinMaxFunction {
    kind: MinMaxKind,
    return_type: LogicalType,
}

impl MinMaxFunction {
    pub fn min(return_type: LogicalType) -> Self {
        Self {
            kind: MinMaxKind::Min,
            return_type,
        }
    }
    pub fn max(return_type: LogicalType) -> Self {
        Self {
            kind: MinMaxKind::Max,
            return_type,
        }
    }

    fn better(&self, candidate: f64, current: f64) -> bool {
        match self.kind {
            MinMaxKind::Min => candidate < current,
            MinMaxKind::Max => candidate > current,
        }
    }

    fn merge_one(&self, state: &mut MinMaxState, candidate: f64) {
        if state.has_value == 0 || self.better(candidate, state.value) {
            state.value = candidate;
            state.has_value = 1;
        }
    }
}

impl AggregateFunction for MinMaxFunction {
    fn state_size(&self) -> usize {
        std::mem::size_of::<MinMaxState>()
    }
    fn init(&self, state: &mut [u8]) {
        *state_mut::<MinMaxState>(state) = MinMaxState::default();
    }

    fn update(&self, input: &Vector, state_ptrs: &[*mut u8], count: usize) -> PrismDBResult<()> {
        for_each_row(input, count, true, |i, v| {
            if let Ok(candidate) = v.try_as_f64() {
                let state = unsafe { &mut *(state_ptrs[i] as *mut MinMaxState) };
                self.merge_one(state, candidate);
            }
        })
    }

    fn simple_update(&self, input: &Vector, state: &mut [u8], count: usize) -> PrismDBResult<()> {
        let acc = state_mut::<MinMaxState>(state);
        for_each_row(input, count, true, |_i, v| {
            if let Ok(candidate) = v.try_as_f64() {
                let state = acc as *mut MinMaxState;
                self.merge_one(unsafe { &mut *state }, candidate);
            }
        })
    }

    fn combine(&self, source: &[u8], target: &mut [u8]) -> PrismDBResult<()> {
        let src = *state_ref::<MinMaxState>(source);
        if src.has_value == 0 {
            return Ok(());
        }
        self.merge_one(state_mut::<MinMaxState>(target), src.value);
        Ok(())
    }

    fn finalize(&self, state: &[u8]) -> PrismDBResult<Value> {
        let s = state_ref::<MinMaxState>(state);
        if s.has_value == 0 {
            return Ok(Value::Null);
        }
        match &self.return_type {
            LogicalType::Integer => Ok(Value::Integer(s.value as i32)),
            LogicalType::BigInt => Ok(Value::BigInt(s.value as i64)),
            LogicalType::Double => Ok(Value::Double(s.value)),
            LogicalType::Float => Ok(Value::Float(s.value as f32)),
            other => Err(PrismDBError::InvalidType(format!(
                "min/max does not support return type {}",
                other
            ))),
        }
    }

    fn ignore_null(&self) -> bool {
        true
    }

    fn return_type(&self) -> LogicalType {
        self.return_type.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::vector::VectorFormat;

    fn single_state_ptrs(n: usize, state: &mut [u8]) -> Vec<*mut u8> {
        vec![state.as_mut_ptr(); n]
    }

    #[test]
    fn test_count_star_counts_nulls() -> PrismDBResult<()> {
        let f = CountStarFunction;
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);
        let input = Vector::from_values(&[Value::Null, Value::integer(1), Value::Null])?;
        f.simple_update(&input, &mut state, 3)?;
        assert_eq!(f.finalize(&state)?, Value::BigInt(3));
        Ok(())
    }

    #[test]
    fn test_count_col_skips_nulls() -> PrismDBResult<()> {
        let f = CountFunction;
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);
        let input = Vector::from_values(&[Value::Null, Value::integer(1), Value::integer(2)])?;
        f.simple_update(&input, &mut state, 3)?;
        assert_eq!(f.finalize(&state)?, Value::BigInt(2));
        Ok(())
    }

    #[test]
    fn test_sum_simple_update() -> PrismDBResult<()> {
        let f = SumFunction::new(LogicalType::Integer);
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);
        let input = Vector::from_values(&[
            Value::integer(10),
            Value::Null,
            Value::integer(20),
            Value::integer(5),
        ])?;
        f.simple_update(&input, &mut state, 4)?;
        assert_eq!(f.finalize(&state)?, Value::HugeInt { high: 0, low: 35 });
        Ok(())
    }

    #[test]
    fn test_sum_null_state_finalizes_null() -> PrismDBResult<()> {
        let f = SumFunction::new(LogicalType::Integer);
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);
        assert_eq!(f.finalize(&state)?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_sum_overflows_past_i64_via_128_bit_accumulator() -> PrismDBResult<()> {
        let f = SumFunction::new(LogicalType::Integer);
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);

        // 6_001_215 rows of a value large enough that the running total exceeds
        // i64::MAX (2^63 - 1) well before the end, the scenario called out in the
        // component design's 128-bit accumulator test.
        let value = Value::integer(2_000_000_000);
        let const_vector = Vector::constant(LogicalType::Integer, &value, 6_001_215)?;
        f.simple_update(&const_vector, &mut state, 6_001_215)?;

        let expected: i128 = 2_000_000_000i128 * 6_001_215i128;
        assert!(expected > i64::MAX as i128);
        let finalized = f.finalize(&state)?;
        match finalized {
            Value::HugeInt { high, low } => {
                let reconstructed = ((high as i128) << 64) | (low as u64 as i128);
                assert_eq!(reconstructed, expected);
            }
            other => panic!("expected HugeInt, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn test_sum_scatter_update_matches_simple_update() -> PrismDBResult<()> {
        let f = SumFunction::new(LogicalType::Integer);
        let input = Vector::from_values(&[
            Value::integer(1),
            Value::integer(2),
            Value::integer(3),
            Value::integer(4),
        ])?;

        let mut simple_state = vec![0u8; f.state_size()];
        f.init(&mut simple_state);
        f.simple_update(&input, &mut simple_state, 4)?;

        let mut scatter_state = vec![0u8; f.state_size()];
        f.init(&mut scatter_state);
        let ptrs = single_state_ptrs(4, &mut scatter_state);
        f.update(&input, &ptrs, 4)?;

        assert_eq!(f.finalize(&simple_state)?, f.finalize(&scatter_state)?);
        Ok(())
    }

    #[test]
    fn test_combine_merges_partial_sums() -> PrismDBResult<()> {
        let f = SumFunction::new(LogicalType::Integer);
        let mut a = vec![0u8; f.state_size()];
        let mut b = vec![0u8; f.state_size()];
        f.init(&mut a);
        f.init(&mut b);

        let va = Vector::from_values(&[Value::integer(10), Value::integer(20)])?;
        let vb = Vector::from_values(&[Value::integer(5)])?;
        f.simple_update(&va, &mut a, 2)?;
        f.simple_update(&vb, &mut b, 1)?;

        f.combine(&b, &mut a)?;
        assert_eq!(f.finalize(&a)?, Value::HugeInt { high: 0, low: 35 });
        Ok(())
    }

    #[test]
    fn test_finalize_is_idempotent() -> PrismDBResult<()> {
        let f = SumFunction::new(LogicalType::Integer);
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);
        let input = Vector::from_values(&[Value::integer(7)])?;
        f.simple_update(&input, &mut state, 1)?;
        assert_eq!(f.finalize(&state)?, f.finalize(&state)?);
        Ok(())
    }

    #[test]
    fn test_min_max_track_extremes_and_skip_nulls() -> PrismDBResult<()> {
        let min_f = MinMaxFunction::min(LogicalType::Integer);
        let max_f = MinMaxFunction::max(LogicalType::Integer);
        let input = Vector::from_values(&[
            Value::integer(5),
            Value::Null,
            Value::integer(-3),
            Value::integer(9),
        ])?;

        let mut min_state = vec![0u8; min_f.state_size()];
        min_f.init(&mut min_state);
        min_f.simple_update(&input, &mut min_state, 4)?;
        assert_eq!(min_f.finalize(&min_state)?, Value::Integer(-3));

        let mut max_state = vec![0u8; max_f.state_size()];
        max_f.init(&mut max_state);
        max_f.simple_update(&input, &mut max_state, 4)?;
        assert_eq!(max_f.finalize(&max_state)?, Value::Integer(9));
        Ok(())
    }

    #[test]
    fn test_all_null_group_finalizes_null() -> PrismDBResult<()> {
        let f = MinMaxFunction::max(LogicalType::Integer);
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);
        let input = Vector::from_values(&[Value::Null, Value::Null])?;
        f.simple_update(&input, &mut state, 2)?;
        assert_eq!(f.finalize(&state)?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_constant_vector_uses_broadcast_fast_path() -> PrismDBResult<()> {
        let f = SumFunction::new(LogicalType::Integer);
        let mut state = vec![0u8; f.state_size()];
        f.init(&mut state);
        let constant = Vector::constant(LogicalType::Integer, &Value::integer(3), 100)?;
        assert_eq!(constant.format(), VectorFormat::Constant);
        f.simple_update(&constant, &mut state, 100)?;
        assert_eq!(f.finalize(&state)?, Value::HugeInt { high: 0, low: 300 });
        Ok(())
    }
}
