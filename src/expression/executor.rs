//! Expression executor: evaluates an expression tree over one input chunk,
//! producing a result `Vector`, or a boolean selection of surviving rows.
//!
//! Binary dispatch picks one of four execution loops based on operand
//! physical formats (§4.2): both CONST, CONST×FLAT, FLAT×FLAT, or fall back to
//! UnifiedFormat. Null propagation defaults to "any null input => null
//! output"; comparisons and arithmetic all use this policy, there is no
//! SPECIAL_NULL_HANDLING function in this core's scope.

use crate::common::error::{PrismDBError, PrismDBResult};
use crate::expression::expression::{Expression, FunctionType};
use crate::types::vector::{ChunkValidity, VectorFormat};
use crate::types::{DataChunk, LogicalType, SelectionVector, Value, Vector};

pub struct ExpressionExecutor;

impl ExpressionExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a single expression over `chunk`, returning its result vector.
    pub fn execute(&self, expr: &Expression, chunk: &DataChunk) -> PrismDBResult<Vector> {
        match expr {
            Expression::Column { index, .. } => chunk
                .get_vector(*index)
                .cloned()
                .ok_or_else(|| PrismDBError::InvalidValue(format!("no column at index {}", index))),
            Expression::Constant { value } => {
                Vector::constant(value.get_type(), value, chunk.count().max(1))
            }
            Expression::Function {
                subtype,
                children,
                return_type,
            } => self.execute_function(*subtype, children, return_type, chunk),
        }
    }

    /// Project a full list of expressions into `result`'s vector slots.
    pub fn execute_list(&self, exprs: &[Expression], chunk: &DataChunk, result: &mut DataChunk) -> PrismDBResult<()> {
        for (i, expr) in exprs.iter().enumerate() {
            let vector = self.execute(expr, chunk)?;
            result.set_vector(i, vector)?;
        }
        Ok(())
    }

    /// Evaluate a boolean predicate and materialize the surviving row indices.
    /// Returns the selection and its count.
    pub fn execute_select(&self, expr: &Expression, chunk: &DataChunk) -> PrismDBResult<(SelectionVector, usize)> {
        let result = self.execute(expr, chunk)?;
        let mut sel = SelectionVector::new(chunk.count());
        for i in 0..chunk.count() {
            if result.is_valid(i) && result.get_value(i)?.try_as_boolean()? {
                sel.append(i);
            }
        }
        let count = sel.count();
        Ok((sel, count))
    }

    fn execute_function(
        &self,
        subtype: FunctionType,
        children: &[Expression],
        return_type: &LogicalType,
        chunk: &DataChunk,
    ) -> PrismDBResult<Vector> {
        if subtype == FunctionType::Not {
            let operand = self.execute(&children[0], chunk)?;
            return execute_unary(&operand, chunk.count(), LogicalType::Boolean, |v| {
                Ok(Value::Boolean(!v.try_as_boolean()?))
            });
        }

        let left = self.execute(&children[0], chunk)?;
        let right = self.execute(&children[1], chunk)?;
        let count = chunk.count();

        let op: BinaryOp = match subtype {
            FunctionType::Add => add_values,
            FunctionType::Subtract => subtract_values,
            FunctionType::Multiply => multiply_values,
            FunctionType::Divide => divide_values,
            FunctionType::Equal => |a, b| Ok(Value::Boolean(a.compare(b)? == std::cmp::Ordering::Equal)),
            FunctionType::NotEqual => |a, b| Ok(Value::Boolean(a.compare(b)? != std::cmp::Ordering::Equal)),
            FunctionType::LessThan => |a, b| Ok(Value::Boolean(a.compare(b)? == std::cmp::Ordering::Less)),
            FunctionType::LessThanEquals => {
                |a, b| Ok(Value::Boolean(a.compare(b)? != std::cmp::Ordering::Greater))
            }
            FunctionType::GreaterThan => {
                |a, b| Ok(Value::Boolean(a.compare(b)? == std::cmp::Ordering::Greater))
            }
            FunctionType::GreaterThanEquals => {
                |a, b| Ok(Value::Boolean(a.compare(b)? != std::cmp::Ordering::Less))
            }
            FunctionType::And => |a, b| Ok(Value::Boolean(a.try_as_boolean()? && b.try_as_boolean()?)),
            FunctionType::Or => |a, b| Ok(Value::Boolean(a.try_as_boolean()? || b.try_as_boolean()?)),
            FunctionType::Like => |a, b| Ok(Value::Boolean(like_match(&a.try_as_string()?, &b.try_as_string()?))),
            FunctionType::Not => unreachable!("handled above"),
        };

        execute_binary(&left, &right, count, return_type.clone(), op)
    }
}

impl Default for ExpressionExecutor {
    fn default() -> Self {
        Self::new()
    }
}

type BinaryOp = fn(&Value, &Value) -> PrismDBResult<Value>;

fn add_values(a: &Value, b: &Value) -> PrismDBResult<Value> {
    if let (Value::Date(date), Value::Interval { months, days, micros }) = (a, b) {
        return Ok(Value::Date(add_interval_to_date(*date, *months, *days, *micros)?));
    }
    numeric_binary(a, b, |x, y| x.wrapping_add(y), |x, y| x + y)
}

fn subtract_values(a: &Value, b: &Value) -> PrismDBResult<Value> {
    numeric_binary(a, b, |x, y| x.wrapping_sub(y), |x, y| x - y)
}

fn multiply_values(a: &Value, b: &Value) -> PrismDBResult<Value> {
    numeric_binary(a, b, |x, y| x.wrapping_mul(y), |x, y| x * y)
}

fn divide_values(a: &Value, b: &Value) -> PrismDBResult<Value> {
    // Divide-by-zero resolves to NULL rather than a fatal error (§9 Open Questions).
    match (a, b) {
        (Value::Double(_), _) | (_, Value::Double(_)) | (Value::Float(_), _) | (_, Value::Float(_)) => {
            let x = a.try_as_f64()?;
            let y = b.try_as_f64()?;
            if y == 0.0 {
                Ok(Value::Null)
            } else {
                Ok(Value::Double(x / y))
            }
        }
        _ => {
            let x = a.try_as_i64()?;
            let y = b.try_as_i64()?;
            if y == 0 {
                Ok(Value::Null)
            } else {
                Ok(coerce_int_result(a, b, x.wrapping_div(y)))
            }
        }
    }
}

/// Dispatch integer vs. float arithmetic based on operand types, and widen the
/// integer result to the wider of the two input widths.
fn numeric_binary(
    a: &Value,
    b: &Value,
    int_op: fn(i64, i64) -> i64,
    float_op: fn(f64, f64) -> f64,
) -> PrismDBResult<Value> {
    match (a, b) {
        (Value::Double(_), _) | (_, Value::Double(_)) | (Value::Float(_), _) | (_, Value::Float(_)) => {
            Ok(Value::Double(float_op(a.try_as_f64()?, b.try_as_f64()?)))
        }
        _ => {
            let x = a.try_as_i64()?;
            let y = b.try_as_i64()?;
            Ok(coerce_int_result(a, b, int_op(x, y)))
        }
    }
}

fn coerce_int_result(a: &Value, b: &Value, result: i64) -> Value {
    if matches!(a, Value::BigInt(_)) || matches!(b, Value::BigInt(_)) {
        Value::BigInt(result)
    } else {
        Value::Integer(result as i32)
    }
}

/// `date + interval`, calendar-correct for year/month/day units. Sub-day
/// interval components against a DATE result are rejected: a DATE has no
/// time-of-day to absorb them (§4.3, §9).
fn add_interval_to_date(date: i32, months: i32, days: i32, micros: i64) -> PrismDBResult<i32> {
    if micros != 0 {
        return Err(PrismDBError::InvalidType(
            "cannot add a sub-day interval to a DATE".to_string(),
        ));
    }
    use chrono::{Datelike, Duration, NaiveDate};
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).expect("valid epoch date");
    let base = epoch + Duration::days(date as i64);

    let total_months = base.year() * 12 + (base.month() as i32 - 1) + months;
    let new_year = total_months.div_euclid(12);
    let new_month = total_months.rem_euclid(12) + 1;
    // Clamp the day-of-month so e.g. Jan 31 + 1 month lands on the last day
    // of February rather than overflowing into March.
    let days_in_new_month = days_in_month(new_year, new_month as u32);
    let clamped_day = base.day().min(days_in_new_month);
    let carried = NaiveDate::from_ymd_opt(new_year, new_month as u32, clamped_day)
        .ok_or_else(|| PrismDBError::InvalidValue("invalid carried date".to_string()))?;

    let shifted = carried + Duration::days(days as i64);
    Ok((shifted - epoch).num_days() as i32)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    use chrono::NaiveDate;
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let first_of_next = NaiveDate::from_ymd_opt(next_year, next_month, 1).expect("valid date");
    let first_of_this = NaiveDate::from_ymd_opt(year, month, 1).expect("valid date");
    (first_of_next - first_of_this).num_days() as u32
}

/// SQL LIKE: `%` matches any run of characters, `_` matches exactly one.
fn like_match(text: &str, pattern: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    like_match_rec(&text, &pattern)
}

fn like_match_rec(text: &[char], pattern: &[char]) -> bool {
    match pattern.first() {
        None => text.is_empty(),
        Some('%') => like_match_rec(text, &pattern[1..]) || (!text.is_empty() && like_match_rec(&text[1..], pattern)),
        Some('_') => !text.is_empty() && like_match_rec(&text[1..], &pattern[1..]),
        Some(c) => !text.is_empty() && text[0] == *c && like_match_rec(&text[1..], &pattern[1..]),
    }
}

/// The unary counterpart of `execute_binary`: applies `op` row-by-row,
/// propagating input nulls to the output.
fn execute_unary(
    operand: &Vector,
    count: usize,
    result_type: LogicalType,
    op: impl Fn(&Value) -> PrismDBResult<Value>,
) -> PrismDBResult<Vector> {
    if operand.format() == VectorFormat::Constant {
        if operand.is_null(0) {
            return Vector::constant(result_type, &Value::Null, count);
        }
        let value = op(&operand.get_value(0)?)?;
        return Vector::constant(result_type, &value, count);
    }

    let mut result = Vector::new(result_type, count);
    result.resize(count)?;
    let unified = operand.unified();
    for i in 0..count {
        if unified.is_valid(i) {
            let value = op(&unified.get_value(i)?)?;
            result.set_value(i, &value)?;
        } else {
            result.set_value(i, &Value::Null)?;
        }
    }
    Ok(result)
}

/// Binary dispatch across the four format combinations described in §4.2.
pub fn execute_binary(
    left: &Vector,
    right: &Vector,
    count: usize,
    result_type: LogicalType,
    op: impl Fn(&Value, &Value) -> PrismDBResult<Value>,
) -> PrismDBResult<Vector> {
    match (left.format(), right.format()) {
        (VectorFormat::Constant, VectorFormat::Constant) => {
            if left.is_null(0) || right.is_null(0) {
                return Vector::constant(result_type, &Value::Null, count);
            }
            let value = op(&left.get_value(0)?, &right.get_value(0)?)?;
            Vector::constant(result_type, &value, count)
        }
        (VectorFormat::Constant, VectorFormat::Flat) => {
            execute_const_flat(left, right, count, result_type, |c, f| op(c, f))
        }
        (VectorFormat::Flat, VectorFormat::Constant) => {
            execute_const_flat(right, left, count, result_type, |c, f| op(f, c))
        }
        (VectorFormat::Flat, VectorFormat::Flat) => execute_flat_flat(left, right, count, result_type, op),
        _ => execute_unified(left, right, count, result_type, op),
    }
}

/// One side CONST (broadcast), the other FLAT: skip entirely if the constant
/// is null, otherwise iterate the flat side in 64-row validity groups.
fn execute_const_flat(
    constant: &Vector,
    flat: &Vector,
    count: usize,
    result_type: LogicalType,
    op: impl Fn(&Value, &Value) -> PrismDBResult<Value>,
) -> PrismDBResult<Vector> {
    if constant.is_null(0) {
        return Vector::constant(result_type, &Value::Null, count);
    }
    let const_value = constant.get_value(0)?;

    let mut result = Vector::new(result_type, count);
    result.resize(count)?;
    let validity = flat.get_validity_mask();
    let mut error: Option<PrismDBError> = None;
    validity.for_each_chunk(|start, end, kind| {
        if error.is_some() {
            return;
        }
        for i in start..end {
            let outcome: PrismDBResult<()> = match kind {
                ChunkValidity::NoneValid => result.set_value(i, &Value::Null),
                ChunkValidity::AllValid => flat
                    .get_value(i)
                    .and_then(|fv| op(&const_value, &fv))
                    .and_then(|value| result.set_value(i, &value)),
                ChunkValidity::Partial => {
                    if flat.is_valid(i) {
                        flat.get_value(i)
                            .and_then(|fv| op(&const_value, &fv))
                            .and_then(|value| result.set_value(i, &value))
                    } else {
                        result.set_value(i, &Value::Null)
                    }
                }
            };
            if let Err(e) = outcome {
                error = Some(e);
                break;
            }
        }
    });
    if let Some(e) = error {
        return Err(e);
    }
    Ok(result)
}

/// Both sides FLAT: parallel linear iteration, skipping rows where either
/// operand is null.
fn execute_flat_flat(
    left: &Vector,
    right: &Vector,
    count: usize,
    result_type: LogicalType,
    op: impl Fn(&Value, &Value) -> PrismDBResult<Value>,
) -> PrismDBResult<Vector> {
    let mut result = Vector::new(result_type, count);
    result.resize(count)?;

    for i in 0..count {
        if left.is_valid(i) && right.is_valid(i) {
            let lv = left.get_value(i)?;
            let rv = right.get_value(i)?;
            let value = op(&lv, &rv)?;
            result.set_value(i, &value)?;
        } else {
            result.set_value(i, &Value::Null)?;
        }
    }
    Ok(result)
}

/// Fallback path for DICT operands (either side): normalize both to
/// UnifiedFormat and index through the selection vector per logical row.
fn execute_unified(
    left: &Vector,
    right: &Vector,
    count: usize,
    result_type: LogicalType,
    op: impl Fn(&Value, &Value) -> PrismDBResult<Value>,
) -> PrismDBResult<Vector> {
    let mut result = Vector::new(result_type, count);
    result.resize(count)?;
    let left_unified = left.unified();
    let right_unified = right.unified();

    for i in 0..count {
        if left_unified.is_valid(i) && right_unified.is_valid(i) {
            let lv = left_unified.get_value(i)?;
            let rv = right_unified.get_value(i)?;
            let value = op(&lv, &rv)?;
            result.set_value(i, &value)?;
        } else {
            result.set_value(i, &Value::Null)?;
        }
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::expression::{Expression, FunctionType};

    fn chunk_of(values: &[Value], ty: LogicalType) -> PrismDBResult<DataChunk> {
        let mut v = Vector::new(ty, values.len());
        v.resize(values.len())?;
        for (i, value) in values.iter().enumerate() {
            v.set_value(i, value)?;
        }
        DataChunk::from_vectors(vec![v])
    }

    #[test]
    fn test_column_and_constant_projection() -> PrismDBResult<()> {
        let chunk = chunk_of(&[Value::integer(1), Value::integer(2)], LogicalType::Integer)?;
        let exec = ExpressionExecutor::new();
        let col = Expression::column(0, LogicalType::Integer);
        let result = exec.execute(&col, &chunk)?;
        assert_eq!(result.get_value(1)?, Value::integer(2));
        Ok(())
    }

    #[test]
    fn test_arithmetic_add() -> PrismDBResult<()> {
        let chunk = chunk_of(&[Value::integer(3), Value::integer(4)], LogicalType::Integer)?;
        let exec = ExpressionExecutor::new();
        let expr = Expression::binary(
            FunctionType::Add,
            Expression::column(0, LogicalType::Integer),
            Expression::constant(Value::integer(10)),
            LogicalType::Integer,
        );
        let result = exec.execute(&expr, &chunk)?;
        assert_eq!(result.get_value(0)?, Value::integer(13));
        assert_eq!(result.get_value(1)?, Value::integer(14));
        Ok(())
    }

    #[test]
    fn test_division_by_zero_is_null() -> PrismDBResult<()> {
        let a = Value::integer(10);
        let b = Value::integer(0);
        assert_eq!(divide_values(&a, &b)?, Value::Null);
        Ok(())
    }

    #[test]
    fn test_execute_select_filters_rows() -> PrismDBResult<()> {
        let chunk = chunk_of(
            &[Value::integer(1), Value::integer(10), Value::integer(3)],
            LogicalType::Integer,
        )?;
        let exec = ExpressionExecutor::new();
        let predicate = Expression::binary(
            FunctionType::GreaterThan,
            Expression::column(0, LogicalType::Integer),
            Expression::constant(Value::integer(5)),
            LogicalType::Boolean,
        );
        let (sel, count) = exec.execute_select(&predicate, &chunk)?;
        assert_eq!(count, 1);
        assert_eq!(sel.as_slice(), &[1]);
        Ok(())
    }

    #[test]
    fn test_binary_null_propagation_on_alternating_nulls() -> PrismDBResult<()> {
        // Every even row null, odd rows alternate 1, 10 (§8 scenario 6).
        let mut vector = Vector::new(LogicalType::Integer, 4);
        vector.resize(4)?;
        vector.set_value(0, &Value::Null)?;
        vector.set_value(1, &Value::integer(1))?;
        vector.set_value(2, &Value::Null)?;
        vector.set_value(3, &Value::integer(10))?;
        let chunk = DataChunk::from_vectors(vec![vector])?;
        let exec = ExpressionExecutor::new();
        let expr = Expression::binary(
            FunctionType::GreaterThan,
            Expression::column(0, LogicalType::Integer),
            Expression::constant(Value::integer(5)),
            LogicalType::Boolean,
        );
        let result = exec.execute(&expr, &chunk)?;
        assert!(result.is_null(0));
        assert_eq!(result.get_value(1)?, Value::Boolean(false));
        assert!(result.is_null(2));
        assert_eq!(result.get_value(3)?, Value::Boolean(true));
        Ok(())
    }

    #[test]
    fn test_dictionary_operand_uses_unified_path() -> PrismDBResult<()> {
        let child = Vector::from_values(&[Value::integer(100), Value::integer(200)])?;
        let sel = SelectionVector::from_indices(vec![1, 0, 1]);
        let dict = Vector::dictionary(child, sel);
        let flat = Vector::from_values(&[Value::integer(1), Value::integer(2), Value::integer(3)])?;
        let result = execute_binary(&dict, &flat, 3, LogicalType::Integer, |a, b| {
            Ok(Value::Integer(a.try_as_i32()? + b.try_as_i32()?))
        })?;
        assert_eq!(result.get_value(0)?, Value::integer(201));
        assert_eq!(result.get_value(1)?, Value::integer(102));
        assert_eq!(result.get_value(2)?, Value::integer(203));
        Ok(())
    }

    #[test]
    fn test_like_pattern_matching() {
        assert!(like_match("lime green", "lime%"));
        assert!(!like_match("green lime", "lime%"));
        assert!(like_match("abc", "a_c"));
        assert!(!like_match("abc", "a_d"));
    }

    #[test]
    fn test_date_plus_month_interval_carries_day_clamp() -> PrismDBResult<()> {
        // 2024-01-31 + 1 month should clamp to 2024-02-29 (leap year), not overflow.
        use chrono::NaiveDate;
        let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        let jan31 = (NaiveDate::from_ymd_opt(2024, 1, 31).unwrap() - epoch).num_days() as i32;
        let result_days = add_interval_to_date(jan31, 1, 0, 0)?;
        let result_date = epoch + chrono::Duration::days(result_days as i64);
        assert_eq!(result_date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        Ok(())
    }

    #[test]
    fn test_sub_day_interval_on_date_rejected() {
        assert!(add_interval_to_date(0, 0, 0, 1).is_err());
    }
}
