use crate::common::error::{PrismDBError, PrismDBResult};
use crate::types::logical_type::LogicalType;
use crate::types::physical_type::PhysicalType;
use crate::types::value::Value;
use serde::{Deserialize, Serialize};

/// A validity mask for tracking null values in a vector.
/// Backed by a bitset, one bit per entry, 1 = valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidityMask {
    data: Vec<u64>,
    count: usize,
}

impl ValidityMask {
    pub fn new(count: usize) -> Self {
        let data_size = (count + 63) / 64;
        Self {
            data: vec![0u64; data_size],
            count,
        }
    }

    pub fn all_valid(count: usize) -> Self {
        let data_size = (count + 63) / 64;
        Self {
            data: vec![u64::MAX; data_size],
            count,
        }
    }

    pub fn all_null(count: usize) -> Self {
        Self {
            data: vec![0u64; (count + 63) / 64],
            count,
        }
    }

    pub fn set_valid(&mut self, index: usize, valid: bool) {
        if index >= self.count {
            return;
        }
        let word_index = index / 64;
        let bit_index = index % 64;

        if valid {
            self.data[word_index] |= 1u64 << bit_index;
        } else {
            self.data[word_index] &= !(1u64 << bit_index);
        }
    }

    pub fn set_invalid(&mut self, index: usize) {
        self.set_valid(index, false);
    }

    pub fn is_valid(&self, index: usize) -> bool {
        if index >= self.count {
            return false;
        }
        let word_index = index / 64;
        let bit_index = index % 64;
        (self.data[word_index] & (1u64 << bit_index)) != 0
    }

    pub fn is_null(&self, index: usize) -> bool {
        !self.is_valid(index)
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn valid_count(&self) -> usize {
        (0..self.count).filter(|&i| self.is_valid(i)).count()
    }

    pub fn null_count(&self) -> usize {
        self.count - self.valid_count()
    }

    /// True if every entry is valid. Checked a whole u64 word at a time, falling back to a
    /// per-bit scan only on the final partial word.
    pub fn all_valid_fast(&self) -> bool {
        if self.count == 0 {
            return true;
        }
        let full_words = self.count / 64;
        if self.data[..full_words].iter().any(|&w| w != u64::MAX) {
            return false;
        }
        let remainder = self.count % 64;
        if remainder == 0 {
            return true;
        }
        let mask = (1u64 << remainder) - 1;
        self.data[full_words] & mask == mask
    }

    /// True if every entry is null, using the same word-at-a-time fast path.
    pub fn none_valid_fast(&self) -> bool {
        if self.count == 0 {
            return true;
        }
        let full_words = self.count / 64;
        if self.data[..full_words].iter().any(|&w| w != 0) {
            return false;
        }
        let remainder = self.count % 64;
        if remainder == 0 {
            return true;
        }
        let mask = (1u64 << remainder) - 1;
        self.data[full_words] & mask == 0
    }

    pub fn resize(&mut self, new_count: usize) {
        let new_data_size = (new_count + 63) / 64;
        self.data.resize(new_data_size, 0);
        self.count = new_count;
    }

    pub fn iter(&self) -> ValidityIterator<'_> {
        ValidityIterator {
            mask: self,
            index: 0,
        }
    }

    /// Iterate the mask in 64-row groups, invoking `on_chunk` with a fast-path classification
    /// so per-row null checks can be skipped entirely for homogeneous groups.
    pub fn for_each_chunk<F>(&self, mut on_chunk: F)
    where
        F: FnMut(usize, usize, ChunkValidity),
    {
        let mut start = 0;
        while start < self.count {
            let end = (start + 64).min(self.count);
            let word_index = start / 64;
            let word = self.data.get(word_index).copied().unwrap_or(0);
            let width = end - start;
            let kind = if width == 64 {
                if word == u64::MAX {
                    ChunkValidity::AllValid
                } else if word == 0 {
                    ChunkValidity::NoneValid
                } else {
                    ChunkValidity::Partial
                }
            } else {
                let mask = (1u64 << width) - 1;
                if word & mask == mask {
                    ChunkValidity::AllValid
                } else if word & mask == 0 {
                    ChunkValidity::NoneValid
                } else {
                    ChunkValidity::Partial
                }
            };
            on_chunk(start, end, kind);
            start = end;
        }
    }
}

/// Classification of a 64-row validity group, used to skip per-row branching
/// when a whole group is uniformly valid or null.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkValidity {
    AllValid,
    NoneValid,
    Partial,
}

pub struct ValidityIterator<'a> {
    mask: &'a ValidityMask,
    index: usize,
}

impl<'a> Iterator for ValidityIterator<'a> {
    type Item = bool;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.mask.count {
            None
        } else {
            let result = self.mask.is_valid(self.index);
            self.index += 1;
            Some(result)
        }
    }
}

/// A selection vector for filtering and reordering data: an indirection array
/// mapping logical position -> physical slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionVector {
    data: Vec<usize>,
    count: usize,
}

impl SelectionVector {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            count: 0,
        }
    }

    /// Sequential indices [0, 1, .., count-1] - the identity selection.
    pub fn sequential(count: usize) -> Self {
        Self {
            data: (0..count).collect(),
            count,
        }
    }

    pub fn from_indices(indices: Vec<usize>) -> Self {
        let count = indices.len();
        Self {
            data: indices,
            count,
        }
    }

    #[inline]
    pub fn get_index(&self, position: usize) -> usize {
        debug_assert!(
            position < self.count,
            "Index {} out of bounds (count: {})",
            position,
            self.count
        );
        self.data[position]
    }

    #[inline]
    pub fn set_index(&mut self, position: usize, index: usize) {
        if position >= self.data.len() {
            self.data.resize(position + 1, 0);
        }
        self.data[position] = index;
        if position >= self.count {
            self.count = position + 1;
        }
    }

    #[inline]
    pub fn append(&mut self, index: usize) {
        self.data.push(index);
        self.count += 1;
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn reset(&mut self) {
        self.count = 0;
        self.data.clear();
    }

    pub fn set_count(&mut self, count: usize) {
        debug_assert!(count <= self.data.len(), "Count exceeds data length");
        self.count = count;
    }

    pub fn resize(&mut self, new_count: usize) {
        self.data.resize(new_count, 0);
        self.count = new_count;
    }

    pub fn reserve(&mut self, additional: usize) {
        self.data.reserve(additional);
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.data[..self.count]
    }

    /// Compose this selection with another: result[i] = self[other[i]].
    /// Lets filters chain without ever touching the underlying data.
    pub fn slice(&self, other: &SelectionVector) -> SelectionVector {
        let mut result = SelectionVector::new(other.count());
        for i in 0..other.count() {
            let idx = other.get_index(i);
            if idx < self.count {
                result.append(self.get_index(idx));
            }
        }
        result
    }

    pub fn slice_in_place(&mut self, other: &SelectionVector) {
        let mut new_data = Vec::with_capacity(other.count());
        for i in 0..other.count() {
            let idx = other.get_index(i);
            if idx < self.count {
                new_data.push(self.get_index(idx));
            }
        }
        self.data = new_data;
        self.count = self.data.len();
    }

    #[cfg(debug_assertions)]
    pub fn verify(&self, vector_size: usize) -> PrismDBResult<()> {
        for i in 0..self.count {
            let idx = self.data[i];
            if idx >= vector_size {
                return Err(PrismDBError::Internal(format!(
                    "SelectionVector index {} is out of bounds (size: {})",
                    idx, vector_size
                )));
            }
        }
        Ok(())
    }

    #[cfg(not(debug_assertions))]
    #[inline]
    pub fn verify(&self, _vector_size: usize) -> PrismDBResult<()> {
        Ok(())
    }

    pub fn sort(&mut self) {
        self.data[0..self.count].sort_unstable();
    }
}

/// The physical representation a Vector uses to store its entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VectorFormat {
    /// One data/validity slot per logical row.
    Flat,
    /// A single data/validity slot broadcast to every logical row.
    Constant,
    /// A flat child buffer addressed through a selection vector.
    Dictionary,
}

/// A normalized (data, validity, selection) view over a Vector regardless of its
/// underlying physical format. Operators that don't special-case CONST/FLAT/DICT
/// can fall back to this generic path.
pub struct UnifiedFormat<'a> {
    vector: &'a Vector,
}

impl<'a> UnifiedFormat<'a> {
    pub fn new(vector: &'a Vector) -> Self {
        Self { vector }
    }

    /// Map a logical row index to the physical slot that holds its data/validity.
    #[inline]
    pub fn index(&self, logical_idx: usize) -> usize {
        self.vector.physical_index(logical_idx)
    }

    #[inline]
    pub fn is_valid(&self, logical_idx: usize) -> bool {
        self.vector.validity.is_valid(self.index(logical_idx))
    }

    pub fn get_value(&self, logical_idx: usize) -> PrismDBResult<Value> {
        self.vector.value_at_physical(self.index(logical_idx))
    }

    pub fn validity(&self) -> &ValidityMask {
        &self.vector.validity
    }
}

/// A Vector represents columnar data: the actual bytes, a validity mask, and a
/// physical format describing how logical row indices map onto them.
#[derive(Debug, Clone)]
pub struct Vector {
    logical_type: LogicalType,
    physical_type: PhysicalType,
    format: VectorFormat,
    /// Raw byte storage. For Flat/Constant this is indexed directly by physical
    /// slot; for Dictionary this is the child buffer addressed via `selection`.
    data: Vec<u8>,
    /// Validity mask over the same physical slots as `data`.
    validity: ValidityMask,
    /// Only present for Dictionary format: logical row -> physical slot in `data`.
    selection: Option<SelectionVector>,
    /// Number of logical rows (for Dictionary, equal to selection.count()).
    count: usize,
    /// Capacity of the physical `data`/`validity` storage (not the logical count).
    capacity: usize,
}

impl Vector {
    /// Create a new FLAT vector with the specified type and capacity.
    pub fn new(logical_type: LogicalType, capacity: usize) -> Self {
        let physical_type = logical_type.get_physical_type();
        let element_size = physical_type.get_size().unwrap_or(0);

        Self {
            logical_type,
            physical_type,
            format: VectorFormat::Flat,
            data: vec![0u8; element_size * capacity],
            validity: ValidityMask::all_valid(capacity),
            selection: None,
            count: 0,
            capacity,
        }
    }

    /// Create a CONST vector broadcasting a single value to `count` logical rows.
    pub fn constant(logical_type: LogicalType, value: &Value, count: usize) -> PrismDBResult<Self> {
        let physical_type = logical_type.get_physical_type();
        let element_size = physical_type.get_size().unwrap_or(0);
        let data_size = if element_size > 0 {
            element_size
        } else {
            match value {
                Value::Varchar(s) | Value::Char(s) => 4 + s.len(),
                _ => 4,
            }
        };

        let mut vector = Self {
            logical_type,
            physical_type,
            format: VectorFormat::Constant,
            data: vec![0u8; data_size],
            validity: ValidityMask::new(1),
            selection: None,
            count,
            capacity: count,
        };

        if value.is_null() {
            vector.validity.set_valid(0, false);
        } else {
            vector.validity.set_valid(0, true);
            vector.store_value_at(0, value)?;
        }

        Ok(vector)
    }

    /// Create a DICTIONARY vector: a flat child vector addressed through `selection`.
    /// `selection.count()` becomes the logical row count of the result.
    pub fn dictionary(child: Vector, selection: SelectionVector) -> Self {
        let count = selection.count();
        Self {
            logical_type: child.logical_type,
            physical_type: child.physical_type,
            format: VectorFormat::Dictionary,
            data: child.data,
            validity: child.validity,
            selection: Some(selection),
            count,
            capacity: count,
        }
    }

    /// Apply a selection on top of this vector without copying any data.
    /// Composes with an existing Dictionary selection if already dictionary-encoded.
    pub fn slice(&self, selection: &SelectionVector) -> Vector {
        match self.format {
            VectorFormat::Constant => {
                let mut sliced = self.clone();
                sliced.count = selection.count();
                sliced.capacity = selection.count();
                sliced
            }
            VectorFormat::Dictionary => {
                let existing = self.selection.as_ref().expect("dictionary vector has selection");
                let composed = existing.slice(selection);
                Vector {
                    logical_type: self.logical_type.clone(),
                    physical_type: self.physical_type,
                    format: VectorFormat::Dictionary,
                    data: self.data.clone(),
                    validity: self.validity.clone(),
                    count: composed.count(),
                    capacity: composed.count(),
                    selection: Some(composed),
                }
            }
            VectorFormat::Flat => Vector {
                logical_type: self.logical_type.clone(),
                physical_type: self.physical_type,
                format: VectorFormat::Dictionary,
                data: self.data.clone(),
                validity: self.validity.clone(),
                count: selection.count(),
                capacity: selection.count(),
                selection: Some(selection.clone()),
            },
        }
    }

    /// Materialize into a FLAT vector, resolving CONST broadcast or DICT indirection.
    pub fn flatten(&self) -> PrismDBResult<Vector> {
        match self.format {
            VectorFormat::Flat => Ok(self.clone()),
            VectorFormat::Constant | VectorFormat::Dictionary => {
                let mut flat = Vector::new(self.logical_type.clone(), self.count);
                flat.resize(self.count)?;
                for i in 0..self.count {
                    let value = self.get_value(i)?;
                    if value.is_null() {
                        flat.validity.set_valid(i, false);
                    } else {
                        flat.validity.set_valid(i, true);
                        flat.store_value_at(i, &value)?;
                    }
                }
                Ok(flat)
            }
        }
    }

    pub fn format(&self) -> VectorFormat {
        self.format
    }

    pub fn unified(&self) -> UnifiedFormat<'_> {
        UnifiedFormat::new(self)
    }

    /// Map a logical row index onto the physical slot holding its data/validity.
    #[inline]
    fn physical_index(&self, logical_idx: usize) -> usize {
        match self.format {
            VectorFormat::Flat => logical_idx,
            VectorFormat::Constant => 0,
            VectorFormat::Dictionary => self
                .selection
                .as_ref()
                .expect("dictionary vector has selection")
                .get_index(logical_idx),
        }
    }

    fn try_coerce_value(value: &Value, target_type: &LogicalType) -> PrismDBResult<Value> {
        match (value, target_type) {
            (Value::Double(d), LogicalType::Decimal { precision, scale }) => {
                let multiplier = 10_f64.powi(*scale as i32);
                let scaled_value = (d * multiplier).round() as i128;
                Ok(Value::Decimal {
                    value: scaled_value,
                    precision: *precision,
                    scale: *scale,
                })
            }
            (Value::Float(f), LogicalType::Decimal { precision, scale }) => {
                let multiplier = 10_f64.powi(*scale as i32);
                let scaled_value = ((*f as f64) * multiplier).round() as i128;
                Ok(Value::Decimal {
                    value: scaled_value,
                    precision: *precision,
                    scale: *scale,
                })
            }
            (Value::Integer(i), LogicalType::Decimal { precision, scale }) => {
                let multiplier = 10_i128.pow(*scale as u32);
                Ok(Value::Decimal {
                    value: (*i as i128) * multiplier,
                    precision: *precision,
                    scale: *scale,
                })
            }
            (Value::BigInt(i), LogicalType::Decimal { precision, scale }) => {
                let multiplier = 10_i128.pow(*scale as u32);
                Ok(Value::Decimal {
                    value: (*i as i128) * multiplier,
                    precision: *precision,
                    scale: *scale,
                })
            }
            (Value::SmallInt(i), LogicalType::Decimal { precision, scale }) => {
                let multiplier = 10_i128.pow(*scale as u32);
                Ok(Value::Decimal {
                    value: (*i as i128) * multiplier,
                    precision: *precision,
                    scale: *scale,
                })
            }
            (Value::TinyInt(i), LogicalType::Decimal { precision, scale }) => {
                let multiplier = 10_i128.pow(*scale as u32);
                Ok(Value::Decimal {
                    value: (*i as i128) * multiplier,
                    precision: *precision,
                    scale: *scale,
                })
            }
            _ => Err(PrismDBError::InvalidType(format!(
                "Cannot coerce value type {} to {}",
                value.get_type(),
                target_type
            ))),
        }
    }

    /// Create a FLAT vector from a slice of values.
    pub fn from_values(values: &[Value]) -> PrismDBResult<Self> {
        if values.is_empty() {
            return Err(PrismDBError::InvalidValue(
                "Cannot create vector from empty values".to_string(),
            ));
        }

        let logical_type = values
            .iter()
            .find(|v| !v.is_null())
            .map(|v| v.get_type())
            .unwrap_or(LogicalType::Invalid);
        let physical_type = logical_type.get_physical_type();
        let element_size = physical_type.get_size().unwrap_or(0);

        let data_size = if element_size == 0 {
            match logical_type {
                LogicalType::Varchar | LogicalType::Char { .. } => {
                    let total_string_bytes: usize = values
                        .iter()
                        .map(|v| match v {
                            Value::Varchar(s) | Value::Char(s) => 4 + s.len(),
                            _ => 4,
                        })
                        .sum();
                    ((total_string_bytes / 8) + 1) * 8
                }
                _ => 1024,
            }
        } else {
            element_size * values.len()
        };

        let mut vector = Self {
            logical_type: logical_type.clone(),
            physical_type,
            format: VectorFormat::Flat,
            data: vec![0u8; data_size],
            validity: ValidityMask::new(values.len()),
            selection: None,
            count: values.len(),
            capacity: values.len(),
        };

        for (i, value) in values.iter().enumerate() {
            if value.is_null() {
                vector.validity.set_valid(i, false);
            } else {
                let coerced_value = if value.get_type() != logical_type {
                    Self::try_coerce_value(value, &logical_type)?
                } else {
                    value.clone()
                };
                vector.set_value(i, &coerced_value)?;
            }
        }

        Ok(vector)
    }

    pub fn get_type(&self) -> &LogicalType {
        &self.logical_type
    }

    pub fn get_physical_type(&self) -> &PhysicalType {
        &self.physical_type
    }

    pub fn get_validity_mask(&self) -> &ValidityMask {
        &self.validity
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Resize a FLAT vector. No-op (beyond updating `count`) for CONST/DICT formats,
    /// which don't own per-row physical storage.
    pub fn resize(&mut self, new_count: usize) -> PrismDBResult<()> {
        if self.format != VectorFormat::Flat {
            self.count = new_count;
            return Ok(());
        }
        if new_count > self.capacity {
            self.reserve(new_count)?;
        }
        self.validity.resize(new_count);
        self.count = new_count;
        Ok(())
    }

    pub fn reserve(&mut self, new_capacity: usize) -> PrismDBResult<()> {
        if new_capacity <= self.capacity {
            return Ok(());
        }

        let element_size = self.physical_type.get_size().unwrap_or(0);
        if element_size > 0 {
            self.data.resize(element_size * new_capacity, 0);
        } else {
            let estimated_size = new_capacity * 20;
            if estimated_size > self.data.len() {
                self.data.resize(estimated_size, 0);
            }
        }

        self.validity.resize(new_capacity);
        self.capacity = new_capacity;
        Ok(())
    }

    /// Set a value at a logical index. Only valid for FLAT vectors.
    pub fn set_value(&mut self, index: usize, value: &Value) -> PrismDBResult<()> {
        if self.format != VectorFormat::Flat {
            return Err(PrismDBError::Internal(
                "set_value requires a flat vector; flatten() first".to_string(),
            ));
        }
        if index >= self.capacity {
            return Err(PrismDBError::InvalidValue(format!(
                "Index {} exceeds vector capacity {}",
                index, self.capacity
            )));
        }

        if value.is_null() {
            self.validity.set_valid(index, false);
            return Ok(());
        }

        let coerced_value = if value.get_type() != self.logical_type {
            Self::try_coerce_value(value, &self.logical_type)?
        } else {
            value.clone()
        };

        self.validity.set_valid(index, true);
        self.store_value_at(index, &coerced_value)
    }

    /// Store a value at a raw physical slot, independent of format.
    fn store_value_at(&mut self, index: usize, value: &Value) -> PrismDBResult<()> {
        match value {
            Value::Boolean(v) => self.store_numeric(index, *v as u64),
            Value::TinyInt(v) => self.store_numeric(index, *v as u64),
            Value::SmallInt(v) => self.store_numeric(index, *v as u64),
            Value::Integer(v) => self.store_numeric(index, *v as u64),
            Value::BigInt(v) => self.store_numeric(index, *v as u64),
            Value::Float(v) => self.store_float(index, *v),
            Value::Double(v) => self.store_double(index, *v),
            Value::Decimal { value, .. } => {
                let bytes = value.to_le_bytes();
                let offset = index * 16;
                if offset + 16 <= self.data.len() {
                    self.data[offset..offset + 16].copy_from_slice(&bytes);
                }
            }
            Value::HugeInt { high, low } => {
                let v: i128 = ((*high as i128) << 64) | (*low as u64 as i128);
                let bytes = v.to_le_bytes();
                let offset = index * 16;
                if offset + 16 <= self.data.len() {
                    self.data[offset..offset + 16].copy_from_slice(&bytes);
                }
            }
            Value::Varchar(s) | Value::Char(s) => self.store_string(index, s),
            Value::Date(v) => self.store_numeric(index, *v as u64),
            Value::Time(v) => self.store_numeric(index, *v as u64),
            Value::Timestamp(v) => self.store_numeric(index, *v as u64),
            _ => {
                return Err(PrismDBError::InvalidType(format!(
                    "Unsupported value type for vector storage: {:?}",
                    value
                )))
            }
        }
        Ok(())
    }

    fn store_numeric(&mut self, index: usize, value: u64) {
        let element_size = self.physical_type.get_size().unwrap_or(0);
        if element_size == 0 {
            return;
        }
        let offset = index * element_size;
        if offset + element_size > self.data.len() {
            return;
        }
        match element_size {
            1 => self.data[offset] = value as u8,
            2 => self.data[offset..offset + 2].copy_from_slice(&(value as u16).to_le_bytes()),
            4 => self.data[offset..offset + 4].copy_from_slice(&(value as u32).to_le_bytes()),
            8 => self.data[offset..offset + 8].copy_from_slice(&value.to_le_bytes()),
            _ => {}
        }
    }

    fn store_float(&mut self, index: usize, value: f32) {
        let element_size = self.physical_type.get_size().unwrap_or(0);
        if element_size != 4 {
            return;
        }
        let offset = index * element_size;
        if offset + 4 <= self.data.len() {
            self.data[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
        }
    }

    fn store_double(&mut self, index: usize, value: f64) {
        let element_size = self.physical_type.get_size().unwrap_or(0);
        if element_size != 8 {
            return;
        }
        let offset = index * element_size;
        if offset + 8 <= self.data.len() {
            self.data[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
        }
    }

    fn store_string(&mut self, index: usize, string: &str) {
        let mut offset = 0;
        for i in 0..index {
            if self.validity.is_valid(i) {
                if offset + 4 <= self.data.len() {
                    let mut len_bytes = [0u8; 4];
                    len_bytes.copy_from_slice(&self.data[offset..offset + 4]);
                    let prev_len = u32::from_le_bytes(len_bytes) as usize;
                    offset += 4 + prev_len;
                }
            }
        }

        let string_bytes = string.as_bytes();
        let required_space = 4 + string_bytes.len();

        if offset + required_space > self.data.len() {
            let new_size = (offset + required_space).max(self.data.len() * 2);
            self.data.resize(new_size, 0);
        }

        let len_bytes = (string_bytes.len() as u32).to_le_bytes();
        self.data[offset..offset + 4].copy_from_slice(&len_bytes);
        self.data[offset + 4..offset + 4 + string_bytes.len()].copy_from_slice(string_bytes);
    }

    /// Get a value at a logical row index, resolving CONST/FLAT/DICT transparently.
    pub fn get_value(&self, index: usize) -> PrismDBResult<Value> {
        if index >= self.count {
            return Err(PrismDBError::InvalidValue(format!(
                "Index {} exceeds vector count {}",
                index, self.count
            )));
        }
        self.value_at_physical(self.physical_index(index))
    }

    fn value_at_physical(&self, phys: usize) -> PrismDBResult<Value> {
        if !self.validity.is_valid(phys) {
            return Ok(Value::Null);
        }

        match &self.logical_type {
            LogicalType::Boolean => Ok(Value::Boolean(self.extract_numeric(phys) != 0)),
            LogicalType::TinyInt => Ok(Value::TinyInt(self.extract_numeric(phys) as i8)),
            LogicalType::SmallInt => Ok(Value::SmallInt(self.extract_numeric(phys) as i16)),
            LogicalType::Integer => Ok(Value::Integer(self.extract_numeric(phys) as i32)),
            LogicalType::BigInt => Ok(Value::BigInt(self.extract_numeric(phys) as i64)),
            LogicalType::Float => Ok(Value::Float(self.extract_float(phys))),
            LogicalType::Double => Ok(Value::Double(self.extract_double(phys))),
            LogicalType::Decimal { precision, scale } => {
                let offset = phys * 16;
                let mut bytes = [0u8; 16];
                if offset + 16 <= self.data.len() {
                    bytes.copy_from_slice(&self.data[offset..offset + 16]);
                }
                Ok(Value::Decimal {
                    value: i128::from_le_bytes(bytes),
                    precision: *precision,
                    scale: *scale,
                })
            }
            LogicalType::HugeInt => {
                let offset = phys * 16;
                let mut bytes = [0u8; 16];
                if offset + 16 <= self.data.len() {
                    bytes.copy_from_slice(&self.data[offset..offset + 16]);
                }
                let v = i128::from_le_bytes(bytes);
                Ok(Value::HugeInt {
                    high: (v >> 64) as i64,
                    low: v as i64,
                })
            }
            LogicalType::Varchar => Ok(Value::Varchar(self.extract_string(phys)?)),
            LogicalType::Char { .. } => Ok(Value::Char(self.extract_string(phys)?)),
            LogicalType::Date => Ok(Value::Date(self.extract_numeric(phys) as i32)),
            LogicalType::Time => Ok(Value::Time(self.extract_numeric(phys) as i64)),
            LogicalType::Timestamp => Ok(Value::Timestamp(self.extract_numeric(phys) as i64)),
            _ => Err(PrismDBError::InvalidType(format!(
                "Unsupported vector type for value extraction: {:?}",
                self.logical_type
            ))),
        }
    }

    fn extract_numeric(&self, index: usize) -> u64 {
        let element_size = self.physical_type.get_size().unwrap_or(0);
        if element_size == 0 {
            return 0;
        }
        let offset = index * element_size;
        if offset + element_size > self.data.len() {
            return 0;
        }
        match element_size {
            1 => self.data[offset] as u64,
            2 => u16::from_le_bytes(self.data[offset..offset + 2].try_into().unwrap()) as u64,
            4 => u32::from_le_bytes(self.data[offset..offset + 4].try_into().unwrap()) as u64,
            8 => u64::from_le_bytes(self.data[offset..offset + 8].try_into().unwrap()),
            _ => 0,
        }
    }

    fn extract_float(&self, index: usize) -> f32 {
        let element_size = self.physical_type.get_size().unwrap_or(0);
        if element_size != 4 {
            return 0.0;
        }
        let offset = index * element_size;
        if offset + 4 > self.data.len() {
            return 0.0;
        }
        f32::from_le_bytes(self.data[offset..offset + 4].try_into().unwrap())
    }

    fn extract_double(&self, index: usize) -> f64 {
        let element_size = self.physical_type.get_size().unwrap_or(0);
        if element_size != 8 {
            return 0.0;
        }
        let offset = index * element_size;
        if offset + 8 > self.data.len() {
            return 0.0;
        }
        f64::from_le_bytes(self.data[offset..offset + 8].try_into().unwrap())
    }

    fn extract_string(&self, index: usize) -> PrismDBResult<String> {
        let mut offset = 0;
        for i in 0..index {
            if self.validity.is_valid(i) {
                if offset + 4 <= self.data.len() {
                    let mut len_bytes = [0u8; 4];
                    len_bytes.copy_from_slice(&self.data[offset..offset + 4]);
                    let prev_len = u32::from_le_bytes(len_bytes) as usize;
                    offset += 4 + prev_len;
                }
            }
        }

        if offset + 4 > self.data.len() {
            return Ok(String::new());
        }

        let mut len_bytes = [0u8; 4];
        len_bytes.copy_from_slice(&self.data[offset..offset + 4]);
        let len = u32::from_le_bytes(len_bytes) as usize;

        if len > 0 && offset + 4 + len <= self.data.len() {
            let string_bytes = &self.data[offset + 4..offset + 4 + len];
            Ok(String::from_utf8_lossy(string_bytes).to_string())
        } else {
            Ok(String::new())
        }
    }

    pub fn get_validity(&self) -> &ValidityMask {
        &self.validity
    }

    pub fn get_validity_mut(&mut self) -> &mut ValidityMask {
        &mut self.validity
    }

    pub fn get_selection(&self) -> Option<&SelectionVector> {
        self.selection.as_ref()
    }

    pub fn is_null(&self, index: usize) -> bool {
        !self.validity.is_valid(self.physical_index(index))
    }

    pub fn is_valid(&self, index: usize) -> bool {
        self.validity.is_valid(self.physical_index(index))
    }

    pub fn null_count(&self) -> usize {
        (0..self.count).filter(|&i| self.is_null(i)).count()
    }

    pub fn valid_count(&self) -> usize {
        self.count - self.null_count()
    }

    /// Append a value. Only valid for FLAT vectors.
    pub fn push(&mut self, value: &Value) -> PrismDBResult<()> {
        if self.format != VectorFormat::Flat {
            return Err(PrismDBError::Internal(
                "push requires a flat vector".to_string(),
            ));
        }
        if self.count >= self.capacity {
            self.reserve((self.capacity * 2).max(1))?;
        }
        self.set_value(self.count, value)?;
        self.count += 1;
        Ok(())
    }

    pub fn clear(&mut self) {
        self.count = 0;
        if self.format == VectorFormat::Flat {
            self.validity = ValidityMask::all_valid(self.capacity);
        }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn push_null(&mut self) -> PrismDBResult<()> {
        if self.format != VectorFormat::Flat {
            return Err(PrismDBError::Internal(
                "push_null requires a flat vector".to_string(),
            ));
        }
        if self.count >= self.capacity {
            self.reserve((self.capacity * 2).max(1))?;
        }
        self.validity.set_valid(self.count, false);
        self.count += 1;
        Ok(())
    }

    pub fn push_value(&mut self, value: &Value) -> PrismDBResult<()> {
        self.push(value)
    }

    pub fn iter(&self) -> VectorIterator<'_> {
        VectorIterator {
            vector: self,
            index: 0,
        }
    }
}

pub struct VectorIterator<'a> {
    vector: &'a Vector,
    index: usize,
}

impl<'a> Iterator for VectorIterator<'a> {
    type Item = PrismDBResult<Value>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.vector.count {
            None
        } else {
            let result = self.vector.get_value(self.index);
            self.index += 1;
            Some(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validity_mask() {
        let mut mask = ValidityMask::new(10);
        assert_eq!(mask.null_count(), 10);
        assert_eq!(mask.valid_count(), 0);

        mask.set_valid(0, true);
        mask.set_valid(3, true);
        mask.set_valid(7, true);

        assert_eq!(mask.valid_count(), 3);
        assert_eq!(mask.null_count(), 7);
        assert!(mask.is_valid(0));
        assert!(mask.is_valid(3));
        assert!(mask.is_valid(7));
        assert!(!mask.is_valid(1));
    }

    #[test]
    fn test_validity_mask_fast_paths() {
        let all_valid = ValidityMask::all_valid(130);
        assert!(all_valid.all_valid_fast());
        assert!(!all_valid.none_valid_fast());

        let all_null = ValidityMask::all_null(130);
        assert!(all_null.none_valid_fast());
        assert!(!all_null.all_valid_fast());

        let mut mixed = ValidityMask::all_valid(130);
        mixed.set_valid(129, false);
        assert!(!mixed.all_valid_fast());
        assert!(!mixed.none_valid_fast());
    }

    #[test]
    fn test_validity_chunking() {
        let mut mask = ValidityMask::all_valid(150);
        mask.set_valid(70, false);
        let mut kinds = vec![];
        mask.for_each_chunk(|start, end, kind| kinds.push((start, end, kind)));
        assert_eq!(kinds.len(), 3);
        assert_eq!(kinds[0], (0, 64, ChunkValidity::AllValid));
        assert_eq!(kinds[1], (64, 128, ChunkValidity::Partial));
        assert_eq!(kinds[2], (128, 150, ChunkValidity::AllValid));
    }

    #[test]
    fn test_selection_vector() {
        let indices = vec![2, 5, 1, 8];
        let sel_vec = SelectionVector::from_indices(indices);

        assert_eq!(sel_vec.count(), 4);
        assert_eq!(sel_vec.get_index(0), 2);
        assert_eq!(sel_vec.get_index(1), 5);
        assert_eq!(sel_vec.get_index(3), 8);
    }

    #[test]
    fn test_selection_vector_composition() {
        let base = SelectionVector::from_indices(vec![10, 20, 30, 40]);
        let filter = SelectionVector::from_indices(vec![1, 3]);
        let composed = base.slice(&filter);
        assert_eq!(composed.as_slice(), &[20, 40]);
    }

    #[test]
    fn test_vector_creation() {
        let vector = Vector::new(LogicalType::Integer, 100);
        assert_eq!(vector.get_type(), &LogicalType::Integer);
        assert_eq!(vector.capacity(), 100);
        assert_eq!(vector.count(), 0);
        assert!(vector.is_empty());
        assert_eq!(vector.format(), VectorFormat::Flat);
    }

    #[test]
    fn test_vector_from_values() -> PrismDBResult<()> {
        let values = vec![Value::integer(1), Value::integer(2), Value::integer(3)];
        let vector = Vector::from_values(&values)?;

        assert_eq!(vector.count(), 3);
        for (i, expected) in values.iter().enumerate() {
            assert_eq!(vector.get_value(i)?, *expected);
        }
        Ok(())
    }

    #[test]
    fn test_vector_null_values() -> PrismDBResult<()> {
        let values = vec![
            Value::integer(1),
            Value::Null,
            Value::integer(3),
            Value::Null,
        ];
        let vector = Vector::from_values(&values)?;

        assert_eq!(vector.null_count(), 2);
        assert_eq!(vector.valid_count(), 2);
        assert!(vector.is_valid(0));
        assert!(vector.is_null(1));
        Ok(())
    }

    #[test]
    fn test_constant_vector_broadcasts() -> PrismDBResult<()> {
        let v = Vector::constant(LogicalType::Integer, &Value::integer(42), 5)?;
        assert_eq!(v.format(), VectorFormat::Constant);
        assert_eq!(v.count(), 5);
        for i in 0..5 {
            assert_eq!(v.get_value(i)?, Value::integer(42));
        }
        Ok(())
    }

    #[test]
    fn test_constant_null_vector() -> PrismDBResult<()> {
        let v = Vector::constant(LogicalType::Integer, &Value::Null, 3)?;
        for i in 0..3 {
            assert!(v.is_null(i));
        }
        Ok(())
    }

    #[test]
    fn test_dictionary_vector_indirection() -> PrismDBResult<()> {
        let child = Vector::from_values(&[
            Value::integer(100),
            Value::integer(200),
            Value::integer(300),
        ])?;
        let sel = SelectionVector::from_indices(vec![2, 0, 0]);
        let dict = Vector::dictionary(child, sel);

        assert_eq!(dict.format(), VectorFormat::Dictionary);
        assert_eq!(dict.count(), 3);
        assert_eq!(dict.get_value(0)?, Value::integer(300));
        assert_eq!(dict.get_value(1)?, Value::integer(100));
        assert_eq!(dict.get_value(2)?, Value::integer(100));
        Ok(())
    }

    #[test]
    fn test_flatten_materializes_dictionary() -> PrismDBResult<()> {
        let child = Vector::from_values(&[Value::integer(7), Value::integer(9)])?;
        let sel = SelectionVector::from_indices(vec![1, 1, 0]);
        let dict = Vector::dictionary(child, sel);
        let flat = dict.flatten()?;

        assert_eq!(flat.format(), VectorFormat::Flat);
        assert_eq!(flat.get_value(0)?, Value::integer(9));
        assert_eq!(flat.get_value(1)?, Value::integer(9));
        assert_eq!(flat.get_value(2)?, Value::integer(7));
        Ok(())
    }

    #[test]
    fn test_slice_composes_selection() -> PrismDBResult<()> {
        let flat = Vector::from_values(&[
            Value::integer(1),
            Value::integer(2),
            Value::integer(3),
            Value::integer(4),
        ])?;
        let first_sel = SelectionVector::from_indices(vec![3, 2, 1, 0]);
        let reversed = flat.slice(&first_sel);

        let second_sel = SelectionVector::from_indices(vec![0, 2]);
        let twice_sliced = reversed.slice(&second_sel);

        assert_eq!(twice_sliced.get_value(0)?, Value::integer(4));
        assert_eq!(twice_sliced.get_value(1)?, Value::integer(2));
        Ok(())
    }

    #[test]
    fn test_vector_push() -> PrismDBResult<()> {
        let mut vector = Vector::new(LogicalType::Integer, 2);
        vector.push(&Value::integer(10))?;
        vector.push(&Value::integer(20))?;
        vector.push(&Value::integer(30))?;

        assert_eq!(vector.count(), 3);
        assert_eq!(vector.get_value(0)?, Value::integer(10));
        assert_eq!(vector.get_value(2)?, Value::integer(30));
        Ok(())
    }

    #[test]
    fn test_vector_iterator() -> PrismDBResult<()> {
        let values = vec![Value::integer(1), Value::integer(2), Value::integer(3)];
        let vector = Vector::from_values(&values)?;
        let collected: PrismDBResult<Vec<Value>> = vector.iter().collect();
        assert_eq!(collected?, values);
        Ok(())
    }

    #[test]
    fn test_unified_format_matches_get_value() -> PrismDBResult<()> {
        let child = Vector::from_values(&[Value::integer(5), Value::integer(6)])?;
        let sel = SelectionVector::from_indices(vec![1, 0]);
        let dict = Vector::dictionary(child, sel);
        let unified = dict.unified();

        assert_eq!(unified.get_value(0)?, Value::integer(6));
        assert_eq!(unified.get_value(1)?, Value::integer(5));
        assert!(unified.is_valid(0));
        Ok(())
    }
}
