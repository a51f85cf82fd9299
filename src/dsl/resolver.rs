//! Accessor-to-column resolution.

use crate::error::{Result, RowbindError};
use crate::mapping::TableBinding;
use crate::record::Accessor;
use std::any::TypeId;
use std::collections::HashMap;
use std::sync::Mutex;

/// Maps `(record type, member name)` to the bound column, caching each
/// answer.
#[derive(Debug, Default)]
pub struct AccessorResolver {
    cache: Mutex<HashMap<(TypeId, &'static str), String>>,
}

impl AccessorResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve<R: 'static, U>(&self, accessor: &Accessor<R, U>, binding: &TableBinding<R>) -> Result<String> {
        let key = (TypeId::of::<R>(), accessor.name());
        if let Some(column) = self.cache.lock().ok().and_then(|cache| cache.get(&key).cloned()) {
            return Ok(column);
        }

        let column = binding
            .column_for_member(accessor.name())
            .map(|c| c.column.clone())
            .ok_or_else(|| {
                RowbindError::resolution(format!(
                    "member `{}` of {} is not bound to any column of `{}`",
                    accessor.name(),
                    binding.record_name(),
                    binding.table()
                ))
            })?;

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, column.clone());
        }
        Ok(column)
    }

    pub fn cached(&self) -> usize {
        self.cache.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}
