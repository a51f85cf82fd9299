//! Per-instance cache of table bindings.
//!
//! Keyed by lowercased record name. Each key owns a single-flight cell, so
//! concurrent first use of a type builds its binding once while the other
//! callers wait. A failed build leaves the cell empty.

use super::binding::TableBinding;
use crate::error::{Result, RowbindError};
use crate::record::Record;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type ErasedBinding = Arc<dyn Any + Send + Sync>;

#[derive(Default)]
pub struct BindingRegistry {
    cells: Mutex<HashMap<String, Arc<OnceCell<ErasedBinding>>>>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached binding for `R`, building it with `build` on first use.
    pub fn get_or_build<R, F>(&self, build: F) -> Result<Arc<TableBinding<R>>>
    where
        R: Record,
        F: FnOnce() -> Result<TableBinding<R>>,
    {
        let key = R::record_name().to_lowercase();
        let cell = {
            let mut cells = self
                .cells
                .lock()
                .map_err(|_| RowbindError::mapping("binding registry lock poisoned"))?;
            Arc::clone(cells.entry(key.clone()).or_default())
        };

        let erased = cell.get_or_try_init(|| {
            log::debug!("event=binding_build record={}", key);
            build().map(|binding| Arc::new(binding) as ErasedBinding)
        })?;

        Arc::clone(erased).downcast::<TableBinding<R>>().map_err(|_| {
            RowbindError::mapping(format!(
                "binding cached under `{key}` belongs to a different record type"
            ))
        })
    }

    /// Number of built bindings.
    pub fn len(&self) -> usize {
        self.cells
            .lock()
            .map(|cells| cells.values().filter(|cell| cell.get().is_some()).count())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Debug for BindingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindingRegistry").field("built", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordDescriptor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Widget;

    impl Record for Widget {
        fn descriptor() -> RecordDescriptor<Self> {
            RecordDescriptor::new("Widget")
        }
    }

    fn empty_binding() -> Result<TableBinding<Widget>> {
        Ok(TableBinding::new("widget", "Widget", Vec::new(), |_| Ok(Widget)))
    }

    #[test]
    fn builds_once_and_shares() {
        let registry = BindingRegistry::new();
        let calls = AtomicUsize::new(0);
        let first = registry
            .get_or_build::<Widget, _>(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                empty_binding()
            })
            .unwrap();
        let second = registry
            .get_or_build::<Widget, _>(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                empty_binding()
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn failed_build_can_be_retried() {
        let registry = BindingRegistry::new();
        let err = registry
            .get_or_build::<Widget, _>(|| Err(RowbindError::mapping("not yet")))
            .unwrap_err();
        assert!(err.is_mapping());
        assert!(registry.is_empty());
        assert!(registry.get_or_build::<Widget, _>(empty_binding).is_ok());
    }

    #[test]
    fn concurrent_first_use_builds_once() {
        let registry = Arc::new(BindingRegistry::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                let calls = Arc::clone(&calls);
                std::thread::spawn(move || {
                    registry
                        .get_or_build::<Widget, _>(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            std::thread::sleep(std::time::Duration::from_millis(20));
                            empty_binding()
                        })
                        .map(|_| ())
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
