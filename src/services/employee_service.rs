//! Employee service: CRUD with a coherent read cache.
//!
//! Reads are cache-aside. Writes go to the store first and then fix up the
//! cache: the aggregate `"all"` entry is evicted on every mutation and the
//! per-id entry is replaced (create/update) or evicted (delete).
//!
//! Fills and invalidations of one key are serialized through [`KeyLocks`].
//! Lock order is always the id key before `"all"`.
//!
//! `create` only learns its id once the row is saved, so it cannot hold the id
//! lock across the insert. Every `update`/`delete` bumps a write counter under
//! its id lock; when the counter moved while `create` was saving, the row is
//! re-read under the lock instead of caching the possibly superseded result.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cache::{CacheManager, CacheRegion, KeyLocks};
use crate::error::{AppError, AppResult};
use crate::models::{Employee, NewEmployee};
use crate::repositories::EmployeeStore;

/// Cache region holding employee entries.
pub const EMPLOYEES_REGION: &str = "employees";

/// Key of the cached full listing.
pub const ALL_KEY: &str = "all";

#[derive(Clone)]
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
    cache: CacheRegion,
    locks: Arc<KeyLocks>,
    writes: Arc<AtomicU64>,
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>, cache: &CacheManager) -> Self {
        Self::with_region(store, cache.region(EMPLOYEES_REGION))
    }

    pub fn with_region(store: Arc<dyn EmployeeStore>, cache: CacheRegion) -> Self {
        Self {
            store,
            cache,
            locks: Arc::new(KeyLocks::new()),
            writes: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Lists every employee.
    ///
    /// # Returns
    /// The cached listing if present, otherwise the store's listing (which is
    /// then cached under `"all"`)
    pub async fn list(&self) -> AppResult<Vec<Employee>> {
        if let Some(all) = self.cache.get::<Vec<Employee>>(ALL_KEY).await {
            return Ok(all);
        }

        let _guard = self.locks.lock(ALL_KEY).await;
        if let Some(all) = self.cache.get::<Vec<Employee>>(ALL_KEY).await {
            return Ok(all);
        }

        let employees = self.store.find_all().await?;
        self.cache.put(ALL_KEY, &employees).await;
        Ok(employees)
    }

    /// Gets one employee by id.
    ///
    /// # Returns
    /// The employee, or `NotFound`. Absence is never cached.
    pub async fn get(&self, id: i64) -> AppResult<Employee> {
        let key = id.to_string();
        if let Some(employee) = self.cache.get::<Employee>(&key).await {
            return Ok(employee);
        }

        let _guard = self.locks.lock(&key).await;
        if let Some(employee) = self.cache.get::<Employee>(&key).await {
            return Ok(employee);
        }

        match self.store.find_by_id(id).await? {
            Some(employee) => {
                self.cache.put(&key, &employee).await;
                Ok(employee)
            }
            None => {
                tracing::debug!(employee_id = id, "Employee not found");
                Err(AppError::employee_not_found(id))
            }
        }
    }

    /// Persists a new employee and caches it under its assigned id.
    ///
    /// # Errors
    /// `Validation` on field `id` if the record already carries an id
    pub async fn create(&self, employee: NewEmployee) -> AppResult<Employee> {
        if let Some(id) = employee.id {
            return Err(AppError::Validation {
                field: "id".to_string(),
                reason: format!("must not be set when creating an employee (got {})", id),
            });
        }

        let writes_before = self.writes.load(Ordering::SeqCst);
        let saved = self.store.save(employee).await?;

        let key = saved.id.to_string();
        let _guard = self.locks.lock(&key).await;
        self.evict_all().await;

        if self.writes.load(Ordering::SeqCst) == writes_before {
            self.cache.put(&key, &saved).await;
        } else {
            match self.store.find_by_id(saved.id).await {
                Ok(Some(current)) => self.cache.put(&key, &current).await,
                Ok(None) => self.cache.evict(&key).await,
                Err(e) => {
                    tracing::warn!(employee_id = saved.id, error = %e, "Re-read after create failed");
                    self.cache.evict(&key).await;
                }
            }
        }

        tracing::info!(employee_id = saved.id, "Employee created");
        Ok(saved)
    }

    /// Replaces the employee stored under `id`.
    ///
    /// Any id carried by `employee` is ignored. Existence is checked against
    /// the store, not the cache.
    ///
    /// # Errors
    /// `NotFound` if no row exists for `id`; nothing is saved or evicted then
    pub async fn update(&self, id: i64, employee: NewEmployee) -> AppResult<Employee> {
        let key = id.to_string();
        let _guard = self.locks.lock(&key).await;
        self.writes.fetch_add(1, Ordering::SeqCst);

        if self.store.find_by_id(id).await?.is_none() {
            tracing::debug!(employee_id = id, "Update of missing employee");
            return Err(AppError::employee_not_found(id));
        }

        let saved = self.store.save(employee.with_id(id)).await?;
        self.evict_all().await;
        self.cache.put(&key, &saved).await;

        tracing::info!(employee_id = id, "Employee updated");
        Ok(saved)
    }

    /// Deletes the employee with `id`. Deleting a missing id succeeds.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let key = id.to_string();
        let _guard = self.locks.lock(&key).await;
        self.writes.fetch_add(1, Ordering::SeqCst);

        self.store.delete_by_id(id).await?;
        self.cache.evict(&key).await;
        self.evict_all().await;

        tracing::info!(employee_id = id, "Employee deleted");
        Ok(())
    }

    /// Waits out any in-flight listing fill before evicting, so a listing
    /// read before the caller's write cannot survive it.
    async fn evict_all(&self) {
        let _guard = self.locks.lock(ALL_KEY).await;
        self.cache.evict(ALL_KEY).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{AppCache, BrokenCache, MemoryCache};
    use crate::repositories::MemoryEmployeeStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Store wrapper that counts calls and can be made to fail or stall.
    #[derive(Default)]
    struct CountingStore {
        inner: MemoryEmployeeStore,
        find_all: AtomicUsize,
        find_by_id: AtomicUsize,
        save: AtomicUsize,
        delete: AtomicUsize,
        fail: std::sync::atomic::AtomicBool,
        find_all_gate: Option<(Arc<Notify>, Arc<Notify>)>,
        /// Stalls inserts (not overwrites) after the row is written
        insert_gate: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl CountingStore {
        fn calls(&self) -> (usize, usize, usize, usize) {
            (
                self.find_all.load(Ordering::SeqCst),
                self.find_by_id.load(Ordering::SeqCst),
                self.save.load(Ordering::SeqCst),
                self.delete.load(Ordering::SeqCst),
            )
        }

        fn check(&self) -> AppResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AppError::Database {
                    operation: "test".to_string(),
                    source: anyhow::anyhow!("connection refused"),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl EmployeeStore for CountingStore {
        async fn find_all(&self) -> AppResult<Vec<Employee>> {
            self.find_all.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let rows = self.inner.find_all().await?;
            if let Some((entered, release)) = &self.find_all_gate {
                entered.notify_one();
                release.notified().await;
            }
            Ok(rows)
        }

        async fn find_by_id(&self, id: i64) -> AppResult<Option<Employee>> {
            self.find_by_id.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.find_by_id(id).await
        }

        async fn save(&self, employee: NewEmployee) -> AppResult<Employee> {
            self.save.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            let is_insert = employee.id.is_none();
            let saved = self.inner.save(employee).await?;
            if is_insert && let Some((entered, release)) = &self.insert_gate {
                entered.notify_one();
                release.notified().await;
            }
            Ok(saved)
        }

        async fn delete_by_id(&self, id: i64) -> AppResult<()> {
            self.delete.fetch_add(1, Ordering::SeqCst);
            self.check()?;
            self.inner.delete_by_id(id).await
        }
    }

    fn region_with(backend: Arc<dyn AppCache>) -> CacheRegion {
        CacheRegion::new(EMPLOYEES_REGION, backend)
    }

    fn memory_region() -> CacheRegion {
        region_with(Arc::new(MemoryCache::with_lifespan(
            1000,
            Duration::from_secs(60),
        )))
    }

    fn setup() -> (EmployeeService, Arc<CountingStore>, CacheRegion) {
        let store = Arc::new(CountingStore::default());
        let region = memory_region();
        let service = EmployeeService::with_region(store.clone(), region.clone());
        (service, store, region)
    }

    async fn seed(store: &CountingStore, name: &str, salary: i32) -> Employee {
        store
            .inner
            .save(NewEmployee::new(name, "D", salary))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_is_cached() {
        let (service, store, region) = setup();
        let first = seed(&store, "first", 1000).await;
        let second = seed(&store, "second", 2000).await;

        assert_eq!(service.list().await.unwrap(), vec![first.clone(), second.clone()]);
        assert_eq!(service.list().await.unwrap(), vec![first.clone(), second.clone()]);

        assert_eq!(store.calls(), (1, 0, 0, 0));
        assert_eq!(
            region.get::<Vec<Employee>>(ALL_KEY).await,
            Some(vec![first, second])
        );
    }

    #[tokio::test]
    async fn test_get_is_cached() {
        let (service, store, region) = setup();
        let employee = seed(&store, "first", 1000).await;

        service.get(employee.id).await.unwrap();
        let again = service.get(employee.id).await.unwrap();

        assert_eq!(again, employee);
        assert_eq!(store.calls(), (0, 1, 0, 0));
        assert_eq!(region.get::<Employee>("1").await, Some(employee));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_cached() {
        let (service, store, region) = setup();

        for _ in 0..2 {
            let err = service.get(9).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound { ref value, .. } if value == "9"));
        }

        assert_eq!(store.calls(), (0, 2, 0, 0));
        assert_eq!(region.get::<Employee>("9").await, None);
    }

    #[tokio::test]
    async fn test_create_evicts_all_and_caches_row() {
        let (service, store, region) = setup();
        seed(&store, "cached", 3000).await;
        service.list().await.unwrap();

        let first = service.create(NewEmployee::new("first", "D1", 1000)).await.unwrap();
        let second = service.create(NewEmployee::new("second", "D2", 2000)).await.unwrap();

        assert_eq!(region.get::<Vec<Employee>>(ALL_KEY).await, None);
        assert_eq!(region.get::<Employee>(&first.id.to_string()).await, Some(first.clone()));
        assert_eq!(region.get::<Employee>(&second.id.to_string()).await, Some(second));
        assert_eq!(store.calls(), (1, 0, 2, 0));

        // Written-through row is served without touching the store
        assert_eq!(service.get(first.id).await.unwrap(), first);
        assert_eq!(store.calls(), (1, 0, 2, 0));

        // The listing is refetched after a write
        assert_eq!(service.list().await.unwrap().len(), 3);
        assert_eq!(store.calls(), (2, 0, 2, 0));
    }

    #[tokio::test]
    async fn test_create_rejects_preset_id() {
        let (service, store, _) = setup();

        let err = service
            .create(NewEmployee::new("A", "D", 1000).with_id(5))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation { ref field, .. } if field == "id"));
        assert_eq!(store.calls(), (0, 0, 0, 0));
    }

    #[tokio::test]
    async fn test_update_replaces_cached_row() {
        let (service, store, region) = setup();
        let employee = seed(&store, "first", 1000).await;
        service.list().await.unwrap();
        service.get(employee.id).await.unwrap();

        service
            .update(employee.id, NewEmployee::new("update first", "D", 2000))
            .await
            .unwrap();
        let latest = service
            .update(employee.id, NewEmployee::new("update second", "D", 3000).with_id(99))
            .await
            .unwrap();

        assert_eq!(latest.id, employee.id);
        assert_eq!(latest.name, "update second");
        assert_eq!(region.get::<Employee>("1").await, Some(latest.clone()));
        assert_eq!(region.get::<Vec<Employee>>(ALL_KEY).await, None);
        assert_eq!(store.calls(), (1, 3, 2, 0));
        assert_eq!(store.inner.find_by_id(99).await.unwrap(), None);

        assert_eq!(service.get(employee.id).await.unwrap(), latest);
        assert_eq!(store.calls(), (1, 3, 2, 0));
    }

    #[tokio::test]
    async fn test_update_missing_touches_nothing() {
        let (service, store, region) = setup();
        let employee = seed(&store, "first", 1000).await;
        service.list().await.unwrap();
        service.get(employee.id).await.unwrap();

        let err = service
            .update(42, NewEmployee::new("ghost", "D", 1))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert_eq!(store.calls(), (1, 2, 0, 0));
        assert!(region.get::<Vec<Employee>>(ALL_KEY).await.is_some());
        assert_eq!(region.get::<Employee>("1").await, Some(employee));
        assert_eq!(region.get::<Employee>("42").await, None);
    }

    #[tokio::test]
    async fn test_delete_evicts_row_and_all() {
        let (service, store, region) = setup();
        let first = seed(&store, "first", 1000).await;
        seed(&store, "second", 2000).await;
        service.list().await.unwrap();
        service.get(first.id).await.unwrap();

        service.delete(first.id).await.unwrap();

        assert_eq!(region.get::<Vec<Employee>>(ALL_KEY).await, None);
        assert_eq!(region.get::<Employee>("1").await, None);
        assert_eq!(store.calls(), (1, 1, 0, 1));

        assert!(matches!(service.get(first.id).await, Err(AppError::NotFound { .. })));
        assert_eq!(service.list().await.unwrap().len(), 1);
        assert_eq!(store.calls(), (2, 2, 0, 1));
    }

    #[tokio::test]
    async fn test_delete_missing_succeeds() {
        let (service, store, _) = setup();
        service.delete(7).await.unwrap();
        assert_eq!(store.calls(), (0, 0, 0, 1));
    }

    #[tokio::test]
    async fn test_store_failure_propagates_and_leaves_cache() {
        let (service, store, region) = setup();
        let employee = seed(&store, "first", 1000).await;
        service.list().await.unwrap();
        store.fail.store(true, Ordering::SeqCst);

        let err = service
            .update(employee.id, NewEmployee::new("x", "D", 1))
            .await
            .unwrap_err();
        assert!(err.is_transient());

        let err = service.delete(employee.id).await.unwrap_err();
        assert!(err.is_transient());

        let err = service.get(employee.id).await.unwrap_err();
        assert!(err.is_transient());

        assert_eq!(region.get::<Vec<Employee>>(ALL_KEY).await, Some(vec![employee]));
    }

    #[tokio::test]
    async fn test_broken_cache_falls_through_to_store() {
        let store = Arc::new(CountingStore::default());
        let service = EmployeeService::with_region(store.clone(), region_with(Arc::new(BrokenCache)));

        let created = service.create(NewEmployee::new("A", "D", 1000)).await.unwrap();
        assert_eq!(service.get(created.id).await.unwrap(), created);
        assert_eq!(service.list().await.unwrap(), vec![created.clone()]);
        service.delete(created.id).await.unwrap();

        assert_eq!(store.calls(), (1, 1, 1, 1));
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let store = Arc::new(CountingStore::default());
        let region = region_with(Arc::new(MemoryCache::with_lifespan(
            100,
            Duration::from_millis(100),
        )));
        let service = EmployeeService::with_region(store.clone(), region);
        let employee = seed(&store, "first", 1000).await;

        service.get(employee.id).await.unwrap();
        service.list().await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        service.get(employee.id).await.unwrap();
        service.list().await.unwrap();

        assert_eq!(store.calls(), (2, 2, 0, 0));
    }

    #[tokio::test]
    async fn test_lifecycle_scenario() {
        let (service, store, _) = setup();

        let created = service.create(NewEmployee::new("A", "D", 1000)).await.unwrap();
        assert_eq!(created.id, 1);

        assert_eq!(service.get(1).await.unwrap(), created);
        assert_eq!(store.calls().1, 0);

        let updated = service
            .update(1, NewEmployee::new("A", "E", 1500))
            .await
            .unwrap();
        assert_eq!(updated.department, "E");

        assert_eq!(service.list().await.unwrap(), vec![updated]);

        service.delete(1).await.unwrap();
        assert!(matches!(service.get(1).await, Err(AppError::NotFound { .. })));
        assert_eq!(service.list().await.unwrap(), Vec::<Employee>::new());
    }

    #[tokio::test]
    async fn test_concurrent_updates_leave_cache_equal_to_store() {
        let (service, store, region) = setup();
        let id = seed(&store, "first", 0).await.id;

        let mut handles = Vec::new();
        for salary in 1..=32 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service
                    .update(id, NewEmployee::new("first", "D", salary))
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = store.inner.find_by_id(id).await.unwrap();
        assert_eq!(region.get::<Employee>("1").await, stored);
    }

    #[tokio::test]
    async fn test_list_fill_racing_create_is_not_left_stale() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(CountingStore {
            find_all_gate: Some((entered.clone(), release.clone())),
            ..Default::default()
        });
        let region = memory_region();
        let service = EmployeeService::with_region(store.clone(), region.clone());

        // Fill reads the empty table, then stalls before caching it
        let filler = {
            let service = service.clone();
            tokio::spawn(async move { service.list().await })
        };
        entered.notified().await;

        let creator = {
            let service = service.clone();
            tokio::spawn(async move { service.create(NewEmployee::new("A", "D", 1)).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!creator.is_finished());

        release.notify_one();
        assert!(filler.await.unwrap().unwrap().is_empty());
        let created = creator.await.unwrap().unwrap();

        assert_eq!(region.get::<Vec<Employee>>(ALL_KEY).await, None);
        assert_eq!(service.list().await.unwrap(), vec![created]);
    }

    fn stalled_insert_service() -> (EmployeeService, CacheRegion, Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let store = Arc::new(CountingStore {
            insert_gate: Some((entered.clone(), release.clone())),
            ..Default::default()
        });
        let region = memory_region();
        let service = EmployeeService::with_region(store, region.clone());
        (service, region, entered, release)
    }

    #[tokio::test]
    async fn test_delete_racing_create_does_not_resurrect_row() {
        let (service, region, entered, release) = stalled_insert_service();

        // Row 1 is in the store but create has not cached it yet
        let creator = {
            let service = service.clone();
            tokio::spawn(async move { service.create(NewEmployee::new("A", "D", 1)).await })
        };
        entered.notified().await;

        service.delete(1).await.unwrap();
        release.notify_one();
        assert_eq!(creator.await.unwrap().unwrap().id, 1);

        assert_eq!(region.get::<Employee>("1").await, None);
        assert!(matches!(service.get(1).await, Err(AppError::NotFound { .. })));
        assert!(service.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_racing_create_keeps_newer_row() {
        let (service, region, entered, release) = stalled_insert_service();

        let creator = {
            let service = service.clone();
            tokio::spawn(async move { service.create(NewEmployee::new("A", "D", 1)).await })
        };
        entered.notified().await;

        let updated = service
            .update(1, NewEmployee::new("A", "E", 2))
            .await
            .unwrap();
        release.notify_one();
        creator.await.unwrap().unwrap();

        assert_eq!(region.get::<Employee>("1").await, Some(updated.clone()));
        assert_eq!(service.get(1).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_service_from_manager_uses_employees_region() {
        let manager = CacheManager::new(crate::config::CacheConfig::default());
        let store = Arc::new(MemoryEmployeeStore::new());
        let service = EmployeeService::new(store, &manager);

        let created = service.create(NewEmployee::new("A", "D", 1)).await.unwrap();
        assert_eq!(
            manager.region(EMPLOYEES_REGION).get::<Employee>("1").await,
            Some(created)
        );
    }
}
