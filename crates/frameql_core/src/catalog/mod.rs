//! Named relations and the create/replace/drop protocol.
pub mod create;
pub mod drop;
pub mod entry;

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use frameql_error::{DbError, ErrorKind, Result};
use parking_lot::RwLock;
use tracing::{debug, trace};

use self::create::{CreateOutcome, CreateRelationInfo, OnConflict};
use self::drop::{DropInfo, DropOutcome};
use self::entry::{Producer, Relation, RelationHandle, RelationInfo, RelationInner, RelationKind};
use crate::backend::{AcceleratedRelation, Backend, check_backend};
use crate::frame::LazyRelation;
use crate::materialize::Materializer;
use crate::source::resolver::SourceResolver;

/// Session scoped catalog of relations.
///
/// A single lock guards the name map. It's only held while looking up or
/// modifying bindings, never while evaluating a relation's data.
#[derive(Debug)]
pub struct Catalog {
    /// Relations keyed by lowercased name.
    relations: RwLock<HashMap<String, Arc<Relation>>>,
    resolver: SourceResolver,
    materializer: Materializer,
}

fn catalog_key(name: &str) -> String {
    name.to_lowercase()
}

impl Catalog {
    pub fn new(resolver: SourceResolver, materializer: Materializer) -> Self {
        Catalog {
            relations: RwLock::new(HashMap::new()),
            resolver,
            materializer,
        }
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    pub fn materializer(&self) -> &Materializer {
        &self.materializer
    }

    /// Bind a view.
    pub fn create_view(&self, info: CreateRelationInfo) -> Result<CreateOutcome> {
        self.create_entry(info, RelationKind::View, false)
    }

    /// Bind a table, materializing it first if `persist` is set.
    pub fn create_table(&self, info: CreateRelationInfo, persist: bool) -> Result<CreateOutcome> {
        self.create_entry(info, RelationKind::Table, persist)
    }

    fn create_entry(
        &self,
        info: CreateRelationInfo,
        kind: RelationKind,
        persist: bool,
    ) -> Result<CreateOutcome> {
        let key = catalog_key(&info.name);

        // Check conflicts up front to avoid evaluating anything when we
        // already know the outcome. Checked again when committing.
        {
            let relations = self.relations.read();
            if let Some(existing) = relations.get(&key) {
                match info.on_conflict {
                    OnConflict::Ignore => {
                        debug!(
                            name = %info.name,
                            existing = %existing.kind(),
                            "relation exists, skipping create"
                        );
                        return Ok(CreateOutcome::Skipped);
                    }
                    OnConflict::Error => return Err(already_exists(existing)),
                    OnConflict::Replace => (),
                }
            }

            // A persisted table reads its inputs once, so it may read from the
            // relation it's replacing.
            if !persist {
                check_no_cycle(&relations, &key, &info.producer)?;
            }
        }

        check_backend(info.backend, self.resolver.accelerator().as_ref())?;

        // Evaluate once now so that bad sources fail the create.
        let lazy = self.evaluate(&info.producer, info.backend)?;
        let snapshot = if persist {
            Some(Arc::new(
                self.materializer.materialize(lazy.as_ref(), info.backend)?,
            ))
        } else {
            None
        };

        let relation = match kind {
            RelationKind::View => Relation::new_view(info.name, info.backend, info.producer),
            RelationKind::Table => {
                Relation::new_table(info.name, info.backend, info.producer, snapshot)
            }
        };

        let mut relations = self.relations.write();

        // Other relations may have been rebound while evaluating.
        if !persist {
            check_no_cycle(&relations, &key, &relation.producer)?;
        }

        let outcome = match relations.entry(key) {
            Entry::Vacant(ent) => {
                ent.insert(Arc::new(relation));
                CreateOutcome::Created
            }
            Entry::Occupied(mut ent) => match info.on_conflict {
                OnConflict::Ignore => CreateOutcome::Skipped,
                OnConflict::Error => return Err(already_exists(ent.get())),
                OnConflict::Replace => {
                    ent.insert(Arc::new(relation));
                    CreateOutcome::Replaced
                }
            },
        };

        debug!(%kind, %outcome, persist, "create relation");

        Ok(outcome)
    }

    /// Remove a binding.
    pub fn drop_relation(&self, drop: &DropInfo) -> Result<DropOutcome> {
        let key = catalog_key(&drop.name);
        let mut relations = self.relations.write();

        let existing = match relations.get(&key) {
            Some(existing) => existing,
            None if drop.if_exists => return Ok(DropOutcome::Missing),
            None => return Err(not_found(&relations, &drop.name)),
        };

        if !drop.object.matches(existing.kind()) {
            return Err(DbError::new(format!(
                "'{}' is a {}, not a view",
                existing.name,
                existing.kind(),
            ))
            .with_kind(ErrorKind::WrongRelationType));
        }

        relations.remove(&key);
        debug!(name = %drop.name, "dropped relation");

        Ok(DropOutcome::Dropped)
    }

    /// Get the bound relation for a name.
    pub fn get(&self, name: &str) -> Option<Arc<Relation>> {
        self.relations.read().get(&catalog_key(name)).cloned()
    }

    /// Resolve a name to data.
    ///
    /// Views and unmaterialized tables evaluate their producer on every call.
    /// Materialized tables return their snapshot.
    pub fn resolve(&self, name: &str) -> Result<RelationHandle> {
        let relation = {
            let relations = self.relations.read();
            match relations.get(&catalog_key(name)) {
                Some(rel) => rel.clone(),
                None => return Err(not_found(&relations, name)),
            }
        };

        if let Some(snapshot) = relation.snapshot() {
            trace!(%name, "resolved materialized table");
            return Ok(RelationHandle::Materialized(snapshot.clone()));
        }

        trace!(%name, kind = %relation.kind(), "evaluating relation producer");
        let lazy = self.evaluate(&relation.producer, relation.backend)?;

        Ok(RelationHandle::Lazy(lazy))
    }

    /// Materialize a table that was created without persisting.
    ///
    /// Returns false if the table was already materialized, or if it was
    /// replaced while materializing (the result is discarded).
    pub fn materialize_table(&self, name: &str) -> Result<bool> {
        let key = catalog_key(name);
        let relation = {
            let relations = self.relations.read();
            match relations.get(&key) {
                Some(rel) => rel.clone(),
                None => return Err(not_found(&relations, name)),
            }
        };

        let state = match &relation.inner {
            RelationInner::Table(state) => state,
            RelationInner::View => {
                return Err(DbError::new(format!(
                    "Cannot materialize view '{}'",
                    relation.name
                ))
                .with_kind(ErrorKind::WrongRelationType));
            }
        };

        if state.snapshot.get().is_some() {
            return Ok(false);
        }

        let lazy = self.evaluate(&relation.producer, relation.backend)?;
        let snapshot = Arc::new(
            self.materializer
                .materialize(lazy.as_ref(), relation.backend)?,
        );

        let relations = self.relations.write();
        match relations.get(&key) {
            Some(current) if Arc::ptr_eq(current, &relation) => {
                let set = state.snapshot.set(snapshot).is_ok();
                debug!(%name, set, "materialized table");
                Ok(set)
            }
            Some(_) => {
                debug!(
                    %name,
                    "table replaced during materialization, discarding snapshot"
                );
                Ok(false)
            }
            None => Err(DbError::relation_not_found(name)),
        }
    }

    /// List all relations sorted by name.
    pub fn list_relations(&self) -> Vec<RelationInfo> {
        let mut infos: Vec<_> = self
            .relations
            .read()
            .values()
            .map(|rel| RelationInfo::from(rel.as_ref()))
            .collect();
        infos.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        infos
    }

    /// Evaluate a producer into a lazy relation.
    fn evaluate(&self, producer: &Producer, backend: Backend) -> Result<Arc<dyn LazyRelation>> {
        let lazy = match producer {
            Producer::Source(desc) => return self.resolver.resolve(desc, backend),
            Producer::Query(plan) => plan.bind(self)?,
            Producer::Frame(frame) => frame.clone(),
        };

        match backend {
            Backend::Cpu => Ok(lazy),
            Backend::Accelerated => {
                let accelerator = self.resolver.accelerator();
                check_backend(backend, accelerator.as_ref())?;
                Ok(Arc::new(AcceleratedRelation::new(lazy, accelerator.clone())))
            }
        }
    }
}

/// Check that binding `key` to `producer` wouldn't make a relation read from
/// itself.
fn check_no_cycle(
    relations: &HashMap<String, Arc<Relation>>,
    key: &str,
    producer: &Producer,
) -> Result<()> {
    let mut stack: Vec<String> = producer
        .referenced_relations()
        .iter()
        .map(|n| catalog_key(n))
        .collect();
    let mut visited: Vec<String> = Vec::new();

    while let Some(name) = stack.pop() {
        if name == key {
            return Err(DbError::cyclic_reference(key));
        }
        if visited.contains(&name) {
            continue;
        }

        if let Some(rel) = relations.get(&name) {
            // Snapshots never re-read their inputs.
            if !rel.is_materialized() {
                stack.extend(
                    rel.producer
                        .referenced_relations()
                        .iter()
                        .map(|n| catalog_key(n)),
                );
            }
        }
        visited.push(name);
    }

    Ok(())
}

fn already_exists(existing: &Relation) -> DbError {
    DbError::relation_already_exists(&existing.name).with_field("existing_kind", existing.kind())
}

/// Create a not found error, suggesting a similarly named relation if there
/// is one.
fn not_found(relations: &HashMap<String, Arc<Relation>>, name: &str) -> DbError {
    const SIMILARITY_THRESHOLD: f64 = 0.7;

    let lower = catalog_key(name);
    let similar = relations
        .iter()
        .map(|(key, rel)| (strsim::jaro(key, &lower), rel))
        .filter(|(score, _)| *score > SIMILARITY_THRESHOLD)
        .max_by(|(a, _), (b, _)| a.total_cmp(b));

    match similar {
        Some((_, rel)) => DbError::new(format!(
            "Missing relation '{name}', did you mean '{}'?",
            rel.name
        ))
        .with_kind(ErrorKind::RelationNotFound),
        None => DbError::relation_not_found(name),
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Barrier;

    use parking_lot::Mutex;

    use super::testutil::{test_catalog, test_catalog_with};
    use super::*;
    use crate::arrays::array::Array;
    use crate::arrays::batch::Batch;
    use crate::arrays::datatype::DataType;
    use crate::arrays::field::{Field, Schema};
    use crate::backend::NoAcceleratedBackend;
    use crate::frame::count_rows;
    use crate::frame::memory::MemoryFrame;
    use crate::planner::QueryPlan;
    use crate::source::SourceDescriptor;
    use crate::source::publish::MemoryPublishRegistry;
    use crate::source::registry::FormatRegistry;

    /// Frame whose row count can be changed after creation.
    #[derive(Debug)]
    struct MutableFrame {
        schema: Schema,
        rows: Mutex<usize>,
    }

    impl MutableFrame {
        fn new(rows: usize) -> Arc<Self> {
            Arc::new(MutableFrame {
                schema: Schema::new([Field::new("a", DataType::Int64, true)]),
                rows: Mutex::new(rows),
            })
        }
    }

    impl LazyRelation for MutableFrame {
        fn schema(&self) -> &Schema {
            &self.schema
        }

        fn num_partitions(&self) -> usize {
            1
        }

        fn read_partition(&self, _partition: usize) -> Result<Vec<Batch>> {
            let rows = *self.rows.lock();
            Ok(vec![Batch::try_new([Array::Int64(vec![Some(7); rows])])?])
        }
    }

    /// Frame that blocks on its first read until released.
    ///
    /// The first read waits on the gate twice, once to signal that reading
    /// has started and once to wait for the go ahead to finish.
    #[derive(Debug)]
    struct GatedFrame {
        inner: Arc<MutableFrame>,
        gate: Mutex<Option<Arc<Barrier>>>,
    }

    impl LazyRelation for GatedFrame {
        fn schema(&self) -> &Schema {
            self.inner.schema()
        }

        fn num_partitions(&self) -> usize {
            1
        }

        fn read_partition(&self, partition: usize) -> Result<Vec<Batch>> {
            let gate = self.gate.lock().take();
            if let Some(gate) = gate {
                gate.wait();
                gate.wait();
            }
            self.inner.read_partition(partition)
        }
    }

    /// Query over other relations that blocks on its first bind until
    /// released.
    #[derive(Debug)]
    struct GatedQuery {
        references: Vec<String>,
        gate: Mutex<Option<Arc<Barrier>>>,
    }

    impl QueryPlan for GatedQuery {
        fn sql(&self) -> &str {
            "gated"
        }

        fn referenced_relations(&self) -> Vec<String> {
            self.references.clone()
        }

        fn bind(&self, _catalog: &Catalog) -> Result<Arc<dyn LazyRelation>> {
            let gate = self.gate.lock().take();
            if let Some(gate) = gate {
                gate.wait();
            }
            Ok(MutableFrame::new(1))
        }
    }

    fn frame_with_rows(rows: usize) -> Producer {
        Producer::Frame(MutableFrame::new(rows))
    }

    fn resolved_rows(catalog: &Catalog, name: &str) -> usize {
        count_rows(catalog.resolve(name).unwrap().as_lazy()).unwrap()
    }

    #[test]
    fn create_conflict_keeps_original() {
        let catalog = test_catalog();
        let outcome = catalog
            .create_table(CreateRelationInfo::new("t1", frame_with_rows(3)), true)
            .unwrap();
        assert_eq!(CreateOutcome::Created, outcome);

        let err = catalog
            .create_table(CreateRelationInfo::new("T1", frame_with_rows(5)), true)
            .unwrap_err();
        assert_eq!(ErrorKind::RelationAlreadyExists, err.kind());

        // Also rejected when the existing relation is a different type.
        let err = catalog
            .create_view(CreateRelationInfo::new("t1", frame_with_rows(5)))
            .unwrap_err();
        assert_eq!(ErrorKind::RelationAlreadyExists, err.kind());

        assert_eq!(3, resolved_rows(&catalog, "t1"));
    }

    #[test]
    fn create_if_not_exists_is_noop() {
        let catalog = test_catalog();
        catalog
            .create_view(CreateRelationInfo::new("v1", frame_with_rows(3)))
            .unwrap();

        let outcome = catalog
            .create_table(
                CreateRelationInfo::new("v1", frame_with_rows(5))
                    .with_on_conflict(OnConflict::Ignore),
                true,
            )
            .unwrap();
        assert_eq!(CreateOutcome::Skipped, outcome);

        assert_eq!(RelationKind::View, catalog.get("v1").unwrap().kind());
        assert_eq!(3, resolved_rows(&catalog, "v1"));
    }

    #[test]
    fn create_or_replace() {
        let catalog = test_catalog();
        catalog
            .create_table(CreateRelationInfo::new("t1", frame_with_rows(3)), true)
            .unwrap();

        let outcome = catalog
            .create_view(
                CreateRelationInfo::new("t1", frame_with_rows(5))
                    .with_on_conflict(OnConflict::Replace),
            )
            .unwrap();
        assert_eq!(CreateOutcome::Replaced, outcome);

        let rel = catalog.get("t1").unwrap();
        assert_eq!(RelationKind::View, rel.kind());
        assert!(!rel.is_materialized());
        assert_eq!(5, resolved_rows(&catalog, "t1"));
    }

    #[test]
    fn view_and_persisted_table_diverge() {
        let catalog = test_catalog();
        let frame = MutableFrame::new(700);

        catalog
            .create_view(CreateRelationInfo::new("v", Producer::Frame(frame.clone())))
            .unwrap();
        catalog
            .create_table(
                CreateRelationInfo::new("t", Producer::Frame(frame.clone())),
                true,
            )
            .unwrap();
        catalog
            .create_table(
                CreateRelationInfo::new("lazy_t", Producer::Frame(frame.clone())),
                false,
            )
            .unwrap();

        assert_eq!(700, resolved_rows(&catalog, "v"));
        assert_eq!(700, resolved_rows(&catalog, "t"));
        assert_eq!(700, resolved_rows(&catalog, "lazy_t"));

        *frame.rows.lock() = 10;

        assert_eq!(10, resolved_rows(&catalog, "v"));
        assert_eq!(700, resolved_rows(&catalog, "t"));
        assert_eq!(10, resolved_rows(&catalog, "lazy_t"));
        assert!(catalog.resolve("t").unwrap().is_materialized());
        assert!(!catalog.resolve("lazy_t").unwrap().is_materialized());
    }

    #[test]
    fn materialize_unpersisted_table() {
        let catalog = test_catalog();
        let frame = MutableFrame::new(4);
        catalog
            .create_table(
                CreateRelationInfo::new("t", Producer::Frame(frame.clone())),
                false,
            )
            .unwrap();

        assert!(catalog.materialize_table("t").unwrap());
        assert!(!catalog.materialize_table("t").unwrap());

        *frame.rows.lock() = 1;
        assert_eq!(4, resolved_rows(&catalog, "t"));

        catalog
            .create_view(CreateRelationInfo::new("v", Producer::Frame(frame)))
            .unwrap();
        let err = catalog.materialize_table("v").unwrap_err();
        assert_eq!(ErrorKind::WrongRelationType, err.kind());
    }

    #[test]
    fn drop_semantics() {
        let catalog = test_catalog();

        let err = catalog
            .drop_relation(&DropInfo::table("t1", false))
            .unwrap_err();
        assert_eq!(ErrorKind::RelationNotFound, err.kind());

        let outcome = catalog.drop_relation(&DropInfo::table("t1", true)).unwrap();
        assert_eq!(DropOutcome::Missing, outcome);

        catalog
            .create_table(CreateRelationInfo::new("t1", frame_with_rows(2)), true)
            .unwrap();
        let outcome = catalog.drop_relation(&DropInfo::table("t1", false)).unwrap();
        assert_eq!(DropOutcome::Dropped, outcome);

        let err = catalog.resolve("t1").unwrap_err();
        assert_eq!(ErrorKind::RelationNotFound, err.kind());

        let outcome = catalog
            .create_table(
                CreateRelationInfo::new("t1", frame_with_rows(9))
                    .with_on_conflict(OnConflict::Ignore),
                true,
            )
            .unwrap();
        assert_eq!(CreateOutcome::Created, outcome);
        assert_eq!(9, resolved_rows(&catalog, "t1"));

        // Dropping as a table removes views too.
        catalog
            .create_view(CreateRelationInfo::new("v1", frame_with_rows(2)))
            .unwrap();
        let outcome = catalog.drop_relation(&DropInfo::table("v1", false)).unwrap();
        assert_eq!(DropOutcome::Dropped, outcome);
        assert!(catalog.get("v1").is_none());
    }

    #[test]
    fn drop_wrong_type() {
        let catalog = test_catalog();
        catalog
            .create_table(CreateRelationInfo::new("t1", frame_with_rows(2)), false)
            .unwrap();

        let err = catalog.drop_relation(&DropInfo::view("t1", true)).unwrap_err();
        assert_eq!(ErrorKind::WrongRelationType, err.kind());
        assert!(catalog.get("t1").is_some());
    }

    #[test]
    fn self_reference_rejected() {
        let catalog = test_catalog();
        catalog
            .create_view(CreateRelationInfo::new("a", frame_with_rows(1)))
            .unwrap();

        let query = GatedQuery {
            references: vec!["A".to_string()],
            gate: Mutex::new(None),
        };
        let err = catalog
            .create_view(
                CreateRelationInfo::new("a", Producer::Query(Arc::new(query)))
                    .with_on_conflict(OnConflict::Replace),
            )
            .unwrap_err();
        assert_eq!(ErrorKind::CyclicReference, err.kind());
        assert_eq!(1, resolved_rows(&catalog, "a"));
    }

    #[test]
    fn concurrent_replaces_cannot_form_cycle() {
        let catalog = test_catalog();
        for name in ["a", "b"] {
            catalog
                .create_view(CreateRelationInfo::new(name, frame_with_rows(1)))
                .unwrap();
        }

        // Both replacements pass the initial check before either commits.
        let gate = Arc::new(Barrier::new(2));
        let replace = |name: &str, references: &str| {
            let query = GatedQuery {
                references: vec![references.to_string()],
                gate: Mutex::new(Some(gate.clone())),
            };
            catalog.create_view(
                CreateRelationInfo::new(name, Producer::Query(Arc::new(query)))
                    .with_on_conflict(OnConflict::Replace),
            )
        };

        let (a, b) = std::thread::scope(|s| {
            let a = s.spawn(|| replace("a", "b"));
            let b = s.spawn(|| replace("b", "a"));
            (a.join().unwrap(), b.join().unwrap())
        });

        let (ok, err) = match (a, b) {
            (Ok(outcome), Err(err)) | (Err(err), Ok(outcome)) => (outcome, err),
            other => panic!("expected exactly one replace to succeed: {other:?}"),
        };
        assert_eq!(CreateOutcome::Replaced, ok);
        assert_eq!(ErrorKind::CyclicReference, err.kind());
    }

    #[test]
    fn readers_observe_old_or_new_binding() {
        let catalog = test_catalog();
        catalog
            .create_table(CreateRelationInfo::new("t", frame_with_rows(3)), true)
            .unwrap();

        std::thread::scope(|s| {
            s.spawn(|| {
                for i in 0..200 {
                    if i % 2 == 0 {
                        let info = CreateRelationInfo::new("t", frame_with_rows(5))
                            .with_on_conflict(OnConflict::Replace);
                        catalog.create_view(info).unwrap();
                    } else {
                        let info = CreateRelationInfo::new("t", frame_with_rows(3))
                            .with_on_conflict(OnConflict::Replace);
                        catalog.create_table(info, true).unwrap();
                    }
                }
            });

            for _ in 0..200 {
                let handle = catalog.resolve("t").unwrap();
                let materialized = handle.is_materialized();
                let rows = count_rows(handle.as_lazy()).unwrap();
                assert!(
                    (materialized && rows == 3) || (!materialized && rows == 5),
                    "materialized: {materialized}, rows: {rows}"
                );
            }
        });
    }

    #[test]
    fn concurrent_creates_single_winner() {
        const THREADS: usize = 4;

        let catalog = test_catalog();
        let start = Barrier::new(THREADS);

        let results: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..THREADS)
                .map(|idx| {
                    let catalog = &catalog;
                    let start = &start;
                    s.spawn(move || {
                        start.wait();
                        catalog.create_table(
                            CreateRelationInfo::new("t", frame_with_rows(idx + 1)),
                            false,
                        )
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut winner = None;
        for (idx, result) in results.into_iter().enumerate() {
            match result {
                Ok(outcome) => {
                    assert_eq!(CreateOutcome::Created, outcome);
                    assert!(winner.is_none(), "multiple creates succeeded");
                    winner = Some(idx);
                }
                Err(err) => assert_eq!(ErrorKind::RelationAlreadyExists, err.kind()),
            }
        }

        let winner = winner.expect("one create to succeed");
        assert_eq!(winner + 1, resolved_rows(&catalog, "t"));
    }

    #[test]
    fn materialize_discarded_when_replaced() {
        let catalog = test_catalog();
        let gate = Arc::new(Barrier::new(2));
        let frame = GatedFrame {
            inner: MutableFrame::new(4),
            gate: Mutex::new(Some(gate.clone())),
        };
        catalog
            .create_table(
                CreateRelationInfo::new("t", Producer::Frame(Arc::new(frame))),
                false,
            )
            .unwrap();

        let materialized = std::thread::scope(|s| {
            let handle = s.spawn(|| catalog.materialize_table("t"));

            // Reading has started, swap the binding out underneath it.
            gate.wait();
            catalog
                .create_table(
                    CreateRelationInfo::new("t", frame_with_rows(9))
                        .with_on_conflict(OnConflict::Replace),
                    false,
                )
                .unwrap();
            gate.wait();

            handle.join().unwrap()
        });

        assert!(!materialized.unwrap());
        assert!(!catalog.get("t").unwrap().is_materialized());
        assert_eq!(9, resolved_rows(&catalog, "t"));
    }

    #[test]
    fn not_found_suggests_similar() {
        let catalog = test_catalog();
        catalog
            .create_view(CreateRelationInfo::new("new_table", frame_with_rows(1)))
            .unwrap();

        let err = catalog.resolve("new_tabel").unwrap_err();
        assert_eq!(ErrorKind::RelationNotFound, err.kind());
        assert!(err.message().contains("did you mean 'new_table'"), "{err}");
    }

    #[test]
    fn accelerated_unavailable_leaves_catalog_unchanged() {
        let catalog = test_catalog();
        let err = catalog
            .create_table(
                CreateRelationInfo::new("t1", frame_with_rows(1))
                    .with_backend(Backend::Accelerated),
                true,
            )
            .unwrap_err();
        assert_eq!(ErrorKind::AcceleratedBackendUnavailable, err.kind());
        assert!(catalog.get("t1").is_none());
    }

    #[test]
    fn unpublished_source_fails_on_next_read() {
        let published = Arc::new(MemoryPublishRegistry::new());
        let catalog = test_catalog_with(
            Arc::new(FormatRegistry::new()),
            published.clone(),
            Arc::new(NoAcceleratedBackend),
        );

        let frame = MemoryFrame::try_new(Schema::empty(), Vec::new()).unwrap();
        published.publish("df", Arc::new(frame)).unwrap();

        catalog
            .create_view(CreateRelationInfo::new(
                "v",
                Producer::Source(SourceDescriptor::published("df")),
            ))
            .unwrap();
        catalog.resolve("v").unwrap();

        published.unpublish("df");
        let err = catalog.resolve("v").unwrap_err();
        assert_eq!(ErrorKind::SourceNotFound, err.kind());
    }

    #[test]
    fn create_with_missing_source_fails_fast() {
        let catalog = test_catalog();
        let err = catalog
            .create_view(CreateRelationInfo::new(
                "v",
                Producer::Source(SourceDescriptor::published("missing")),
            ))
            .unwrap_err();
        assert_eq!(ErrorKind::SourceNotFound, err.kind());
        assert!(catalog.get("v").is_none());
    }

    #[test]
    fn list_sorted() {
        let catalog = test_catalog();
        for name in ["b", "A", "c"] {
            catalog
                .create_view(CreateRelationInfo::new(name, frame_with_rows(1)))
                .unwrap();
        }
        let names: Vec<_> = catalog
            .list_relations()
            .into_iter()
            .map(|info| info.name)
            .collect();
        assert_eq!(vec!["A", "b", "c"], names);
    }
}
