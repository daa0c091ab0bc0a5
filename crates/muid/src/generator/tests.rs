use std::{
    cell::Cell,
    collections::HashSet,
    rc::Rc,
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
    thread::scope,
};

use crate::{Error, Field, IdGenerator, MonotonicClock, TimeSource, Uid, UidType};

struct MockTime {
    seconds: u64,
}

impl TimeSource for MockTime {
    fn current_seconds(&self) -> u64 {
        self.seconds
    }
}

#[derive(Clone)]
struct SharedMockStepTime {
    clock: Rc<MockStepTime>,
}

impl TimeSource for SharedMockStepTime {
    fn current_seconds(&self) -> u64 {
        self.clock.values[self.clock.index.get()]
    }
}

struct MockStepTime {
    values: Vec<u64>,
    index: Cell<usize>,
}

/// A clock shared across threads that only moves when told to.
struct SyncMockTime {
    seconds: AtomicU64,
}

impl TimeSource for SyncMockTime {
    fn current_seconds(&self) -> u64 {
        self.seconds.load(Ordering::Relaxed)
    }
}

#[test]
fn sequence_increments_within_same_second() {
    let generator = IdGenerator::new(MockTime { seconds: 42 });
    let id1 = generator.allocate(UidType::Band, 1).unwrap();
    let id2 = generator.allocate(UidType::Band, 1).unwrap();
    let id3 = generator.allocate(UidType::Band, 1).unwrap();

    for id in [id1, id2, id3] {
        assert_eq!(id.timestamp(), 42);
        assert_eq!(id.source(), 1);
        assert_eq!(id.uid_type().unwrap(), UidType::Band);
    }
    assert_eq!(id1.sequence(), 0);
    assert_eq!(id2.sequence(), 1);
    assert_eq!(id3.sequence(), 2);
    assert!(id1 < id2 && id2 < id3);
}

#[test]
fn types_share_one_counter() {
    let generator = IdGenerator::new(MockTime { seconds: 42 });
    let a = generator.allocate(UidType::Band, 0).unwrap();
    let b = generator.allocate(UidType::City, 0).unwrap();
    assert_eq!(a.sequence(), 0);
    assert_eq!(b.sequence(), 1);
}

#[test]
fn full_second_then_overloaded() {
    let generator = IdGenerator::new(MockTime { seconds: 1_700_000_000 });
    let mut seen = HashSet::with_capacity(65_536);
    for _ in 0..65_536 {
        let id = generator.allocate(UidType::Record, 0).unwrap();
        assert!(seen.insert(id));
    }
    assert_eq!(seen.len(), 65_536);

    let err = generator.allocate(UidType::Record, 0).unwrap_err();
    assert!(matches!(err, Error::Overloaded { second: 1_700_000_000 }));
    assert!(err.is_overloaded());
}

#[test]
fn overloaded_when_restored_full() {
    let generator = IdGenerator::from_components(0, 65_536, 65_536, MockTime { seconds: 0 }).unwrap();
    assert!(matches!(
        generator.allocate(UidType::User, 0),
        Err(Error::Overloaded { second: 0 })
    ));
}

#[test]
fn rollover_resets_sequence() {
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![42, 43],
            index: Cell::new(0),
        }),
    };
    let generator = IdGenerator::with_capacity(4096, shared_time.clone()).unwrap();

    for i in 0..4096 {
        let id = generator.allocate(UidType::Track, 2).unwrap();
        assert_eq!(u32::from(id.sequence()), i);
        assert_eq!(id.timestamp(), 42);
    }
    assert!(generator.allocate(UidType::Track, 2).unwrap_err().is_overloaded());

    shared_time.clock.index.set(1);

    let id = generator.allocate(UidType::Track, 2).unwrap();
    assert_eq!(id.timestamp(), 43);
    assert_eq!(id.sequence(), 0);
    assert_eq!(generator.allocate(UidType::Track, 2).unwrap().sequence(), 1);
}

#[test]
fn clock_behind_stays_in_last_second() {
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![100, 90],
            index: Cell::new(0),
        }),
    };
    let generator = IdGenerator::with_capacity(3, shared_time.clone()).unwrap();
    let first = generator.allocate(UidType::Event, 0).unwrap();
    assert_eq!((first.timestamp(), first.sequence()), (100, 0));

    shared_time.clock.index.set(1);

    let second = generator.allocate(UidType::Event, 0).unwrap();
    assert_eq!((second.timestamp(), second.sequence()), (100, 1));
    let third = generator.allocate(UidType::Event, 0).unwrap();
    assert_eq!((third.timestamp(), third.sequence()), (100, 2));
    assert!(matches!(
        generator.allocate(UidType::Event, 0),
        Err(Error::Overloaded { second: 100 })
    ));
}

#[test]
fn last_representable_second_is_accepted() {
    let generator = IdGenerator::new(MockTime {
        seconds: u64::from(u32::MAX),
    });
    assert_eq!(generator.allocate(UidType::Genre, 0).unwrap().timestamp(), u32::MAX);
}

#[test]
fn clock_past_timestamp_range_is_an_error() {
    let shared_time = SharedMockStepTime {
        clock: Rc::new(MockStepTime {
            values: vec![u64::from(u32::MAX), 1 << 32, (1 << 32) + 7],
            index: Cell::new(0),
        }),
    };
    let generator = IdGenerator::new(shared_time.clone());
    assert_eq!(generator.allocate(UidType::Genre, 0).unwrap().sequence(), 0);

    for (index, seconds) in [(1, 1 << 32), (2, (1 << 32) + 7)] {
        shared_time.clock.index.set(index);
        let err = generator.allocate(UidType::Genre, 0).unwrap_err();
        assert!(!err.is_overloaded());
        assert!(matches!(err, Error::TimestampOutOfRange { seconds: s } if s == seconds));
    }
}

#[test]
fn rejects_source_and_url_type() {
    let generator = IdGenerator::new(MockTime { seconds: 1 });
    assert!(matches!(
        generator.allocate(UidType::Band, 32),
        Err(Error::FieldOutOfRange {
            field: Field::Source,
            value: 32,
            max: 31
        })
    ));
    assert!(matches!(
        generator.allocate(UidType::Url, 0),
        Err(Error::FieldOutOfRange {
            field: Field::Type,
            ..
        })
    ));
    // Rejected calls do not consume a sequence value.
    assert_eq!(generator.allocate(UidType::Band, 0).unwrap().sequence(), 0);
}

#[test]
fn rejects_bad_capacity() {
    assert!(IdGenerator::with_capacity(0, MockTime { seconds: 0 }).is_err());
    assert!(IdGenerator::with_capacity(65_537, MockTime { seconds: 0 }).is_err());
    let generator = IdGenerator::with_capacity(65_536, MockTime { seconds: 0 }).unwrap();
    assert_eq!(generator.capacity(), 65_536);
}

#[test]
fn reset_forgets_state() {
    let generator = IdGenerator::with_capacity(1, MockTime { seconds: 5 }).unwrap();
    generator.allocate(UidType::City, 0).unwrap();
    assert!(generator.allocate(UidType::City, 0).is_err());
    generator.reset();
    assert_eq!(generator.allocate(UidType::City, 0).unwrap().sequence(), 0);
}

#[test]
fn threaded_allocations_are_unique() {
    const THREADS: usize = 8;
    const TOTAL_IDS: usize = 1 << 16;
    const IDS_PER_THREAD: usize = TOTAL_IDS / THREADS;

    let clock = SyncMockTime {
        seconds: AtomicU64::new(1_700_000_000),
    };
    let generator = IdGenerator::new(&clock);
    let seen_ids: Mutex<HashSet<Uid>> = Mutex::new(HashSet::with_capacity(TOTAL_IDS));

    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                for _ in 0..IDS_PER_THREAD {
                    let id = generator.allocate(UidType::Venue, 4).unwrap();
                    assert!(seen_ids.lock().unwrap().insert(id));
                }
            });
        }
    });

    assert_eq!(seen_ids.lock().unwrap().len(), TOTAL_IDS);
    assert!(generator.allocate(UidType::Venue, 4).unwrap_err().is_overloaded());

    clock.seconds.fetch_add(1, Ordering::Relaxed);
    let id = generator.allocate(UidType::Venue, 4).unwrap();
    assert_eq!((id.timestamp(), id.sequence()), (1_700_000_001, 0));
}

#[test]
fn threaded_rollover_issues_sequence_zero_once() {
    const THREADS: usize = 8;

    let clock = SyncMockTime {
        seconds: AtomicU64::new(10),
    };
    let generator = IdGenerator::new(&clock);
    generator.allocate(UidType::Band, 0).unwrap();
    clock.seconds.store(11, Ordering::Relaxed);

    let ids: Mutex<Vec<Uid>> = Mutex::new(Vec::new());
    scope(|s| {
        for _ in 0..THREADS {
            s.spawn(|| {
                let id = generator.allocate(UidType::Band, 0).unwrap();
                ids.lock().unwrap().push(id);
            });
        }
    });

    let ids = ids.into_inner().unwrap();
    let zeros = ids.iter().filter(|id| id.sequence() == 0).count();
    assert_eq!(zeros, 1);
    let unique: HashSet<_> = ids.iter().collect();
    assert_eq!(unique.len(), THREADS);
}

#[test]
fn monotonic_clock_smoke() {
    let generator = IdGenerator::new(MonotonicClock::new());
    let mut last = None;
    for _ in 0..1000 {
        let id = match generator.allocate(UidType::User, 0) {
            Ok(id) => id,
            Err(e) if e.is_overloaded() => continue,
            Err(e) => panic!("unexpected error: {e}"),
        };
        if let Some(prev) = last {
            assert!(id > prev);
        }
        last = Some(id);
    }
}
