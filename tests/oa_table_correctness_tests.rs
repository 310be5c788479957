use oahash::{KeyHasher, OaTable, ProbeStep, TableError};

/// Хеш-функция, сводящая все ключи в одну цепочку коллизий.
#[derive(Debug, Clone, Copy, Default)]
struct ConstHasher;

impl<K: ?Sized> KeyHasher<K> for ConstHasher {
    fn hash_key(
        &self,
        _key: &K,
    ) -> u64 {
        0
    }

    fn name(&self) -> &'static str {
        "const"
    }
}

/// Все ключи с хешем 1: при ёмкости 4 шаг `Reference` обходит только
/// ячейки 1 и 3.
#[derive(Debug, Clone, Copy, Default)]
struct OneHasher;

impl<K: ?Sized> KeyHasher<K> for OneHasher {
    fn hash_key(
        &self,
        _key: &K,
    ) -> u64 {
        1
    }

    fn name(&self) -> &'static str {
        "one"
    }
}

fn collide(capacity: usize) -> OaTable<String, i32, ConstHasher> {
    OaTable::with_hasher(capacity, 0.75, ConstHasher).unwrap()
}

#[test]
fn test_capacity_two_scenario() {
    let mut t: OaTable<String, i32> = OaTable::new(2, 0.5).unwrap();

    // 0 / 2 < 0.5: первая вставка без рехеширования
    assert!(t.insert("A".to_string(), 1).unwrap());
    assert_eq!(t.capacity(), 2);

    // 1 / 2 >= 0.5: перед второй вставкой ёмкость удваивается
    assert!(t.insert("B".to_string(), 2).unwrap());
    assert_eq!(t.capacity(), 4);
    assert_eq!(t.len(), 2);

    assert!(t.remove("A"));
    assert_eq!(t.get("A"), None);
    assert_eq!(t.get("B"), Some(&2));

    assert!(t.insert("A".to_string(), 100).unwrap());
    assert_eq!(t.get("A"), Some(&100));
    assert_eq!(t.len(), 2);
    t.validate_invariants().unwrap();
}

/// Тест проверяет, что после серии вставок без удалений каждый ключ
/// находится со своим значением.
#[test]
fn test_no_false_negatives() {
    let mut t: OaTable<String, usize> = OaTable::new(1, 0.7).unwrap();
    for i in 0..500 {
        t.insert(format!("key-{i}"), i).unwrap();
    }

    assert_eq!(t.len(), 500);
    for i in 0..500 {
        assert_eq!(t.get(format!("key-{i}").as_str()), Some(&i));
    }
    t.validate_invariants().unwrap();
}

#[test]
fn test_update_keeps_size() {
    let mut t: OaTable<String, &str> = OaTable::default();

    assert!(t.insert("k".to_string(), "v1").unwrap());
    assert!(!t.insert("k".to_string(), "v2").unwrap());

    assert_eq!(t.get("k"), Some(&"v2"));
    assert_eq!(t.len(), 1);
}

/// Тест проверяет, что ячейка tombstone переиспользуется повторной
/// вставкой того же ключа.
#[test]
fn test_tombstone_reuse() {
    let mut t = collide(8);
    t.insert("k".to_string(), 1).unwrap();

    assert!(t.remove("k"));
    assert_eq!(t.get("k"), None);
    assert_eq!(t.tombstones(), 1);
    assert_eq!(t.len(), 0);

    assert!(t.insert("k".to_string(), 2).unwrap());
    assert_eq!(t.get("k"), Some(&2));
    assert_eq!(t.tombstones(), 0);
    assert_eq!(t.len(), 1);
}

#[test]
fn test_remove_does_not_break_collision_chain() {
    let mut t = collide(8);
    for (i, k) in ["a", "b", "c", "d"].iter().enumerate() {
        t.insert(k.to_string(), i as i32).unwrap();
    }

    assert!(t.remove("b"));
    assert!(!t.remove("b"));

    // "c" и "d" лежат за tombstone'ом
    assert_eq!(t.get("c"), Some(&2));
    assert_eq!(t.get("d"), Some(&3));
    t.validate_invariants().unwrap();
}

/// Тест проверяет, что обновление ключа, лежащего за tombstone'ом, не
/// создаёт дубликат.
#[test]
fn test_update_past_tombstone_no_duplicate() {
    let mut t = collide(8);
    t.insert("a".to_string(), 1).unwrap();
    t.insert("b".to_string(), 2).unwrap();
    t.remove("a");

    assert!(!t.insert("b".to_string(), 20).unwrap());

    assert_eq!(t.len(), 1);
    assert_eq!(t.iter().count(), 1);
    assert_eq!(t.get("b"), Some(&20));
    t.validate_invariants().unwrap();
}

#[test]
fn test_growth_preserves_membership() {
    let mut t = collide(2);
    for i in 0..64 {
        t.insert(format!("k{i}"), i).unwrap();
    }
    for i in (0..64).step_by(3) {
        t.remove(format!("k{i}").as_str());
    }
    for i in 64..128 {
        t.insert(format!("k{i}"), i).unwrap();
    }

    for i in 0..128 {
        let expected = if i < 64 && i % 3 == 0 { None } else { Some(&i) };
        assert_eq!(t.get(format!("k{i}").as_str()), expected, "key k{i}");
    }
    assert!(t.capacity().is_power_of_two());
    t.validate_invariants().unwrap();
}

#[test]
fn test_growth_drops_tombstones() {
    let mut t: OaTable<u32, u32> = OaTable::new(4, 0.5).unwrap();
    t.insert(1, 1).unwrap();
    t.remove(&1);
    t.insert(2, 2).unwrap();
    assert_eq!(t.tombstones(), 1);

    t.insert(3, 3).unwrap();
    t.insert(4, 4).unwrap();

    assert_eq!(t.capacity(), 8);
    assert_eq!(t.tombstones(), 0);
    assert_eq!(t.len(), 3);
}

#[test]
fn test_capacity_never_shrinks() {
    let mut t: OaTable<u32, u32> = OaTable::new(2, 0.5).unwrap();
    for i in 0..32 {
        t.insert(i, i).unwrap();
    }
    let grown = t.capacity();
    for i in 0..32 {
        t.remove(&i);
    }
    t.compact().unwrap();
    t.clear();

    assert!(t.is_empty());
    assert_eq!(t.capacity(), grown);
}

/// Тест проверяет, что при шаге `Reference` пробная последовательность
/// может не найти свободную ячейку, а таблица остаётся прежней.
#[test]
fn test_reference_step_can_fill_up() {
    let mut t: OaTable<u32, u32, OneHasher> = OaTable::with_hasher(4, 0.9, OneHasher)
        .unwrap()
        .with_probe_step(ProbeStep::Reference)
        .unwrap();

    t.insert(1, 1).unwrap();
    t.insert(2, 2).unwrap();
    let err = t.insert(3, 3).unwrap_err();

    assert_eq!(
        err,
        TableError::TableFull {
            capacity: 4,
            attempts: 4,
        }
    );
    assert_eq!(t.len(), 2);
    assert_eq!(t.get(&3), None);
    t.validate_invariants().unwrap();
}

#[test]
fn test_coprime_step_uses_every_slot() {
    let mut t: OaTable<u32, u32, OneHasher> = OaTable::with_hasher(4, 0.9, OneHasher).unwrap();
    for i in 0..4 {
        t.insert(i, i).unwrap();
    }

    assert_eq!(t.len(), 4);
    for i in 0..4 {
        assert_eq!(t.get(&i), Some(&i));
    }
}

#[test]
fn test_invalid_parameters() {
    assert_eq!(
        OaTable::<String, i32>::new(0, 0.5).unwrap_err(),
        TableError::InvalidCapacity { capacity: 0 }
    );
    assert!(matches!(
        OaTable::<String, i32>::new(4, 1.0),
        Err(TableError::InvalidLoadFactor { .. })
    ));
    assert!(matches!(
        OaTable::<String, i32>::new(4, 0.0),
        Err(TableError::InvalidLoadFactor { .. })
    ));
    assert!(OaTable::<String, i32>::new(4, f64::NAN).is_err());

    let t: OaTable<String, i32> = OaTable::default();
    assert_eq!(
        t.with_compaction_ratio(Some(1.5)).unwrap_err(),
        TableError::InvalidCompactionRatio { ratio: 1.5 }
    );
}

#[test]
fn test_get_mut_and_take() {
    let mut t: OaTable<String, Vec<u8>> = OaTable::default();
    t.insert("bytes".to_string(), vec![1, 2]).unwrap();

    t.get_mut("bytes").unwrap().push(3);
    assert!(t.contains_key("bytes"));

    assert_eq!(t.take("bytes"), Some(vec![1, 2, 3]));
    assert_eq!(t.take("bytes"), None);
    assert!(!t.contains_key("bytes"));
}

#[test]
fn test_compaction_ratio_bounds_tombstones() {
    let mut t: OaTable<u32, u32> = OaTable::new(64, 0.9)
        .unwrap()
        .with_compaction_ratio(Some(0.25))
        .unwrap();

    for round in 0..50 {
        t.insert(round, round).unwrap();
        t.remove(&round);
        assert!(t.tombstones() <= 16, "round {round}: {}", t.tombstones());
    }
    assert_eq!(t.capacity(), 64);
}

#[test]
fn test_display_lists_occupied_slots() {
    let mut t: OaTable<String, i32, ConstHasher> = collide(4);
    t.insert("x".to_string(), 1).unwrap();
    t.insert("y".to_string(), 2).unwrap();
    t.remove("x");

    assert_eq!(t.to_string(), "slot [1]: {y = 2}\n");
}

#[test]
fn test_stats_on_collision_chain() {
    let mut t = collide(8);
    for k in ["a", "b", "c"] {
        t.insert(k.to_string(), 0).unwrap();
    }

    let stats = t.stats();
    assert_eq!(stats.len, 3);
    assert_eq!(stats.empty, 5);
    assert_eq!(stats.max_probe_len, 3);
    assert!((stats.avg_probe_len - 2.0).abs() < f64::EPSILON);
}
