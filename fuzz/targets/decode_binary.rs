#![no_main]

use libfuzzer_sys::fuzz_target;
use oahash::{read_binary, read_dump, FxKeyHasher, OaTable};

/// Лимит поля поменьше, чтобы fuzzer не тратил время на огромные аллокации.
const MAX_FIELD_LEN: u32 = 4096;

fuzz_target!(|data: &[u8]| {
    // Произвольные байты: декодер обязан вернуть ошибку, а не паниковать,
    // и при ошибке оставить таблицу пустой.
    let mut table: OaTable<String, i64> = OaTable::new(1, 0.5).unwrap();
    match read_binary(&mut table, data) {
        Ok(summary) => {
            assert!(table.len() <= summary.records);
            table.validate_invariants().unwrap();
        }
        Err(_) => assert!(table.is_empty()),
    }

    let mut table: OaTable<Vec<u8>, bool, FxKeyHasher> = OaTable::default();
    if read_dump(&mut table, data, MAX_FIELD_LEN).is_err() {
        assert!(table.is_empty());
    }
});
