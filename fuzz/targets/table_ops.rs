#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use oahash::{OaTable, ProbeStep, TableError};

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(u8, u32),
    Remove(u8),
    Get(u8),
    Compact,
    Clear,
}

#[derive(Debug, Arbitrary)]
struct Input {
    capacity: u8,
    load_factor_percent: u8,
    reference_step: bool,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let capacity = usize::from(input.capacity).max(1);
    let load_factor = f64::from(input.load_factor_percent.clamp(1, 99)) / 100.0;
    let step = if input.reference_step {
        ProbeStep::Reference
    } else {
        ProbeStep::Coprime
    };

    let mut table: OaTable<u8, u32> = OaTable::new(capacity, load_factor)
        .unwrap()
        .with_probe_step(step)
        .unwrap();
    let mut model = HashMap::new();

    for op in input.ops {
        match op {
            Op::Insert(k, v) => match table.insert(k, v) {
                Ok(is_new) => assert_eq!(is_new, model.insert(k, v).is_none()),
                Err(TableError::TableFull { .. }) => assert_eq!(step, ProbeStep::Reference),
                Err(e) => panic!("unexpected error: {e}"),
            },
            Op::Remove(k) => assert_eq!(table.take(&k), model.remove(&k)),
            Op::Get(k) => assert_eq!(table.get(&k), model.get(&k)),
            Op::Compact => table.compact().unwrap(),
            Op::Clear => {
                table.clear();
                model.clear();
            }
        }
        assert_eq!(table.len(), model.len());
        table.validate_invariants().unwrap();
    }
});
