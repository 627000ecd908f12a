#![no_main]

use std::collections::HashMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use zawk::{Value, ZMap, ZString};

#[derive(Debug, Arbitrary)]
enum Op {
    Insert(Vec<u8>, f64),
    Delete(Vec<u8>),
    Find(Vec<u8>),
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    // Mirror every operation in a HashMap and compare.
    let mut map = ZMap::new();
    let mut model: HashMap<Vec<u8>, f64> = HashMap::new();

    for op in ops {
        match op {
            Op::Insert(key, n) => {
                map.insert(&ZString::new(&key), Value::Number(n));
                model.insert(key, n);
            }
            Op::Delete(key) => {
                assert_eq!(map.delete(&ZString::new(&key)), model.remove(&key).is_some());
            }
            Op::Find(key) => {
                let found = map.find(&ZString::new(&key)).map(Value::to_number);
                let expected = model.get(&key).copied();
                assert_eq!(found.is_some(), expected.is_some());
                if let (Some(a), Some(b)) = (found, expected) {
                    assert!(a == b || (a.is_nan() && b.is_nan()));
                }
            }
            Op::Clear => {
                map.clear();
                model.clear();
            }
        }
        assert_eq!(map.len(), model.len());
    }
});
