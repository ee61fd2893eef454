#![no_main]

use libfuzzer_sys::fuzz_target;
use objscope::{
    encoding::{encode, parse, parse_method},
    layout::{layout, AbiModel},
};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(node) = parse(text) {
        let reparsed = parse(&encode(&node)).expect("canonical encoding must parse");
        assert_eq!(node, reparsed);

        for model in [AbiModel::lp64(), AbiModel::ilp32(), AbiModel::i386()] {
            let computed = layout(&node, &model);
            assert!(computed.alignment >= 1);
        }
    }

    let _ = parse_method(text);
});
