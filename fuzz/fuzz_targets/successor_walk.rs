#![no_main]

use arena_avl::model::WalkInput;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: WalkInput| {
    arena_avl::model::run_successor_walk(input.values, input.ops);
});
