
use crate::engine_benches::engine_benches;
use criterion::criterion_main;

#[cfg(not(feature = "parallel"))]
criterion_main!(engine_benches);

#[cfg(feature = "parallel")]
use crate::parallel_engine_benches::parallel_engine_benches;

#[cfg(feature = "parallel")]
criterion_main!(engine_benches, parallel_engine_benches);
