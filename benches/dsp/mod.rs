//! Benchmarks for low-level DSP primitives.

mod envelope;
mod filter;
mod operator;
mod oscillator;

pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use operator::bench_operator;
pub use oscillator::bench_oscillator;
