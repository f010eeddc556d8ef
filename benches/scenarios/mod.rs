//! Real-world scenario benchmarks: a full voice manager block and panel
//! redraws, as the harness drives them.

mod display;
mod voices;

pub use display::bench_display;
pub use voices::bench_voices;
