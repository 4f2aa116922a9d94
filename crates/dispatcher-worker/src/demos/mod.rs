//! Reference worker payloads. Demonstrations of the `bytes -> bytes`
//! contract the registry expects, not part of the dispatch core itself.

mod echo;
mod matmul_cpu;
mod sleep;

pub use echo::echo;
pub use matmul_cpu::matmul_cpu;
pub use sleep::sleep;
