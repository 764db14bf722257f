mod benchmark;
mod circuit;
mod dense_simulator;
mod gap;
mod gate;
mod instances;
mod iqp;
mod polynomial;
mod random;
mod simulator;
mod sv_simulator;

pub mod ext;

pub use benchmark::*;
pub use circuit::*;
pub use dense_simulator::*;
pub use gap::*;
pub use gate::*;
pub use instances::*;
pub use iqp::*;
pub use polynomial::*;
pub use random::*;
pub use simulator::*;
pub use sv_simulator::*;
