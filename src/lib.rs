mod error;
pub mod types;
pub mod utils_test;

pub use error::GraphError;
pub use types::change::{Change, Op};
pub use types::csr::Csr;
pub use types::edge_set::EdgeSet;
pub use types::engine::Engine;
pub use types::engine_error::EngineError;
pub use types::tree_index::TreeIndex;
