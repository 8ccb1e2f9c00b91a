pub mod lbmp;

pub use lbmp::{DEFAULT_NODE, available_nodes, load_price_series, read_lbmp_file};
