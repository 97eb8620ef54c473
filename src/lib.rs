pub mod edit;
pub mod highlight;
pub mod logging;
pub mod lsp;
pub mod tree_cache;
