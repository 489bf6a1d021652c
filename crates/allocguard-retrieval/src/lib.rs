#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod bm25;
pub mod hybrid;
pub mod preprocess;

pub use bm25::{Bm25Hit, Bm25Searcher, IndexDocument};
pub use hybrid::{HybridRetriever, RetrieveOptions};
pub use preprocess::QueryPreprocessor;
