// xmon: watch-list monitoring and activity digests for X accounts
//
// This is the library root. `analysis` and `digest` are the pure analytics
// core; the rest is collection (x, pipeline), storage (db), and
// presentation (output, status, llm).

pub mod analysis;
pub mod config;
pub mod db;
pub mod digest;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod status;
pub mod x;
