//! End-to-end tests spanning `hissp_core` (read, expand, compile) and
//! `hissp_host` (a real tree-walking evaluator), rather than the `FakeHost`
//! double `tests/core` uses to isolate the compiler.

mod full_pipeline;
