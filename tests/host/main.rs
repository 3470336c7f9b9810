//! Integration tests for hissp_host.

mod eval;
mod opaque;
