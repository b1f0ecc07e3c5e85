//! Test suites for path confinement and conditional edits.

mod support;
