//! Test suites for the theme file daemon.

pub(crate) mod support;
