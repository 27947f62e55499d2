//! Cross-crate test suite for causeway. All tests live under `tests/`.
