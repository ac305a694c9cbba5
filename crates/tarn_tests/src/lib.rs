//! End-to-end tests for the tarn compiler live in this crate's `tests/`
//! directory; the library itself is empty. Keeping them in one member crate
//! gives every suite the whole workspace as dev-dependencies without
//! tangling the production crates together.
