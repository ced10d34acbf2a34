//! Pure helper utilities.

pub mod url_normalizer;
