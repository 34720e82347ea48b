//! Binary trip-response decoder.
//!
//! Decodes the compact binary response format used by a family of
//! public-transit trip-planning backends: a fixed header full of table
//! pointers, followed by pointer-addressed side tables (strings, stations,
//! comments, service calendars) that the per-trip records cross-reference.
//!
//! The input is one fully buffered response body; the output is a list of
//! [`domain::Trip`]s plus an opaque [`binary::PagingContext`] for querying
//! earlier/later trips, or a typed [`binary::DecodeError`].

pub mod binary;
pub mod domain;
pub mod normalize;
