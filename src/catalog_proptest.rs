//! Property-based tests for selecting project names from a tree listing.
