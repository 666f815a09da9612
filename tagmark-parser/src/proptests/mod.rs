//! Property-based tests for the scanner
//!
//! These tests check invariants that must hold for ANY input to either grammar, not
//! just the hand-written cases next to the scanner.

mod generators;
mod invariants;
