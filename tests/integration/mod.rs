//! Integration tests for file-backed collections

mod cli;
mod deletion;
mod dynamic;
mod load_barrier;
mod persistence;
mod shape_guard;
