#![allow(dead_code)]

pub mod invariants;
pub mod networks;
