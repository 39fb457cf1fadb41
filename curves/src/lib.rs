#![deny(unsafe_code)]

pub mod pasta;
