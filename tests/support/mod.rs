#![allow(dead_code)]

pub mod posts;
pub mod socket_guard;
