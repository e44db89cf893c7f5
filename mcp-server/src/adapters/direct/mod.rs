//! Yandex.Direct Reports API adapter

mod client;
mod tsv;

pub use client::DirectClient;
