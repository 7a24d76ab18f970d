//! Reddit API clients and services for communicating with Reddit over HTTP.

pub mod auth;
pub mod client;
pub mod service;
pub mod thing;

pub use client::Reddit;
