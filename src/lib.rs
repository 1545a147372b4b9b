// src/lib.rs — Library root for memchat

pub mod api;
pub mod auth;
pub mod cli;
pub mod conversation;
pub mod infra;
pub mod storage;
