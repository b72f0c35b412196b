//! Tailorbook API: accounts, sessions and plan entitlements for the
//! Tailorbook workshop manager.
//!
//! This crate provides:
//! - Registration with emailed verification codes, login and password reset
//! - JWT access tokens backed by a revocable refresh-token session ledger
//! - Subscription to plan resolution and per-resource usage ceilings

pub mod auth;
pub mod config;
pub mod db;
pub mod dto;
pub mod entities;
pub mod error;
pub mod mail;
pub mod routes;
pub mod services;
pub mod sessions;
pub mod state;
