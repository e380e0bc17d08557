pub mod archive;
pub mod auth;
pub mod config;
pub mod db;
pub mod error_convert;
pub mod health;
pub mod openapi;
pub mod repo;
pub mod rest;
pub mod staging;
pub mod telemetry;
pub mod workflow;
