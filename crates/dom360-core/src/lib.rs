// ABOUTME: Core types and constants for the DOM360 chat client
// ABOUTME: Foundation crate with error handling, domain models, metrics reducer and phone utilities
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

#![deny(unsafe_code)]

//! # DOM360 Core
//!
//! Foundation crate providing shared types for the DOM360 chat client. Nothing
//! in here performs I/O: the HTTP gateway, persistence and session orchestration
//! live in the `dom360_chat` crate and build on these types.
//!
//! ## Modules
//!
//! - **errors**: Client error taxonomy with `ClientError`, `ErrorCode` and `StorageError`
//! - **constants**: Storage keys, header names, endpoint paths and defaults
//! - **models**: Messages, roles, agent personas, usage metrics and saved conversations
//! - **phone**: Phone number normalization between E.164 and national (CRM) formats

/// Client error taxonomy shared by every layer
pub mod errors;

/// Application constants organized by domain
pub mod constants;

/// Core data models (Message, Identity, `MetricsAggregate`, `SavedConversation`, etc.)
pub mod models;

/// Phone number normalization and display formatting
pub mod phone;
