// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structured logging for the engine's lifecycle events (§4.9): dedicated
//! message types per subsystem instead of ad hoc format strings, so the
//! same event is always worded and fielded the same way wherever it fires.

pub mod messages;
