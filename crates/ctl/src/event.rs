// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use crate::frame::Frame;
use crate::timer::TimerKind;

/// Everything the dispatch loop consumes, funnelled through one queue so
/// frames and timer expirations share a single total order.
#[derive(Debug, Clone)]
pub enum MissionEvent {
    /// An inbound frame from the transport.
    Frame(Frame),
    /// A one-shot timer expired.
    Timer(TimerKind),
    /// Operator request to leave Idle once the pad is clean.
    Arm,
}

/// Mission state transition with sequence number for ordering.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionEvent {
    pub prev: &'static str,
    pub next: &'static str,
    pub seq: u64,
}
