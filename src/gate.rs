// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.


//! Commit gate separating mutating units of work from whole-store reads.
//!
//! Holders on the same [`Side`] run concurrently: transfers do not serialize
//! each other and listings do not serialize each other. The two sides never
//! overlap. Once one side is waiting, the side inside stops admitting
//! newcomers and the gate is handed over when it drains, so a steady stream
//! on one side cannot starve the other.

use parking_lot::{Condvar, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    /// Account creation and transfers
    Mutate,
    /// Listings and snapshots
    Read,
}

impl Side {
    fn other(self) -> Side {
        match self {
            Side::Mutate => Side::Read,
            Side::Read => Side::Mutate,
        }
    }

    fn index(self) -> usize {
        match self {
            Side::Mutate => 0,
            Side::Read => 1,
        }
    }
}

#[derive(Debug, Default)]
struct GateState {
    /// Side currently owning the gate, `None` when idle.
    owner: Option<Side>,
    active: usize,
    waiting: [usize; 2],
    /// Waiters let in after a handoff even though the other side is queued.
    handed_over: usize,
}

impl GateState {
    fn admits(&self, side: Side) -> bool {
        let other_waiting = self.waiting[side.other().index()] > 0;
        match self.owner {
            None => true,
            Some(owner) if owner == side => !other_waiting || self.handed_over > 0,
            Some(_) => false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CommitGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl CommitGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Blocks until `side` may enter, then holds the gate until the guard drops.
    pub(crate) fn enter(&self, side: Side) -> GateGuard<'_> {
        let mut state = self.state.lock();
        state.waiting[side.index()] += 1;
        while !state.admits(side) {
            self.changed.wait(&mut state);
        }
        state.waiting[side.index()] -= 1;
        if state.owner == Some(side) && state.handed_over > 0 {
            state.handed_over -= 1;
        }
        state.owner = Some(side);
        state.active += 1;
        GateGuard { gate: self }
    }

    fn leave(&self) {
        let mut state = self.state.lock();
        state.active -= 1;
        if state.active > 0 {
            return;
        }
        let next = state.owner.map(Side::other);
        match next {
            Some(next) if state.waiting[next.index()] > 0 => {
                state.handed_over = state.waiting[next.index()];
                state.owner = Some(next);
            }
            _ => {
                state.handed_over = 0;
                state.owner = None;
            }
        }
        drop(state);
        self.changed.notify_all();
    }
}

/// Releases one hold on the gate when dropped.
#[derive(Debug)]
pub(crate) struct GateGuard<'a> {
    gate: &'a CommitGate,
}

impl Drop for GateGuard<'_> {
    fn drop(&mut self) {
        self.gate.leave();
    }
}
