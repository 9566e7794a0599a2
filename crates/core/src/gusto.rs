//! Gusto mode: a boolean flag toggled at recorded decision indices.
//!
//! Weighted-choice requests consult the flag to select between realistic
//! weighted sampling (gusto on) and uniform index enumeration (gusto off).
//! The flag at decision index `k` is the configured default XOR the parity
//! of how many toggle indices are `<= k`.

/// Ordered list of toggle points and the derived gusto flag.
///
/// A "safe" snapshot of the toggle list is restored at the start of each
/// path, so toggles added mid-path are transient unless committed.
#[derive(Debug, Default)]
pub struct GustoController {
    /// Strictly increasing toggle indices for the current path.
    toggles: Vec<u64>,
    /// Snapshot restored at the start of every path.
    safe: Vec<u64>,
    default_on: bool,
    /// Transient override for the remainder of the current path.
    forced_on: bool,
    /// A toggle was requested and takes effect at the next decision.
    pending: bool,
}

impl GustoController {
    /// Create a controller with the given default flag.
    pub fn new(default_on: bool) -> Self {
        Self {
            default_on,
            ..Self::default()
        }
    }

    /// Install a toggle list, replacing both the live list and the snapshot.
    pub fn load_toggles(&mut self, toggles: Vec<u64>) {
        self.safe = toggles.clone();
        self.toggles = toggles;
    }

    /// Commit the current toggle list as the snapshot restored at path start.
    pub fn commit_snapshot(&mut self) {
        self.safe = self.toggles.clone();
    }

    /// Restore the snapshot and clear transient state.
    pub fn begin_path(&mut self) {
        self.toggles = self.safe.clone();
        self.forced_on = false;
        self.pending = false;
    }

    /// Request a toggle, effective at the next resolved decision.
    pub fn request_toggle(&mut self) {
        self.pending = true;
    }

    /// Consume a pending toggle request, if any.
    pub fn take_pending(&mut self) -> bool {
        std::mem::take(&mut self.pending)
    }

    /// Toggle gusto at the given decision index.
    ///
    /// The list stays strictly increasing regardless of request order:
    /// committed toggles from an earlier path can be followed by a toggle at
    /// a smaller index in a later, shorter path. Toggling twice at the same
    /// index removes the earlier toggle instead of recording a duplicate.
    pub fn toggle_at(&mut self, index: u64) {
        match self.toggles.binary_search(&index) {
            Ok(at) => {
                self.toggles.remove(at);
            }
            Err(at) => self.toggles.insert(at, index),
        }
    }

    /// Force gusto on for the remainder of the current path.
    pub fn force_on(&mut self) {
        self.forced_on = true;
    }

    /// The gusto flag at the given decision index.
    pub fn is_on(&self, position: u64) -> bool {
        if self.forced_on {
            return true;
        }
        let crossings = self.toggles.iter().filter(|&&t| t <= position).count();
        self.default_on ^ (crossings % 2 == 1)
    }

    /// The toggle indices of the current path, strictly increasing.
    pub fn toggles(&self) -> &[u64] {
        &self.toggles
    }
}
