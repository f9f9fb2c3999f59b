//! Execution backend selection.
//!
//! Every stencil sweep, pack/unpack, and reduction in this crate is an
//! independent-per-cell computation, expressed through the slice helpers
//! in [`crate::par_slice`]. This enum picks how those helpers execute;
//! kernel code never touches rayon directly.

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Plain sequential loops, the reference execution.
    Serial,
    /// Rayon chunked execution, `chunk_size` cells per task.
    Rayon { chunk_size: usize },
}

impl Backend {
    pub fn rayon(chunk_size: usize) -> Self {
        Backend::Rayon {
            chunk_size: chunk_size.max(1),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Backend::Rayon { chunk_size: 1000 }
    }
}
