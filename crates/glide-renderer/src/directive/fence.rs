//! Code fence tracking.
//!
//! Directive syntax inside a fenced code block is literal text, so the
//! processor feeds every line through a [`FenceTracker`] first.

/// Open fence: the fence character and the opening run length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct OpenFence {
    marker: char,
    len: usize,
}

/// Line-by-line code fence state.
#[derive(Debug, Default)]
pub(crate) struct FenceTracker {
    open: Option<OpenFence>,
}

impl FenceTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Whether the last line seen left us inside a fenced block.
    pub(crate) fn in_fence(&self) -> bool {
        self.open.is_some()
    }

    /// Feed one line. Returns `true` when the line opened or closed a fence.
    pub(crate) fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let Some((marker, len)) = fence_run(trimmed) else {
            return false;
        };

        match self.open {
            None => {
                self.open = Some(OpenFence { marker, len });
                true
            }
            // A closing fence uses the same character, is at least as long as
            // the opener and carries no info string.
            Some(open)
                if marker == open.marker
                    && len >= open.len
                    && trimmed[len..].trim().is_empty() =>
            {
                self.open = None;
                true
            }
            Some(_) => false,
        }
    }
}

/// Leading run of three or more backticks or tildes.
fn fence_run(trimmed: &str) -> Option<(char, usize)> {
    let marker = trimmed.chars().next().filter(|c| matches!(c, '`' | '~'))?;
    let len = trimmed.chars().take_while(|&c| c == marker).count();
    (len >= 3).then_some((marker, len))
}
