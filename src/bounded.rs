//! Bounded strings: text cut to a fixed byte capacity on a UTF-8 boundary.

use crate::constants::TRUNCATION_MARKER;
use std::fmt::{self, Write};

/// Result of bounding a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bounded {
    pub text: String,
    pub truncated: bool,
}

/// Cut `text` to at most `capacity` bytes. When truncation happens the
/// marker is appended inside the capacity so the cut is visible.
pub fn truncate(text: &str, capacity: usize) -> Bounded {
    if text.len() <= capacity {
        return Bounded {
            text: text.to_string(),
            truncated: false,
        };
    }

    let (budget, marker) = if capacity > TRUNCATION_MARKER.len() {
        (capacity - TRUNCATION_MARKER.len(), TRUNCATION_MARKER)
    } else {
        (capacity, "")
    };

    let mut text = text[..floor_char_boundary(text, budget)].to_string();
    text.push_str(marker);
    Bounded {
        text,
        truncated: true,
    }
}

/// Render `args` into a buffer of at most `capacity` bytes.
///
/// Formatting stops as soon as the buffer is full, so an oversized argument
/// is never rendered in full.
pub fn render(args: fmt::Arguments<'_>, capacity: usize) -> Bounded {
    if let Some(literal) = args.as_str() {
        return truncate(literal, capacity);
    }

    let mut buffer = BoundedBuffer {
        text: String::new(),
        capacity,
        overflowed: false,
    };
    // An Err here only means the buffer filled up
    let _ = buffer.write_fmt(args);

    if !buffer.overflowed {
        return Bounded {
            text: buffer.text,
            truncated: false,
        };
    }

    let mut text = buffer.text;
    if capacity > TRUNCATION_MARKER.len() {
        let budget = floor_char_boundary(&text, capacity - TRUNCATION_MARKER.len());
        text.truncate(budget);
        text.push_str(TRUNCATION_MARKER);
    }
    Bounded {
        text,
        truncated: true,
    }
}

struct BoundedBuffer {
    text: String,
    capacity: usize,
    overflowed: bool,
}

impl Write for BoundedBuffer {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.capacity - self.text.len();
        if s.len() <= room {
            self.text.push_str(s);
            Ok(())
        } else {
            self.text.push_str(clamp(s, room));
            self.overflowed = true;
            Err(fmt::Error)
        }
    }
}

/// Cut silently; used for fields whose overflow is not worth a marker
pub fn clamp(text: &str, capacity: usize) -> &str {
    &text[..floor_char_boundary(text, capacity)]
}

fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut index = index;
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}
