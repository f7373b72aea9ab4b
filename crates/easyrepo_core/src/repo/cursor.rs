//! Unbounded traversal cursor over a slice.
//!
//! # Invariants
//! - The position starts at `0` and is never clamped; it may go negative or
//!   past the end.
//! - Reading at an out-of-range position yields `None`.

/// Raw integer cursor. Holds no reference to the items it walks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    position: isize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> isize {
        self.position
    }

    pub fn advance(&mut self) {
        self.position = self.position.saturating_add(1);
    }

    pub fn retreat(&mut self) {
        self.position = self.position.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.position = 0;
    }

    /// Item under the cursor.
    pub fn current<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        self.peek(items, 0)
    }

    /// Item at `position + offset`, without moving.
    pub fn peek<'a, T>(&self, items: &'a [T], offset: isize) -> Option<&'a T> {
        let target = self.position.checked_add(offset)?;
        let index = usize::try_from(target).ok()?;
        items.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::Cursor;

    #[test]
    fn walks_without_clamping() {
        let items = ["a", "b"];
        let mut cursor = Cursor::new();

        cursor.retreat();
        assert_eq!(cursor.position(), -1);
        assert_eq!(cursor.current(&items), None);
        assert_eq!(cursor.peek(&items, 1), Some(&"a"));

        cursor.advance();
        cursor.advance();
        cursor.advance();
        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.current(&items), None);
        assert_eq!(cursor.peek(&items, -1), Some(&"b"));

        cursor.reset();
        assert_eq!(cursor.current(&items), Some(&"a"));
    }

    #[test]
    fn peek_handles_extreme_offsets() {
        let items = [1];
        let cursor = Cursor::new();
        assert_eq!(cursor.peek(&items, isize::MIN), None);
        assert_eq!(cursor.peek(&items, isize::MAX), None);
    }
}
