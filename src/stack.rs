//! Conditional inclusion stacks
//!
//! Each open `@ifdef`/`@ifndef` block contributes one level that is either
//! satisfied or excluded. Content is emitted only while every open level is
//! satisfied.

/// Deepest nesting of open blocks accepted by the preprocessor
pub const MAX_DEPTH: usize = 32;

/// Returned by [`ConditionStack::push`] when the stack is already full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthExceeded;

/// Storage for the inclusion flags of the open blocks
pub trait ConditionStack: Default {
    /// Open a new level; `included` is false when its condition failed
    fn push(&mut self, included: bool) -> Result<(), DepthExceeded>;

    /// Close the innermost level, returning its flag, or `None` when empty
    fn pop(&mut self) -> Option<bool>;

    /// Number of open levels
    fn depth(&self) -> usize;

    /// True when no open level is excluded
    fn is_satisfied(&self) -> bool;

    fn is_empty(&self) -> bool {
        self.depth() == 0
    }
}

/// One bit per level packed into a `u32`; bit `i` is set when level `i` is excluded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitStack {
    excluded: u32,
    depth: u8,
}

impl ConditionStack for BitStack {
    fn push(&mut self, included: bool) -> Result<(), DepthExceeded> {
        let depth = self.depth as usize;
        if depth >= MAX_DEPTH {
            return Err(DepthExceeded);
        }
        if !included {
            self.excluded |= 1 << depth;
        }
        self.depth += 1;
        Ok(())
    }

    fn pop(&mut self) -> Option<bool> {
        if self.depth == 0 {
            return None;
        }
        self.depth -= 1;
        let bit = 1u32 << self.depth;
        let included = self.excluded & bit == 0;
        self.excluded &= !bit;
        Some(included)
    }

    fn depth(&self) -> usize {
        self.depth as usize
    }

    fn is_satisfied(&self) -> bool {
        self.excluded == 0
    }
}

/// Growable stack of flags with the same depth cap as [`BitStack`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VecStack {
    levels: Vec<bool>,
    // levels currently excluded
    excluded: usize,
}

impl ConditionStack for VecStack {
    fn push(&mut self, included: bool) -> Result<(), DepthExceeded> {
        if self.levels.len() >= MAX_DEPTH {
            return Err(DepthExceeded);
        }
        if !included {
            self.excluded += 1;
        }
        self.levels.push(included);
        Ok(())
    }

    fn pop(&mut self) -> Option<bool> {
        let included = self.levels.pop()?;
        if !included {
            self.excluded -= 1;
        }
        Some(included)
    }

    fn depth(&self) -> usize {
        self.levels.len()
    }

    fn is_satisfied(&self) -> bool {
        self.excluded == 0
    }
}
