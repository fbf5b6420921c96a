#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResetKind {
    PowerOn, // cold boot / power cycle
    Soft,    // regular reset
}

impl ResetKind {
    #[inline]
    pub fn is_hard(self) -> bool {
        matches!(self, ResetKind::PowerOn)
    }
}
