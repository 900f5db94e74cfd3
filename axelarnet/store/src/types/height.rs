/// A committed block height.
pub type RawHeight = u64;

/// Selects the state a read is served from.
#[derive(Debug, Copy, Clone, Eq, Ord, PartialEq, PartialOrd)]
pub enum Height {
    /// Writes of the block being executed, including uncommitted ones
    Pending,
    /// The last committed block
    Latest,
    /// A specific committed block; heights start at 1
    Stable(RawHeight),
}

impl From<RawHeight> for Height {
    /// Height zero stands for the latest committed state.
    fn from(value: RawHeight) -> Self {
        match value {
            0 => Self::Latest,
            _ => Self::Stable(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_means_latest() {
        assert_eq!(Height::from(0), Height::Latest);
        assert_eq!(Height::from(7), Height::Stable(7));
    }
}
