//! Logic levels and edge directions

/// Logic level of a digital line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Level of the masked bit in a register value
    pub const fn from_bits(value: u8, mask: u8) -> Self {
        if value & mask != 0 {
            Level::High
        } else {
            Level::Low
        }
    }

    /// Check if this is logic 1
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    /// The opposite level
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Transition direction an edge interrupt is armed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low-to-high (edge select bit clear)
    Rising,
    /// High-to-low (edge select bit set)
    Falling,
}

impl Edge {
    /// Decode from the pin's edge select bit
    pub const fn from_select(bit_set: bool) -> Self {
        if bit_set {
            Edge::Falling
        } else {
            Edge::Rising
        }
    }

    /// The edge that leaves a line at `level`
    pub const fn leaving(level: Level) -> Self {
        match level {
            Level::High => Edge::Falling,
            Level::Low => Edge::Rising,
        }
    }

    /// Check if a transition from `from` to `to` matches this edge
    pub const fn matches(self, from: Level, to: Level) -> bool {
        match self {
            Edge::Rising => matches!((from, to), (Level::Low, Level::High)),
            Edge::Falling => matches!((from, to), (Level::High, Level::Low)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_bits() {
        assert_eq!(Level::from_bits(0x08, 0x08), Level::High);
        assert_eq!(Level::from_bits(0xF7, 0x08), Level::Low);
    }

    #[test]
    fn test_edge_leaving_level() {
        assert_eq!(Edge::leaving(Level::High), Edge::Falling);
        assert_eq!(Edge::leaving(Level::Low), Edge::Rising);
    }

    #[test]
    fn test_edge_matches() {
        assert!(Edge::Falling.matches(Level::High, Level::Low));
        assert!(!Edge::Falling.matches(Level::Low, Level::High));
        assert!(!Edge::Rising.matches(Level::High, Level::High));
    }
}
