//! Frustum culling: the host path, the compute-shader path and the switch
//! between them.

pub mod cpu;
pub mod gpu;

use std::fmt;
use std::str::FromStr;

pub use cpu::{cull, cull_into};
pub use gpu::{CullParams, GpuCuller};

/// Which culling path feeds the draw.  Exactly one runs per frame.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Draw every active instance.
    Off,
    /// Test boxes on the host and draw the compacted list directly.
    Cpu,
    /// Test boxes in a compute pass and draw indirectly.
    #[default]
    Gpu,
}

impl CullMode {
    pub const ALL: [CullMode; 3] = [CullMode::Off, CullMode::Cpu, CullMode::Gpu];

    pub fn as_str(self) -> &'static str {
        match self {
            CullMode::Off => "off",
            CullMode::Cpu => "cpu",
            CullMode::Gpu => "gpu",
        }
    }

    /// Next mode in `Off → Cpu → Gpu → Off` order.
    pub fn next(self) -> Self {
        match self {
            CullMode::Off => CullMode::Cpu,
            CullMode::Cpu => CullMode::Gpu,
            CullMode::Gpu => CullMode::Off,
        }
    }
}

impl fmt::Display for CullMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CullMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "off" | "none" => Ok(CullMode::Off),
            "cpu" => Ok(CullMode::Cpu),
            "gpu" | "compute" => Ok(CullMode::Gpu),
            other => Err(format!("unknown cull mode `{other}` (expected off, cpu or gpu)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_display_round_trip() {
        for mode in CullMode::ALL {
            assert_eq!(mode.to_string().parse::<CullMode>(), Ok(mode));
        }
        assert_eq!(" GPU ".parse::<CullMode>(), Ok(CullMode::Gpu));
        assert!("sometimes".parse::<CullMode>().is_err());
    }

    #[test]
    fn next_cycles_through_all_modes() {
        let mut mode = CullMode::Off;
        for expected in [CullMode::Cpu, CullMode::Gpu, CullMode::Off] {
            mode = mode.next();
            assert_eq!(mode, expected);
        }
    }
}
