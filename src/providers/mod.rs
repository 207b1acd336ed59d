//! Quote provider implementations

pub mod lunarcrush;

pub use lunarcrush::LunarCrushProvider;
