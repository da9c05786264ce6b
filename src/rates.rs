//! Hardware rate descriptor indices and rate-section tables.
//!
//! Rate indices follow the TX descriptor encoding. The chip is a single
//! spatial stream part; 2SS sections exist in the tables but are never
//! programmed.

#![allow(unused)]

pub const DESC_RATE1M: u8 = 0;
pub const DESC_RATE2M: u8 = 1;
pub const DESC_RATE5_5M: u8 = 2;
pub const DESC_RATE11M: u8 = 3;
pub const DESC_RATE6M: u8 = 4;
pub const DESC_RATE9M: u8 = 5;
pub const DESC_RATE12M: u8 = 6;
pub const DESC_RATE18M: u8 = 7;
pub const DESC_RATE24M: u8 = 8;
pub const DESC_RATE36M: u8 = 9;
pub const DESC_RATE48M: u8 = 10;
pub const DESC_RATE54M: u8 = 11;
pub const DESC_RATEMCS0: u8 = 12;
pub const DESC_RATEMCS7: u8 = 19;
pub const DESC_RATEMCS8: u8 = 20;
pub const DESC_RATEMCS15: u8 = 27;
pub const DESC_RATEVHT1SS_MCS0: u8 = 44;
pub const DESC_RATEVHT1SS_MCS9: u8 = 53;
pub const DESC_RATEVHT2SS_MCS0: u8 = 54;
pub const DESC_RATEVHT2SS_MCS9: u8 = 63;

/// Size of the per-path TX power table, indexed by descriptor rate.
pub const DESC_RATE_NUM: usize = 64;

/// Rate sections for per-rate TX power programming.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RateSection {
    Cck,
    Ofdm,
    Ht1s,
    Ht2s,
    Vht1s,
    Vht2s,
}

pub static RATE_SECTIONS: [RateSection; 6] = [
    RateSection::Cck,
    RateSection::Ofdm,
    RateSection::Ht1s,
    RateSection::Ht2s,
    RateSection::Vht1s,
    RateSection::Vht2s,
];

static CCK_RATES: [u8; 4] = [DESC_RATE1M, DESC_RATE2M, DESC_RATE5_5M, DESC_RATE11M];

static OFDM_RATES: [u8; 8] = [
    DESC_RATE6M, DESC_RATE9M, DESC_RATE12M, DESC_RATE18M,
    DESC_RATE24M, DESC_RATE36M, DESC_RATE48M, DESC_RATE54M,
];

static HT_1S_RATES: [u8; 8] = [12, 13, 14, 15, 16, 17, 18, 19];
static HT_2S_RATES: [u8; 8] = [20, 21, 22, 23, 24, 25, 26, 27];
static VHT_1S_RATES: [u8; 10] = [44, 45, 46, 47, 48, 49, 50, 51, 52, 53];
static VHT_2S_RATES: [u8; 10] = [54, 55, 56, 57, 58, 59, 60, 61, 62, 63];

impl RateSection {
    /// Descriptor rates belonging to this section, in programming order.
    pub fn rates(self) -> &'static [u8] {
        match self {
            RateSection::Cck => &CCK_RATES,
            RateSection::Ofdm => &OFDM_RATES,
            RateSection::Ht1s => &HT_1S_RATES,
            RateSection::Ht2s => &HT_2S_RATES,
            RateSection::Vht1s => &VHT_1S_RATES,
            RateSection::Vht2s => &VHT_2S_RATES,
        }
    }

    /// Whether this section carries a second spatial stream.
    pub fn is_2ss(self) -> bool {
        matches!(self, RateSection::Ht2s | RateSection::Vht2s)
    }
}
