//! Static calibration tables.
//!
//! The TX scale table maps a swing index to the baseband gain-scale constant
//! programmed into the TX scale register; entries rise monotonically so the
//! power-tracking loop can trade TX AGC steps against swing steps. The
//! thermal compensation tables map an absolute thermal delta (in sensor
//! steps) to a power-index correction, one table per band/path/polarity,
//! with the 5 GHz band split into three sub-band columns.

/// Entries in each thermal compensation table.
pub const PWR_TRK_TBL_SZ: usize = 30;

/// 5 GHz sub-band columns (36-64, 100-144, 149 and above).
pub const PWR_TRK_5G_BANDS: usize = 3;

/// Swing index to TX scale gain constant.
pub static TXSCALE_TBL: [u32; 37] = [
    0x081, 0x088, 0x090, 0x099, 0x0a2, 0x0ac, 0x0b6, 0x0c0, 0x0cc, 0x0d8,
    0x0e5, 0x0f2, 0x101, 0x110, 0x120, 0x131, 0x143, 0x156, 0x16a, 0x180,
    0x197, 0x1af, 0x1c8, 0x1e3, 0x200, 0x21e, 0x23e, 0x261, 0x285, 0x2ab,
    0x2d3, 0x2fe, 0x32b, 0x35c, 0x38e, 0x3c4, 0x3fe,
];

/// Efuse bb-swing setting (0..=9, three settings per step) to TX scale
/// gain constant.
pub static SWING_TO_SETTING: [u32; 4] = [0x200, 0x16a, 0x101, 0x0b6];

pub static PWRTRK_5GB_N: [[u8; PWR_TRK_TBL_SZ]; PWR_TRK_5G_BANDS] = [
    [0, 1, 1, 2, 3, 3, 3, 4, 4, 5, 5, 6, 6, 6, 7, 8, 8, 8, 9, 9, 9, 10, 10,
     11, 11, 12, 12, 12, 12, 12],
    [0, 1, 1, 1, 2, 3, 3, 4, 4, 5, 5, 5, 6, 6, 7, 8, 8, 9, 9, 10, 10, 11,
     11, 12, 12, 12, 12, 12, 12, 12],
    [0, 1, 2, 2, 3, 4, 4, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 9, 10, 10, 11,
     11, 12, 12, 12, 12, 12, 12],
];

pub static PWRTRK_5GB_P: [[u8; PWR_TRK_TBL_SZ]; PWR_TRK_5G_BANDS] = [
    [0, 1, 1, 2, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 11, 11,
     12, 12, 12, 12, 12, 12, 12],
    [0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 5, 6, 7, 7, 8, 8, 9, 10, 10, 11, 11,
     12, 12, 12, 12, 12, 12, 12, 12],
    [0, 1, 1, 1, 2, 3, 3, 3, 4, 4, 4, 5, 6, 6, 7, 7, 8, 8, 9, 10, 10, 11,
     11, 12, 12, 12, 12, 12, 12, 12],
];

pub static PWRTRK_5GA_N: [[u8; PWR_TRK_TBL_SZ]; PWR_TRK_5G_BANDS] = [
    [0, 1, 1, 2, 3, 3, 3, 4, 4, 5, 5, 6, 6, 6, 7, 8, 8, 8, 9, 9, 9, 10, 10,
     11, 11, 12, 12, 12, 12, 12],
    [0, 1, 1, 1, 2, 3, 3, 4, 4, 5, 5, 5, 6, 6, 7, 8, 8, 9, 9, 10, 10, 11,
     11, 12, 12, 12, 12, 12, 12, 12],
    [0, 1, 2, 2, 3, 4, 4, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 9, 10, 10, 11,
     11, 12, 12, 12, 12, 12, 12],
];

pub static PWRTRK_5GA_P: [[u8; PWR_TRK_TBL_SZ]; PWR_TRK_5G_BANDS] = [
    [0, 1, 1, 2, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 11, 11,
     12, 12, 12, 12, 12, 12, 12],
    [0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 5, 6, 7, 7, 8, 8, 9, 10, 10, 11, 11,
     12, 12, 12, 12, 12, 12, 12, 12],
    [0, 1, 1, 1, 2, 3, 3, 3, 4, 4, 4, 5, 6, 6, 7, 7, 8, 8, 9, 10, 10, 11,
     11, 12, 12, 12, 12, 12, 12, 12],
];

pub static PWRTRK_2GB_N: [u8; PWR_TRK_TBL_SZ] = [
    0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 3, 3, 4, 4,
    4, 4, 5, 5, 5, 5, 6, 6, 6, 7, 7, 8, 8, 9,
];

pub static PWRTRK_2GB_P: [u8; PWR_TRK_TBL_SZ] = [
    0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5,
    5, 5, 6, 6, 6, 7, 7, 7, 8, 8, 9, 9, 9, 9,
];

pub static PWRTRK_2GA_N: [u8; PWR_TRK_TBL_SZ] = [
    0, 0, 0, 1, 1, 1, 2, 2, 2, 3, 3, 3, 3, 3, 4, 4,
    4, 4, 5, 5, 5, 5, 6, 6, 6, 7, 7, 8, 8, 9,
];

pub static PWRTRK_2GA_P: [u8; PWR_TRK_TBL_SZ] = [
    0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5,
    5, 5, 6, 6, 6, 7, 7, 7, 8, 8, 9, 9, 9, 9,
];

pub static PWRTRK_2G_CCK_B_N: [u8; PWR_TRK_TBL_SZ] = [
    0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4,
    4, 5, 5, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 9,
];

pub static PWRTRK_2G_CCK_B_P: [u8; PWR_TRK_TBL_SZ] = [
    0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5,
    5, 6, 6, 7, 7, 7, 8, 8, 9, 9, 9, 9, 9, 9,
];

pub static PWRTRK_2G_CCK_A_N: [u8; PWR_TRK_TBL_SZ] = [
    0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4,
    4, 5, 5, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 9,
];

pub static PWRTRK_2G_CCK_A_P: [u8; PWR_TRK_TBL_SZ] = [
    0, 1, 1, 1, 1, 2, 2, 2, 3, 3, 3, 4, 4, 4, 5, 5,
    5, 6, 6, 7, 7, 7, 8, 8, 9, 9, 9, 9, 9, 9,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn txscale_tbl_is_monotonic() {
        for w in TXSCALE_TBL.windows(2) {
            assert!(w[0] < w[1]);
        }
    }

    #[test]
    fn compensation_tables_stay_in_observed_range() {
        let tables_5g = [
            &PWRTRK_5GB_N, &PWRTRK_5GB_P, &PWRTRK_5GA_N, &PWRTRK_5GA_P,
        ];
        for tbl in tables_5g {
            for band in tbl.iter() {
                for &v in band.iter() {
                    assert!(v <= 12);
                }
            }
        }
        let tables_2g = [
            &PWRTRK_2GB_N, &PWRTRK_2GB_P, &PWRTRK_2GA_N, &PWRTRK_2GA_P,
            &PWRTRK_2G_CCK_B_N, &PWRTRK_2G_CCK_B_P,
            &PWRTRK_2G_CCK_A_N, &PWRTRK_2G_CCK_A_P,
        ];
        for tbl in tables_2g {
            for &v in tbl.iter() {
                assert!(v <= 12);
            }
        }
    }
}
