//! Thermal-compensated TX power tracking.
//!
//! The analog TX gain drifts with die temperature. Each dynamic-mechanism
//! tick runs a two-phase state machine: the first tick requests a fresh
//! thermal-sensor reading (the analog sensor needs a full tick to settle),
//! the next consumes it. The smoothed thermal deviation from the per-session
//! baseline indexes a compensation table, and the resulting power-index
//! delta is split across the TX AGC trim (fine, narrow range) and the swing
//! table (coarse, wide range) — as much adjustment as possible stays in the
//! AGC trim before spilling into discrete swing steps. Accumulated drift
//! beyond the IQK threshold triggers a fresh IQ calibration.

use embedded_hal_1::delay::DelayNs;

use crate::bus::{RegisterBus, RfPath};
use crate::efuse::THERMAL_UNCALIBRATED;
use crate::ports::DriverPort;
use crate::regs::{
    MASK_TXAGC_IDX, MASK_TXSCALE_SWING, MASK_T_METER_TRIG, MASK_T_METER_VAL, REG_TXAGCIDX,
    REG_TXSCALE_A, RF_T_METER,
};
use crate::tables::{
    PWRTRK_2GA_N, PWRTRK_2GA_P, PWRTRK_2GB_N, PWRTRK_2GB_P, PWRTRK_2G_CCK_A_N, PWRTRK_2G_CCK_A_P,
    PWRTRK_2G_CCK_B_N, PWRTRK_2G_CCK_B_P, PWRTRK_5GA_N, PWRTRK_5GA_P, PWRTRK_5GB_N, PWRTRK_5GB_P,
    PWR_TRK_TBL_SZ, TXSCALE_TBL,
};
use crate::rates::DESC_RATE11M;
use crate::{Rtw8821c, MAX_POWER_INDEX, RF_PATH_MAX};

/// Fallback swing baseline when the hardware value matches no table entry.
const SWING_DEFAULT_INDEX: u8 = 24;

/// Thermal drift (sensor steps) that warrants a fresh IQ calibration.
const IQK_THERMAL_THRESHOLD: u8 = 8;

/// Exponential moving average of the thermal sensor, fixed point.
#[derive(Debug, Copy, Clone)]
pub struct EwmaThermal {
    internal: u32,
}

impl EwmaThermal {
    const PRECISION: u32 = 10;
    const WEIGHT_LOG2: u32 = 2;

    pub const fn new() -> Self {
        Self { internal: 0 }
    }

    pub fn add(&mut self, value: u8) {
        let scaled = (value as u32) << Self::PRECISION;
        self.internal = if self.internal == 0 {
            scaled
        } else {
            (((self.internal << Self::WEIGHT_LOG2) - self.internal) + scaled)
                >> Self::WEIGHT_LOG2
        };
    }

    pub fn read(&self) -> u8 {
        (self.internal >> Self::PRECISION) as u8
    }
}

/// Per-path compensation tables selected for the current band and rate.
pub(crate) struct SwingTable {
    p: [&'static [u8; PWR_TRK_TBL_SZ]; RF_PATH_MAX],
    n: [&'static [u8; PWR_TRK_TBL_SZ]; RF_PATH_MAX],
}

impl<B, D, P> Rtw8821c<B, D, P>
where
    B: RegisterBus,
    D: DelayNs,
    P: DriverPort,
{
    /// Re-derive the swing baseline and reset the tracking state.
    ///
    /// Called at PHY bring-up and after every channel change, so drift is
    /// always measured against the current channel's swing programming.
    pub(crate) fn pwrtrack_init(&mut self) {
        let swing_idx = self.get_swing_index();

        self.dm.default_ofdm_index = if swing_idx >= TXSCALE_TBL.len() as u8 {
            SWING_DEFAULT_INDEX
        } else {
            swing_idx
        };

        self.dm.avg_thermal[RfPath::A as usize] = EwmaThermal::new();
        self.dm.delta_power_index[RfPath::A as usize] = 0;
        self.dm.delta_power_index_last[RfPath::A as usize] = 0;
        self.dm.pwr_trk_triggered = false;
        self.dm.pwr_trk_init_trigger = true;
        self.dm.thermal_meter_k = self.efuse.thermal_meter_k;
        self.dm.thermal_meter_lck = self.efuse.thermal_meter_k;
    }

    /// Match the current hardware swing value against the TX scale table.
    ///
    /// Returns the table length when no entry matches.
    fn get_swing_index(&mut self) -> u8 {
        let swing = self.bus.read32_mask(REG_TXSCALE_A, MASK_TXSCALE_SWING);
        TXSCALE_TBL
            .iter()
            .position(|&v| v == swing)
            .unwrap_or(TXSCALE_TBL.len()) as u8
    }

    /// One tick of the two-phase tracking state machine.
    ///
    /// The first tick arms the thermal sensor and returns; the following
    /// tick runs the full tracking computation.
    pub fn pwr_track(&mut self) {
        if self.efuse.power_track_type != 0 {
            return;
        }

        if !self.dm.pwr_trk_triggered {
            self.bus
                .write_rf(RfPath::A, RF_T_METER, MASK_T_METER_TRIG, 0x03);
            self.dm.pwr_trk_triggered = true;
            return;
        }

        self.phy_pwrtrack();
        self.dm.pwr_trk_triggered = false;
    }

    fn phy_pwrtrack(&mut self) {
        let swing_table = self.config_swing_table();

        if self.efuse.thermal_meter == THERMAL_UNCALIBRATED {
            return;
        }

        let thermal_value = self.bus.read_rf(RfPath::A, RF_T_METER, MASK_T_METER_VAL) as u8;

        self.pwrtrack_avg(thermal_value, RfPath::A);

        if self.dm.pwr_trk_init_trigger {
            // First reading only establishes the baseline.
            self.dm.pwr_trk_init_trigger = false;
            self.dm.thermal_avg[RfPath::A as usize] =
                self.dm.avg_thermal[RfPath::A as usize].read();
        } else if self.pwrtrack_thermal_changed(RfPath::A) {
            let delta = self
                .pwrtrack_get_delta(RfPath::A)
                .min(PWR_TRK_TBL_SZ as u8 - 1);

            let delta_power_index =
                self.pwrtrack_get_pwridx(&swing_table, RfPath::A, RfPath::A, delta);

            self.dm.delta_power_index[RfPath::A as usize] = delta_power_index;
            if delta_power_index != self.dm.delta_power_index_last[RfPath::A as usize] {
                self.dm.delta_power_index_last[RfPath::A as usize] = delta_power_index;
                self.pwrtrack_set();
            }
        }

        if self.pwrtrack_need_iqk() {
            self.do_iqk();
        }
    }

    /// Select the compensation tables for the current channel and rate.
    pub(crate) fn config_swing_table(&self) -> SwingTable {
        let channel = self.hal.current_channel;

        if channel <= 14 {
            if self.dm.tx_rate <= DESC_RATE11M {
                SwingTable {
                    p: [&PWRTRK_2G_CCK_A_P, &PWRTRK_2G_CCK_B_P],
                    n: [&PWRTRK_2G_CCK_A_N, &PWRTRK_2G_CCK_B_N],
                }
            } else {
                SwingTable {
                    p: [&PWRTRK_2GA_P, &PWRTRK_2GB_P],
                    n: [&PWRTRK_2GA_N, &PWRTRK_2GB_N],
                }
            }
        } else if (36..=64).contains(&channel) {
            SwingTable {
                p: [&PWRTRK_5GA_P[0], &PWRTRK_5GB_P[0]],
                n: [&PWRTRK_5GA_N[0], &PWRTRK_5GB_N[0]],
            }
        } else if (100..=144).contains(&channel) {
            SwingTable {
                p: [&PWRTRK_5GA_P[1], &PWRTRK_5GB_P[1]],
                n: [&PWRTRK_5GA_N[1], &PWRTRK_5GB_N[1]],
            }
        } else if channel >= 149 {
            SwingTable {
                p: [&PWRTRK_5GA_P[2], &PWRTRK_5GB_P[2]],
                n: [&PWRTRK_5GA_N[2], &PWRTRK_5GB_N[2]],
            }
        } else {
            SwingTable {
                p: [&PWRTRK_2GA_P, &PWRTRK_2GB_P],
                n: [&PWRTRK_2GA_N, &PWRTRK_2GB_N],
            }
        }
    }

    fn pwrtrack_avg(&mut self, thermal_value: u8, path: RfPath) {
        self.dm.avg_thermal[path as usize].add(thermal_value);
    }

    /// Whether the smoothed thermal reading moved since the last check;
    /// records the new value when it did.
    fn pwrtrack_thermal_changed(&mut self, path: RfPath) -> bool {
        let avg = self.dm.avg_thermal[path as usize].read();
        if avg == self.dm.thermal_avg[path as usize] {
            return false;
        }

        self.dm.thermal_avg[path as usize] = avg;
        true
    }

    /// Absolute smoothed deviation from the per-session thermal baseline.
    fn pwrtrack_get_delta(&self, path: RfPath) -> u8 {
        self.dm.thermal_avg[path as usize].abs_diff(self.dm.thermal_meter_k)
    }

    /// Compensation delta for `delta` sensor steps; the sign follows the
    /// drift direction.
    pub(crate) fn pwrtrack_get_pwridx(
        &self,
        swing_table: &SwingTable,
        tbl_path: RfPath,
        therm_path: RfPath,
        delta: u8,
    ) -> i8 {
        if delta as usize >= PWR_TRK_TBL_SZ {
            warn!("power track delta {} out of range", delta);
            return 0;
        }

        if self.dm.thermal_avg[therm_path as usize] > self.dm.thermal_meter_k {
            swing_table.p[tbl_path as usize][delta as usize] as i8
        } else {
            -(swing_table.n[tbl_path as usize][delta as usize] as i8)
        }
    }

    /// Whether accumulated drift since the last IQ calibration warrants a
    /// fresh one; re-snapshots the reference when it does.
    fn pwrtrack_need_iqk(&mut self) -> bool {
        let delta_iqk = self.dm.thermal_avg[RfPath::A as usize].abs_diff(self.dm.thermal_meter_lck);
        if delta_iqk >= IQK_THERMAL_THRESHOLD {
            self.dm.thermal_meter_lck = self.dm.thermal_avg[RfPath::A as usize];
            return true;
        }
        false
    }

    fn pwrtrack_set(&mut self) {
        let channel = self.hal.current_channel;
        let band_width = self.hal.current_band_width;
        let regd = self.efuse.regd;
        let tx_rate = self.dm.tx_rate;

        let tx_pwr_idx = self
            .port
            .tx_power_index(RfPath::A, tx_rate, band_width, channel, regd)
            .min(MAX_POWER_INDEX);

        let pwr_idx_offset = MAX_POWER_INDEX - tx_pwr_idx;
        let pwr_idx_offset_lower = 0 - tx_pwr_idx as i8;

        self.pwrtrack_set_pwr(pwr_idx_offset, pwr_idx_offset_lower);
    }

    fn pwrtrack_set_pwr(&mut self, pwr_idx_offset: u8, pwr_idx_offset_lower: i8) {
        let (txagc_idx, swing_idx) = self.txagc_swing_offset(pwr_idx_offset, pwr_idx_offset_lower);

        self.bus
            .write32_mask(REG_TXAGCIDX, MASK_TXAGC_IDX, (txagc_idx as u8 as u32) & 0x3f);
        self.bus.write32_mask(
            REG_TXSCALE_A,
            MASK_TXSCALE_SWING,
            TXSCALE_TBL[swing_idx as usize],
        );
    }

    /// Split the compensation delta into a TX AGC trim and a swing index.
    ///
    /// The AGC trim absorbs the delta while it fits inside the headroom the
    /// target power leaves in either direction; the excess moves the swing
    /// index away from the baseline, capped at baseline+10 upward and 0
    /// downward.
    pub(crate) fn txagc_swing_offset(
        &self,
        pwr_idx_offset: u8,
        pwr_idx_offset_lower: i8,
    ) -> (i8, u8) {
        let dm = &self.dm;
        let delta_pwr_idx = dm.delta_power_index[RfPath::A as usize];
        let swing_upper_bound = dm.default_ofdm_index + 10;
        let swing_lower_bound = 0u8;

        let pwr_idx_offset = pwr_idx_offset.min(0xf);
        let pwr_idx_offset_lower = pwr_idx_offset_lower.max(-15);

        let mut agc_index: i8 = 0;
        let mut swing_index = dm.default_ofdm_index;

        if delta_pwr_idx >= 0 {
            if delta_pwr_idx as u8 <= pwr_idx_offset {
                agc_index = delta_pwr_idx;
            } else {
                agc_index = pwr_idx_offset as i8;
                swing_index = (dm.default_ofdm_index + delta_pwr_idx as u8 - pwr_idx_offset)
                    .min(swing_upper_bound);
            }
        } else if delta_pwr_idx >= pwr_idx_offset_lower {
            agc_index = delta_pwr_idx;
        } else {
            let excess = (pwr_idx_offset_lower - delta_pwr_idx) as u8;
            swing_index = if dm.default_ofdm_index > excess {
                dm.default_ofdm_index - excess
            } else {
                swing_lower_bound
            };
            agc_index = pwr_idx_offset_lower;
        }

        if swing_index as usize >= TXSCALE_TBL.len() {
            warn!("swing index overflow");
            swing_index = (TXSCALE_TBL.len() - 1) as u8;
        }

        (agc_index, swing_index)
    }
}
