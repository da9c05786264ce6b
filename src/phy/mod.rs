//! PHY control: bring-up, channel configuration, false-alarm statistics,
//! CCK packet-detection thresholds and per-rate TX power programming.
//!
//! The channel configurator is a pure function of (channel, bandwidth,
//! primary subchannel): it reprograms the baseband filters, the ADC clock
//! domain and the RF synthesizer, then resets the TX swing baseline so the
//! power-tracking loop restarts from the new channel. The periodic dynamic
//! mechanism drives `false_alarm_statistics`, `cck_pd_set` and `pwr_track`
//! in that order; the caller serializes those ticks against channel
//! changes.

pub mod iqk;
pub mod pwrtrack;


use embedded_hal_1::delay::DelayNs;

use crate::bus::{RegisterBus, RfPath, RFREG_MASK};
use crate::ports::{BfeeRole, DriverPort};
use crate::rates::{RateSection, DESC_RATEVHT1SS_MCS9, RATE_SECTIONS};
use crate::regs::*;
use crate::tables::SWING_TO_SETTING;
use crate::{Bandwidth, ChannelParams, Rtw8821c};

/// Number of CCK packet-detection sensitivity levels.
pub const CCK_PD_LV_MAX: u8 = 5;

/// Resets the false-alarm running average when the detection level moves.
pub(crate) const CCK_FA_AVG_RESET: u32 = 0xffff_ffff;

impl<B, D, P> Rtw8821c<B, D, P>
where
    B: RegisterBus,
    D: DelayNs,
    P: DriverPort,
{
    /// Bring up the BB/RF domain and program the PHY parameters.
    ///
    /// Captures the reset-time filter coefficients ([`ChannelParams`]) that
    /// later channel switches replay, and initializes the power-tracking
    /// baseline.
    pub fn phy_set_param(&mut self) {
        // Power on the BB/RF domain.
        let mut val = self.bus.read8(REG_SYS_FUNC_EN);
        val |= BIT_FEN_PCIEA;
        self.bus.write8(REG_SYS_FUNC_EN, val);

        // Toggle BB reset.
        val |= BIT_FEN_BB_RSTB | BIT_FEN_BB_GLB_RST;
        self.bus.write8(REG_SYS_FUNC_EN, val);
        val &= !(BIT_FEN_BB_RSTB | BIT_FEN_BB_GLB_RST);
        self.bus.write8(REG_SYS_FUNC_EN, val);
        val |= BIT_FEN_BB_RSTB | BIT_FEN_BB_GLB_RST;
        self.bus.write8(REG_SYS_FUNC_EN, val);

        self.bus
            .write8(REG_RF_CTRL, BIT_RF_EN | BIT_RF_RSTB | BIT_RF_SDM_RSTB);
        self.delay.delay_us(10);
        self.bus
            .write8(REG_WLRF1 + 3, BIT_RF_EN | BIT_RF_RSTB | BIT_RF_SDM_RSTB);
        self.delay.delay_us(10);

        // Pre-init before the register tables are programmed.
        self.bus.write32_clr(REG_RXPSEL, BIT_RX_PSEL_RST);

        self.port.load_phy_tables();

        let crystal_cap = (self.efuse.crystal_cap & 0x3f) as u32;
        self.bus
            .write32_mask(REG_AFE_XTAL_CTRL, 0x7e00_0000, crystal_cap);
        self.bus.write32_mask(REG_AFE_PLL_CTRL, 0x7e, crystal_cap);
        self.bus
            .write32_mask(REG_CCK0_FAREPORT, bit(18) | bit(22), 0);

        // Post-init after the register tables are programmed.
        self.bus.write32_set(REG_RXPSEL, BIT_RX_PSEL_RST);
        self.ch_params = Some(ChannelParams {
            tx_sf2: self.bus.read32_mask(REG_TXSF2, MASKDWORD),
            tx_sf6: self.bus.read32_mask(REG_TXSF6, MASKDWORD),
            tx_filter: self.bus.read32_mask(REG_TXFILTER, MASKDWORD),
        });

        self.dm.cck_pd_default = self.bus.read8(REG_CSRATIO) & 0x1f;

        self.pwrtrack_init();

        self.port.bf_phy_init();
        // Grouping bitmap parameters.
        self.bus.write32(0x1c94, 0xafff_afff);
    }

    /// Switch to `channel` with the given bandwidth and primary subchannel.
    ///
    /// Must only be called while the channel is administratively idle; all
    /// register writes are fire-and-forget.
    pub fn set_channel(&mut self, channel: u8, bw: Bandwidth, primary_ch_idx: u8) {
        self.hal.current_channel = channel;
        self.hal.current_band_width = bw;
        self.hal.current_primary_idx = primary_ch_idx;

        self.set_channel_bb(channel, bw, primary_ch_idx);
        self.set_channel_bb_swing(channel);
        self.port.set_channel_mac(channel, bw, primary_ch_idx);
        self.set_channel_rf(channel, bw);
        self.set_channel_rxdfir(bw);
    }

    fn set_channel_bb(&mut self, channel: u8, bw: Bandwidth, primary_ch_idx: u8) {
        if channel <= 14 {
            self.bus.write32_mask(REG_RXPSEL, bit(28), 0x1);
            self.bus.write32_mask(REG_CCK_CHECK, BIT_CHECK_CCK_EN, 0x0);
            self.bus.write32_mask(REG_ENTXCCK, bit(18), 0x0);
            self.bus.write32_mask(REG_RXCCAMSK, 0x0000_fc00, 15);

            self.bus.write32_mask(REG_TXSCALE_A, 0xf00, 0x0);
            self.bus.write32_mask(REG_CLKTRK, 0x1ffe_0000, 0x96a);
            if channel == 14 {
                self.bus.write32_mask(REG_TXSF2, MASKDWORD, 0x0000_b81c);
                self.bus.write32_mask(REG_TXSF6, MASKLWORD, 0x0000);
                self.bus.write32_mask(REG_TXFILTER, MASKDWORD, 0x0000_3667);
            } else if let Some(params) = self.ch_params {
                self.bus.write32_mask(REG_TXSF2, MASKDWORD, params.tx_sf2);
                self.bus
                    .write32_mask(REG_TXSF6, MASKLWORD, params.tx_sf6 & MASKLWORD);
                self.bus
                    .write32_mask(REG_TXFILTER, MASKDWORD, params.tx_filter);
            } else {
                warn!("channel params not captured, filter coefficients kept");
            }
        } else if channel > 35 {
            self.bus.write32_mask(REG_ENTXCCK, bit(18), 0x1);
            self.bus.write32_mask(REG_CCK_CHECK, BIT_CHECK_CCK_EN, 0x1);
            self.bus.write32_mask(REG_RXPSEL, bit(28), 0x0);
            self.bus.write32_mask(REG_RXCCAMSK, 0x0000_fc00, 15);

            // Sub-range boundaries are inclusive; channels in the gaps keep
            // the previous value.
            if (36..=64).contains(&channel) {
                self.bus.write32_mask(REG_TXSCALE_A, 0xf00, 0x1);
            } else if (100..=144).contains(&channel) {
                self.bus.write32_mask(REG_TXSCALE_A, 0xf00, 0x2);
            } else if channel >= 149 {
                self.bus.write32_mask(REG_TXSCALE_A, 0xf00, 0x3);
            }

            if (36..=48).contains(&channel) {
                self.bus.write32_mask(REG_CLKTRK, 0x1ffe_0000, 0x494);
            } else if (52..=64).contains(&channel) {
                self.bus.write32_mask(REG_CLKTRK, 0x1ffe_0000, 0x453);
            } else if (100..=116).contains(&channel) {
                self.bus.write32_mask(REG_CLKTRK, 0x1ffe_0000, 0x452);
            } else if (118..=177).contains(&channel) {
                self.bus.write32_mask(REG_CLKTRK, 0x1ffe_0000, 0x412);
            }
        }

        match bw {
            Bandwidth::Bw20 => {
                let mut val32 = self.bus.read32_mask(REG_ADCCLK, MASKDWORD);
                val32 &= 0xffcf_fc00;
                val32 |= 0x1001_0000;
                self.bus.write32_mask(REG_ADCCLK, MASKDWORD, val32);

                self.bus.write32_mask(REG_ADC160, bit(30), 0x1);
            }
            Bandwidth::Bw40 => {
                if primary_ch_idx == 1 {
                    self.bus.write32_set(REG_RXSB, bit(4));
                } else {
                    self.bus.write32_clr(REG_RXSB, bit(4));
                }

                let mut val32 = self.bus.read32_mask(REG_ADCCLK, MASKDWORD);
                val32 &= 0xff3f_f300;
                val32 |= 0x2002_0000
                    | (((primary_ch_idx & 0xf) as u32) << 2)
                    | Bandwidth::Bw40 as u32;
                self.bus.write32_mask(REG_ADCCLK, MASKDWORD, val32);

                self.bus.write32_mask(REG_ADC160, bit(30), 0x1);
            }
            Bandwidth::Bw80 => {
                let mut val32 = self.bus.read32_mask(REG_ADCCLK, MASKDWORD);
                val32 &= 0xfcff_cf00;
                val32 |= 0x4004_0000
                    | (((primary_ch_idx & 0xf) as u32) << 2)
                    | Bandwidth::Bw80 as u32;
                self.bus.write32_mask(REG_ADCCLK, MASKDWORD, val32);

                self.bus.write32_mask(REG_ADC160, bit(30), 0x1);
            }
            Bandwidth::Bw5 => {
                let mut val32 = self.bus.read32_mask(REG_ADCCLK, MASKDWORD);
                val32 &= 0xefce_fc00;
                val32 |= 0x0020_0240;
                self.bus.write32_mask(REG_ADCCLK, MASKDWORD, val32);

                self.bus.write32_mask(REG_ADC160, bit(30), 0x0);
                self.bus.write32_mask(REG_ADC40, bit(31), 0x1);
            }
            Bandwidth::Bw10 => {
                let mut val32 = self.bus.read32_mask(REG_ADCCLK, MASKDWORD);
                val32 &= 0xefce_fc00;
                val32 |= 0x0030_0380;
                self.bus.write32_mask(REG_ADCCLK, MASKDWORD, val32);

                self.bus.write32_mask(REG_ADC160, bit(30), 0x0);
                self.bus.write32_mask(REG_ADC40, bit(31), 0x1);
            }
        }
    }

    /// The bb-swing gain constant for the band `channel` belongs to.
    fn get_bb_swing(&self, channel: u8) -> u32 {
        let mut tx_bb_swing = self.efuse.tx_bb_swing_setting(channel);
        if tx_bb_swing > 9 {
            tx_bb_swing = 0;
        }

        SWING_TO_SETTING[(tx_bb_swing / 3) as usize]
    }

    fn set_channel_bb_swing(&mut self, channel: u8) {
        let swing = self.get_bb_swing(channel);
        self.bus
            .write32_mask(REG_TXSCALE_A, MASK_TXSCALE_SWING, swing);
        // Tracking drift is relative to the new baseline.
        self.pwrtrack_init();
    }

    fn set_channel_rf(&mut self, channel: u8, bw: Bandwidth) {
        let mut rf_reg18 = self.bus.read_rf(RfPath::A, RF_CFGCH, RFREG_MASK);

        rf_reg18 &= !(RF18_BAND_MASK | RF18_CHANNEL_MASK | RF18_RFSI_MASK | RF18_BW_MASK);

        rf_reg18 |= if channel <= 14 {
            RF18_BAND_2G
        } else {
            RF18_BAND_5G
        };
        rf_reg18 |= channel as u32 & RF18_CHANNEL_MASK;

        if (100..=140).contains(&channel) {
            rf_reg18 |= RF18_RFSI_GE;
        } else if channel > 140 {
            rf_reg18 |= RF18_RFSI_GT;
        }

        // The synthesizer has no half/quarter rate mode; 5/10 MHz run on
        // the 20 MHz RF bandwidth.
        rf_reg18 |= match bw {
            Bandwidth::Bw40 => RF18_BW_40M,
            Bandwidth::Bw80 => RF18_BW_80M,
            _ => RF18_BW_20M,
        };

        if channel <= 14 {
            self.bus.write_rf(RfPath::A, RF_LUTDBG, bit(6), 0x1);
            self.bus.write_rf(RfPath::A, RF_TRXIQ, 0xf, 0xf);
        } else {
            self.bus.write_rf(RfPath::A, RF_LUTDBG, bit(6), 0x0);
        }

        self.bus.write_rf(RfPath::A, RF_CFGCH, RFREG_MASK, rf_reg18);

        // Toggle the synthesizer re-lock bit to commit.
        self.bus.write_rf(RfPath::A, RF_XTALX2, bit(19), 0);
        self.bus.write_rf(RfPath::A, RF_XTALX2, bit(19), 1);
    }

    fn set_channel_rxdfir(&mut self, bw: Bandwidth) {
        match bw {
            Bandwidth::Bw40 => {
                self.bus.write32_mask(REG_ACBB0, bit(29) | bit(28), 0x2);
                self.bus.write32_mask(REG_ACBBRXFIR, bit(29) | bit(28), 0x2);
                self.bus.write32_mask(REG_TXDFIR, bit(31), 0x0);
                self.bus.write32_mask(REG_CHFIR, bit(31), 0x0);
            }
            Bandwidth::Bw80 => {
                self.bus.write32_mask(REG_ACBB0, bit(29) | bit(28), 0x2);
                self.bus.write32_mask(REG_ACBBRXFIR, bit(29) | bit(28), 0x1);
                self.bus.write32_mask(REG_TXDFIR, bit(31), 0x0);
                self.bus.write32_mask(REG_CHFIR, bit(31), 0x1);
            }
            _ => {
                // 20, 10 and 5 MHz share one DFIR configuration.
                self.bus.write32_mask(REG_ACBB0, bit(29) | bit(28), 0x2);
                self.bus.write32_mask(REG_ACBBRXFIR, bit(29) | bit(28), 0x2);
                self.bus.write32_mask(REG_TXDFIR, bit(31), 0x1);
                self.bus.write32_mask(REG_CHFIR, bit(31), 0x0);
            }
        }
    }

    /// One tick of false-alarm/CCA/CRC statistics collection.
    ///
    /// Snapshots the hardware counters into [`crate::DmInfo`] and
    /// pulse-resets them so the next tick starts from zero. The CCK
    /// contribution counts only while CCK detection is enabled.
    pub fn false_alarm_statistics(&mut self) {
        let cck_enable = self.bus.read32(REG_RXPSEL) & bit(28) != 0;
        let cck_fa_cnt = self.bus.read16(REG_FA_CCK) as u32;
        let ofdm_fa_cnt = self.bus.read16(REG_FA_OFDM) as u32;

        self.dm.cck_fa_cnt = cck_fa_cnt;
        self.dm.ofdm_fa_cnt = ofdm_fa_cnt;
        self.dm.total_fa_cnt = ofdm_fa_cnt;
        if cck_enable {
            self.dm.total_fa_cnt += cck_fa_cnt;
        }

        let crc32_cnt = self.bus.read32(REG_CRC_CCK);
        self.dm.cck_ok_cnt = crc32_cnt & 0xffff;
        self.dm.cck_err_cnt = crc32_cnt >> 16;

        let crc32_cnt = self.bus.read32(REG_CRC_OFDM);
        self.dm.ofdm_ok_cnt = crc32_cnt & 0xffff;
        self.dm.ofdm_err_cnt = crc32_cnt >> 16;

        let crc32_cnt = self.bus.read32(REG_CRC_HT);
        self.dm.ht_ok_cnt = crc32_cnt & 0xffff;
        self.dm.ht_err_cnt = crc32_cnt >> 16;

        let crc32_cnt = self.bus.read32(REG_CRC_VHT);
        self.dm.vht_ok_cnt = crc32_cnt & 0xffff;
        self.dm.vht_err_cnt = crc32_cnt >> 16;

        let cca32_cnt = self.bus.read32(REG_CCA_OFDM);
        self.dm.ofdm_cca_cnt = cca32_cnt >> 16;
        self.dm.total_cca_cnt = self.dm.ofdm_cca_cnt;
        if cck_enable {
            let cca32_cnt = self.bus.read32(REG_CCA_CCK);
            self.dm.cck_cca_cnt = cca32_cnt & 0xffff;
            self.dm.total_cca_cnt += self.dm.cck_cca_cnt;
        }

        self.bus.write32_set(REG_FAS, bit(17));
        self.bus.write32_clr(REG_FAS, bit(17));
        self.bus.write32_clr(REG_RXDESC, bit(15));
        self.bus.write32_set(REG_RXDESC, bit(15));
        self.bus.write32_set(REG_CNTRST, bit(0));
        self.bus.write32_clr(REG_CNTRST, bit(0));
    }

    /// Select a CCK packet-detection sensitivity level.
    ///
    /// A strong-signal RSSI estimate (>60) forces the least sensitive level
    /// with a raised threshold regardless of the requested level.
    pub fn cck_pd_set(&mut self, new_lvl: u8) {
        let mut pd: [u8; CCK_PD_LV_MAX as usize] = [3, 7, 13, 13, 13];
        let mut new_lvl = new_lvl;
        if new_lvl >= CCK_PD_LV_MAX {
            warn!("cck pd level {} out of range", new_lvl);
            new_lvl = CCK_PD_LV_MAX - 1;
        }

        if self.dm.min_rssi > 60 {
            new_lvl = 4;
            pd[4] = 0x1d;
        } else {
            if self.dm.cck_pd_lv[Bandwidth::Bw20 as usize][RfPath::A as usize] == new_lvl {
                return;
            }
            self.dm.cck_fa_avg = CCK_FA_AVG_RESET;
        }

        self.dm.cck_pd_lv[Bandwidth::Bw20 as usize][RfPath::A as usize] = new_lvl;
        self.bus
            .write32_mask(REG_PWRTH, 0x003f_0000, pd[new_lvl as usize] as u32);
        self.bus.write32_mask(
            REG_PWRTH2,
            0x001f_0000,
            (self.dm.cck_pd_default + new_lvl * 2) as u32,
        );
    }

    fn set_tx_power_index_by_rate(&mut self, path: RfPath, rs: RateSection) {
        // Four per-rate bytes pack into one TX AGC word; the accumulator is
        // local and starts clean for every rate section.
        let mut phy_pwr_idx: u32 = 0;

        for &rate in rs.rates() {
            let pwr_index = self.hal.tx_pwr_tbl[path as usize][rate as usize] as u32;
            let shift = (rate & 0x3) as u32;
            phy_pwr_idx |= pwr_index << (shift * 8);
            if shift == 0x3 || rate == DESC_RATEVHT1SS_MCS9 {
                let rate_idx = (rate & 0xfc) as u32;
                self.bus
                    .write32(REG_TXAGC_BASE[path as usize] + rate_idx, phy_pwr_idx);
                phy_pwr_idx = 0;
            }
        }
    }

    /// Program the per-rate TX power indexes from the power table.
    pub fn set_tx_power_index(&mut self) {
        for path in [RfPath::A] {
            for rs in RATE_SECTIONS {
                if rs.is_2ss() {
                    continue;
                }
                self.set_tx_power_index_by_rate(path, rs);
            }
        }
    }

    /// Configure a beamformee session for the given role.
    pub fn config_bfee(&mut self, role: BfeeRole, enable: bool) {
        match role {
            BfeeRole::Su => self.port.config_bfee_su(enable),
            BfeeRole::Mu => self.port.config_bfee_mu(enable),
            BfeeRole::None => warn!("wrong bfee role"),
        }
    }
}
