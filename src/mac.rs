//! MAC protocol configuration.

use embedded_hal_1::delay::DelayNs;

use crate::bus::RegisterBus;
use crate::ports::DriverPort;
use crate::regs::*;
use crate::Rtw8821c;

const WLAN_AMPDU_MAX_TIME: u8 = 0x70;
const WLAN_PRE_TXCNT_TIME_TH: u16 = 0x1e4;
const WLAN_RTS_LEN_TH: u32 = 0xff;
const WLAN_RTS_TX_TIME_TH: u32 = 0x08;
const WLAN_MAX_AGG_PKT_LIMIT: u32 = 0x20;
const WLAN_RTS_MAX_AGG_PKT_LIMIT: u32 = 0x20;
const WLAN_BAR_RETRY_LIMIT: u16 = 0x01;
const WLAN_RA_TRY_RATE_AGG_LIMIT: u16 = 0x08;
const FAST_EDCA_VO_TH: u8 = 0x06;
const FAST_EDCA_VI_TH: u8 = 0x06;
const FAST_EDCA_BE_TH: u8 = 0x06;
const FAST_EDCA_BK_TH: u8 = 0x06;

const WLAN_SLOT_TIME: u8 = 0x09;
const WLAN_PIFS_TIME: u8 = 0x19;
const WLAN_SIFS_CFG: u32 = 0x0e0a_0e0a;
const WLAN_VO_TXOP_LIMIT: u16 = 0x186;
const WLAN_VI_TXOP_LIMIT: u16 = 0x3bc;
const WLAN_NAV_CFG: u32 = 0x001b_0005;
const WLAN_RX_TSF_CFG: u16 = 0x0430;

const WLAN_TBTT_TIME: u32 = 0x8004;
const WLAN_DRV_EARLY_INT: u8 = 0x04;
const WLAN_BCN_DMA_TIME: u8 = 0x02;

const WLAN_RX_FILTER0: u32 = 0x0fff_ffff;
const WLAN_RX_FILTER2: u16 = 0xffff;
const WLAN_RCR_CFG: u32 = 0xe400_220e;
const WLAN_RXPKT_MAX_SZ_512: u8 = (512u16 >> 6) as u8;
const WLAN_TX_FUNC_CFG1: u8 = 0x30;
const WLAN_TX_FUNC_CFG2: u8 = 0x30;
const WLAN_MAC_OPT_NORM_FUNC1: u8 = 0x98;
const WLAN_MAC_OPT_FUNC2: u32 = 0x3081_0041;

impl<B, D, P> Rtw8821c<B, D, P>
where
    B: RegisterBus,
    D: DelayNs,
    P: DriverPort,
{
    /// Program the MAC protocol configuration.
    pub fn mac_init(&mut self) {
        // Protocol configuration.
        self.bus.write8(REG_AMPDU_MAX_TIME_V1, WLAN_AMPDU_MAX_TIME);
        self.bus.write8_set(REG_TX_HANG_CTRL, BIT_EN_EOF_V1);
        let pre_txcnt = WLAN_PRE_TXCNT_TIME_TH | BIT_EN_PRECNT;
        self.bus.write8(REG_PRECNT_CTRL, pre_txcnt as u8);
        self.bus.write8(REG_PRECNT_CTRL + 1, (pre_txcnt >> 8) as u8);
        let value32 = WLAN_RTS_LEN_TH
            | (WLAN_RTS_TX_TIME_TH << 8)
            | (WLAN_MAX_AGG_PKT_LIMIT << 16)
            | (WLAN_RTS_MAX_AGG_PKT_LIMIT << 24);
        self.bus.write32(REG_PROT_MODE_CTRL, value32);
        self.bus.write16(
            REG_BAR_MODE_CTRL + 2,
            WLAN_BAR_RETRY_LIMIT | (WLAN_RA_TRY_RATE_AGG_LIMIT << 8),
        );
        self.bus.write8(REG_FAST_EDCA_VOVI_SETTING, FAST_EDCA_VO_TH);
        self.bus
            .write8(REG_FAST_EDCA_VOVI_SETTING + 2, FAST_EDCA_VI_TH);
        self.bus.write8(REG_FAST_EDCA_BEBK_SETTING, FAST_EDCA_BE_TH);
        self.bus
            .write8(REG_FAST_EDCA_BEBK_SETTING + 2, FAST_EDCA_BK_TH);
        self.bus.write8_set(REG_INIRTS_RATE_SEL, 1 << 5);

        // EDCA configuration.
        self.bus.write8_clr(REG_TIMER0_SRC_SEL, BIT_TSFT_SEL_TIMER0);
        self.bus.write16(REG_TXPAUSE, 0);
        self.bus.write8(REG_SLOT, WLAN_SLOT_TIME);
        self.bus.write8(REG_PIFS, WLAN_PIFS_TIME);
        self.bus.write32(REG_SIFS, WLAN_SIFS_CFG);
        self.bus.write16(REG_EDCA_VO_PARAM + 2, WLAN_VO_TXOP_LIMIT);
        self.bus.write16(REG_EDCA_VI_PARAM + 2, WLAN_VI_TXOP_LIMIT);
        self.bus.write32(REG_RD_NAV_NXT, WLAN_NAV_CFG);
        self.bus.write16(REG_RXTSF_OFFSET_CCK, WLAN_RX_TSF_CFG);

        // Enable TSF and the other beacon functions.
        self.bus.write8_set(REG_BCN_CTRL, BIT_EN_BCN_FUNCTION);

        // Beacon transmit timing.
        self.bus.write32(REG_TBTT_PROHIBIT, WLAN_TBTT_TIME);
        self.bus.write8(REG_DRVERLYINT, WLAN_DRV_EARLY_INT);
        self.bus.write8(REG_BCNDMATIM, WLAN_BCN_DMA_TIME);
        self.bus
            .write8_clr(REG_TX_PTCL_CTRL + 1, (BIT_SIFS_BK_EN >> 8) as u8);

        // WMAC configuration.
        self.bus.write32(REG_RXFLTMAP0, WLAN_RX_FILTER0);
        self.bus.write16(REG_RXFLTMAP2, WLAN_RX_FILTER2);
        self.bus.write32(REG_RCR, WLAN_RCR_CFG);
        self.bus.write8(REG_RX_PKT_LIMIT, WLAN_RXPKT_MAX_SZ_512);
        self.bus.write8(REG_TCR + 2, WLAN_TX_FUNC_CFG2);
        self.bus.write8(REG_TCR + 1, WLAN_TX_FUNC_CFG1);
        self.bus.write8(REG_ACKTO_CCK, 0x40);
        self.bus.write8_set(REG_WMAC_TRXPTCL_CTL_H, 1 << 1);
        self.bus.write8_set(REG_SND_PTCL_CTRL, 1 << 6);
        self.bus
            .write32(REG_WMAC_OPTION_FUNCTION + 8, WLAN_MAC_OPT_FUNC2);
        self.bus
            .write8(REG_WMAC_OPTION_FUNCTION + 4, WLAN_MAC_OPT_NORM_FUNC1);
    }

    /// Switch the LDO25 regulator.
    pub fn cfg_ldo25(&mut self, enable: bool) {
        let mut ldo_pwr = self.bus.read8(REG_LDO_EFUSE_CTRL + 3);
        ldo_pwr = if enable {
            ldo_pwr | (1 << 7)
        } else {
            ldo_pwr & !(1 << 7)
        };
        self.bus.write8(REG_LDO_EFUSE_CTRL + 3, ldo_pwr);
    }
}
