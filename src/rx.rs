//! RX descriptor and PHY status parsing.
//!
//! The hardware prepends a fixed-size descriptor to every received frame,
//! optionally followed by a PHY status block. Only the descriptor fields
//! and the page-0/page-1 PHY status layouts this chip reports are decoded.

use embedded_hal_1::delay::DelayNs;

use crate::bus::{RegisterBus, RfPath};
use crate::ports::DriverPort;
use crate::rates::{DESC_RATE11M, DESC_RATEMCS0};
use crate::{Bandwidth, Rtw8821c, RF_PATH_MAX};

/// RX packet descriptor size in bytes.
pub const RX_PKT_DESC_SZ: usize = 24;

/// Minimum PHY status block size the page parsers touch.
const PHY_STATUS_MIN_SZ: usize = 16;

/// Weakest reportable signal power in dBm.
const MIN_RX_POWER: i8 = -120;

/// Decoded per-frame receive status.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RxPktStat {
    pub pkt_len: u16,
    pub phy_status: bool,
    pub icv_err: bool,
    pub crc_err: bool,
    pub decrypted: bool,
    pub is_c2h: bool,
    /// Driver info area size in bytes.
    pub drv_info_sz: u8,
    pub shift: u8,
    pub rate: u8,
    pub cam_id: u8,
    pub ppdu_cnt: u8,
    pub tsf_low: u32,
    pub rx_power: [i8; RF_PATH_MAX],
    /// Signal strength on the internal 0..=100 scale (not dBm).
    pub rssi: u8,
    pub bw: Bandwidth,
    pub signal_power: i8,
}

fn dword(buf: &[u8], idx: usize) -> u32 {
    let off = idx * 4;
    u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]])
}

fn field(dword: u32, mask: u32) -> u32 {
    (dword & mask) >> mask.trailing_zeros()
}

/// Map a received power level in dBm onto the internal RSSI scale.
fn rf_power_to_rssi(rx_power: &[i8]) -> u8 {
    let power = rx_power.iter().copied().max().unwrap_or(MIN_RX_POWER);
    (power as i16 + 100).clamp(0, 100) as u8
}

impl<B, D, P> Rtw8821c<B, D, P>
where
    B: RegisterBus,
    D: DelayNs,
    P: DriverPort,
{
    /// Parse an RX descriptor and the PHY status block behind it.
    ///
    /// Returns `None` when the buffer is shorter than a descriptor.
    pub fn query_rx_desc(&mut self, rx_desc: &[u8]) -> Option<RxPktStat> {
        if rx_desc.len() < RX_PKT_DESC_SZ {
            return None;
        }

        let d0 = dword(rx_desc, 0);
        let d1 = dword(rx_desc, 1);
        let d2 = dword(rx_desc, 2);
        let d3 = dword(rx_desc, 3);
        let d5 = dword(rx_desc, 5);

        let mut pkt_stat = RxPktStat {
            pkt_len: field(d0, 0x0000_3fff) as u16,
            phy_status: d0 & (1 << 26) != 0,
            icv_err: d0 & (1 << 15) != 0,
            crc_err: d0 & (1 << 14) != 0,
            decrypted: d0 & (1 << 27) == 0,
            is_c2h: d2 & (1 << 28) != 0,
            drv_info_sz: field(d0, 0x000f_0000) as u8,
            shift: field(d0, 0x0300_0000) as u8,
            rate: field(d3, 0x0000_007f) as u8,
            cam_id: field(d1, 0x0000_007f) as u8,
            ppdu_cnt: field(d2, 0x6000_0000) as u8,
            tsf_low: d5,
            rx_power: [MIN_RX_POWER; RF_PATH_MAX],
            rssi: 0,
            bw: Bandwidth::Bw20,
            signal_power: MIN_RX_POWER,
        };

        // drv_info_sz is in units of 8 bytes.
        pkt_stat.drv_info_sz *= 8;

        // Command packets carry no phy status of interest.
        if pkt_stat.is_c2h {
            return Some(pkt_stat);
        }

        let status_off = RX_PKT_DESC_SZ + pkt_stat.shift as usize;
        if pkt_stat.phy_status && rx_desc.len() >= status_off + PHY_STATUS_MIN_SZ {
            let phy_status = &rx_desc[status_off..];
            self.query_phy_status(phy_status, &mut pkt_stat);
        }

        Some(pkt_stat)
    }

    fn query_phy_status(&mut self, phy_status: &[u8], pkt_stat: &mut RxPktStat) {
        let page = phy_status[0] & 0xf;

        match page {
            0 => self.query_phy_status_page0(phy_status, pkt_stat),
            1 => self.query_phy_status_page1(phy_status, pkt_stat),
            _ => warn!("unused phy status page ({})", page),
        }
    }

    /// Page 0: CCK frames.
    fn query_phy_status_page0(&mut self, phy_status: &[u8], pkt_stat: &mut RxPktStat) {
        let pwdb = field(dword(phy_status, 0), 0x0000_ff00) as u8;

        pkt_stat.rx_power[RfPath::A as usize] = pwdb.wrapping_sub(100) as i8;
        pkt_stat.rssi = rf_power_to_rssi(&pkt_stat.rx_power[..1]);
        pkt_stat.bw = Bandwidth::Bw20;
        pkt_stat.signal_power = pkt_stat.rx_power[RfPath::A as usize].max(MIN_RX_POWER);
    }

    /// Page 1: OFDM/HT/VHT frames.
    fn query_phy_status_page1(&mut self, phy_status: &[u8], pkt_stat: &mut RxPktStat) {
        let d0 = dword(phy_status, 0);
        let d1 = dword(phy_status, 1);
        let d3 = dword(phy_status, 3);

        let rxsc = if pkt_stat.rate > DESC_RATE11M && pkt_stat.rate < DESC_RATEMCS0 {
            field(d0, 0x0000_f000) as u8
        } else {
            field(d0, 0x000f_0000) as u8
        };

        pkt_stat.bw = if (1..=8).contains(&rxsc) {
            Bandwidth::Bw20
        } else if (9..=12).contains(&rxsc) {
            Bandwidth::Bw40
        } else if rxsc >= 13 {
            Bandwidth::Bw80
        } else {
            match field(d3, 0x3000_0000) {
                1 => Bandwidth::Bw40,
                2 => Bandwidth::Bw80,
                _ => Bandwidth::Bw20,
            }
        };

        let pwdb_a = field(d1, 0x0000_00ff) as u8;
        pkt_stat.rx_power[RfPath::A as usize] = pwdb_a.wrapping_sub(110) as i8;
        pkt_stat.rssi = rf_power_to_rssi(&pkt_stat.rx_power[..1]);
        pkt_stat.signal_power = pkt_stat.rx_power[RfPath::A as usize].max(MIN_RX_POWER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::test_device;
    use std::vec;

    fn desc_with(d0: u32, d1: u32, d2: u32, d3: u32, d5: u32) -> vec::Vec<u8> {
        let mut desc = vec![0u8; RX_PKT_DESC_SZ];
        desc[0..4].copy_from_slice(&d0.to_le_bytes());
        desc[4..8].copy_from_slice(&d1.to_le_bytes());
        desc[8..12].copy_from_slice(&d2.to_le_bytes());
        desc[12..16].copy_from_slice(&d3.to_le_bytes());
        desc[20..24].copy_from_slice(&d5.to_le_bytes());
        desc
    }

    #[test]
    fn short_buffer_is_rejected() {
        let mut dev = test_device();
        assert!(dev.query_rx_desc(&[0u8; 8]).is_none());
    }

    #[test]
    fn descriptor_fields_decode() {
        let mut dev = test_device();
        // pkt_len 0x5dc, crc error, drv info 2 units, rate 54M.
        let d0 = 0x5dc | (1 << 14) | (2 << 16);
        let desc = desc_with(d0, 0x21, 0, 11, 0xdead_beef);

        let stat = dev.query_rx_desc(&desc).unwrap();
        assert_eq!(stat.pkt_len, 0x5dc);
        assert!(stat.crc_err);
        assert!(!stat.icv_err);
        assert_eq!(stat.drv_info_sz, 16);
        assert_eq!(stat.rate, 11);
        assert_eq!(stat.cam_id, 0x21);
        assert_eq!(stat.tsf_low, 0xdead_beef);
        assert!(stat.decrypted);
    }

    #[test]
    fn page1_rxsc_selects_bandwidth() {
        let mut dev = test_device();
        let d0 = (1 << 26) | 0x40; // phy status present
        let mut desc = desc_with(d0, 0, 0, 20, 0); // HT rate -> ht_rxsc field

        // page 1, ht_rxsc = 10 -> 40 MHz
        let mut status = vec![0u8; PHY_STATUS_MIN_SZ];
        status[0] = 0x1;
        status[2] = 0x0a; // bits 19:16 of dword0
        desc.extend_from_slice(&status);

        let stat = dev.query_rx_desc(&desc).unwrap();
        assert_eq!(stat.bw, Bandwidth::Bw40);
    }

    #[test]
    fn page1_power_converts_to_rssi() {
        let mut dev = test_device();
        let d0 = (1 << 26) | 0x40;
        let mut desc = desc_with(d0, 0, 0, 20, 0);

        let mut status = vec![0u8; PHY_STATUS_MIN_SZ];
        status[0] = 0x1;
        status[4] = 60; // pwdb_a -> power -50 dBm
        desc.extend_from_slice(&status);

        let stat = dev.query_rx_desc(&desc).unwrap();
        assert_eq!(stat.rx_power[0], -50);
        assert_eq!(stat.rssi, 50);
        assert_eq!(stat.signal_power, -50);
    }

    #[test]
    fn c2h_skips_phy_status() {
        let mut dev = test_device();
        let d0 = 1 << 26;
        let d2 = 1 << 28;
        let desc = desc_with(d0, 0, d2, 0, 0);

        let stat = dev.query_rx_desc(&desc).unwrap();
        assert!(stat.is_c2h);
        assert_eq!(stat.rssi, 0);
    }
}
