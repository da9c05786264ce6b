//! Logical efuse map decoding.
//!
//! The efuse holds per-unit factory calibration and board description
//! bytes at fixed offsets in the logical map. Decoding caches everything
//! the control logic consumes later: thermal calibration, bb-swing
//! settings, board/RFE options and the regulatory domain. The per-path
//! power-index blocks are kept opaque; the regulatory power core owns
//! their layout.

use crate::HciType;

/// Offset of the first per-path power-index block.
const TXPWR_IDX_TABLE: usize = 0x10;
/// Size of one per-path power-index block.
pub const TXPWR_IDX_BLOCK_SZ: usize = 0x2a;

const CHANNEL_PLAN: usize = 0xb8;
const XTAL_K: usize = 0xb9;
const THERMAL_METER: usize = 0xba;
const PA_TYPE: usize = 0xbc;
const LNA_TYPE_2G: usize = 0xbd;
const LNA_TYPE_5G: usize = 0xbf;
const RF_BOARD_OPTION: usize = 0xc4;
const RF_BT_SETTING: usize = 0xc6;
const TX_BB_SWING_SETTING_2G: usize = 0xc9;
const TX_BB_SWING_SETTING_5G: usize = 0xca;
const TX_PWR_CALIBRATE_RATE: usize = 0xcb;
const RFE_OPTION: usize = 0xcd;
const COUNTRY_CODE: usize = 0xce;
/// Start of the host-interface specific region (MAC address for PCIe).
const PCIE_MAC_ADDR: usize = 0xd0;

const MAP_MIN_LEN: usize = PCIE_MAC_ADDR + 6;

/// Thermal calibration byte value meaning "not calibrated".
pub const THERMAL_UNCALIBRATED: u8 = 0xff;

/// Efuse decode error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// The logical map is shorter than the decoded region.
    MapTooShort { len: usize },
    /// This chip variant does not support the requested host interface.
    NotSupported { hci: HciType },
}

/// Decoded efuse configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EfuseData {
    pub rfe_option: u8,
    pub rf_board_option: u8,
    pub crystal_cap: u8,
    pub pa_type_2g: u8,
    pub pa_type_5g: u8,
    pub lna_type_2g: u8,
    pub lna_type_5g: u8,
    pub channel_plan: u8,
    pub country_code: [u8; 2],
    pub bt_setting: u8,
    /// Regulatory domain, low 3 bits of the board option.
    pub regd: u8,
    pub thermal_meter: u8,
    pub thermal_meter_k: u8,
    /// 0 selects thermal-based power tracking; other values disable it.
    pub power_track_type: u8,
    pub tx_bb_swing_setting_2g: u8,
    pub tx_bb_swing_setting_5g: u8,
    /// Opaque per-path base power blocks for the regulatory power core.
    pub txpwr_idx_table: [[u8; TXPWR_IDX_BLOCK_SZ]; 4],
    /// Device MAC address (host-interface region).
    pub addr: [u8; 6],
}

impl Default for EfuseData {
    fn default() -> Self {
        Self {
            rfe_option: 0,
            rf_board_option: 0,
            crystal_cap: 0,
            pa_type_2g: 0,
            pa_type_5g: 0,
            lna_type_2g: 0,
            lna_type_5g: 0,
            channel_plan: 0,
            country_code: [0; 2],
            bt_setting: 0,
            regd: 0,
            thermal_meter: THERMAL_UNCALIBRATED,
            thermal_meter_k: THERMAL_UNCALIBRATED,
            power_track_type: 0,
            tx_bb_swing_setting_2g: 0,
            tx_bb_swing_setting_5g: 0,
            txpwr_idx_table: [[0; TXPWR_IDX_BLOCK_SZ]; 4],
            addr: [0; 6],
        }
    }
}

impl EfuseData {
    /// Decode the logical efuse map for the given host interface.
    ///
    /// Only the PCIe variant of this chip is supported; other transports
    /// yield [`Error::NotSupported`] and the device must not be brought up.
    pub fn decode(log_map: &[u8], hci: HciType) -> Result<Self, Error> {
        if log_map.len() < MAP_MIN_LEN {
            return Err(Error::MapTooShort { len: log_map.len() });
        }

        let mut data = Self {
            rfe_option: log_map[RFE_OPTION],
            rf_board_option: log_map[RF_BOARD_OPTION],
            crystal_cap: log_map[XTAL_K],
            pa_type_2g: log_map[PA_TYPE],
            pa_type_5g: log_map[PA_TYPE],
            lna_type_2g: log_map[LNA_TYPE_2G],
            lna_type_5g: log_map[LNA_TYPE_5G],
            channel_plan: log_map[CHANNEL_PLAN],
            country_code: [log_map[COUNTRY_CODE], log_map[COUNTRY_CODE + 1]],
            bt_setting: log_map[RF_BT_SETTING],
            regd: log_map[RF_BOARD_OPTION] & 0x7,
            thermal_meter: log_map[THERMAL_METER],
            thermal_meter_k: log_map[THERMAL_METER],
            power_track_type: log_map[TX_PWR_CALIBRATE_RATE] >> 4,
            tx_bb_swing_setting_2g: log_map[TX_BB_SWING_SETTING_2G],
            tx_bb_swing_setting_5g: log_map[TX_BB_SWING_SETTING_5G],
            txpwr_idx_table: [[0; TXPWR_IDX_BLOCK_SZ]; 4],
            addr: [0; 6],
        };

        for (i, block) in data.txpwr_idx_table.iter_mut().enumerate() {
            let base = TXPWR_IDX_TABLE + i * TXPWR_IDX_BLOCK_SZ;
            block.copy_from_slice(&log_map[base..base + TXPWR_IDX_BLOCK_SZ]);
        }

        match hci {
            HciType::Pcie => {
                data.addr
                    .copy_from_slice(&log_map[PCIE_MAC_ADDR..PCIE_MAC_ADDR + 6]);
            }
            _ => return Err(Error::NotSupported { hci }),
        }

        Ok(data)
    }

    /// The bb-swing setting for the band `channel` belongs to.
    pub fn tx_bb_swing_setting(&self, channel: u8) -> u8 {
        if channel <= 14 {
            self.tx_bb_swing_setting_2g
        } else {
            self.tx_bb_swing_setting_5g
        }
    }
}

#[cfg(test)]
mod tests;
