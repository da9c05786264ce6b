//! Capability interfaces between the chip and the owning driver core.
//!
//! The generic driver core drives the chip through [`ChipOps`]; the chip
//! calls back into the core through [`DriverPort`]. Both are selected at
//! device-construction time, so one core binary can carry several chip
//! variants without any call-time dispatch tables.

use crate::bus::RfPath;
use crate::rx::RxPktStat;
use crate::{Bandwidth, efuse};

/// Firmware IQ calibration request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IqkParameters {
    /// Discard the previous calibration result before calibrating.
    pub clear: bool,
    /// Split the calibration into segments to bound airtime impact while
    /// associated.
    pub segment_iqk: bool,
}

/// Beamformee session role.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BfeeRole {
    None,
    Su,
    Mu,
}

/// Services the owning driver core provides to the chip.
pub trait DriverPort {
    /// Program the static BB/AGC/RF register tables.
    fn load_phy_tables(&mut self);

    /// Generic beamforming PHY bring-up.
    fn bf_phy_init(&mut self);

    /// Enable or tear down a single-user beamformee session.
    fn config_bfee_su(&mut self, enable: bool);

    /// Enable or tear down a multi-user beamformee session.
    fn config_bfee_mu(&mut self, enable: bool);

    /// MAC-layer channel bookkeeping for a channel switch.
    fn set_channel_mac(&mut self, channel: u8, bw: Bandwidth, primary_ch_idx: u8);

    /// Dispatch an IQ calibration request to the firmware.
    fn fw_do_iqk(&mut self, para: IqkParameters);

    /// Whether the device is currently associated to a network.
    fn is_associated(&self) -> bool;

    /// Regulatory per-rate target TX power index for the current
    /// configuration.
    fn tx_power_index(
        &self,
        path: RfPath,
        rate: u8,
        bw: Bandwidth,
        channel: u8,
        regd: u8,
    ) -> u8;
}

/// Chip-variant operations the generic driver core calls.
pub trait ChipOps {
    /// Decode the logical efuse map into the device configuration.
    fn read_efuse(&mut self, log_map: &[u8]) -> Result<(), efuse::Error>;

    /// Bring up the BB/RF domain and program the PHY parameters.
    fn phy_set_param(&mut self);

    /// Program the MAC protocol configuration.
    fn mac_init(&mut self);

    /// Switch to `channel` with the given bandwidth and primary subchannel.
    fn set_channel(&mut self, channel: u8, bw: Bandwidth, primary_ch_idx: u8);

    /// Program the per-rate TX power indexes from the power table.
    fn set_tx_power_index(&mut self);

    /// One tick of false-alarm/CCA/CRC statistics collection.
    fn false_alarm_statistics(&mut self);

    /// Run a full PHY calibration (IQK).
    fn phy_calibration(&mut self);

    /// One tick of the thermal TX power tracking state machine.
    fn pwr_track(&mut self);

    /// Select a CCK packet-detection sensitivity level.
    fn cck_pd_set(&mut self, new_lvl: u8);

    /// Switch the LDO25 regulator.
    fn cfg_ldo25(&mut self, enable: bool);

    /// Configure a beamformee session for the given role.
    fn config_bfee(&mut self, role: BfeeRole, enable: bool);

    /// Parse an RX descriptor and its trailing PHY status.
    fn query_rx_desc(&mut self, rx_desc: &[u8]) -> Option<RxPktStat>;
}
