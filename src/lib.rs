#![no_std]
#![doc = include_str!("../README.md")]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

#[cfg(test)]
extern crate std;

pub mod bus;
pub mod efuse;
pub mod mac;
pub mod phy;
pub mod ports;
pub mod rates;
pub mod regs;
pub mod rx;
pub mod tables;

#[cfg(test)]
pub(crate) mod mock;

use embedded_hal_1::delay::DelayNs;

use crate::bus::{RegisterBus, RfPath};
use crate::efuse::EfuseData;
use crate::phy::iqk::IqkStatus;
use crate::phy::pwrtrack::EwmaThermal;
use crate::ports::DriverPort;
use crate::rates::DESC_RATE_NUM;

pub use crate::ports::{BfeeRole, ChipOps, IqkParameters};

/// Highest programmable TX power index.
pub const MAX_POWER_INDEX: u8 = 0x3f;

/// State arrays are sized for both paths even though only path A is driven.
pub const RF_PATH_MAX: usize = 2;

pub(crate) const CCK_PD_BW_NUM: usize = 2;

/// Host interface the chip is attached through.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HciType {
    Pcie,
    Usb,
    Sdio,
}

/// Channel bandwidth.
///
/// Discriminants follow the firmware bandwidth encoding; the 40/80 MHz
/// values are folded directly into the ADC clock register.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Bandwidth {
    Bw20 = 0,
    Bw40 = 1,
    Bw80 = 2,
    Bw5 = 5,
    Bw10 = 6,
}

/// Filter coefficient words captured from hardware before any
/// channel-specific override, replayed on 2.4 GHz channels whose
/// coefficients are defined by reference.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelParams {
    pub tx_sf2: u32,
    pub tx_sf6: u32,
    pub tx_filter: u32,
}

/// Current radio configuration and the per-rate power table the owning
/// driver fills in before `set_tx_power_index`.
pub struct HalState {
    pub current_channel: u8,
    pub current_band_width: Bandwidth,
    pub current_primary_idx: u8,
    pub(crate) tx_pwr_tbl: [[u8; DESC_RATE_NUM]; RF_PATH_MAX],
}

impl HalState {
    fn new() -> Self {
        Self {
            current_channel: 1,
            current_band_width: Bandwidth::Bw20,
            current_primary_idx: 0,
            tx_pwr_tbl: [[0; DESC_RATE_NUM]; RF_PATH_MAX],
        }
    }
}

/// Dynamic mechanism state, owned by the device context and mutated only
/// by the tracking tick and the channel configurator.
pub struct DmInfo {
    // Thermal TX power tracking.
    pub(crate) default_ofdm_index: u8,
    pub(crate) delta_power_index: [i8; RF_PATH_MAX],
    pub(crate) delta_power_index_last: [i8; RF_PATH_MAX],
    pub(crate) thermal_meter_k: u8,
    pub(crate) thermal_meter_lck: u8,
    pub(crate) avg_thermal: [EwmaThermal; RF_PATH_MAX],
    pub(crate) thermal_avg: [u8; RF_PATH_MAX],
    pub(crate) pwr_trk_triggered: bool,
    pub(crate) pwr_trk_init_trigger: bool,
    pub(crate) tx_rate: u8,
    pub(crate) min_rssi: u8,

    // CCK packet detection.
    pub(crate) cck_pd_default: u8,
    pub(crate) cck_pd_lv: [[u8; RF_PATH_MAX]; CCK_PD_BW_NUM],
    pub(crate) cck_fa_avg: u32,

    // Per-tick statistics snapshot.
    pub cck_fa_cnt: u32,
    pub ofdm_fa_cnt: u32,
    pub total_fa_cnt: u32,
    pub cck_ok_cnt: u32,
    pub cck_err_cnt: u32,
    pub ofdm_ok_cnt: u32,
    pub ofdm_err_cnt: u32,
    pub ht_ok_cnt: u32,
    pub ht_err_cnt: u32,
    pub vht_ok_cnt: u32,
    pub vht_err_cnt: u32,
    pub cck_cca_cnt: u32,
    pub ofdm_cca_cnt: u32,
    pub total_cca_cnt: u32,

    /// Diagnostics of the most recent IQ calibration.
    pub iqk: IqkStatus,
}

impl DmInfo {
    fn new() -> Self {
        Self {
            default_ofdm_index: 0,
            delta_power_index: [0; RF_PATH_MAX],
            delta_power_index_last: [0; RF_PATH_MAX],
            thermal_meter_k: 0,
            thermal_meter_lck: 0,
            avg_thermal: [EwmaThermal::new(); RF_PATH_MAX],
            thermal_avg: [0; RF_PATH_MAX],
            pwr_trk_triggered: false,
            pwr_trk_init_trigger: false,
            tx_rate: 0,
            min_rssi: 0,
            cck_pd_default: 0,
            cck_pd_lv: [[0; RF_PATH_MAX]; CCK_PD_BW_NUM],
            cck_fa_avg: 0,
            cck_fa_cnt: 0,
            ofdm_fa_cnt: 0,
            total_fa_cnt: 0,
            cck_ok_cnt: 0,
            cck_err_cnt: 0,
            ofdm_ok_cnt: 0,
            ofdm_err_cnt: 0,
            ht_ok_cnt: 0,
            ht_err_cnt: 0,
            vht_ok_cnt: 0,
            vht_err_cnt: 0,
            cck_cca_cnt: 0,
            ofdm_cca_cnt: 0,
            total_cca_cnt: 0,
            iqk: IqkStatus::new(),
        }
    }
}

/// Device context for one chip instance.
///
/// Owns all mutable calibration state; the bus, delay and driver-core
/// capabilities are supplied at construction. The caller must serialize
/// channel changes against tracking ticks for the same device — a channel
/// change re-initializes the tracking baseline.
pub struct Rtw8821c<B, D, P> {
    pub(crate) bus: B,
    pub(crate) delay: D,
    pub(crate) port: P,
    pub(crate) hci: HciType,
    pub(crate) efuse: EfuseData,
    pub(crate) dm: DmInfo,
    pub(crate) hal: HalState,
    pub(crate) ch_params: Option<ChannelParams>,
}

impl<B, D, P> Rtw8821c<B, D, P>
where
    B: RegisterBus,
    D: DelayNs,
    P: DriverPort,
{
    /// Create a device context over the given capabilities.
    pub fn new(bus: B, delay: D, port: P, hci: HciType) -> Self {
        Self {
            bus,
            delay,
            port,
            hci,
            efuse: EfuseData::default(),
            dm: DmInfo::new(),
            hal: HalState::new(),
            ch_params: None,
        }
    }

    /// Dynamic mechanism state.
    pub fn dm_info(&self) -> &DmInfo {
        &self.dm
    }

    /// Decoded efuse configuration.
    pub fn efuse(&self) -> &EfuseData {
        &self.efuse
    }

    /// Current radio configuration.
    pub fn hal(&self) -> &HalState {
        &self.hal
    }

    /// Update the RSSI estimate the CCK detection threshold logic keys on.
    pub fn set_min_rssi(&mut self, min_rssi: u8) {
        self.dm.min_rssi = min_rssi;
    }

    /// Update the current TX rate used for the power-tracking target lookup.
    pub fn set_tx_rate(&mut self, tx_rate: u8) {
        self.dm.tx_rate = tx_rate;
    }

    /// Fill one per-rate entry of the TX power table.
    pub fn set_tx_power_entry(&mut self, path: RfPath, rate: u8, index: u8) {
        if let Some(entry) = self.hal.tx_pwr_tbl[path as usize].get_mut(rate as usize) {
            *entry = index;
        }
    }

    /// Release the capabilities.
    pub fn free(self) -> (B, D, P) {
        (self.bus, self.delay, self.port)
    }
}

impl<B, D, P> ChipOps for Rtw8821c<B, D, P>
where
    B: RegisterBus,
    D: DelayNs,
    P: DriverPort,
{
    fn read_efuse(&mut self, log_map: &[u8]) -> Result<(), efuse::Error> {
        self.efuse = EfuseData::decode(log_map, self.hci)?;
        Ok(())
    }

    fn phy_set_param(&mut self) {
        Rtw8821c::phy_set_param(self)
    }

    fn mac_init(&mut self) {
        Rtw8821c::mac_init(self)
    }

    fn set_channel(&mut self, channel: u8, bw: Bandwidth, primary_ch_idx: u8) {
        Rtw8821c::set_channel(self, channel, bw, primary_ch_idx)
    }

    fn set_tx_power_index(&mut self) {
        Rtw8821c::set_tx_power_index(self)
    }

    fn false_alarm_statistics(&mut self) {
        Rtw8821c::false_alarm_statistics(self)
    }

    fn phy_calibration(&mut self) {
        Rtw8821c::phy_calibration(self)
    }

    fn pwr_track(&mut self) {
        Rtw8821c::pwr_track(self)
    }

    fn cck_pd_set(&mut self, new_lvl: u8) {
        Rtw8821c::cck_pd_set(self, new_lvl)
    }

    fn cfg_ldo25(&mut self, enable: bool) {
        Rtw8821c::cfg_ldo25(self, enable)
    }

    fn config_bfee(&mut self, role: BfeeRole, enable: bool) {
        Rtw8821c::config_bfee(self, role, enable)
    }

    fn query_rx_desc(&mut self, rx_desc: &[u8]) -> Option<rx::RxPktStat> {
        Rtw8821c::query_rx_desc(self, rx_desc)
    }
}
