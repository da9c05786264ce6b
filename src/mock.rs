//! In-memory capability doubles for host-run unit tests.

use std::collections::BTreeMap;
use std::vec::Vec;

use crate::bus::{RegisterBus, RfPath};
use crate::ports::{DriverPort, IqkParameters};
use crate::{Bandwidth, HciType, Rtw8821c};

/// One recorded bus write.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WriteOp {
    W8(u32, u8),
    W16(u32, u16),
    W32(u32, u32),
    Rf(u8, u8, u32, u32),
}

/// Byte-addressed register memory recording every write.
pub struct MockBus {
    mem: BTreeMap<u32, u8>,
    rf: BTreeMap<(u8, u8), u32>,
    pub writes: Vec<WriteOp>,
}

impl MockBus {
    pub fn new() -> Self {
        Self {
            mem: BTreeMap::new(),
            rf: BTreeMap::new(),
            writes: Vec::new(),
        }
    }

    pub fn set_reg32(&mut self, addr: u32, value: u32) {
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.mem.insert(addr + i as u32, *b);
        }
    }

    pub fn set_rf(&mut self, path: RfPath, reg: u8, value: u32) {
        self.rf.insert((path as u8, reg), value);
    }

    pub fn rf_reg(&self, path: RfPath, reg: u8) -> u32 {
        self.rf.get(&(path as u8, reg)).copied().unwrap_or(0)
    }

    pub fn reg32(&mut self, addr: u32) -> u32 {
        self.read32(addr)
    }

    pub fn write_count(&self) -> usize {
        self.writes.len()
    }
}

impl RegisterBus for MockBus {
    fn read8(&mut self, addr: u32) -> u8 {
        self.mem.get(&addr).copied().unwrap_or(0)
    }

    fn read16(&mut self, addr: u32) -> u16 {
        u16::from_le_bytes([self.read8(addr), self.read8(addr + 1)])
    }

    fn read32(&mut self, addr: u32) -> u32 {
        u32::from_le_bytes([
            self.read8(addr),
            self.read8(addr + 1),
            self.read8(addr + 2),
            self.read8(addr + 3),
        ])
    }

    fn write8(&mut self, addr: u32, value: u8) {
        self.writes.push(WriteOp::W8(addr, value));
        self.mem.insert(addr, value);
    }

    fn write16(&mut self, addr: u32, value: u16) {
        self.writes.push(WriteOp::W16(addr, value));
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.mem.insert(addr + i as u32, *b);
        }
    }

    fn write32(&mut self, addr: u32, value: u32) {
        self.writes.push(WriteOp::W32(addr, value));
        for (i, b) in value.to_le_bytes().iter().enumerate() {
            self.mem.insert(addr + i as u32, *b);
        }
    }

    fn read_rf(&mut self, path: RfPath, reg: u8, mask: u32) -> u32 {
        let raw = self.rf.get(&(path as u8, reg)).copied().unwrap_or(0);
        (raw & mask) >> mask.trailing_zeros()
    }

    fn write_rf(&mut self, path: RfPath, reg: u8, mask: u32, value: u32) {
        self.writes.push(WriteOp::Rf(path as u8, reg, mask, value));
        let shift = mask.trailing_zeros();
        let raw = self.rf.get(&(path as u8, reg)).copied().unwrap_or(0);
        self.rf
            .insert((path as u8, reg), (raw & !mask) | ((value << shift) & mask));
    }
}

/// Delay double counting the time that would have been spent.
pub struct MockDelay {
    pub slept_ns: u64,
}

impl MockDelay {
    pub fn new() -> Self {
        Self { slept_ns: 0 }
    }
}

impl embedded_hal_1::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.slept_ns += ns as u64;
    }
}

/// Driver-core double recording delegated calls.
pub struct MockPort {
    pub associated: bool,
    pub target_power: u8,
    pub phy_tables_loaded: usize,
    pub bf_phy_inits: usize,
    pub bfee_su_calls: Vec<bool>,
    pub bfee_mu_calls: Vec<bool>,
    pub mac_channel_calls: Vec<(u8, Bandwidth, u8)>,
    pub iqk_requests: Vec<IqkParameters>,
}

impl MockPort {
    pub fn new() -> Self {
        Self {
            associated: false,
            target_power: 0x20,
            phy_tables_loaded: 0,
            bf_phy_inits: 0,
            bfee_su_calls: Vec::new(),
            bfee_mu_calls: Vec::new(),
            mac_channel_calls: Vec::new(),
            iqk_requests: Vec::new(),
        }
    }
}

impl DriverPort for MockPort {
    fn load_phy_tables(&mut self) {
        self.phy_tables_loaded += 1;
    }

    fn bf_phy_init(&mut self) {
        self.bf_phy_inits += 1;
    }

    fn config_bfee_su(&mut self, enable: bool) {
        self.bfee_su_calls.push(enable);
    }

    fn config_bfee_mu(&mut self, enable: bool) {
        self.bfee_mu_calls.push(enable);
    }

    fn set_channel_mac(&mut self, channel: u8, bw: Bandwidth, primary_ch_idx: u8) {
        self.mac_channel_calls.push((channel, bw, primary_ch_idx));
    }

    fn fw_do_iqk(&mut self, para: IqkParameters) {
        self.iqk_requests.push(para);
    }

    fn is_associated(&self) -> bool {
        self.associated
    }

    fn tx_power_index(
        &self,
        _path: RfPath,
        _rate: u8,
        _bw: Bandwidth,
        _channel: u8,
        _regd: u8,
    ) -> u8 {
        self.target_power
    }
}

/// A device over fresh mocks.
pub fn test_device() -> Rtw8821c<MockBus, MockDelay, MockPort> {
    Rtw8821c::new(MockBus::new(), MockDelay::new(), MockPort::new(), HciType::Pcie)
}
