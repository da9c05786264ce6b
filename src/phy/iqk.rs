//! Firmware-driven IQ calibration.
//!
//! The calibration itself runs in firmware; this side dispatches the
//! request and waits for the completion sentinel in the RF debug register.
//! The wait is a bounded poll — on timeout the TX power loop keeps running
//! on the stale calibration rather than blocking indefinitely, so the
//! outcome is recorded as diagnostics only.

use embedded_hal_1::delay::DelayNs;

use crate::bus::{RegisterBus, RfPath, RFREG_MASK};
use crate::ports::{DriverPort, IqkParameters};
use crate::regs::{bit, REG_IQKFAILMSK, RF_DTXLOK};

/// Firmware writes this into the RF debug register when done.
const FW_IQK_DONE: u32 = 0xabcde;

const IQK_POLL_MAX: u32 = 300;
const IQK_POLL_INTERVAL_MS: u32 = 20;

/// Diagnostics of the most recent IQ calibration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IqkStatus {
    /// Calibrations run since device construction.
    pub count: u32,
    /// Firmware reloaded a previous result instead of recalibrating.
    pub reload: bool,
    /// Per-step failure bitmask reported by firmware.
    pub fail_mask: u8,
    /// The completion sentinel never appeared.
    pub timed_out: bool,
}

impl IqkStatus {
    pub(crate) const fn new() -> Self {
        Self {
            count: 0,
            reload: false,
            fail_mask: 0,
            timed_out: false,
        }
    }
}

struct PollTimedOut;

impl<B, D, P> crate::Rtw8821c<B, D, P>
where
    B: RegisterBus,
    D: DelayNs,
    P: DriverPort,
{
    /// Run one IQ calibration and record its outcome.
    pub fn do_iqk(&mut self) {
        let mut para = IqkParameters::default();

        if self.port.is_associated() {
            para.segment_iqk = true;
        }

        self.port.fw_do_iqk(para);

        let poll = self.wait_fw_iqk_done();
        self.bus.write_rf(RfPath::A, RF_DTXLOK, RFREG_MASK, 0x0);

        let reload = self.bus.read32_mask(REG_IQKFAILMSK, bit(16)) != 0;
        let fail_mask = self.bus.read32_mask(REG_IQKFAILMSK, 0xff) as u8;

        self.dm.iqk.count = self.dm.iqk.count.wrapping_add(1);
        self.dm.iqk.reload = reload;
        self.dm.iqk.fail_mask = fail_mask;
        self.dm.iqk.timed_out = poll.is_err();

        match poll {
            Ok(counter) => debug!(
                "iqk counter={} reload={} do_iqk_cnt={} n_iqk_fail(mask)=0x{:02x}",
                counter, reload, self.dm.iqk.count, fail_mask
            ),
            Err(PollTimedOut) => warn!(
                "iqk completion not reported, keeping previous calibration (cnt={})",
                self.dm.iqk.count
            ),
        }
    }

    /// Run a full PHY calibration.
    pub fn phy_calibration(&mut self) {
        self.do_iqk();
    }

    /// Poll for the firmware completion sentinel, bounded to roughly six
    /// seconds worst case.
    fn wait_fw_iqk_done(&mut self) -> Result<u32, PollTimedOut> {
        for counter in 0..IQK_POLL_MAX {
            let rf_reg = self.bus.read_rf(RfPath::A, RF_DTXLOK, RFREG_MASK);
            if rf_reg == FW_IQK_DONE {
                return Ok(counter);
            }
            self.delay.delay_ms(IQK_POLL_INTERVAL_MS);
        }

        Err(PollTimedOut)
    }
}
