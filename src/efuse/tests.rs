use super::{EfuseData, Error, TXPWR_IDX_BLOCK_SZ};
use crate::HciType;

fn sample_map() -> std::vec::Vec<u8> {
    let mut map = std::vec![0u8; 512];
    map[0xb8] = 0x20; // channel plan
    map[0xb9] = 0x2a; // crystal cap
    map[0xba] = 0x1c; // thermal meter
    map[0xbc] = 0x01; // pa type
    map[0xbd] = 0x02; // lna 2g
    map[0xbf] = 0x03; // lna 5g
    map[0xc4] = 0xad; // board option, regd = 0x5
    map[0xc6] = 0x11; // bt setting
    map[0xc9] = 0x06; // bb swing 2g
    map[0xca] = 0x09; // bb swing 5g
    map[0xcb] = 0x00; // calibrate rate, thermal tracking
    map[0xcd] = 0x02; // rfe option
    map[0xce] = b'D';
    map[0xcf] = b'E';
    map[0xd0..0xd6].copy_from_slice(&[0x00, 0xe0, 0x4c, 0x12, 0x34, 0x56]);
    for i in 0..4 {
        map[0x10 + i * TXPWR_IDX_BLOCK_SZ] = 0x30 + i as u8;
    }
    map
}

#[test]
fn decode_pcie_map() {
    let map = sample_map();
    let data = EfuseData::decode(&map, HciType::Pcie).unwrap();

    assert_eq!(data.channel_plan, 0x20);
    assert_eq!(data.crystal_cap, 0x2a);
    assert_eq!(data.thermal_meter, 0x1c);
    assert_eq!(data.thermal_meter_k, 0x1c);
    assert_eq!(data.rf_board_option, 0xad);
    assert_eq!(data.regd, 0x5);
    assert_eq!(data.tx_bb_swing_setting_2g, 0x06);
    assert_eq!(data.tx_bb_swing_setting_5g, 0x09);
    assert_eq!(data.power_track_type, 0);
    assert_eq!(data.rfe_option, 0x02);
    assert_eq!(data.country_code, [b'D', b'E']);
    assert_eq!(data.addr, [0x00, 0xe0, 0x4c, 0x12, 0x34, 0x56]);
    assert_eq!(data.txpwr_idx_table[2][0], 0x32);
}

#[test]
fn bb_swing_setting_follows_band() {
    let data = EfuseData::decode(&sample_map(), HciType::Pcie).unwrap();
    assert_eq!(data.tx_bb_swing_setting(1), 0x06);
    assert_eq!(data.tx_bb_swing_setting(14), 0x06);
    assert_eq!(data.tx_bb_swing_setting(36), 0x09);
}

#[test]
fn non_pcie_transport_is_rejected() {
    let map = sample_map();
    assert_eq!(
        EfuseData::decode(&map, HciType::Usb),
        Err(Error::NotSupported { hci: HciType::Usb })
    );
    assert_eq!(
        EfuseData::decode(&map, HciType::Sdio),
        Err(Error::NotSupported { hci: HciType::Sdio })
    );
}

#[test]
fn short_map_is_rejected() {
    let map = std::vec![0u8; 0x40];
    assert_eq!(
        EfuseData::decode(&map, HciType::Pcie),
        Err(Error::MapTooShort { len: 0x40 })
    );
}
