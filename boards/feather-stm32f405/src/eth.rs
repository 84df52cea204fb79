#![deny(unsafe_code)]
//! W5500 Ethernet bring-up

use defmt::{error, info};
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice as SpiDeviceBus;
use embassy_net_wiznet::chip::W5500;
use embassy_net_wiznet::{Device, Runner};
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Output;
use embassy_stm32::mode::Async;
use embassy_stm32::spi::Spi;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use static_cell::StaticCell;

use crate::network::NetworkError;

type SpiBus = Mutex<CriticalSectionRawMutex, Spi<'static, Async>>;

/// Driver runner; must be polled continuously for the device to work
pub type W5500Runner = Runner<
    'static,
    W5500,
    SpiDeviceBus<'static, CriticalSectionRawMutex, Spi<'static, Async>, Output<'static>>,
    ExtiInput<'static>,
    Output<'static>,
>;

/// Ethernet peripherals bundle
pub struct EthPeripherals {
    pub spi: Spi<'static, Async>,
    pub cs: Output<'static>,
    pub reset: Output<'static>,
    pub int: ExtiInput<'static>,
}

/// Reset the W5500 and hand back the embassy-net device and its runner
///
/// May only be called once: the SPI bus and driver state are static.
pub async fn init_w5500(
    periph: EthPeripherals,
    mac_addr: [u8; 6],
) -> Result<(Device<'static>, W5500Runner), NetworkError> {
    let EthPeripherals {
        spi,
        cs,
        mut reset,
        int,
    } = periph;

    info!("Performing W5500 hardware reset...");
    reset.set_low();
    embassy_time::Timer::after_millis(1).await;
    reset.set_high();
    embassy_time::Timer::after_millis(2).await;

    static SPI_BUS: StaticCell<SpiBus> = StaticCell::new();
    let spi_device = SpiDeviceBus::new(SPI_BUS.init(Mutex::new(spi)), cs);

    info!(
        "MAC address: {:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
        mac_addr[0], mac_addr[1], mac_addr[2], mac_addr[3], mac_addr[4], mac_addr[5]
    );

    static STATE: StaticCell<embassy_net_wiznet::State<8, 8>> = StaticCell::new();
    let state = STATE.init(embassy_net_wiznet::State::<8, 8>::new());

    let (device, runner) = embassy_net_wiznet::new(mac_addr, state, spi_device, int, reset)
        .await
        .map_err(|_| {
            error!("W5500 did not respond");
            NetworkError::ChipInitFailed
        })?;

    info!("W5500 initialized");
    Ok((device, runner))
}
