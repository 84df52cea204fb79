#![deny(unsafe_code)]
#![no_main]
#![no_std]

use defmt_rtt as _; // global logger
use panic_probe as _;
use rtic::app;
use rtic_monotonics::stm32::prelude::*;

mod device_id;
mod eth;
mod network;
mod pixels;
mod rtc;

stm32_tim2_monotonic!(Mono, 1_000_000);

/// Pause between main loop passes
const LOOP_PACING_MS: u64 = 10;
/// Sync retry interval while the time has never been set
const UNSYNCED_RETRY_MS: u64 = 60_000;

#[app(device = embassy_stm32, peripherals = true, dispatchers = [USART1, USART2])]
mod app {
    use super::*;
    use defmt::{info, warn};
    use embassy_futures::join::join3;
    use embassy_stm32::exti::ExtiInput;
    use embassy_stm32::gpio::{Level, Output, Pull, Speed};
    use embassy_stm32::peripherals;
    use embassy_stm32::rcc::{Hse, HseMode, LsConfig, LseConfig, LseMode};
    use embassy_stm32::rtc::{Rtc, RtcConfig};
    use embassy_stm32::spi::{self, Spi};
    use embassy_stm32::time::Hertz;
    use embassy_time::{block_for, Duration};
    use ring_clock_core::{ClockConfig, ClockController, HardwareClock, TickFlag};
    use static_cell::StaticCell;

    use network::{manager, NetworkConfig, SntpClient, SntpTimeSource, TimeExchange};
    use pixels::RingPixels;
    use rtc::FeatherRtc;

    type Peri<T> = embassy_stm32::Peri<'static, T>;

    struct NetworkPeripherals {
        spi: Peri<peripherals::SPI2>,
        sck: Peri<peripherals::PB13>,
        mosi: Peri<peripherals::PB15>,
        miso: Peri<peripherals::PB14>,
        cs: Peri<peripherals::PC6>,
        reset: Peri<peripherals::PC3>,
        int: Peri<peripherals::PC2>,
        exti: Peri<peripherals::EXTI2>,
        dma_tx: Peri<peripherals::DMA1_CH4>,
        dma_rx: Peri<peripherals::DMA1_CH3>,
    }

    #[shared]
    struct Shared {}

    #[local]
    struct Local {
        tick: &'static TickFlag,
        controller: ClockController<'static, FeatherRtc>,
        pixels: RingPixels,
        source: SntpTimeSource,
    }

    #[init]
    fn init(_cx: init::Context) -> (Shared, Local) {
        info!("Ring clock starting...");

        // Adafruit Feather STM32F405: 12 MHz HSE, 32.768 kHz LSE (PC14/PC15)
        let mut config = embassy_stm32::Config::default();
        config.rcc.hse = Some(Hse {
            freq: Hertz(12_000_000),
            mode: HseMode::Oscillator,
        });

        // 12 MHz / 6 * 168 / 4 = 84 MHz SYSCLK
        config.rcc.pll_src = embassy_stm32::rcc::PllSource::HSE;
        config.rcc.pll = Some(embassy_stm32::rcc::Pll {
            prediv: embassy_stm32::rcc::PllPreDiv::DIV6,
            mul: embassy_stm32::rcc::PllMul::MUL168,
            divp: Some(embassy_stm32::rcc::PllPDiv::DIV4),
            divq: Some(embassy_stm32::rcc::PllQDiv::DIV7),
            divr: None,
        });
        config.rcc.sys = embassy_stm32::rcc::Sysclk::PLL1_P;
        config.rcc.ahb_pre = embassy_stm32::rcc::AHBPrescaler::DIV1; // 84 MHz
        config.rcc.apb1_pre = embassy_stm32::rcc::APBPrescaler::DIV2; // 42 MHz
        config.rcc.apb2_pre = embassy_stm32::rcc::APBPrescaler::DIV1; // 84 MHz

        // The RTC runs from the LSE so it keeps time on VBAT
        config.rcc.ls = LsConfig {
            rtc: embassy_stm32::rcc::RtcClockSource::LSE,
            lsi: false,
            lse: Some(LseConfig {
                frequency: Hertz(32_768),
                mode: LseMode::Oscillator(embassy_stm32::rcc::LseDrive::MediumHigh),
            }),
        };

        let p = embassy_stm32::init(config);
        info!("Device UID: {}", device_id::uid_hex());

        // TIM2 on APB1: timer clock = 2 * APB1 = 84 MHz
        Mono::start(84_000_000);

        static TICK: StaticCell<TickFlag> = StaticCell::new();
        let tick: &'static TickFlag = TICK.init(TickFlag::new());

        let rtc = FeatherRtc::new(Rtc::new(p.RTC, RtcConfig::default()));
        let clock = match HardwareClock::begin(rtc, tick) {
            Ok(clock) => clock,
            Err(e) => defmt::panic!("RTC startup failed: {}", e),
        };
        let controller = ClockController::new(clock, ClockConfig::default());

        // WS2812 data on MOSI only: minute ring on PA7, hour ring on PB5
        let mut led_spi_config = spi::Config::default();
        led_spi_config.frequency = pixels::LED_SPI_FREQUENCY;
        let minute_spi = Spi::new_blocking_txonly(p.SPI1, p.PA5, p.PA7, led_spi_config);
        let hour_spi = Spi::new_blocking_txonly(p.SPI3, p.PB3, p.PB5, led_spi_config);
        let pixels = RingPixels::new(minute_spi, hour_spi);

        static EXCHANGE: StaticCell<TimeExchange> = StaticCell::new();
        let exchange: &'static TimeExchange = EXCHANGE.init(TimeExchange::new());

        let net_periph = NetworkPeripherals {
            spi: p.SPI2,
            sck: p.PB13,
            mosi: p.PB15,
            miso: p.PB14,
            cs: p.PC6,
            reset: p.PC3,
            int: p.PC2,
            exti: p.EXTI2,
            dma_tx: p.DMA1_CH4,
            dma_rx: p.DMA1_CH3,
        };
        network_task::spawn(net_periph, exchange).ok();

        (
            Shared {},
            Local {
                tick,
                controller,
                pixels,
                source: SntpTimeSource::new(exchange),
            },
        )
    }

    /// RTC wakeup, once per second. Raises the tick and nothing else.
    #[task(binds = RTC_WKUP, priority = 2, local = [tick])]
    fn rtc_wakeup(cx: rtc_wakeup::Context) {
        rtc::clear_wakeup_flag();
        cx.local.tick.raise();
    }

    /// Network task - owns the embassy-net stack and answers time requests
    ///
    /// Stack is !Send and must remain within this task.
    #[task(priority = 1)]
    async fn network_task(
        _cx: network_task::Context,
        periph: NetworkPeripherals,
        exchange: &'static TimeExchange,
    ) {
        use embassy_net::{Config, StackResources};

        info!("Network task started");

        let mut spi_config = spi::Config::default();
        spi_config.frequency = Hertz(10_000_000); // 10 MHz for W5500

        let spi = Spi::new(
            periph.spi,
            periph.sck,
            periph.mosi,
            periph.miso,
            periph.dma_tx,
            periph.dma_rx,
            spi_config,
        );

        let eth_periph = eth::EthPeripherals {
            spi,
            cs: Output::new(periph.cs, Level::High, Speed::VeryHigh),
            reset: Output::new(periph.reset, Level::High, Speed::Low),
            int: ExtiInput::new(periph.int, periph.exti, Pull::Up),
        };

        let net_config = NetworkConfig::from_device();
        let (device, w5500_runner) = match eth::init_w5500(eth_periph, net_config.mac_addr).await {
            Ok(parts) => parts,
            Err(e) => {
                warn!("Network unavailable, running on RTC time only: {}", e);
                return;
            }
        };

        static RESOURCES: StaticCell<StackResources<3>> = StaticCell::new();
        let (stack, mut net_runner) = embassy_net::new(
            device,
            Config::dhcpv4(Default::default()),
            RESOURCES.init(StackResources::new()),
            net_config.seed,
        );
        info!("Network stack initialized with DHCP");

        let time_service = async {
            manager::wait_for_config(&stack).await;
            exchange.set_link_up(true);
            let mut sntp = SntpClient::new();
            exchange.serve(&mut sntp, &stack).await
        };

        join3(w5500_runner.run(), net_runner.run(), time_service).await;
    }

    /// Main control loop
    ///
    /// Runs at the lowest priority; the tick handler and the network task
    /// preempt it.
    #[idle(local = [controller, pixels, source])]
    fn idle(cx: idle::Context) -> ! {
        let controller = cx.local.controller;
        let pixels = cx.local.pixels;
        let source = cx.local.source;

        controller.start(pixels);
        if let Err(e) = controller.sync_from_network(source, pixels, now_ms) {
            warn!("Initial time sync failed: {}", e);
        }
        let mut last_sync_attempt = now_ms();

        info!("Entering main loop");
        loop {
            let now = now_ms();
            controller.step(now, pixels);

            let retry = !controller.is_valid()
                && now.saturating_sub(last_sync_attempt) >= UNSYNCED_RETRY_MS;
            if controller.sync_due() || retry {
                last_sync_attempt = now;
                if let Err(e) = controller.sync_from_network(source, pixels, now_ms) {
                    warn!("Time sync failed: {}", e);
                }
            }

            block_for(Duration::from_millis(LOOP_PACING_MS));
        }
    }

    fn now_ms() -> u64 {
        Mono::now().duration_since_epoch().to_millis()
    }
}
