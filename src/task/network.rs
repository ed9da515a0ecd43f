//! Network bring-up
//!
//! W5500 Ethernet over SPI0 with an embassy-net stack on top, address from
//! DHCP. The chip and stack runners get their own tasks; the caller gets the
//! stack once an address is configured.

use defmt::info;
use embassy_embedded_hal::shared_bus::asynch::spi::SpiDevice;
use embassy_executor::Spawner;
use embassy_net::{Stack, StackResources};
use embassy_net_wiznet::{chip::W5500, Device, Runner, State};
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::SPI0;
use embassy_rp::spi::{Async, Config as SpiConfig, Spi};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::Instant;
use nanorand::{Rng, WyRand};
use static_cell::StaticCell;

use crate::task::resources::EthernetResources;

/// Locally administered MAC address
const MAC_ADDRESS: [u8; 6] = [0x02, 0x00, 0x00, 0x50, 0x4b, 0x01];

/// SPI clock for the W5500 (rated up to 80MHz)
const SPI_FREQUENCY: u32 = 50_000_000;

/// Sockets for DHCP and the HTTP server, plus one spare
const SOCKET_COUNT: usize = 3;

type SpiBus = Spi<'static, SPI0, Async>;
type EthernetSpi = SpiDevice<'static, NoopRawMutex, SpiBus, Output<'static>>;
type EthernetRunner = Runner<'static, W5500, EthernetSpi, Input<'static>, Output<'static>>;

#[embassy_executor::task]
async fn ethernet_task(runner: EthernetRunner) -> ! {
    runner.run().await
}

#[embassy_executor::task]
async fn net_task(mut runner: embassy_net::Runner<'static, Device<'static>>) -> ! {
    runner.run().await
}

/// Brings up the Ethernet link and waits for a DHCP lease
pub async fn start(spawner: Spawner, r: EthernetResources) -> Stack<'static> {
    let mut config = SpiConfig::default();
    config.frequency = SPI_FREQUENCY;
    let spi = Spi::new(r.spi, r.clk_pin, r.mosi_pin, r.miso_pin, r.tx_dma, r.rx_dma, config);

    static SPI_BUS: StaticCell<Mutex<NoopRawMutex, SpiBus>> = StaticCell::new();
    let spi_bus = SPI_BUS.init(Mutex::new(spi));
    let spi = SpiDevice::new(spi_bus, Output::new(r.cs_pin, Level::High));
    let int = Input::new(r.int_pin, Pull::Up);
    let reset = Output::new(r.reset_pin, Level::High);

    static STATE: StaticCell<State<8, 8>> = StaticCell::new();
    let state = STATE.init(State::new());
    let (device, runner) = embassy_net_wiznet::new(MAC_ADDRESS, state, spi, int, reset)
        .await
        .unwrap();
    spawner.spawn(ethernet_task(runner)).unwrap();

    // only feeds TCP sequence numbers and ports, boot time jitter is enough
    let seed = WyRand::new_seed(Instant::now().as_ticks()).generate::<u64>();

    static RESOURCES: StaticCell<StackResources<SOCKET_COUNT>> = StaticCell::new();
    let (stack, runner) = embassy_net::new(
        device,
        embassy_net::Config::dhcpv4(Default::default()),
        RESOURCES.init(StackResources::new()),
        seed,
    );
    spawner.spawn(net_task(runner)).unwrap();

    info!("Waiting for DHCP...");
    stack.wait_config_up().await;
    if let Some(config) = stack.config_v4() {
        info!("IP Address: {}", config.address);
    }

    stack
}
