//! Networking and command server task.
//!
//! Manages the WiFi connection and a line based TCP server. Each received
//! line is parsed and queued for the motion task, malformed ones included, so
//! replies, `err:<message>` answers and notifications all come back through a
//! single queue in request order.
extern crate alloc;

use crate::config::{LINE_LEN, PING_MS, PORT, READ_POLL_MS, RX_BUF_SIZE, TX_BUF_SIZE};
use crate::protocol::{reply, LineFramer};
use crate::{COMMANDS, REPLIES};
use alloc::string::String;
use core::str::FromStr;
use embassy_net::{tcp::TcpSocket, IpListenEndpoint, Stack};
use embassy_time::{with_timeout, Duration, Instant, Timer};
use embedded_io_async::Write;
use esp_wifi::wifi::{ClientConfiguration, WifiController, WifiDevice};
use log::{error, info, warn};

#[embassy_executor::task]
pub async fn runner_task(mut runner: embassy_net::Runner<'static, WifiDevice<'static>>) {
    runner.run().await;
}

#[embassy_executor::task]
pub async fn net_task(stack: Stack<'static>) {
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let mut tx_buf = [0u8; TX_BUF_SIZE];

    while !stack.is_link_up() {
        Timer::after_millis(500).await;
    }
    stack.wait_config_up().await;

    if let Some(config) = stack.config_v4() {
        info!(
            "[NET_TASK] listening at address {}:{}",
            config.address, PORT
        );
    }

    loop {
        let mut socket = TcpSocket::new(stack, &mut rx_buf, &mut tx_buf);

        match socket
            .accept(IpListenEndpoint {
                port: PORT,
                addr: None,
            })
            .await
        {
            Ok(_) => {
                info!("[NET_TASK] client connected");
                // stale replies belong to the previous client
                while REPLIES.try_receive().is_ok() {}
                handle_connection(&mut socket).await;
                socket.close();
                info!("[NET_TASK] client disconnected");
            }
            Err(e) => {
                error!("[NET_TASK] accept failed: {:?}", e);
                Timer::after_millis(500).await; // Backoff delay
            }
        }
    }
}

async fn send_line(socket: &mut TcpSocket<'_>, line: &str) -> bool {
    let sent = socket.write_all(line.as_bytes()).await;
    let sent = match sent {
        Ok(()) => socket.write_all(b"\n").await,
        Err(e) => Err(e),
    };
    sent.inspect_err(|e| error!("[NET_TASK] write error: {:?}", e))
        .is_ok()
}

pub async fn handle_connection(socket: &mut TcpSocket<'_>) {
    let mut rx_buf = [0u8; RX_BUF_SIZE];
    let mut lines: LineFramer<LINE_LEN> = LineFramer::new();
    let mut last_ping = Instant::now();

    loop {
        match with_timeout(Duration::from_millis(READ_POLL_MS), socket.read(&mut rx_buf)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => {
                for &byte in &rx_buf[..n] {
                    // rejected lines are queued too, the motion task answers them in order
                    if let Some(inbound) = lines.push(byte) {
                        if let Err(e) = &inbound {
                            warn!("[NET_TASK] rejected line: {}", e);
                        }
                        COMMANDS.send(inbound).await;
                    }
                }
            }
            Ok(Err(e)) => {
                error!("[NET_TASK] read error: {:?}", e);
                break;
            }
            // nothing to read, fall through to the outbound queue
            Err(_) => {}
        }

        while let Ok(out) = REPLIES.try_receive() {
            if !send_line(socket, &out).await {
                return;
            }
        }

        if last_ping.elapsed() >= Duration::from_millis(PING_MS) {
            last_ping = Instant::now();
            if !send_line(socket, &reply(format_args!("ping"))).await {
                return;
            }
        }
    }
}

pub async fn configurate_and_start_wifi(wifi_controller: &mut WifiController<'_>) {
    let ssid = env!("WIFI_SSID");
    let password = env!("WIFI_PASS");
    let config = esp_wifi::wifi::Configuration::Client(ClientConfiguration {
        ssid: String::from_str(ssid).unwrap_or_default(),
        password: String::from_str(password).unwrap_or_default(),
        ..Default::default()
    });

    info!("Connecting to wifi: {ssid}");
    wifi_controller
        .set_configuration(&config)
        .expect("fail setting configuration of wifi controller");

    wifi_controller
        .set_power_saving(esp_wifi::config::PowerSaveMode::None)
        .expect("Fail setting wifi power mode");

    wifi_controller.start().expect("Fail starting wifi");
    wifi_controller
        .connect_async()
        .await
        .inspect_err(|e| error!("An error occured trying to connect to wifi: {e:?}"))
        .expect("Fail connecting to wifi");

    if let Ok(rssi) = wifi_controller.rssi() {
        info!("Wifi connected! signal: {}", rssi)
    }
}
