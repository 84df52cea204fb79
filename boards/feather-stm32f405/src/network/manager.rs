#![deny(unsafe_code)]
//! Network stack manager

use defmt::info;
use embassy_net::Stack;

/// Wait for DHCP and log the lease
pub async fn wait_for_config(stack: &Stack<'_>) {
    info!("Waiting for DHCP...");
    stack.wait_config_up().await;
    info!("Network is UP!");

    if let Some(config) = stack.config_v4() {
        let [a, b, c, d] = config.address.address().octets();
        info!("IP: {}.{}.{}.{}", a, b, c, d);

        if let Some(gateway) = config.gateway {
            let [a, b, c, d] = gateway.octets();
            info!("Gateway: {}.{}.{}.{}", a, b, c, d);
        }
    }
}
