use super::{LinkStatus, Radio};
use anyhow::{anyhow, Result};
use embedded_svc::wifi::{AuthMethod, ClientConfiguration, Configuration};
use esp_idf_hal::modem::Modem;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::EspWifi;
use log::info;
use std::net::Ipv4Addr;

/// Station-mode `EspWifi`, driven without the blocking wrapper so the session
/// can poll the link itself.
pub struct EspRadio {
    wifi: Box<EspWifi<'static>>,
}

impl EspRadio {
    pub fn new(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: Option<EspDefaultNvsPartition>,
    ) -> Result<Self> {
        info!("🌐 WiFi: Creating EspWifi instance...");
        let esp_wifi = EspWifi::new(modem, sysloop, nvs)?;
        info!("✅ WiFi: EspWifi created");

        Ok(Self {
            wifi: Box::new(esp_wifi),
        })
    }
}

impl Radio for EspRadio {
    fn activate(&mut self) -> Result<()> {
        if self.wifi.is_started()? {
            return Ok(());
        }

        info!("🌐 WiFi: Starting station interface...");
        self.wifi
            .set_configuration(&Configuration::Client(ClientConfiguration::default()))?;
        self.wifi.start()?;
        info!("✅ WiFi: Started");
        Ok(())
    }

    fn begin_connect(&mut self, ssid: &str, password: &str) -> Result<()> {
        let auth_method = if password.is_empty() {
            info!("WiFi password is empty, using open network");
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };

        let wifi_configuration = Configuration::Client(ClientConfiguration {
            ssid: ssid
                .try_into()
                .map_err(|_| anyhow!("SSID too long (max 32 chars)"))?,
            password: password
                .try_into()
                .map_err(|_| anyhow!("Password too long (max 64 chars)"))?,
            auth_method,
            ..Default::default()
        });

        self.wifi.set_configuration(&wifi_configuration)?;
        self.wifi.connect()?;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<()> {
        if self.wifi.is_connected().unwrap_or(false) {
            info!("🔌 WiFi: Disconnecting...");
            self.wifi.disconnect()?;
            info!("✅ WiFi: Disconnected");
        }
        Ok(())
    }

    fn link_status(&self) -> LinkStatus {
        let started = self.wifi.is_started().unwrap_or(false);
        let connected = self.wifi.is_connected().unwrap_or(false);
        let up = self.wifi.is_up().unwrap_or(false);

        match (started, connected, up) {
            (false, _, _) => LinkStatus::Idle,
            (true, true, true) => LinkStatus::GotIp,
            (true, true, false) => LinkStatus::WaitingForIp,
            (true, false, _) => LinkStatus::Connecting,
        }
    }

    fn ip_address(&self) -> Option<Ipv4Addr> {
        self.wifi.sta_netif().get_ip_info().ok().map(|info| info.ip)
    }
}
