#[cfg(target_os = "espidf")]
fn main() -> anyhow::Result<()> {
    use esp_idf_hal::delay::FreeRtos;
    use esp_idf_hal::gpio::PinDriver;
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_svc::eventloop::EspSystemEventLoop;
    use esp_idf_svc::nvs::EspDefaultNvsPartition;
    use esp_idf_svc::sys;
    use flow_relay_node::flow::sensor;
    use flow_relay_node::wifi::EspRadio;
    use flow_relay_node::{
        FlowEstimator, MonotonicClock, NetworkSession, NodeConfig, PulseCounter, RelayActuator,
        RequestHandler, Supervisor, TcpBinder,
    };
    use std::sync::Arc;

    // Initialize ESP-IDF system services
    sys::link_patches();

    // Initialize logging
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("ESP32 Flow Monitor and Relay Controller");
    log::info!("Initializing...");

    let config = NodeConfig::from_build_env()?;
    log::info!(
        "Config: {} pulses/L, {}ms window, port {}",
        config.flow.calibration_factor,
        config.flow.sample_window_ms,
        config.server.port
    );

    let peripherals = Peripherals::take()?;
    let sysloop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    log::info!("✅ ESP32 initialized with ESP-IDF");

    // Flow sensor on GPIO4, relay on GPIO2. GPIO0 is a boot strapping pin and a
    // sensor pulling it low at reset would enter download mode.
    log::info!("Initializing GPIO pins...");
    log::info!("  Flow sensor: GPIO4 (input, pull-up, falling edge)");
    log::info!("  Relay:       GPIO2 (output, starting LOW - relay off)");

    let counter = Arc::new(PulseCounter::new());
    let sensor_pin = PinDriver::input(peripherals.pins.gpio4)?;
    let _sensor_pin = sensor::attach(sensor_pin, Arc::clone(&counter))?;

    let relay = RelayActuator::new(PinDriver::output(peripherals.pins.gpio2)?)?;
    log::info!("✅ GPIO pins configured");

    let estimator =
        FlowEstimator::new(counter, MonotonicClock::new(), FreeRtos, config.flow.clone());
    let handler = RequestHandler::new(relay, estimator, config.server.max_request_bytes);

    let radio = EspRadio::new(peripherals.modem, sysloop, Some(nvs))?;
    let session = NetworkSession::new(radio, FreeRtos, &config.server);
    let binder = TcpBinder::new(config.server.read_timeout());

    let mut supervisor = Supervisor::new(
        session,
        binder,
        handler,
        FreeRtos,
        config.wifi.clone(),
        config.server.clone(),
    );

    log::info!("Entering server loop...");
    supervisor.run()
}

#[cfg(not(target_os = "espidf"))]
fn main() {
    eprintln!(
        "flow_node is ESP-IDF firmware; build it for an espidf target (e.g. xtensa-esp32-espidf)"
    );
    std::process::exit(1);
}
