use pmtscope::{Device, Driver, DwfLibrary, PlaybackConfiguration, Simulator};

fn generate<D: Driver>(driver: D, config: &PlaybackConfiguration) -> pmtscope::Result<()> {
    Device::with(driver, 0, |device| {
        println!("Generating pulse...");
        pmtscope::play_pulse(device, config)
    })?;
    println!("Pulse generation done!");
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let simulate = std::env::args().skip(1).any(|arg| arg == "--simulate");
    let config = PlaybackConfiguration::default();
    let result = if simulate {
        generate(Simulator::new(), &config)
    } else {
        DwfLibrary::load().and_then(|library| generate(library, &config))
    };
    if let Err(error) = result {
        log::error!("{}", error);
        if !simulate {
            pmtscope::close_all_devices();
        }
        std::process::exit(1);
    }
}
