use pmtscope::{Device, Driver, DwfLibrary, RandomPlaybackConfiguration, Simulator};

fn generate<D: Driver>(driver: D, config: &RandomPlaybackConfiguration) -> pmtscope::Result<()> {
    let mut rng = rand::thread_rng();
    Device::with(driver, 0, |device| {
        println!("Generating pulses with random amplitudes...");
        println!("amplitude range: {:.0} mV to {:.0} mV",
            config.amplitudes.low() * 1e3, config.amplitudes.high() * 1e3);
        pmtscope::play_random_pulses(device, config, &mut rng, |index, amplitude| {
            println!("Generating pulse {}/{} with amplitude: {:.1} mV",
                index + 1, config.count, amplitude * 1e3);
        })
    })?;
    println!("Pulse generation complete.");
    Ok(())
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let simulate = std::env::args().skip(1).any(|arg| arg == "--simulate");
    let config = RandomPlaybackConfiguration::default();
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
