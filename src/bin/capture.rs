use std::io::Write;
use std::path::Path;
use std::str::FromStr;

use pmtscope::{AcquisitionConfiguration, Device, Driver, DwfLibrary, Simulator};
use pmtscope::{Edge, EdgeTrigger, PollPolicy, TriggerConfiguration, TriggerSource};

const CHANNEL: usize = 0;
const PLOT_FILENAME: &str = "capture.svg";

fn prompt<T: FromStr>(question: &str) -> pmtscope::Result<T> {
    print!("{}", question);
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    answer.trim().parse().map_err(|_|
        pmtscope::Error::InvalidParameter(format!("cannot parse {:?}", answer.trim())))
}

fn capture<D: Driver>(driver: D, acquisition: AcquisitionConfiguration)
        -> pmtscope::Result<()> {
    let trigger = TriggerConfiguration::Edge(EdgeTrigger {
        source: TriggerSource::DetectorAnalogIn,
        channel: CHANNEL,
        edge: Edge::Rising,
        level: 0.0,
        ..Default::default()
    });
    let capture = Device::with(driver, 0, |device|
        pmtscope::acquire(device, &acquisition, &trigger, CHANNEL, &PollPolicy::default()))?;

    println!();
    println!("Running parameters");
    println!();
    println!("sampling frequency: {} Hz", capture.params.sampling_frequency);
    println!("buffer size:        {}", capture.params.buffer_size);
    println!("offset voltage:     {} V", capture.params.offset);
    println!("amplitude range:    ±{} V", capture.params.amplitude_range);

    capture.plot(Path::new(PLOT_FILENAME))?;
    println!("saved plot of {} samples to {}", capture.samples.len(), PLOT_FILENAME);
    Ok(())
}

fn run(simulate: bool) -> pmtscope::Result<()> {
    let sampling_frequency: f64 = prompt("put frequency (in Hz): ")?;
    let buffer_size: usize = prompt("put buffer size: ")?;
    if !(sampling_frequency > 0.0) {
        return Err(pmtscope::Error::InvalidParameter(
            format!("sampling frequency {} Hz is not positive", sampling_frequency)))
    }
    let acquisition = AcquisitionConfiguration {
        sampling_frequency,
        buffer_size,
        ..Default::default()
    };
    if simulate {
        capture(Simulator::new(), acquisition)
    } else {
        capture(DwfLibrary::load()?, acquisition)
    }
}

fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
    let simulate = std::env::args().skip(1).any(|arg| arg == "--simulate");
    if let Err(error) = run(simulate) {
        log::error!("{}", error);
        if !simulate {
            pmtscope::close_all_devices();
        }
        std::process::exit(1);
    }
}
