use std::fs::File;
use std::path::PathBuf;

use anyhow::{ensure, Context, Result};
use clap::{App, Arg};
use ndarray::Array1;
use ndarray_npy::NpzWriter;

use tdc_toolbox::coinc_tools::delta::{delta, DeltaParams};
use tdc_toolbox::parsers::a1::A1File;
use tdc_toolbox::parsers::split_channels;
use tdc_toolbox::NUM_CHANNELS;

fn main() -> Result<()> {
    let matches = App::new("tdc")
        .about("Pairwise coincidence histograms from raw timestamp files")
        .arg(
            Arg::with_name("INPUT")
                .help("Raw .a1 timestamp file")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .default_value("histogram.npz")
                .help("Output npz file with the time axis and the histogram"),
        )
        .arg(
            Arg::with_name("bins")
                .long("bins")
                .takes_value(true)
                .default_value("500")
                .help("Number of histogram bins"),
        )
        .arg(
            Arg::with_name("bin-width")
                .long("bin-width")
                .takes_value(true)
                .default_value("2.0")
                .help("Bin width in nanoseconds"),
        )
        .arg(
            Arg::with_name("start")
                .long("start-channel")
                .takes_value(true)
                .default_value("1")
                .help("Channel of the start events (1-4)"),
        )
        .arg(
            Arg::with_name("stop")
                .long("stop-channel")
                .takes_value(true)
                .default_value("2")
                .help("Channel of the stop events (1-4)"),
        )
        .arg(
            Arg::with_name("legacy")
                .long("legacy")
                .help("Swap the 32-bit word order (files from the older readout)"),
        )
        .get_matches();

    let input = PathBuf::from(matches.value_of("INPUT").unwrap());
    let output = PathBuf::from(matches.value_of("output").unwrap());
    let bins: usize = matches
        .value_of("bins")
        .unwrap()
        .parse()
        .context("--bins must be a positive integer")?;
    let bin_width_ns: f64 = matches
        .value_of("bin-width")
        .unwrap()
        .parse()
        .context("--bin-width must be a number of nanoseconds")?;
    let start: usize = matches
        .value_of("start")
        .unwrap()
        .parse()
        .context("--start-channel must be an integer")?;
    let stop: usize = matches
        .value_of("stop")
        .unwrap()
        .parse()
        .context("--stop-channel must be an integer")?;
    ensure!(
        (1..=NUM_CHANNELS).contains(&start) && (1..=NUM_CHANNELS).contains(&stop),
        "channels are numbered 1 to {}",
        NUM_CHANNELS
    );

    let file = A1File::new(input, matches.is_present("legacy"), true)?;
    let events = file.events().context("failed to parse the timestamp file")?;
    let channels = split_channels(&events);
    let starts = &channels[start - 1];
    let stops = &channels[stop - 1];

    let result = delta(
        starts,
        stops,
        &DeltaParams { bins, bin_width_ns },
    )?;

    let mut npz = NpzWriter::new(File::create(&output).context("cannot create output file")?);
    npz.add_array("t", &Array1::from(result.t))?;
    npz.add_array("hist", &Array1::from(result.hist))?;
    npz.finish()?;

    eprintln!(
        "{} events read, {} starts on channel {}, {} stops on channel {}",
        events.len(),
        starts.len(),
        start,
        stops.len(),
        stop
    );
    Ok(())
}
