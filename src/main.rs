use clap::Parser;
use remu6805::config::MachineConfig;
use remu6805::cpu::m6805::{Disassembler, Variant};
use remu6805::error::EmuError;
use remu6805::image::{Image, Segment};
use remu6805::system::Mcu;
use remu6805::util::parse_number;
use std::error::Error;
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::str::FromStr;

const TITLE: &str = "remu6805";
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[command(name = TITLE, version = VERSION, about = "6805 family microcontroller emulator")]
struct Args {
    /// Raw binary or Motorola S-record file
    image: Option<PathBuf>,

    /// JSON machine configuration, overridden by the other flags
    #[arg(long)]
    config: Option<PathBuf>,

    /// CPU variant, e.g. m6805, m68705p3, m68hc05c4
    #[arg(long, value_parser = parse_variant)]
    variant: Option<Variant>,

    /// Where to place raw binaries ($hex, 0xhex or decimal)
    #[arg(long, value_parser = parse_number)]
    load_address: Option<u32>,

    /// Machine cycles to run
    #[arg(long)]
    cycles: Option<u64>,

    /// Log every executed instruction
    #[arg(long)]
    trace: bool,

    /// Print a listing of the image instead of running it
    #[arg(long)]
    disassemble: bool,

    /// Write the final CPU state as JSON
    #[arg(long)]
    save_state: Option<PathBuf>,
}

fn parse_variant(text: &str) -> Result<Variant, EmuError> {
    Variant::from_str(&text.to_ascii_lowercase())
        .map_err(|_| EmuError::UnknownVariant(text.to_string()))
}

fn init_logging(trace: bool) {
    let default = if trace { "warn,m6805=trace" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn merge_config(args: &Args) -> Result<MachineConfig, EmuError> {
    let mut config = match &args.config {
        Some(path) => MachineConfig::from_json_file(path)?,
        None => MachineConfig::default(),
    };
    if let Some(image) = &args.image {
        config.image = Some(image.clone());
    }
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some(address) = args.load_address {
        config.load_address = Some(address);
    }
    if let Some(cycles) = args.cycles {
        config.cycles = cycles;
    }
    config.trace |= args.trace;
    Ok(config)
}

fn print_listing(disassembler: &Disassembler, segment: &Segment) {
    let mut offset = 0;
    while offset < segment.data.len() {
        let pc = (segment.address as usize + offset) as u16;
        let bytes = &segment.data[offset..];
        let (text, length) = match disassembler.disassemble(pc, bytes) {
            Ok(disassembly) => (disassembly.text, disassembly.length),
            Err(_) => (format!("fcb    ${:02x}", bytes[0]), 1),
        };
        let hex: Vec<String> = bytes[..length].iter().map(|b| format!("{:02X}", b)).collect();
        println!("{:04X}: {:<9} {}", pc, hex.join(" "), text);
        offset += length;
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let config = merge_config(&args)?;
    init_logging(config.trace);

    let path = config
        .image
        .clone()
        .ok_or("no image given, pass a file or set \"image\" in the configuration")?;
    let image = Image::load(&path, config.default_load_address())?;

    if args.disassemble {
        let set = config.variant.configuration();
        let disassembler = Disassembler::new(set.instruction_set).with_symbols(set.symbols);
        for segment in image.segments.iter() {
            print_listing(&disassembler, segment);
        }
        return Ok(());
    }

    let mut mcu = Mcu::new(config.variant, config.clock);
    mcu.set_trace(config.trace);
    mcu.load(&image)?;
    mcu.reset();
    for (port, level) in config.port_inputs.iter().enumerate() {
        mcu.set_port_input(port, *level);
    }

    let cycles = mcu.run(config.cycles);

    let cpu = mcu.cpu();
    println!("{} after {} cycles ({:.6} s)", config.variant, cycles, mcu.elapsed_seconds());
    println!(
        "PC={:04X} A={:02X} X={:02X} S={:04X} CC={}",
        cpu.pc(),
        cpu.a(),
        cpu.x(),
        cpu.s(),
        cpu.flags_string()
    );
    for entry in cpu.state_entries().iter().skip(5) {
        println!("{:<8} {:X}", entry.name, entry.value);
    }
    if cpu.reset_pulses() > 0 {
        println!("reset pulses: {}", cpu.reset_pulses());
    }

    if let Some(path) = &args.save_state {
        let writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer_pretty(writer, &cpu.save_state())?;
    }
    Ok(())
}
