use std::env;
use std::io;
use std::net::Ipv4Addr;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod scan;

use scan::{tcp_syn_probe, PortState, Probe};

const DEFAULT_PORT: u16 = 80;
const DEFAULT_SOURCE: Ipv4Addr = Ipv4Addr::LOCALHOST;

fn help(program_name: &str) {
    println!(
        "
pktcraft sends one hand-built TCP SYN through a raw socket and reports how the
target answered. Needs root (or CAP_NET_RAW).

    Open     - SYN+ACK received
    Closed   - RST received
    Filtered - no answer within 1.5s, or anything else

Usage:
    {program_name} --help | -h
    {program_name} --probe | -p <ip_address> [port] [--source <ip_address>]

    port defaults to {DEFAULT_PORT}, source to {DEFAULT_SOURCE}.
    Set RUST_LOG=debug to see the headers as they go out.

Examples:
    {program_name} --probe 127.0.0.1
    {program_name} --probe 192.168.1.1 443 --source 192.168.1.10
"
    );
}

fn invalid_input(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn parse_ip(value: Option<&String>, what: &str) -> io::Result<Ipv4Addr> {
    let value = value.ok_or_else(|| invalid_input(&format!("Missing {what}")))?;
    value
        .parse()
        .map_err(|_| invalid_input(&format!("Invalid {what}: {value}")))
}

fn run_probe(args: &[String]) -> io::Result<()> {
    let destination_ip = parse_ip(args.first(), "IP address")?;

    let mut destination_port = DEFAULT_PORT;
    let mut source_ip = DEFAULT_SOURCE;

    let mut rest = args[1..].iter();
    while let Some(arg) = rest.next() {
        match arg.as_str() {
            "--source" | "-s" => source_ip = parse_ip(rest.next(), "source address")?,
            port => match port.parse::<u16>() {
                Ok(p) => destination_port = p,
                Err(_) => {
                    warn!("Invalid port number {port}, using default port {DEFAULT_PORT}");
                }
            },
        }
    }

    let probe = Probe::new(source_ip, destination_ip, destination_port);
    match tcp_syn_probe(&probe)? {
        PortState::Open => info!("Port {} is OPEN", destination_port),
        PortState::Closed => info!("Port {} is CLOSED", destination_port),
        PortState::Filtered => info!("Port {} is FILTERED", destination_port),
    }

    Ok(())
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--help" | "-h") => {
            help(&args[0]);
            Ok(())
        }
        Some("--probe" | "-p") => run_probe(&args[2..]),
        Some(_) => Err(invalid_input("Invalid argument. Use --help to see usage.")),
        None => Err(invalid_input("No arguments provided. Use --help to see usage.")),
    }
}
