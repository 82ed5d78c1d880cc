use std::error::Error;

use clap::Parser;
use log::info;

use quorum::{
    DriverConfig, DriverConfigProfile, DriverContext, DriverOption, ProtocolVersion, Request,
    SimpleStatement, Statement, Value,
    conversions::{minimum_request_size, size_of_values, to_message},
    protocol::frame::Frame,
};

/// Prints the request frame a simple statement is sent as.
#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Query text
    query: String,

    /// Consistency level name
    #[arg(short, long, default_value = "LOCAL_ONE")]
    consistency: String,

    /// Native protocol version (3, 4 or 5)
    #[arg(short, long, default_value = "4")]
    protocol_version: ProtocolVersion,

    /// Positional value; integers are sent as bigint, anything else as text
    #[arg(short, long = "value")]
    values: Vec<String>,

    /// Keyspace to run the query in (protocol 5 only)
    #[arg(short, long)]
    keyspace: Option<String>,

    /// Page size
    #[arg(long, default_value_t = 5000)]
    page_size: i32,

    #[arg(long, default_value_t = 0)]
    stream_id: i16,
}

fn parse_value(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::BigInt)
        .unwrap_or_else(|_| Value::Text(raw.to_string()))
}

fn main() -> Result<(), Box<dyn Error>> {
    // Initialize env_logger; For logging to STDOUT/STDERR
    env_logger::init();

    let cli = Cli::parse();

    let profile = DriverConfigProfile::defaults()
        .with_string(DriverOption::RequestConsistency, cli.consistency)
        .with_int(DriverOption::RequestPageSize, cli.page_size);
    let context = DriverContext::new(cli.protocol_version).with_config(DriverConfig::new(profile));

    let values = cli.values.iter().map(|v| parse_value(v)).collect();
    let mut statement = SimpleStatement::new(cli.query).with_positional_values(values);
    if let Some(keyspace) = cli.keyspace {
        statement = statement.with_keyspace(keyspace);
    }
    let statement = Statement::from(statement);

    let message = to_message(&statement, context.config().default_profile(), &context)?;
    let frame = Frame::new(context.protocol_version(), cli.stream_id, message)
        .encode(context.version_registry())?;
    let estimate =
        minimum_request_size(&statement, &context) + size_of_values(&statement, &context)?;
    info!("encoded {} byte frame", frame.len());

    let hex: String = frame.iter().map(|b| format!("{b:02x}")).collect();
    println!("{hex}");
    println!("frame size: {} bytes", frame.len());
    println!("size estimate: {estimate} bytes");

    Ok(())
}
