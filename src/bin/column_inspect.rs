use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use adaptive_ints::engine::core::column::column_serializer::{
    ColumnarIntsSerializer, SerializerOptions,
};
use adaptive_ints::engine::core::column::column_supplier::ColumnarIntsSupplier;
use adaptive_ints::engine::core::column::format::{DecodeStrategy, IntCodec};
use adaptive_ints::engine::core::column::reader::{ColumnData, map_column_file};
use adaptive_ints::engine::errors::ColumnError;
use adaptive_ints::logging;
use adaptive_ints::shared::config::CONFIG;

#[derive(Parser)]
#[command(name = "column_inspect")]
#[command(about = "Encode and inspect adaptive integer columns", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode whitespace separated integers from a text file
    Encode {
        input: PathBuf,
        output: PathBuf,

        /// Overrides the configured chunk exponent
        #[arg(long)]
        log_values_per_chunk: Option<u8>,

        /// none, lz4 or zstd
        #[arg(long)]
        compression: Option<String>,

        /// smaller_size or faster_decode
        #[arg(long)]
        target: Option<String>,

        /// Also try the byte-packed codec
        #[arg(long)]
        bytepack: bool,
    },
    /// Print the header and codec histogram of a column file
    Inspect {
        path: PathBuf,

        /// Decode strategy override: block, buffer or unsafe
        #[arg(long)]
        strategy: Option<String>,

        /// Number of leading values to print
        #[arg(short, long, default_value = "0")]
        values: usize,
    },
}

fn encode(
    input: PathBuf,
    output: PathBuf,
    log_values_per_chunk: Option<u8>,
    compression: Option<String>,
    target: Option<String>,
    bytepack: bool,
) -> anyhow::Result<()> {
    let mut options = SerializerOptions::from_config(&CONFIG.codec)?;
    if let Some(log) = log_values_per_chunk {
        options = options.with_log_values_per_chunk(log);
    }
    if let Some(name) = compression {
        options = options.with_compression(name.parse()?);
    }
    if let Some(name) = target {
        options = options.with_target(name.parse()?);
    }
    if bytepack {
        options = options.with_codec(IntCodec::BytePack);
    }

    let text = fs::read_to_string(&input)
        .with_context(|| format!("reading {}", input.display()))?;
    let mut serializer = ColumnarIntsSerializer::new(options)?;
    for token in text.split_whitespace() {
        let value: i32 = token
            .parse()
            .with_context(|| format!("invalid integer '{token}'"))?;
        serializer.add_value(value)?;
    }

    let mut writer = BufWriter::new(File::create(&output)?);
    serializer.write_to(&mut writer)?;
    writer.flush()?;

    println!(
        "wrote {} values, {} bytes to {}",
        serializer.num_values(),
        serializer.serialized_size()?,
        output.display()
    );
    for (codec, usage) in serializer.stats().iter() {
        println!("  {codec:<11} chunks={:<6} bytes={}", usage.chunks, usage.bytes);
    }
    Ok(())
}

fn inspect(path: PathBuf, strategy: Option<String>, values: usize) -> anyhow::Result<()> {
    let mmap = map_column_file(&path)?;
    let strategy = strategy
        .map(|s| s.parse::<DecodeStrategy>())
        .transpose()?;
    let supplier = ColumnarIntsSupplier::from_bytes(&mmap, strategy)?;
    let header = supplier.header();

    println!("file:              {}", path.display());
    println!("byte order:        {}", header.byte_order);
    println!("persisted mode:    {}", header.decode_strategy);
    println!("effective mode:    {}", supplier.decode_strategy());
    println!("values:            {}", header.num_values);
    println!("chunks:            {}", header.num_chunks);
    println!("values per chunk:  {}", header.values_per_chunk());
    println!("offsets size:      {}", header.offsets_size);
    println!("serialized bytes:  {}", supplier.serialized_size());

    let data = ColumnData::parse(&mmap)?;
    let mut histogram = [(0usize, 0usize); IntCodec::ALL.len()];
    for chunk in 0..data.num_chunks() {
        let bytes = data.chunk(chunk)?;
        let entry = &mut histogram[bytes[0] as usize];
        entry.0 += 1;
        entry.1 += bytes.len();
    }
    for (codec, (chunks, bytes)) in IntCodec::ALL.iter().zip(histogram) {
        if chunks > 0 {
            println!("  {codec:<11} chunks={chunks:<6} bytes={bytes}");
        }
    }

    let n = values.min(supplier.len());
    if n > 0 {
        let mut out = vec![0; n];
        supplier.get().get_range(&mut out, 0, n)?;
        println!("first {n} values: {out:?}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logging::init(&CONFIG.logging)?;

    let result = match args.command {
        Command::Encode {
            input,
            output,
            log_values_per_chunk,
            compression,
            target,
            bytepack,
        } => encode(input, output, log_values_per_chunk, compression, target, bytepack),
        Command::Inspect {
            path,
            strategy,
            values,
        } => inspect(path, strategy, values),
    };

    if let Err(e) = &result {
        if let Some(column_error) = e.downcast_ref::<ColumnError>() {
            column_error.log_error();
        }
    }
    result
}
