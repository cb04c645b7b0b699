//! Log Filter - High-performance log record filtering for incident response
//!
//! Main entry point for the command-line application.

use bstr::ByteSlice;
use clap::Parser;
use std::process;

use log_filter::cli::Args;
use log_filter::processor::{Processor, ProcessorConfig};
use log_filter::progress::{print_banner, print_error, print_header, print_info};

fn main() {
    // Parse command-line arguments
    let args = Args::parse();

    // Set up logging
    if args.verbose {
        std::env::set_var("RUST_LOG", "debug");
    } else if !args.quiet {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    // Configure thread pool
    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .ok();
    }

    // Run the application
    if let Err(e) = run(args) {
        print_error(&format!("{}", e));

        // Print chain of errors
        let mut source = e.source();
        while let Some(err) = source {
            print_error(&format!("  Caused by: {}", err));
            source = err.source();
        }

        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    // Print banner unless quiet mode
    if !args.quiet {
        print_banner();
    }

    // Validate arguments
    validate_args(&args)?;

    // Create processor configuration
    let config = ProcessorConfig::from_args(&args)?;

    // Show configuration
    if !args.quiet && args.verbose {
        print_config(&args, &config);
    }

    // Create and run processor
    let processor = Processor::new(config);
    processor.run()
}

/// Validate command-line arguments
fn validate_args(args: &Args) -> anyhow::Result<()> {
    // Check that the input directory exists
    if !args.input.is_dir() {
        anyhow::bail!("Input directory does not exist: {:?}", args.input);
    }

    // Check that we have at least one criterion
    if args.search.is_empty() && args.regex.is_empty() {
        anyhow::bail!("At least one criterion must be specified: --search or --regex");
    }

    // Validate regex criteria if provided
    for pattern in &args.regex {
        log_filter::filter::validate_pattern(pattern)?;
    }

    // An empty delimiter can neither split nor frame records
    if args.delimiter.is_empty() {
        anyhow::bail!("The delimiter must not be empty");
    }

    if args.parse_buffer_size()? == 0 {
        anyhow::bail!("Buffer size must be greater than zero");
    }

    Ok(())
}

/// Print configuration summary
fn print_config(args: &Args, config: &ProcessorConfig) {
    print_header("Configuration");

    print_info(&format!("Input:        {:?}", config.input_dir));
    print_info(&format!("Output dir:   {:?}", config.output_dir));
    print_info(&format!("Mask:         {}", config.mask));
    print_info(&format!("Strings:      {:?}", args.search));
    print_info(&format!("Regexps:      {:?}", args.regex));
    print_info(&format!("Inverse:      {}", args.inverse));
    print_info(&format!("Line mode:    {}", args.line));
    print_info(&format!("Delimiter:    {}", config.delimiter.as_bstr()));
    print_info(&format!("Dry run:      {}", config.dry_run));
    print_info(&format!("Force:        {}", config.force));
    print_info(&format!("Buffer size:  {} MB", config.buffer_size / (1024 * 1024)));
    print_info(&format!("Threads:      {}", args.threads.unwrap_or_else(num_cpus::get)));
}
